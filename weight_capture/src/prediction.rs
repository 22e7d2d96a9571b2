use tracing::instrument;
use weight_proto::{PredictionClient, PredictionReply, PredictionRequest, WeightClass};

/// Sends one estimate to the prediction service and logs the outcome.
/// Every failure is logged and swallowed so the capture loop keeps going.
#[instrument(skip(client), fields(url = %client.url()))]
pub async fn report_estimate(client: &PredictionClient, estimate_kg: f64) -> Option<WeightClass> {
    let request = PredictionRequest::from_kilograms(estimate_kg);
    tracing::debug!(
        "Sending request to {} with payload {:?}",
        client.url(),
        request
    );

    match client.predict(&request).await {
        Ok(PredictionReply::Predicted(response)) => {
            let class = WeightClass::classify(response.predicted_weight);
            tracing::info!("Status: Success");
            tracing::info!("Predicted Weight: {}", response.predicted_weight);
            tracing::info!("Classification: {}", class);
            Some(class)
        }
        Ok(PredictionReply::Rejected { status, body }) => {
            tracing::error!("Error: {} - {}", status, body);
            None
        }
        Err(e) if e.is_connection_failure() => {
            tracing::error!("Unable to connect to the prediction service: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Prediction request failed: {}", e);
            None
        }
    }
}
