use crate::{model_service::ModelService, model_store::ModelState};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{value::RawValue, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::instrument;
use weight_proto::{pounds_to_kg, ErrorResponse, PredictionResponse, WEIGHT_FIELD};

#[derive(Error, Debug, PartialEq)]
pub enum PredictError {
    #[error("Model not found. Please train and save the model first.")]
    ModelNotFound,
    #[error("Invalid input. Please send a JSON payload.")]
    InvalidInput,
    #[error("Request body is too large.")]
    PayloadTooLarge,
    #[error("Missing '{field}' key in JSON payload.", field = WEIGHT_FIELD)]
    MissingWeight,
    #[error("Invalid weight value. Please provide a numeric value.")]
    InvalidWeight,
    #[error("The model could not produce a prediction for this weight.")]
    PredictionFailed,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match self {
            PredictError::ModelNotFound | PredictError::PredictionFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PredictError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::InvalidInput
            | PredictError::MissingWeight
            | PredictError::InvalidWeight => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<BytesRejection> for PredictError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PredictError::PayloadTooLarge
        } else {
            PredictError::InvalidInput
        }
    }
}

#[instrument(skip(state, headers, body))]
pub async fn predict<M: ModelService>(
    State(state): State<ModelState<M>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, PredictError> {
    let model = state.model().ok_or(PredictError::ModelNotFound)?;

    tracing::info!("Request received at /predict");

    let body = body?;
    if !has_json_content_type(&headers) {
        return Err(PredictError::InvalidInput);
    }
    // Numbers stay unparsed here so an out-of-range weight is reported as a
    // bad weight rather than bad JSON.
    let payload: Box<RawValue> =
        serde_json::from_slice(&body).map_err(|_| PredictError::InvalidInput)?;
    tracing::info!("Received data: {}", payload.get());

    let fields: HashMap<String, Box<RawValue>> =
        serde_json::from_str(payload.get()).map_err(|_| PredictError::MissingWeight)?;
    let weight_in_pounds = fields
        .get(WEIGHT_FIELD)
        .ok_or(PredictError::MissingWeight)
        .and_then(|raw| parse_weight(raw))?;

    let weight_in_kg = pounds_to_kg(weight_in_pounds);
    let predicted_weight = model.predict(weight_in_kg);
    if !predicted_weight.is_finite() {
        tracing::error!(
            "Model produced a non-finite prediction for {} kg",
            weight_in_kg
        );
        return Err(PredictError::PredictionFailed);
    }

    tracing::debug!(
        "Predicted {} from {} lbs ({} kg)",
        predicted_weight,
        weight_in_pounds,
        weight_in_kg
    );

    Ok(Json(PredictionResponse { predicted_weight }))
}

/// `application/json` or any `application/*+json` media type.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Numbers and numeric strings are accepted; the result must be finite.
fn parse_weight(raw: &RawValue) -> Result<f64, PredictError> {
    let weight = match serde_json::from_str::<Value>(raw.get()) {
        Ok(Value::Number(number)) => number.as_f64(),
        Ok(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    weight
        .filter(|w| w.is_finite())
        .ok_or(PredictError::InvalidWeight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    /// Records the last input so the unit conversion can be checked.
    #[derive(Default)]
    struct RecordingModel {
        last_input: AtomicU64,
    }

    impl ModelService for RecordingModel {
        fn predict(&self, weight_in_kg: f64) -> f64 {
            self.last_input
                .store(weight_in_kg.to_bits(), Ordering::SeqCst);
            weight_in_kg + 1.0
        }
    }

    impl RecordingModel {
        fn last_input(&self) -> f64 {
            f64::from_bits(self.last_input.load(Ordering::SeqCst))
        }
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    async fn call(
        state: ModelState<RecordingModel>,
        headers: HeaderMap,
        body: &str,
    ) -> Result<f64, PredictError> {
        predict(State(state), headers, Ok(Bytes::from(body.to_string())))
            .await
            .map(|Json(response)| response.predicted_weight)
    }

    #[tokio::test]
    async fn test_predict_converts_pounds_before_model() {
        let model = Arc::new(RecordingModel::default());
        let state = ModelState::Ready(model.clone());

        for pounds in [0.0, 100.0, 150.0, 187.25] {
            let body = json!({ "weight_in_pounds": pounds }).to_string();
            let predicted = call(state.clone(), json_headers(), &body).await.unwrap();

            let expected_kg = pounds * 0.453592;
            assert_eq!(model.last_input(), expected_kg);
            assert_eq!(predicted, expected_kg + 1.0);
            assert!((model.last_input() / 0.453592 - pounds).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_predict_accepts_numeric_string() {
        let state = ModelState::ready(RecordingModel::default());
        let predicted = call(state, json_headers(), r#"{"weight_in_pounds": " 150 "}"#)
            .await
            .unwrap();
        assert!((predicted - 69.0388).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predict_without_model() {
        let state: ModelState<RecordingModel> = ModelState::Degraded;
        for body in [r#"{"weight_in_pounds": 150}"#, "garbage", "{}"] {
            let err = call(state.clone(), json_headers(), body).await.unwrap_err();
            assert_eq!(err, PredictError::ModelNotFound);
        }
        let response = PredictError::ModelNotFound.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_predict_rejects_non_json() {
        let state = ModelState::ready(RecordingModel::default());

        let err = call(state.clone(), json_headers(), "{not json")
            .await
            .unwrap_err();
        assert_eq!(err, PredictError::InvalidInput);

        let err = call(state, HeaderMap::new(), r#"{"weight_in_pounds": 150}"#)
            .await
            .unwrap_err();
        assert_eq!(err, PredictError::InvalidInput);
    }

    #[tokio::test]
    async fn test_predict_missing_key_regardless_of_payload() {
        let state = ModelState::ready(RecordingModel::default());
        for body in [
            "{}",
            r#"{"weight_in_kg": 70}"#,
            r#"{"weight": 150, "unit": "lbs"}"#,
            "[150]",
            "150",
            "null",
        ] {
            let err = call(state.clone(), json_headers(), body).await.unwrap_err();
            assert_eq!(err, PredictError::MissingWeight, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_predict_rejects_non_numeric_weight() {
        let state = ModelState::ready(RecordingModel::default());
        for body in [
            r#"{"weight_in_pounds": "heavy"}"#,
            r#"{"weight_in_pounds": null}"#,
            r#"{"weight_in_pounds": [150]}"#,
            r#"{"weight_in_pounds": true}"#,
            r#"{"weight_in_pounds": "inf"}"#,
            r#"{"weight_in_pounds": 1e400}"#,
            r#"{"weight_in_pounds": -1e400}"#,
        ] {
            let err = call(state.clone(), json_headers(), body).await.unwrap_err();
            assert_eq!(err, PredictError::InvalidWeight, "body: {}", body);
        }
    }

    struct DivergingModel;

    impl ModelService for DivergingModel {
        fn predict(&self, _weight_in_kg: f64) -> f64 {
            f64::NAN
        }
    }

    #[tokio::test]
    async fn test_non_finite_prediction_is_a_server_error() {
        let result = predict(
            State(ModelState::ready(DivergingModel)),
            json_headers(),
            Ok(Bytes::from_static(br#"{"weight_in_pounds": 150}"#)),
        )
        .await;

        let err = result.err().unwrap();
        assert_eq!(err, PredictError::PredictionFailed);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_statuses() {
        for (err, status) in [
            (PredictError::ModelNotFound, StatusCode::INTERNAL_SERVER_ERROR),
            (PredictError::InvalidInput, StatusCode::BAD_REQUEST),
            (PredictError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (PredictError::MissingWeight, StatusCode::BAD_REQUEST),
            (PredictError::InvalidWeight, StatusCode::BAD_REQUEST),
        ] {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_messages_are_distinguishable() {
        assert_eq!(
            PredictError::InvalidInput.to_string(),
            "Invalid input. Please send a JSON payload."
        );
        assert_eq!(
            PredictError::MissingWeight.to_string(),
            "Missing 'weight_in_pounds' key in JSON payload."
        );
        assert_ne!(
            PredictError::InvalidInput.to_string(),
            PredictError::MissingWeight.to_string()
        );
    }

    #[test]
    fn test_json_content_type_variants() {
        let mut headers = HeaderMap::new();
        for (value, expected) in [
            ("application/json", true),
            ("application/json; charset=utf-8", true),
            ("Application/JSON", true),
            ("application/vnd.api+json", true),
            ("text/plain", false),
            ("application/x-www-form-urlencoded", false),
        ] {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
            assert_eq!(has_json_content_type(&headers), expected, "{}", value);
        }
    }
}
