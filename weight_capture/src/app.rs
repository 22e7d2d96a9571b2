use crate::{
    camera::{draw_estimate, Camera, CameraError},
    config::Config,
    feature::FeatureDeriver,
    landmarks::LandmarkDetector,
    pose_detector::MoveNetDetector,
    prediction::report_estimate,
};
use opencv::core::Mat;
use std::error::Error;
use weight_proto::PredictionClient;

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let mut camera = match Camera::open(&config.camera) {
        Ok(camera) => camera,
        Err(e) => {
            tracing::error!("Error: Could not open webcam. {}", e);
            return Err(Box::new(e));
        }
    };

    let mut detector = match MoveNetDetector::new(&config.landmarks) {
        Ok(detector) => detector,
        Err(e) => {
            tracing::error!("Failed to initialize landmark detector: {}", e);
            return Err(Box::new(e));
        }
    };

    let deriver = FeatureDeriver::new(&config.feature);
    let client = PredictionClient::new(config.prediction_service.get_url());
    tracing::info!("Reporting estimates to {}", client.url());

    run_capture_loop(&mut camera, &mut detector, &deriver, &client).await?;

    tracing::info!("Capture loop stopped");
    Ok(())
}

/// Capture, detect, derive, report, render, poll for quit. Each step waits
/// for the previous one, including the round trip to the service.
pub async fn run_capture_loop<D: LandmarkDetector>(
    camera: &mut Camera,
    detector: &mut D,
    deriver: &FeatureDeriver,
    client: &PredictionClient,
) -> Result<(), CameraError> {
    loop {
        let Some(mut frame) = camera.capture_frame()? else {
            tracing::error!("Error: Failed to capture frame.");
            break;
        };

        process_frame(&mut frame, detector, deriver, client).await?;
        camera.show(&frame)?;

        if camera.quit_requested()? {
            tracing::info!("Quit key pressed");
            break;
        }
    }

    Ok(())
}

/// Runs one frame through the pipeline and returns the estimate, if any.
/// Detection misses and detector failures skip the frame.
pub async fn process_frame<D: LandmarkDetector>(
    frame: &mut Mat,
    detector: &mut D,
    deriver: &FeatureDeriver,
    client: &PredictionClient,
) -> Result<Option<f64>, CameraError> {
    let landmarks = match detector.process(frame) {
        Ok(Some(landmarks)) => landmarks,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::warn!("Landmark detection failed, skipping frame: {}", e);
            return Ok(None);
        }
    };

    let Some(estimate_kg) = deriver.estimate_kg(&landmarks) else {
        tracing::debug!("Shoulder or ankle not visible, skipping frame");
        return Ok(None);
    };

    draw_estimate(frame, estimate_kg)?;
    report_estimate(client, estimate_kg).await;

    Ok(Some(estimate_kg))
}
