use crate::{
    config::LandmarkModelConfig,
    landmarks::{BodyLandmark, DetectorError, Landmark, LandmarkDetector, LandmarkSet},
};
use ndarray::Array4;
use opencv::{
    core::{Mat, Size, Vec3f, CV_32FC3},
    imgproc,
    prelude::*,
};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::path::Path;

pub const MOVENET_INPUT_SIZE: i32 = 192;
const VALUES_PER_KEYPOINT: usize = 3;

/// Single-pose MoveNet run through ONNX Runtime.
pub struct MoveNetDetector {
    session: Session,
    input_name: String,
    output_name: String,
    min_confidence: f32,
}

impl MoveNetDetector {
    pub fn new(config: &LandmarkModelConfig) -> Result<Self, DetectorError> {
        let path = config.get_path();
        let session = Session::builder()
            .map_err(|e| load_failed(&path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_failed(&path, e))?
            .commit_from_file(&path)
            .map_err(|e| load_failed(&path, e))?;

        tracing::info!("Loaded landmark model from {:?}", path);

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            min_confidence: config.min_confidence,
        })
    }

    fn run_inference(&mut self, input: &Array4<f32>) -> Result<Vec<f32>, DetectorError> {
        let tensor = TensorRef::from_array_view(input.view())?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])?;
        let (_, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        Ok(data.to_vec())
    }
}

fn load_failed(path: &Path, e: impl std::fmt::Display) -> DetectorError {
    DetectorError::LoadFailed(format!("{}: {}", path.display(), e))
}

impl LandmarkDetector for MoveNetDetector {
    fn process(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>, DetectorError> {
        let input = preprocess(frame)?;
        let output = self.run_inference(&input)?;
        decode_keypoints(&output, self.min_confidence)
    }
}

/// BGR frame to a `[1, 192, 192, 3]` RGB float tensor with values in 0..=255.
pub fn preprocess(frame: &Mat) -> Result<Array4<f32>, DetectorError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(MOVENET_INPUT_SIZE, MOVENET_INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0, 0.0)?;

    let side = MOVENET_INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, side, side, 3));
    for y in 0..MOVENET_INPUT_SIZE {
        for x in 0..MOVENET_INPUT_SIZE {
            let pixel = float_mat.at_2d::<Vec3f>(y, x)?;
            for channel in 0..3 {
                tensor[[0, y as usize, x as usize, channel]] = pixel[channel];
            }
        }
    }

    Ok(tensor)
}

/// Reads MoveNet's `[1, 1, 17, 3]` output laid out as (y, x, confidence).
/// Keypoints under `min_confidence` are dropped; `None` if nothing remains.
pub fn decode_keypoints(
    output: &[f32],
    min_confidence: f32,
) -> Result<Option<LandmarkSet>, DetectorError> {
    let expected = BodyLandmark::COUNT * VALUES_PER_KEYPOINT;
    if output.len() != expected {
        return Err(DetectorError::InvalidOutput(format!(
            "expected {} values, got {}",
            expected,
            output.len()
        )));
    }

    let mut landmarks = LandmarkSet::new();
    for (kind, values) in BodyLandmark::ALL
        .iter()
        .zip(output.chunks_exact(VALUES_PER_KEYPOINT))
    {
        let (y, x, confidence) = (values[0], values[1], values[2]);
        if confidence >= min_confidence {
            landmarks.insert(*kind, Landmark::new(x, y, confidence));
        }
    }

    if landmarks.is_empty() {
        tracing::debug!("No landmarks above confidence {}", min_confidence);
        return Ok(None);
    }

    tracing::debug!("Detected {} landmarks", landmarks.len());
    Ok(Some(landmarks))
}
