use opencv::core::Mat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to load landmark model: {0}")]
    LoadFailed(String),
    #[error("Failed to preprocess frame: {0}")]
    PreprocessFailed(#[from] opencv::Error),
    #[error("Landmark inference failed: {0}")]
    InferenceFailed(#[from] ort::Error),
    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),
}

/// Body keypoints in MoveNet output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyLandmark {
    pub const COUNT: usize = 17;

    pub const ALL: [BodyLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A keypoint in normalized [0, 1] image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Landmarks found in one frame. Absent entries were not detected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: [Option<Landmark>; BodyLandmark::COUNT],
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: BodyLandmark, landmark: Landmark) {
        self.points[kind.index()] = Some(landmark);
    }

    pub fn with(mut self, kind: BodyLandmark, landmark: Landmark) -> Self {
        self.insert(kind, landmark);
        self
    }

    pub fn get(&self, kind: BodyLandmark) -> Option<&Landmark> {
        self.points[kind.index()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.points.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }
}

/// Anything that can turn a frame into body landmarks. `Ok(None)` means no
/// body was found, which is not an error.
pub trait LandmarkDetector {
    fn process(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>, DetectorError>;
}
