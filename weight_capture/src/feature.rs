use crate::{
    config::FeatureConfig,
    landmarks::{BodyLandmark, LandmarkSet},
};

/// Turns the shoulder to ankle span into a naive weight estimate in kg.
/// The number is illustrative only, it is not calibrated against anything.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDeriver {
    scale: f64,
}

impl FeatureDeriver {
    pub const FROM: BodyLandmark = BodyLandmark::LeftShoulder;
    pub const TO: BodyLandmark = BodyLandmark::LeftAnkle;

    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            scale: config.scale,
        }
    }

    /// `None` when either landmark is missing from the set.
    pub fn estimate_kg(&self, landmarks: &LandmarkSet) -> Option<f64> {
        let from = landmarks.get(Self::FROM)?;
        let to = landmarks.get(Self::TO)?;
        Some(from.distance_to(to) * self.scale)
    }
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new(&FeatureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    fn body() -> LandmarkSet {
        LandmarkSet::new()
            .with(BodyLandmark::LeftShoulder, Landmark::new(0.4, 0.2, 0.9))
            .with(BodyLandmark::LeftAnkle, Landmark::new(0.4, 0.9, 0.8))
    }

    #[test]
    fn test_estimate_scales_distance() {
        let estimate = FeatureDeriver::default().estimate_kg(&body()).unwrap();
        assert!((estimate - 70.0).abs() < 1e-4);

        let doubled = FeatureDeriver::new(&FeatureConfig { scale: 200.0 })
            .estimate_kg(&body())
            .unwrap();
        assert!((doubled - 2.0 * estimate).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_uses_both_axes() {
        let set = LandmarkSet::new()
            .with(BodyLandmark::LeftShoulder, Landmark::new(0.1, 0.1, 1.0))
            .with(BodyLandmark::LeftAnkle, Landmark::new(0.4, 0.5, 1.0));
        let estimate = FeatureDeriver::default().estimate_kg(&set).unwrap();
        assert!((estimate - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_landmark_yields_nothing() {
        let deriver = FeatureDeriver::default();
        assert_eq!(deriver.estimate_kg(&LandmarkSet::new()), None);

        let shoulder_only = LandmarkSet::new()
            .with(BodyLandmark::LeftShoulder, Landmark::new(0.4, 0.2, 0.9))
            .with(BodyLandmark::RightAnkle, Landmark::new(0.6, 0.9, 0.9));
        assert_eq!(deriver.estimate_kg(&shoulder_only), None);

        let ankle_only = LandmarkSet::new()
            .with(BodyLandmark::LeftAnkle, Landmark::new(0.4, 0.9, 0.9));
        assert_eq!(deriver.estimate_kg(&ankle_only), None);
    }
}
