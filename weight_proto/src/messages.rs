use crate::units::kg_to_pounds;
use serde::{Deserialize, Serialize};

/// Name of the unit-tagged field `/predict` requires.
pub const WEIGHT_FIELD: &str = "weight_in_pounds";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub weight_in_pounds: f64,
}

impl PredictionRequest {
    pub fn from_pounds(weight_in_pounds: f64) -> Self {
        Self { weight_in_pounds }
    }

    pub fn from_kilograms(weight_in_kg: f64) -> Self {
        Self {
            weight_in_pounds: kg_to_pounds(weight_in_kg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let body = serde_json::to_value(PredictionRequest::from_pounds(150.0)).unwrap();
        assert_eq!(body, serde_json::json!({ "weight_in_pounds": 150.0 }));
    }

    #[test]
    fn test_request_from_kilograms() {
        let request = PredictionRequest::from_kilograms(68.0388);
        assert!((request.weight_in_pounds - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_response_ignores_unknown_fields() {
        let response: PredictionResponse =
            serde_json::from_str(r#"{"predicted_weight": 71.25, "extra": true}"#).unwrap();
        assert_eq!(response.predicted_weight, 71.25);
    }
}
