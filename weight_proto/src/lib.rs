//! Wire contract shared by the prediction service and its clients.

mod classification;
mod client;
mod messages;
mod units;

pub use classification::WeightClass;
pub use client::{ClientError, PredictionClient, PredictionReply};
pub use messages::{ErrorResponse, PredictionRequest, PredictionResponse, WEIGHT_FIELD};
pub use units::{kg_to_pounds, pounds_to_kg, POUNDS_TO_KG};
