mod home;
mod predict;

use crate::{model_service::ModelService, model_store::ModelState};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use weight_proto::ErrorResponse;

pub fn api_routes<M: ModelService>() -> Router<ModelState<M>> {
    Router::new()
        .route("/", get(home::home))
        .route("/predict", post(predict::predict::<M>))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "The requested resource was not found. Please check the URL and try again.",
        )),
    )
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(
            "The method is not allowed for the requested URL.",
        )),
    )
}
