mod routes;

pub mod config;
pub mod model_service;
pub mod model_store;
pub mod regression;
pub mod server;
pub mod training;

pub use server::start_server;
