mod prediction;

pub mod app;
pub mod camera;
pub mod config;
pub mod feature;
pub mod landmarks;
pub mod pose_detector;

pub use app::start_app;
