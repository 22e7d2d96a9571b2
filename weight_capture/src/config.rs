use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub prediction_service: PredictionServiceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    pub landmarks: LandmarkModelConfig,
    #[serde(default)]
    pub feature: FeatureConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionServiceConfig {
    pub host: String,
    #[serde(default = "default_service_port")]
    pub port: u16,
    #[serde(default = "default_predict_path")]
    pub path: String,
}

fn default_service_port() -> u16 {
    5001
}

fn default_predict_path() -> String {
    "/predict".into()
}

impl PredictionServiceConfig {
    pub fn get_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct CameraConfig {
    #[serde(default)]
    pub device_index: i32,
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_quit_key")]
    pub quit_key: char,
}

fn default_window_title() -> String {
    "Webcam - Press \"q\" to Quit".into()
}

fn default_quit_key() -> char {
    'q'
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            window_title: default_window_title(),
            quit_key: default_quit_key(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LandmarkModelConfig {
    pub model_dir: PathBuf,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_model_file() -> String {
    "movenet_singlepose_lightning.onnx".into()
}

fn default_min_confidence() -> f32 {
    0.3
}

fn default_input_name() -> String {
    "serving_default_input_0".into()
}

fn default_output_name() -> String {
    "StatefulPartitionedCall_0".into()
}

impl LandmarkModelConfig {
    pub fn get_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }
}

impl Validatable for LandmarkModelConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "landmarks.min_confidence must be within [0, 1], got {}",
                self.min_confidence
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeatureConfig {
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    100.0
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

impl Validatable for FeatureConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("feature.scale must be positive, got {}", self.scale));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "{} is not a supported minimum log level. Use either `debug` or `info`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            config::Environment::with_prefix("WC")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Config>()?;

    for result in [settings.landmarks.validate(), settings.feature.validate()] {
        if let Err(e) = result {
            tracing::error!("Configuration validation failed: {}", e);
            return Err(config::ConfigError::Message(e));
        }
    }

    Ok(settings)
}
