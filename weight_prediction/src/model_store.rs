use crate::{
    model_service::ModelService,
    regression::{LinearRegression, Metrics},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
    sync::Arc,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelStoreError {
    #[error("Failed to read model artifact: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to write model artifact: {0}")]
    Write(#[source] io::Error),
    #[error("Model artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Model availability, fixed for the lifetime of the process.
pub enum ModelState<M: ModelService> {
    Ready(Arc<M>),
    Degraded,
}

impl<M: ModelService> Clone for ModelState<M> {
    fn clone(&self) -> Self {
        match self {
            ModelState::Ready(model) => ModelState::Ready(model.clone()),
            ModelState::Degraded => ModelState::Degraded,
        }
    }
}

impl<M: ModelService> ModelState<M> {
    pub fn ready(model: M) -> Self {
        ModelState::Ready(Arc::new(model))
    }

    pub fn model(&self) -> Option<&M> {
        match self {
            ModelState::Ready(model) => Some(model),
            ModelState::Degraded => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// On-disk form of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: LinearRegression,
    pub metrics: Metrics,
    pub samples: usize,
}

impl ModelArtifact {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ModelStoreError::Write)?;
        }
        let file = File::create(path).map_err(ModelStoreError::Write)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(ModelStoreError::Write)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelStoreError> {
        let file = File::open(path).map_err(ModelStoreError::Read)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Loads the artifact once at startup. A missing file degrades the service;
/// an unreadable or corrupt one is an error.
pub fn load_model_state<P: AsRef<Path>>(
    path: P,
) -> Result<ModelState<LinearRegression>, ModelStoreError> {
    let path = path.as_ref();
    match ModelArtifact::load(path) {
        Ok(artifact) => {
            tracing::info!(
                "Loaded model from {:?} (samples={}, mse={:.4}, r2={:?})",
                path,
                artifact.samples,
                artifact.metrics.mse,
                artifact.metrics.r2
            );
            Ok(ModelState::ready(artifact.model))
        }
        Err(ModelStoreError::Read(e)) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                "Model file {:?} not found. Train and save the model first.",
                path
            );
            Ok(ModelState::Degraded)
        }
        Err(e) => Err(e),
    }
}
