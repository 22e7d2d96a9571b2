use crate::{
    config::{ModelConfig, TrainingConfig},
    model_store::{ModelArtifact, ModelStoreError},
    regression::{LinearRegression, RegressionError},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::{io, path::Path};
use thiserror::Error;
use weight_proto::pounds_to_kg;

const INPUT_COLUMN: &str = "input";
const OUTPUT_COLUMN: &str = "output";

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Failed to read dataset: {0}")]
    Read(#[from] io::Error),
    #[error("Dataset is empty")]
    Empty,
    #[error("Dataset header has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("Line {line}: expected a number in column '{column}', got {value:?}")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("Dataset has {0} rows, at least 3 are needed to train and evaluate")]
    NotEnoughRows(usize),
    #[error("Fitting failed: {0}")]
    Fit(#[from] RegressionError),
    #[error("Saving the model failed: {0}")]
    Store(#[from] ModelStoreError),
}

/// One dataset row with the input already in kilograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub input_kg: f64,
    pub output_kg: f64,
}

pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, TrainingError> {
    let content = std::fs::read_to_string(path)?;
    parse_dataset(&content)
}

/// Parses CSV with a header naming `input` (pounds) and `output`
/// (kilograms). Other columns are ignored and blank lines skipped.
pub fn parse_dataset(content: &str) -> Result<Vec<Sample>, TrainingError> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(TrainingError::Empty)?;
    let columns: Vec<&str> = header.split(',').map(clean_cell).collect();
    let position = |name: &'static str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or(TrainingError::MissingColumn(name))
    };
    let input_idx = position(INPUT_COLUMN)?;
    let output_idx = position(OUTPUT_COLUMN)?;

    lines
        .map(|(index, line)| {
            let cells: Vec<&str> = line.split(',').map(clean_cell).collect();
            let read = |idx: usize, column: &'static str| {
                let raw = cells.get(idx).copied().unwrap_or_default();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| TrainingError::InvalidValue {
                        line: index + 1,
                        column,
                        value: raw.to_string(),
                    })
            };
            Ok(Sample {
                input_kg: pounds_to_kg(read(input_idx, INPUT_COLUMN)?),
                output_kg: read(output_idx, OUTPUT_COLUMN)?,
            })
        })
        .collect()
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"')
}

/// Seeded shuffle, then the first `ceil(n * test_fraction)` rows form the
/// test set.
pub fn train_test_split(
    mut samples: Vec<Sample>,
    test_fraction: f64,
    seed: u64,
) -> (Vec<Sample>, Vec<Sample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let n_test = ((samples.len() as f64) * test_fraction).ceil() as usize;
    let train = samples.split_off(n_test.min(samples.len()));
    (train, samples)
}

pub fn train(
    samples: Vec<Sample>,
    config: &TrainingConfig,
) -> Result<ModelArtifact, TrainingError> {
    let total = samples.len();
    let (train_set, test_set) = train_test_split(samples, config.test_fraction, config.seed);
    if train_set.len() < 2 || test_set.is_empty() {
        return Err(TrainingError::NotEnoughRows(total));
    }

    let (train_x, train_y) = columns(&train_set);
    let model = LinearRegression::fit(&train_x, &train_y)?;

    let (test_x, test_y) = columns(&test_set);
    let metrics = model.evaluate(&test_x, &test_y);

    tracing::info!("Mean Squared Error: {}", metrics.mse);
    match metrics.r2 {
        Some(r2) => tracing::info!("R² Score: {}", r2),
        None => tracing::warn!("R² Score undefined, test targets are constant"),
    }

    Ok(ModelArtifact {
        model,
        metrics,
        samples: train_set.len(),
    })
}

fn columns(samples: &[Sample]) -> (Vec<f64>, Vec<f64>) {
    samples.iter().map(|s| (s.input_kg, s.output_kg)).unzip()
}

pub fn train_and_save(
    training: &TrainingConfig,
    model: &ModelConfig,
) -> Result<ModelArtifact, TrainingError> {
    let samples = load_dataset(&training.dataset)?;
    tracing::info!(
        "Loaded {} rows from {:?}",
        samples.len(),
        training.dataset
    );

    let artifact = train(samples, training)?;
    let path = model.get_path();
    artifact.save(&path)?;
    tracing::info!("Model saved as {:?}", path);

    Ok(artifact)
}
