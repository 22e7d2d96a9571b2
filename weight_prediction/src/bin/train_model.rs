use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weight_prediction::{config, training::train_and_save};

fn main() -> anyhow::Result<()> {
    let config = config::get_configuration().expect("failed to load config");
    let log_level = config.log_level.as_str();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_level(true))
        .init();

    let artifact = train_and_save(&config.training, &config.model)?;
    tracing::info!(
        "Trained on {} samples: coefficient={} intercept={}",
        artifact.samples,
        artifact.model.coefficient,
        artifact.model.intercept
    );

    Ok(())
}
