//! services/trainer/src/bin/trainer.rs

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trainer_lib::{config::TrainerConfig, run, TrainError};

#[tokio::main]
async fn main() -> Result<(), TrainError> {
    let config = TrainerConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(?config, "Configuration loaded. Starting training...");

    let report = run(&config).await?;
    info!(
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        "Training complete. Test accuracy: {:.2}%",
        report.test_accuracy * 100.0
    );
    Ok(())
}
