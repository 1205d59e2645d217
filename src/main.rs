//! Запуск подготовки данных на стандартных путях артефактов

use anyhow::Result;

use hotel_prep::{logging, paths, DataProcessor};

fn main() -> Result<()> {
    let log_path = logging::init(paths::LOG_DIR)?;
    tracing::info!("Logging to {}", log_path.display());

    let processor = DataProcessor::new(
        paths::TRAIN_FILE_PATH,
        paths::TEST_FILE_PATH,
        paths::PROCESSED_DIR,
        paths::CONFIG_PATH,
    )?;
    let summary = processor.process()?;

    tracing::info!(
        "Processed train {:?} -> {}, test {:?} -> {}",
        summary.train_shape,
        summary.train_path.display(),
        summary.test_shape,
        summary.test_path.display()
    );
    tracing::info!("Selected features: {}", serde_json::to_string(&summary.selected_features)?);

    Ok(())
}
