//! Логирование в консоль и в дневной файл logs/log_<дата>.log

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::DataError;

pub fn log_file_name(date: NaiveDate) -> String {
    format!("log_{}.log", date.format("%Y-%m-%d"))
}

/// Уровень по умолчанию `info`, переопределяется через RUST_LOG.
/// Возвращает путь к файлу лога.
pub fn init(log_dir: impl AsRef<Path>) -> Result<PathBuf, DataError> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir).map_err(|e| DataError::io(log_dir, e))?;

    let path = log_dir.join(log_file_name(Local::now().date_naive()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| DataError::io(&path, e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| DataError::Logging(e.to_string()))?;

    Ok(path)
}
