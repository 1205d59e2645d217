//! Ошибки конвейера подготовки данных

use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Низкоуровневые ошибки работы с таблицами, конфигом
/// и моделями
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Column '{column}' has missing values")]
    MissingValues { column: String },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Model fitting failed: {0}")]
    Model(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl DataError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Этап конвейера, на котором произошла ошибка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Preprocess,
    Balance,
    FeatureSelection,
    Save,
    Pipeline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Preprocess => "preprocess",
            Stage::Balance => "balance",
            Stage::FeatureSelection => "feature selection",
            Stage::Save => "save",
            Stage::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

/// Единая ошибка этапа: сообщение, исходная причина и место,
/// где она поднята
#[derive(Debug, Error)]
#[error("{message} [{stage} stage, {location}]")]
pub struct PipelineError {
    stage: Stage,
    message: String,
    location: &'static Location<'static>,
    #[source]
    source: BoxError,
}

impl PipelineError {
    #[track_caller]
    pub fn new(stage: Stage, message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            message: message.into(),
            location: Location::caller(),
            source: source.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Первая `DataError` в цепочке причин
    pub fn data_error(&self) -> Option<&DataError> {
        let root: &(dyn std::error::Error + 'static) = self.source.as_ref();
        let mut current = Some(root);
        while let Some(err) = current {
            if let Some(data) = err.downcast_ref::<DataError>() {
                return Some(data);
            }
            current = err.source();
        }
        None
    }

    /// Этап, где ошибка возникла впервые
    /// (самая глубокая `PipelineError`)
    pub fn root_stage(&self) -> Stage {
        match self.source.downcast_ref::<PipelineError>() {
            Some(inner) => inner.root_stage(),
            None => self.stage,
        }
    }
}
