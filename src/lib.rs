//! Hotel prep - подготовка данных для модели отмены бронирований

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod paths;
pub mod preprocessing;
pub mod processor;
pub mod storage;
pub mod types;

pub use config::PipelineConfig;
pub use error::{DataError, PipelineError, Stage};
pub use processor::{DataProcessor, ProcessSummary};
pub use types::*;
