/// Стандартное расположение артефактов

pub const TRAIN_FILE_PATH: &str = "artifacts/raw/train.csv";
pub const TEST_FILE_PATH: &str = "artifacts/raw/test.csv";

pub const PROCESSED_DIR: &str = "artifacts/processed";
pub const PROCESSED_TRAIN_FILE: &str = "processed_train.csv";
pub const PROCESSED_TEST_FILE: &str = "processed_test.csv";

pub const CONFIG_PATH: &str = "config/config.yaml";
pub const LOG_DIR: &str = "logs";
