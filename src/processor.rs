//! Конвейер подготовки данных: загрузка, очистка, кодирование, коррекция
//! асимметрии, балансировка, отбор признаков, сохранение

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, info_span, Span};

use crate::config::{EncodingPolicy, PipelineConfig};
use crate::error::{BoxError, DataError, PipelineError, Stage};
use crate::models::{balance_frame, FeatureImportance, FeatureSelector, RandomForest, Smote};
use crate::paths::{PROCESSED_TEST_FILE, PROCESSED_TRAIN_FILE};
use crate::preprocessing::{Cleaner, LabelEncoder, LabelMapping, SkewCorrector};
use crate::storage::{read_csv, write_csv};
use crate::types::DataFrame;

/// Итог прогона конвейера
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_shape: (usize, usize),
    pub test_shape: (usize, usize),
    pub selected_features: Vec<String>,
}

pub struct DataProcessor {
    train_path: PathBuf,
    test_path: PathBuf,
    processed_dir: PathBuf,
    config: PipelineConfig,
    span: Span,
}

impl DataProcessor {
    /// Читает конфиг и сразу создает каталог для результатов
    pub fn new(
        train_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        config_path: impl AsRef<Path>,
    ) -> Result<Self, PipelineError> {
        let config_path = config_path.as_ref();
        let config = PipelineConfig::load(config_path).map_err(|e| {
            error!(path = %config_path.display(), error = %e, "Failed to load config");
            PipelineError::new(Stage::Load, "Error while loading config", e)
        })?;
        Self::with_config(train_path, test_path, processed_dir, config)
    }

    pub fn with_config(
        train_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(|e| {
            error!(error = %e, "Invalid configuration");
            PipelineError::new(Stage::Load, "Invalid configuration", e)
        })?;

        let processed_dir = processed_dir.into();
        let span = info_span!("data_processor", processed_dir = %processed_dir.display());

        if !processed_dir.exists() {
            fs::create_dir_all(&processed_dir).map_err(|e| {
                let e = DataError::io(&processed_dir, e);
                error!(error = %e, "Failed to create output directory");
                PipelineError::new(Stage::Save, "Error while creating output directory", e)
            })?;
        }

        Ok(Self {
            train_path: train_path.into(),
            test_path: test_path.into(),
            processed_dir,
            config,
            span,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    #[track_caller]
    fn fail(stage: Stage, message: &str, err: impl Into<BoxError> + Display) -> PipelineError {
        error!(stage = %stage, error = %err, "{}", message);
        PipelineError::new(stage, message, err)
    }

    pub fn load_data(&self, path: &Path) -> Result<DataFrame, PipelineError> {
        let _enter = self.span.enter();
        let df = read_csv(path)
            .map_err(|e| Self::fail(Stage::Load, "Error while loading data", e))?;
        info!(path = %path.display(), rows = df.nrows(), columns = df.ncols(), "Data loaded");
        Ok(df)
    }

    /// Очистка, кодирование категорий и коррекция асимметрии
    pub fn preprocess_data(&self, df: DataFrame) -> Result<DataFrame, PipelineError> {
        self.preprocess_with(df, None).map(|(df, _)| df)
    }

    /// То же, что `preprocess_data`; при `fitted` категории кодируются
    /// готовыми словарями вместо построения новых
    pub fn preprocess_with(
        &self,
        df: DataFrame,
        fitted: Option<&[LabelMapping]>,
    ) -> Result<(DataFrame, Vec<LabelMapping>), PipelineError> {
        let _enter = self.span.enter();
        self.try_preprocess(df, fitted)
            .map_err(|e| Self::fail(Stage::Preprocess, "Error while preprocessing data", e))
    }

    fn try_preprocess(
        &self,
        mut df: DataFrame,
        fitted: Option<&[LabelMapping]>,
    ) -> Result<(DataFrame, Vec<LabelMapping>), DataError> {
        let dp = &self.config.data_processing;
        info!("Start point for data processing");

        info!(columns = ?dp.drop_columns, "Dropping the columns");
        let removed = Cleaner::new(dp.drop_columns.clone()).clean(&mut df)?;
        info!(duplicates = removed, rows = df.nrows(), "Dropped duplicate rows");

        info!("Applying label encoding");
        let mappings = match fitted {
            Some(mappings) => {
                for mapping in mappings {
                    LabelEncoder::transform(&mut df, mapping)?;
                }
                mappings.to_vec()
            }
            None => LabelEncoder::fit_transform(&mut df, &dp.categorical_columns)?,
        };
        info!("Label mapping:");
        for mapping in &mappings {
            info!("{}: {}", mapping.column, mapping.to_json());
        }

        info!(threshold = dp.skewness_threshold, policy = ?dp.policy.skew, "Skewness handling");
        let corrector = SkewCorrector::new(dp.skewness_threshold, dp.policy.skew);
        let transformed = corrector.apply(&mut df, &dp.numerical_columns)?;
        if transformed.is_empty() {
            info!("No column exceeds the skewness threshold");
        }

        Ok((df, mappings))
    }

    pub fn balance_data(&self, df: &DataFrame) -> Result<DataFrame, PipelineError> {
        let _enter = self.span.enter();
        let dp = &self.config.data_processing;
        info!("Handling imbalanced data");

        let smote = Smote::new(dp.k_neighbors, dp.random_state);
        let (balanced, n_synthetic) = balance_frame(df, &dp.target_column, &smote)
            .map_err(|e| Self::fail(Stage::Balance, "Error while balancing data", e))?;

        info!(synthetic = n_synthetic, rows = balanced.nrows(), "Data balanced successfully");
        Ok(balanced)
    }

    pub fn feature_selection(&self, df: &DataFrame) -> Result<DataFrame, PipelineError> {
        self.rank_and_select(df).map(|(df, _)| df)
    }

    /// Отбор признаков вместе с полной таблицей важностей
    pub fn rank_and_select(
        &self,
        df: &DataFrame,
    ) -> Result<(DataFrame, Vec<FeatureImportance>), PipelineError> {
        let _enter = self.span.enter();
        let dp = &self.config.data_processing;
        info!("Starting feature selection");

        let forest = RandomForest::new(dp.n_estimators, dp.random_state)
            .with_max_features(dp.max_features)
            .with_max_depth(dp.max_depth);
        let mut selector = FeatureSelector::new(forest, dp.no_of_features);
        let (selected, ranking) = selector
            .select(df, &dp.target_column)
            .map_err(|e| Self::fail(Stage::FeatureSelection, "Error while selecting features", e))?;

        let top: Vec<&str> = ranking
            .iter()
            .take(dp.no_of_features)
            .map(|f| f.feature.as_str())
            .collect();
        info!(n = top.len(), features = ?top, "Top features selected");
        info!("Feature selection completed successfully");
        Ok((selected, ranking))
    }

    /// Приводит test к столбцам train (тот же набор и порядок)
    pub fn align_columns(
        &self,
        test: &DataFrame,
        train: &DataFrame,
    ) -> Result<DataFrame, PipelineError> {
        let _enter = self.span.enter();
        test.select(&train.column_names()).map_err(|e| {
            Self::fail(Stage::FeatureSelection, "Error while aligning test columns", e)
        })
    }

    pub fn save_data(&self, df: &DataFrame, path: &Path) -> Result<(), PipelineError> {
        let _enter = self.span.enter();
        info!("Saving final data");
        write_csv(df, path).map_err(|e| Self::fail(Stage::Save, "Error while saving data", e))?;
        info!(path = %path.display(), "Data saved successfully");
        Ok(())
    }

    pub fn process(&self) -> Result<ProcessSummary, PipelineError> {
        let _enter = self.span.enter();
        self.run().map_err(|e| {
            error!(error = %e, "Error in preprocessing pipeline");
            PipelineError::new(Stage::Pipeline, "Error in preprocessing pipeline", e)
        })
    }

    fn run(&self) -> Result<ProcessSummary, PipelineError> {
        let policy = self.config.data_processing.policy;

        info!("Loading data from RAW directory");
        let train = self.load_data(&self.train_path)?;
        let test = self.load_data(&self.test_path)?;

        let (train, mappings) = self.preprocess_with(train, None)?;
        let fitted = match policy.encoding {
            EncodingPolicy::FitOnTrain => Some(mappings.as_slice()),
            EncodingPolicy::Independent => None,
        };
        let (test, _) = self.preprocess_with(test, fitted)?;

        let train = self.balance_data(&train)?;
        let test = if policy.balance_test {
            self.balance_data(&test)?
        } else {
            info!("Test split kept unbalanced");
            test
        };

        let (train, ranking) = self.rank_and_select(&train)?;
        let test = self.align_columns(&test, &train)?;

        let train_path = self.processed_dir.join(PROCESSED_TRAIN_FILE);
        let test_path = self.processed_dir.join(PROCESSED_TEST_FILE);
        self.save_data(&train, &train_path)?;
        self.save_data(&test, &test_path)?;

        info!("Data processing is done");

        let n = self.config.data_processing.no_of_features;
        Ok(ProcessSummary {
            train_path,
            test_path,
            train_shape: (train.nrows(), train.ncols()),
            test_shape: (test.nrows(), test.ncols()),
            selected_features: ranking.into_iter().take(n).map(|f| f.feature).collect(),
        })
    }
}
