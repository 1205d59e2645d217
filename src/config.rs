//! Конфигурация подготовки данных (YAML)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_processing: DataProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProcessingConfig {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub skewness_threshold: f64,
    pub no_of_features: usize,

    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Индекс и идентификатор брони
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
    #[serde(default = "default_k_neighbors")]
    pub k_neighbors: usize,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default)]
    pub max_features: MaxFeatures,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_target_column() -> String {
    "booking_status".to_string()
}

fn default_drop_columns() -> Vec<String> {
    vec!["Unnamed: 0".to_string(), "Booking_ID".to_string()]
}

fn default_random_state() -> u64 { 42 }
fn default_k_neighbors() -> usize { 5 }
fn default_n_estimators() -> usize { 100 }

/// Размер случайного подпространства признаков для одного дерева
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxFeatures {
    Count(usize),
    Rule(FeatureRule),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureRule {
    Sqrt,
    Log2,
    All,
}

impl Default for MaxFeatures {
    fn default() -> Self {
        MaxFeatures::Rule(FeatureRule::Sqrt)
    }
}

impl MaxFeatures {
    /// Число признаков из `n_features`, всегда в диапазоне 1..=n_features
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let size = match self {
            MaxFeatures::Count(count) => *count,
            MaxFeatures::Rule(FeatureRule::Sqrt) => n.sqrt() as usize,
            MaxFeatures::Rule(FeatureRule::Log2) => n.log2() as usize,
            MaxFeatures::Rule(FeatureRule::All) => n_features,
        };
        size.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewPolicy {
    /// Логарифмируется только первый столбец выше порога
    #[default]
    FirstOnly,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingPolicy {
    /// train и test кодируются каждый по своим значениям
    #[default]
    Independent,
    /// Словари, построенные на train, применяются к test
    FitOnTrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub skew: SkewPolicy,
    #[serde(default)]
    pub encoding: EncodingPolicy,
    #[serde(default = "default_balance_test")]
    pub balance_test: bool,
}

fn default_balance_test() -> bool { true }

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            skew: SkewPolicy::default(),
            encoding: EncodingPolicy::default(),
            balance_test: default_balance_test(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, DataError> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        let dp = &self.data_processing;
        if dp.no_of_features == 0 {
            return Err(DataError::InvalidConfig("no_of_features must be positive".to_string()));
        }
        if dp.k_neighbors == 0 {
            return Err(DataError::InvalidConfig("k_neighbors must be positive".to_string()));
        }
        if dp.n_estimators == 0 {
            return Err(DataError::InvalidConfig("n_estimators must be positive".to_string()));
        }
        if !dp.skewness_threshold.is_finite() {
            return Err(DataError::InvalidConfig(
                "skewness_threshold must be a finite number".to_string(),
            ));
        }
        if dp.target_column.is_empty() {
            return Err(DataError::InvalidConfig("target_column must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
data_ingestion:
  bucket_name: "hotel-bookings"
  train_ratio: 0.8
data_processing:
  categorical_columns:
    - type_of_meal_plan
    - booking_status
  numerical_columns:
    - lead_time
  skewness_threshold: 5
  no_of_features: 10
"#;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = PipelineConfig::from_yaml(MINIMAL).unwrap();
        let dp = &config.data_processing;
        assert_eq!(dp.categorical_columns, vec!["type_of_meal_plan", "booking_status"]);
        assert_eq!(dp.skewness_threshold, 5.0);
        assert_eq!(dp.target_column, "booking_status");
        assert_eq!(dp.drop_columns, vec!["Unnamed: 0", "Booking_ID"]);
        assert_eq!(dp.random_state, 42);
        assert_eq!(dp.max_features, MaxFeatures::Rule(FeatureRule::Sqrt));
        assert_eq!(dp.policy, PolicyConfig::default());
        assert!(dp.policy.balance_test);
    }

    #[test]
    fn test_policies_and_max_features_parse() {
        let text = format!(
            "{}  max_features: 3\n  policy:\n    skew: all\n    \
             encoding: fit_on_train\n    balance_test: false\n",
            MINIMAL
        );
        let config = PipelineConfig::from_yaml(&text).unwrap();
        let dp = &config.data_processing;
        assert_eq!(dp.max_features, MaxFeatures::Count(3));
        assert_eq!(dp.policy.skew, SkewPolicy::All);
        assert_eq!(dp.policy.encoding, EncodingPolicy::FitOnTrain);
        assert!(!dp.policy.balance_test);

        let text = format!("{}  max_features: log2\n", MINIMAL);
        let config = PipelineConfig::from_yaml(&text).unwrap();
        assert_eq!(config.data_processing.max_features, MaxFeatures::Rule(FeatureRule::Log2));
    }

    #[test]
    fn test_zero_features_rejected() {
        let text = MINIMAL.replace("no_of_features: 10", "no_of_features: 0");
        assert!(matches!(
            PipelineConfig::from_yaml(&text),
            Err(DataError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = PipelineConfig::from_yaml(include_str!("../config/config.yaml")).unwrap();
        let dp = &config.data_processing;
        assert_eq!(dp.no_of_features, 10);
        assert_eq!(dp.categorical_columns.last().map(String::as_str), Some("booking_status"));
        assert_eq!(dp.policy.skew, SkewPolicy::FirstOnly);
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::default().resolve(16), 4);
        assert_eq!(MaxFeatures::Rule(FeatureRule::Log2).resolve(1), 1);
        assert_eq!(MaxFeatures::Count(50).resolve(8), 8);
        assert_eq!(MaxFeatures::Rule(FeatureRule::All).resolve(8), 8);
    }
}
