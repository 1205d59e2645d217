//! Кодирование категориальных признаков целыми числами

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::types::{ColumnData, DataFrame};

/// Словарь столбца: код категории = индекс в `classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMapping {
    pub column: String,
    pub classes: Vec<String>,
}

impl LabelMapping {
    pub fn code(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }

    pub fn to_json(&self) -> String {
        let pairs: serde_json::Map<String, serde_json::Value> = self
            .classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), serde_json::Value::from(code)))
            .collect();
        serde_json::Value::Object(pairs).to_string()
    }
}

pub struct LabelEncoder;

impl LabelEncoder {
    /// Отсортированные уникальные значения: текст - лексикографически,
    /// числа - по величине
    pub fn fit(df: &DataFrame, column: &str) -> Result<LabelMapping, DataError> {
        let col = df.column(column)?;
        let classes = match &col.data {
            ColumnData::Categorical(values) => {
                let mut classes = values.clone();
                classes.sort();
                classes.dedup();
                classes
            }
            ColumnData::Numeric(values) => {
                let mut sorted = values.clone();
                sorted.sort_by(|a, b| a.total_cmp(b));
                sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
                sorted.iter().map(|v| v.to_string()).collect()
            }
        };

        Ok(LabelMapping {
            column: column.to_string(),
            classes,
        })
    }

    /// Заменяет столбец кодами из словаря
    pub fn transform(df: &mut DataFrame, mapping: &LabelMapping) -> Result<(), DataError> {
        let lookup: HashMap<&str, usize> = mapping
            .classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.as_str(), code))
            .collect();

        let col = df.column_mut(&mapping.column)?;
        let codes = (0..col.data.len())
            .map(|row| {
                let key = col.data.key(row);
                lookup
                    .get(key.as_str())
                    .map(|&code| code as f64)
                    .ok_or_else(|| DataError::UnknownCategory {
                        column: mapping.column.clone(),
                        value: key,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        col.data = ColumnData::Numeric(codes);
        Ok(())
    }

    pub fn fit_transform<S: AsRef<str>>(
        df: &mut DataFrame,
        columns: &[S],
    ) -> Result<Vec<LabelMapping>, DataError> {
        let mut mappings = Vec::with_capacity(columns.len());
        for column in columns {
            let mapping = Self::fit(df, column.as_ref())?;
            Self::transform(df, &mapping)?;
            mappings.push(mapping);
        }
        Ok(mappings)
    }
}
