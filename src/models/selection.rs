//! Отбор признаков по важности в случайном лесе

use std::collections::BTreeSet;

use linfa::prelude::*;
use linfa_tree::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::config::MaxFeatures;
use crate::error::DataError;
use crate::models::balancing::class_labels;
use crate::types::DataFrame;

/// Случайный лес из деревьев linfa: бутстрэп строк
/// и случайное подпространство признаков на каждое дерево
pub struct RandomForest {
    n_estimators: usize,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    seed: u64,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_features: MaxFeatures::default(),
            max_depth: None,
            seed,
            feature_importances: None,
        }
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<(), DataError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 || n_features == 0 {
            return Err(DataError::Model("empty training matrix".to_string()));
        }

        // linfa ждет метки 0..n_classes
        let classes: Vec<i64> = y
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let labels: Array1<usize> = y
            .iter()
            .map(|c| classes.binary_search(c).unwrap_or(0))
            .collect();

        let subspace = self.max_features.resolve(n_features);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut totals = Array1::<f64>::zeros(n_features);

        for _ in 0..self.n_estimators {
            let rows: Vec<usize> = (0..n_samples)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();
            let mut features = index::sample(&mut rng, n_features, subspace).into_vec();
            features.sort_unstable();

            let records = x.select(Axis(0), &rows).select(Axis(1), &features);
            let targets = labels.select(Axis(0), &rows);
            let dataset = Dataset::new(records, targets);

            let tree: DecisionTree<f64, usize> = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(self.max_depth)
                .fit(&dataset)
                .map_err(|e| DataError::Model(e.to_string()))?;

            // дерево без разбиений дает NaN
            let importance: Vec<f64> = tree
                .feature_importance()
                .into_iter()
                .map(|v| if v.is_finite() { v } else { 0.0 })
                .collect();
            let sum: f64 = importance.iter().sum();
            if sum <= 0.0 {
                continue;
            }
            for (&feature, value) in features.iter().zip(importance) {
                totals[feature] += value / sum;
            }
        }

        let total: f64 = totals.sum();
        if total > 0.0 {
            totals /= total;
        }
        self.feature_importances = Some(totals);
        Ok(())
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

pub struct FeatureSelector {
    forest: RandomForest,
    n_features: usize,
}

impl FeatureSelector {
    pub fn new(forest: RandomForest, n_features: usize) -> Self {
        Self { forest, n_features }
    }

    /// Важности всех признаков по убыванию
    /// (при равенстве - исходный порядок)
    pub fn rank(
        &mut self,
        df: &DataFrame,
        target: &str,
    ) -> Result<Vec<FeatureImportance>, DataError> {
        let features: Vec<&str> = df
            .column_names()
            .into_iter()
            .filter(|&c| c != target)
            .collect();
        let x = df.to_matrix(&features)?;
        let y = class_labels(df, target)?;

        self.forest.fit(&x, &y)?;
        let importances = self
            .forest
            .feature_importances()
            .ok_or_else(|| DataError::Model("forest not fitted".to_string()))?;

        let mut ranking: Vec<FeatureImportance> = features
            .iter()
            .zip(importances.iter())
            .map(|(name, &importance)| FeatureImportance {
                feature: name.to_string(),
                importance,
            })
            .collect();
        ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        Ok(ranking)
    }

    /// Фрейм из N самых важных признаков и целевого столбца
    pub fn select(
        &mut self,
        df: &DataFrame,
        target: &str,
    ) -> Result<(DataFrame, Vec<FeatureImportance>), DataError> {
        let ranking = self.rank(df, target)?;
        let mut columns: Vec<&str> = ranking
            .iter()
            .take(self.n_features)
            .map(|f| f.feature.as_str())
            .collect();
        columns.push(target);

        let selected = df.select(&columns)?;
        Ok((selected, ranking))
    }
}
