/// Модели: балансировка классов и отбор признаков

pub mod balancing;
pub mod selection;

pub use balancing::{balance_frame, class_labels, Smote};
pub use selection::{FeatureImportance, FeatureSelector, RandomForest};
