/// Модуль предобработки данных

pub mod cleaning;
pub mod encoding;
pub mod skewness;

pub use cleaning::Cleaner;
pub use encoding::{LabelEncoder, LabelMapping};
pub use skewness::{skewness, SkewCorrector};
