//! Коррекция асимметрии числовых признаков

use tracing::info;

use crate::config::SkewPolicy;
use crate::error::DataError;
use crate::types::DataFrame;

/// Выборочная асимметрия с поправкой на смещение (как `pandas.Series.skew`).
/// NaN пропускаются; меньше трех значений - NaN; константа - 0.
pub fn skewness(values: &[f64]) -> f64 {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = present.len() as f64;
    if n < 3.0 {
        return f64::NAN;
    }

    let mean = present.iter().sum::<f64>() / n;
    let m2 = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let m3 = present.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;

    if m2 < 1e-14 {
        return 0.0;
    }

    let g1 = m3 / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

pub struct SkewCorrector {
    threshold: f64,
    policy: SkewPolicy,
}

impl SkewCorrector {
    pub fn new(threshold: f64, policy: SkewPolicy) -> Self {
        Self { threshold, policy }
    }

    /// Применяет log(1 + x) к столбцам с асимметрией выше порога.
    /// Возвращает имена преобразованных столбцов.
    pub fn apply<S: AsRef<str>>(
        &self,
        df: &mut DataFrame,
        columns: &[S],
    ) -> Result<Vec<String>, DataError> {
        let mut candidates = Vec::new();
        for column in columns {
            let name = column.as_ref();
            let skew = skewness(df.numeric(name)?);
            info!(column = name, skewness = skew, "Column skewness");
            if skew > self.threshold {
                candidates.push(name.to_string());
            }
        }

        if let SkewPolicy::FirstOnly = self.policy {
            candidates.truncate(1);
        }

        for name in &candidates {
            let values = df.column_mut(name)?.as_numeric_mut()?;
            for v in values.iter_mut() {
                *v = v.ln_1p();
            }
            info!(column = name.as_str(), "Applied log1p transform");
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use approx::assert_relative_eq;

    fn skewed_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::numeric("lead_time", vec![1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 50.0]),
            Column::numeric(
                "avg_price_per_room",
                vec![90.0, 100.0, 110.0, 100.0, 95.0, 105.0, 100.0],
            ),
            Column::numeric(
                "no_of_previous_cancellations",
                vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 13.0],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_skewness_matches_pandas() {
        // pandas.Series([1, 2, 3, 10]).skew()
        assert_relative_eq!(skewness(&[1.0, 2.0, 3.0, 10.0]), 1.7636326, epsilon = 1e-6);
        assert_eq!(skewness(&[4.0, 4.0, 4.0]), 0.0);
        assert!(skewness(&[1.0, 2.0]).is_nan());
        assert_relative_eq!(
            skewness(&[1.0, f64::NAN, 2.0, 3.0, 10.0]),
            skewness(&[1.0, 2.0, 3.0, 10.0])
        );
    }

    #[test]
    fn test_first_only_transforms_single_column() {
        let mut df = skewed_frame();
        let corrector = SkewCorrector::new(0.5, SkewPolicy::FirstOnly);

        let changed = corrector
            .apply(&mut df, &["lead_time", "avg_price_per_room", "no_of_previous_cancellations"])
            .unwrap();

        assert_eq!(changed, vec!["lead_time"]);
        assert_relative_eq!(df.numeric("lead_time").unwrap()[6], 51.0_f64.ln());
        assert_eq!(df.numeric("no_of_previous_cancellations").unwrap()[6], 13.0);
    }

    #[test]
    fn test_all_policy_transforms_every_skewed_column() {
        let mut df = skewed_frame();
        let corrector = SkewCorrector::new(0.5, SkewPolicy::All);

        let changed = corrector
            .apply(&mut df, &["lead_time", "avg_price_per_room", "no_of_previous_cancellations"])
            .unwrap();

        assert_eq!(changed, vec!["lead_time", "no_of_previous_cancellations"]);
        assert_relative_eq!(df.numeric("no_of_previous_cancellations").unwrap()[6], 14.0_f64.ln());
        assert_eq!(df.numeric("avg_price_per_room").unwrap()[0], 90.0);
    }

    #[test]
    fn test_no_skewed_column_leaves_frame_unchanged() {
        let mut df = skewed_frame();
        let before = df.clone();
        let corrector = SkewCorrector::new(100.0, SkewPolicy::FirstOnly);

        assert!(corrector.apply(&mut df, &["lead_time"]).unwrap().is_empty());
        assert_eq!(df, before);
    }

    #[test]
    fn test_text_column_is_rejected() {
        let mut df =
            DataFrame::new(vec![Column::categorical("arrival", vec!["a", "b", "c"])]).unwrap();
        let corrector = SkewCorrector::new(0.5, SkewPolicy::All);
        assert!(matches!(corrector.apply(&mut df, &["arrival"]), Err(DataError::NotNumeric(_))));
    }
}
