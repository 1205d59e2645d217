//! Балансировка классов методом SMOTE

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DataError;
use crate::types::{Column, DataFrame};

/// Расстояние и индекс для частичной сортировки в куче
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

pub struct Resampled {
    pub x: Array2<f64>,
    pub y: Array1<i64>,
    pub n_synthetic: usize,
}

/// SMOTE: синтетические объекты между объектом миноритарного
/// класса и одним из его k ближайших соседей того же класса
pub struct Smote {
    k_neighbors: usize,
    seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self {
            k_neighbors: k_neighbors.max(1),
            seed,
        }
    }

    fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// k ближайших к `members[target]` среди `members`,
    /// сам объект исключен
    fn neighbours(
        x: &Array2<f64>,
        members: &[usize],
        target: usize,
        k: usize,
    ) -> Vec<usize> {
        let point = x.row(members[target]);
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

        for (pos, &row) in members.iter().enumerate() {
            if pos == target {
                continue;
            }
            let candidate = DistIdx(Self::distance(point, x.row(row)), pos);
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        let mut found: Vec<DistIdx> = heap.into_vec();
        found.sort();
        found.into_iter().map(|DistIdx(_, pos)| pos).collect()
    }

    /// Досэмплирует каждый класс до размера мажоритарного.
    /// Исходные строки идут первыми, синтетические - в конце.
    pub fn fit_resample(
        &self,
        x: &Array2<f64>,
        y: &Array1<i64>,
    ) -> Result<Resampled, DataError> {
        if x.nrows() != y.len() {
            return Err(DataError::Resample(format!(
                "{} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (row, &label) in y.iter().enumerate() {
            classes.entry(label).or_default().push(row);
        }
        if classes.len() < 2 {
            return Err(DataError::Resample("need at least 2 classes".to_string()));
        }

        let majority = classes.values().map(Vec::len).max().unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut synthetic: Vec<Vec<f64>> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();

        for (&label, members) in &classes {
            let n_to_generate = majority - members.len();
            if n_to_generate == 0 {
                continue;
            }
            if members.len() < 2 {
                return Err(DataError::Resample(format!(
                    "class {} has a single sample, cannot interpolate",
                    label
                )));
            }

            let k = self.k_neighbors.min(members.len() - 1);
            let mut cache: Vec<Option<Vec<usize>>> = vec![None; members.len()];

            for _ in 0..n_to_generate {
                let target = rng.gen_range(0..members.len());
                let neighbours = cache[target]
                    .get_or_insert_with(|| Self::neighbours(x, members, target, k));
                let neighbour = neighbours[rng.gen_range(0..neighbours.len())];
                let gap: f64 = rng.gen();

                let base = x.row(members[target]);
                let other = x.row(members[neighbour]);
                synthetic.push(
                    base.iter()
                        .zip(other.iter())
                        .map(|(&p, &q)| p + gap * (q - p))
                        .collect(),
                );
                synthetic_y.push(label);
            }
        }

        let n_original = x.nrows();
        let n_synthetic = synthetic.len();
        let result_x = Array2::from_shape_fn((n_original + n_synthetic, x.ncols()), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic[i - n_original][j]
            }
        });

        let mut all_y: Vec<i64> = y.to_vec();
        all_y.extend(synthetic_y);

        Ok(Resampled {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
        })
    }
}

/// Метки классов из целевого столбца (целые коды после кодирования)
pub fn class_labels(df: &DataFrame, target: &str) -> Result<Array1<i64>, DataError> {
    df.numeric(target)?
        .iter()
        .map(|&v| {
            if v.is_nan() {
                Err(DataError::MissingValues {
                    column: target.to_string(),
                })
            } else if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(DataError::Resample(format!(
                    "target column '{}' must hold integer class codes, found {}",
                    target, v
                )))
            }
        })
        .collect()
}

/// Балансирует фрейм: признаки в исходном порядке, целевой столбец
/// последним. Пропуски в признаках или цели - ошибка.
pub fn balance_frame(
    df: &DataFrame,
    target: &str,
    smote: &Smote,
) -> Result<(DataFrame, usize), DataError> {
    let features: Vec<&str> = df
        .column_names()
        .into_iter()
        .filter(|&c| c != target)
        .collect();
    let x = df.to_matrix(&features)?;
    let y = class_labels(df, target)?;

    let resampled = smote.fit_resample(&x, &y)?;

    let mut columns: Vec<Column> = features
        .iter()
        .enumerate()
        .map(|(j, name)| Column::numeric(*name, resampled.x.column(j).to_vec()))
        .collect();
    let labels: Vec<f64> = resampled.y.iter().map(|&c| c as f64).collect();
    columns.push(Column::numeric(target, labels));

    Ok((DataFrame::new(columns)?, resampled.n_synthetic))
}
