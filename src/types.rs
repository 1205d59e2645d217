/// Табличные данные: именованные столбцы, числовые или категориальные

use std::collections::HashSet;

use ndarray::Array2;
use serde::Serialize;

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    /// Текстовое представление ячейки для CSV (NaN -> пустая строка)
    pub fn display(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) => {
                let v = values[row];
                if v.is_nan() {
                    String::new()
                } else {
                    v.to_string()
                }
            }
            ColumnData::Categorical(values) => values[row].clone(),
        }
    }

    /// Ключ ячейки для сравнения строк и кодирования категорий
    pub fn key(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) => values[row].to_string(),
            ColumnData::Categorical(values) => values[row].clone(),
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(values) => values[row].is_nan(),
            ColumnData::Categorical(values) => values[row].is_empty(),
        }
    }

    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Categorical(values) => {
                ColumnData::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn as_numeric(&self) -> Result<&[f64], DataError> {
        match &self.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(DataError::NotNumeric(self.name.clone())),
        }
    }

    pub fn as_numeric_mut(&mut self) -> Result<&mut Vec<f64>, DataError> {
        match &mut self.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(DataError::NotNumeric(self.name.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let mut frame = Self::default();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column, DataError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], DataError> {
        self.column(name)?.as_numeric()
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), DataError> {
        if self.position(&column.name).is_some() {
            return Err(DataError::DuplicateColumn(column.name));
        }
        if !self.columns.is_empty() && column.data.len() != self.nrows() {
            return Err(DataError::LengthMismatch {
                column: column.name,
                expected: self.nrows(),
                actual: column.data.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Удаляет столбцы; отсутствие любого из них - ошибка, фрейм не меняется
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), DataError> {
        for name in names {
            self.column(name.as_ref())?;
        }
        self.columns
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        Ok(())
    }

    /// Удаляет полные дубликаты строк, сохраняя первое вхождение.
    /// Возвращает число удаленных строк.
    pub fn drop_duplicates(&mut self) -> usize {
        let n = self.nrows();
        let mut seen = HashSet::with_capacity(n);
        let keep: Vec<usize> = (0..n)
            .filter(|&row| {
                let key: Vec<String> = self.columns.iter().map(|c| c.data.key(row)).collect();
                seen.insert(key)
            })
            .collect();

        let removed = n - keep.len();
        if removed > 0 {
            *self = self.take_rows(&keep);
        }
        removed
    }

    pub fn take_rows(&self, rows: &[usize]) -> DataFrame {
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(rows),
                })
                .collect(),
        }
    }

    /// Новый фрейм из указанных столбцов в указанном порядке
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame, DataError> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        DataFrame::new(columns)
    }

    /// Матрица (строки x столбцы) из числовых столбцов.
    /// Пропуск (NaN) в любом из столбцов - ошибка.
    pub fn to_matrix<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Array2<f64>, DataError> {
        let columns = names
            .iter()
            .map(|name| {
                let values = self.numeric(name.as_ref())?;
                if values.iter().any(|v| v.is_nan()) {
                    return Err(DataError::MissingValues {
                        column: name.as_ref().to_string(),
                    });
                }
                Ok(values)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array2::from_shape_fn((self.nrows(), columns.len()), |(i, j)| {
            columns[j][i]
        }))
    }

    pub fn has_missing(&self) -> bool {
        let n = self.nrows();
        self.columns
            .iter()
            .any(|c| (0..n).any(|row| c.data.is_missing(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::numeric("a", vec![1.0, 2.0, 1.0, 3.0]),
            Column::categorical("b", vec!["x", "y", "x", "x"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut df = sample();
        assert_eq!(df.drop_duplicates(), 1);
        assert_eq!(df.nrows(), 3);
        assert_eq!(df.numeric("a").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_drop_missing_column_leaves_frame_untouched() {
        let mut df = sample();
        let err = df.drop_columns(&["a", "missing"]).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(name) if name == "missing"));
        assert_eq!(df.ncols(), 2);
    }

    #[test]
    fn test_push_column_checks_length() {
        let mut df = sample();
        let err = df.push_column(Column::numeric("c", vec![1.0])).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { expected: 4, actual: 1, .. }));
    }

    #[test]
    fn test_to_matrix_rejects_text() {
        let df = sample();
        assert!(matches!(df.to_matrix(&["b"]), Err(DataError::NotNumeric(_))));
        let m = df.to_matrix(&["a"]).unwrap();
        assert_eq!(m.shape(), &[4, 1]);
        assert_eq!(m[[3, 0]], 3.0);
    }

    #[test]
    fn test_to_matrix_rejects_missing_values() {
        let df = DataFrame::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("lead_time", vec![f64::NAN, 4.0]),
        ])
        .unwrap();
        assert!(matches!(
            df.to_matrix(&["a", "lead_time"]),
            Err(DataError::MissingValues { column }) if column == "lead_time"
        ));
        assert!(df.to_matrix(&["a"]).is_ok());
    }
}
