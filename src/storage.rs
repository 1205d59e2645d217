//! Чтение и запись CSV

use std::fs::{self, File};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::DataError;
use crate::types::{Column, ColumnData, DataFrame};

/// Читает CSV с заголовком. Столбец числовой, если каждая непустая ячейка
/// разбирается как f64; пустые числовые ячейки становятся NaN.
/// Пустой заголовок (индекс, сохраненный pandas) получает имя `Unnamed: <i>`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (j, field) in record.iter().enumerate() {
            raw[j].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column {
            name,
            data: infer_column(cells),
        })
        .collect();

    DataFrame::new(columns)
}

fn infer_column(cells: Vec<String>) -> ColumnData {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|cell| {
            let cell = cell.trim();
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();

    match parsed {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Categorical(cells),
    }
}

/// Пишет фрейм в CSV без столбца индекса, перезаписывая файл
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut writer = WriterBuilder::new().from_writer(file);

    writer.write_record(df.column_names())?;
    for row in 0..df.nrows() {
        writer.write_record(df.columns().iter().map(|c| c.data.display(row)))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_infers_types_and_names_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ",Booking_ID,lead_time,market_segment_type").unwrap();
        writeln!(file, "0,INN00001,224,Offline").unwrap();
        writeln!(file, "1,INN00002,,Online").unwrap();

        let df = read_csv(file.path()).unwrap();
        assert_eq!(
            df.column_names(),
            vec!["Unnamed: 0", "Booking_ID", "lead_time", "market_segment_type"]
        );
        assert!(df.column("Unnamed: 0").unwrap().data.is_numeric());
        assert!(!df.column("Booking_ID").unwrap().data.is_numeric());
        let lead = df.numeric("lead_time").unwrap();
        assert_eq!(lead[0], 224.0);
        assert!(lead[1].is_nan());
    }

    #[test]
    fn test_write_csv_has_no_index_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let df = DataFrame::new(vec![
            Column::numeric("a", vec![1.5, 2.0]),
            Column::categorical("b", vec!["x", "y"]),
        ])
        .unwrap();

        write_csv(&df, &path).unwrap();
        write_csv(&df, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a,b\n1.5,x\n2,y\n");
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let err = read_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains("not/here.csv"));
    }
}
