//! Очистка сырых данных

use crate::error::DataError;
use crate::types::DataFrame;

pub struct Cleaner {
    drop_columns: Vec<String>,
}

impl Cleaner {
    pub fn new(drop_columns: Vec<String>) -> Self {
        Self { drop_columns }
    }

    /// Удаляет служебные столбцы и дубликаты строк.
    /// Возвращает число удаленных дубликатов.
    pub fn clean(&self, df: &mut DataFrame) -> Result<usize, DataError> {
        df.drop_columns(&self.drop_columns)?;
        Ok(df.drop_duplicates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn raw() -> DataFrame {
        DataFrame::new(vec![
            Column::numeric("Unnamed: 0", vec![0.0, 1.0, 2.0, 3.0]),
            Column::categorical("Booking_ID", vec!["INN1", "INN2", "INN3", "INN4"]),
            Column::numeric("lead_time", vec![10.0, 20.0, 10.0, 20.0]),
            Column::categorical(
                "room_type_reserved",
                vec!["Room_Type 1", "Room_Type 2", "Room_Type 1", "Room_Type 4"],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_clean_drops_ids_then_duplicates() {
        let mut df = raw();
        let cleaner = Cleaner::new(vec!["Unnamed: 0".into(), "Booking_ID".into()]);

        let removed = cleaner.clean(&mut df).unwrap();

        // строки различались только идентификаторами
        assert_eq!(removed, 1);
        assert_eq!(df.column_names(), vec!["lead_time", "room_type_reserved"]);
        assert_eq!(df.numeric("lead_time").unwrap(), &[10.0, 20.0, 20.0]);
        let mut copy = df.clone();
        assert_eq!(copy.drop_duplicates(), 0);
    }

    #[test]
    fn test_missing_fixed_column_is_error() {
        let mut df = raw();
        df.drop_columns(&["Booking_ID"]).unwrap();
        let cleaner = Cleaner::new(vec!["Unnamed: 0".into(), "Booking_ID".into()]);

        let err = cleaner.clean(&mut df).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(name) if name == "Booking_ID"));
    }
}
