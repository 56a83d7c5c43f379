/// One reconciled station-year table: named columns plus string rows.
///
/// Column values stay untyped; the pipeline repairs and merges schemas,
/// it does not interpret measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StationTable {
    /// Invariant: every row has exactly `columns.len()` fields.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a column holding the same value in every row
    pub fn push_constant_column(&mut self, name: &str, value: &str) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }

    /// Remove every column whose name satisfies the predicate. Absent
    /// names are simply not matched; this never fails.
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| keep(name))
            .map(|(i, _)| i)
            .collect();

        if kept.len() == self.columns.len() {
            return;
        }

        self.columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = kept.iter().map(|&i| row[i].clone()).collect();
        }
    }

    /// Remove the named columns by exact match, tolerating absences
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.retain_columns(|col| !names.contains(&col));
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Append rows from a table with an identical column set
    pub fn append_rows(&mut self, rows: Vec<Vec<String>>) {
        debug_assert!(rows.iter().all(|r| r.len() == self.columns.len()));
        self.rows.extend(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> StationTable {
        StationTable::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![
                vec!["1".to_string(), "2".to_string(), "3".to_string()],
                vec!["4".to_string(), "5".to_string(), "6".to_string()],
            ],
        )
    }

    #[test]
    fn test_push_constant_column() {
        let mut table = sample();
        table.push_constant_column("year", "2005");
        assert_eq!(table.columns().last().unwrap(), "year");
        assert!(table.rows().iter().all(|r| r.last().unwrap() == "2005"));
    }

    #[test]
    fn test_drop_columns_tolerates_absent_names() {
        let mut table = sample();
        table.drop_columns(&["b", "not_present"]);
        assert_eq!(table.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(table.rows()[0], vec!["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_drop_no_columns_is_noop() {
        let mut table = sample();
        table.drop_columns(&["zzz"]);
        assert_eq!(table, sample());
    }
}
