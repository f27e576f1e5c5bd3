//! CSV parsing utilities

use anyhow::Result;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRecord {
    pub fields: Vec<String>,
}

/// Parse the data rows (header skipped) of a CSV stream with a known delimiter.
///
/// Returns at most `limit` records together with the total number of data rows.
pub fn parse_csv_rows<R: Read>(
    reader: R,
    delimiter: char,
    limit: usize,
) -> Result<(Vec<CsvRecord>, usize)> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| anyhow::anyhow!("Delimiter {:?} is not a single byte", delimiter))?;

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut total = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        total += 1;
        if records.len() < limit {
            let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            records.push(CsvRecord { fields });
        }
    }

    Ok((records, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_respect_limit_and_count() {
        let data = "city;zip\nParis;75001\nLyon;69001\nNice;06000\n";
        let (rows, total) = parse_csv_rows(data.as_bytes(), ';', 2).unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields, vec!["Lyon", "69001"]);
    }

    #[test]
    fn test_ragged_rows_are_accepted() {
        let data = "a,b,c\n1,2\n1,2,3,4\n";
        let (rows, total) = parse_csv_rows(data.as_bytes(), ',', 10).unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows[0].fields.len(), 2);
        assert_eq!(rows[1].fields.len(), 4);
    }
}
