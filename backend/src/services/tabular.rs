//! CSV codec for the tabular container the allocation core works on

use shared::{Cell, Table};

use crate::error::{AppError, AppResult};

const UTF8_BOM: char = '\u{feff}';

/// Parse an uploaded CSV file into a table.
///
/// The first record is the header row. Rows may be shorter or longer than the header;
/// empty fields become empty cells and everything else is kept as text.
pub fn read_table(bytes: &[u8], delimiter: u8, name: &str) -> AppResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches(UTF8_BOM).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::InvalidUpload(format!(
            "the {} file has no header row",
            name
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::text(field)
                    }
                })
                .collect(),
        );
    }

    tracing::debug!(table = name, columns = headers.len(), rows = rows.len(), "Parsed CSV upload");
    Ok(Table::new(headers, rows))
}

/// Serialize a table as CSV, header row first
pub fn write_table(table: &Table, delimiter: u8) -> AppResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(vec![]);

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_read_table_strips_bom_and_keeps_text() {
        let csv = "\u{feff}Item,DES NO CUSTOM,Delivery Quantity\n00010,Widget,8\n00020,,\n";
        let table = read_table(csv.as_bytes(), b',', "demand").unwrap();

        assert_eq!(table.headers, vec!["Item", "DES NO CUSTOM", "Delivery Quantity"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), &Cell::text("00010"));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
    }

    #[test]
    fn test_read_table_flexible_rows() {
        let csv = "a;b;c\n1;2\n1;2;3;4\n";
        let table = read_table(csv.as_bytes(), b';', "lots").unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.cell(0, 2), &Cell::Empty);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn test_read_table_rejects_empty_file() {
        let err = read_table(b"", b',', "lots").unwrap_err();
        assert!(matches!(err, AppError::InvalidUpload(_)));
    }

    #[test]
    fn test_write_table_quotes_and_numbers() {
        let table = Table::new(
            vec!["name".into(), "qty".into()],
            vec![
                vec![Cell::text("a, b"), Cell::Number(Decimal::new(25, 1))],
                vec![Cell::text("línea de sse"), Cell::Empty],
            ],
        );
        let csv = write_table(&table, b',').unwrap();
        assert_eq!(csv, "name,qty\n\"a, b\",2.5\nlínea de sse,\n");
    }
}
