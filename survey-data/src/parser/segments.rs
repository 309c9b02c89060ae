//! Parser pour le CSV des segments d'effort (format large)
//!
//! Colonnes attendues : `Index`, `LineLabel`, `Date`, `LatD_Beg`, `LatD_End`,
//! `LongD_Beg`, `LongD_End`. Les colonnes supplémentaires sont ignorées.

use super::text::{detect_delimiter, parse_number};
use super::{csv_reader, require_column};
use crate::types::SegmentRecord;
use crate::SurveyDataError;

const COORD_COLUMNS: [&str; 4] = ["LatD_Beg", "LatD_End", "LongD_Beg", "LongD_End"];

/// Parse le contenu d'un CSV d'effort
///
/// `file` sert uniquement aux messages d'erreur.
pub fn parse(content: &str, file: &str) -> Result<Vec<SegmentRecord>, SurveyDataError> {
    let delimiter = detect_delimiter(content);
    let decimal_comma = delimiter == b';';
    let mut reader = csv_reader(content, delimiter);

    let headers = reader.headers()?.clone();
    let index_col = require_column(&headers, &["Index"], file)?;
    let label_col = require_column(&headers, &["LineLabel"], file)?;
    let date_col = require_column(&headers, &["Date"], file)?;

    let mut coord_cols = [0usize; 4];
    for (slot, name) in coord_cols.iter_mut().zip(COORD_COLUMNS) {
        *slot = require_column(&headers, &[name], file)?;
    }

    let mut segments = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_index = record.get(index_col).unwrap_or("");
        let index = raw_index.trim().parse::<i64>().map_err(|_| {
            SurveyDataError::parse_error(file, format!("row {}: invalid Index '{}'", row, raw_index))
        })?;

        let mut coords = [0f64; 4];
        for ((value, &col), name) in coords.iter_mut().zip(&coord_cols).zip(COORD_COLUMNS) {
            let raw = record.get(col).unwrap_or("");
            *value = parse_number(raw, decimal_comma)
                .ok_or_else(|| SurveyDataError::coordinate(row, name, raw))?;
        }
        let [lat_beg, lat_end, lon_beg, lon_end] = coords;

        segments.push(SegmentRecord {
            index,
            line_label: record.get(label_col).unwrap_or("").to_string(),
            date: record.get(date_col).unwrap_or("").to_string(),
            lat_beg,
            lat_end,
            lon_beg,
            lon_end,
        });
    }

    tracing::debug!(file = file, segments = segments.len(), "Parsed effort segments");

    Ok(segments)
}
