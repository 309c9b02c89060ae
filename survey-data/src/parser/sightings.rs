//! Parser pour le CSV des observations (sightings)
//!
//! Colonnes obligatoires : latitude (`Lat`/`Latitude`), longitude
//! (`Long`/`Lon`/`Longitude`) et `Effort` (ON/OFF). Les autres colonnes sont
//! conservées comme propriétés.

use std::collections::HashMap;

use super::text::{detect_delimiter, parse_number};
use super::{csv_reader, require_column};
use crate::types::{Effort, SightingRecord};
use crate::SurveyDataError;

const LAT_NAMES: &[&str] = &["Lat", "Latitude"];
const LON_NAMES: &[&str] = &["Long", "Lon", "Longitude"];

/// Parse le contenu d'un CSV d'observations
pub fn parse(content: &str, file: &str) -> Result<Vec<SightingRecord>, SurveyDataError> {
    let delimiter = detect_delimiter(content);
    let decimal_comma = delimiter == b';';
    let mut reader = csv_reader(content, delimiter);

    let headers = reader.headers()?.clone();
    let lat_col = require_column(&headers, LAT_NAMES, file)?;
    let lon_col = require_column(&headers, LON_NAMES, file)?;
    let effort_col = require_column(&headers, &["Effort"], file)?;

    let mut sightings = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_lat = record.get(lat_col).unwrap_or("");
        let lat = parse_number(raw_lat, decimal_comma)
            .ok_or_else(|| SurveyDataError::coordinate(row, &headers[lat_col], raw_lat))?;

        let raw_lon = record.get(lon_col).unwrap_or("");
        let lon = parse_number(raw_lon, decimal_comma)
            .ok_or_else(|| SurveyDataError::coordinate(row, &headers[lon_col], raw_lon))?;

        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(SurveyDataError::CoordinateOutOfRange { row, lon, lat });
        }

        let raw_effort = record.get(effort_col).unwrap_or("");
        let effort = Effort::parse(raw_effort).ok_or_else(|| SurveyDataError::InvalidEffort {
            row,
            value: raw_effort.to_string(),
        })?;

        let properties: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(idx, _)| *idx != lat_col && *idx != lon_col && *idx != effort_col)
            .map(|(_, (k, v))| (k.to_string(), v.to_string()))
            .collect();

        sightings.push(SightingRecord {
            row,
            lat,
            lon,
            effort,
            properties,
        });
    }

    tracing::debug!(file = file, sightings = sightings.len(), "Parsed sightings");

    Ok(sightings)
}
