//! Parsers des fichiers d'entrée (CSV d'effort, CSV d'observations, .prj)

pub mod prj;
pub mod segments;
pub mod sightings;
pub mod text;

use crate::SurveyDataError;

/// Construit un lecteur CSV sur un texte déjà décodé
pub(crate) fn csv_reader(content: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes())
}

/// Cherche une colonne par nom (insensible à la casse), avec alias éventuels
pub(crate) fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Comme `find_column` mais la colonne est obligatoire
pub(crate) fn require_column(
    headers: &csv::StringRecord,
    names: &[&str],
    file: &str,
) -> Result<usize, SurveyDataError> {
    find_column(headers, names).ok_or_else(|| SurveyDataError::MissingColumn {
        file: file.to_string(),
        column: names[0].to_string(),
    })
}
