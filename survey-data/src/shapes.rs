//! Lecture des shapefiles (.shp/.shx/.dbf + .prj)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use geo::Geometry;
use shapefile::dbase::{FieldValue, Record};
use tracing::{debug, warn};

use crate::parser;
use crate::types::{Feature, Layer, Projection};
use crate::SurveyDataError;

/// Lit un shapefile et retourne une couche
///
/// La projection est lue dans le `.prj` voisin. Sans `.prj` exploitable la
/// couche n'a pas de projection (`None`) et les opérations spatiales la refuseront.
pub fn read_shapefile(path: &Path) -> Result<Layer, SurveyDataError> {
    let name = layer_name(path);
    let projection = read_projection(path);

    let mut reader = shapefile::Reader::from_path(path)?;
    let mut layer = Layer::new(name, projection);
    let mut null_shapes = 0usize;

    for (row, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let geometry = match Geometry::<f64>::try_from(shape) {
            Ok(g) => g,
            Err(e) => {
                // NullShape ou type non convertible
                debug!(layer = %layer.name, row = row, error = %e, "Skipping shape without geometry");
                null_shapes += 1;
                continue;
            }
        };

        layer.features.push(Feature {
            id: format!("{}_{}", layer.name, row),
            geometry,
            properties: record_to_properties(record),
            feature_type: layer.name.clone(),
        });
    }

    if null_shapes > 0 {
        warn!(layer = %layer.name, count = null_shapes, "Shapes without geometry skipped");
    }

    debug!(
        layer = %layer.name,
        features = layer.features.len(),
        projection = ?layer.projection.map(|p| p.epsg),
        "Read shapefile"
    );

    Ok(layer)
}

/// Lit tous les shapefiles d'un dossier (triés par nom de fichier)
pub fn read_shapefiles(dir: &Path) -> Result<Vec<Layer>, SurveyDataError> {
    let files = collect_shapefiles(dir)?;

    if files.is_empty() {
        return Err(SurveyDataError::MissingFile(format!(
            "no .shp file in {}",
            dir.display()
        )));
    }

    files.iter().map(|p| read_shapefile(p)).collect()
}

/// Collecte les fichiers .shp d'un dossier (ou le fichier lui-même)
pub fn collect_shapefiles(path: &Path) -> Result<Vec<PathBuf>, SurveyDataError> {
    if path.is_file() {
        return Ok(if is_shp(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    if !path.is_dir() {
        return Err(SurveyDataError::MissingFile(path.display().to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_shp(p))
        .collect();
    files.sort();

    Ok(files)
}

fn is_shp(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("shp"))
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer")
        .to_string()
}

/// Lit la projection depuis le `.prj` voisin
fn read_projection(shp_path: &Path) -> Option<Projection> {
    let prj_path = shp_path.with_extension("prj");

    let data = match std::fs::read(&prj_path) {
        Ok(d) => d,
        Err(_) => {
            warn!(file = %shp_path.display(), "No .prj file, CRS is unset");
            return None;
        }
    };

    match parser::prj::parse(&data) {
        Ok(projection) => Some(projection),
        Err(e) => {
            warn!(file = %prj_path.display(), error = %e, "Unrecognised .prj, CRS is unset");
            None
        }
    }
}

/// Convertit les attributs DBF en propriétés texte
fn record_to_properties(record: Record) -> HashMap<String, String> {
    HashMap::<String, FieldValue>::from(record)
        .into_iter()
        .map(|(k, v)| (k, field_to_string(v)))
        .collect()
}

fn field_to_string(value: FieldValue) -> String {
    match value {
        FieldValue::Character(v) => v.unwrap_or_default(),
        FieldValue::Memo(v) => v,
        FieldValue::Numeric(v) => v.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Float(v) => v.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Logical(v) => v.map(|b| b.to_string()).unwrap_or_default(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Double(n) => n.to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory() {
        let result = read_shapefiles(Path::new("nonexistent-shapes-dir"));
        assert!(matches!(result, Err(SurveyDataError::MissingFile(_))));
    }

    #[test]
    fn test_directory_without_shapefiles() {
        let dir = std::env::temp_dir().join("survey_data_no_shp");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("readme.txt"), "nothing here").unwrap();

        let result = read_shapefiles(&dir);
        assert!(matches!(result, Err(SurveyDataError::MissingFile(_))));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_layer_name() {
        assert_eq!(layer_name(Path::new("/data/Brazil_EEZ.shp")), "Brazil_EEZ");
        assert!(is_shp(Path::new("coast.SHP")));
        assert!(!is_shp(Path::new("coast.dbf")));
    }

    #[test]
    fn test_field_to_string() {
        assert_eq!(field_to_string(FieldValue::Character(Some("EEZ".into()))), "EEZ");
        assert_eq!(field_to_string(FieldValue::Character(None)), "");
        assert_eq!(field_to_string(FieldValue::Numeric(Some(12.5))), "12.5");
        assert_eq!(field_to_string(FieldValue::Logical(Some(true))), "true");
    }
}
