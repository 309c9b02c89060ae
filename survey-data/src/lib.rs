//! # survey-data
//!
//! Lecture des données d'une campagne d'observation en mer : segments
//! d'effort et observations (CSV), limites (shapefiles).
//!
//! ## Features
//!
//! - Décodage UTF-8 (validation SIMD `simdutf8`) avec repli Windows-1252
//! - Détection du séparateur CSV (`,` `;` tabulation) et des virgules décimales
//! - Détection de la projection depuis le `.prj` des shapefiles
//! - Validation et réparation des géométries (types `geo`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use survey_data::{read_segments, read_shapefiles};
//! use std::path::Path;
//!
//! let segments = read_segments(Path::new("effort.csv"))?;
//! let layers = read_shapefiles(Path::new("shapes/"))?;
//! for layer in &layers {
//!     println!("{}: {} features ({:?})", layer.name, layer.len(), layer.projection);
//! }
//! ```

pub mod error;
pub mod parser;
pub mod repair;
pub mod shapes;
pub mod types;

pub use error::SurveyDataError;
pub use repair::{repair_layer, RepairStats, ValidityIssue};
pub use shapes::{read_shapefile, read_shapefiles};
pub use types::{Effort, Feature, Layer, Projection, SegmentKey, SegmentRecord, SightingRecord};

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use geo::{Geometry, Point};

/// Parse le contenu d'un CSV de segments d'effort
pub fn parse_segments(content: &str) -> Result<Vec<SegmentRecord>, SurveyDataError> {
    parser::segments::parse(content, "<memory>")
}

/// Lit un CSV de segments d'effort (format large : une ligne par segment)
///
/// # Errors
///
/// - `MissingColumn` si une des colonnes obligatoires est absente
/// - `CoordinateParse` si une coordonnée est vide ou non numérique ; aucune
///   valeur par défaut n'est substituée
pub fn read_segments(path: &Path) -> Result<Vec<SegmentRecord>, SurveyDataError> {
    let data = std::fs::read(path)?;
    let content = parser::text::decode(&data);
    parser::segments::parse(&content, &file_label(path))
}

/// Parse le contenu d'un CSV d'observations
pub fn parse_sightings(content: &str) -> Result<Vec<SightingRecord>, SurveyDataError> {
    parser::sightings::parse(content, "<memory>")
}

/// Lit un CSV d'observations (Lat/Long + Effort ON/OFF)
pub fn read_sightings(path: &Path) -> Result<Vec<SightingRecord>, SurveyDataError> {
    let data = std::fs::read(path)?;
    let content = parser::text::decode(&data);
    parser::sightings::parse(&content, &file_label(path))
}

/// Regroupe les observations par niveau d'effort (au plus deux clés : ON, OFF)
pub fn classify_by_effort(sightings: &[SightingRecord]) -> BTreeMap<Effort, Vec<&SightingRecord>> {
    let mut groups: BTreeMap<Effort, Vec<&SightingRecord>> = BTreeMap::new();
    for s in sightings {
        groups.entry(s.effort).or_default().push(s);
    }
    groups
}

/// Convertit des observations en couche de points WGS84
pub fn sightings_to_layer(name: &str, sightings: &[SightingRecord]) -> Layer {
    let mut layer = Layer::new(name, Some(Projection::WGS84));

    layer.features = sightings
        .iter()
        .map(|s| {
            let mut properties: HashMap<String, String> = s.properties.clone();
            properties.insert("Effort".to_string(), s.effort.as_str().to_string());

            Feature {
                id: format!("{}_{}", name, s.row),
                geometry: Geometry::Point(Point::new(s.lon, s.lat)),
                properties,
                feature_type: "sighting".to_string(),
            }
        })
        .collect();

    layer
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
