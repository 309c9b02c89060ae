//! Types d'erreurs pour le crate survey-map

use survey_data::{SegmentKey, SurveyDataError};
use thiserror::Error;

use crate::effort::Role;

/// Erreurs des étapes de transformation (reprojection, lignes d'effort, sélection spatiale)
///
/// Toutes ces erreurs interrompent l'étape en cours : pas de nouvel essai, pas
/// de résultat partiel.
#[derive(Debug, Error)]
pub enum MapError {
    /// Erreur de lecture ou de réparation des données d'entrée
    #[error(transparent)]
    Data(#[from] SurveyDataError),

    /// Un segment n'a pas exactement un point de début et un point de fin
    #[error("Segment {key}: expected exactly one {role} point, found {count}")]
    Cardinality {
        key: SegmentKey,
        role: Role,
        count: usize,
    },

    /// Coordonnée non finie dans un segment
    #[error("Segment {key}: non-finite {role} coordinate ({lon}, {lat})")]
    CoordinateParse {
        key: SegmentKey,
        role: Role,
        lon: f64,
        lat: f64,
    },

    /// Coordonnée hors des bornes géographiques
    #[error("Segment {key}: {role} coordinate ({lon}, {lat}) is outside [-180,180]x[-90,90]")]
    CoordinateOutOfRange {
        key: SegmentKey,
        role: Role,
        lon: f64,
        lat: f64,
    },

    /// Opération spatiale entre couches de projections différentes
    #[error("CRS mismatch: {left} vs {right}")]
    CrsMismatch { left: String, right: String },

    /// Couche sans projection
    #[error("Layer '{0}' has no coordinate reference system")]
    MissingCrs(String),

    /// Couple de projections non supporté
    #[error("Unsupported reprojection EPSG:{source_epsg} -> EPSG:{target_epsg}")]
    UnsupportedProjection { source_epsg: u32, target_epsg: u32 },

    /// Échec de transformation d'une coordonnée
    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    /// Emprise vide ou inversée
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// Niveau de zoom hors limites
    #[error("Invalid zoom level {0} (max 22)")]
    InvalidZoom(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    pub(crate) fn crs_mismatch(left: u32, right: u32) -> Self {
        Self::CrsMismatch {
            left: format!("EPSG:{}", left),
            right: format!("EPSG:{}", right),
        }
    }
}
