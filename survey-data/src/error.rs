//! Types d'erreurs pour le crate survey-data

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture des données de campagne
#[derive(Debug, Error)]
pub enum SurveyDataError {
    /// Erreur d'I/O lors de la lecture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur bas niveau du lecteur CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Erreur du lecteur shapefile (.shp/.shx/.dbf)
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// Fichier ou dossier attendu introuvable
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// Colonne obligatoire absente de l'en-tête
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Erreur de parsing d'une valeur non géographique
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Coordonnée absente ou non numérique
    #[error("Invalid coordinate at row {row}, column {column}: '{value}'")]
    CoordinateParse {
        row: usize,
        column: String,
        value: String,
    },

    /// Coordonnée hors des bornes géographiques (lat/lon inversées ?)
    #[error("Coordinate ({lon}, {lat}) at row {row} is outside [-180,180]x[-90,90]")]
    CoordinateOutOfRange { row: usize, lon: f64, lat: f64 },

    /// Valeur d'effort hors du domaine {ON, OFF}
    #[error("Invalid Effort value at row {row}: '{value}' (expected ON or OFF)")]
    InvalidEffort { row: usize, value: String },

    /// Géométrie invalide
    #[error("Invalid geometry for {entity_id}: {reason}")]
    InvalidGeometry { entity_id: String, reason: String },

    /// Projection non reconnue
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    /// Erreur lors de la réparation de géométrie
    #[error("Geometry repair failed for {entity_id}: {reason}")]
    RepairFailed { entity_id: String, reason: String },
}

impl SurveyDataError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de coordonnée invalide
    pub fn coordinate(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::CoordinateParse {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Crée une erreur d'échec de réparation
    pub fn repair_failed(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RepairFailed {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}
