//! Types de données pour le crate survey-data

use std::collections::HashMap;
use std::fmt;

use geo::Geometry;

/// Informations de projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Code EPSG
    pub epsg: u32,

    /// Nom court de la projection
    pub name: &'static str,
}

impl Projection {
    /// WGS84 géographique (degrés décimaux)
    pub const WGS84: Projection = Projection {
        epsg: 4326,
        name: "WGS84",
    };

    /// Construit une projection depuis un code EPSG, avec un nom si connu
    pub fn from_epsg(epsg: u32) -> Self {
        let name = match epsg {
            4326 => "WGS84",
            4674 => "SIRGAS2000",
            3857 => "WebMercator",
            32601..=32660 => "WGS84 / UTM north",
            32701..=32760 => "WGS84 / UTM south",
            _ => "",
        };
        Self { epsg, name }
    }

    /// Vrai si les coordonnées sont en degrés
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4326 | 4674)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Un segment d'effort (une ligne du CSV d'effort, format large)
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    /// Identifiant numérique du segment
    pub index: i64,
    /// Libellé du transect
    pub line_label: String,
    /// Date de la campagne (telle que lue)
    pub date: String,
    pub lat_beg: f64,
    pub lat_end: f64,
    pub lon_beg: f64,
    pub lon_end: f64,
}

impl SegmentRecord {
    /// Clé de regroupement (Index, LineLabel, Date)
    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            index: self.index,
            line_label: self.line_label.clone(),
            date: self.date.clone(),
        }
    }
}

/// Clé identifiant un segment de manière unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentKey {
    pub index: i64,
    pub line_label: String,
    pub date: String,
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.line_label, self.date)
    }
}

/// Statut d'effort d'une observation : deux niveaux, pas d'autre valeur admise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Effort {
    On,
    Off,
}

impl Effort {
    /// Niveaux de la catégorie, dans l'ordre
    pub const LEVELS: [Effort; 2] = [Effort::On, Effort::Off];

    /// Parse une valeur brute ("ON", " off ", ...)
    pub fn parse(raw: &str) -> Option<Self> {
        let v = raw.trim();
        if v.eq_ignore_ascii_case("ON") {
            Some(Self::On)
        } else if v.eq_ignore_ascii_case("OFF") {
            Some(Self::Off)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Une observation (sighting) avec sa position en degrés décimaux
#[derive(Debug, Clone)]
pub struct SightingRecord {
    /// Numéro de ligne de données (1-based)
    pub row: usize,
    pub lat: f64,
    pub lon: f64,
    pub effort: Effort,
    /// Colonnes non géographiques conservées telles quelles
    pub properties: HashMap<String, String>,
}

/// Une feature avec sa géométrie et ses attributs
#[derive(Debug, Clone)]
pub struct Feature {
    /// Identifiant unique de la feature
    pub id: String,

    /// Géométrie (Point, LineString, Polygon, ...)
    pub geometry: Geometry,

    /// Attributs de la feature (clé -> valeur)
    pub properties: HashMap<String, String>,

    /// Type de feature (ex: "boundary", "sighting", "effort")
    pub feature_type: String,
}

/// Une couche : un ensemble de features partageant un même système de coordonnées
#[derive(Debug, Clone)]
pub struct Layer {
    /// Nom de la couche (nom de fichier sans extension)
    pub name: String,

    /// Projection de la couche, `None` si inconnue
    pub projection: Option<Projection>,

    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, projection: Option<Projection>) -> Self {
        Self {
            name: name.into(),
            projection,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
