//! Reprojection légère en Rust pur (sans dépendance à PROJ)
//!
//! Projections supportées, en source comme en cible :
//! - WGS84 (EPSG:4326), SIRGAS 2000 (EPSG:4674, assimilé à WGS84)
//! - Web Mercator (EPSG:3857)
//! - UTM WGS84, toutes zones (EPSG:32601-32660, 32701-32760)
//!
//! Toute transformation passe par les coordonnées géographiques WGS84.

mod ellipsoid;
mod mercator;
mod smart;
mod utm;

pub use mercator::MAX_LATITUDE;
pub use smart::SmartReprojector;
pub use utm::UtmZone;

use geo::{Coord, Geometry, MapCoords};

use crate::MapError;

pub use ellipsoid::WGS84;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Système de coordonnées géré en Rust pur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crs {
    Geographic,
    WebMercator,
    Utm(UtmZone),
}

impl Crs {
    fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4326 | 4674 => Some(Self::Geographic),
            3857 => Some(Self::WebMercator),
            _ => UtmZone::from_epsg(epsg).map(Self::Utm),
        }
    }

    fn unproject(self, x: f64, y: f64) -> Result<Geographic, MapError> {
        match self {
            Self::Geographic => Ok(Geographic::from_degrees(x, y)),
            Self::WebMercator => mercator::web_mercator_to_geographic(x, y),
            Self::Utm(zone) => utm::utm_to_geographic(x, y, zone),
        }
    }

    fn project(self, geo: Geographic) -> Result<(f64, f64), MapError> {
        match self {
            Self::Geographic => Ok(geo.to_degrees()),
            Self::WebMercator => mercator::geographic_to_web_mercator(geo),
            Self::Utm(zone) => utm::geographic_to_utm(geo, zone),
        }
    }
}

/// Reprojection légère entre WGS84, Web Mercator et UTM
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source_epsg: u32,
    target_epsg: u32,
    source: Crs,
    target: Crs,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, MapError> {
        match (Crs::from_epsg(source_epsg), Crs::from_epsg(target_epsg)) {
            (Some(source), Some(target)) => Ok(Self {
                source_epsg,
                target_epsg,
                source,
                target,
            }),
            _ => Err(MapError::UnsupportedProjection {
                source_epsg,
                target_epsg,
            }),
        }
    }

    /// Vérifie si l'EPSG est géré en Rust pur
    pub fn is_supported_epsg(epsg: u32) -> bool {
        Crs::from_epsg(epsg).is_some()
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: u32, target: u32) -> bool {
        Self::is_supported_epsg(source) && Self::is_supported_epsg(target)
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), MapError> {
        if self.source == self.target {
            return Ok((x, y));
        }
        let geo = self.source.unproject(x, y)?;
        self.target.project(geo)
    }

    /// Transforme une géométrie, quel que soit son type
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, MapError> {
        geom.try_map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}
