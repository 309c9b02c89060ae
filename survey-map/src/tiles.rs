//! Plan de tuiles XYZ (slippy map) pour le fond de carte
//!
//! Les tuiles sont listées, pas téléchargées : le moteur de rendu consomme le
//! plan.

use std::f64::consts::PI;
use std::fmt;

use geo::Rect;
use serde::{Deserialize, Serialize};

use crate::reproject_lite::MAX_LATITUDE;
use crate::MapError;

/// Fond océanique ESRI (attention : ordre {z}/{y}/{x})
pub const ESRI_OCEAN_TEMPLATE: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/Ocean/World_Ocean_Base/MapServer/tile/{z}/{y}/{x}";

pub const ESRI_OCEAN_ATTRIBUTION: &str = "Tiles (c) Esri: GEBCO, NOAA, CHS, OSU, UNH, CSUMB, National Geographic, DeLorme, NAVTEQ, Esri";

/// Zoom maximal accepté
pub const MAX_ZOOM: u8 = 22;
/// Zoom maximal essayé par [`auto_zoom`]
pub const MAX_AUTO_ZOOM: u8 = 18;
/// Nombre de tuiles au-delà duquel un plan est refusé
pub const MAX_PLAN_TILES: u64 = 1_000_000;

/// Emprise géographique en degrés (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    /// Crée une emprise ; vide, inversée ou hors bornes → `InvalidExtent`
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, MapError> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MapError::InvalidExtent(format!("non-finite bound in {:?}", values)));
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(MapError::InvalidExtent(format!(
                "empty or inverted extent ({}, {}, {}, {})",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        if min_lon < -180.0 || max_lon > 180.0 || min_lat < -90.0 || max_lat > 90.0 {
            return Err(MapError::InvalidExtent(format!(
                "extent ({}, {}, {}, {}) is outside [-180,180]x[-90,90]",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn from_rect(rect: &Rect) -> Result<Self, MapError> {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// Parse "minlon,minlat,maxlon,maxlat"
    pub fn parse(raw: &str) -> Result<Self, MapError> {
        let values: Vec<f64> = raw
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| MapError::InvalidExtent(format!("'{}': {}", raw, e)))?;

        match values.as_slice() {
            [a, b, c, d] => Self::new(*a, *b, *c, *d),
            _ => Err(MapError::InvalidExtent(format!(
                "'{}': expected minlon,minlat,maxlon,maxlat",
                raw
            ))),
        }
    }

    /// Élargit l'emprise d'une fraction de sa taille, bornée au globe
    pub fn padded(&self, ratio: f64) -> Self {
        let dx = (self.max_lon - self.min_lon) * ratio;
        let dy = (self.max_lat - self.min_lat) * ratio;
        Self {
            min_lon: (self.min_lon - dx).max(-180.0),
            min_lat: (self.min_lat - dy).max(-90.0),
            max_lon: (self.max_lon + dx).min(180.0),
            max_lat: (self.max_lat + dy).min(90.0),
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

fn check_zoom(zoom: u8) -> Result<(), MapError> {
    if zoom > MAX_ZOOM {
        return Err(MapError::InvalidZoom(zoom));
    }
    Ok(())
}

/// Tuile contenant (lon, lat) au zoom `z`
pub fn lonlat_to_tile(lon: f64, lat: f64, z: u8) -> Result<(u32, u32), MapError> {
    check_zoom(z)?;
    let n = (1u64 << z) as f64;
    let max_index = (1u64 << z) - 1;

    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    let clamp = |v: f64| (v.max(0.0) as u64).min(max_index) as u32;
    Ok((clamp(x), clamp(y)))
}

/// Emprise WGS84 d'une tuile (coin nord-ouest = (x, y))
pub fn tile_bounds(x: u32, y: u32, z: u8) -> Result<BBox, MapError> {
    check_zoom(z)?;
    let n = (1u64 << z) as f64;

    let lon = |x: f64| x / n * 360.0 - 180.0;
    let lat = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();

    Ok(BBox {
        min_lon: lon(x as f64),
        min_lat: lat(y as f64 + 1.0),
        max_lon: lon(x as f64 + 1.0),
        max_lat: lat(y as f64),
    })
}

/// Une tuile à récupérer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRequest {
    pub z: u8,
    pub x: u32,
    pub y: u32,
    pub url: String,
}

/// Ensemble des tuiles couvrant une emprise à un zoom donné
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlan {
    pub zoom: u8,
    pub template: String,
    pub extent: BBox,
    pub x_range: (u32, u32),
    pub y_range: (u32, u32),
    pub tiles: Vec<TileRequest>,
}

/// Plages de tuiles (x, y) couvrant l'emprise
fn tile_ranges(bbox: &BBox, zoom: u8) -> Result<((u32, u32), (u32, u32)), MapError> {
    let (x0, y0) = lonlat_to_tile(bbox.min_lon, bbox.max_lat, zoom)?;
    let (x1, y1) = lonlat_to_tile(bbox.max_lon, bbox.min_lat, zoom)?;
    Ok(((x0, x1), (y0, y1)))
}

/// Nombre de tuiles couvrant l'emprise
pub fn tile_count(bbox: &BBox, zoom: u8) -> Result<u64, MapError> {
    let ((x0, x1), (y0, y1)) = tile_ranges(bbox, zoom)?;
    Ok((x1 - x0 + 1) as u64 * (y1 - y0 + 1) as u64)
}

/// Remplace {z}, {x}, {y} dans le modèle d'URL
pub fn expand_template(template: &str, z: u8, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

impl TilePlan {
    /// Liste les tuiles couvrant `bbox` au zoom `zoom`, ligne par ligne
    pub fn for_extent(bbox: &BBox, zoom: u8, template: &str) -> Result<Self, MapError> {
        let count = tile_count(bbox, zoom)?;
        if count > MAX_PLAN_TILES {
            return Err(MapError::InvalidExtent(format!(
                "extent {} needs {} tiles at zoom {} (max {})",
                bbox, count, zoom, MAX_PLAN_TILES
            )));
        }

        let ((x0, x1), (y0, y1)) = tile_ranges(bbox, zoom)?;
        let mut tiles = Vec::with_capacity(count as usize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                tiles.push(TileRequest {
                    z: zoom,
                    x,
                    y,
                    url: expand_template(template, zoom, x, y),
                });
            }
        }

        Ok(Self {
            zoom,
            template: template.to_string(),
            extent: *bbox,
            x_range: (x0, x1),
            y_range: (y0, y1),
            tiles,
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Zoom le plus élevé (≤ 18) dont le plan tient en `max_tiles` tuiles
pub fn auto_zoom(bbox: &BBox, max_tiles: u64) -> Result<u8, MapError> {
    for z in (0..=MAX_AUTO_ZOOM).rev() {
        if tile_count(bbox, z)? <= max_tiles.max(1) {
            return Ok(z);
        }
    }
    Ok(0)
}
