//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`. Il couvre
//! les projections que `reproject_lite` ne gère pas (SIRGAS 2000 / UTM, etc.).

use geo::{Coord, Geometry, LineString, MapCoords, Polygon};
use proj::Proj;

use crate::MapError;

/// Reprojection de géométries entre deux systèmes de coordonnées
pub struct Reprojector {
    proj: Proj,
    source_epsg: u32,
    target_epsg: u32,
}

impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, MapError> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).map_err(|e| {
            tracing::debug!("PROJ rejected {} -> {}: {}", source, target, e);
            MapError::UnsupportedProjection {
                source_epsg,
                target_epsg,
            }
        })?;

        Ok(Self {
            proj,
            source_epsg,
            target_epsg,
        })
    }

    /// Retourne le SRID source
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Retourne le SRID cible
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, MapError> {
        if self.source_epsg == self.target_epsg {
            return Ok(geom.clone());
        }

        match geom {
            Geometry::LineString(ls) => Ok(Geometry::LineString(self.transform_linestring(ls)?)),
            Geometry::Polygon(p) => Ok(Geometry::Polygon(self.transform_polygon(p)?)),
            other => other.try_map_coords(|c| self.transform_coord(c)),
        }
    }

    /// Transforme une coordonnée unique
    fn transform_coord(&self, coord: Coord) -> Result<Coord, MapError> {
        let (x, y) = self
            .proj
            .convert((coord.x, coord.y))
            .map_err(|e| MapError::Reprojection(e.to_string()))?;
        Ok(Coord { x, y })
    }

    /// Transforme une LineString (conversion par lot)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString, MapError> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| MapError::Reprojection(e.to_string()))?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }

    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon, MapError> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}
