//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use geo::Geometry;

use super::ReprojectorLite;
use crate::MapError;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector
    ///
    /// # Errors
    ///
    /// `UnsupportedProjection` si aucune implémentation ne couvre le couple.
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, MapError> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source_epsg, target_epsg) {
            return Ok(Self::Lite(ReprojectorLite::new(source_epsg, target_epsg)?));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = crate::export::Reprojector::new(source_epsg, target_epsg)?;
            return Ok(Self::Proj(proj));
        }

        #[cfg(not(feature = "reproject"))]
        {
            tracing::debug!(
                "EPSG:{} -> EPSG:{} needs PROJ (build with --features reproject)",
                source_epsg,
                target_epsg
            );
            return Err(MapError::UnsupportedProjection {
                source_epsg,
                target_epsg,
            });
        }
    }

    /// Transforme un point (x, y)
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), MapError> {
        match self {
            Self::Identity => Ok((x, y)),
            Self::Lite(lite) => lite.transform_point(x, y),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => match proj.transform_geometry(&Geometry::Point((x, y).into()))? {
                Geometry::Point(p) => Ok((p.x(), p.y())),
                other => Err(MapError::Reprojection(format!(
                    "unexpected geometry {:?}",
                    other
                ))),
            },
        }
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, MapError> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (no reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
