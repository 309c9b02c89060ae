//! Opérations sur les couches : contrôle du CRS, reprojection, emprise

use geo::{BoundingRect, Rect};
use survey_data::{Layer, Projection};
use tracing::debug;

use crate::reproject_lite::SmartReprojector;
use crate::MapError;

/// Projection d'une couche, ou `MissingCrs`
pub fn require_crs(layer: &Layer) -> Result<Projection, MapError> {
    layer
        .projection
        .ok_or_else(|| MapError::MissingCrs(layer.name.clone()))
}

/// Reprojette toutes les entités d'une couche
///
/// # Errors
///
/// - `MissingCrs` si la couche n'a pas de projection
/// - `UnsupportedProjection` / `Reprojection` en cas d'échec de transformation
pub fn reproject_layer(layer: &Layer, target_epsg: u32) -> Result<Layer, MapError> {
    let source = require_crs(layer)?;
    let reprojector = SmartReprojector::new(source.epsg, target_epsg)?;

    debug!(
        layer = %layer.name,
        from = source.epsg,
        to = target_epsg,
        reprojector = reprojector.description(),
        "Reprojecting layer"
    );

    let features = layer
        .features
        .iter()
        .map(|f| {
            let mut feature = f.clone();
            feature.geometry = reprojector.transform_geometry(&f.geometry)?;
            Ok(feature)
        })
        .collect::<Result<Vec<_>, MapError>>()?;

    Ok(Layer {
        name: layer.name.clone(),
        projection: Some(Projection::from_epsg(target_epsg)),
        features,
    })
}

/// Emprise d'une couche dans sa propre projection (None si vide)
pub fn layer_bounds(layer: &Layer) -> Option<Rect> {
    layer
        .features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|a, b| merge_rects(&a, &b))
}

/// Union de deux rectangles
pub fn merge_rects(a: &Rect, b: &Rect) -> Rect {
    Rect::new(
        geo::coord! {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        geo::coord! {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Emprise WGS84 (lon/lat) d'un ensemble de couches
///
/// Chaque emprise est ramenée en EPSG:4326 par ses quatre coins.
pub fn extent_wgs84(layers: &[&Layer]) -> Result<Option<Rect>, MapError> {
    let mut extent: Option<Rect> = None;

    for layer in layers {
        let Some(bounds) = layer_bounds(layer) else {
            continue;
        };
        let source = require_crs(layer)?;
        let reprojector = SmartReprojector::new(source.epsg, Projection::WGS84.epsg)?;

        let mut corners = Vec::with_capacity(4);
        for (x, y) in [
            (bounds.min().x, bounds.min().y),
            (bounds.min().x, bounds.max().y),
            (bounds.max().x, bounds.min().y),
            (bounds.max().x, bounds.max().y),
        ] {
            corners.push(reprojector.transform_point(x, y)?);
        }

        let rect = corners
            .iter()
            .map(|&(x, y)| Rect::new(geo::coord! { x: x, y: y }, geo::coord! { x: x, y: y }))
            .reduce(|a, b| merge_rects(&a, &b));

        extent = match (extent, rect) {
            (Some(e), Some(r)) => Some(merge_rects(&e, &r)),
            (None, r) => r,
            (e, None) => e,
        };
    }

    Ok(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry};
    use std::collections::HashMap;
    use survey_data::Feature;

    fn point_layer(name: &str, projection: Option<Projection>, pts: &[(f64, f64)]) -> Layer {
        let mut layer = Layer::new(name, projection);
        layer.features = pts
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Feature {
                id: format!("{}_{}", name, i),
                geometry: Geometry::Point(point!(x: x, y: y)),
                properties: HashMap::new(),
                feature_type: "sighting".to_string(),
            })
            .collect();
        layer
    }

    #[test]
    fn test_reproject_layer_sets_crs() {
        let layer = point_layer("s", Some(Projection::WGS84), &[(-35.0, -5.0)]);
        let out = reproject_layer(&layer, 32724).unwrap();

        assert_eq!(out.projection.map(|p| p.epsg), Some(32724));
        assert_eq!(out.len(), 1);
        match out.features[0].geometry {
            Geometry::Point(p) => assert!(p.x() > 900_000.0 && p.y() > 9_000_000.0),
            _ => panic!("Expected Point"),
        }
    }

    #[test]
    fn test_reproject_layer_without_crs() {
        let layer = point_layer("nocrs", None, &[(-35.0, -5.0)]);
        match reproject_layer(&layer, 32724) {
            Err(MapError::MissingCrs(name)) => assert_eq!(name, "nocrs"),
            other => panic!("Expected MissingCrs, got {:?}", other),
        }
    }

    #[test]
    fn test_extent_wgs84_mixed_crs() {
        let a = point_layer("a", Some(Projection::WGS84), &[(-36.0, -6.0), (-35.0, -5.0)]);
        let b = reproject_layer(
            &point_layer("b", Some(Projection::WGS84), &[(-34.0, -4.0)]),
            32724,
        )
        .unwrap();
        let empty = Layer::new("empty", None);

        let extent = extent_wgs84(&[&a, &b, &empty]).unwrap().unwrap();
        assert!((extent.min().x - (-36.0)).abs() < 1e-6);
        assert!((extent.min().y - (-6.0)).abs() < 1e-6);
        assert!((extent.max().x - (-34.0)).abs() < 1e-6);
        assert!((extent.max().y - (-4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_extent_of_nothing() {
        assert!(extent_wgs84(&[]).unwrap().is_none());
    }
}
