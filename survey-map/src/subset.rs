//! Sélection spatiale : points contenus dans des polygones

use geo::{Geometry, Intersects};
use survey_data::Layer;
use tracing::info;

use crate::layers::require_crs;
use crate::MapError;

/// Garde les points qui touchent (intérieur ou bord) un polygone de `polygons`
///
/// Les deux couches doivent avoir une projection, et la même.
///
/// # Errors
///
/// - `MissingCrs` si une des couches n'a pas de projection
/// - `CrsMismatch` si les EPSG diffèrent
pub fn points_within(points: &Layer, polygons: &Layer) -> Result<Layer, MapError> {
    let left = require_crs(points)?;
    let right = require_crs(polygons)?;
    if left.epsg != right.epsg {
        return Err(MapError::crs_mismatch(left.epsg, right.epsg));
    }

    let areas: Vec<&Geometry> = polygons
        .features
        .iter()
        .map(|f| &f.geometry)
        .filter(|g| matches!(g, Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_)))
        .collect();

    let features: Vec<_> = points
        .features
        .iter()
        .filter(|f| areas.iter().any(|area| area.intersects(&f.geometry)))
        .cloned()
        .collect();

    info!(
        points = points.len(),
        polygons = areas.len(),
        kept = features.len(),
        "Point subset"
    );

    Ok(Layer {
        name: points.name.clone(),
        projection: points.projection,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};
    use std::collections::HashMap;
    use survey_data::{Feature, Projection};

    fn feature(id: &str, geometry: Geometry) -> Feature {
        Feature {
            id: id.to_string(),
            geometry,
            properties: HashMap::new(),
            feature_type: "test".to_string(),
        }
    }

    fn square(projection: Option<Projection>) -> Layer {
        let mut layer = Layer::new("area", projection);
        layer.features.push(feature(
            "box",
            Geometry::Polygon(polygon![
                (x: -36.0, y: -6.0),
                (x: -34.0, y: -6.0),
                (x: -34.0, y: -4.0),
                (x: -36.0, y: -4.0),
            ]),
        ));
        layer
    }

    fn points(projection: Option<Projection>, pts: &[(f64, f64)]) -> Layer {
        let mut layer = Layer::new("sightings", projection);
        for (i, &(x, y)) in pts.iter().enumerate() {
            layer
                .features
                .push(feature(&i.to_string(), Geometry::Point(point!(x: x, y: y))));
        }
        layer
    }

    #[test]
    fn test_inside_and_boundary_kept() {
        let pts = points(
            Some(Projection::WGS84),
            &[(-35.0, -5.0), (-36.0, -5.0), (-30.0, -5.0)],
        );
        let subset = points_within(&pts, &square(Some(Projection::WGS84))).unwrap();

        let ids: Vec<&str> = subset.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert_eq!(subset.name, "sightings");
        assert_eq!(subset.projection, Some(Projection::WGS84));
    }

    #[test]
    fn test_disjoint_is_empty() {
        let pts = points(Some(Projection::WGS84), &[(10.0, 10.0), (-40.0, 0.0)]);
        let subset = points_within(&pts, &square(Some(Projection::WGS84))).unwrap();
        assert!(subset.is_empty());
    }

    #[test]
    fn test_crs_mismatch_fails() {
        let pts = points(Some(Projection::from_epsg(32724)), &[(-35.0, -5.0)]);
        match points_within(&pts, &square(Some(Projection::WGS84))) {
            Err(MapError::CrsMismatch { left, right }) => {
                assert_eq!(left, "EPSG:32724");
                assert_eq!(right, "EPSG:4326");
            }
            other => panic!("Expected CrsMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_unset_crs_fails() {
        let pts = points(Some(Projection::WGS84), &[(-35.0, -5.0)]);
        assert!(matches!(
            points_within(&pts, &square(None)),
            Err(MapError::MissingCrs(name)) if name == "area"
        ));
    }
}
