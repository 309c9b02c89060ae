//! Fallback convex hull pour les rings non réparables

use geo::{ConvexHull, MultiPoint, Point, Polygon};

use crate::SurveyDataError;

/// Calcule l'enveloppe convexe d'un ring
pub fn convex_hull_fallback(ring: &geo::LineString, entity_id: &str) -> Result<Polygon, SurveyDataError> {
    let points: Vec<Point> = ring.0.iter().map(|c| Point::new(c.x, c.y)).collect();

    if points.len() < 3 {
        return Err(SurveyDataError::repair_failed(
            entity_id,
            "Not enough points for convex hull",
        ));
    }

    Ok(MultiPoint::new(points).convex_hull())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, LineString};

    #[test]
    fn test_convex_hull_of_bowtie() {
        let bowtie = LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        let hull = convex_hull_fallback(&bowtie, "bowtie").unwrap();
        assert!((hull.unsigned_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_convex_hull_too_few_points() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        assert!(convex_hull_fallback(&line, "x").is_err());
    }
}
