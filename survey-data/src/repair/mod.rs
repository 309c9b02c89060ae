//! Validation, réparation et simplification des géométries
//!
//! La réparation est obligatoire avant toute opération spatiale
//! (sélection de points par polygone, superposition de couches).

pub mod fallback;
pub mod ring;
pub mod validity;

pub use validity::{is_valid, validate, ValidityIssue};

use geo::orient::{Direction, Orient};
use geo::{Area, Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Simplify};
use tracing::{debug, warn};

use crate::types::Layer;
use crate::SurveyDataError;

/// Bilan de réparation d'une couche
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Features examinées
    pub checked: usize,
    /// Features déjà valides
    pub valid: usize,
    /// Features réparées
    pub repaired: usize,
    /// Features supprimées car irréparables
    pub dropped: usize,
}

/// Répare une géométrie. Le résultat passe toujours `validate` sans défaut.
pub fn repair(geom: &Geometry, entity_id: &str) -> Result<Geometry, SurveyDataError> {
    let repaired = match geom {
        Geometry::Point(p) => {
            if !finite(p.0) {
                return Err(SurveyDataError::repair_failed(entity_id, "non-finite point"));
            }
            Geometry::Point(*p)
        }
        Geometry::MultiPoint(mp) => {
            let points: Vec<Point> = mp.0.iter().copied().filter(|p| finite(p.0)).collect();
            if points.is_empty() {
                return Err(SurveyDataError::repair_failed(entity_id, "no finite point"));
            }
            Geometry::MultiPoint(MultiPoint::new(points))
        }
        Geometry::Line(l) => {
            if !finite(l.start) || !finite(l.end) {
                return Err(SurveyDataError::repair_failed(entity_id, "non-finite line"));
            }
            Geometry::Line(*l)
        }
        Geometry::LineString(ls) => Geometry::LineString(
            repair_linestring(ls)
                .ok_or_else(|| SurveyDataError::repair_failed(entity_id, "degenerate linestring"))?,
        ),
        Geometry::MultiLineString(mls) => {
            let lines: Vec<LineString> = mls.0.iter().filter_map(repair_linestring).collect();
            if lines.is_empty() {
                return Err(SurveyDataError::repair_failed(entity_id, "all linestrings degenerate"));
            }
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        Geometry::Polygon(p) => Geometry::Polygon(
            repair_polygon(p, entity_id)
                .ok_or_else(|| SurveyDataError::repair_failed(entity_id, "degenerate polygon"))?,
        ),
        Geometry::MultiPolygon(mp) => {
            let polygons: Vec<Polygon> = mp
                .0
                .iter()
                .filter_map(|p| repair_polygon(p, entity_id))
                .collect();
            if polygons.is_empty() {
                return Err(SurveyDataError::repair_failed(entity_id, "all polygons degenerate"));
            }
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
        Geometry::Rect(r) => return repair(&Geometry::Polygon(r.to_polygon()), entity_id),
        Geometry::Triangle(t) => return repair(&Geometry::Polygon(t.to_polygon()), entity_id),
        Geometry::GeometryCollection(gc) => {
            let parts: Vec<Geometry> = gc.0.iter().filter_map(|g| repair(g, entity_id).ok()).collect();
            if parts.is_empty() {
                return Err(SurveyDataError::repair_failed(entity_id, "empty collection"));
            }
            Geometry::GeometryCollection(GeometryCollection::new_from(parts))
        }
    };

    Ok(repaired)
}

/// Simplifie (Douglas-Peucker) puis répare une géométrie
///
/// `tolerance` est exprimée dans l'unité de la projection de la géométrie.
pub fn simplify(geom: &Geometry, tolerance: f64, entity_id: &str) -> Result<Geometry, SurveyDataError> {
    if tolerance <= 0.0 {
        return repair(geom, entity_id);
    }

    let simplified = match geom {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify(&tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls.simplify(&tolerance)),
        Geometry::Polygon(p) => Geometry::Polygon(p.simplify(&tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.simplify(&tolerance)),
        other => other.clone(),
    };

    repair(&simplified, entity_id)
}

/// Valide et répare toutes les features d'une couche, en place
///
/// Les features irréparables sont retirées de la couche.
pub fn repair_layer(layer: &mut Layer) -> RepairStats {
    let mut stats = RepairStats::default();
    let features = std::mem::take(&mut layer.features);

    for mut feature in features {
        stats.checked += 1;

        let issues = validate(&feature.geometry);
        if issues.is_empty() {
            stats.valid += 1;
            layer.features.push(feature);
            continue;
        }

        match repair(&feature.geometry, &feature.id) {
            Ok(geometry) => {
                debug!(entity_id = %feature.id, issues = ?issues, "Geometry repaired");
                feature.geometry = geometry;
                stats.repaired += 1;
                layer.features.push(feature);
            }
            Err(e) => {
                warn!(layer = %layer.name, error = %e, "Dropping unrepairable feature");
                stats.dropped += 1;
            }
        }
    }

    stats
}

fn finite(c: Coord) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn repair_linestring(ls: &LineString) -> Option<LineString> {
    let mut coords: Vec<Coord> = ls.0.iter().copied().filter(|c| finite(*c)).collect();
    coords.dedup_by(|a, b| ring::coords_equal(*a, *b));
    (coords.len() >= 2).then(|| LineString::new(coords))
}

/// Répare un polygone : rings nettoyés, auto-intersection de l'extérieur
/// remplacée par l'enveloppe convexe, trous invalides retirés, orientation normalisée
fn repair_polygon(poly: &Polygon, entity_id: &str) -> Option<Polygon> {
    let exterior = ring::clean_ring(poly.exterior())?;

    let exterior = if ring::self_intersects(&exterior) {
        warn!(entity_id = %entity_id, "Self-intersecting exterior ring, using convex hull");
        match fallback::convex_hull_fallback(&exterior, entity_id) {
            Ok(hull) => ring::clean_ring(hull.exterior())?,
            Err(e) => {
                warn!(entity_id = %entity_id, error = %e, "Convex hull fallback failed");
                return None;
            }
        }
    } else {
        exterior
    };

    let interiors: Vec<LineString> = poly
        .interiors()
        .iter()
        .filter_map(ring::clean_ring)
        .filter(|r| {
            let keep = !ring::self_intersects(r)
                && Polygon::new(r.clone(), vec![]).unsigned_area() >= validity::MIN_AREA;
            if !keep {
                debug!(entity_id = %entity_id, "Dropping invalid hole");
            }
            keep
        })
        .collect();

    let shell_area = Polygon::new(exterior.clone(), vec![]).unsigned_area();
    if shell_area < validity::MIN_AREA {
        return None;
    }

    Some(Polygon::new(exterior, interiors).orient(Direction::Default))
}
