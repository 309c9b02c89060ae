//! Contrôles de validité topologique

use std::fmt;

use geo::{Area, Coord, Geometry, LineString, Polygon};

use super::ring;

/// Défaut de validité détecté sur une géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidityIssue {
    /// Coordonnée NaN ou infinie
    NonFinite,
    /// Ring avec moins de 4 points, ligne avec moins de 2
    TooFewPoints,
    /// Ring dont le premier et le dernier point diffèrent
    UnclosedRing,
    /// Sommets consécutifs confondus
    RepeatedPoints,
    /// Segments non adjacents qui se croisent
    SelfIntersection,
    /// Polygone d'aire nulle
    ZeroArea,
}

impl fmt::Display for ValidityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NonFinite => "non-finite coordinate",
            Self::TooFewPoints => "too few points",
            Self::UnclosedRing => "unclosed ring",
            Self::RepeatedPoints => "repeated points",
            Self::SelfIntersection => "self-intersection",
            Self::ZeroArea => "zero area",
        };
        f.write_str(s)
    }
}

/// Aire minimale d'un polygone considéré comme non dégénéré
pub(crate) const MIN_AREA: f64 = 1e-14;

/// Liste les défauts de validité d'une géométrie (vide si valide)
pub fn validate(geom: &Geometry) -> Vec<ValidityIssue> {
    let mut issues = Vec::new();
    collect_issues(geom, &mut issues);
    issues
}

/// Vrai si la géométrie n'a aucun défaut
pub fn is_valid(geom: &Geometry) -> bool {
    validate(geom).is_empty()
}

fn push(issues: &mut Vec<ValidityIssue>, issue: ValidityIssue) {
    if !issues.contains(&issue) {
        issues.push(issue);
    }
}

fn coord_finite(c: &Coord) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn collect_issues(geom: &Geometry, issues: &mut Vec<ValidityIssue>) {
    match geom {
        Geometry::Point(p) => {
            if !coord_finite(&p.0) {
                push(issues, ValidityIssue::NonFinite);
            }
        }
        Geometry::MultiPoint(mp) => {
            if mp.0.iter().any(|p| !coord_finite(&p.0)) {
                push(issues, ValidityIssue::NonFinite);
            }
        }
        Geometry::Line(l) => {
            if !coord_finite(&l.start) || !coord_finite(&l.end) {
                push(issues, ValidityIssue::NonFinite);
            }
        }
        Geometry::LineString(ls) => check_linestring(ls, issues),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                check_linestring(ls, issues);
            }
        }
        Geometry::Polygon(p) => check_polygon(p, issues),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                check_polygon(p, issues);
            }
        }
        Geometry::Rect(r) => check_polygon(&r.to_polygon(), issues),
        Geometry::Triangle(t) => check_polygon(&t.to_polygon(), issues),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_issues(g, issues);
            }
        }
    }
}

fn check_linestring(ls: &LineString, issues: &mut Vec<ValidityIssue>) {
    if ls.0.iter().any(|c| !coord_finite(c)) {
        push(issues, ValidityIssue::NonFinite);
    }
    if ls.0.len() < 2 {
        push(issues, ValidityIssue::TooFewPoints);
    }
    if ring::has_repeated_points(ls) {
        push(issues, ValidityIssue::RepeatedPoints);
    }
}

fn check_ring(r: &LineString, issues: &mut Vec<ValidityIssue>) {
    if r.0.iter().any(|c| !coord_finite(c)) {
        push(issues, ValidityIssue::NonFinite);
        return;
    }
    if r.0.len() < 4 {
        push(issues, ValidityIssue::TooFewPoints);
        return;
    }
    if !ring::is_closed(r) {
        push(issues, ValidityIssue::UnclosedRing);
    }
    if ring::has_repeated_points(r) {
        push(issues, ValidityIssue::RepeatedPoints);
    }
    if ring::self_intersects(r) {
        push(issues, ValidityIssue::SelfIntersection);
    }
}

fn check_polygon(p: &Polygon, issues: &mut Vec<ValidityIssue>) {
    check_ring(p.exterior(), issues);
    for interior in p.interiors() {
        check_ring(interior, issues);
    }

    let shell = Polygon::new(p.exterior().clone(), vec![]);
    if shell.unsigned_area() < MIN_AREA {
        push(issues, ValidityIssue::ZeroArea);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};

    #[test]
    fn test_valid_square() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(is_valid(&Geometry::Polygon(square)));
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let bowtie = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let issues = validate(&Geometry::Polygon(bowtie));
        assert!(issues.contains(&ValidityIssue::SelfIntersection));
    }

    #[test]
    fn test_unclosed_ring() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let poly = Polygon::new(ring, vec![]);
        // geo referme automatiquement les rings à la construction
        assert!(ring::is_closed(poly.exterior()));
    }

    #[test]
    fn test_collinear_polygon_zero_area() {
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        let issues = validate(&Geometry::Polygon(flat));
        assert!(issues.contains(&ValidityIssue::ZeroArea));
    }

    #[test]
    fn test_non_finite_point() {
        let p = Geometry::Point(Point::new(f64::NAN, 1.0));
        assert_eq!(validate(&p), vec![ValidityIssue::NonFinite]);
    }
}
