//! Passage du format large (une ligne par segment) au format long
//! (une ligne par point, avec son rôle)

use std::collections::HashMap;

use geo::Coord;
use survey_data::{SegmentKey, SegmentRecord};

use super::Role;
use crate::MapError;

/// Un point de segment avec son rôle (début ou fin)
#[derive(Debug, Clone, PartialEq)]
pub struct RolePoint {
    pub key: SegmentKey,
    pub role: Role,
    pub lon: f64,
    pub lat: f64,
}

impl RolePoint {
    pub fn coord(&self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Émet deux points par segment : début `(LongD_Beg, LatD_Beg)` puis fin
/// `(LongD_End, LatD_End)`
///
/// # Errors
///
/// - `CoordinateParse` si une coordonnée n'est pas finie
/// - `CoordinateOutOfRange` hors de [-180,180] x [-90,90]
pub fn pivot_longer(segments: &[SegmentRecord]) -> Result<Vec<RolePoint>, MapError> {
    let mut points = Vec::with_capacity(segments.len() * 2);

    for seg in segments {
        let key = seg.key();
        for (role, lon, lat) in [
            (Role::Begin, seg.lon_beg, seg.lat_beg),
            (Role::End, seg.lon_end, seg.lat_end),
        ] {
            check_coordinate(&key, role, lon, lat)?;
            points.push(RolePoint {
                key: key.clone(),
                role,
                lon,
                lat,
            });
        }
    }

    Ok(points)
}

fn check_coordinate(key: &SegmentKey, role: Role, lon: f64, lat: f64) -> Result<(), MapError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(MapError::CoordinateParse {
            key: key.clone(),
            role,
            lon,
            lat,
        });
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(MapError::CoordinateOutOfRange {
            key: key.clone(),
            role,
            lon,
            lat,
        });
    }
    Ok(())
}

/// Un segment reconstitué : clé, point de début, point de fin
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEnds {
    pub key: SegmentKey,
    pub begin: Coord,
    pub end: Coord,
}

#[derive(Default)]
struct Group {
    begins: Vec<Coord>,
    ends: Vec<Coord>,
}

/// Regroupe les points par clé, dans l'ordre de première apparition
///
/// Chaque groupe doit contenir exactement un début et une fin, sinon
/// `Cardinality` avec le rôle fautif et le nombre trouvé.
pub fn group_by_key(points: &[RolePoint]) -> Result<Vec<SegmentEnds>, MapError> {
    let mut order: Vec<SegmentKey> = Vec::new();
    let mut groups: HashMap<SegmentKey, Group> = HashMap::new();

    for point in points {
        check_coordinate(&point.key, point.role, point.lon, point.lat)?;

        let group = groups.entry(point.key.clone()).or_insert_with(|| {
            order.push(point.key.clone());
            Group::default()
        });
        match point.role {
            Role::Begin => group.begins.push(point.coord()),
            Role::End => group.ends.push(point.coord()),
        }
    }

    let mut segments = Vec::with_capacity(order.len());
    for key in order {
        let Some(group) = groups.remove(&key) else {
            continue;
        };

        let begin = single(&key, Role::Begin, &group.begins)?;
        let end = single(&key, Role::End, &group.ends)?;
        segments.push(SegmentEnds { key, begin, end });
    }

    Ok(segments)
}

fn single(key: &SegmentKey, role: Role, coords: &[Coord]) -> Result<Coord, MapError> {
    match coords {
        [c] => Ok(*c),
        _ => Err(MapError::Cardinality {
            key: key.clone(),
            role,
            count: coords.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(index: i64, label: &str, beg: (f64, f64), end: (f64, f64)) -> SegmentRecord {
        SegmentRecord {
            index,
            line_label: label.to_string(),
            date: "2018-01-01".to_string(),
            lon_beg: beg.0,
            lat_beg: beg.1,
            lon_end: end.0,
            lat_end: end.1,
        }
    }

    #[test]
    fn test_pivot_two_points_per_segment() {
        let segments = vec![
            segment(1, "A", (-35.0, -5.0), (-35.3, -5.2)),
            segment(2, "A", (-35.3, -5.2), (-35.6, -5.4)),
        ];
        let points = pivot_longer(&segments).unwrap();

        assert_eq!(points.len(), 4);
        assert_eq!(points[0].role, Role::Begin);
        assert_eq!((points[0].lon, points[0].lat), (-35.0, -5.0));
        assert_eq!(points[1].role, Role::End);
        assert_eq!((points[1].lon, points[1].lat), (-35.3, -5.2));
        assert_eq!(points[2].key.index, 2);
    }

    #[test]
    fn test_pivot_rejects_non_finite() {
        let segments = vec![segment(7, "B", (-35.0, -5.0), (f64::NAN, -5.2))];
        match pivot_longer(&segments) {
            Err(MapError::CoordinateParse { key, role, .. }) => {
                assert_eq!(key.index, 7);
                assert_eq!(role, Role::End);
            }
            other => panic!("Expected CoordinateParse, got {:?}", other),
        }
    }

    #[test]
    fn test_pivot_rejects_out_of_range() {
        // Latitude et longitude inversées dans le tableur
        let segments = vec![segment(3, "C", (-5.0, -135.0), (-5.2, -35.3))];
        assert!(matches!(
            pivot_longer(&segments),
            Err(MapError::CoordinateOutOfRange {
                role: Role::Begin,
                ..
            })
        ));
    }

    #[test]
    fn test_group_keeps_first_appearance_order() {
        let segments = vec![
            segment(9, "Z", (-35.0, -5.0), (-35.1, -5.0)),
            segment(1, "A", (-35.1, -5.0), (-35.2, -5.0)),
            segment(5, "M", (-35.2, -5.0), (-35.3, -5.0)),
        ];
        let groups = group_by_key(&pivot_longer(&segments).unwrap()).unwrap();
        let indexes: Vec<i64> = groups.iter().map(|g| g.key.index).collect();
        assert_eq!(indexes, vec![9, 1, 5]);
    }

    #[test]
    fn test_group_interleaved_roles() {
        let key = segment(1, "A", (0.0, 0.0), (0.0, 0.0)).key();
        let points = vec![
            RolePoint {
                key: key.clone(),
                role: Role::End,
                lon: -35.3,
                lat: -5.2,
            },
            RolePoint {
                key,
                role: Role::Begin,
                lon: -35.0,
                lat: -5.0,
            },
        ];
        let groups = group_by_key(&points).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].begin, Coord { x: -35.0, y: -5.0 });
        assert_eq!(groups[0].end, Coord { x: -35.3, y: -5.2 });
    }

    #[test]
    fn test_duplicate_key_is_cardinality_error() {
        let segments = vec![
            segment(1, "A", (-35.0, -5.0), (-35.3, -5.2)),
            segment(1, "A", (-35.3, -5.2), (-35.6, -5.4)),
        ];
        match group_by_key(&pivot_longer(&segments).unwrap()) {
            Err(MapError::Cardinality { key, role, count }) => {
                assert_eq!(key.index, 1);
                assert_eq!(role, Role::Begin);
                assert_eq!(count, 2);
            }
            other => panic!("Expected Cardinality, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_end_is_cardinality_error() {
        let key = segment(4, "D", (0.0, 0.0), (0.0, 0.0)).key();
        let points = vec![RolePoint {
            key,
            role: Role::Begin,
            lon: -35.0,
            lat: -5.0,
        }];
        assert!(matches!(
            group_by_key(&points),
            Err(MapError::Cardinality {
                role: Role::End,
                count: 0,
                ..
            })
        ));
    }
}
