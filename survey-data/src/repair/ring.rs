//! Nettoyage des rings (points répétés, fermeture, auto-intersections)

use geo::{Coord, Intersects, Line, LineString};

/// Tolérance de comparaison des coordonnées
pub(crate) const TOLERANCE: f64 = 1e-9;

/// Nettoie un ring : coordonnées non finies retirées, doublons consécutifs
/// supprimés, fermeture automatique.
///
/// Retourne `None` si le ring a moins de 3 sommets distincts.
pub fn clean_ring(ring: &LineString) -> Option<LineString> {
    let mut coords: Vec<Coord> = ring
        .0
        .iter()
        .copied()
        .filter(|c| c.x.is_finite() && c.y.is_finite())
        .collect();

    coords.dedup_by(|a, b| coords_equal(*a, *b));

    let was_closed = coords.len() > 1 && coords_equal(coords[0], coords[coords.len() - 1]);
    if was_closed {
        coords.pop();
    }

    if coords.len() < 3 {
        return None;
    }

    if !was_closed {
        let gap = ((coords[0].x - coords[coords.len() - 1].x).powi(2)
            + (coords[0].y - coords[coords.len() - 1].y).powi(2))
        .sqrt();
        tracing::warn!(points = coords.len(), gap = gap, "Auto-closing unclosed ring");
    }

    let first = coords[0];
    coords.push(first);
    Some(LineString::new(coords))
}

/// Vrai si deux segments non adjacents du ring se croisent
pub fn self_intersects(ring: &LineString) -> bool {
    let lines: Vec<Line> = ring.lines().collect();
    let n = lines.len();

    for i in 0..n {
        for j in (i + 2)..n {
            // Le premier et le dernier segment partagent le point de fermeture
            if i == 0 && j == n - 1 {
                continue;
            }
            if lines[i].intersects(&lines[j]) {
                return true;
            }
        }
    }

    false
}

/// Vrai si le ring contient des sommets consécutifs confondus
pub fn has_repeated_points(ring: &LineString) -> bool {
    ring.0.windows(2).any(|w| coords_equal(w[0], w[1]))
}

/// Vrai si le premier et le dernier sommet sont confondus
pub fn is_closed(ring: &LineString) -> bool {
    match (ring.0.first(), ring.0.last()) {
        (Some(&a), Some(&b)) => ring.0.len() > 1 && coords_equal(a, b),
        _ => false,
    }
}

/// Compare deux coordonnées avec tolérance
pub(crate) fn coords_equal(a: Coord, b: Coord) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}
