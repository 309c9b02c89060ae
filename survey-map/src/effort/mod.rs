//! Construction des lignes d'effort
//!
//! Chaque segment du CSV d'effort devient une ligne à deux sommets (début puis
//! fin), reprojetée dans le système cible :
//!
//! 1. passage au format long ([`pivot_longer`])
//! 2. regroupement par (Index, LineLabel, Date) avec contrôle de cardinalité
//! 3. points en EPSG:4326, reprojetés vers la cible
//! 4. fusion de chaque paire en `LineString`
//!
//! Toute erreur interrompt la construction : aucun résultat partiel.

mod pivot;

pub use pivot::{group_by_key, pivot_longer, RolePoint, SegmentEnds};

use std::collections::HashMap;
use std::fmt;

use geo::{Coord, Geometry, LineString};
use survey_data::{Feature, Layer, Projection, SegmentKey, SegmentRecord};
use tracing::{debug, info};

use crate::reproject_lite::SmartReprojector;
use crate::MapError;

/// Projection cible par défaut : WGS84 / UTM zone 24S
pub const DEFAULT_TARGET_EPSG: u32 = 32724;

/// Rôle d'un point dans un segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Begin,
    End,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Begin => write!(f, "Begin"),
            Role::End => write!(f, "End"),
        }
    }
}

/// Une ligne d'effort reprojetée
#[derive(Debug, Clone, PartialEq)]
pub struct EffortLine {
    pub key: SegmentKey,
    /// Deux sommets : début puis fin
    pub geometry: LineString,
    pub projection: Projection,
}

impl EffortLine {
    /// Premier sommet, `None` si la géométrie est vide
    pub fn begin(&self) -> Option<Coord> {
        self.geometry.0.first().copied()
    }

    pub fn end(&self) -> Option<Coord> {
        self.geometry.0.last().copied()
    }
}

/// Constructeur de lignes d'effort vers une projection cible
pub struct EffortLineBuilder {
    target: Projection,
    reprojector: SmartReprojector,
}

impl EffortLineBuilder {
    /// Crée un constructeur vers `target_epsg` (source : EPSG:4326)
    pub fn new(target_epsg: u32) -> Result<Self, MapError> {
        let reprojector = SmartReprojector::new(Projection::WGS84.epsg, target_epsg)?;
        debug!(
            target_epsg,
            reprojector = reprojector.description(),
            "Effort line builder ready"
        );
        Ok(Self {
            target: Projection::from_epsg(target_epsg),
            reprojector,
        })
    }

    pub fn target(&self) -> Projection {
        self.target
    }

    /// Construit une ligne par segment du tableau large
    pub fn build(&self, segments: &[SegmentRecord]) -> Result<Vec<EffortLine>, MapError> {
        let points = pivot_longer(segments)?;
        self.build_from_roles(&points)
    }

    /// Construit les lignes depuis des points au format long
    pub fn build_from_roles(&self, points: &[RolePoint]) -> Result<Vec<EffortLine>, MapError> {
        let groups = group_by_key(points)?;

        let lines = groups
            .into_iter()
            .map(|g| {
                let begin = self.project(g.begin)?;
                let end = self.project(g.end)?;
                Ok(EffortLine {
                    key: g.key,
                    geometry: LineString::new(vec![begin, end]),
                    projection: self.target,
                })
            })
            .collect::<Result<Vec<_>, MapError>>()?;

        info!(
            points = points.len(),
            lines = lines.len(),
            epsg = self.target.epsg,
            "Effort lines built"
        );
        Ok(lines)
    }

    fn project(&self, c: Coord) -> Result<Coord, MapError> {
        let (x, y) = self.reprojector.transform_point(c.x, c.y)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(MapError::Reprojection(format!(
                "({}, {}) -> non-finite ({}, {})",
                c.x, c.y, x, y
            )));
        }
        Ok(Coord { x, y })
    }
}

/// Convertit les lignes en couche (propriétés Index, LineLabel, Date)
pub fn effort_lines_to_layer(name: &str, lines: &[EffortLine]) -> Layer {
    let projection = lines
        .first()
        .map(|l| l.projection)
        .unwrap_or(Projection::from_epsg(DEFAULT_TARGET_EPSG));
    let mut layer = Layer::new(name, Some(projection));

    layer.features = lines
        .iter()
        .map(|line| {
            let mut properties = HashMap::with_capacity(3);
            properties.insert("Index".to_string(), line.key.index.to_string());
            properties.insert("LineLabel".to_string(), line.key.line_label.clone());
            properties.insert("Date".to_string(), line.key.date.clone());

            Feature {
                id: format!("{}_{}", name, line.key),
                geometry: Geometry::LineString(line.geometry.clone()),
                properties,
                feature_type: "effort_line".to_string(),
            }
        })
        .collect();

    layer
}
