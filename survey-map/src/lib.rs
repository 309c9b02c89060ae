//! # survey-map
//!
//! Préparation des cartes d'une campagne d'observation en mer : lignes
//! d'effort, limites réparées, observations, fond de carte.
//!
//! ## Features
//!
//! - Lignes d'effort (début → fin) reprojetées, avec contrôle de cardinalité
//! - Reprojection Rust pur (WGS84, Web Mercator, UTM), PROJ en option
//! - Sélection des observations par polygone, avec contrôle du CRS
//! - Plan de tuiles XYZ et manifeste de carte
//! - Export GeoJSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Lignes d'effort en UTM 24S
//! survey-map lines --effort effort.csv --output effort_lines.geojson
//!
//! # Carte complète sur fond océanique ESRI
//! survey-map map --shapes shapes/ --sightings sightings.csv --effort effort.csv --output out/
//! ```

pub mod config;
pub mod effort;
pub mod error;
pub mod export;
pub mod layers;
pub mod map;
pub mod report;
pub mod reproject_lite;
pub mod subset;
pub mod tiles;

pub use config::MapConfig;
pub use effort::{EffortLine, EffortLineBuilder, Role, RolePoint};
pub use error::MapError;
pub use layers::reproject_layer;
pub use map::{compose_map, write_map, ComposedMap, MapManifest};
pub use report::{RunReport, RunStatus};
pub use reproject_lite::{ReprojectorLite, SmartReprojector};
pub use subset::points_within;
pub use tiles::{auto_zoom, lonlat_to_tile, tile_bounds, BBox, TilePlan};
