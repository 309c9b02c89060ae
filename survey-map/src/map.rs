//! Composition de la carte : couches, emprise, fond de carte
//!
//! La carte produite est un ensemble de couches GeoJSON dans la projection
//! cible, plus un manifeste (`map.json`) décrivant l'ordre de dessin,
//! l'emprise et les tuiles du fond de carte. Le rendu image est fait ailleurs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use geo::{coord, Rect};
use serde::{Deserialize, Serialize};
use survey_data::{Layer, Projection, SurveyDataError};
use tracing::{info, warn};

use crate::config::MapConfig;
use crate::effort::{effort_lines_to_layer, EffortLineBuilder};
use crate::export::geojson::export_to_geojson;
use crate::layers::{extent_wgs84, reproject_layer};
use crate::report::RunReport;
use crate::subset::points_within;
use crate::tiles::{auto_zoom, BBox, TilePlan, TileRequest};
use crate::MapError;

/// Marge minimale autour de l'emprise, en degrés
const MIN_PADDING_DEG: f64 = 0.01;

/// Fichiers d'entrée d'une carte
#[derive(Debug, Clone)]
pub struct MapInputs {
    /// Dossier de shapefiles (limites, côte, zone d'étude)
    pub shapes_dir: PathBuf,
    /// CSV des observations
    pub sightings: PathBuf,
    /// CSV des segments d'effort
    pub effort: PathBuf,
}

/// Nature d'une couche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Polygons,
    EffortLines,
    Sightings,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polygons => "polygons",
            Self::EffortLines => "effort_lines",
            Self::Sightings => "sightings",
        }
    }
}

/// Couche décrite dans le manifeste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLayer {
    pub name: String,
    pub kind: LayerKind,
    /// Fichier GeoJSON relatif au dossier de sortie
    pub file: String,
    pub features: usize,
}

/// Fond de carte du manifeste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapManifest {
    pub template: String,
    pub attribution: String,
    pub zoom: u8,
    pub tiles: Vec<TileRequest>,
}

/// Manifeste de la carte, consommé par le moteur de rendu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapManifest {
    pub title: String,
    pub target_epsg: u32,
    /// Couches dans l'ordre de dessin (du fond vers le dessus)
    pub layers: Vec<ManifestLayer>,
    /// Emprise en WGS84 (marge comprise)
    pub extent: BBox,
    pub basemap: BasemapManifest,
}

/// Carte composée, prête à être écrite
#[derive(Debug)]
pub struct ComposedMap {
    pub manifest: MapManifest,
    /// Couches dans l'ordre du manifeste
    pub layers: Vec<Layer>,
    pub precision: Option<u8>,
    pub report: RunReport,
}

/// Répare, reprojette et simplifie une couche de polygones
///
/// Les entités que la simplification rend irréparables sont écartées et
/// comptées dans le rapport.
pub fn prepare_polygons(
    mut layer: Layer,
    target_epsg: u32,
    tolerance: f64,
    report: &mut RunReport,
) -> Result<Layer, MapError> {
    let features_in = layer.len();

    let stats = survey_data::repair_layer(&mut layer);
    report.record_repair(&layer.name, &stats);

    let mut layer = reproject_layer(&layer, target_epsg)?;
    let dropped = simplify_layer(&mut layer, tolerance);
    if dropped > 0 {
        report.record_warning(
            &layer.name,
            &format!("{} geometries collapsed by simplification", dropped),
        );
        if let Some(s) = report.layers.get_mut(&layer.name) {
            s.dropped += dropped;
        }
    }

    report.record_layer(&layer.name, LayerKind::Polygons.as_str(), features_in, layer.len());
    Ok(layer)
}

/// Simplifie chaque géométrie en place ; retourne le nombre d'entités écartées
pub fn simplify_layer(layer: &mut Layer, tolerance: f64) -> usize {
    if tolerance <= 0.0 {
        return 0;
    }

    let before = layer.len();
    let features = std::mem::take(&mut layer.features);
    for mut feature in features {
        match survey_data::repair::simplify(&feature.geometry, tolerance, &feature.id) {
            Ok(geometry) => {
                feature.geometry = geometry;
                layer.features.push(feature);
            }
            Err(e) => warn!(layer = %layer.name, error = %e, "Dropping feature after simplification"),
        }
    }
    before - layer.len()
}

/// Emprise WGS84 avec marge ; une emprise ponctuelle reçoit la marge minimale
fn padded_extent(rect: &Rect, padding: f64) -> Result<BBox, MapError> {
    let dx = (rect.width() * padding).max(MIN_PADDING_DEG);
    let dy = (rect.height() * padding).max(MIN_PADDING_DEG);

    let padded = Rect::new(
        coord! { x: (rect.min().x - dx).max(-180.0), y: (rect.min().y - dy).max(-90.0) },
        coord! { x: (rect.max().x + dx).min(180.0), y: (rect.max().y + dy).min(90.0) },
    );
    BBox::from_rect(&padded)
}

/// Exécute la recette complète de la carte
///
/// # Errors
///
/// Toute erreur de lecture, de cardinalité, de coordonnée ou de projection
/// interrompt la composition.
pub fn compose_map(inputs: &MapInputs, config: &MapConfig) -> Result<ComposedMap, MapError> {
    let start = Instant::now();
    let target = config.target_epsg;
    let mut report = RunReport::new("map");

    // 1. Polygones
    let mut polygons = Vec::new();
    for mut layer in survey_data::read_shapefiles(&inputs.shapes_dir)? {
        if layer.projection.is_none() {
            if let Some(epsg) = config.assume_epsg {
                warn!(layer = %layer.name, epsg, "No usable .prj, assuming EPSG");
                report.record_warning(&layer.name, &format!("CRS unset, assumed EPSG:{}", epsg));
                layer.projection = Some(Projection::from_epsg(epsg));
            }
        }
        polygons.push(prepare_polygons(layer, target, config.simplify_tolerance, &mut report)?);
    }

    // 2. Observations
    let records = survey_data::read_sightings(&inputs.sightings)?;
    let groups = survey_data::classify_by_effort(&records);
    info!(
        sightings = records.len(),
        levels = groups.len(),
        "Sightings loaded"
    );
    let sightings = survey_data::sightings_to_layer(&config.layers.sightings, &records);
    let mut sightings = reproject_layer(&sightings, target)?;

    if let Some(clip) = &config.clip_layer {
        let area = polygons.iter().find(|l| &l.name == clip).ok_or_else(|| {
            MapError::Data(SurveyDataError::MissingFile(format!("clip layer '{}'", clip)))
        })?;
        sightings = points_within(&sightings, area)?;
    }
    report.record_layer(
        &sightings.name,
        LayerKind::Sightings.as_str(),
        records.len(),
        sightings.len(),
    );

    // 3. Lignes d'effort
    let segments = survey_data::read_segments(&inputs.effort)?;
    let builder = EffortLineBuilder::new(target)?;
    let lines = builder.build(&segments)?;
    let mut effort = effort_lines_to_layer(&config.layers.effort, &lines);
    effort.projection = Some(builder.target());
    report.record_layer(
        &effort.name,
        LayerKind::EffortLines.as_str(),
        segments.len(),
        effort.len(),
    );

    // 4. Emprise et fond de carte
    let mut ordered: Vec<(LayerKind, Layer)> = polygons
        .into_iter()
        .map(|l| (LayerKind::Polygons, l))
        .collect();
    ordered.push((LayerKind::EffortLines, effort));
    ordered.push((LayerKind::Sightings, sightings));

    let refs: Vec<&Layer> = ordered.iter().map(|(_, l)| l).collect();
    let rect = extent_wgs84(&refs)?
        .ok_or_else(|| MapError::InvalidExtent("no features to map".to_string()))?;
    let extent = padded_extent(&rect, config.padding)?;

    let zoom = match config.basemap.zoom {
        Some(z) => z,
        None => auto_zoom(&extent, config.basemap.max_tiles)?,
    };
    let plan = TilePlan::for_extent(&extent, zoom, &config.basemap.url_template)?;
    info!(zoom, tiles = plan.len(), extent = %extent, "Basemap planned");

    let manifest = MapManifest {
        title: config.title.clone(),
        target_epsg: target,
        layers: ordered
            .iter()
            .map(|(kind, l)| ManifestLayer {
                name: l.name.clone(),
                kind: *kind,
                file: format!("{}.geojson", l.name),
                features: l.len(),
            })
            .collect(),
        extent,
        basemap: BasemapManifest {
            template: config.basemap.url_template.clone(),
            attribution: config.basemap.attribution.clone(),
            zoom,
            tiles: plan.tiles,
        },
    };

    report.set_duration(start.elapsed());
    report.finalize();

    Ok(ComposedMap {
        manifest,
        layers: ordered.into_iter().map(|(_, l)| l).collect(),
        precision: config.precision,
        report,
    })
}

/// Écrit les couches GeoJSON, `map.json` et `report.json`
pub fn write_map(composed: &ComposedMap, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    for (layer, entry) in composed.layers.iter().zip(&composed.manifest.layers) {
        let path = output_dir.join(&entry.file);
        let written = export_to_geojson(layer, &path, composed.precision)?;
        info!(layer = %layer.name, features = written, path = %path.display(), "Layer written");
    }

    let manifest_path = output_dir.join("map.json");
    let json = serde_json::to_string_pretty(&composed.manifest)?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    composed.report.save_to_file(&output_dir.join("report.json"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};
    use std::collections::HashMap;
    use survey_data::Feature;

    #[test]
    fn test_padded_extent_point() {
        let rect = Rect::new(coord! { x: -35.0, y: -5.0 }, coord! { x: -35.0, y: -5.0 });
        let bbox = padded_extent(&rect, 0.05).unwrap();
        assert!((bbox.min_lon - (-35.01)).abs() < 1e-9);
        assert!((bbox.max_lat - (-4.99)).abs() < 1e-9);
    }

    #[test]
    fn test_padded_extent_ratio() {
        let rect = Rect::new(coord! { x: -36.0, y: -6.0 }, coord! { x: -34.0, y: -4.0 });
        let bbox = padded_extent(&rect, 0.1).unwrap();
        assert!((bbox.min_lon - (-36.2)).abs() < 1e-9);
        assert!((bbox.max_lon - (-33.8)).abs() < 1e-9);
    }

    #[test]
    fn test_prepare_polygons() {
        let mut layer = Layer::new("study_area", Some(Projection::WGS84));
        layer.features.push(Feature {
            id: "box".to_string(),
            // Carré de 2° au large de Natal
            geometry: Geometry::Polygon(geo::Polygon::new(
                geo::LineString::from(vec![(-36.0, -6.0), (-34.0, -6.0), (-34.0, -4.0), (-36.0, -4.0)]),
                vec![],
            )),
            properties: HashMap::new(),
            feature_type: "polygon".to_string(),
        });
        layer.features.push(Feature {
            id: "flat".to_string(),
            geometry: Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]),
            properties: HashMap::new(),
            feature_type: "polygon".to_string(),
        });

        let mut report = RunReport::new("map");
        let out = prepare_polygons(layer, 32724, 50.0, &mut report).unwrap();

        assert_eq!(out.projection.map(|p| p.epsg), Some(32724));
        assert_eq!(out.len(), 1);
        let stats = &report.layers["study_area"];
        assert_eq!(stats.features_in, 2);
        assert_eq!(stats.features_out, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_prepare_polygons_without_crs() {
        let layer = Layer::new("nocrs", None);
        let mut report = RunReport::new("map");
        assert!(matches!(
            prepare_polygons(layer, 32724, 0.0, &mut report),
            Err(MapError::MissingCrs(_))
        ));
    }
}
