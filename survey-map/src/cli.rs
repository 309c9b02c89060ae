//! Définition et implémentation des commandes CLI
//!
//! - `lines` : CSV d'effort → lignes GeoJSON reprojetées
//! - `map` : shapefiles + observations + effort → couches, manifeste, rapport
//! - `repair` : validation / réparation de shapefiles → GeoJSON
//! - `tiles` : plan de tuiles du fond de carte pour une emprise

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::{info, warn};

use survey_map::config::MapConfig;
use survey_map::effort::{effort_lines_to_layer, EffortLineBuilder, DEFAULT_TARGET_EPSG};
use survey_map::export::geojson::export_to_geojson;
use survey_map::map::{compose_map, simplify_layer, write_map, LayerKind, MapInputs};
use survey_map::report::{ErrorLevel, RunError, RunReport};
use survey_map::tiles::{auto_zoom, BBox, TilePlan, ESRI_OCEAN_TEMPLATE};

#[derive(Subcommand)]
pub enum Commands {
    /// Build effort lines (one per segment) from the wide effort CSV
    Lines {
        /// Effort CSV (Index, LineLabel, Date, LatD_Beg, LatD_End, LongD_Beg, LongD_End)
        #[arg(short, long)]
        effort: PathBuf,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Target EPSG (default: 32724, WGS84 / UTM zone 24S)
        #[arg(long, default_value_t = DEFAULT_TARGET_EPSG)]
        epsg: u32,

        /// Coordinate precision (decimal places). Default: 7 for EPSG:4326, 2 for metric CRSs
        #[arg(long)]
        precision: Option<u8>,
    },

    /// Compose a map: polygons, sightings and effort lines over basemap tiles
    Map {
        /// Directory of shapefiles (study area, coastline...)
        #[arg(long)]
        shapes: PathBuf,

        /// Sightings CSV (Lat, Long, Effort)
        #[arg(long)]
        sightings: PathBuf,

        /// Effort CSV
        #[arg(long)]
        effort: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Config preset name (ocean/osm) or path to a JSON config
        #[arg(long, default_value = "ocean")]
        config: String,

        /// Map title
        #[arg(long)]
        title: Option<String>,

        /// Target EPSG (overrides config and SURVEY_MAP_EPSG)
        #[arg(long)]
        epsg: Option<u32>,

        /// Basemap zoom level (default: highest zoom within max_tiles)
        #[arg(long)]
        zoom: Option<u8>,

        /// Keep only sightings inside this polygon layer
        #[arg(long)]
        clip: Option<String>,

        /// EPSG assumed for shapefiles without a usable .prj
        #[arg(long)]
        assume_epsg: Option<u32>,
    },

    /// Validate and repair shapefile geometries, export to GeoJSON
    Repair {
        /// Directory of shapefiles
        #[arg(long)]
        shapes: PathBuf,

        /// Output directory for GeoJSON files
        #[arg(short, long)]
        output: PathBuf,

        /// Douglas-Peucker tolerance in layer units (0 = none)
        #[arg(long, default_value_t = 0.0)]
        simplify: f64,
    },

    /// Print the basemap tile URLs covering an extent
    Tiles {
        /// Extent in degrees: minlon,minlat,maxlon,maxlat
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,

        /// Zoom level
        #[arg(long, conflicts_with = "max_tiles")]
        zoom: Option<u8>,

        /// Maximum number of tiles when the zoom is computed
        #[arg(long, default_value_t = 64)]
        max_tiles: u64,

        /// URL template with {z}, {x}, {y}
        #[arg(long, default_value = ESRI_OCEAN_TEMPLATE)]
        template: String,
    },
}

/// Enregistre l'erreur fatale, affiche le rapport et la propage
fn abort(mut report: RunReport, start: Instant, error: anyhow::Error) -> anyhow::Error {
    report.record_fatal(&format!("{:#}", error));
    report.set_duration(start.elapsed());
    report.finalize();
    report.display();
    error
}

/// Lit les segments, construit et exporte les lignes ; retourne (segments, lignes)
fn export_lines(effort: &Path, output: &Path, epsg: u32, precision: Option<u8>) -> Result<(usize, usize)> {
    let segments = survey_data::read_segments(effort)
        .with_context(|| format!("Failed to read effort file: {}", effort.display()))?;
    let builder = EffortLineBuilder::new(epsg)?;
    let lines = builder.build(&segments)?;

    let layer = effort_lines_to_layer("effort_lines", &lines);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let written = export_to_geojson(&layer, output, precision)?;
    Ok((segments.len(), written))
}

/// Exécute la commande lines
pub fn cmd_lines(effort: &Path, output: &Path, epsg: u32, precision: Option<u8>) -> Result<()> {
    let start = Instant::now();
    let mut report = RunReport::new("lines");

    match export_lines(effort, output, epsg, precision) {
        Ok((segments, written)) => {
            report.record_layer("effort_lines", LayerKind::EffortLines.as_str(), segments, written);
            report.set_duration(start.elapsed());
            report.finalize();
            info!(lines = written, output = %output.display(), "Effort lines exported");
            report.display();
            Ok(())
        }
        Err(e) => Err(abort(report, start, e)),
    }
}

/// Options de la commande map venant de la ligne de commande
pub struct MapArgs {
    pub config: String,
    pub title: Option<String>,
    pub epsg: Option<u32>,
    pub zoom: Option<u8>,
    pub clip: Option<String>,
    pub assume_epsg: Option<u32>,
}

/// Résout la configuration : preset/fichier, puis environnement, puis CLI
fn resolve_config(args: &MapArgs) -> Result<MapConfig> {
    let mut config = MapConfig::resolve(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config))?;
    config.apply_env()?;

    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(epsg) = args.epsg {
        config.target_epsg = epsg;
    }
    if let Some(zoom) = args.zoom {
        config.basemap.zoom = Some(zoom);
    }
    if let Some(clip) = &args.clip {
        config.clip_layer = Some(clip.clone());
    }
    if let Some(epsg) = args.assume_epsg {
        config.assume_epsg = Some(epsg);
    }
    Ok(config)
}

/// Exécute la commande map
pub fn cmd_map(inputs: &MapInputs, output: &Path, args: &MapArgs) -> Result<()> {
    let start = Instant::now();
    let config = resolve_config(args)?;
    info!(
        title = %config.title,
        epsg = config.target_epsg,
        basemap = %config.basemap.url_template,
        "Composing map"
    );

    let composed = match compose_map(inputs, &config) {
        Ok(c) => c,
        Err(e) => return Err(abort(RunReport::new("map"), start, e.into())),
    };

    write_map(&composed, output)?;
    info!(
        layers = composed.layers.len(),
        tiles = composed.manifest.basemap.tiles.len(),
        output = %output.display(),
        "Map written"
    );
    composed.report.display();
    Ok(())
}

/// Exécute la commande repair
pub fn cmd_repair(shapes: &Path, output: &Path, tolerance: f64) -> Result<()> {
    let start = Instant::now();
    let mut report = RunReport::new("repair");

    let layers = match survey_data::read_shapefiles(shapes) {
        Ok(l) => l,
        Err(e) => return Err(abort(report, start, e.into())),
    };
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    for mut layer in layers {
        let features_in = layer.len();
        let stats = survey_data::repair_layer(&mut layer);
        report.record_repair(&layer.name, &stats);

        let collapsed = simplify_layer(&mut layer, tolerance);
        if collapsed > 0 {
            report.record_warning(
                &layer.name,
                &format!("{} geometries collapsed by simplification", collapsed),
            );
            if let Some(s) = report.layers.get_mut(&layer.name) {
                s.dropped += collapsed;
            }
        }

        let path = output.join(format!("{}.geojson", layer.name));
        match export_to_geojson(&layer, &path, None) {
            Ok(written) => {
                report.record_layer(&layer.name, LayerKind::Polygons.as_str(), features_in, written)
            }
            Err(e) => {
                warn!(layer = %layer.name, error = %e, "Layer not exported");
                report.record_error(RunError {
                    level: ErrorLevel::Error,
                    layer: Some(layer.name.clone()),
                    entity_id: None,
                    message: format!("{:#}", e),
                });
            }
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    report.display();
    report.save_to_file(&output.join("report.json"))?;

    let failed = report.failed_layers();
    if !failed.is_empty() {
        bail!("{} layer(s) not exported: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

/// Exécute la commande tiles
pub fn cmd_tiles(bbox: &str, zoom: Option<u8>, max_tiles: u64, template: &str) -> Result<()> {
    let bbox = BBox::parse(bbox)?;
    let zoom = match zoom {
        Some(z) => z,
        None => auto_zoom(&bbox, max_tiles)?,
    };

    let plan = TilePlan::for_extent(&bbox, zoom, template)?;
    info!(
        zoom,
        tiles = plan.len(),
        x_range = ?plan.x_range,
        y_range = ?plan.y_range,
        "Tile plan"
    );

    for tile in &plan.tiles {
        println!("{}", tile.url);
    }
    Ok(())
}
