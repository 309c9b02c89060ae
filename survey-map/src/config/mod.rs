//! Configuration d'une carte : projection, fond de carte, couches

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

use crate::tiles::{ESRI_OCEAN_ATTRIBUTION, ESRI_OCEAN_TEMPLATE};

/// Variables d'environnement reconnues
pub const ENV_EPSG: &str = "SURVEY_MAP_EPSG";
pub const ENV_TILE_URL: &str = "SURVEY_MAP_TILE_URL";
pub const ENV_MAX_TILES: &str = "SURVEY_MAP_MAX_TILES";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapConfig {
    /// Titre de la carte
    pub title: String,

    /// Projection des couches exportées
    pub target_epsg: u32,

    pub basemap: BasemapConfig,

    /// Tolérance Douglas-Peucker (unités de la projection cible), 0 = pas de simplification
    #[serde(default)]
    pub simplify_tolerance: f64,

    /// Décimales des coordonnées exportées (défaut selon la projection)
    #[serde(default)]
    pub precision: Option<u8>,

    /// Marge autour de l'emprise, en fraction de sa taille
    #[serde(default)]
    pub padding: f64,

    /// Couche de polygones servant à filtrer les observations
    #[serde(default)]
    pub clip_layer: Option<String>,

    /// EPSG appliqué aux shapefiles sans `.prj` reconnu
    #[serde(default)]
    pub assume_epsg: Option<u32>,

    #[serde(default)]
    pub layers: LayerNames,
}

/// Fond de carte XYZ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BasemapConfig {
    /// Modèle d'URL avec {z}, {x}, {y}
    pub url_template: String,

    #[serde(default)]
    pub attribution: String,

    /// Zoom fixe ; sinon calculé depuis `max_tiles`
    #[serde(default)]
    pub zoom: Option<u8>,

    #[serde(default = "default_max_tiles")]
    pub max_tiles: u64,
}

fn default_max_tiles() -> u64 {
    64
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            url_template: ESRI_OCEAN_TEMPLATE.to_string(),
            attribution: ESRI_OCEAN_ATTRIBUTION.to_string(),
            zoom: None,
            max_tiles: default_max_tiles(),
        }
    }
}

/// Noms des couches produites
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerNames {
    pub sightings: String,
    pub effort: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            sightings: "sightings".to_string(),
            effort: "effort_lines".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "Survey effort and sightings".to_string(),
            target_epsg: crate::effort::DEFAULT_TARGET_EPSG,
            basemap: BasemapConfig::default(),
            simplify_tolerance: 0.0,
            precision: None,
            padding: 0.05,
            clip_layer: None,
            assume_epsg: None,
            layers: LayerNames::default(),
        }
    }
}

impl MapConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "ocean" => Self::load_embedded(include_str!("presets/ocean.json")),
            "osm" => Self::load_embedded(include_str!("presets/osm.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: ocean, osm", preset),
        }
    }

    /// Preset si le nom est connu, sinon chemin de fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().is_some_and(|e| e == "json") || path.is_file() {
            Self::load(path)
        } else {
            Self::from_preset(name_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les surcharges SURVEY_MAP_* de l'environnement
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_EPSG) {
            self.target_epsg = v
                .trim()
                .parse()
                .with_context(|| format!("{}: invalid EPSG code '{}'", ENV_EPSG, v))?;
        }
        if let Some(v) = lookup(ENV_TILE_URL) {
            self.basemap.url_template = v;
        }
        if let Some(v) = lookup(ENV_MAX_TILES) {
            self.basemap.max_tiles = v
                .trim()
                .parse()
                .with_context(|| format!("{}: invalid tile count '{}'", ENV_MAX_TILES, v))?;
        }
        Ok(())
    }
}
