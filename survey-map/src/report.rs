//! Rapport d'exécution
//!
//! Collecte les statistiques par couche, les erreurs et les warnings d'une
//! commande, puis les affiche et les sauvegarde en JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use survey_data::RepairStats;

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Toutes les entités ont été conservées
    Success,
    /// Carte produite, mais des entités ont été écartées par la réparation
    PartialSuccess,
    /// Étape interrompue
    Failed,
}

/// Niveau de sévérité des erreurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    /// Erreur fatale : commande abandonnée
    Fatal,
    /// Erreur : entité écartée
    Error,
}

/// Erreur avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub level: ErrorLevel,
    /// Couche concernée (optionnel)
    pub layer: Option<String>,
    /// Identifiant de l'entité (optionnel)
    pub entity_id: Option<String>,
    pub message: String,
}

/// Warning
#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub layer: String,
    pub message: String,
}

/// Statistiques d'une couche
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerStats {
    /// Type de couche (polygons, sightings, effort_lines)
    pub kind: String,
    /// Entités lues
    pub features_in: usize,
    /// Entités exportées
    pub features_out: usize,
    /// Géométries réparées
    pub repaired: usize,
    /// Géométries écartées (irréparables)
    pub dropped: usize,
}

/// Rapport complet d'exécution
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Commande exécutée (lines, map, repair)
    pub command: String,
    pub duration_secs: f64,
    pub status: RunStatus,
    /// Statistiques par couche, triées par nom
    pub layers: BTreeMap<String, LayerStats>,
    pub errors: Vec<RunError>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    /// Crée un nouveau rapport pour une commande
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            layers: BTreeMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre une couche exportée
    pub fn record_layer(&mut self, name: &str, kind: &str, features_in: usize, features_out: usize) {
        let stats = self.layers.entry(name.to_string()).or_default();
        stats.kind = kind.to_string();
        stats.features_in = features_in;
        stats.features_out = features_out;
    }

    /// Enregistre le résultat de la réparation d'une couche
    pub fn record_repair(&mut self, name: &str, repair: &RepairStats) {
        let stats = self.layers.entry(name.to_string()).or_default();
        stats.repaired += repair.repaired;
        stats.dropped += repair.dropped;

        if repair.dropped > 0 {
            self.warnings.push(RunWarning {
                layer: name.to_string(),
                message: format!("{} unrepairable geometries dropped", repair.dropped),
            });
        }
    }

    /// Enregistre une erreur
    pub fn record_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Enregistre une erreur fatale (étape interrompue)
    pub fn record_fatal(&mut self, message: &str) {
        self.errors.push(RunError {
            level: ErrorLevel::Fatal,
            layer: None,
            entity_id: None,
            message: message.to_string(),
        });
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, layer: &str, message: &str) {
        self.warnings.push(RunWarning {
            layer: layer.to_string(),
            message: message.to_string(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Nombre total d'entités écartées
    pub fn total_dropped(&self) -> usize {
        self.layers.values().map(|s| s.dropped).sum()
    }

    /// Nombre total d'entités exportées
    pub fn total_features(&self) -> usize {
        self.layers.values().map(|s| s.features_out).sum()
    }

    /// Couches ayant au moins une erreur (export manqué, lecture refusée)
    pub fn failed_layers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.errors.iter().filter_map(|e| e.layer.as_deref()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_fatal = self.errors.iter().any(|e| e.level == ErrorLevel::Fatal);
        let degraded = !self.errors.is_empty() || self.total_dropped() > 0;

        self.status = if has_fatal {
            RunStatus::Failed
        } else if degraded {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RUN REPORT - {}", self.command);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        if !self.layers.is_empty() {
            println!("\n--- LAYERS ---");
            for (name, stats) in &self.layers {
                println!(
                    "  {} ({}): {} in, {} out, {} repaired, {} dropped",
                    name,
                    stats.kind,
                    stats.features_in,
                    stats.features_out,
                    stats.repaired,
                    stats.dropped
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.layer, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                let location = match (&e.layer, &e.entity_id) {
                    (Some(l), Some(id)) => format!("[{}:{}]", l, id),
                    (Some(l), None) => format!("[{}]", l),
                    (None, Some(id)) => format!("[{}]", id),
                    _ => String::new(),
                };
                println!("  {:?} {} {}", e.level, location, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} layers, {} features, {} dropped, {} errors",
            self.command,
            self.layers.len(),
            self.total_features(),
            self.total_dropped(),
            self.errors.len()
        )
    }
}
