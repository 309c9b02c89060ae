//! Parser pour les fichiers .prj (WKT ESRI/OGC) accompagnant les shapefiles

use std::sync::OnceLock;

use memchr::memmem;
use regex::Regex;

use crate::types::Projection;
use crate::SurveyDataError;

/// Noms WKT connus (systèmes géographiques et projetés sans zone)
const KNOWN_NAMES: &[(&str, u32)] = &[
    ("WGS_84_Pseudo_Mercator", 3857),
    ("WGS 84 / Pseudo-Mercator", 3857),
    ("GCS_SIRGAS_2000", 4674),
    ("SIRGAS 2000", 4674),
    ("GCS_WGS_1984", 4326),
    ("WGS 84", 4326),
];

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
    })
}

fn utm_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"PROJCS\[\s*"(WGS_1984|WGS 84|SIRGAS_2000|SIRGAS 2000)[ _/]+UTM[ _]+[Zz]one[ _]+(\d{1,2})([NS])"#)
            .expect("valid regex")
    })
}

/// Dernier AUTHORITY EPSG à la profondeur 1 (enfant direct de la racine).
/// Ceux des GEOGCS, DATUM ou SPHEROID imbriqués sont ignorés.
fn root_authority(content: &str) -> Option<u32> {
    authority_regex()
        .captures_iter(content)
        .filter(|c| c.get(0).is_some_and(|m| bracket_depth(&content[..m.start()]) == 1))
        .last()
        .and_then(|c| c[1].parse::<u32>().ok())
}

/// Profondeur de crochets à la fin de `prefix`, hors chaînes entre guillemets
fn bracket_depth(prefix: &str) -> usize {
    let mut depth = 0usize;
    let mut quoted = false;
    for b in prefix.bytes() {
        match b {
            b'"' => quoted = !quoted,
            b'[' if !quoted => depth += 1,
            b']' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Parse le contenu d'un fichier .prj pour en déduire le code EPSG
pub fn parse(data: &[u8]) -> Result<Projection, SurveyDataError> {
    let content = String::from_utf8_lossy(data);
    let content = content.trim();

    if content.is_empty() {
        return Err(SurveyDataError::UnknownProjection("empty .prj file".to_string()));
    }

    let is_projected = memmem::find(content.as_bytes(), b"PROJCS[").is_some();

    // 1. AUTHORITY["EPSG","n"] porté par le nœud racine du WKT
    if let Some(epsg) = root_authority(content) {
        let projection = Projection::from_epsg(epsg);
        if is_projected && projection.is_geographic() {
            return Err(SurveyDataError::UnknownProjection(format!(
                "projected CRS tagged with geographic EPSG:{}",
                epsg
            )));
        }
        return Ok(projection);
    }

    // 2. Zones UTM nommées
    if let Some(caps) = utm_regex().captures(content) {
        let zone: u32 = caps[2].parse().unwrap_or(0);
        let south = &caps[3] == "S";
        if (1..=60).contains(&zone) {
            let epsg = match (&caps[1], south) {
                ("SIRGAS_2000" | "SIRGAS 2000", true) if (17..=25).contains(&zone) => {
                    31960 + zone
                }
                ("SIRGAS_2000" | "SIRGAS 2000", _) => {
                    return Err(SurveyDataError::UnknownProjection(format!(
                        "SIRGAS 2000 UTM zone {}{}",
                        zone, &caps[3]
                    )));
                }
                (_, true) => 32700 + zone,
                (_, false) => 32600 + zone,
            };
            return Ok(Projection::from_epsg(epsg));
        }
    }

    // 3. Projections projetées non reconnues : pas de repli sur le GEOGCS
    for &(name, epsg) in KNOWN_NAMES {
        if epsg != 3857 && is_projected {
            continue;
        }
        if content.contains(name) {
            return Ok(Projection::from_epsg(epsg));
        }
    }

    let head: String = content.chars().take(60).collect();
    Err(SurveyDataError::UnknownProjection(head))
}
