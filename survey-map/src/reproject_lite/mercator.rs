//! Projection Web Mercator (EPSG:3857)
//!
//! Modèle sphérique sur le rayon équatorial WGS84, utilisé par les serveurs
//! de tuiles XYZ.

use super::ellipsoid::WGS84;
use super::Geographic;
use crate::MapError;

/// Latitude limite de la grille Web Mercator (carré de 2π·R de côté)
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Convertit coordonnées géographiques vers Web Mercator (EPSG:3857)
pub fn geographic_to_web_mercator(geo: Geographic) -> Result<(f64, f64), MapError> {
    if !geo.lon.is_finite() || !geo.lat.is_finite() {
        return Err(MapError::Reprojection(format!(
            "non-finite geographic coordinate ({}, {})",
            geo.lon, geo.lat
        )));
    }

    let r = WGS84::A;
    let lat = geo
        .lat
        .clamp(-MAX_LATITUDE.to_radians(), MAX_LATITUDE.to_radians());

    let x = r * geo.lon;
    let y = r * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

    Ok((x, y))
}

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Result<Geographic, MapError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(MapError::Reprojection(format!(
            "non-finite Web Mercator coordinate ({}, {})",
            x, y
        )));
    }

    let r = WGS84::A;
    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Ok(Geographic::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natal_to_web_mercator() {
        let geo = Geographic::from_degrees(-35.0, -5.0);
        let (x, y) = geographic_to_web_mercator(geo).unwrap();

        // X = R·λ ; Y = R·ln(tan(π/4 + φ/2))
        assert!((x - (-3_896_182.177_764)).abs() < 1e-3, "x={}", x);
        assert!((y - (-557_305.257_275)).abs() < 1e-3, "y={}", y);
    }

    #[test]
    fn test_roundtrip() {
        let geo = Geographic::from_degrees(-35.3, -5.2);
        let (x, y) = geographic_to_web_mercator(geo).unwrap();
        let (lon, lat) = web_mercator_to_geographic(x, y).unwrap().to_degrees();

        assert!((lon - (-35.3)).abs() < 1e-9, "lon={}", lon);
        assert!((lat - (-5.2)).abs() < 1e-9, "lat={}", lat);
    }

    #[test]
    fn test_pole_is_clamped() {
        let (_, y) = geographic_to_web_mercator(Geographic::from_degrees(0.0, 90.0)).unwrap();
        let (_, y_max) =
            geographic_to_web_mercator(Geographic::from_degrees(0.0, MAX_LATITUDE)).unwrap();
        assert!(y.is_finite());
        assert_eq!(y, y_max);
        // Le carré Web Mercator fait ±20 037 508 m
        assert!((y_max - 20_037_508.34).abs() < 1.0, "y_max={}", y_max);
    }
}
