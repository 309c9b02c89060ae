//! Projection UTM (Universal Transverse Mercator) sur WGS84
//!
//! Zones supportées : toutes, hémisphère nord (EPSG:32601-32660) et sud
//! (EPSG:32701-32760). Séries de Snyder (USGS PP 1395, §8).

use super::ellipsoid::WGS84;
use super::Geographic;
use crate::MapError;

/// Facteur d'échelle au méridien central
const K0: f64 = 0.9996;
/// False easting
const X0: f64 = 500000.0;
/// False northing dans l'hémisphère sud
const Y0_SOUTH: f64 = 10000000.0;

/// Zone UTM WGS84
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    /// Numéro de zone (1-60)
    pub zone: u32,
    /// Hémisphère sud
    pub south: bool,
}

impl UtmZone {
    /// Zone correspondant à un code EPSG 326xx / 327xx
    pub fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            32601..=32660 => Some(Self {
                zone: epsg - 32600,
                south: false,
            }),
            32701..=32760 => Some(Self {
                zone: epsg - 32700,
                south: true,
            }),
            _ => None,
        }
    }

    pub fn epsg(&self) -> u32 {
        if self.south {
            32700 + self.zone
        } else {
            32600 + self.zone
        }
    }

    /// Longitude du méridien central en radians
    pub fn central_meridian(&self) -> f64 {
        ((self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
    }

    fn false_northing(&self) -> f64 {
        if self.south {
            Y0_SOUTH
        } else {
            0.0
        }
    }
}

/// Longueur de l'arc de méridien de l'équateur à la latitude `lat` (radians)
fn meridian_arc(lat: f64) -> f64 {
    let e2 = WGS84::E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    WGS84::A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

/// Convertit des coordonnées géographiques WGS84 vers UTM
pub fn geographic_to_utm(geo: Geographic, zone: UtmZone) -> Result<(f64, f64), MapError> {
    let a = WGS84::A;
    let e2 = WGS84::E2;
    let ep2 = WGS84::EP2;

    let (lon, lat) = (geo.lon, geo.lat);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(MapError::Reprojection(format!(
            "non-finite geographic coordinate ({}, {})",
            lon, lat
        )));
    }

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = a / (1.0 - e2 * sin_lat.powi(2)).sqrt();
    let t = tan_lat.powi(2);
    let c = ep2 * cos_lat.powi(2);
    let aa = cos_lat * (lon - zone.central_meridian());
    let m = meridian_arc(lat);

    let x = K0
        * n
        * (aa
            + (1.0 - t + c) * aa.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0)
        + X0;

    let y = K0
        * (m + n
            * tan_lat
            * (aa.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * aa.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * aa.powi(6) / 720.0))
        + zone.false_northing();

    if !x.is_finite() || !y.is_finite() {
        return Err(MapError::Reprojection(format!(
            "UTM zone {} projection diverged",
            zone.zone
        )));
    }

    Ok((x, y))
}

/// Convertit UTM vers coordonnées géographiques WGS84
pub fn utm_to_geographic(x: f64, y: f64, zone: UtmZone) -> Result<Geographic, MapError> {
    let a = WGS84::A;
    let e2 = WGS84::E2;
    let ep2 = WGS84::EP2;

    if !x.is_finite() || !y.is_finite() {
        return Err(MapError::Reprojection(format!(
            "non-finite UTM coordinate ({}, {})",
            x, y
        )));
    }

    // Coordonnées réduites
    let x = x - X0;
    let y = y - zone.false_northing();

    // Latitude du pied de la perpendiculaire
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ep2 * cos_phi1.powi(2);
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2) - 252.0 * ep2 - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = zone.central_meridian()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Ok(Geographic::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_24S: UtmZone = UtmZone {
        zone: 24,
        south: true,
    };

    #[test]
    fn test_zone_from_epsg() {
        assert_eq!(UtmZone::from_epsg(32724), Some(ZONE_24S));
        assert_eq!(
            UtmZone::from_epsg(32620),
            Some(UtmZone {
                zone: 20,
                south: false
            })
        );
        assert_eq!(UtmZone::from_epsg(4326), None);
        assert_eq!(UtmZone::from_epsg(32700), None);
        assert_eq!(ZONE_24S.epsg(), 32724);
        assert!((ZONE_24S.central_meridian().to_degrees() - (-39.0)).abs() < 1e-12);
    }

    #[test]
    fn test_natal_forward() {
        // Large de Natal (RN) : -35.0°, -5.0° → ~ (943 600, 9 447 300) en UTM 24S
        let (x, y) = geographic_to_utm(Geographic::from_degrees(-35.0, -5.0), ZONE_24S).unwrap();
        assert!((x - 943_600.0).abs() < 2_000.0, "x={}", x);
        assert!((y - 9_447_300.0).abs() < 2_000.0, "y={}", y);
    }

    #[test]
    fn test_central_meridian_at_equator() {
        let zone = UtmZone {
            zone: 24,
            south: false,
        };
        let (x, y) = geographic_to_utm(Geographic::from_degrees(-39.0, 0.0), zone).unwrap();
        assert!((x - 500_000.0).abs() < 1e-6, "x={}", x);
        assert!(y.abs() < 1e-6, "y={}", y);
    }

    #[test]
    fn test_martinique_inverse() {
        // Fort-de-France : UTM 20N 708000, 1615000 → -61.07°, 14.60°
        let zone = UtmZone {
            zone: 20,
            south: false,
        };
        let geo = utm_to_geographic(708000.0, 1615000.0, zone).unwrap();
        let (lon, lat) = geo.to_degrees();
        assert!((lon - (-61.07)).abs() < 0.2, "lon={}", lon);
        assert!((lat - 14.60).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_roundtrip() {
        for &(lon, lat) in &[(-35.0, -5.0), (-35.3, -5.2), (-41.9, -0.5), (-36.5, -12.0)] {
            let (x, y) = geographic_to_utm(Geographic::from_degrees(lon, lat), ZONE_24S).unwrap();
            let (lon2, lat2) = utm_to_geographic(x, y, ZONE_24S).unwrap().to_degrees();
            assert!((lon2 - lon).abs() < 1e-7, "lon {} -> {}", lon, lon2);
            assert!((lat2 - lat).abs() < 1e-7, "lat {} -> {}", lat, lat2);
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(geographic_to_utm(Geographic::new(f64::NAN, 0.0), ZONE_24S).is_err());
        assert!(utm_to_geographic(f64::INFINITY, 0.0, ZONE_24S).is_err());
    }
}
