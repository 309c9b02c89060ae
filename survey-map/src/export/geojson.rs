//! Export vers GeoJSON avec geozero (streaming)

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, Geometry, MapCoords};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use survey_data::{Feature, Layer, Projection};

/// Nombre de décimales par défaut : 7 en degrés (~1 cm), 2 en mètres
pub fn default_precision(projection: &Projection) -> u8 {
    if projection.is_geographic() {
        7
    } else {
        2
    }
}

/// Exporte une couche en GeoJSON (FeatureCollection avec membre `crs`)
///
/// Retourne le nombre d'entités écrites.
pub fn export_to_geojson(layer: &Layer, output_path: &Path, precision: Option<u8>) -> Result<usize> {
    let projection = layer
        .projection
        .with_context(|| format!("Layer '{}' has no CRS, refusing to export", layer.name))?;
    let precision = precision.unwrap_or_else(|| default_precision(&projection));

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_collection(&mut writer, layer, &projection, precision)?;
    writer.flush()?;

    Ok(layer.features.len())
}

fn write_collection<W: Write>(
    writer: &mut W,
    layer: &Layer,
    projection: &Projection,
    precision: u8,
) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","name":{},"crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"features":["#,
        serde_json::to_string(&layer.name)?,
        projection.epsg
    )?;

    for (i, feature) in layer.features.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write_feature(writer, feature, precision)?;
    }

    writer.write_all(b"]}")?;
    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &Feature, precision: u8) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":{},"geometry":"#,
        serde_json::to_string(&feature.id)?
    )?;

    let geometry = round_geometry_coords(&feature.geometry, precision);
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry
        .process_geom(&mut geom_writer)
        .with_context(|| format!("Failed to encode geometry of {}", feature.id))?;
    writer.write_all(&geom_buf)?;

    // Propriétés triées pour une sortie stable
    let properties: BTreeMap<&str, &str> = feature
        .properties
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    write!(
        writer,
        r#","properties":{}}}"#,
        serde_json::to_string(&properties)?
    )?;

    Ok(())
}

/// Arrondit toutes les coordonnées à `decimals` décimales
pub fn round_geometry_coords(geom: &Geometry, decimals: u8) -> Geometry {
    let factor = 10_f64.powi(decimals as i32);
    geom.map_coords(|c| Coord {
        x: (c.x * factor).round() / factor,
        y: (c.y * factor).round() / factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Point};

    fn sample_layer() -> Layer {
        let mut layer = Layer::new("sightings", Some(Projection::WGS84));
        layer.features.push(Feature {
            id: "sightings_1".to_string(),
            geometry: Geometry::Point(Point::new(-35.123456789, -5.0)),
            properties: [
                ("Species".to_string(), "Stenella \"longirostris\"".to_string()),
                ("Effort".to_string(), "ON".to_string()),
            ]
            .into_iter()
            .collect(),
            feature_type: "sighting".to_string(),
        });
        layer
    }

    #[test]
    fn test_write_feature_is_valid_json() {
        let layer = sample_layer();
        let mut buffer = Vec::new();
        write_feature(&mut buffer, &layer.features[0], 7).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["id"], "sightings_1");
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["properties"]["Species"], "Stenella \"longirostris\"");
        assert_eq!(value["geometry"]["coordinates"][0], -35.1234568);
    }

    #[test]
    fn test_round_geometry_coords() {
        let line = Geometry::LineString(line_string![
            (x: 943_612.3456, y: 9_447_301.987),
            (x: 910_000.004, y: 9_425_000.0),
        ]);
        match round_geometry_coords(&line, 2) {
            Geometry::LineString(ls) => {
                assert_eq!(ls.0[0].x, 943_612.35);
                assert_eq!(ls.0[0].y, 9_447_301.99);
                assert_eq!(ls.0[1].x, 910_000.0);
            }
            other => panic!("Expected LineString, got {:?}", other),
        }
    }

    #[test]
    fn test_default_precision() {
        assert_eq!(default_precision(&Projection::WGS84), 7);
        assert_eq!(default_precision(&Projection::from_epsg(32724)), 2);
    }

    #[test]
    fn test_export_to_geojson() {
        let output_path = std::env::temp_dir().join("survey_map_test_export.geojson");

        let written = export_to_geojson(&sample_layer(), &output_path, None).unwrap();
        assert_eq!(written, 1);

        let content = std::fs::read_to_string(&output_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["name"], "sightings");
        assert_eq!(
            value["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );
        assert_eq!(value["features"].as_array().map(|a| a.len()), Some(1));

        std::fs::remove_file(output_path).ok();
    }

    #[test]
    fn test_export_without_crs_fails() {
        let layer = Layer {
            name: "nocrs".to_string(),
            projection: None,
            features: Vec::new(),
        };
        let output_path = std::env::temp_dir().join("survey_map_test_nocrs.geojson");
        assert!(export_to_geojson(&layer, &output_path, None).is_err());
    }
}
