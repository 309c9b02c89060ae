//! Tests d'intégration : lecture de fichiers réels écrits dans un dossier temporaire

use std::path::PathBuf;

use survey_data::{Effort, SurveyDataError};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("survey_data_{}", name));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_read_segments_latin1_semicolon() {
    let dir = temp_dir("segments_latin1");
    let path = dir.join("effort.csv");

    // Export tableur : CP1252, séparateur ';' et virgule décimale
    let mut data = b"Index;LineLabel;Date;LatD_Beg;LatD_End;LongD_Beg;LongD_End;Observa".to_vec();
    data.extend_from_slice(b"\xE7\xE3o\n1;A;2018-01-01;-5,0;-5,2;-35,0;-35,3;ok\n");
    std::fs::write(&path, data).unwrap();

    let segments = survey_data::read_segments(&path).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].lat_end, -5.2);
    assert_eq!(segments[0].lon_end, -35.3);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_read_segments_reports_missing_coordinate() {
    let dir = temp_dir("segments_missing");
    let path = dir.join("effort.csv");
    std::fs::write(
        &path,
        "Index,LineLabel,Date,LatD_Beg,LatD_End,LongD_Beg,LongD_End\n\
         1,A,2018-01-01,-5.0,-5.2,-35.0,-35.3\n\
         2,A,2018-01-01,-5.2,-5.4,-35.3,\n",
    )
    .unwrap();

    match survey_data::read_segments(&path) {
        Err(SurveyDataError::CoordinateParse { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "LongD_End");
        }
        other => panic!("Expected CoordinateParse, got {:?}", other),
    }

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_read_sightings_file() {
    let dir = temp_dir("sightings");
    let path = dir.join("sightings.csv");
    std::fs::write(
        &path,
        "Species,Lat,Long,Effort\nStenella,-5.1,-35.1,ON\nSotalia,-5.3,-35.2,OFF\n",
    )
    .unwrap();

    let sightings = survey_data::read_sightings(&path).unwrap();
    let groups = survey_data::classify_by_effort(&sightings);
    assert_eq!(groups.len(), 2);
    assert!(groups.contains_key(&Effort::On));
    assert!(groups.contains_key(&Effort::Off));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_read_shapefile_with_prj() {
    use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
    use shapefile::{Point, Polygon, PolygonRing};

    let dir = temp_dir("shapes");
    let shp = dir.join("study_area.shp");

    {
        let table = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("NAME").unwrap(), 20);
        let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();

        // Ring extérieur dans le sens horaire (convention shapefile)
        let polygon = Polygon::new(PolygonRing::Outer(vec![
            Point::new(-36.0, -6.0),
            Point::new(-36.0, -4.0),
            Point::new(-34.0, -4.0),
            Point::new(-34.0, -6.0),
            Point::new(-36.0, -6.0),
        ]));
        let mut record = Record::default();
        record.insert(
            "NAME".to_string(),
            FieldValue::Character(Some("box".to_string())),
        );
        writer.write_shape_and_record(&polygon, &record).unwrap();
    }

    std::fs::write(
        dir.join("study_area.prj"),
        r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
    )
    .unwrap();

    let layers = survey_data::read_shapefiles(&dir).unwrap();
    assert_eq!(layers.len(), 1);

    let mut layer = layers.into_iter().next().unwrap();
    assert_eq!(layer.name, "study_area");
    assert_eq!(layer.projection.map(|p| p.epsg), Some(4326));
    assert_eq!(layer.len(), 1);
    assert_eq!(
        layer.features[0].properties.get("NAME").map(String::as_str),
        Some("box")
    );

    let stats = survey_data::repair_layer(&mut layer);
    assert_eq!(stats.checked, 1);
    assert_eq!(stats.dropped, 0);

    std::fs::remove_dir_all(dir).ok();
}
