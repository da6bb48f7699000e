//! End-to-end training: CSV in, artifact out, artifact served.

use flight_delay_pipeline::config::AppConfig;
use flight_delay_pipeline::models::{load_classifier, save_classifier};
use flight_delay_pipeline::training::train_from_csv;
use flight_delay_pipeline::{FlightRecord, ModelStatus, PredictionService};
use std::io::Write;
use std::path::Path;

/// Sky Airline flights in July are always late; everything else is on time.
fn write_history(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "Fecha-I,Fecha-O,OPERA,TIPOVUELO,MES").unwrap();
    for day in 1..=20 {
        writeln!(
            file,
            "2017-07-{:02} 08:00:00,2017-07-{:02} 08:45:00,Sky Airline,N,7",
            day, day
        )
        .unwrap();
    }
    for day in 1..=28 {
        writeln!(
            file,
            "2017-03-{:02} 08:00:00,2017-03-{:02} 08:05:00,Grupo LATAM,I,3",
            day, day
        )
        .unwrap();
        writeln!(
            file,
            "2017-04-{:02} 12:00:00,2017-04-{:02} 12:10:00,Copa Air,I,4",
            day, day
        )
        .unwrap();
    }
}

#[test]
fn test_train_save_load_serve() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    let artifact = dir.path().join("artifacts").join("model.json");
    write_history(&data);

    let config = AppConfig::default();
    let outcome = train_from_csv(&data, &config.training).unwrap();
    assert!(outcome.classifier.is_fitted());
    assert_eq!(outcome.report.samples, 76);
    assert_eq!(outcome.report.delayed, 20);
    assert!((outcome.report.class_weights.positive - 56.0 / 76.0).abs() < 1e-12);
    assert!((outcome.report.class_weights.negative - 20.0 / 76.0).abs() < 1e-12);
    assert_eq!(outcome.report.recall, 1.0);
    assert!(outcome.report.log_loss < std::f64::consts::LN_2);

    save_classifier(&outcome.classifier, &artifact).unwrap();
    assert!(load_classifier(&artifact).unwrap().is_fitted());

    let service = PredictionService::load_or_unfitted(&artifact);
    assert!(service.is_ready());
    assert!(matches!(service.status(), ModelStatus::Loaded { .. }));

    let predictions = service.predict(&[
        FlightRecord::new("Sky Airline", "N", 7),
        FlightRecord::new("Grupo LATAM", "I", 3),
        FlightRecord::new("Copa Air", "I", 4),
    ]);
    assert_eq!(predictions, vec![1, 0, 0]);
}

#[test]
fn test_malformed_timestamp_aborts_training() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    std::fs::write(
        &data,
        "Fecha-I,Fecha-O,OPERA,TIPOVUELO,MES\n\
         2017-01-01 10:00:00,2017-01-01 10:30:00,Grupo LATAM,I,1\n\
         2017/01/02 10:00,2017-01-02 10:05:00,Grupo LATAM,N,1\n",
    )
    .unwrap();

    let err = match train_from_csv(&data, &AppConfig::default().training) {
        Ok(_) => panic!("training should fail"),
        Err(e) => e,
    };
    assert!(format!("{:#}", err).contains("Fecha-I"));
}

#[test]
fn test_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(train_from_csv(dir.path().join("absent.csv"), &AppConfig::default().training).is_err());
}
