use std::fs;

use chrono::NaiveDate;
use roadtrip::{load_vehicle, RoadTripError};
use tempfile::TempDir;

fn write_export(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_export_from_disk_preserving_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(
        &dir,
        "Wagon.csv",
        "\u{feff}FUEL RECORDS\r\n\
Odometer (mi),Date,Fill Amount,Price per Unit,Total Price,Partial Fill,MPG,Note,Location\r\n\
1000,2023-1-2,10,3.00,30.00,,0,,Home\r\n\
1300.9,2023-1-20 08:15,11.5,3.10,35.65,,26.1,,Work\r\n\
900,2022-12-30,8,2.90,23.20,Partial,0,first fill,Home\r\n",
    );

    let vehicle = load_vehicle(&path).unwrap();
    let odometers: Vec<f64> = vehicle.fuel_records.iter().map(|r| r.odometer).collect();
    assert_eq!(odometers, vec![1000.0, 1300.9, 900.0]);
    assert_eq!(
        vehicle.fuel_records[1].date.parse().unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 20).unwrap()
    );
    assert!(vehicle.fuel_records[2].is_partial_fill());
    assert_eq!(vehicle.fuel_records[2].note, "first fill");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_vehicle(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, RoadTripError::Io(_)));
}
