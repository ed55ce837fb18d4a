// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Track table loading.
//!
//! The upstream extractor writes one row per recorded flight with the first
//! and last GPS fix of the track and the flight duration. The extract is a
//! gzip-compressed CSV with a header row and seven columns:
//!
//! | index | content            |
//! |-------|--------------------|
//! | 0     | timestamp (unused) |
//! | 1     | origin longitude   |
//! | 2     | origin latitude    |
//! | 3     | unused             |
//! | 4     | dest longitude     |
//! | 5     | dest latitude      |
//! | 6     | duration, seconds  |
//!
//! Rows whose takeoff lies outside the [`BoundingBox::REGION`] are dropped at
//! load time.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::Error;

/// Relative path of the extract when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "data_all.csv.gz";

/// One extract row, read by position. Empty cells are `None`.
#[derive(Debug, Deserialize)]
struct ExtractRow(
    #[allow(dead_code, reason = "timestamp column is not used")] IgnoredAny,
    Option<f64>,
    Option<f64>,
    #[allow(dead_code, reason = "column 3 is not used")] IgnoredAny,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

impl From<ExtractRow> for TrackPoint {
    fn from(row: ExtractRow) -> Self {
        let ExtractRow(_, origin_lon, origin_lat, _, dest_lon, dest_lat, duration_seconds) = row;
        let missing = |value: Option<f64>| value.unwrap_or(f64::NAN);
        TrackPoint {
            origin_lon: missing(origin_lon),
            origin_lat: missing(origin_lat),
            dest_lon: missing(dest_lon),
            dest_lat: missing(dest_lat),
            duration_seconds: missing(duration_seconds),
        }
    }
}

/// First and last fix of one recorded flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub dest_lon: f64,
    pub dest_lat: f64,
    pub duration_seconds: f64,
}

impl TrackPoint {
    /// Takeoff position as `(lon, lat)`.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_lon, self.origin_lat)
    }

    /// Landing position as `(lon, lat)`.
    pub fn destination(&self) -> (f64, f64) {
        (self.dest_lon, self.dest_lat)
    }
}

/// Geographic box around a reference point, tested against takeoff positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Half-extent in degrees, exclusive
    pub half_extent_deg: f64,
}

impl BoundingBox {
    /// The French Alps region the extract is trimmed to.
    pub const REGION: BoundingBox = BoundingBox {
        center_lat: 45.0,
        center_lon: 6.0,
        half_extent_deg: 1.5,
    };

    pub fn contains(&self, point: &TrackPoint) -> bool {
        (point.origin_lat - self.center_lat).abs() < self.half_extent_deg
            && (point.origin_lon - self.center_lon).abs() < self.half_extent_deg
    }
}

/// Ordered, immutable collection of flights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTable {
    rows: Vec<TrackPoint>,
}

impl TrackTable {
    pub fn from_rows(rows: Vec<TrackPoint>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TrackPoint] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.rows.iter()
    }

    /// Copy of the table keeping only flights that took off inside `bbox`.
    pub fn retain_within(&self, bbox: &BoundingBox) -> TrackTable {
        self.iter().filter(|row| bbox.contains(row)).copied().collect()
    }
}

impl FromIterator<TrackPoint> for TrackTable {
    fn from_iter<I: IntoIterator<Item = TrackPoint>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TrackTable {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Load the extract at `path` and trim it to [`BoundingBox::REGION`].
///
/// Files ending in `.gz` are decompressed, anything else is read as plain CSV.
pub fn load(path: impl AsRef<Path>) -> Result<TrackTable, Error> {
    let path = path.as_ref();
    info!("Loading track table from {}", path.display());

    let file = File::open(path).map_err(|e| Error::data_unavailable(path, e))?;
    let reader = BufReader::new(file);

    if path.extension().is_some_and(|ext| ext == "gz") {
        load_from_reader(MultiGzDecoder::new(reader), path)
    } else {
        load_from_reader(reader, path)
    }
}

/// Parse an uncompressed extract from `reader`.
///
/// `origin` only names the source in errors and log lines.
pub fn load_from_reader<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<TrackTable, Error> {
    let origin = origin.as_ref();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut record = csv::StringRecord::new();

    while csv_reader
        .read_record(&mut record)
        .map_err(|e| Error::data_unavailable(origin, e))?
    {
        let line = record.position().map_or(0, csv::Position::line);
        let row: ExtractRow = record
            .deserialize(None)
            .map_err(|e| Error::data_unavailable(origin, format!("line {line}: {e}")))?;
        let point = TrackPoint::from(row);

        // Coordinates may still be NaN here, the region box drops missing takeoffs
        if point.duration_seconds.is_finite() && point.duration_seconds >= 0.0 {
            rows.push(point);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} rows with a negative or missing duration");
    }

    let all = TrackTable::from_rows(rows);
    let table = all.retain_within(&BoundingBox::REGION);
    info!(
        "Track table loaded: {} flights ({} outside the region dropped)",
        table.len(),
        all.len() - table.len()
    );
    debug!("Bounding box: {:?}", BoundingBox::REGION);

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const HEADER: &str = "datetime,lon0,lat0,alt0,lon1,lat1,duration\n";

    fn point(lon: f64, lat: f64, duration: f64) -> TrackPoint {
        TrackPoint {
            origin_lon: lon,
            origin_lat: lat,
            dest_lon: lon + 0.1,
            dest_lat: lat - 0.1,
            duration_seconds: duration,
        }
    }

    #[test]
    fn test_load_skips_header_and_selects_columns() {
        let csv = format!(
            "{HEADER}2021-06-01 10:00:00,5.9,45.3,1200,5.95,45.25,3600\n\
             2021-06-01 11:00:00,6.2,45.8,900,6.3,45.7,60\n"
        );
        let table = load_from_reader(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0],
            TrackPoint {
                origin_lon: 5.9,
                origin_lat: 45.3,
                dest_lon: 5.95,
                dest_lat: 45.25,
                duration_seconds: 3600.0,
            }
        );
        assert_eq!(table.rows()[1].duration_seconds, 60.0);
    }

    #[test]
    fn test_load_applies_region_box() {
        // Annecy is inside, Chamonix is inside, Marseille and Paris are not
        let csv = format!(
            "{HEADER}t,6.13,45.90,0,6.2,45.8,100\n\
             t,6.87,45.92,0,6.9,45.9,100\n\
             t,5.37,43.30,0,5.4,43.3,100\n\
             t,2.35,48.85,0,2.4,48.9,100\n"
        );
        let table = load_from_reader(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|p| BoundingBox::REGION.contains(p)));
    }

    #[test]
    fn test_box_edges_are_exclusive() {
        let bbox = BoundingBox::REGION;
        assert!(bbox.contains(&point(6.0, 45.0, 0.0)));
        assert!(!bbox.contains(&point(6.0, 46.5, 0.0)));
        assert!(!bbox.contains(&point(4.5, 45.0, 0.0)));
        // Only the takeoff is tested
        let mut far_landing = point(6.0, 45.0, 0.0);
        far_landing.dest_lat = 50.0;
        assert!(bbox.contains(&far_landing));
    }

    #[test]
    fn test_region_box_is_idempotent() {
        let table = TrackTable::from_rows(vec![
            point(6.0, 45.0, 10.0),
            point(9.0, 45.0, 10.0),
            point(5.0, 44.0, 10.0),
            point(6.0, 47.0, 10.0),
        ]);

        let once = table.retain_within(&BoundingBox::REGION);
        let twice = once.retain_within(&BoundingBox::REGION);
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_negative_duration_rows_are_skipped() {
        let csv = format!("{HEADER}t,6.0,45.0,0,6.1,45.1,-5\nt,6.0,45.0,0,6.1,45.1,5\n");
        let table = load_from_reader(csv.as_bytes(), "test.csv").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].duration_seconds, 5.0);
    }

    #[test]
    fn test_empty_fields_are_missing_values() {
        let csv = format!(
            "{HEADER}t,6.0,45.0,0,6.1,45.1,600\n\
             t,6.0,45.0,0,,,600\n\
             t,6.0,45.0,0,6.1,45.1,\n\
             t,,,0,6.1,45.1,600\n"
        );
        let table = load_from_reader(csv.as_bytes(), "test.csv").unwrap();

        // Empty duration is skipped, empty takeoff falls outside the region
        assert_eq!(table.len(), 2);
        assert!(table.rows()[1].dest_lon.is_nan());
        assert!(table.rows()[1].dest_lat.is_nan());
        assert_eq!(table.rows()[1].duration_seconds, 600.0);
    }

    #[test]
    fn test_malformed_field_is_data_unavailable() {
        let csv = format!("{HEADER}t,6.0,45.0,0,6.1,north,5\n");
        let err = load_from_reader(csv.as_bytes(), "test.csv").unwrap_err();
        match err {
            Error::DataUnavailable { path, source } => {
                assert_eq!(path, Path::new("test.csv"));
                assert!(source.to_string().contains("line 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_data_unavailable() {
        let csv = format!("{HEADER}t,6.0,45.0\n");
        assert!(matches!(
            load_from_reader(csv.as_bytes(), "test.csv"),
            Err(Error::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load("definitely/not/here/data_all.csv.gz").unwrap_err();
        assert!(matches!(err, Error::DataUnavailable { .. }));
        assert!(err.to_string().contains("data_all.csv.gz"));
    }

    #[test]
    fn test_gzip_reader() {
        let csv = format!("{HEADER}t,6.0,45.0,0,6.1,45.1,1800\n");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let table = load_from_reader(MultiGzDecoder::new(&compressed[..]), "test.csv.gz").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].origin(), (6.0, 45.0));
        assert_eq!(table.rows()[0].destination(), (6.1, 45.1));
    }

    #[test]
    fn test_corrupt_gzip_is_data_unavailable() {
        let garbage: &[u8] = b"\x1f\x8b\x08\x00not really gzip";
        assert!(matches!(
            load_from_reader(MultiGzDecoder::new(garbage), "broken.csv.gz"),
            Err(Error::DataUnavailable { .. })
        ));
    }
}
