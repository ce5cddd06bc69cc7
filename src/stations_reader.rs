// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Station roster ingest.
//!
//! Reads an operator station CSV (id, name, latitude, longitude). Roster
//! files in the wild are ISO-8859-1 and occasionally carry rows with
//! missing or junk coordinates, so the reader works on byte records,
//! decodes text fields lossily, and drops rows it cannot use with a
//! warning instead of failing the whole import.

use crate::StationId;
use ahash::AHashSet;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedStation {
    pub id: StationId,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

pub fn read_stations_csv(path: &Path) -> Result<Vec<ImportedStation>, Box<dyn Error>> {
    let file = File::open(path)?;
    read_stations(BufReader::new(file))
}

pub fn read_stations<R: Read>(reader: R) -> Result<Vec<ImportedStation>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let column = |wanted: &str| {
        headers
            .iter()
            .position(|h| String::from_utf8_lossy(h).trim().eq_ignore_ascii_case(wanted))
    };

    let id_column = column("id").ok_or("stations CSV has no id column")?;
    let lat_column = column("latitude").ok_or("stations CSV has no latitude column")?;
    let lon_column = column("longitude").ok_or("stations CSV has no longitude column")?;
    let name_column = column("name");

    let mut stations = Vec::new();
    let mut seen: AHashSet<StationId> = AHashSet::new();

    for (row, result) in rdr.byte_records().enumerate() {
        let record = result?;
        let field = |index: usize| {
            record
                .get(index)
                .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        };

        let id = field(id_column).and_then(|f| f.parse::<StationId>().ok());
        let lat = field(lat_column).and_then(|f| f.parse::<f64>().ok());
        let lon = field(lon_column).and_then(|f| f.parse::<f64>().ok());

        let (Some(id), Some(lat), Some(lon)) = (id, lat, lon) else {
            warn!(row, "skipping station row with unparsable id or coordinates");
            continue;
        };
        if !lat.is_finite() || !lon.is_finite() {
            warn!(row, id, "skipping station with non-finite coordinates");
            continue;
        }
        if !seen.insert(id) {
            warn!(row, id, "dropping duplicate station id");
            continue;
        }

        let name = name_column.and_then(field).filter(|n| !n.is_empty());
        stations.push(ImportedStation { id, name, lat, lon });
    }

    Ok(stations)
}
