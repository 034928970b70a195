//! CSV roster import.
//
// Expected header: id,full_name,email_address (extra columns are ignored).

use super::{Directory, Person};
use crate::error::DirectoryError;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["id", "full_name", "email_address"];

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: i64,
    full_name: String,
    #[serde(default)]
    email_address: String,
}

/// Load a roster CSV file into a [`Directory`].
pub fn load_csv(path: &Path) -> Result<Directory, DirectoryError> {
    debug!("Loading roster from {}", path.display());
    let file = File::open(path)
        .map_err(|source| DirectoryError::Io { path: path.to_path_buf(), source })?;
    let directory = read_roster(file)?;
    info!("Loaded {} people from {}", directory.len(), path.display());
    Ok(directory)
}

/// Parse roster CSV from any reader.
pub fn read_roster<R: Read>(reader: R) -> Result<Directory, DirectoryError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DirectoryError::InvalidRow { line: 1, reason: e.to_string() })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DirectoryError::MissingColumn(column));
        }
    }

    let mut people = Vec::new();
    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record.map_err(|e| DirectoryError::InvalidRow {
            line: e.position().map_or(0, |p| p.line()),
            reason: e.to_string(),
        })?;
        if row.full_name.is_empty() {
            return Err(DirectoryError::InvalidRow {
                line: people.len() as u64 + 2,
                reason: format!("person {} has an empty full_name", row.id),
            });
        }
        people.push(Person::new(row.id, row.full_name, row.email_address));
    }

    Directory::from_people(people)
}
