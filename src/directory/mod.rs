//! Roster of people available for attendee resolution.
//
// The directory is built once and never mutated afterwards. Embeddings are
// attached by the resolver's index, which owns the directory after load.

use crate::error::DirectoryError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

mod roster_import;
mod sample;
mod validation;

pub use roster_import::*;
pub use validation::*;

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub full_name: String,
    pub email_address: String,
}

impl Person {
    pub fn new(id: i64, full_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self { id, full_name: full_name.into(), email_address: email_address.into() }
    }
}

/// Immutable collection of people, unique by id.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    people: Vec<Person>,
}

impl Directory {
    /// Build a directory, rejecting duplicate ids.
    pub fn from_people(people: Vec<Person>) -> Result<Self, DirectoryError> {
        let mut seen = HashSet::with_capacity(people.len());
        for person in &people {
            if !seen.insert(person.id) {
                return Err(DirectoryError::DuplicateId(person.id));
            }
        }
        debug!("Built directory with {} people", people.len());
        Ok(Self { people })
    }

    /// The demo roster, full of deliberately ambiguous names.
    pub fn sample() -> Self {
        Self { people: sample::sample_people() }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }
}
