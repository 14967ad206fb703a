//! Roster loading from CSV with `Name` and `Rating` columns.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::debug;

use super::entity::Roster;
use crate::error::{Result, TeamError};

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Rating")]
    rating: Option<String>,
}

impl Roster {
    /// Loads a roster from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let roster = Self::from_csv_reader(file)?;
        debug!(path = %path.display(), entities = roster.len(), "roster loaded");
        Ok(roster)
    }

    /// Loads a roster from any CSV source.
    ///
    /// Extra columns are ignored. A row with an empty name, a missing or
    /// non-integer rating, or a repeated name fails the whole load.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teams::model::Roster;
    ///
    /// let data = "Name,Rating\nAlice,10\nBob,7\n";
    /// let roster = Roster::from_csv_reader(data.as_bytes()).unwrap();
    /// assert_eq!(roster.len(), 2);
    /// ```
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut roster = Roster::new();
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let row: RosterRow = record.deserialize(Some(&headers))?;

            let name = match row.name {
                Some(name) if !name.is_empty() => name,
                _ => {
                    return Err(TeamError::MalformedRow {
                        line,
                        reason: "missing Name".into(),
                    })
                }
            };
            let rating = match row.rating.as_deref() {
                Some(raw) if !raw.is_empty() => {
                    raw.parse::<i64>().map_err(|_| TeamError::MalformedRow {
                        line,
                        reason: format!("Rating {raw:?} is not an integer"),
                    })?
                }
                _ => {
                    return Err(TeamError::MalformedRow {
                        line,
                        reason: format!("missing Rating for {name}"),
                    })
                }
            };

            roster.push(name, rating)?;
        }
        Ok(roster)
    }
}
