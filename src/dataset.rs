//! Per-club datasets and their CSV tables.
//!
//! A table has the header `name,club_name,value (mln euros)`; an unknown value
//! is an empty field. Tables are written to a temporary file in the target
//! directory and renamed into place, so a reader never sees a partial file.

use crate::context::RunContext;
use crate::error::PersistError;
use crate::models::PlayerRecord;
use crate::roster::{normalize, RosterRow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One CSV line.
#[derive(Debug, Serialize, Deserialize)]
struct TableRow {
    name: String,
    club_name: String,
    #[serde(rename = "value (mln euros)")]
    value: Option<f64>,
}

impl From<&PlayerRecord> for TableRow {
    fn from(p: &PlayerRecord) -> Self {
        Self {
            name: p.name.clone(),
            club_name: p.club.clone(),
            value: p.value,
        }
    }
}

impl From<TableRow> for PlayerRecord {
    fn from(row: TableRow) -> Self {
        Self {
            name: row.name,
            club: row.club_name,
            value: row.value,
        }
    }
}

/// `fc-bayern-munchen` -> `fc bayern munchen`
pub fn humanize(club_id: &str) -> String {
    club_id.replace('-', " ")
}

/// The cleaned roster of one club. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClubDataset {
    club_id: String,
    club_name: String,
    players: Vec<PlayerRecord>,
}

impl ClubDataset {
    /// Normalize every row's value and attribute it to the club.
    pub fn build(club_id: &str, rows: &[RosterRow]) -> Self {
        let club_name = humanize(club_id);
        let players = rows
            .iter()
            .map(|row| PlayerRecord {
                name: row.name.clone(),
                club: club_name.clone(),
                value: normalize(&row.raw_value),
            })
            .collect();

        Self {
            club_id: club_id.to_string(),
            club_name,
            players,
        }
    }

    pub fn club_id(&self) -> &str {
        &self.club_id
    }

    pub fn club_name(&self) -> &str {
        &self.club_name
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Known values, in roster order.
    pub fn values(&self) -> Vec<f64> {
        self.players.iter().filter_map(|p| p.value).collect()
    }

    /// Write `<csv_dir>/<club_id>_values.csv`, replacing any previous run's file.
    pub fn save(&self, ctx: &RunContext) -> Result<PathBuf, PersistError> {
        let path = ctx.table_path(&self.club_id);
        write_table(&path, &self.players)?;
        Ok(path)
    }

    /// Read a persisted club table back.
    #[allow(dead_code)]
    pub fn load(club_id: &str, path: &Path) -> Result<Self, PersistError> {
        let players = read_table(path)?;
        let club_name = players
            .first()
            .map(|p| p.club.clone())
            .unwrap_or_else(|| humanize(club_id));

        Ok(Self {
            club_id: club_id.to_string(),
            club_name,
            players,
        })
    }
}

/// Atomically write players as a CSV table.
pub fn write_table(path: &Path, players: &[PlayerRecord]) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| PersistError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;

    {
        let mut writer = csv::Writer::from_writer(BufWriter::new(tmp.as_file()));
        for player in players {
            writer.serialize(TableRow::from(player)).map_err(csv_err)?;
        }
        if players.is_empty() {
            writer
                .write_record(["name", "club_name", "value (mln euros)"])
                .map_err(csv_err)?;
        }
        let mut inner = writer
            .into_inner()
            .map_err(|e| io_err(e.into_error()))?;
        inner.flush().map_err(io_err)?;
    }

    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    debug!("Wrote {} rows to {}", players.len(), path.display());

    Ok(())
}

/// Read a CSV table written by [`write_table`].
pub fn read_table(path: &Path) -> Result<Vec<PlayerRecord>, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    csv::Reader::from_reader(file)
        .deserialize::<TableRow>()
        .map(|row| {
            row.map(PlayerRecord::from)
                .map_err(|source| PersistError::Csv {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}
