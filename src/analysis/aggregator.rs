//! Cross-club aggregation.
//!
//! This module merges per-club datasets into one combined table and provides
//! grouping and ranking helpers over it.

use crate::context::{RunContext, MERGED_ID};
use crate::dataset::{write_table, ClubDataset};
use crate::error::{AnalysisError, PersistError};
use crate::models::PlayerRecord;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

/// Row-wise union of the club datasets of one run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedDataset {
    clubs: Vec<String>,
    players: Vec<PlayerRecord>,
}

impl CombinedDataset {
    /// Club names in merge order.
    pub fn clubs(&self) -> &[String] {
        &self.clubs
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

    /// Write `<csv_dir>/merged_values.csv`.
    pub fn save(&self, ctx: &RunContext) -> Result<PathBuf, PersistError> {
        let path = ctx.table_path(MERGED_ID);
        write_table(&path, &self.players)?;
        Ok(path)
    }
}

/// Concatenate datasets in the order given. Players listed under two clubs
/// appear twice.
pub fn merge(datasets: &[ClubDataset]) -> Result<CombinedDataset, AnalysisError> {
    if datasets.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let clubs = datasets.iter().map(|d| d.club_name().to_string()).collect();
    let players = datasets
        .iter()
        .flat_map(|d| d.players().iter().cloned())
        .collect();

    Ok(CombinedDataset { clubs, players })
}

/// Group players by club name.
#[allow(dead_code)]
pub fn group_by_club(players: &[PlayerRecord]) -> HashMap<String, Vec<PlayerRecord>> {
    let mut grouped: HashMap<String, Vec<PlayerRecord>> = HashMap::new();

    for player in players {
        grouped
            .entry(player.club.clone())
            .or_default()
            .push(player.clone());
    }

    grouped
}

/// The `n` most valuable players; unknown values are left out and ties keep
/// input order.
pub fn most_valuable(players: &[PlayerRecord], n: usize) -> Vec<PlayerRecord> {
    let mut valued: Vec<&PlayerRecord> = players.iter().filter(|p| p.value.is_some()).collect();

    valued.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
    });
    valued.truncate(n);

    valued.into_iter().cloned().collect()
}

/// Sum of known values per dataset, in input order. A club listed twice
/// gets two entries, each with its own total.
pub fn club_totals(datasets: &[ClubDataset]) -> Vec<(String, f64)> {
    datasets
        .iter()
        .map(|d| (d.club_name().to_string(), d.values().iter().sum()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterRow;

    fn dataset(club_id: &str, items: &[(&str, &str)]) -> ClubDataset {
        let rows: Vec<RosterRow> = items
            .iter()
            .map(|(name, value)| RosterRow {
                name: name.to_string(),
                raw_value: value.to_string(),
            })
            .collect();
        ClubDataset::build(club_id, &rows)
    }

    #[test]
    fn test_merge_empty_is_no_data() {
        assert_eq!(merge(&[]), Err(AnalysisError::NoData));
    }

    #[test]
    fn test_merge_single() {
        let a = dataset("fc-a", &[("Alice", "€2m"), ("Bob", "-"), ("Cleo", "€1m")]);
        let combined = merge(std::slice::from_ref(&a)).unwrap();

        assert_eq!(combined.len(), 3);
        assert!(combined.players().iter().all(|p| p.club == "fc a"));
        assert_eq!(combined.clubs(), &["fc a".to_string()]);
    }

    #[test]
    fn test_merge_preserves_order_and_duplicates() {
        let a = dataset("fc-a", &[("Alice", "€2m"), ("Bob", "€1m")]);
        let b = dataset("fc-b", &[("Bob", "€1m")]);
        let combined = merge(&[b.clone(), a.clone()]).unwrap();

        assert_eq!(combined.len(), a.len() + b.len());
        let order: Vec<(&str, &str)> = combined
            .players()
            .iter()
            .map(|p| (p.name.as_str(), p.club.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("Bob", "fc b"), ("Alice", "fc a"), ("Bob", "fc a")]
        );
    }

    #[test]
    fn test_group_by_club() {
        let a = dataset("fc-a", &[("Alice", "€2m"), ("Bob", "€1m")]);
        let b = dataset("fc-b", &[("Carl", "€1m")]);
        let combined = merge(&[a, b]).unwrap();

        let grouped = group_by_club(combined.players());
        assert_eq!(grouped.get("fc a").map(|v| v.len()), Some(2));
        assert_eq!(grouped.get("fc b").map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_most_valuable() {
        let a = dataset(
            "fc-a",
            &[("Alice", "€2m"), ("Bob", "-"), ("Cleo", "€5m"), ("Dan", "€2m")],
        );
        let top = most_valuable(a.players(), 3);

        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cleo", "Alice", "Dan"]);
        assert!(most_valuable(a.players(), 0).is_empty());
    }

    #[test]
    fn test_club_totals() {
        let a = dataset("fc-a", &[("Alice", "€2m"), ("Bob", "€500k")]);
        let b = dataset("fc-b", &[("Carl", "-")]);

        assert_eq!(
            club_totals(&[a, b]),
            vec![("fc a".to_string(), 2.5), ("fc b".to_string(), 0.0)]
        );
    }

    #[test]
    fn test_club_totals_repeated_club() {
        let a = dataset("fc-a", &[("Alice", "€2m"), ("Bob", "€500k")]);

        assert_eq!(
            club_totals(&[a.clone(), a]),
            vec![("fc a".to_string(), 2.5), ("fc a".to_string(), 2.5)]
        );
    }
}
