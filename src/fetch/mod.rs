//! Roster page retrieval.
//!
//! This module resolves club URLs into club identifiers and downloads roster
//! pages through the [`Fetcher`] trait.

pub mod client;

pub use client::HttpFetcher;

use crate::error::FetchError;
use reqwest::Url;
use std::future::Future;

/// Source of roster markup.
pub trait Fetcher {
    /// Download the page at `url`. Non-2xx answers are errors; no retries.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// A club URL with its derived identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubSource {
    pub url: String,
    /// Slug from the URL path, e.g. `fc-arsenal`.
    pub club_id: String,
}

impl ClubSource {
    /// Resolve a club URL. The identifier is the first path segment:
    /// `https://www.transfermarkt.com/fc-arsenal/startseite/verein/11` gives `fc-arsenal`.
    pub fn resolve(url: &str) -> Result<Self, FetchError> {
        let invalid = |reason: &str| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }

        let club_id = parsed
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| invalid("no club identifier in path"))?;

        Ok(Self {
            url: parsed.to_string(),
            club_id,
        })
    }
}
