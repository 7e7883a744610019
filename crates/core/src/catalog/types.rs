//! Types returned by the movie catalog.

use serde::{Deserialize, Deserializer, Serialize};

/// A movie as listed by the catalog's discover and search endpoints.
///
/// Fields are passed through as the catalog sends them; only `id` must be
/// present, everything else may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog movie ID.
    pub id: u64,
    /// Empty when the catalog sends no title or `null`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Poster path relative to the image base URL (e.g., "/abc.jpg").
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    /// ISO 639-1 language code.
    #[serde(default)]
    pub original_language: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MovieSummary {
    /// Get the release year if available.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// Full poster URL under the given image base, if the movie has a poster.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", image_base_url.trim_end_matches('/'), p))
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub results: Vec<MovieSummary>,
}

impl CatalogPage {
    pub fn new(results: Vec<MovieSummary>) -> Self {
        Self { results }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The highest-ranked result.
    pub fn first(&self) -> Option<&MovieSummary> {
        self.results.first()
    }
}

/// Which catalog endpoint a term maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Popularity-sorted default listing.
    Discover,
    /// Free-text search.
    Search,
}

impl SearchMode {
    /// Empty terms browse, anything else searches. The term is not trimmed.
    pub fn for_term(term: &str) -> Self {
        if term.is_empty() {
            SearchMode::Discover
        } else {
            SearchMode::Search
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Discover => "discover",
            SearchMode::Search => "search",
        }
    }
}
