use std::str::FromStr;

use serde::Serialize;

use crate::model::Game;

/// Sort options of the catalog listing.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    TitleAsc,
    TitleDesc,
    /// Best rated first, unrated games last.
    RatingDesc,
    /// Unrated games first.
    RatingAsc,
    CreatedDesc,
    CreatedAsc,
}

/// Player-count quick filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerFilter {
    /// Games whose maximum player count is at most `n` (2 to 5).
    UpTo(u8),
    /// Games playable with six or more.
    SixPlus,
}

impl FromStr for PlayerFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6plus" => Ok(Self::SixPlus),
            n => match n.parse::<u8>() {
                Ok(n @ 2..=5) => Ok(Self::UpTo(n)),
                _ => Err(()),
            },
        }
    }
}

impl std::fmt::Display for PlayerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpTo(n) => write!(f, "{n}"),
            Self::SixPlus => write!(f, "6plus"),
        }
    }
}

/// Search, filter, sort and page selection for the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogParams {
    pub search: Option<String>,
    pub players: Option<PlayerFilter>,
    pub sort: CatalogSort,
    /// 1-based page number.
    pub page: usize,
}

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            search: None,
            players: None,
            sort: CatalogSort::default(),
            page: 1,
        }
    }
}

impl CatalogParams {
    /// Build from raw `q`, `players`, `sort` and `page` request parameters.
    /// Unrecognized values fall back to their defaults.
    pub fn from_query(
        q: Option<&str>,
        players: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
    ) -> Self {
        Self {
            search: q
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            players: players.and_then(|p| p.parse().ok()),
            sort: sort
                .and_then(|s| CatalogSort::from_str(s.trim()).ok())
                .unwrap_or_default(),
            page: page
                .and_then(|p| p.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1),
        }
    }
}

/// One card of the catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub game: Game,
    pub cover_url: String,
}

/// One page of the catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub page: usize,
    pub last_page: usize,
    pub total: usize,
}

/// Last page number for `total` rows, never below 1.
pub fn last_page(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_parses_known_values() {
        let params = CatalogParams::from_query(
            Some(" azul "),
            Some("6plus"),
            Some("rating_desc"),
            Some("3"),
        );
        assert_eq!(params.search.as_deref(), Some("azul"));
        assert_eq!(params.players, Some(PlayerFilter::SixPlus));
        assert_eq!(params.sort, CatalogSort::RatingDesc);
        assert_eq!(params.page, 3);
    }

    #[test]
    fn test_from_query_falls_back_on_garbage() {
        let params =
            CatalogParams::from_query(Some("   "), Some("7"), Some("popular"), Some("-2"));
        assert_eq!(params, CatalogParams::default());

        let params = CatalogParams::from_query(None, Some("1"), None, Some("0"));
        assert_eq!(params.players, None);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_player_filter_round_trips_through_display() {
        for raw in ["2", "3", "4", "5", "6plus"] {
            let filter: PlayerFilter = raw.parse().unwrap();
            assert_eq!(filter.to_string(), raw);
        }
    }

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(0, 12), 1);
        assert_eq!(last_page(12, 12), 1);
        assert_eq!(last_page(13, 12), 2);
        assert_eq!(last_page(57, 12), 5);
    }
}
