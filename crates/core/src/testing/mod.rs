//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing list sessions to be exercised without a real backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfview_core::testing::{MockListFetcher, MockMutationClient, MockPresetPersistence};
//!
//! let fetcher = MockListFetcher::new();
//! let mutations = MockMutationClient::new();
//! let presets = MockPresetPersistence::new();
//!
//! // Configure mock responses
//! fetcher.set_items("watching", vec![/* raw records */]);
//! mutations.fail_for("42", MutationError::Rejected("locked".into()));
//!
//! // Use in ListSession::new(...)
//! ```

mod mock_list_fetcher;
mod mock_mutation_client;
mod mock_preset_persistence;

pub use mock_list_fetcher::{MockListFetcher, RecordedFetch};
pub use mock_mutation_client::{MockMutationClient, RecordedMutation};
pub use mock_preset_persistence::MockPresetPersistence;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::filter::FilterSpecification;
    use crate::item::{CatalogItem, MediaType, TrackedItem, WatchStatus};
    use crate::preset::FilterPreset;

    /// A 12-episode anime entry, unrated, no tags, added 2024-01-15.
    pub fn tracked_item(id: &str, title: &str, status: WatchStatus) -> TrackedItem {
        TrackedItem {
            id: id.to_string(),
            status,
            rating: None,
            notes: None,
            tags: Default::default(),
            added_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()),
            date_started: None,
            date_completed: None,
            rewatch_count: None,
            progress: 0,
            catalog: CatalogItem {
                id: format!("catalog-{}", id),
                title: title.to_string(),
                alternate_titles: Vec::new(),
                media_type: MediaType::Anime,
                episodes: Some(12),
                chapters: None,
                score: None,
                genres: Vec::new(),
                themes: Vec::new(),
            },
        }
    }

    /// A preset with a fixed creation time.
    pub fn preset(id: &str, name: &str, spec: FilterSpecification) -> FilterPreset {
        FilterPreset {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            filter_specification: spec,
            is_default: false,
            is_public: false,
            usage_count: 0,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn entry(
        id: &str,
        title: &str,
        status: WatchStatus,
        media_type: MediaType,
        rating: Option<f64>,
        score: Option<f64>,
        progress: u32,
        added: (i32, u32, u32),
    ) -> TrackedItem {
        let mut item = tracked_item(id, title, status);
        item.catalog.media_type = media_type;
        item.rating = rating;
        item.catalog.score = score;
        item.progress = progress;
        item.added_at = Some(
            Utc.with_ymd_and_hms(added.0, added.1, added.2, 8, 30, 0)
                .unwrap(),
        );
        if media_type == MediaType::Manga {
            item.catalog.episodes = None;
        }
        item
    }

    fn tags(values: &[&str]) -> std::collections::BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// A small mixed collection: every status, several media types, rated
    /// and unrated entries.
    pub fn sample_collection() -> Vec<TrackedItem> {
        let mut frieren = entry(
            "1",
            "Sousou no Frieren",
            WatchStatus::Watching,
            MediaType::Anime,
            Some(9.5),
            Some(9.3),
            20,
            (2024, 6, 1),
        );
        frieren.catalog.episodes = Some(28);
        frieren.catalog.alternate_titles = vec!["Frieren: Beyond Journey's End".to_string()];
        frieren.catalog.genres = vec!["Adventure".to_string(), "Fantasy".to_string()];
        frieren.tags = tags(&["favorite"]);
        frieren.date_started = NaiveDate::from_ymd_opt(2024, 6, 2);

        let mut mushishi = entry(
            "2",
            "Mushishi",
            WatchStatus::Completed,
            MediaType::Anime,
            Some(9.0),
            Some(8.7),
            26,
            (2023, 11, 20),
        );
        mushishi.catalog.episodes = Some(26);
        mushishi.catalog.genres = vec!["Mystery".to_string(), "Slice of Life".to_string()];
        mushishi.tags = tags(&["favorite", "comfy"]);
        mushishi.rewatch_count = Some(1);
        mushishi.date_completed = NaiveDate::from_ymd_opt(2024, 1, 10);

        let mut berserk = entry(
            "3",
            "Berserk",
            WatchStatus::PlanToWatch,
            MediaType::Manga,
            None,
            Some(9.4),
            0,
            (2024, 3, 5),
        );
        berserk.catalog.chapters = Some(374);
        berserk.catalog.genres = vec!["Action".to_string(), "Drama".to_string()];

        let mut bebop = entry(
            "4",
            "Cowboy Bebop",
            WatchStatus::Completed,
            MediaType::Anime,
            Some(8.0),
            Some(8.8),
            26,
            (2022, 8, 14),
        );
        bebop.catalog.episodes = Some(26);
        bebop.catalog.genres = vec!["Action".to_string(), "Sci-Fi".to_string()];
        bebop.rewatch_count = Some(2);
        bebop.tags = tags(&["classic"]);
        bebop.date_completed = NaiveDate::from_ymd_opt(2022, 9, 1);

        let mut spirited_away = entry(
            "5",
            "Spirited Away",
            WatchStatus::Completed,
            MediaType::Movie,
            Some(7.5),
            Some(8.8),
            1,
            (2023, 2, 2),
        );
        spirited_away.catalog.episodes = Some(1);
        spirited_away.notes = Some("Watched at the cinema re-release".to_string());

        let mut vinland = entry(
            "6",
            "Vinland Saga",
            WatchStatus::OnHold,
            MediaType::Manga,
            Some(6.0),
            Some(9.0),
            120,
            (2023, 5, 17),
        );
        vinland.catalog.chapters = None;
        vinland.catalog.themes = vec!["Historical".to_string()];

        let chainsaw = entry(
            "7",
            "Chainsaw Man",
            WatchStatus::Dropped,
            MediaType::Anime,
            Some(5.0),
            Some(8.5),
            4,
            (2022, 10, 12),
        );

        let mut monster = entry(
            "8",
            "Monster",
            WatchStatus::Rewatching,
            MediaType::Anime,
            None,
            None,
            31,
            (2021, 4, 1),
        );
        monster.catalog.episodes = Some(74);
        monster.rewatch_count = Some(1);
        monster.tags = tags(&["classic", "favorite"]);

        vec![
            frieren,
            mushishi,
            berserk,
            bebop,
            spirited_away,
            vinland,
            chainsaw,
            monster,
        ]
    }
}
