//! Catalog query, search index, and recently-viewed integration tests

use circulus::models::{BookQuery, NewBook};
use circulus::search::wire;
use circulus::session::RecentlyViewed;
use circulus::AppState;

fn book(title: &str, description: &str, genres: &[i32], language: i32) -> NewBook {
    NewBook {
        isbn: None,
        title: title.to_string(),
        author: "anon".to_string(),
        description: Some(description.to_string()),
        image_url: None,
        genre_ids: genres.to_vec(),
        language_id: Some(language),
        total_copies: 1,
    }
}

/// Catalog: fiction (genre 1) and science (genre 2), english (1) and
/// french (2).
fn seeded_state() -> AppState {
    let state = AppState::default();
    let catalog = &state.services.catalog;
    catalog.add_book(book("The Wizard of Oz", "A tornado and a road", &[1], 1));
    catalog.add_book(book("Wonders of Physics", "Quantum matters", &[2], 1));
    catalog.add_book(book("Le Petit Prince", "Un aviateur", &[1], 2));
    catalog.add_book(book("Cosmos", "Science for everyone", &[2], 1));
    state
}

fn titles(state: &AppState, query: &BookQuery) -> Vec<String> {
    state
        .services
        .catalog
        .query(query)
        .items
        .into_iter()
        .map(|b| b.title)
        .collect()
}

#[test]
fn test_unbuilt_index_degrades_to_substring_scan() {
    let state = seeded_state();
    // "onder" is no token prefix; only a substring scan can match it.
    let query = BookQuery {
        search: Some("onder".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["Wonders of Physics"]);
}

#[test]
fn test_published_index_switches_to_prefix_semantics() {
    let state = seeded_state();
    state.services.catalog.rebuild_index();

    let query = BookQuery {
        search: Some("wo".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["Wonders of Physics"]);

    // Substring-only matches disappear once the trie answers.
    let query = BookQuery {
        search: Some("onder".to_string()),
        ..Default::default()
    };
    assert!(titles(&state, &query).is_empty());

    // Prefix matching stays case-insensitive.
    let query = BookQuery {
        search: Some("  WIZ ".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["The Wizard of Oz"]);
}

#[test]
fn test_rebuild_is_idempotent_for_queries() {
    let state = seeded_state();
    let catalog = &state.services.catalog;

    let gen1 = catalog.rebuild_index();
    let first = catalog.index_store().current().unwrap();
    let gen2 = catalog.rebuild_index();
    let second = catalog.index_store().current().unwrap();

    assert_eq!(gen2, gen1 + 1);
    for prefix in ["", "w", "wo", "wizard", "cos", "z", "petit"] {
        assert_eq!(
            first.trie.search_prefix(prefix),
            second.trie.search_prefix(prefix),
            "prefix {:?} diverged across rebuilds",
            prefix
        );
    }
}

#[test]
fn test_books_added_after_publish_appear_on_next_rebuild() {
    let state = seeded_state();
    let catalog = &state.services.catalog;
    catalog.rebuild_index();

    catalog.add_book(book("Wuthering Heights", "Moors", &[1], 1));
    let query = BookQuery {
        search: Some("wuthering".to_string()),
        ..Default::default()
    };
    assert!(titles(&state, &query).is_empty(), "stale snapshot answers");

    catalog.rebuild_index();
    assert_eq!(titles(&state, &query), vec!["Wuthering Heights"]);
}

#[test]
fn test_genre_and_language_filters_combine() {
    let state = seeded_state();

    let query = BookQuery {
        genre_include: vec![1],
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["Le Petit Prince", "The Wizard of Oz"]);

    let query = BookQuery {
        genre_include: vec![1],
        language_exclude: vec![2],
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["The Wizard of Oz"]);

    let query = BookQuery {
        genre_exclude: vec![1, 2],
        ..Default::default()
    };
    assert!(titles(&state, &query).is_empty());

    let query = BookQuery {
        language_include: vec![2],
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["Le Petit Prince"]);
}

#[test]
fn test_results_are_title_ordered_and_paginated() {
    let state = AppState::default();
    let catalog = &state.services.catalog;
    for i in 0..10 {
        catalog.add_book(book(&format!("Book {:02}", i), "", &[], 1));
    }

    let page = catalog.query(&BookQuery::default());
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 8);
    assert_eq!(page.total_items, 10);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].title, "Book 00");

    let page = catalog.query(&BookQuery {
        page: 2,
        ..Default::default()
    });
    assert_eq!(page.items.len(), 2);

    // Out-of-range pages clamp instead of erroring.
    let page = catalog.query(&BookQuery {
        page: 9,
        ..Default::default()
    });
    assert_eq!(page.page, 2);
}

#[test]
fn test_view_book_feeds_recently_viewed_projection() {
    let state = seeded_state();
    let catalog = &state.services.catalog;
    let recent = RecentlyViewed::new(state.config.recent.capacity);

    catalog.view_book(1, &recent).unwrap();
    catalog.view_book(3, &recent).unwrap();
    catalog.view_book(2, &recent).unwrap();
    catalog.view_book(1, &recent).unwrap();

    let viewed: Vec<i32> = catalog.recently_viewed(&recent).iter().map(|b| b.id).collect();
    assert_eq!(viewed, vec![1, 2, 3]);
}

#[test]
fn test_recently_viewed_is_capped_per_session() {
    let state = AppState::default();
    let catalog = &state.services.catalog;
    for i in 0..10 {
        catalog.add_book(book(&format!("Book {:02}", i), "", &[], 1));
    }

    let recent = RecentlyViewed::new(state.config.recent.capacity);
    for id in 1..=10 {
        catalog.view_book(id, &recent).unwrap();
    }

    let viewed: Vec<i32> = catalog.recently_viewed(&recent).iter().map(|b| b.id).collect();
    assert_eq!(viewed, vec![10, 9, 8, 7, 6, 5, 4, 3]);
}

#[test]
fn test_sessions_do_not_interfere() {
    let state = seeded_state();
    let catalog = &state.services.catalog;

    let session_a = RecentlyViewed::new(8);
    let session_b = RecentlyViewed::new(8);
    catalog.view_book(1, &session_a).unwrap();
    catalog.view_book(2, &session_b).unwrap();

    assert_eq!(session_a.ordered_ids(), vec![1]);
    assert_eq!(session_b.ordered_ids(), vec![2]);
}

#[test]
fn test_index_wire_round_trip_between_processes() {
    let state = seeded_state();
    state.services.catalog.rebuild_index();
    let blob = state.services.catalog.export_index_wire().unwrap();

    // A freshly started process imports the cached blob.
    let restarted = seeded_state();
    let generation = restarted.services.catalog.import_index_wire(&blob);
    assert_eq!(generation, 1);

    let query = BookQuery {
        search: Some("wiz".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&restarted, &query), vec!["The Wizard of Oz"]);
}

#[test]
fn test_corrupt_wire_blob_triggers_rebuild_not_failure() {
    let state = seeded_state();
    let generation = state.services.catalog.import_index_wire(b"\x00garbage");
    assert_eq!(generation, 1, "fallback rebuild publishes a snapshot");

    let query = BookQuery {
        search: Some("wiz".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["The Wizard of Oz"]);
}

#[test]
fn test_stale_wire_blob_cannot_roll_index_back() {
    let state = seeded_state();
    state.services.catalog.rebuild_index();
    let old_blob = state.services.catalog.export_index_wire().unwrap();

    state.services.catalog.add_book(book("Wuthering Heights", "", &[1], 1));
    state.services.catalog.rebuild_index();

    let generation = state.services.catalog.import_index_wire(&old_blob);
    assert_eq!(generation, 2, "live generation kept");
    let query = BookQuery {
        search: Some("wuthering".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&state, &query), vec!["Wuthering Heights"]);
}

#[test]
fn test_wire_version_constant_is_pinned() {
    // A bumped wire version must be a deliberate, reviewed change.
    assert_eq!(wire::WIRE_VERSION, 1);
}
