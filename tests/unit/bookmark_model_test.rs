//! Unit tests for the in-memory bookmark model: creation, update, tag
//! parsing and favicon derivation.

use chrono::{Duration, SubsecRound, Utc};
use linkvault::types::bookmark::{
    favicon_url, parse_tags, Bookmark, BookmarkDraft, DEFAULT_FAVICON,
};
use linkvault::types::errors::BookmarkError;
use rstest::rstest;

#[test]
fn test_new_bookmark_has_equal_timestamps_and_id() {
    let draft = BookmarkDraft::new("A", "https://a.test", "", "x");
    let bookmark = Bookmark::new(&draft).unwrap();

    assert!(!bookmark.id.is_empty());
    assert_eq!(bookmark.title, "A");
    assert_eq!(bookmark.tags, vec!["x".to_string()]);
    assert_eq!(bookmark.created_at, bookmark.updated_at);
    assert_eq!(bookmark.created_at, bookmark.created_at.trunc_subsecs(3));
}

#[test]
fn test_ids_are_unique() {
    let draft = BookmarkDraft::new("A", "https://a.test", "", "");
    let a = Bookmark::new(&draft).unwrap();
    let b = Bookmark::new(&draft).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_update_advances_updated_at_and_keeps_id() {
    let mut bookmark = Bookmark::new(&BookmarkDraft::new("A", "https://a.test", "", "x")).unwrap();
    let id = bookmark.id.clone();
    let created_at = bookmark.created_at;

    bookmark
        .apply(&BookmarkDraft::new("B", "https://a.test", "", "x"))
        .unwrap();

    assert_eq!(bookmark.title, "B");
    assert_eq!(bookmark.id, id);
    assert_eq!(bookmark.created_at, created_at);
    assert!(bookmark.updated_at > bookmark.created_at);
}

#[test]
fn test_update_is_strictly_monotonic_even_with_future_timestamp() {
    let mut bookmark = Bookmark::new(&BookmarkDraft::new("A", "https://a.test", "", "")).unwrap();
    let future = Utc::now().trunc_subsecs(3) + Duration::hours(1);
    bookmark.updated_at = future;

    bookmark
        .apply(&BookmarkDraft::new("A2", "https://a.test", "", ""))
        .unwrap();
    assert_eq!(bookmark.updated_at, future + Duration::milliseconds(1));
}

#[test]
fn test_update_rederives_favicon() {
    let mut bookmark = Bookmark::new(&BookmarkDraft::new("A", "https://a.test", "", "")).unwrap();
    bookmark
        .apply(&BookmarkDraft::new("A", "https://b.test/page", "", ""))
        .unwrap();
    assert_eq!(
        bookmark.favicon.as_deref(),
        Some("https://www.google.com/s2/favicons?domain=b.test&sz=32")
    );
}

#[rstest]
#[case("", "https://a.test")]
#[case("   ", "https://a.test")]
fn test_empty_title_rejected(#[case] title: &str, #[case] url: &str) {
    let result = Bookmark::new(&BookmarkDraft::new(title, url, "", ""));
    assert!(matches!(result, Err(BookmarkError::EmptyTitle)));
}

#[test]
fn test_empty_url_rejected() {
    let result = Bookmark::new(&BookmarkDraft::new("A", " ", "", ""));
    assert!(matches!(result, Err(BookmarkError::EmptyUrl)));
}

#[test]
fn test_failed_update_leaves_bookmark_unchanged() {
    let mut bookmark = Bookmark::new(&BookmarkDraft::new("A", "https://a.test", "", "")).unwrap();
    let before = bookmark.clone();
    assert!(bookmark.apply(&BookmarkDraft::new("", "https://a.test", "", "")).is_err());
    assert_eq!(bookmark, before);
}

#[rstest]
#[case("rust, web , ,cli", vec!["rust", "web", "cli"])]
#[case("", vec![])]
#[case(" , ,", vec![])]
#[case("dup,dup", vec!["dup", "dup"])]
fn test_parse_tags(#[case] raw: &str, #[case] expected: Vec<&str>) {
    assert_eq!(parse_tags(raw), expected);
}

#[rstest]
#[case("https://www.rust-lang.org/learn", "https://www.google.com/s2/favicons?domain=www.rust-lang.org&sz=32")]
#[case("http://example.com:8080/x?y=1", "https://www.google.com/s2/favicons?domain=example.com&sz=32")]
#[case("not a url", DEFAULT_FAVICON)]
#[case("mailto:someone@example.com", DEFAULT_FAVICON)]
fn test_favicon_url(#[case] page: &str, #[case] expected: &str) {
    assert_eq!(favicon_url(page), expected);
}
