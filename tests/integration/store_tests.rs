use pagelens::model::{BrokenLink, MarkupVersion, PageAnalysis};
use pagelens::storage::{SqliteStorage, Storage, StorageError};
use tempfile::TempDir;

fn analysis(url: &str, title: &str) -> PageAnalysis {
    let mut analysis = PageAnalysis::new(url);
    analysis.markup_version = MarkupVersion::Xhtml;
    analysis.title = title.to_string();
    analysis.headings.set(2, 3);
    analysis.external_links = 1;
    analysis.inaccessible_links = 1;
    analysis.broken_links = vec![BrokenLink::from_status("https://gone.example/", 404)];
    analysis
}

#[test]
fn test_tombstone_then_upsert_leaves_single_live_row() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut storage = SqliteStorage::new(&dir.path().join("store.db")).expect("Failed to open");
    let url = "https://example.com/";

    let original = storage.upsert(url, &analysis(url, "Original")).unwrap();
    storage.soft_delete(&[original.id]).unwrap();

    let fresh = storage.upsert(url, &analysis(url, "Fresh")).unwrap();

    assert_ne!(fresh.id, original.id);
    assert!(fresh.deleted_at.is_none());

    let live: Vec<_> = storage
        .list_all()
        .unwrap()
        .into_iter()
        .filter(|r| r.url() == url)
        .collect();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].analysis.title, "Fresh");

    // The tombstoned row was purged, not hidden
    assert_eq!(storage.bulk_hard_delete(&[original.id]).unwrap(), 0);
}

#[test]
fn test_upsert_preserves_id_and_decodes_blobs() {
    let mut storage = SqliteStorage::open_in_memory().expect("Failed to open");
    let url = "https://example.com/page";

    let first = storage.upsert(url, &analysis(url, "One")).unwrap();
    let second = storage.upsert(url, &analysis(url, "Two")).unwrap();

    assert_eq!(first.id, second.id);
    let loaded = storage.get_by_id(first.id).unwrap();
    assert_eq!(loaded.analysis.title, "Two");
    assert_eq!(loaded.analysis.markup_version, MarkupVersion::Xhtml);
    assert_eq!(loaded.analysis.headings.get(2), 3);
    assert_eq!(loaded.analysis.headings.total(), 3);
    assert_eq!(loaded.analysis.broken_links[0].status_code, 404);
}

#[test]
fn test_bulk_hard_delete_counts_only_existing_rows() {
    let mut storage = SqliteStorage::open_in_memory().expect("Failed to open");
    let a = storage
        .upsert("https://a.example/", &analysis("https://a.example/", "A"))
        .unwrap();
    let b = storage
        .upsert("https://b.example/", &analysis("https://b.example/", "B"))
        .unwrap();

    assert_eq!(storage.bulk_hard_delete(&[a.id, 9_999]).unwrap(), 1);
    assert_eq!(storage.bulk_hard_delete(&[a.id]).unwrap(), 0);

    assert!(matches!(
        storage.get_by_id(a.id),
        Err(StorageError::RecordNotFound(_))
    ));
    assert_eq!(storage.get_by_id(b.id).unwrap().analysis.title, "B");
}
