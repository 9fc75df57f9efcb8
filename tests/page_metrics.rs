use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use plainwiki::application::page::PageService;
use plainwiki::domain::pages::{Page, PageTitle};
use plainwiki::infra::pages::PageStorage;
use plainwiki::presentation::views::{PageTemplate, render_page};
use tempfile::TempDir;

#[tokio::test]
async fn page_operations_emit_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");
    let service = PageService::new(Arc::new(storage));
    let title = PageTitle::new("Counted").expect("valid title");

    let empty = service.load_or_empty(&title).await.expect("missing page is empty");
    assert!(empty.body.is_empty());

    let page = Page::new(title.clone(), "tick");
    service.save(&page).await.expect("save");
    service.save(&page).await.expect("save again");

    render_page(PageTemplate::View, &page).expect("render");

    std::fs::remove_dir_all(dir.path()).expect("remove storage root");
    assert!(service.save(&page).await.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();
    let counters: HashMap<String, u64> = snapshot
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    assert_eq!(counters.get("plainwiki_page_load_miss_total"), Some(&1));
    assert_eq!(counters.get("plainwiki_page_save_total"), Some(&2));
    assert_eq!(counters.get("plainwiki_page_save_failed_total"), Some(&1));
    assert!(
        names.contains("plainwiki_render_ms"),
        "render latency histogram missing"
    );
}
