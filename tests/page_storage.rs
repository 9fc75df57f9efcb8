use plainwiki::application::repos::{PagesRepo, RepoError};
use plainwiki::domain::pages::{Page, PageTitle};
use plainwiki::infra::pages::{PageStorage, PageStorageError};
use tempfile::TempDir;

fn title(raw: &str) -> PageTitle {
    PageTitle::new(raw).expect("valid title")
}

#[tokio::test]
async fn save_then_load_returns_identical_body() {
    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");

    let bodies: [&[u8]; 4] = [b"", b"Hello", "Grüße, 世界\n".as_bytes(), &[0, 159, 146, 150, 255]];
    for (index, body) in bodies.into_iter().enumerate() {
        let page = Page::new(title(&format!("Page{index}")), body);
        storage.save_page(&page).await.expect("save");

        let loaded = storage.load_page(&page.title).await.expect("load");
        assert_eq!(loaded, page);
    }
}

#[tokio::test]
async fn file_contains_exactly_the_body() {
    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");

    storage
        .save_page(&Page::new(title("Test"), "Hello"))
        .await
        .expect("save");

    assert_eq!(storage.path_for(&title("Test")), dir.path().join("Test.txt"));
    let stored = std::fs::read(dir.path().join("Test.txt")).expect("read file");
    assert_eq!(stored, b"Hello");
}

#[tokio::test]
async fn save_overwrites_previous_content() {
    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");

    storage
        .save_page(&Page::new(title("Log"), "a much longer first version"))
        .await
        .expect("first save");
    storage
        .save_page(&Page::new(title("Log"), "short"))
        .await
        .expect("second save");

    let stored = std::fs::read(dir.path().join("Log.txt")).expect("read file");
    assert_eq!(stored, b"short");
}

#[tokio::test]
async fn missing_page_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");

    let err = storage.read(&title("Ghost")).await.expect_err("no file");
    assert!(matches!(err, PageStorageError::NotFound { ref title } if title == "Ghost"));

    let err = storage.load_page(&title("Ghost")).await.expect_err("no file");
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[tokio::test]
async fn unreadable_page_is_a_read_error() {
    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");
    std::fs::create_dir(dir.path().join("Folder.txt")).expect("create dir in place of page");

    let err = storage.read(&title("Folder")).await.expect_err("directory");
    assert!(matches!(err, PageStorageError::Read { .. }));

    let err = storage.load_page(&title("Folder")).await.expect_err("directory");
    assert!(matches!(err, RepoError::Persistence(_)));
}

#[tokio::test]
async fn new_creates_missing_root() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path().join("nested").join("pages");

    let storage = PageStorage::new(root.clone()).expect("storage");
    assert!(root.is_dir());
    assert_eq!(storage.root(), root.as_path());
}

#[cfg(unix)]
#[tokio::test]
async fn page_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("tempdir");
    let storage = PageStorage::new(dir.path().to_path_buf()).expect("storage");
    storage
        .save_page(&Page::new(title("Private"), "secret"))
        .await
        .expect("save");

    let mode = std::fs::metadata(dir.path().join("Private.txt"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
