// Tests for local path derivation and persistence

use tempfile::TempDir;
use url::Url;
use webmirror_engine::storage::{local_path_for, relative_from, save_bytes};

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

// ============================================================================
// LocalPath Derivation Tests
// ============================================================================

#[test]
fn test_local_path_empty_path_becomes_index() {
    assert_eq!(local_path_for(&url("http://example.com"), "html"), "index.html");
}

#[test]
fn test_local_path_root_becomes_index() {
    assert_eq!(local_path_for(&url("http://example.com/"), "html"), "index.html");
}

#[test]
fn test_local_path_trailing_slash_appends_index() {
    assert_eq!(
        local_path_for(&url("http://example.com/docs/"), "html"),
        "docs/index.html"
    );
}

#[test]
fn test_local_path_appends_default_extension() {
    assert_eq!(local_path_for(&url("http://example.com/about"), "html"), "about.html");
}

#[test]
fn test_local_path_keeps_existing_extension() {
    assert_eq!(local_path_for(&url("http://example.com/app.js"), "js"), "app.js");
}

#[test]
fn test_local_path_never_stacks_extensions() {
    assert_eq!(
        local_path_for(&url("http://example.com/style.min.css"), "css"),
        "style.min.css"
    );
}

#[test]
fn test_local_path_nested_directories() {
    assert_eq!(
        local_path_for(&url("http://example.com/a/b/c"), "jpg"),
        "a/b/c.jpg"
    );
}

#[test]
fn test_local_path_ignores_query() {
    assert_eq!(
        local_path_for(&url("http://example.com/page?id=1"), "html"),
        "page.html"
    );
}

#[test]
fn test_local_path_ignores_fragment() {
    assert_eq!(
        local_path_for(&url("http://example.com/page#top"), "html"),
        "page.html"
    );
}

#[test]
fn test_local_path_ignores_host_and_port() {
    assert_eq!(
        local_path_for(&url("http://example.com:8080/page"), "html"),
        local_path_for(&url("http://other.example/page"), "html"),
    );
}

#[test]
fn test_local_path_is_deterministic() {
    let a = local_path_for(&url("http://example.com/a/b/"), "html");
    let b = local_path_for(&url("http://example.com/a/b/"), "html");
    assert_eq!(a, b);
}

#[test]
fn test_local_path_preserves_percent_encoding() {
    assert_eq!(
        local_path_for(&url("http://example.com/a%20b"), "html"),
        "a%20b.html"
    );
}

#[test]
fn test_local_path_dotted_directory_still_gets_extension() {
    assert_eq!(
        local_path_for(&url("http://example.com/v1.2/readme"), "html"),
        "v1.2/readme.html"
    );
}

// ============================================================================
// Relative Path Tests
// ============================================================================

#[test]
fn test_relative_from_same_directory() {
    assert_eq!(relative_from("a/index.html", "a/b.png"), "b.png");
}

#[test]
fn test_relative_from_root_document() {
    assert_eq!(relative_from("index.html", "css/site.css"), "css/site.css");
}

#[test]
fn test_relative_from_nested_document_to_root_asset() {
    assert_eq!(relative_from("blog/post.html", "site.css"), "../site.css");
}

#[test]
fn test_relative_from_sibling_directories() {
    assert_eq!(relative_from("blog/post.html", "css/site.css"), "../css/site.css");
}

#[test]
fn test_relative_from_deeply_nested() {
    assert_eq!(relative_from("a/b/c.html", "a/d.css"), "../d.css");
}

#[test]
fn test_relative_from_self() {
    assert_eq!(relative_from("a/index.html", "a/index.html"), "index.html");
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_save_bytes_creates_parent_directories() {
    let root = TempDir::new().unwrap();
    let target = save_bytes(root.path(), "a/b/c.png", b"bytes").unwrap();

    assert_eq!(target, root.path().join("a/b/c.png"));
    assert_eq!(std::fs::read(target).unwrap(), b"bytes");
}

#[test]
fn test_save_bytes_overwrites_existing_file() {
    let root = TempDir::new().unwrap();
    save_bytes(root.path(), "page.html", b"old").unwrap();
    save_bytes(root.path(), "page.html", b"new").unwrap();

    assert_eq!(std::fs::read(root.path().join("page.html")).unwrap(), b"new");
}
