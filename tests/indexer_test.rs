use scaffold::cancel::CancellationToken;
use scaffold::config::ScaffoldConfig;
use scaffold::error::Error;
use scaffold::indexer::TemplateIndexer;
use scaffold::template::find_template;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_registry() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/registry")
}

fn add_template(registry: &Path, dir: &str, manifest: Option<&str>) {
    let template_dir = registry.join(dir);
    fs::create_dir_all(template_dir.join("files")).unwrap();
    if let Some(manifest) = manifest {
        fs::write(template_dir.join("scaffold.yaml"), manifest).unwrap();
    }
}

fn index(registry: &Path) -> scaffold::error::Result<Vec<scaffold::template::Template>> {
    let config = ScaffoldConfig::new(registry);
    let cancel = CancellationToken::new();
    TemplateIndexer::new(config).index(&cancel)
}

#[test_log::test]
fn test_index_fixture_registry() {
    let templates = index(&fixture_registry()).unwrap();

    let names: Vec<&str> = templates.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["library", "service"]);

    let service = find_template(&templates, "service").unwrap();
    assert_eq!(service.path, fixture_registry().join("service"));
    assert_eq!(service.inputs["name"], "billing");
    assert_eq!(service.inputs["port"], "8080");
    assert_eq!(service.manifest.file_rules.len(), 2);
}

#[test]
fn test_missing_manifest_fails_the_whole_pass() {
    let registry = TempDir::new().unwrap();
    add_template(registry.path(), "good", Some("name: good\n"));
    add_template(registry.path(), "broken", None);

    match index(registry.path()) {
        Err(Error::IndexError { path, reason }) => {
            assert!(path.ends_with("broken"));
            assert!(reason.contains("scaffold.yaml"));
        }
        other => panic!("Expected IndexError, got {other:?}"),
    }
}

#[test]
fn test_unparseable_manifest_fails_the_whole_pass() {
    let registry = TempDir::new().unwrap();
    add_template(registry.path(), "good", Some("name: good\n"));
    add_template(registry.path(), "bad", Some("name: [oops\n"));

    assert!(matches!(index(registry.path()), Err(Error::ManifestError { .. })));
}

#[test]
fn test_missing_registry() {
    let registry = TempDir::new().unwrap();
    let missing = registry.path().join("nope");

    assert!(matches!(index(&missing), Err(Error::IndexError { .. })));
}

#[test]
fn test_files_and_hidden_directories_are_not_candidates() {
    let registry = TempDir::new().unwrap();
    add_template(registry.path(), "only", Some("name: only\n"));
    fs::create_dir_all(registry.path().join(".git")).unwrap();
    fs::write(registry.path().join("README.md"), "registry").unwrap();

    let templates = index(registry.path()).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name(), "only");
}

#[test]
fn test_duplicate_names_resolve_to_first_in_listing_order() {
    let registry = TempDir::new().unwrap();
    add_template(
        registry.path(),
        "b-copy",
        Some("name: api\ndefault:\n  path: second\n"),
    );
    add_template(
        registry.path(),
        "a-original",
        Some("name: api\ndefault:\n  path: first\n"),
    );

    let templates = index(registry.path()).unwrap();
    assert_eq!(templates.len(), 2);

    let selected = find_template(&templates, "api").unwrap();
    assert_eq!(selected.manifest.default_path_expression(), "first");
}

#[test]
fn test_empty_registry() {
    let registry = TempDir::new().unwrap();
    assert!(index(registry.path()).unwrap().is_empty());
}

#[test]
fn test_cancelled_index() {
    let registry = TempDir::new().unwrap();
    add_template(registry.path(), "one", Some("name: one\n"));
    let cancel = CancellationToken::new();
    cancel.cancel("shutting down");

    let config = ScaffoldConfig::new(registry.path());
    let result = TemplateIndexer::new(config).index(&cancel);
    match result {
        Err(Error::Cancelled { reason }) => assert_eq!(reason, "shutting down"),
        other => panic!("Expected Cancelled, got {other:?}"),
    }
}
