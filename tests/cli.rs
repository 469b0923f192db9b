use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn guide_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("guide");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(
        docs_dir.join("louvre-rules.txt"),
        format!(
            "TITLE: Louvre visitor rules\nSOURCE: louvre.fr/rules\nCITY: Paris\n\n{}",
            "Bags larger than a cabin suitcase are refused at the entrance. ".repeat(40)
        ),
    )
    .unwrap();
    fs::write(docs_dir.join("tips.txt"), "Arrive before opening to avoid queues.").unwrap();
    fs::write(docs_dir.join("draft.md"), "not indexed").unwrap();

    fs::write(
        root.join("data/attractions.toml"),
        r#"
[[attractions]]
name = "Louvre Museum"

[[attractions.hours]]
context = "Mon-Sun"
open = "09:00"
close = "18:00"

[[attractions.tickets]]
ticket_type = "Adult"
price = 22
"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/guide.sqlite"

[search]
endpoint = "https://search.invalid"
index = "paris-docs"

[generation]
endpoint = "https://aoai.invalid"
deployment = "gpt-4o-mini"

[indexing]
docs_dir = "{root}/docs"

[server]
bind = "127.0.0.1:0"
"#,
        root = root.display()
    );

    let config_path = root.join("config/guide.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_guide(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(guide_binary())
        .arg("--config")
        .arg(config)
        .arg("--no-color")
        .args(args)
        .output()
        .expect("failed to run guide")
}

#[test]
fn test_init_creates_database() {
    let (tmp, config) = setup_test_env();

    let output = run_guide(&config, &["init"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(tmp.path().join("data/guide.sqlite").exists());

    // idempotent
    let output = run_guide(&config, &["init"]);
    assert!(output.status.success());
}

#[test]
fn test_seed_loads_attractions() {
    let (tmp, config) = setup_test_env();
    let seed = tmp.path().join("data/attractions.toml");

    let output = run_guide(&config, &["seed", seed.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Seeded 1 attractions"));

    // re-seeding replaces rather than duplicates
    let output = run_guide(&config, &["seed", seed.to_str().unwrap()]);
    assert!(output.status.success());
}

#[test]
fn test_seed_rejects_invalid_file() {
    let (tmp, config) = setup_test_env();
    let bad = tmp.path().join("data/bad.toml");
    fs::write(&bad, "[[attractions]]\nname = \"A\"\n[[attractions]]\nname = \"A\"\n").unwrap();

    let output = run_guide(&config, &["seed", bad.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate"));
}

#[test]
fn test_index_dry_run_counts_chunks() {
    let (_tmp, config) = setup_test_env();

    let output = run_guide(&config, &["index", "--dry-run"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Index plan (dry-run)"));
    // 2520-char body at 1100/200 gives 3 chunks, plus 1 for tips.txt
    assert!(stdout.contains("chunks: 4"), "{}", stdout);
    assert!(stdout.contains("upload batches: 1"));
}

#[test]
fn test_index_without_docs_fails() {
    let (tmp, config) = setup_test_env();
    for entry in fs::read_dir(tmp.path().join("docs")).unwrap() {
        fs::remove_file(entry.unwrap().path()).unwrap();
    }

    let output = run_guide(&config, &["index", "--dry-run"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No docs found"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_guide(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read config file"));
}
