use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const CREDENTIAL_VARS: [(&str, &str); 4] = [
    ("MONGO_INITDB_ROOT_USERNAME", "root"),
    ("MONGO_INITDB_ROOT_PASSWORD", "rootpw"),
    ("MONGO_USER", "mongo"),
    ("MONGO_PASSWORD", "mongo"),
];

/// A command isolated from any `.env` or config file in the developer's tree.
fn cli(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookstore-cli").unwrap();
    cmd.current_dir(workdir.path())
        .env("SEED_CONFIG_DIR", workdir.path())
        .env_remove("RUST_LOG");
    for (name, _) in CREDENTIAL_VARS {
        cmd.env_remove(name);
    }
    cmd
}

fn with_credentials(cmd: &mut Command, skip: Option<&str>) {
    for (name, value) in CREDENTIAL_VARS {
        if Some(name) != skip {
            cmd.env(name, value);
        }
    }
}

#[test]
fn show_prints_seed_records() {
    let workdir = TempDir::new().unwrap();
    let output = cli(&workdir).arg("show").output().unwrap();
    assert!(output.status.success());

    let books: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(books.len(), 4);
    assert_eq!(books[0]["title"], "Learning Python");
    assert_eq!(books[0]["stock"], 7);
}

#[test]
fn run_fails_when_credential_is_missing() {
    let workdir = TempDir::new().unwrap();
    let mut cmd = cli(&workdir);
    with_credentials(&mut cmd, Some("MONGO_PASSWORD"));

    let output = cmd.args(["run", "--dry-run"]).output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MONGO_PASSWORD"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn run_without_any_credentials_fails() {
    let workdir = TempDir::new().unwrap();
    let output = cli(&workdir).arg("run").output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MONGO_INITDB_ROOT_USERNAME"), "stderr: {stderr}");
}

#[test]
fn dry_run_seeds_in_memory() {
    let workdir = TempDir::new().unwrap();
    let mut cmd = cli(&workdir);
    with_credentials(&mut cmd, None);

    let output = cmd.args(["run", "--dry-run"]).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        result["steps"],
        serde_json::json!([
            "authenticate",
            "create_user",
            "books.create_collection",
            "books.insert_seed"
        ])
    );
    assert_eq!(result["collection"], "books");

    let titles: Vec<&str> = result["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        [
            "Learning Python",
            "JavaScript - The Good Parts",
            "Domain-Driven Design: Tackling Complexity in the Heart of Software",
            "Design Patterns: Elements of Reusable Object-Oriented Software",
        ]
    );
}

#[test]
fn dry_run_honours_configured_collection() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(
        workdir.path().join("seed.toml"),
        "[database]\ncollection = \"catalog\"\n",
    )
    .unwrap();
    let mut cmd = cli(&workdir);
    with_credentials(&mut cmd, None);

    let output = cmd.args(["run", "--dry-run"]).output().unwrap();
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["collection"], "catalog");
    assert_eq!(result["documents"].as_array().unwrap().len(), 4);
}
