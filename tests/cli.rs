use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn extractgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("extractgen").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("EXTRACTGEN_DATABASE")
        .env_remove("EXTRACTGEN_RELAY");
    cmd
}

fn orders_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir(root.join("config")).unwrap();
    fs::create_dir(root.join("sql")).unwrap();
    fs::write(
        root.join("config").join("orders.cfg"),
        "sqlfile: orders.sql\nextractname: orders.csv\nemail_to: a@x.com\n\
         email_cc: b@x.com\nsubject: Orders\nemail_body: See attached\n",
    )
    .unwrap();
    fs::write(
        root.join("sql").join("orders.sql"),
        "SELECT id, amount FROM orders ORDER BY id",
    )
    .unwrap();

    let conn = Connection::open(root.join("chinook.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (id INTEGER, amount INTEGER);
         INSERT INTO orders VALUES (1, 100), (2, 200);",
    )
    .unwrap();

    temp_dir
}

#[test]
fn missing_argument_prints_usage() {
    let temp_dir = TempDir::new().unwrap();

    extractgen(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_config_file_is_logged_and_fails() {
    let temp_dir = TempDir::new().unwrap();

    extractgen(temp_dir.path())
        .arg("absent.cfg")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("absent.cfg"));

    let log = fs::read_to_string(temp_dir.path().join("extractgen.log")).unwrap();
    assert!(log.contains("ERROR"));
    assert!(log.contains("absent.cfg"));
}

#[test]
fn generates_dated_extract_without_email() {
    let temp_dir = orders_workspace();

    extractgen(temp_dir.path())
        .args(["orders.cfg", "--skip-email", "--date", "20240101", "-q"])
        .assert()
        .success();

    let extract = temp_dir.path().join("data").join("orders_20240101.csv");
    assert_eq!(
        fs::read_to_string(extract).unwrap(),
        "id,amount\n1,100\n2,200\n"
    );

    let log = fs::read_to_string(temp_dir.path().join("extractgen.log")).unwrap();
    assert!(log.contains("Reading configuration file orders.cfg"));
    assert!(log.contains("Generated orders_20240101.csv"));
}

#[test]
fn json_report_describes_run() {
    let temp_dir = orders_workspace();

    extractgen(temp_dir.path())
        .args([
            "orders.cfg",
            "--skip-email",
            "--date",
            "2024-01-01",
            "--output-format",
            "json",
            "-q",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"run_date\": \"20240101\""))
        .stdout(predicate::str::contains("\"rows_written\": 2"));
}

#[test]
fn missing_sql_file_writes_no_extract() {
    let temp_dir = orders_workspace();
    fs::remove_file(temp_dir.path().join("sql").join("orders.sql")).unwrap();

    extractgen(temp_dir.path())
        .args(["orders.cfg", "--skip-email", "--date", "20240101"])
        .assert()
        .code(3);

    assert!(!temp_dir
        .path()
        .join("data")
        .join("orders_20240101.csv")
        .exists());
}

#[test]
fn missing_database_fails() {
    let temp_dir = orders_workspace();

    extractgen(temp_dir.path())
        .args(["orders.cfg", "--skip-email", "--database", "nowhere.db"])
        .assert()
        .code(4);

    let log = fs::read_to_string(temp_dir.path().join("extractgen.log")).unwrap();
    assert_eq!(log.matches("ERROR").count(), 1);
    assert!(log.contains("nowhere.db"));
}

#[test]
fn generate_settings_writes_file() {
    let temp_dir = TempDir::new().unwrap();

    extractgen(temp_dir.path())
        .arg("--generate-settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("extractgen.toml"));

    let content = fs::read_to_string(temp_dir.path().join("extractgen.toml")).unwrap();
    assert!(content.contains("[paths]"));
}
