//! Tests for schema initialization and corpus seeding.

use std::io::Write;

use langman_core::Language;
use tempfile::NamedTempFile;

use langman_server::{
    AppConfig, GameRepository, MAX_USAGE_LEN, Usage, UsageRepository, init_db, read_usages,
    seed_usages,
};

const CSV: &str = "\
1,en,10,garden,\"She weeded the {}.\",COCA
2,es,20,canción,\"Esa {} me gusta.\",CREA
3,fr,30,peut-être,\"Il viendra {} demain.\",Le Monde
";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write CSV");
    file
}

fn temp_path(file: &NamedTempFile) -> String {
    file.path().to_str().expect("Invalid path").to_string()
}

#[test]
fn test_read_usages_columns() {
    let usages = read_usages(CSV.as_bytes()).expect("Read failed");
    assert_eq!(usages.len(), 3);

    let spanish = &usages[1];
    assert_eq!(*spanish.usage_id(), 2);
    assert_eq!(spanish.parse_language().expect("Language"), Language::Es);
    assert_eq!(spanish.secret_word(), "canción");
    assert_eq!(spanish.usage(), "Esa {} me gusta.");
    assert_eq!(spanish.source(), "CREA");
}

#[test]
fn test_read_usages_skips_overlong_sentences() {
    let long_usage = "x".repeat(MAX_USAGE_LEN + 1);
    let edge_usage = "é".repeat(MAX_USAGE_LEN);
    let content = format!("1,en,1,word,{long_usage},src\n2,en,2,word,{edge_usage},src\n");

    let usages = read_usages(content.as_bytes()).expect("Read failed");
    assert_eq!(usages.len(), 1);
    assert_eq!(*usages[0].usage_id(), 2);
}

#[test]
fn test_read_usages_skips_unplayable_secrets() {
    let content = "\
1,en,1,42,\"Route {} is closed.\",src
2,en,2,,\"Nothing {} here.\",src
3,en,3,snake_case,\"Write {} names.\",src
4,fr,4,peut-être,\"Il viendra {} demain.\",src
";
    let usages = read_usages(content.as_bytes()).expect("Read failed");
    assert_eq!(usages.len(), 1);
    assert_eq!(*usages[0].usage_id(), 4);
    assert!(usages.iter().all(Usage::is_playable));
}

#[test]
fn test_read_usages_rejects_bad_rows() {
    assert!(read_usages("x,en,1,word,{},src\n".as_bytes()).is_err());
    assert!(read_usages("1,de,1,wort,{},src\n".as_bytes()).is_err());
    assert!(read_usages("1,en,1,word\n".as_bytes()).is_err());
}

#[test]
fn test_seed_usages_only_once() {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let csv = write_csv(CSV);
    let repo = UsageRepository::new(temp_path(&db)).expect("Repository");
    repo.run_migrations().expect("Migrations failed");

    assert_eq!(seed_usages(&repo, csv.path()).expect("Seed failed"), 3);
    assert_eq!(seed_usages(&repo, csv.path()).expect("Reseed failed"), 0);
    assert_eq!(repo.count().expect("Count failed"), 3);
}

#[test]
fn test_seed_missing_file_fails() {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let repo = UsageRepository::new(temp_path(&db)).expect("Repository");
    repo.run_migrations().expect("Migrations failed");

    assert!(seed_usages(&repo, "does/not/exist.csv").is_err());
}

#[test]
fn test_init_db_creates_both_stores() {
    let usage_db = NamedTempFile::new().expect("Failed to create temp file");
    let games_db = NamedTempFile::new().expect("Failed to create temp file");
    let csv = write_csv(CSV);
    let config = AppConfig::new(temp_path(&usage_db), temp_path(&games_db));

    assert_eq!(init_db(&config, csv.path()).expect("Init failed"), 3);
    assert_eq!(init_db(&config, csv.path()).expect("Second init failed"), 0);

    let games = GameRepository::new(temp_path(&games_db)).expect("Repository");
    assert!(games.get_game("none").expect("Games schema missing").is_none());
}
