//! Schema initialization and usage corpus seeding.

use std::io::Read;
use std::path::Path;

use derive_more::{Display, Error};
use langman_core::Language;
use tracing::{debug, info, instrument, warn};

use crate::{AppConfig, DbError, GameRepository, Usage, UsageRepository};

/// Usage sentences longer than this many characters are skipped.
pub const MAX_USAGE_LEN: usize = 500;

/// Seeding error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Seed error: {} at {}:{}", message, file, line)]
pub struct SeedError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SeedError {
    /// Creates a new seeding error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<csv::Error> for SeedError {
    #[track_caller]
    fn from(err: csv::Error) -> Self {
        Self::new(format!("CSV error: {}", err))
    }
}

impl From<std::io::Error> for SeedError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("IO error: {}", err))
    }
}

impl From<DbError> for SeedError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.to_string())
    }
}

/// Reads usages from header-less CSV.
///
/// Columns: `usage_id, language, <unused>, secret_word, usage, source`.
/// Rows whose usage exceeds [`MAX_USAGE_LEN`] characters are skipped, as are
/// rows whose secret word is not playable (see [`Usage::is_playable`]).
///
/// # Errors
///
/// Returns [`SeedError`] on malformed CSV, a short row, a non-numeric id or
/// an unsupported language.
#[instrument(skip(reader))]
pub fn read_usages<R: Read>(reader: R) -> Result<Vec<Usage>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut usages = Vec::new();
    let mut skipped = 0usize;
    let mut unplayable = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |index: usize| {
            record
                .get(index)
                .ok_or_else(|| SeedError::new(format!("Line {}: missing column {}", line, index)))
        };

        let usage_text = field(4)?;
        if usage_text.chars().count() > MAX_USAGE_LEN {
            skipped += 1;
            continue;
        }

        let usage_id: i32 = field(0)?
            .trim()
            .parse()
            .map_err(|e| SeedError::new(format!("Line {}: invalid usage id: {}", line, e)))?;
        let language: Language = field(1)?
            .trim()
            .parse()
            .map_err(|_| {
                SeedError::new(format!(
                    "Line {}: unsupported language '{}'",
                    line,
                    record.get(1).unwrap_or_default()
                ))
            })?;

        let usage = Usage::new(
            usage_id,
            language.code().to_string(),
            field(3)?.to_string(),
            usage_text.to_string(),
            field(5)?.to_string(),
        );
        if !usage.is_playable() {
            debug!(line, secret_word = %usage.secret_word(), "Unplayable secret word");
            unplayable += 1;
            continue;
        }
        usages.push(usage);
    }

    if skipped > 0 {
        warn!(skipped, max_len = MAX_USAGE_LEN, "Skipped overlong usages");
    }
    if unplayable > 0 {
        warn!(unplayable, "Skipped usages with unplayable secret words");
    }
    debug!(count = usages.len(), "Usages read");
    Ok(usages)
}

/// Reads usages from a CSV file. See [`read_usages`].
///
/// # Errors
///
/// Returns [`SeedError`] if the file cannot be opened or parsed.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn read_usages_file(path: impl AsRef<Path>) -> Result<Vec<Usage>, SeedError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_usages(file)
}

/// Seeds the corpus from `csv_path` unless it already has rows.
/// Returns the number of rows added.
///
/// # Errors
///
/// Returns [`SeedError`] if the file cannot be read or the insert fails.
#[instrument(skip(repository, csv_path), fields(csv_path = %csv_path.as_ref().display()))]
pub fn seed_usages(
    repository: &UsageRepository,
    csv_path: impl AsRef<Path>,
) -> Result<usize, SeedError> {
    let existing = repository.count()?;
    if existing > 0 {
        info!(existing, "Usage table already seeded");
        return Ok(0);
    }

    let usages = read_usages_file(csv_path)?;
    info!(count = usages.len(), "Adding rows to Usage table");
    Ok(repository.insert_usages(&usages)?)
}

/// Creates both schemas and seeds the corpus. Returns the number of usage
/// rows added.
///
/// # Errors
///
/// Returns [`SeedError`] if a migration, read or insert fails.
#[instrument(skip(config, csv_path), fields(csv_path = %csv_path.as_ref().display()))]
pub fn init_db(config: &AppConfig, csv_path: impl AsRef<Path>) -> Result<usize, SeedError> {
    let usages = UsageRepository::new(config.usage_db().clone())?;
    usages.run_migrations()?;

    let games = GameRepository::new(config.games_db().clone())?;
    games.run_migrations()?;

    seed_usages(&usages, csv_path)
}
