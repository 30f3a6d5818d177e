use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;
use crate::service::MediaFileService;

/// Which files a task operates on.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub sources: Vec<PathBuf>,
    pub recursive: bool,
    /// Matched against file names.
    pub pattern: Regex,
    /// Exclusive lower bound on creation time.
    pub after: Option<DateTime<Local>>,
    /// Exclusive upper bound on creation time.
    pub before: Option<DateTime<Local>>,
}

impl FilterSpec {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            recursive: false,
            pattern: match_all(),
            after: None,
            before: None,
        }
    }
}

fn match_all() -> Regex {
    Regex::new(".*").expect("match-all pattern")
}

/// Validate a user supplied file name pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Parse a `--after` / `--before` value with a chrono format string.
///
/// Formats without a time component resolve to local midnight. Returns
/// `None` when the value does not match the format.
pub fn parse_datetime_bound(value: &str, format: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Local.from_local_datetime(&naive).earliest()
}

/// Build the ordered candidate list for `spec`.
///
/// Sources are listed in order and concatenated. Files whose extension is not
/// supported are dropped, then the creation-time bounds are applied. A missing
/// source directory aborts the whole call, as does a creation time that
/// cannot be read.
pub fn build_candidate_list<S>(service: &S, spec: &FilterSpec) -> Result<Vec<PathBuf>, Error>
where
    S: MediaFileService + ?Sized,
{
    let mut files = Vec::new();
    for source in &spec.sources {
        files.extend(list_source(service, source, spec)?);
    }

    if let Some(after) = spec.after {
        files = retain_by_creation(service, files, |created| after < created)?;
    }
    if let Some(before) = spec.before {
        files = retain_by_creation(service, files, |created| created < before)?;
    }

    debug!("{} filtered files found", files.len());
    Ok(files)
}

fn list_source<S>(service: &S, source: &Path, spec: &FilterSpec) -> Result<Vec<PathBuf>, Error>
where
    S: MediaFileService + ?Sized,
{
    if !service.is_dir(source) {
        return Err(Error::SourceDirectoryNotFound(source.to_path_buf()));
    }
    debug!("Listing directory \"{}\"", source.display());

    let supported = service.supported_extensions();
    let files: Vec<PathBuf> = service
        .list_files(source, spec.recursive, &spec.pattern)?
        .into_iter()
        .filter(|file| {
            service.is_file(file)
                && service
                    .extension_of(file)
                    .map(|ext| supported.iter().any(|s| *s == ext))
                    .unwrap_or(false)
        })
        .collect();

    debug!("{} supported files found", files.len());
    Ok(files)
}

fn retain_by_creation<S, F>(service: &S, files: Vec<PathBuf>, keep: F) -> Result<Vec<PathBuf>, Error>
where
    S: MediaFileService + ?Sized,
    F: Fn(DateTime<Local>) -> bool,
{
    let mut kept = Vec::with_capacity(files.len());
    for file in files {
        if keep(service.creation_time(&file)?) {
            kept.push(file);
        }
    }
    Ok(kept)
}
