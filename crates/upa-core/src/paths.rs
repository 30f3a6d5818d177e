use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A chrono format string that is known to render.
///
/// Rendering a `DateTime` through an unchecked format panics on specifiers
/// chrono does not know (`%Q`), so user supplied formats go through
/// [`DateFormat::parse`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

impl DateFormat {
    pub fn parse(format: &str) -> Result<Self, Error> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidDateFormat(format.to_string()));
        }
        Ok(Self(format.to_string()))
    }

    /// `when` rendered through this format.
    pub fn render<Tz>(&self, when: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        when.format(&self.0).to_string()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last component of `path`, empty when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` with its file stem replaced by `when` rendered through `format`.
/// Directory and extension are kept.
pub fn with_dated_file_stem<Tz>(path: &Path, when: &DateTime<Tz>, format: &DateFormat) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stem = format.render(when);
    let name = match path.extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
        None => stem,
    };
    path.with_file_name(name)
}

/// Insert a directory named after `when` (and `label`, if any) between the
/// parent of `path` and its file name.
pub fn insert_dated_directory<Tz>(
    path: &Path,
    when: &DateTime<Tz>,
    format: &DateFormat,
    label: Option<&str>,
) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut dir_name = format.render(when);
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        dir_name.push(' ');
        dir_name.push_str(label);
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    match path.file_name() {
        Some(name) => parent.join(dir_name).join(name),
        None => parent.join(dir_name),
    }
}
