use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::error::Error;

/// Tool-wide defaults, read once at startup. Command-line flags override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Canonical extension tokens the tool operates on, matched case-sensitively.
    pub supported_formats: Vec<String>,
    /// chrono format used to parse `--after` and `--before`.
    pub datetime_format: String,
    /// chrono format for the new file stem of `rename`.
    pub rename_scheme: String,
    /// chrono format for the dated directory of `group`.
    pub group_date_format: String,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            datetime_format: "%Y-%m-%d".to_string(),
            rename_scheme: "%Y%m%d_%H%M%S%3f".to_string(),
            group_date_format: "%Y-%m-%d".to_string(),
            log_file: None,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Upa").required(false))
        .add_source(
            Environment::with_prefix("UPA")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("supported_formats"),
        )
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}
