#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ELASTIC_ADDRESS: &str = "localhost:9200";
pub const DEFAULT_ELASTIC_TYPE: &str = "test_type";
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything one import run needs, resolved once at startup and handed to
/// each component explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSettings {
    /// `host:port`, without scheme.
    pub elastic_address: String,
    pub ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub csv_file: String,
    pub json_struct: String,
    pub elastic_index: String,
    /// `None` leaves `_type` out of the action line.
    pub elastic_type: Option<String>,
    pub max_rows: Option<usize>,
    pub datetime_field: Option<String>,
    pub datetime_format: String,
    pub id_column: Option<String>,
    pub delimiter: char,
    pub quote_char: char,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            elastic_address: DEFAULT_ELASTIC_ADDRESS.to_string(),
            ssl: false,
            username: None,
            password: None,
            csv_file: String::new(),
            json_struct: String::new(),
            elastic_index: String::new(),
            elastic_type: Some(DEFAULT_ELASTIC_TYPE.to_string()),
            max_rows: None,
            datetime_field: None,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            id_column: None,
            delimiter: ';',
            quote_char: '\'',
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ImportSettings {
    pub fn bulk_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}/_bulk", scheme, self.elastic_address.trim_end_matches('/'))
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), password) => Some((user.as_str(), password.as_deref().unwrap_or(""))),
            (None, _) => None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Empty strings from the command line mean "not set".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("csv_file", &self.csv_file)?;
        validation::validate_non_empty_string("json_struct", &self.json_struct)?;
        validation::validate_non_empty_string("elastic_index", &self.elastic_index)?;
        validation::validate_address("elastic_address", &self.elastic_address)?;
        validation::validate_url("elastic_address", &self.bulk_url())?;
        validation::validate_datetime_format("datetime_format", &self.datetime_format)?;
        validation::validate_delimiter("delimiter", self.delimiter)?;
        validation::validate_ascii_char("quote_char", self.quote_char)?;
        validation::validate_positive_number("batch_size", self.batch_size, 1)?;
        validation::validate_range("timeout", self.timeout_secs, 0, 86_400)?;
        if let Some(max_rows) = self.max_rows {
            validation::validate_positive_number("max_rows", max_rows, 1)?;
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(crate::utils::error::ImportError::MissingConfigError {
                field: "username".to_string(),
            });
        }
        Ok(())
    }
}
