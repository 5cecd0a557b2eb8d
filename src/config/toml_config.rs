use super::{non_empty, ImportSettings};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File form of [`ImportSettings`].
///
/// ```toml
/// [elastic]
/// address = "search.internal:9200"
/// ssl = true
/// username = "loader"
/// password = "${ELASTIC_PASSWORD}"
/// index = "people"
///
/// [csv]
/// file = "people.csv"
/// delimiter = ","
///
/// [template]
/// document = '''{"name": "%name%", "age": "%age%"}'''
/// id_column = "id"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub elastic: ElasticSection,
    pub csv: CsvSection,
    pub template: TemplateSection,
    pub batch: Option<BatchSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticSection {
    pub address: Option<String>,
    pub ssl: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub index: String,
    pub r#type: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSection {
    pub file: String,
    pub delimiter: Option<char>,
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSection {
    pub document: String,
    pub quote_char: Option<char>,
    pub id_column: Option<String>,
    pub datetime_field: Option<String>,
    pub datetime_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    pub size: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ELASTIC_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn to_settings(&self) -> ImportSettings {
        let defaults = ImportSettings::default();
        ImportSettings {
            elastic_address: self.elastic.address.clone().unwrap_or(defaults.elastic_address),
            ssl: self.elastic.ssl.unwrap_or(false),
            username: non_empty(self.elastic.username.clone()),
            password: self.elastic.password.clone(),
            csv_file: self.csv.file.clone(),
            json_struct: self.template.document.clone(),
            elastic_index: self.elastic.index.clone(),
            elastic_type: match &self.elastic.r#type {
                Some(t) => non_empty(Some(t.clone())),
                None => defaults.elastic_type,
            },
            max_rows: self.csv.max_rows,
            datetime_field: non_empty(self.template.datetime_field.clone()),
            datetime_format: self
                .template
                .datetime_format
                .clone()
                .unwrap_or(defaults.datetime_format),
            id_column: non_empty(self.template.id_column.clone()),
            delimiter: self.csv.delimiter.unwrap_or(defaults.delimiter),
            quote_char: self.template.quote_char.unwrap_or(defaults.quote_char),
            batch_size: self
                .batch
                .as_ref()
                .and_then(|b| b.size)
                .unwrap_or(defaults.batch_size),
            timeout_secs: self.elastic.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_settings().validate()
    }
}
