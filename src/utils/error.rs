use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot open CSV file '{path}': {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Row {row}: expected {expected} fields, found {found}")]
    FormatError {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: rendered document is not valid JSON: {source}")]
    TemplateError {
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bulk request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Bulk endpoint answered {status} {reason}: {body}")]
    HttpStatusError {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Unparsable bulk response: {source}")]
    ResponseError {
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Row,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 單列問題，略過後繼續
    Low,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::FileOpen { .. } | ImportError::IoError(_) | ImportError::CsvError(_) => {
                ErrorCategory::Input
            }
            ImportError::FormatError { .. } | ImportError::TemplateError { .. } => {
                ErrorCategory::Row
            }
            ImportError::HttpError(_)
            | ImportError::HttpStatusError { .. }
            | ImportError::ResponseError { .. } => ErrorCategory::Transport,
            ImportError::SerializationError(_)
            | ImportError::ConfigError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Row => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::High,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Input => 2,
            ErrorCategory::Transport => 3,
            ErrorCategory::Row => 0,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::FileOpen { .. } => "Check that --csv-file points to a readable file",
            ImportError::IoError(_) | ImportError::CsvError(_) => {
                "Check the file encoding, delimiter and quoting"
            }
            ImportError::FormatError { .. } => "Make sure every row has as many fields as the header",
            ImportError::TemplateError { .. } => {
                "Check that the template stays valid JSON once values are substituted"
            }
            ImportError::HttpError(_) => "Check --elastic-address, --ssl and that the store is reachable",
            ImportError::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check --username/--password; credentials are only sent over https or to localhost"
            }
            ImportError::HttpStatusError { .. } => "Inspect the store logs for the rejected request",
            ImportError::ResponseError { .. } => "Make sure the address points at a bulk-capable store",
            ImportError::SerializationError(_) => "Check the index and type names",
            ImportError::ConfigError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => "Run with --help to see the accepted options",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
