use crate::utils::error::{ImportError, Result};
use chrono::NaiveDate;
use std::fmt::Write;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(()),
            "http" | "https" => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: "URL has no host".to_string(),
            }),
            scheme => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Delimiters and quote characters are handed to the CSV reader as single bytes.
pub fn validate_ascii_char(field_name: &str, value: char) -> Result<u8> {
    if !value.is_ascii() || value == '\n' || value == '\r' {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Must be a single ASCII character other than a line break".to_string(),
        });
    }
    Ok(value as u8)
}

/// The CSV reader always treats `"` as its quote character, so it cannot also separate fields.
pub fn validate_delimiter(field_name: &str, value: char) -> Result<u8> {
    let byte = validate_ascii_char(field_name, value)?;
    if value == '"' {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "The double quote is the CSV quote character and cannot be the delimiter".to_string(),
        });
    }
    Ok(byte)
}

/// `host:port[/path]`; the scheme comes from the ssl flag.
pub fn validate_address(field_name: &str, address: &str) -> Result<()> {
    validate_non_empty_string(field_name, address)?;
    if address.contains("://") {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: address.to_string(),
            reason: "Give host:port without a scheme; use --ssl for https".to_string(),
        });
    }
    Ok(())
}

/// Parsed cells carry no offset, so layouts asking for one (`%z`, `%Z`, `%+`) cannot be filled.
pub fn validate_datetime_format(field_name: &str, layout: &str) -> Result<()> {
    validate_non_empty_string(field_name, layout)?;
    let formats = NaiveDate::from_ymd_opt(2021, 3, 5)
        .and_then(|date| date.and_hms_opt(14, 30, 0))
        .map(|sample| {
            let mut out = String::new();
            write!(out, "{}", sample.format(layout)).is_ok()
        })
        .unwrap_or(false);
    if !formats {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: layout.to_string(),
            reason: "Not a strftime layout that works without a timezone offset".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("elastic_address", "https://example.com:9200").is_ok());
        assert!(validate_url("elastic_address", "http://localhost:9200").is_ok());
        assert!(validate_url("elastic_address", "").is_err());
        assert!(validate_url("elastic_address", "invalid-url").is_err());
        assert!(validate_url("elastic_address", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("batch_size", 5, 1).is_ok());
        assert!(validate_positive_number("batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_ascii_char() {
        assert_eq!(validate_ascii_char("delimiter", ';').unwrap(), b';');
        assert_eq!(validate_ascii_char("delimiter", '\t').unwrap(), b'\t');
        assert!(validate_ascii_char("delimiter", '§').is_err());
        assert!(validate_ascii_char("delimiter", '\n').is_err());
    }

    #[test]
    fn test_double_quote_is_not_a_delimiter() {
        assert_eq!(validate_delimiter("delimiter", ',').unwrap(), b',');
        assert!(validate_delimiter("delimiter", '"').is_err());
        assert!(validate_delimiter("delimiter", '\n').is_err());
    }

    #[test]
    fn test_address_without_scheme() {
        assert!(validate_address("elastic_address", "localhost:9200").is_ok());
        assert!(validate_address("elastic_address", "search.example.com:9243/prefix").is_ok());
        assert!(validate_address("elastic_address", "http://localhost:9200").is_err());
        assert!(validate_address("elastic_address", "https://search.example.com").is_err());
    }

    #[test]
    fn test_datetime_format_needs_no_offset() {
        assert!(validate_datetime_format("datetime_format", "%Y-%m-%d %H:%M").is_ok());
        assert!(validate_datetime_format("datetime_format", "%Y-%m-%dT%H:%M:%S").is_ok());
        assert!(validate_datetime_format("datetime_format", "%Y-%m-%dT%H:%M%z").is_err());
        assert!(validate_datetime_format("datetime_format", "%Y-%m-%d %Z").is_err());
        assert!(validate_datetime_format("datetime_format", "%+").is_err());
        assert!(validate_datetime_format("datetime_format", "%Q").is_err());
    }

    #[test]
    fn test_validate_path_and_strings() {
        assert!(validate_path("csv_file", "data.csv").is_ok());
        assert!(validate_path("csv_file", "").is_err());
        assert!(validate_non_empty_string("elastic_index", "  ").is_err());
        assert!(validate_range("timeout", 30u64, 0, 3600).is_ok());
        assert!(validate_range("timeout", 7200u64, 0, 3600).is_err());
    }
}
