//! Placeholder substitution for the document and action lines.
//!
//! Templates are JSON text in which `%column%` marks where a cell value goes.
//! CSV cells are always strings, so substitution is quote-aware: for an
//! integer cell the quoted form `"%column%"` is replaced by the bare number,
//! for the datetime column it is replaced by a quoted, reformatted timestamp,
//! and for anything else only `%column%` is replaced so the template's own
//! quotes remain around the value. Only the template is scanned for
//! placeholders, never the cell text put into it.

use crate::config::ImportSettings;
use crate::domain::model::{HeaderList, Record, RenderedPair};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::fmt::Write;

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d %b %Y %H:%M",
    "%b %d %Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

/// Parses the date formats people usually put in spreadsheets, without
/// being told which one. Offsets are dropped, keeping the wall-clock time.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_local());
    }
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Turns the quote-escape character into `"` and joins the template onto one line.
pub fn normalize_template(raw: &str, quote_char: char) -> String {
    raw.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == quote_char { '"' } else { c })
        .collect()
}

#[derive(Serialize)]
struct ActionLine<'a> {
    index: IndexAction<'a>,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    doc_type: Option<&'a str>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

/// `{"index":{"_index":..,"_type":..,"_id":..}}`
pub fn action_line(index: &str, doc_type: Option<&str>, id: Option<&str>) -> Result<String> {
    Ok(serde_json::to_string(&ActionLine {
        index: IndexAction { index, doc_type, id },
    })?)
}

enum CellValue<'a> {
    Timestamp(String),
    Integer(i64),
    Text(&'a str),
}

/// `%column%`, together with the quote on either side when there is one.
const PLACEHOLDER_PATTERN: &str = r#"("?)%([^%"\s]+)%("?)"#;

pub struct TemplateRenderer {
    template: String,
    placeholder: Regex,
    headers: HeaderList,
    index: String,
    doc_type: Option<String>,
    id_position: Option<usize>,
    datetime_field: Option<String>,
    datetime_format: String,
}

impl TemplateRenderer {
    pub fn new(settings: &ImportSettings, headers: HeaderList) -> Result<Self> {
        validation::validate_datetime_format("datetime_format", &settings.datetime_format)?;

        let id_position = match &settings.id_column {
            Some(column) => Some(headers.position(column).ok_or_else(|| {
                ImportError::InvalidConfigValueError {
                    field: "id_column".to_string(),
                    value: column.clone(),
                    reason: format!("No such column; available: {}", headers.names().join(", ")),
                }
            })?),
            None => None,
        };

        if let Some(field) = &settings.datetime_field {
            if !headers.contains(field) {
                tracing::warn!("⚠️ Datetime field '{}' is not a column of the input", field);
            }
        }

        let placeholder = Regex::new(PLACEHOLDER_PATTERN).map_err(|e| ImportError::ConfigError {
            message: format!("placeholder pattern: {}", e),
        })?;

        Ok(Self {
            template: normalize_template(&settings.json_struct, settings.quote_char),
            placeholder,
            headers,
            index: settings.elastic_index.clone(),
            doc_type: settings.elastic_type.clone(),
            id_position,
            datetime_field: settings.datetime_field.clone(),
            datetime_format: settings.datetime_format.clone(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholders in the template that no column will ever fill.
    pub fn unbound_placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.placeholder.captures_iter(&self.template) {
            let name = &caps[2];
            if !self.headers.contains(name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    fn classify<'a>(&self, header: &str, value: &'a str, row: usize) -> CellValue<'a> {
        if self.datetime_field.as_deref() == Some(header) {
            match parse_datetime(value).and_then(|dt| format_timestamp(&dt, &self.datetime_format)) {
                Some(ts) => return CellValue::Timestamp(ts),
                None => tracing::warn!(
                    "Row {}: '{}' in column '{}' is not a recognizable date, keeping it as text",
                    row,
                    value,
                    header
                ),
            }
        }
        match value.trim().parse::<i64>() {
            Ok(number) => CellValue::Integer(number),
            Err(_) => CellValue::Text(value),
        }
    }

    /// One left-to-right pass over the template; substituted cell text is
    /// never scanned again, so a value that looks like `%other%` stays as is.
    pub fn render_document(&self, record: &Record) -> Result<String> {
        let mut document = String::with_capacity(self.template.len());
        let mut last = 0;

        for caps in self.placeholder.captures_iter(&self.template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            document.push_str(&self.template[last..whole.start()]);
            last = whole.end();

            let Some(position) = self.headers.position(name.as_str()) else {
                document.push_str(whole.as_str());
                continue;
            };
            let open = caps.get(1).map_or("", |m| m.as_str());
            let close = caps.get(3).map_or("", |m| m.as_str());
            let quoted = !open.is_empty() && !close.is_empty();
            let value = record.get(position).unwrap_or_default();

            match self.classify(name.as_str(), value, record.row) {
                CellValue::Integer(number) if quoted => document.push_str(&number.to_string()),
                CellValue::Timestamp(ts) => {
                    document.push_str(open);
                    document.push_str(&escape_json_text(&ts));
                    document.push_str(close);
                }
                CellValue::Integer(_) => {
                    document.push_str(open);
                    document.push_str(&escape_json_text(value));
                    document.push_str(close);
                }
                CellValue::Text(text) => {
                    document.push_str(open);
                    document.push_str(&escape_json_text(text));
                    document.push_str(close);
                }
            }
        }
        document.push_str(&self.template[last..]);

        let parsed: serde_json::Value = serde_json::from_str(&document)
            .map_err(|source| ImportError::TemplateError { row: record.row, source })?;
        if !parsed.is_object() {
            return Err(ImportError::TemplateError {
                row: record.row,
                source: serde::de::Error::custom("document is not a JSON object"),
            });
        }

        Ok(document)
    }

    pub fn render_action(&self, record: &Record) -> Result<String> {
        let id = self.id_position.and_then(|position| record.get(position));
        action_line(&self.index, self.doc_type.as_deref(), id)
    }

    pub fn render(&self, record: &Record) -> Result<RenderedPair> {
        Ok(RenderedPair {
            row: record.row,
            action: self.render_action(record)?,
            document: self.render_document(record)?,
        })
    }
}

/// JSON string escaping without the surrounding quotes; plain text comes back unchanged.
fn escape_json_text(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// `None` when the layout needs something a naive timestamp does not have.
fn format_timestamp(dt: &NaiveDateTime, layout: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(layout)).ok()?;
    Some(out)
}
