use serde::{Deserialize, Serialize};

/// Column names captured from the first row of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderList {
    names: Vec<String>,
}

impl HeaderList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// One data row, aligned positionally with the [`HeaderList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Source row number; the header is row 1.
    pub row: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// `{action}\n{document}\n` for one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPair {
    pub row: usize,
    pub action: String,
    pub document: String,
}

impl RenderedPair {
    pub fn write_to(&self, buffer: &mut String) {
        buffer.push_str(&self.action);
        buffer.push('\n');
        buffer.push_str(&self.document);
        buffer.push('\n');
    }
}

/// Outcome of one bulk POST.
#[derive(Debug, Clone)]
pub struct FlushResult {
    pub status: u16,
    pub reason: String,
    pub body: BulkResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: Option<u64>,
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkItem>,
}

/// One entry of the `items` array, keyed by the action that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkItem {
    Index(BulkItemStatus),
    Create(BulkItemStatus),
    Update(BulkItemStatus),
    Delete(BulkItemStatus),
}

impl BulkItem {
    pub fn status(&self) -> &BulkItemStatus {
        match self {
            BulkItem::Index(s) | BulkItem::Create(s) | BulkItem::Update(s) | BulkItem::Delete(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemStatus {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl BulkItemStatus {
    /// 201 for a new document, 200 when an existing id was overwritten.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }

    pub fn error_detail(&self) -> String {
        match &self.error {
            Some(serde_json::Value::Object(obj)) => {
                let kind = obj.get("type").and_then(|v| v.as_str()).unwrap_or("error");
                let reason = obj.get("reason").and_then(|v| v.as_str()).unwrap_or("");
                format!("{}: {}", kind, reason)
            }
            Some(other) => other.to_string(),
            None => format!("status {}", self.status),
        }
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_rendered: usize,
    pub rows_skipped: usize,
    pub flushes: usize,
    pub items_indexed: usize,
    pub items_failed: usize,
}

impl ImportSummary {
    pub fn has_failures(&self) -> bool {
        self.items_failed > 0
    }
}
