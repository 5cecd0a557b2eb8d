use super::{non_empty, ImportSettings};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-to-elastic")]
#[command(about = "Bulk-load rows of a delimited file into an Elasticsearch index")]
pub struct CliConfig {
    /// host:port of the store
    #[arg(long, default_value = super::DEFAULT_ELASTIC_ADDRESS)]
    pub elastic_address: String,

    /// Use https
    #[arg(long)]
    pub ssl: bool,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Path to the delimited input file; first row holds the column names
    #[arg(long)]
    pub csv_file: String,

    /// Document template, e.g. '{"name":"%name%"}'
    #[arg(long)]
    pub json_struct: String,

    #[arg(long)]
    pub elastic_index: String,

    /// Mapping type for the action line; pass "" to leave it out
    #[arg(long, default_value = super::DEFAULT_ELASTIC_TYPE)]
    pub elastic_type: String,

    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Column whose values are reformatted as dates
    #[arg(long)]
    pub datetime_field: Option<String>,

    /// strftime layout used for --datetime-field values
    #[arg(long, default_value = super::DEFAULT_DATETIME_FORMAT)]
    pub datetime_format: String,

    /// Column used as document _id (re-imports overwrite instead of duplicating)
    #[arg(long)]
    pub id_column: Option<String>,

    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Character in the template that stands for a double quote
    #[arg(long, default_value_t = '\'')]
    pub quote_char: char,

    /// Rows per bulk request
    #[arg(long, default_value_t = super::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Seconds before a bulk request is abandoned, 0 waits forever
    #[arg(long, default_value_t = super::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print the bulk body instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn to_settings(&self) -> ImportSettings {
        ImportSettings {
            elastic_address: self.elastic_address.clone(),
            ssl: self.ssl,
            username: non_empty(self.username.clone()),
            password: self.password.clone(),
            csv_file: self.csv_file.clone(),
            json_struct: self.json_struct.clone(),
            elastic_index: self.elastic_index.clone(),
            elastic_type: non_empty(Some(self.elastic_type.clone())),
            max_rows: self.max_rows,
            datetime_field: non_empty(self.datetime_field.clone()),
            datetime_format: self.datetime_format.clone(),
            id_column: non_empty(self.id_column.clone()),
            delimiter: self.delimiter,
            quote_char: self.quote_char,
            batch_size: self.batch_size,
            timeout_secs: self.timeout,
        }
    }
}
