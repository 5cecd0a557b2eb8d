use crate::config::ImportSettings;
use crate::core::batch::{BatchAccumulator, PendingBatch};
use crate::core::reader::RowReader;
use crate::core::reconcile::reconcile;
use crate::core::template::TemplateRenderer;
use crate::domain::model::ImportSummary;
use crate::domain::ports::BulkSink;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::validate_delimiter;
use std::fmt::Display;

/// Read, render, accumulate and flush, one row at a time.
pub struct ImportEngine<S: BulkSink> {
    sink: S,
    settings: ImportSettings,
}

impl<S: BulkSink> ImportEngine<S> {
    pub fn new(sink: S, settings: ImportSettings) -> Self {
        Self { sink, settings }
    }

    pub async fn run(&self) -> Result<ImportSummary> {
        let settings = &self.settings;
        let delimiter = validate_delimiter("delimiter", settings.delimiter)?;

        let mut reader = RowReader::open(&settings.csv_file, delimiter, settings.max_rows)?;
        let renderer = TemplateRenderer::new(settings, reader.headers().clone())?;

        for name in renderer.unbound_placeholders() {
            tracing::warn!("⚠️ Placeholder %{}% does not match any column and will be sent as is", name);
        }

        self.report("");
        self.report(" ----- CSV to ElasticSearch ----- ");
        self.report(format_args!(
            "Importing {} rows into `{}` from '{}'",
            settings
                .max_rows
                .map_or_else(|| "all".to_string(), |max| max.to_string()),
            settings.elastic_index,
            settings.csv_file
        ));
        self.report("");

        let mut batches = BatchAccumulator::new(settings.batch_size);
        let mut summary = ImportSummary::default();

        for item in &mut reader {
            match item {
                Ok(record) => {
                    summary.rows_read += 1;
                    match renderer.render(&record) {
                        Ok(pair) => {
                            batches.append(&pair);
                            summary.rows_rendered += 1;
                        }
                        Err(e) => {
                            tracing::warn!("⚠️ Skipping: {}", e);
                            summary.rows_skipped += 1;
                        }
                    }
                }
                Err(e @ ImportError::FormatError { .. }) => {
                    tracing::warn!("⚠️ Skipping: {}", e);
                    summary.rows_read += 1;
                    summary.rows_skipped += 1;
                }
                Err(e) => return Err(e),
            }

            if batches.should_flush() {
                if let Some(batch) = batches.take() {
                    self.flush(batch, &mut summary).await?;
                }
            }
        }

        if let Some(batch) = batches.take() {
            self.flush(batch, &mut summary).await?;
        }

        tracing::info!(
            "Read {} rows, rendered {}, skipped {}, sent in {} request(s)",
            summary.rows_read,
            summary.rows_rendered,
            summary.rows_skipped,
            summary.flushes
        );

        Ok(summary)
    }

    async fn flush(&self, mut batch: PendingBatch, summary: &mut ImportSummary) -> Result<()> {
        tracing::info!(
            "📤 Sending {} documents (rows {}-{})",
            batch.len(),
            batch.first_row().unwrap_or_default(),
            batch.last_row().unwrap_or_default()
        );

        let body = std::mem::take(&mut batch.body);
        let result = match self.sink.send_bulk(body).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    "❌ Bulk request for rows {}-{} failed after {} documents were sent",
                    batch.first_row().unwrap_or_default(),
                    batch.last_row().unwrap_or_default(),
                    batch.offset
                );
                return Err(e);
            }
        };
        summary.flushes += 1;

        self.report(format_args!("{} {}", result.status, result.reason));

        let outcome = reconcile(&result, &batch);
        summary.items_indexed += outcome.succeeded;
        summary.items_failed += outcome.failures.len();

        if outcome.is_success() {
            self.report(format_args!("Import of {} items was successful", outcome.items));
        } else {
            for failure in &outcome.failures {
                self.report(format_args!(
                    "Row {}: status {}, {}",
                    failure.row, failure.status, failure.detail
                ));
            }
            self.report(format_args!(
                "Import finished with {} of {} items failing",
                outcome.failures.len(),
                outcome.items
            ));
        }

        Ok(())
    }

    /// Progress lines for the operator; kept off stdout when the sink writes there.
    fn report(&self, line: impl Display) {
        if self.sink.writes_to_stdout() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}
