use clap::Parser;
use csv_to_elastic::domain::ports::BulkSink;
use csv_to_elastic::utils::{logger, validation::Validate};
use csv_to_elastic::{
    CliConfig, DryRunSink, HttpBulkTransport, ImportEngine, ImportError, ImportSettings,
    ImportSummary,
};

/// Some documents were rejected by the store.
const EXIT_PARTIAL_IMPORT: i32 = 4;

async fn run_with<S: BulkSink>(sink: S, settings: ImportSettings) -> Result<ImportSummary, ImportError> {
    ImportEngine::new(sink, settings).run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    logger::init(config.verbose, config.log_json);

    tracing::info!("Starting csv-to-elastic");
    let settings = config.to_settings();
    tracing::debug!(
        "Target: {}, index: {}, batch size: {}",
        settings.bulk_url(),
        settings.elastic_index,
        settings.batch_size
    );

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let result = if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - documents are printed, not sent");
        run_with(DryRunSink::stdout(), settings).await
    } else {
        match HttpBulkTransport::new(&settings) {
            Ok(transport) => run_with(transport, settings).await,
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(summary) => {
            let report = format!(
                "Reached end of CSV - {} rows read, {} documents indexed, {} rejected, {} skipped",
                summary.rows_read, summary.items_indexed, summary.items_failed, summary.rows_skipped
            );
            // stdout carries the NDJSON in a dry run
            if config.dry_run {
                eprintln!("\n{}", report);
            } else {
                println!("\n{}", report);
            }
            if summary.has_failures() {
                tracing::warn!("⚠️ Import completed with {} rejected documents", summary.items_failed);
                std::process::exit(EXIT_PARTIAL_IMPORT);
            }
            tracing::info!("✅ Import completed successfully!");
        }
        Err(e) => {
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }
}
