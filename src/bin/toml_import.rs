use anyhow::Context;
use clap::Parser;
use csv_to_elastic::utils::{logger, validation::Validate};
use csv_to_elastic::{DryRunSink, HttpBulkTransport, ImportEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-import")]
#[command(about = "csv-to-elastic driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "import.toml")]
    config: String,

    /// Override the row cap from the config
    #[arg(long)]
    max_rows: Option<usize>,

    /// Print the bulk body instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;
    config.validate().context("invalid configuration")?;

    let mut settings = config.to_settings();
    if let Some(max_rows) = args.max_rows {
        settings.max_rows = Some(max_rows);
        tracing::info!("🔧 Max rows overridden to: {}", max_rows);
    }

    let mut overview = format!(
        "📋 Configuration Summary:\n  Target: {}\n  Index: {}\n  Input: {}\n  Batch size: {}\n",
        settings.bulk_url(),
        settings.elastic_index,
        settings.csv_file,
        settings.batch_size
    );
    if let Some(id_column) = &settings.id_column {
        overview.push_str(&format!("  Id column: {}\n", id_column));
    }
    // a dry run prints the bulk body on stdout
    if args.dry_run {
        eprintln!("{}", overview);
    } else {
        println!("{}", overview);
    }

    let summary = if args.dry_run {
        ImportEngine::new(DryRunSink::stdout(), settings).run().await?
    } else {
        let transport = HttpBulkTransport::new(&settings)?;
        ImportEngine::new(transport, settings).run().await?
    };

    if summary.has_failures() {
        anyhow::bail!(
            "{} of {} documents were rejected",
            summary.items_failed,
            summary.items_failed + summary.items_indexed
        );
    }

    tracing::info!("✅ Imported {} documents", summary.items_indexed);
    Ok(())
}
