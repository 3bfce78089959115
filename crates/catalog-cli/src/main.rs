use std::path::PathBuf;

use anyhow::Result;
use catalog_core::{parse_type_list, AnalyticsBundle, RankedView, TitleType};
use catalog_engine::{load_engine, CatalogConfig};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Catalog analytics command-line interface")]
struct Cli {
    /// Dataset file (CSV, or JSON array). Defaults to CATALOG_DATASET_PATH.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// YAML file overriding ranking caps and histogram size.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Summary {
        /// Comma-separated title types, e.g. "Movie,TV Show".
        #[arg(long)]
        types: Option<String>,
        #[arg(long)]
        min_year: Option<i32>,
        #[arg(long)]
        max_year: Option<i32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    LoadReport,
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = CatalogConfig::from_env();
    if let Some(dataset) = cli.dataset {
        config.dataset_path = dataset;
    }
    if let Some(settings) = cli.settings {
        config.settings_path = Some(settings);
    }

    let command = cli.command.unwrap_or(Commands::Summary {
        types: None,
        min_year: None,
        max_year: None,
        format: OutputFormat::Text,
    });

    match command {
        Commands::Summary {
            types,
            min_year,
            max_year,
            format,
        } => {
            let engine = load_engine(&config)?;
            let types = types.as_deref().map(parse_type_list).transpose()?;
            let criteria = engine.resolve_criteria(types, min_year, max_year);
            let bundle = engine.query(&criteria)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bundle)?),
                OutputFormat::Text => print!("{}", render_text_summary(&bundle)),
            }
        }
        Commands::LoadReport => {
            let engine = load_engine(&config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(engine.store().load_report())?
            );
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.web_port);
            let engine = load_engine(&config)?;
            catalog_web::serve(catalog_web::AppState::new(engine), port).await?;
        }
    }

    Ok(())
}

fn render_text_summary(bundle: &AnalyticsBundle) -> String {
    let types = bundle
        .criteria
        .types
        .iter()
        .map(TitleType::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        "# Catalog Summary".to_string(),
        String::new(),
        format!(
            "- Selection: {} released {}-{}",
            types, bundle.criteria.min_year, bundle.criteria.max_year
        ),
        format!("- Total titles: {}", bundle.metrics.total_titles),
        format!("- Movies: {}", bundle.metrics.movies),
        format!("- TV shows: {}", bundle.metrics.tv_shows),
        format!("- Countries: {}", bundle.metrics.countries),
    ];

    for view in [
        &bundle.top_countries,
        &bundle.top_genres,
        &bundle.rating_distribution,
        &bundle.top_directors,
        &bundle.top_cast,
    ] {
        push_ranked(&mut lines, view);
    }

    lines.push(String::new());
    lines.push("## release_years".to_string());
    for row in &bundle.release_years.rows {
        lines.push(format!("- {}: {}", row.year, row.count));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn push_ranked(lines: &mut Vec<String>, view: &RankedView) {
    lines.push(String::new());
    lines.push(format!("## {}", view.name));
    if view.is_empty() {
        lines.push("- (none)".to_string());
    }
    for row in &view.rows {
        lines.push(format!("- {}: {}", row.label, row.count));
    }
}
