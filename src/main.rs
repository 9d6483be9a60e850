//! pl-opportunity: private-label opportunity ranking
//!
//! Cleans a nutrition reference table and supermarket catalogues, fills
//! missing Nutri-Score grades, links products across sources and ranks food
//! categories by private-label opportunity.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use pl_opportunity::{
    cli,
    config::{AppConfig, AppConfigBuilder, ConfigPreset},
    model::CategoryLevel,
    pipeline::{PipelineInputs, RetailerFeed, exit_codes},
    reports::ReportFormat,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pl-opportunity")]
#[command(version)]
#[command(about = "Rank food categories by private-label opportunity", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    3  Error occurred

EXAMPLES:
    # Rank categories from a reference dump and two supermarket feeds
    pl-opportunity rank --reference off.jsonl \\
        --retailer mercadona:es:mercadona.json --retailer ah:nl:ah.json

    # Machine-readable ranking with a reproducible sensitivity run
    pl-opportunity rank --reference off.jsonl --retailer ah:nl:ah.json -o json --seed 7

    # Grade coverage of a reference table
    pl-opportunity grade --input off.jsonl")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "PL_OPPORTUNITY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output flags shared by every pipeline command
#[derive(clap::Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Write the enriched product table as JSON Lines
    #[arg(long, value_name = "FILE")]
    enriched_out: Option<PathBuf>,
}

/// Arguments for the `rank` subcommand
#[derive(Parser)]
struct RankArgs {
    /// Nutrition reference table (JSON array or JSON Lines)
    #[arg(long)]
    reference: PathBuf,

    /// Retailer feed as ID:COUNTRY:FILE. Can be specified multiple times.
    #[arg(long = "retailer", value_name = "ID:COUNTRY:FILE")]
    retailers: Vec<RetailerFeed>,

    #[command(flatten)]
    output: OutputArgs,

    /// Configuration preset (default, quick, robust)
    #[arg(long, value_parser = parse_preset)]
    preset: Option<ConfigPreset>,

    /// Fuzzy link threshold (0-100)
    #[arg(long)]
    threshold: Option<f64>,

    /// Number of Dirichlet weight draws
    #[arg(long)]
    draws: Option<usize>,

    /// Seed for the weight draws
    #[arg(long)]
    seed: Option<u64>,

    /// Size of the top set tracked for stability
    #[arg(long)]
    top_k: Option<usize>,

    /// Skip the weight sensitivity analysis
    #[arg(long)]
    no_sensitivity: bool,

    /// Rank the Unknown category alongside mapped categories
    #[arg(long)]
    retain_unknown: bool,

    /// Category hierarchy level to rank
    #[arg(long)]
    level: Option<CategoryLevel>,
}

/// Arguments for the `grade` subcommand
#[derive(Parser)]
struct GradeArgs {
    /// Nutrition reference table (JSON array or JSON Lines)
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

/// Arguments for the `link` subcommand
#[derive(Parser)]
struct LinkArgs {
    /// Nutrition reference table (JSON array or JSON Lines)
    #[arg(long)]
    reference: PathBuf,

    /// Retailer feed as ID:COUNTRY:FILE. Can be specified multiple times.
    #[arg(long = "retailer", value_name = "ID:COUNTRY:FILE", required = true)]
    retailers: Vec<RetailerFeed>,

    #[command(flatten)]
    output: OutputArgs,

    /// Fuzzy link threshold (0-100)
    #[arg(long)]
    threshold: Option<f64>,

    /// Only link on exact product codes
    #[arg(long)]
    exact_only: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and rank categories
    Rank(RankArgs),

    /// Normalize a reference table and fill missing grades
    Grade(GradeArgs),

    /// Link retailer feeds to the reference table
    Link(LinkArgs),

    /// Show, inspect, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print the JSON Schema of the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate an example .pl-opportunity.yaml in the current directory
    Init,
}

fn parse_preset(name: &str) -> Result<ConfigPreset, String> {
    ConfigPreset::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
        format!("unknown preset '{name}' (expected one of: {})", names.join(", "))
    })
}

/// Apply the output flags on top of the loaded configuration.
fn with_output(config: AppConfig, args: &OutputArgs) -> AppConfig {
    let format = args.output.unwrap_or(config.output.format);
    let file = args.output_file.clone().or_else(|| config.output.file.clone());
    let enriched = args
        .enriched_out
        .clone()
        .or_else(|| config.output.enriched_file.clone());
    AppConfigBuilder::from_config(config)
        .output_format(format)
        .output_file(file)
        .enriched_file(enriched)
        .build()
}

fn rank_config(base: AppConfig, args: &RankArgs) -> AppConfig {
    let base = match args.preset {
        Some(preset) => {
            tracing::debug!("Using preset '{}': {}", preset, preset.description());
            let mut config = AppConfig::from_preset(preset);
            config.normalizer = base.normalizer;
            config.output = base.output;
            config
        }
        None => base,
    };

    let mut builder = AppConfigBuilder::from_config(base);
    if let Some(threshold) = args.threshold {
        builder = builder.link_threshold(threshold);
    }
    if let Some(draws) = args.draws {
        builder = builder.draws(draws);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(top_k) = args.top_k {
        builder = builder.top_k(top_k);
    }
    if let Some(level) = args.level {
        builder = builder.category_level(level);
    }
    if args.no_sensitivity {
        builder = builder.sensitivity(false);
    }
    if args.retain_unknown {
        builder = builder.retain_unknown(true);
    }
    builder.build()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let exit_code = match dispatch(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let (config, loaded_from) = pl_opportunity::config::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded configuration from {}", path.display());
    }
    Ok(config)
}

fn dispatch(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Rank(args) => {
            let config = rank_config(load_config(cli)?, args);
            let config = with_output(config, &args.output);
            let inputs = PipelineInputs {
                reference: args.reference.clone(),
                retailers: args.retailers.clone(),
            };
            cli::run_rank(&config, &inputs, cli.quiet)
        }

        Commands::Grade(args) => {
            let config = with_output(load_config(cli)?, &args.output);
            cli::run_grade(&config, &args.input, cli.quiet)
        }

        Commands::Link(args) => {
            let mut builder = AppConfigBuilder::from_config(load_config(cli)?);
            if let Some(threshold) = args.threshold {
                builder = builder.link_threshold(threshold);
            }
            if args.exact_only {
                builder = builder.exact_only(true);
            }
            let config = with_output(builder.build(), &args.output);
            let inputs = PipelineInputs {
                reference: args.reference.clone(),
                retailers: args.retailers.clone(),
            };
            cli::run_link(&config, &inputs, cli.quiet)
        }

        Commands::Config { action } => {
            run_config_action(cli, action)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "pl-opportunity", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_config_action(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) =
                pl_opportunity::config::load_or_default(cli.config.as_deref())?;
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
            Ok(())
        }
        ConfigAction::Schema { output } => {
            let schema = pl_opportunity::config::generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(())
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".pl-opportunity.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = pl_opportunity::config::generate_full_example_config();
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
            Ok(())
        }
    }
}
