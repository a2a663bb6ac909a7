use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use evo_lineage::{
    config::{Config, ExportFormat, ReportFormat},
    export::GraphExporter,
    lineage::simplify::ScoredNode,
    reports::{BuildReport, ReportGenerator},
    types::MemberId,
    LineagePipeline,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "evo-lineage")]
#[command(about = "Build lineage graphs from genetic-programming event logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lineage graph and export the simplified view
    Build {
        /// Recorder JSON written by the search
        #[arg(short, long, default_value = "pysr_recorder.json")]
        input: PathBuf,

        /// Output file (defaults to pysr_graph.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format, overriding the configuration
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Report format, overriding the configuration
        #[arg(short, long, value_enum)]
        report: Option<ReportFormat>,
    },

    /// Build the graph and print counts without exporting
    Stats {
        #[arg(short, long, default_value = "pysr_recorder.json")]
        input: PathBuf,

        #[arg(short, long, value_enum)]
        report: Option<ReportFormat>,
    },

    /// Print the ancestry or progeny of one member
    Lineage {
        #[arg(short, long, default_value = "pysr_recorder.json")]
        input: PathBuf,

        /// Member identifier
        #[arg(short, long)]
        member: MemberId,

        #[arg(short, long, value_enum, default_value = "ancestors")]
        direction: Direction,
    },

    /// Initialize configuration file
    Init {
        #[arg(long, default_value = "evo-lineage.yml")]
        config_file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Ancestors,
    Descendants,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(&cli.log_level)?;

    let config_path = cli.config;
    let load_config = || Config::load(config_path.as_deref());

    match cli.command {
        Commands::Build {
            input,
            output,
            format,
            report,
        } => build_graph(input, output, format, report, load_config()?),

        Commands::Stats { input, report } => print_stats(input, report, load_config()?),

        Commands::Lineage {
            input,
            member,
            direction,
        } => trace_member(input, member, direction, load_config()?),

        Commands::Init { config_file, force } => init_config(config_file, force),
    }
}

/// Run the full pipeline and print the diagnostic report
fn build_graph(
    input: PathBuf,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    report: Option<ReportFormat>,
    mut config: Config,
) -> Result<()> {
    if let Some(format) = format {
        config.export.format = format;
    }
    let report_format = report.unwrap_or(config.report.format);

    let output = output.unwrap_or_else(|| {
        let extension = GraphExporter::new(&config.export).extension();
        PathBuf::from(format!("pysr_graph.{}", extension))
    });

    info!("Building lineage graph from {:?}", input);
    let build_report = LineagePipeline::new(config).run(&input, &output)?;

    print_report(&build_report, report_format)?;
    println!("Simplified graph written to {}", output.display());
    Ok(())
}

fn print_stats(input: PathBuf, report: Option<ReportFormat>, config: Config) -> Result<()> {
    let report_format = report.unwrap_or(config.report.format);
    let (_, build_report) = LineagePipeline::new(config).build(&input)?;
    print_report(&build_report, report_format)
}

fn trace_member(input: PathBuf, member: MemberId, direction: Direction, config: Config) -> Result<()> {
    let (graph, _) = LineagePipeline::new(config).build(&input)?;

    let (related, label) = match direction {
        Direction::Ancestors => (graph.ancestors(member), "ancestors"),
        Direction::Descendants => (graph.descendants(member), "descendants"),
    };
    let related = related.with_context(|| format!("Cannot trace member {}", member))?;

    println!("Member {} has {} {}", member, related.len(), label);
    for id in related {
        let tree = graph
            .node(id)
            .and_then(|attributes| attributes.tree_text())
            .unwrap_or_default();
        println!("  {}\t{}", id, tree);
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

fn print_report(report: &BuildReport, format: ReportFormat) -> Result<()> {
    let content = ReportGenerator::new().generate(report, format)?;
    println!("{}", content);
    Ok(())
}

/// Initialize configuration file
fn init_config(config_file: PathBuf, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() && !force {
        warn!("Configuration file already exists: {:?}", config_file);
        println!("{} already exists; pass --force to overwrite", config_file.display());
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    println!("Configuration file created: {:?}", config_file);
    Ok(())
}
