use crate::config::{Config, load_config};
use crate::ir::ChartType;
use crate::layout::{ChartOptions, Quote, plan_chart};
use crate::layout_dump::write_scene_dump;
use crate::parser::{parse_card_document, parse_chart_document};
use crate::render::{chart_config_json, render_scene_svg, write_output};
use crate::{CardOptions, build_scene};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qcr",
    version,
    about = "Quote cards and chart plans from generated style documents"
)]
pub struct Args {
    /// Config JSON file with layout overrides
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a quote card to SVG
    Card(CardArgs),
    /// Plan a chart configuration as JSON
    Chart(ChartArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CardArgs {
    /// Card style document (JSON) or '-' for stdin
    #[arg(short = 'd', long = "doc")]
    pub doc: PathBuf,

    /// Quote text file or '-' for stdin
    #[arg(short = 't', long = "text")]
    pub text: PathBuf,

    #[arg(short = 'a', long = "author")]
    pub author: Option<String>,

    #[arg(short = 's', long = "source")]
    pub source: Option<String>,

    /// Uniform serif 22px typography
    #[arg(long = "fixed-format")]
    pub fixed_format: bool,

    /// Seed for the decorative icon pick
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Output SVG file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Write the resolved scene as JSON
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ChartArgs {
    /// Chart document (JSON) or '-' for stdin
    #[arg(short = 'd', long = "doc")]
    pub doc: PathBuf,

    /// Force a chart type instead of the document's
    #[arg(long = "chart-type", value_enum)]
    pub chart_type: Option<ChartKind>,

    #[arg(long = "begin-at-zero")]
    pub begin_at_zero: bool,

    /// Do not fill the area under line series
    #[arg(long = "no-fill")]
    pub no_fill: bool,

    /// Output JSON file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Scatter,
}

impl From<ChartKind> for ChartType {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Line => ChartType::Line,
            ChartKind::Bar => ChartType::Bar,
            ChartKind::Pie => ChartType::Pie,
            ChartKind::Scatter => ChartType::Scatter,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    run_with_args(args)
}

pub fn run_with_args(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    match args.command {
        Command::Card(card) => run_card(card, config),
        Command::Chart(chart) => run_chart(chart, &config),
    }
}

fn run_card(args: CardArgs, config: Config) -> Result<()> {
    if args.doc == Path::new("-") && args.text == Path::new("-") {
        return Err(anyhow::anyhow!("--doc and --text cannot both read stdin"));
    }
    let document = parse_card_document(&read_input(&args.doc)?)?;
    let text = read_input(&args.text)?;
    let mut quote = Quote::new(text.trim());
    if let Some(author) = args.author.as_deref() {
        quote = quote.with_author(author);
    }
    if let Some(source) = args.source.as_deref() {
        quote = quote.with_source(source);
    }

    let options = CardOptions {
        fixed_format: args.fixed_format,
        seed: args.seed,
        config,
    };
    let scene = build_scene(&document, &quote, &options);
    info!(
        lines = scene.text.runs.len(),
        height = scene.height,
        patterns = scene.patterns.patterns.len(),
        "card assembled"
    );
    if let Some(dump) = args.dump.as_deref() {
        write_scene_dump(dump, &scene)?;
    }
    write_output(&render_scene_svg(&scene), args.output.as_deref())?;
    Ok(())
}

fn run_chart(args: ChartArgs, config: &Config) -> Result<()> {
    let chart_type = args.chart_type.map(ChartType::from);
    let document = parse_chart_document(
        &read_input(&args.doc)?,
        chart_type.unwrap_or_default(),
    )?;
    let options = ChartOptions {
        begin_at_zero: args.begin_at_zero,
        fill: !args.no_fill,
        chart_type,
    };
    let plan = plan_chart(&document, &options, &config.chart);
    info!(
        chart_type = ?plan.chart_type,
        datasets = plan.datasets.len(),
        secondary = plan.axes.secondary_index().is_some(),
        "chart planned"
    );
    write_output(&chart_config_json(&plan)?, args.output.as_deref())?;
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
