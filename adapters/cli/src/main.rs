#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs snake test suites and renders their frames.

mod config;
mod report;

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use snake_tester_rendering::RenderingBackend;
use snake_tester_rendering_svg::{ArtworkLibrary, SvgBackend};
use snake_tester_suite::{query, TestSuite};
use snake_tester_system_board_render::render;
use snake_tester_system_evaluator::{Evaluator, EvaluatorConfig};
use tracing::{debug, info};

use crate::{config::TesterConfig, report::RunReport};

#[derive(Parser, Debug)]
#[command(
    name = "snake-tester",
    about = "Replays recorded board positions against a snake server"
)]
struct Cli {
    /// Configuration file; `tester.toml` in the working directory when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the snake server for a move on every selected test.
    Run(RunArgs),
    /// Write one frame of a test as an SVG document.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Test suite JSON file.
    #[arg(long)]
    suite: PathBuf,

    /// Snake server base URL, overriding the configured one.
    #[arg(long)]
    server: Option<String>,

    /// Only run the tests with these ids.
    #[arg(long = "test")]
    tests: Vec<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Test suite JSON file.
    #[arg(long)]
    suite: PathBuf,

    /// Id of the test to draw.
    #[arg(long)]
    test: String,

    /// Turn to draw; the tested turn when omitted.
    #[arg(long)]
    turn: Option<u32>,

    /// Snake id drawn on top of the others.
    #[arg(long)]
    highlight: Option<String>,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = TesterConfig::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Command::Run(args) => run(args, &config).await,
        Command::Render(args) => render_frame(args, &config),
    }
}

async fn run(args: RunArgs, config: &TesterConfig) -> Result<ExitCode> {
    let suite = TestSuite::from_path(&args.suite)?;
    let selected = if args.tests.is_empty() {
        suite.iter().collect::<Vec<_>>()
    } else {
        args.tests
            .iter()
            .map(|id| {
                query::test_by_id(&suite, id)
                    .with_context(|| format!("test {id} not found in {}", args.suite.display()))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let server = args.server.as_deref().unwrap_or(&config.server);
    let evaluator = Evaluator::new(
        &EvaluatorConfig::new(server).with_request_timeout(config.request_timeout()),
    )?;
    info!(
        server = evaluator.move_url(),
        tests = selected.len(),
        "evaluating suite"
    );

    let outcomes = evaluator.evaluate_all(selected.iter().copied()).await;
    let report = RunReport::new(
        selected
            .iter()
            .map(|test| test.id.as_str())
            .zip(&outcomes),
    );
    for line in report.lines() {
        println!("{line}");
    }
    println!("{}", report.summary());

    Ok(report.exit_code())
}

fn render_frame(args: RenderArgs, config: &TesterConfig) -> Result<ExitCode> {
    let suite = TestSuite::from_path(&args.suite)?;
    let Some(test) = query::test_by_id(&suite, &args.test) else {
        bail!("test {} not found in {}", args.test, args.suite.display());
    };
    let turn = args.turn.unwrap_or(test.frame_to_test);
    let frame = query::frame_at_turn(test, turn)
        .with_context(|| format!("test {} has no frame for turn {turn}", test.id))?;

    let manifest = config
        .assets
        .clone()
        .unwrap_or_else(ArtworkLibrary::default_manifest_path);
    let library = ArtworkLibrary::from_manifest_path(&manifest)?;
    let palette = config.palette.to_palette()?;

    let scene = render(
        frame,
        test.game.dimensions(),
        args.highlight.as_deref(),
        &palette,
        &library,
    )
    .with_context(|| format!("failed to render turn {turn} of test {}", test.id))?;
    let document = SvgBackend::new(&library).present(&scene.to_presentation())?;

    fs::write(&args.out, document)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(test = %test.id, turn, out = %args.out.display(), "rendered frame");
    Ok(ExitCode::SUCCESS)
}
