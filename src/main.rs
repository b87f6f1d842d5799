use anyhow::{Context, Result};
use clap::{Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use detlog::config::DashboardConfig;
use detlog::render::{self, ChartField, RenderOptions};
use detlog::schema::Report;
use detlog::{DetlogError, ParsedLog};
use is_terminal::IsTerminal;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "detlog",
    about = "Parse object-detection logs and chart latency and class presence",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "path")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed per-frame records
    Frames(FramesArgs),
    /// Chart inference time and per-class presence per frame
    Chart(ChartArgs),
    /// Print the JSON schema of the --json output
    Schema,
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Detection log to read ('-' for stdin)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Minimum probability for a detection to be kept [default: 0.8]
    #[arg(short, long, value_name = "T")]
    threshold: Option<f64>,
}

#[derive(Args, Clone)]
struct FramesArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON (stable schema)
    #[arg(long)]
    json: bool,

    /// Plain text without colors/headers
    #[arg(long)]
    raw: bool,
}

#[derive(Args, Clone)]
struct ChartArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON (stable schema)
    #[arg(long)]
    json: bool,

    /// Plain text without colors/headers
    #[arg(long)]
    raw: bool,

    /// Comma-separated charts to include: latency,presence,counts
    #[arg(long, value_name = "list")]
    fields: Option<String>,
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    // Stop at `--`, which terminates flags.
    let mut args = std::env::args_os();
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(explicit: Option<&Path>, threshold: Option<f64>) -> Result<DashboardConfig> {
    let config = DashboardConfig::load(explicit)
        .map_err(DetlogError::from)?
        .with_threshold(threshold)
        .map_err(DetlogError::from)?;
    log::debug!("using threshold {}", config.analysis.threshold);
    Ok(config)
}

fn parse_input(input: &InputArgs, config: &DashboardConfig) -> Result<ParsedLog> {
    Ok(detlog::parse_file(&input.file, config.analysis.threshold)?)
}

fn render_options(config: &DashboardConfig, color: ColorChoice, raw: bool) -> RenderOptions {
    let want_color =
        !raw && std::io::stdout().is_terminal() && !matches!(color, ColorChoice::Never);
    RenderOptions::new(&config.output, want_color, raw)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", s);
    Ok(())
}

fn run_frames(args: FramesArgs, cli: &Cli, color: ColorChoice) -> Result<()> {
    let config = load_config(cli.config.as_deref(), args.input.threshold)?;
    let log = parse_input(&args.input, &config)?;

    if args.json {
        return print_json(&Report::new(config.analysis.threshold, log));
    }

    let opts = render_options(&config, color, args.raw);
    let rendered = render::render_frames(&log, &opts);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

/// Keep only the view tables behind the requested charts.
fn filter_views(views: Value, fields: &[ChartField]) -> Value {
    let Value::Object(obj) = views else {
        return views;
    };
    let mut map = Map::new();
    for field in fields {
        let key = match field {
            ChartField::Latency => "timestamps",
            ChartField::Presence => "presence",
            ChartField::Counts => "detection_counts",
        };
        if let Some(v) = obj.get(key) {
            map.insert(key.to_string(), v.clone());
        }
    }
    Value::Object(map)
}

fn run_chart(args: ChartArgs, cli: &Cli, color: ColorChoice) -> Result<()> {
    let fields = render::parse_fields(args.fields.as_deref()).map_err(DetlogError::Usage)?;
    let config = load_config(cli.config.as_deref(), args.input.threshold)?;
    let log = parse_input(&args.input, &config)?;
    let report = Report::new(config.analysis.threshold, log).with_views();

    if args.json {
        let mut value = serde_json::to_value(&report).context("failed to serialize output")?;
        if args.fields.is_some()
            && let Some(views) = value.get_mut("views")
        {
            *views = filter_views(views.take(), &fields);
        }
        return print_json(&value);
    }

    let Some(views) = report.views.as_ref() else {
        return Ok(());
    };
    let opts = render_options(&config, color, args.raw);
    let rendered = render::render_charts(views, &fields, &opts);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    print_json(&schemars::schema_for!(Report))
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<DetlogError>() {
        e.exit_code()
    } else if err.downcast_ref::<serde_json::Error>().is_some() {
        3
    } else {
        1
    }
}

fn main() {
    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);

    let result = match cli.command.take() {
        Some(Commands::Frames(args)) => run_frames(args, &cli, color),
        Some(Commands::Chart(args)) => run_chart(args, &cli, color),
        Some(Commands::Schema) => run_schema(),
        None => Ok(()),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}
