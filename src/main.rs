#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use css_playground::config::{load_schema, read_stylesheet, Settings};
use css_playground::session::Session;
use css_playground::Playground;

#[derive(Parser)]
#[command(
    name = "css-playground",
    version,
    about = "Generate CSS from typed playground controls and track changed lines"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (default: <config dir>/css-playground/settings.json)
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stylesheet for a schema and a sequence of value changes
    Render(RenderArgs),

    /// Serve JSON-line requests on stdin, responses on stdout
    Session(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Option schema (JSON array, or object with an "options" array)
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Stylesheet prepended to the generated text
    #[arg(long, value_name = "FILE")]
    prefix: Option<PathBuf>,

    /// Stylesheet used verbatim instead of the generated text
    #[arg(long = "override", value_name = "FILE")]
    override_css: Option<PathBuf>,

    /// Keep the prefix out of the displayed text
    #[arg(long)]
    hide_prefix: bool,

    /// Selector for the custom-property block
    #[arg(long, value_name = "SELECTOR")]
    scope: Option<String>,

    /// Class for options without a target class
    #[arg(long, value_name = "NAME")]
    element: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Value change applied in order, e.g. --set radius=10
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Print the applied text (including a hidden prefix) instead of the displayed text
    #[arg(long)]
    applied: bool,

    /// Prefix lines flagged by the last change with "> "
    #[arg(long)]
    mark_changed: bool,
}

fn parse_assignment(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{input}'"))?;
    if name.is_empty() {
        return Err(format!("missing option name in '{input}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn build_playground(args: &SourceArgs, settings: &Settings) -> Result<Playground> {
    let definitions = load_schema(&args.schema)?;

    let mut sources = settings.sources();
    if let Some(scope) = &args.scope {
        sources.scope_selector = scope.clone();
    }
    if let Some(element) = &args.element {
        sources.element_name = element.clone();
    }
    sources.hide_prefix |= args.hide_prefix;
    sources.prefix_css = args.prefix.as_deref().map(read_stylesheet).transpose()?;
    sources.override_css = args.override_css.as_deref().map(read_stylesheet).transpose()?;

    Ok(Playground::new(&definitions, sources, settings.highlight_duration()))
}

fn render(args: &RenderArgs, settings: &Settings) -> Result<()> {
    let mut playground = build_playground(&args.source, settings)?;

    for (name, value) in &args.set {
        if !playground.set_input(name, value) {
            warn!(option = %name, "Unknown option, value ignored");
        }
    }

    let text = if args.applied {
        playground.applied_text()
    } else {
        playground.display_text()
    };

    if args.mark_changed && !args.applied {
        let changed = playground.highlighted_lines();
        for (index, line) in text.split('\n').enumerate() {
            let marker = if changed.contains(&index) { "> " } else { "  " };
            println!("{marker}{line}");
        }
    } else {
        println!("{text}");
    }
    Ok(())
}

async fn session(args: &SourceArgs, settings: &Settings) -> Result<()> {
    let playground = build_playground(args, settings)?;
    let mut session = Session::new(playground);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(stdin, tokio::io::stdout()).await
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries CSS and protocol output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    info!(settings = ?settings, "Using settings");

    match &cli.command {
        Command::Render(args) => render(args, &settings),
        Command::Session(args) => session(args, &settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_playground::Sources;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("radius=10").unwrap(),
            ("radius".to_string(), "10".to_string())
        );
        assert_eq!(
            parse_assignment("color=#ff0000").unwrap(),
            ("color".to_string(), "#ff0000".to_string())
        );
        assert_eq!(
            parse_assignment("font=a=b").unwrap(),
            ("font".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("radius").is_err());
        assert!(parse_assignment("=10").is_err());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "css-playground",
            "render",
            "--schema",
            "schema.json",
            "--set",
            "radius=10",
            "--set",
            "color=red",
            "--hide-prefix",
        ])
        .unwrap();
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.source.schema, PathBuf::from("schema.json"));
                assert_eq!(args.set.len(), 2);
                assert!(args.source.hide_prefix);
            }
            Command::Session(_) => panic!("expected render"),
        }
    }

    #[test]
    fn test_sources_default_matches_settings() {
        assert_eq!(Settings::default().sources(), Sources::default());
    }
}
