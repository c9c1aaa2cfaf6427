use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use qrstudio::content::ContentType;
use qrstudio::error::FormatError;
use qrstudio::parser::{parse_style, StyleEdit};
use qrstudio::presets;
use qrstudio::session::{Action, Session};
use qrstudio::style::StyleOverrides;
use qrstudio::{OutputFormat, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "qrstudio")]
#[command(
    about = "Compose styled QR codes and export them as PNG, SVG or a print page",
    long_about = None
)]
struct Args {
    /// Content type: text, url, email, tel, sms or wifi
    content_type: Option<String>,

    /// Content field as key=value (e.g. -f url=https://example.com)
    #[arg(short = 'f', long = "field")]
    fields: Vec<String>,

    /// Base preset (see --list-presets)
    #[arg(long)]
    preset: Option<String>,

    /// Style DSL (e.g. 'modules(shape: "dots") | frame(text: "Scan me")').
    ///
    /// Precedence, lowest first: --preset, a preset(..) in this expression,
    /// --style-json overrides, then the other commands in this expression.
    #[arg(long)]
    style: Option<String>,

    /// JSON file with style overrides
    #[arg(long)]
    style_json: Option<PathBuf>,

    /// JSON file with render options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Output format: png, svg, print or all (overrides the config)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// List presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Print the effective style as JSON and exit
    #[arg(long)]
    dump_style: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_field(raw: &str) -> Result<(String, String), FormatError> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| FormatError::MalformedField(raw.to_string()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.list_presets {
        for name in presets::preset_names() {
            if let Some(preset) = presets::get_preset(name) {
                println!("{:<10} {}", preset.name, preset.description);
            }
        }
        return Ok(());
    }

    let mut options = match &args.config {
        Some(path) => RenderOptions::load(path)?,
        None => RenderOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }

    let content_type: ContentType = args
        .content_type
        .as_deref()
        .unwrap_or("text")
        .parse()
        .context("Invalid content type")?;

    let mut session = Session::new(options.clone());
    let now = Instant::now();
    session.handle(Action::SelectType(content_type), now)?;

    // Applying a preset clears overrides, so both presets go in before any
    // override layer.
    let edit = match &args.style {
        Some(dsl) => parse_style(dsl).context("Failed to parse style")?,
        None => StyleEdit::default(),
    };
    if let Some(name) = &args.preset {
        session.handle(Action::ApplyPreset(name.clone()), now)?;
    }
    if let Some(name) = edit.preset {
        session.handle(Action::ApplyPreset(name), now)?;
    }
    if let Some(path) = &args.style_json {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let overrides: StyleOverrides = serde_json::from_str(&text)
            .with_context(|| format!("Invalid style overrides in {}", path.display()))?;
        session.handle(Action::EditStyle(overrides), now)?;
    }
    if !edit.overrides.is_empty() {
        session.handle(Action::EditStyle(edit.overrides), now)?;
    }

    if args.dump_style {
        let json = serde_json::to_string_pretty(&session.style())
            .context("Failed to serialize style")?;
        println!("{}", json);
        return Ok(());
    }

    for raw in &args.fields {
        let (name, value) = parse_field(raw)?;
        if !content_type.field_names().contains(&name.as_str()) {
            warn!(field = %name, %content_type, "field is not used by this content type");
        }
        session.handle(Action::SetField { name, value }, now)?;
    }
    session.settle()?;

    if !session.can_export() {
        anyhow::bail!(
            "Nothing to export: {} content is not ready ({})",
            content_type,
            session.summary()
        );
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;

    let mut artifacts = Vec::new();
    if options.format.includes_png() {
        artifacts.push(session.export_raster().context("PNG export failed")?);
    }
    if options.format.includes_svg() {
        artifacts.push(session.export_vector().context("SVG export failed")?);
    }
    if options.format.includes_print() {
        artifacts.push(session.export_print().context("Print export failed")?);
    }

    for artifact in &artifacts {
        let path = artifact
            .write_to(&args.out)
            .with_context(|| format!("Failed to write {}", artifact.filename))?;
        println!("{}", path.display());
    }
    info!(count = artifacts.len(), summary = %session.summary(), "export complete");

    Ok(())
}
