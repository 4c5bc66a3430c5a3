use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::{Serialize, de::DeserializeOwned};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "worldview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the selected section of a canvas snapshot as an epoch.
    Extract(ExtractArgs),
    /// Draw every screen of an epoch into a canvas snapshot.
    Render(RenderArgs),
    /// Print the themed screen for a single node tree.
    Theme(ThemeArgs),
    /// Extract, redraw and re-extract a node, and report whether the trees match.
    Roundtrip(RoundtripArgs),
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input canvas snapshot JSON. Its selection must be a single section.
    #[arg(long)]
    canvas: PathBuf,

    /// Output epoch JSON.
    #[arg(long)]
    out: PathBuf,

    /// Also write the upload asset table (theme key to image bytes).
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input epoch JSON.
    #[arg(long)]
    epoch: PathBuf,

    /// Output canvas snapshot JSON.
    #[arg(long)]
    out: PathBuf,

    /// Canvas snapshot to draw into instead of an empty canvas.
    #[arg(long)]
    base: Option<PathBuf>,

    /// Settings TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pacing delay between siblings in milliseconds; overrides the settings file.
    #[arg(long)]
    pacing_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct ThemeArgs {
    /// Input Worldview node JSON.
    #[arg(long)]
    node: PathBuf,
}

#[derive(Parser, Debug)]
struct RoundtripArgs {
    /// Input canvas snapshot JSON.
    #[arg(long)]
    canvas: PathBuf,

    /// Label of the node to round-trip; defaults to the selection, then the first top-level node.
    #[arg(long)]
    node: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Extract(args) => cmd_extract(args).await,
        Command::Render(args) => cmd_render(args).await,
        Command::Theme(args) => cmd_theme(args),
        Command::Roundtrip(args) => cmd_roundtrip(args).await,
    }
}

/// `RUST_LOG` filters (default `worldview=info`); `WORLDVIEW_LOG_FORMAT=json` switches to JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "worldview=info".into());
    let format = std::env::var("WORLDVIEW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    match format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {what} JSON '{}'", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).with_context(|| format!("encode {what}"))?;
    std::fs::write(path, json).with_context(|| format!("write {what} '{}'", path.display()))
}

fn load_canvas(path: &Path) -> anyhow::Result<worldview::LoadedCanvas> {
    let snapshot: worldview::CanvasSnapshot = read_json(path, "canvas snapshot")?;
    Ok(worldview::Canvas::from_snapshot(&snapshot)?)
}

fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn session_for(settings: worldview::Settings, root: PathBuf) -> worldview::Session {
    let fetcher = Arc::new(worldview::FsFetcher::new(root));
    worldview::Session::new(worldview::Context::new(settings, fetcher))
}

async fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let mut loaded = load_canvas(&args.canvas)?;
    let mut session = session_for(worldview::Settings::default(), base_dir(&args.canvas));

    let Some(epoch) = session.extract_selection(&mut loaded.canvas) else {
        let reason = session
            .notifier()
            .current()
            .map(|n| n.message.clone())
            .unwrap_or_default();
        anyhow::bail!("extraction failed: {reason}");
    };
    write_json(&args.out, &epoch, "epoch")?;

    if let Some(path) = &args.assets {
        let ctx = session.context();
        let assets = worldview::collect_upload_assets(
            &loaded.canvas,
            epoch.screens(),
            &ctx.images,
            ctx.fetcher.as_ref(),
        )
        .await?;
        write_json(path, &assets, "assets")?;
    }

    let screens = epoch.screens().count();
    eprintln!("wrote {} ({screens} screens)", args.out.display());
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let epoch: worldview::Epoch = read_json(&args.epoch, "epoch")?;
    let mut settings = match &args.config {
        Some(path) => worldview::Settings::load(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => worldview::Settings::default(),
    };
    if let Some(ms) = args.pacing_ms {
        settings.timeout = ms;
        settings.validate()?;
    }

    let mut canvas = match &args.base {
        Some(path) => load_canvas(path)?.canvas,
        None => worldview::Canvas::new(),
    };
    let mut session = session_for(settings, base_dir(&args.epoch));
    let response = worldview::DownloadResponse {
        screens: epoch.screens().cloned().collect(),
    };
    let outcome = session.draw_download(&mut canvas, &response).await;

    write_json(&args.out, &canvas.snapshot(), "canvas snapshot")?;
    eprintln!(
        "wrote {} ({} of {} screens drawn, {} links resolved, {} dropped)",
        args.out.display(),
        outcome.roots.len(),
        response.screens.len(),
        outcome.link.resolved,
        outcome.link.dropped
    );
    Ok(())
}

fn cmd_theme(args: ThemeArgs) -> anyhow::Result<()> {
    let node: worldview::WorldviewNode = read_json(&args.node, "node")?;
    let screen = worldview::extract_screen(&node);
    let json = serde_json::to_string_pretty(&screen).context("encode screen")?;
    println!("{json}");
    Ok(())
}

async fn cmd_roundtrip(args: RoundtripArgs) -> anyhow::Result<()> {
    let mut loaded = load_canvas(&args.canvas)?;
    let root = match &args.node {
        Some(label) => loaded.id(label)?,
        None => {
            let canvas = &loaded.canvas;
            canvas
                .selection()
                .first()
                .or_else(|| canvas.children(canvas.page()).first())
                .copied()
                .context("canvas has no nodes")?
        }
    };

    let trip = worldview::roundtrip(&mut loaded.canvas, root).await?;
    if trip.matches() {
        println!("match");
        return Ok(());
    }
    let path = trip.first_difference().unwrap_or_default();
    println!("differs at {path}");
    anyhow::bail!("round trip of {root} is not identical")
}
