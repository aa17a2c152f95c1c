use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyframe::capture::CaptureRequest;
use storyframe::export::UploadPackage;
use storyframe::{
    BackgroundRemover, CaptureOptions, CaptureResolver, ExportConfig, ExportSession, FontBook,
    FrameCompositor, HttpBackgroundRemover, HttpImageLoader, HttpJobTrigger, HttpUploader,
    JobTrigger, PassthroughBackgroundRemover, Storyboard,
};

#[derive(Parser, Debug)]
#[command(name = "storyframe", version)]
struct Cli {
    /// Optional JSON config; `STORYFRAME_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a single frame to a PNG.
    Frame(FrameArgs),
    /// Render every frame of a storyboard, then package and optionally upload.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Storyboard manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Scene number.
    #[arg(long)]
    scene: u32,

    /// Image index within the scene (0-based).
    #[arg(long)]
    image: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Bake captions into the output.
    #[arg(long)]
    with_text: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Storyboard manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Write the package parts and `frame_metadata.json` here.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// POST the package to the configured upload endpoint.
    #[arg(long)]
    upload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = ExportConfig::load(cli.config.as_deref()).context("load config")?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args).await,
        Command::Export(args) => cmd_export(&cfg, args).await,
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<Storyboard> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read manifest '{}'", path.display()))?;
    let sb = Storyboard::from_json_slice(&bytes)
        .with_context(|| format!("parse manifest '{}'", path.display()))?;
    sb.validate()?;
    Ok(sb)
}

fn http_client(cfg: &ExportConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.request_timeout())
        .build()
        .context("build http client")
}

fn load_fonts(cfg: &ExportConfig) -> anyhow::Result<FontBook> {
    let mut fonts = FontBook::new();
    if let Some(dir) = &cfg.font_dir {
        let n = fonts
            .load_dir(dir)
            .with_context(|| format!("load fonts from '{}'", dir.display()))?;
        tracing::info!(fonts = n, dir = %dir.display(), "fonts loaded");
    }
    if let Some(file) = &cfg.default_font {
        fonts
            .set_default_font_file(file)
            .with_context(|| format!("load default font '{}'", file.display()))?;
    }
    if fonts.is_empty() {
        tracing::warn!("no fonts configured; captions will be skipped");
    }
    Ok(fonts)
}

fn build_compositor(
    cfg: &ExportConfig,
    client: &reqwest::Client,
    manifest: &Path,
    run_token: Option<String>,
) -> anyhow::Result<Arc<FrameCompositor>> {
    let assets_root = cfg
        .assets_root
        .clone()
        .or_else(|| manifest.parent().map(Path::to_path_buf));
    let loader = HttpImageLoader::with_client(client.clone(), assets_root);
    let remover: Arc<dyn BackgroundRemover> = match &cfg.background_removal_url {
        Some(url) => Arc::new(HttpBackgroundRemover::new(client.clone(), url.clone())),
        None => Arc::new(PassthroughBackgroundRemover),
    };

    let mut compositor = FrameCompositor::new(Arc::new(loader), Arc::new(load_fonts(cfg)?))
        .with_background_remover(remover)
        .with_default_canvas(cfg.default_canvas_size()?);
    if let Some(token) = run_token {
        compositor = compositor.with_cache_bust(token);
    }
    Ok(Arc::new(compositor))
}

fn run_token(cfg: &ExportConfig, session_id: &str) -> Option<String> {
    cfg.cache_bust.then(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("{session_id}-{secs}")
    })
}

async fn cmd_frame(cfg: &ExportConfig, args: FrameArgs) -> anyhow::Result<()> {
    let sb = read_manifest(&args.manifest)?;
    let scene = sb
        .scene(args.scene)
        .with_context(|| format!("scene {} not in manifest", args.scene))?;
    let frame = scene
        .frames
        .get(args.image)
        .with_context(|| format!("scene {} has no image {}", args.scene, args.image))?;

    let client = http_client(cfg)?;
    let compositor = build_compositor(cfg, &client, &args.manifest, None)?;
    let resolver = CaptureResolver::offline(compositor);
    let request = CaptureRequest {
        scene_number: args.scene,
        image_index: args.image,
        frame,
        options: CaptureOptions {
            include_text: args.with_text,
            include_overlays: true,
            prefer_live: false,
        },
    };
    let outcome = resolver.capture(&request).await?;
    let png = outcome.frame.encode_png()?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    tracing::info!(
        out = %args.out.display(),
        tier = outcome.tier.as_str(),
        width = outcome.frame.width,
        height = outcome.frame.height,
        "frame written"
    );
    Ok(())
}

fn write_package(dir: &Path, package: &UploadPackage) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
    for part in &package.parts {
        let path = dir.join(&part.file_name);
        std::fs::write(&path, &part.binary)
            .with_context(|| format!("write '{}'", path.display()))?;
    }
    let meta = dir.join("frame_metadata.json");
    std::fs::write(&meta, package.metadata_json()?)
        .with_context(|| format!("write '{}'", meta.display()))?;
    Ok(())
}

async fn cmd_export(cfg: &ExportConfig, args: ExportArgs) -> anyhow::Result<()> {
    let sb = read_manifest(&args.manifest)?;
    let client = http_client(cfg)?;
    let compositor = build_compositor(
        cfg,
        &client,
        &args.manifest,
        run_token(cfg, &sb.session_id),
    )?;

    let mut session = ExportSession::new(CaptureResolver::offline(compositor))
        .with_pacing(cfg.pacing());
    let report = session.render_sweep(&sb).await;
    let package = session.build_package(&sb)?;
    tracing::info!(
        binaries = package.parts.len(),
        scenes = package.metadata.len(),
        "package built"
    );

    if let Some(dir) = &args.out_dir {
        write_package(dir, &package)?;
        tracing::info!(dir = %dir.display(), "package written");
    }

    if args.upload {
        let url = cfg
            .upload_url
            .as_deref()
            .context("--upload needs upload_url (or STORYFRAME_UPLOAD_URL)")?;
        let uploader = HttpUploader::new(client.clone(), url);
        let ack = session.upload(&package, &uploader).await?;
        tracing::info!(message = ?ack.message, "upload acknowledged");

        if let Some(trigger_url) = &cfg.trigger_url {
            HttpJobTrigger::new(client, trigger_url.clone())
                .trigger(&sb.user_id, &sb.session_id)
                .await
                .context("trigger follow-on job")?;
        }
    }

    if let Some(w) = report.warning() {
        tracing::warn!("{w}");
    }
    Ok(())
}
