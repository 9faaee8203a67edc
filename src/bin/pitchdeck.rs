use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pitchdeck::{
    DeckDocument, DeckEditor, EditorOpts, ElementKind, ExportOpts, FileBackend, RegeneratedImage,
    SlideId,
};

#[derive(Parser, Debug)]
#[command(name = "pitchdeck", version)]
struct Cli {
    /// Editor configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every slide as a full-resolution PNG.
    Export(ExportArgs),
    /// Render every slide as a thumbnail PNG.
    Thumbs(ThumbsArgs),
    /// Print a summary of every slide.
    Inspect(InspectArgs),
    /// Point the image elements of one slide at a new source.
    PatchImage(PatchImageArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input deck JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels (defaults to the canvas width).
    #[arg(long)]
    width: Option<u32>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ThumbsArgs {
    /// Input deck JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Thumbnail width in pixels (defaults to the configured width).
    #[arg(long)]
    width: Option<u32>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input deck JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PatchImageArgs {
    /// Input deck JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Id of the slide to patch.
    #[arg(long)]
    slide: u64,

    /// New image source.
    #[arg(long)]
    url: String,

    /// Output deck JSON (defaults to rewriting the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    let config = cli.config;
    match cli.cmd {
        Command::Export(args) => rt.block_on(cmd_export(config.as_deref(), args)),
        Command::Thumbs(args) => rt.block_on(cmd_thumbs(config.as_deref(), args)),
        Command::Inspect(args) => cmd_inspect(args),
        Command::PatchImage(args) => rt.block_on(cmd_patch_image(config.as_deref(), args)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PITCHDECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Options from `--config` (or defaults) plus env overrides. Without a config file, relative
/// image paths resolve next to the deck.
fn load_opts(config: Option<&Path>, deck: &Path) -> anyhow::Result<EditorOpts> {
    let opts = match config {
        Some(path) => EditorOpts::from_path(path)?,
        None => EditorOpts {
            asset_root: deck
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
            ..EditorOpts::default()
        },
    };
    let opts = opts.with_env_overrides();
    opts.validate()?;
    Ok(opts)
}

fn open_editor(opts: EditorOpts, deck: &Path, save_to: &Path) -> anyhow::Result<DeckEditor> {
    let doc = DeckDocument::from_path(deck)?;
    let mut editor = DeckEditor::new(opts, Arc::new(FileBackend::new(save_to)))?;
    editor.open(doc)?;
    Ok(editor)
}

fn create_out_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

async fn cmd_export(config: Option<&Path>, args: ExportArgs) -> anyhow::Result<()> {
    let opts = load_opts(config, &args.in_path)?;
    let editor = open_editor(opts, &args.in_path, &args.in_path)?;
    create_out_dir(&args.out)?;

    let slides = editor
        .export_deck(ExportOpts {
            width: args.width,
            threads: args.threads,
        })
        .await?;
    for (i, slide) in slides.iter().enumerate() {
        let path = args.out.join(format!("slide-{}.png", i + 1));
        slide.bitmap.write_png(&path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

async fn cmd_thumbs(config: Option<&Path>, args: ThumbsArgs) -> anyhow::Result<()> {
    let mut opts = load_opts(config, &args.in_path)?;
    if let Some(w) = args.width {
        opts.thumbnail_width = w;
    }
    let editor = open_editor(opts, &args.in_path, &args.in_path)?;
    create_out_dir(&args.out)?;

    let ids: Vec<SlideId> = editor.store().ids();
    editor.all_thumbnails();
    for (i, id) in ids.into_iter().enumerate() {
        let entry = editor
            .thumbnails()
            .wait_for(id)
            .await
            .with_context(|| format!("thumbnail for slide {id} failed to render"))?;
        let path = args.out.join(format!("thumb-{}.png", i + 1));
        entry.bitmap.write_png(&path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let doc = DeckDocument::from_path(&args.in_path)?;
    for (i, rec) in doc.slides.iter().enumerate() {
        let snap = &rec.snapshot;
        let count = |kind: ElementKind| snap.objects_of_kind(kind).count();
        let title = snap
            .objects_of_kind(ElementKind::Text)
            .find_map(|(_, o)| o.text())
            .unwrap_or("-");
        println!(
            "{:>3}  id={:<4} kind={:<7} text={} image={} shape={}  {}  \"{}\"",
            i + 1,
            rec.id.0,
            serde_json::to_value(rec.kind)?.as_str().unwrap_or("?"),
            count(ElementKind::Text),
            count(ElementKind::Image),
            count(ElementKind::Shape),
            snap.fingerprint(),
            title,
        );
    }
    Ok(())
}

async fn cmd_patch_image(config: Option<&Path>, args: PatchImageArgs) -> anyhow::Result<()> {
    let opts = load_opts(config, &args.in_path)?;
    let out = args.out.clone().unwrap_or_else(|| args.in_path.clone());
    let mut editor = open_editor(opts, &args.in_path, &out)?;

    let patched = editor.apply_regeneration(RegeneratedImage {
        slide: SlideId(args.slide),
        url: args.url,
    })?;
    editor.save().await?;
    eprintln!(
        "patched slide {} ({}), wrote {}",
        args.slide,
        patched.fingerprint(),
        out.display()
    );
    Ok(())
}
