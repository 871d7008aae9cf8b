use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "plotscene", version)]
struct Cli {
    /// Log paint and frame diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene document to PNG, or to SVG when the output ends in `.svg`.
    Render(RenderArgs),
    /// Print the topmost element under a point.
    Hit(HitArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG or SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Backend used for PNG output.
    #[arg(long, value_enum, default_value_t = BackendChoice::Raster)]
    backend: BackendChoice,

    /// Device pixels per CSS pixel.
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f64,

    /// Font file used to shape text on the raster backend.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct HitArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Surface-local x.
    #[arg(long)]
    x: f64,

    /// Surface-local y.
    #[arg(long)]
    y: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Raster,
    Vector,
}

impl From<BackendChoice> for plotscene::BackendKind {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Raster => Self::Raster,
            BackendChoice::Vector => Self::Vector,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Hit(args) => cmd_hit(args),
    }
}

fn read_scene(path: &Path) -> anyhow::Result<plotscene::SceneDoc> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene '{}'", path.display()))?;
    let doc = plotscene::SceneDoc::from_json_str(&text)
        .with_context(|| format!("parse scene '{}'", path.display()))?;
    Ok(doc)
}

fn scene_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_scene(&args.in_path)?;
    let base_dir = scene_dir(&args.in_path);

    let is_svg = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    let bytes = if is_svg {
        let mut storage = plotscene::Storage::new();
        doc.build_into(&mut storage, Some(base_dir))?;
        let vector = plotscene::VectorBackend::new(doc.width, doc.height, args.pixel_ratio)?
            .with_resources_dir(base_dir);
        vector.export_svg(&storage, doc.background)?.into_bytes()
    } else {
        let config = plotscene::EngineConfig {
            renderer: args.backend.into(),
            width: doc.width,
            height: doc.height,
            dpr: args.pixel_ratio,
            background: doc.background,
            font: args.font,
            ..plotscene::EngineConfig::default()
        };
        let mut engine = plotscene::Engine::new(&config)?;
        engine.load_doc(&doc, Some(base_dir))?;
        engine.export_image(&plotscene::ExportOptions::default())?
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_hit(args: HitArgs) -> anyhow::Result<()> {
    let doc = read_scene(&args.in_path)?;
    let mut storage = plotscene::Storage::new();
    doc.build_into(&mut storage, Some(scene_dir(&args.in_path)))?;

    let p = plotscene::Point::new(args.x, args.y);
    match plotscene::hit_test(&storage, p, None) {
        Some(id) => {
            let name = storage.get(id).and_then(|el| el.name()).unwrap_or("");
            println!("{id} {name}");
        }
        None => println!("none"),
    }
    Ok(())
}
