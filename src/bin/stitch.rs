use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stitch", version, about = "Place photos side by side")]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stitch two photos into one JPEG.
    Pair(PairArgs),
    /// Stitch every consecutive pair of photos in a directory.
    All(AllArgs),
}

#[derive(Parser, Debug)]
struct PairArgs {
    /// Left photo.
    a: PathBuf,
    /// Right photo.
    b: PathBuf,
    /// Output JPEG path.
    dst: PathBuf,

    #[command(flatten)]
    opts: OptsArgs,
}

#[derive(Parser, Debug)]
struct AllArgs {
    /// Directory holding the photos (`*.jpg`, `*.jpeg`).
    #[arg(long, default_value = "photos")]
    photos: PathBuf,

    /// Output directory; created if missing.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[command(flatten)]
    opts: OptsArgs,
}

#[derive(Args, Debug)]
struct OptsArgs {
    /// Stitch options JSON; the flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JPEG quality, 0.0..=1.0.
    #[arg(long)]
    quality: Option<f32>,

    /// Gap between the panes, in pixels.
    #[arg(long)]
    gap: Option<u32>,

    /// Corner radius of the pane frame.
    #[arg(long)]
    radius: Option<f64>,

    /// Width of the pane frame (0 disables it).
    #[arg(long)]
    frame_width: Option<f64>,

    /// Fixed pane aspect ratio (width / height).
    #[arg(long)]
    aspect: Option<f64>,

    /// Cap on the output height.
    #[arg(long)]
    max_height: Option<u32>,
}

impl OptsArgs {
    fn resolve(&self) -> anyhow::Result<grhandle::StitchOpts> {
        let mut opts = match &self.config {
            Some(path) => grhandle::StitchOpts::from_json_file(path)?,
            None => grhandle::StitchOpts::default(),
        };
        if let Some(q) = self.quality {
            opts.jpeg_quality = q;
        }
        if let Some(gap) = self.gap {
            opts.gap = gap;
        }
        if let Some(r) = self.radius {
            opts.frame_radius = r;
        }
        if let Some(w) = self.frame_width {
            opts.frame_width = w;
        }
        if self.aspect.is_some() {
            opts.pane_aspect = self.aspect;
        }
        if self.max_height.is_some() {
            opts.max_height = self.max_height;
        }
        opts.validate().context("invalid stitch options")?;
        Ok(opts)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Pair(args) => cmd_pair(args),
        Command::All(args) => cmd_all(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_pair(args: PairArgs) -> anyhow::Result<()> {
    let opts = args.opts.resolve()?;
    if let Some(parent) = args.dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    grhandle::stitch_pair(&args.a, &args.b, &args.dst, &opts)?;
    eprintln!("wrote {}", args.dst.display());
    Ok(())
}

fn cmd_all(args: AllArgs) -> anyhow::Result<()> {
    let opts = args.opts.resolve()?;
    let written = grhandle::stitch_all(&args.photos, &args.out, &opts)?;
    for path in &written {
        eprintln!("wrote {}", path.display());
    }
    if written.is_empty() {
        eprintln!("fewer than two photos in {}", args.photos.display());
    }
    Ok(())
}
