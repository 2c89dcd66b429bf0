use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framescrub::sim::{LerpSmoother, RegionTrigger};
use framescrub::{
    Collaborators, FrameStore, FsFrameLoader, ProgressIndicator, ProgressMapper, RegionGeometry,
    Renderer, ScrubConfig, ScrubEngine, Viewport,
};

/// Nominal display refresh interval for simulated ticks.
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Upper bound on ticks spent letting smoothing settle after a sweep.
const MAX_SETTLE_TICKS: u32 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "framescrub", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown at one scroll progress as PNGs.
    Frame(FrameArgs),
    /// Scroll through the whole region with simulated smoothing and report redraws.
    Sweep(SweepArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Config JSON. Relative frame paths resolve against its directory.
    #[arg(long)]
    config: PathBuf,

    /// Normalized scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1080")]
    viewport: Viewport,

    /// Output PNG for the contain-fit foreground surface.
    #[arg(long)]
    out_fg: PathBuf,

    /// Output PNG for the cover-fit ambient surface.
    #[arg(long)]
    out_ambient: Option<PathBuf>,

    /// Seconds to wait for all frames to settle.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Config JSON. Relative frame paths resolve against its directory.
    #[arg(long)]
    config: PathBuf,

    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1080")]
    viewport: Viewport,

    /// Number of scroll input steps from top to bottom.
    #[arg(long, default_value_t = 120)]
    steps: u32,

    /// Height of the trigger region in viewport heights.
    #[arg(long, default_value_t = 5.0)]
    region_screens: f64,

    /// Write every redrawn foreground/ambient pair into this directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Seconds to wait for all frames to settle.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = ScrubConfig::from_json_path(&args.config)?;

    let mut store = FrameStore::new(cfg.frames.clone());
    store.begin_load(Arc::new(FsFrameLoader));
    store.pump_until_ready(Duration::from_secs(args.timeout_secs))?;

    let index = ProgressMapper::new(store.len()).index_for(args.progress);
    let mut renderer = Renderer::new(args.viewport, cfg.ambient_scale)
        .with_ambient_blur(cfg.ambient_blur_radius, cfg.ambient_blur_sigma);
    if !renderer.draw_frame(&store, index)? {
        let source = store.frame(index).map(|f| f.source()).unwrap_or("?");
        anyhow::bail!("frame {index} ('{source}') did not decode");
    }

    renderer.foreground().save_png(&args.out_fg)?;
    eprintln!("wrote {}", args.out_fg.display());
    if let Some(out) = &args.out_ambient {
        renderer.ambient().save_png(out)?;
        eprintln!("wrote {}", out.display());
    }
    println!("frame={index}");
    Ok(())
}

/// Prints load progress to stderr whenever the label changes.
#[derive(Default)]
struct StderrIndicator {
    last_label: String,
}

impl ProgressIndicator for StderrIndicator {
    fn set_percentage(&mut self, _percent: u8) {}

    fn set_label_text(&mut self, text: &str) {
        if self.last_label != text {
            eprintln!("{text}");
            self.last_label = text.to_string();
        }
    }

    fn hide(&mut self) {}
}

fn dump_surfaces(engine: &ScrubEngine, dir: &Path) -> anyhow::Result<()> {
    let index = engine.current_frame();
    let r = engine.renderer();
    r.foreground()
        .save_png(&dir.join(format!("fg-{index:04}.png")))
        .with_context(|| format!("dump foreground of frame {index}"))?;
    r.ambient()
        .save_png(&dir.join(format!("ambient-{index:04}.png")))
        .with_context(|| format!("dump ambient of frame {index}"))?;
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    if !args.region_screens.is_finite() || args.region_screens < 1.0 {
        anyhow::bail!("--region-screens must be >= 1");
    }
    if args.steps == 0 {
        anyhow::bail!("--steps must be >= 1");
    }
    let cfg = ScrubConfig::from_json_path(&args.config)?;

    let vh = f64::from(args.viewport.height);
    let region = RegionGeometry {
        top: 0.0,
        height: vh * args.region_screens,
    };
    let smoother = LerpSmoother::new(cfg.smoothing);
    let trigger = RegionTrigger::new(region, vh);

    let mut engine = ScrubEngine::new(
        &cfg,
        args.viewport,
        Collaborators {
            smoother: Box::new(smoother.clone()),
            trigger: Box::new(trigger),
            indicator: Some(Box::new(StderrIndicator::default())),
            overlays: None,
        },
    )?;
    engine.begin_load(Arc::new(FsFrameLoader));
    engine.wait_until_ready(Duration::from_secs(args.timeout_secs))?;

    let mut draws = engine.renderer().draw_count();
    if let Some(dir) = &args.out_dir {
        dump_surfaces(&engine, dir)?;
    }

    let max_scroll = region.height - vh;
    let last_index = engine.store().len() - 1;
    let mut now = 0.0;
    let mut ticks = 0u64;
    let mut settle_ticks = 0u32;
    let mut step = 0u32;
    loop {
        if step < args.steps {
            step += 1;
            smoother.scroll_to(max_scroll * f64::from(step) / f64::from(args.steps));
        } else if smoother.is_settled() && engine.current_frame() == last_index {
            break;
        } else if settle_ticks >= MAX_SETTLE_TICKS {
            tracing::warn!("sweep did not settle; stopping");
            break;
        } else {
            settle_ticks += 1;
        }

        now += FRAME_MS;
        engine.tick(now)?;
        ticks += 1;

        let count = engine.renderer().draw_count();
        if count != draws {
            draws = count;
            if let Some(dir) = &args.out_dir {
                dump_surfaces(&engine, dir)?;
            }
        }
    }
    engine.teardown();

    println!("ticks={ticks} redraws={draws} last_frame={}", engine.current_frame());
    Ok(())
}
