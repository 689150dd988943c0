use anyhow::{Context, Result};
use estimate::{Decoding, EstimateOptions};
use frame_loop::{CancellationToken, FrameLoop, Timing};
use indicatif::{ProgressBar, ProgressStyle};
use mode::{DisplayMode, ModeController};
use num_traits::cast::ToPrimitive;
use render::{OverlayRenderer, RenderSummary, Style};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod camera;
mod commands;
mod error;
mod estimate;
mod frame_loop;
mod geometry;
mod mode;
mod pose;
mod render;
mod surface;

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON-lines recording of PoseNet output to play back as the pose estimator.
    #[structopt(short, long)]
    poses: PathBuf,

    /// A v4l2 compatible device: /dev/videoDEVICE
    #[cfg(feature = "gui")]
    #[structopt(short, long, default_value = "0")]
    device: i32,

    /// Canvas width, also requested from the camera.
    #[structopt(short, long, default_value = "640")]
    width: u32,

    /// Canvas height, also requested from the camera.
    #[structopt(short = "H", long, default_value = "480")]
    height: u32,

    /// Pose keypoint score threshold. Keypoints must score above it to be drawn.
    #[structopt(short, long, default_value = "0.5")]
    threshold: f32,

    /// Maximum number of people detected per frame.
    #[structopt(short = "M", long, default_value = "5")]
    max_detections: usize,

    /// Only keep the strongest detection.
    #[structopt(long)]
    single_person: bool,

    /// Mirror pose estimates horizontally.
    #[structopt(long)]
    flip_horizontal: bool,

    /// Initial display mode: center-line or back-angle.
    #[structopt(short, long, default_value = "center-line")]
    mode: DisplayMode,

    #[cfg(feature = "gui")]
    #[structopt(short = "W", long, default_value = "1")]
    wait_key_ms: i32,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    /// Stop after rendering this many frames.
    #[structopt(short, long)]
    frames: Option<usize>,
}

fn report(pb: Option<&ProgressBar>, timing: &Timing, summary: &RenderSummary) {
    let pb = match pb {
        Some(pb) => pb,
        None => return,
    };
    let nframes = timing.frames.to_f64().unwrap_or(f64::NAN);
    pb.set_message(format!(
        "FPS => model: {:.1}, cam: {:.1} | poses: {}, bones: {}, back angles: {}",
        nframes / timing.inference.as_secs_f64(),
        nframes / timing.capture.as_secs_f64(),
        summary.poses,
        summary.bones,
        summary.back_angles,
    ));
    pb.inc(1);
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let options = EstimateOptions {
        flip_horizontal: opt.flip_horizontal,
        decoding: if opt.single_person {
            Decoding::SinglePerson
        } else {
            Decoding::MultiPerson
        },
        max_detections: opt.max_detections,
    };
    options.validate().context("invalid estimate options")?;

    let renderer = OverlayRenderer::new(Style {
        threshold: opt.threshold,
        ..Style::default()
    });
    let mode = ModeController::new(opt.mode);

    let cancel = CancellationToken::new();
    let cancel_ctrl_c = cancel.clone();
    ctrlc::set_handler(move || cancel_ctrl_c.cancel()).context("failed setting Ctrl-C handler")?;

    let estimator = estimate::Replay::open(&opt.poses).context("failed opening pose recording")?;

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let frame_limit = opt.frames;
    let cancel_limit = cancel.clone();
    let on_frame = |timing: &Timing, summary: &RenderSummary| {
        report(pb.as_ref(), timing, summary);
        if frame_limit.map_or(false, |limit| timing.frames >= limit) {
            cancel_limit.cancel();
        }
    };

    info!(
        message = "starting frame loop",
        mode = %opt.mode,
        width = opt.width,
        height = opt.height,
        max_detections = options.max_detections,
    );

    #[cfg(feature = "gui")]
    let timing = {
        let source = camera::Camera::open(opt.device, opt.width, opt.height)
            .context("failed opening camera")?;
        let surface = surface::Window::new("poses", opt.width, opt.height)
            .context("failed creating window")?;
        let mut commands = commands::Keyboard::new(opt.wait_key_ms);
        FrameLoop::new(source, estimator, surface, renderer, mode, options, cancel)
            .run(&mut commands, on_frame)
            .context("frame loop failed")?
    };

    #[cfg(not(feature = "gui"))]
    let timing = {
        let source = camera::Blank::new(opt.width, opt.height);
        let surface = surface::Tally::new(opt.width, opt.height);
        let mut frame_loop =
            FrameLoop::new(source, estimator, surface, renderer, mode, options, cancel);
        let timing = frame_loop
            .run(&mut commands::Idle, on_frame)
            .context("frame loop failed")?;
        let counts = frame_loop.surface().counts();
        info!(
            message = "headless draw counts",
            lines = counts.lines,
            circles = counts.circles,
            texts = counts.texts,
            presented = counts.presented,
        );
        timing
    };

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(
        message = "stopped",
        frames = timing.frames,
        skipped = timing.skipped,
        failed_inference = timing.failed_inference,
        inference_secs = timing.inference.as_secs_f64(),
    );

    Ok(())
}
