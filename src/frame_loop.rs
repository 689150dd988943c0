use crate::{
    camera::FrameSource,
    commands::{Command, Commands},
    error::Error,
    estimate::{EstimateOptions, PoseEstimator},
    mode::ModeController,
    render::{OverlayRenderer, RenderSummary},
    surface::DrawingSurface,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, trace, warn};

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    /// Time spent waiting for frames.
    pub(crate) capture: Duration,
    /// Time spent waiting for pose estimates.
    pub(crate) inference: Duration,
    /// Frames rendered and presented.
    pub(crate) frames: usize,
    /// Frames the source failed to deliver.
    pub(crate) skipped: usize,
    /// Frames rendered without poses because estimation failed.
    pub(crate) failed_inference: usize,
}

pub(crate) struct FrameLoop<S, E, D> {
    source: S,
    estimator: E,
    surface: D,
    renderer: OverlayRenderer,
    mode: ModeController,
    options: EstimateOptions,
    cancel: CancellationToken,
    timing: Timing,
    /// Set while the source keeps failing, so an outage warns once.
    grab_failing: bool,
}

impl<S, E, D> FrameLoop<S, E, D>
where
    S: FrameSource,
    E: PoseEstimator<S::Frame>,
    D: DrawingSurface<Image = S::Frame>,
{
    pub(crate) fn new(
        source: S,
        estimator: E,
        surface: D,
        renderer: OverlayRenderer,
        mode: ModeController,
        options: EstimateOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            estimator,
            surface,
            renderer,
            mode,
            options,
            cancel,
            timing: Timing::default(),
            grab_failing: false,
        }
    }

    pub(crate) fn surface(&self) -> &D {
        &self.surface
    }

    /// Run one iteration: grab, estimate, render, present, then poll for a
    /// command. Returns `None` when the source produced no frame.
    ///
    /// A failed grab or estimate is logged and absorbed. Drawing failures are
    /// returned.
    #[instrument(level = "trace", skip(self, commands), fields(frame = self.timing.frames))]
    pub(crate) fn step<C>(&mut self, commands: &mut C) -> Result<Option<RenderSummary>, Error>
    where
        C: Commands,
    {
        let Self {
            source,
            estimator,
            surface,
            renderer,
            mode,
            options,
            timing,
            grab_failing,
            ..
        } = self;

        let capture_start = Instant::now();
        let summary = match source.grab() {
            Ok(frame) => {
                timing.capture += capture_start.elapsed();
                if std::mem::replace(grab_failing, false) {
                    info!(message = "frames resumed", skipped = timing.skipped);
                }

                let inference_start = Instant::now();
                let poses = estimator
                    .estimate_poses(frame, options)
                    .unwrap_or_else(|error| {
                        warn!(message = "pose estimation failed, drawing frame only", %error);
                        timing.failed_inference += 1;
                        Vec::new()
                    });
                timing.inference += inference_start.elapsed();

                let summary = renderer.render(surface, frame, &poses, mode.mode())?;
                surface.present()?;
                timing.frames += 1;
                debug!(mode = %mode.mode(), ?summary);
                Some(summary)
            }
            Err(error) => {
                if std::mem::replace(grab_failing, true) {
                    trace!(message = "still no frame from source", %error);
                } else {
                    warn!(message = "no frame from source, skipping until it recovers", %error);
                }
                timing.skipped += 1;
                None
            }
        };

        if let Some(command) = commands.poll()? {
            self.handle(command);
        }

        Ok(summary)
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::ToggleMode => {
                let mode = self.mode.toggle();
                info!(message = "display mode toggled", %mode);
            }
            Command::Quit => {
                info!("quit requested");
                self.cancel.cancel();
            }
        }
    }

    /// Step until cancelled, calling `on_frame` after every rendered frame.
    pub(crate) fn run<C, F>(&mut self, commands: &mut C, mut on_frame: F) -> Result<Timing, Error>
    where
        C: Commands,
        F: FnMut(&Timing, &RenderSummary),
    {
        while !self.cancel.is_cancelled() {
            if let Some(summary) = self.step(commands)? {
                on_frame(&self.timing, &summary);
            }
        }
        Ok(self.timing)
    }
}
