use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Instant;

use tagdeck_config::AnimationTimings;
use tagdeck_model::AnimationRequest;
use tracing::{debug, trace, warn};

use super::clock::AnimationClock;

/// Error a renderer may report from [`Renderer::init`].
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// What the render thread asks the renderer to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// The idle screen inviting the user to scan a tag.
    Idle,
    /// A transition animation, `progress` in `0.0..=1.0`.
    #[allow(missing_docs)]
    Animating {
        request: AnimationRequest,
        progress: f32,
    },
}

/// Drawing backend owned by the render thread. Created on the supervisor
/// thread, but every method runs on the render thread.
pub trait Renderer {
    /// Acquire the display and load resources.
    fn init(&mut self) -> Result<(), RenderError>;

    /// Draw one frame. Called once per frame interval.
    fn draw(&mut self, frame: &Frame);

    /// Release everything acquired in `init`. Runs before the thread exits.
    fn teardown(&mut self);
}

/// Renderer with no display: traces each frame. Used when the kiosk runs
/// without a screen and by tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
}

impl Renderer for HeadlessRenderer {
    fn init(&mut self) -> Result<(), RenderError> {
        debug!("headless renderer ready");
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) {
        self.frames += 1;
        trace!(frame = self.frames, ?frame, "draw");
    }

    fn teardown(&mut self) {
        debug!(frames = self.frames, "headless renderer torn down");
    }
}

pub(super) enum RenderCommand {
    Play(AnimationRequest),
    Stop,
}

/// Body of the render thread.
///
/// Reports readiness (or the init failure) on `ready`, then draws until told
/// to stop or until the supervisor hangs up. Each finished animation is
/// reported exactly once on `completions`.
pub(super) fn run<R: Renderer>(
    mut renderer: R,
    timings: AnimationTimings,
    commands: Receiver<RenderCommand>,
    completions: Sender<AnimationRequest>,
    ready: Sender<Result<(), String>>,
) {
    if let Err(err) = renderer.init() {
        let _ = ready.send(Err(err.to_string()));
        return;
    }
    if ready.send(Ok(())).is_err() {
        renderer.teardown();
        return;
    }

    let mut active: Option<AnimationClock> = None;
    loop {
        let command = if active.is_some() {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv_timeout(timings.frame_interval) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        };

        match command {
            Some(RenderCommand::Stop) => break,
            Some(RenderCommand::Play(request)) => {
                if let Some(current) = &active {
                    warn!(
                        %request,
                        current = %current.request(),
                        "animation requested while another is playing"
                    );
                }
                debug!(%request, "animation started");
                active = Some(AnimationClock::start(
                    request,
                    length_of(&timings, request),
                ));
            }
            None => {}
        }

        let Some(clock) = active else {
            renderer.draw(&Frame::Idle);
            continue;
        };

        let sample = clock.sample(Instant::now());
        renderer.draw(&Frame::Animating {
            request: clock.request(),
            progress: sample.progress,
        });

        if sample.finished {
            debug!(request = %clock.request(), "animation finished");
            active = None;
            if completions.send(clock.request()).is_err() {
                break;
            }
        } else {
            std::thread::sleep(timings.frame_interval);
        }
    }

    renderer.teardown();
}

fn length_of(
    timings: &AnimationTimings,
    request: AnimationRequest,
) -> std::time::Duration {
    match request {
        AnimationRequest::Success => timings.success,
        AnimationRequest::Failure => timings.failure,
        AnimationRequest::Fadeout => timings.fadeout,
    }
}
