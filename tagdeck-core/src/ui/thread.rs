use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tagdeck_config::AnimationTimings;
use tagdeck_model::AnimationRequest;
use tracing::{debug, info};

use super::render::{self, RenderCommand, Renderer};
use super::{Stage, UiError};
use crate::signals;

/// Supervisor-side handle to the render thread.
///
/// Requests and completions travel over two channels; at most one request is
/// ever in flight because [`Stage::play`] does not return until its
/// completion arrives.
#[derive(Debug)]
pub struct RenderThread {
    commands: Sender<RenderCommand>,
    completions: Receiver<AnimationRequest>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawns the render thread and waits until its renderer is initialised.
    ///
    /// Every blockable signal is masked on the calling thread while the new
    /// thread is created, so the render thread starts with a fully blocked
    /// mask and never handles process-directed signals. The caller's mask is
    /// restored before returning.
    pub fn start<R>(
        renderer: R,
        timings: AnimationTimings,
    ) -> Result<Self, UiError>
    where
        R: Renderer + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (completion_tx, completion_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let previous =
            signals::block_all_on_thread().map_err(UiError::SignalMask)?;
        let spawned = thread::Builder::new()
            .name("tagdeck-render".into())
            .spawn(move || {
                render::run(renderer, timings, command_rx, completion_tx, ready_tx)
            });
        signals::restore_thread_mask(&previous)
            .map_err(UiError::SignalMask)?;
        let handle = spawned.map_err(UiError::Spawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("render thread running");
                Ok(Self {
                    commands: command_tx,
                    completions: completion_rx,
                    handle: Some(handle),
                })
            }
            Ok(Err(reason)) => {
                let _ = handle.join();
                Err(UiError::Init(reason))
            }
            Err(_) => match handle.join() {
                Ok(()) => Err(UiError::Disconnected),
                Err(_) => Err(UiError::Panicked),
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Stage for RenderThread {
    fn play(&mut self, request: AnimationRequest) -> Result<(), UiError> {
        if self.handle.is_none() {
            debug!(%request, "render thread stopped, skipping animation");
            return Ok(());
        }

        self.commands
            .send(RenderCommand::Play(request))
            .map_err(|_| UiError::Disconnected)?;
        let completed =
            self.completions.recv().map_err(|_| UiError::Disconnected)?;

        if completed != request {
            return Err(UiError::UnexpectedCompletion {
                expected: request,
                actual: completed,
            });
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), UiError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // A closed channel means the thread is already on its way out; the
        // join below still waits for its teardown.
        let _ = self.commands.send(RenderCommand::Stop);
        handle.join().map_err(|_| UiError::Panicked)?;
        info!("render thread stopped");
        Ok(())
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
