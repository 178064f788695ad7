use std::time::{Duration, Instant};

use tagdeck_model::AnimationRequest;

/// Progress of one animation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Fraction of the cycle elapsed, clamped to `0.0..=1.0`.
    pub progress: f32,
    /// True on the frame drawn at the full length; that frame is the last.
    pub finished: bool,
}

/// Tracks elapsed time for the animation in flight.
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    request: AnimationRequest,
    started: Instant,
    length: Duration,
}

impl AnimationClock {
    pub fn start(request: AnimationRequest, length: Duration) -> Self {
        Self::started_at(request, length, Instant::now())
    }

    pub fn started_at(
        request: AnimationRequest,
        length: Duration,
        started: Instant,
    ) -> Self {
        Self {
            request,
            started,
            length,
        }
    }

    pub fn request(&self) -> AnimationRequest {
        self.request
    }

    pub fn sample(&self, now: Instant) -> Sample {
        let elapsed = now.saturating_duration_since(self.started).min(self.length);
        let progress = if self.length.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.length.as_secs_f32()
        };
        Sample {
            progress: progress.clamp(0.0, 1.0),
            finished: elapsed == self.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_at_the_end() {
        let start = Instant::now();
        let clock = AnimationClock::started_at(
            AnimationRequest::Success,
            Duration::from_millis(100),
            start,
        );

        let first = clock.sample(start);
        assert_eq!(first.progress, 0.0);
        assert!(!first.finished);

        let half = clock.sample(start + Duration::from_millis(50));
        assert!((half.progress - 0.5).abs() < 1e-3);
        assert!(!half.finished);

        let late = clock.sample(start + Duration::from_secs(3));
        assert_eq!(late.progress, 1.0);
        assert!(late.finished);
    }

    #[test]
    fn exact_length_is_the_last_frame() {
        let start = Instant::now();
        let clock = AnimationClock::started_at(
            AnimationRequest::Fadeout,
            Duration::from_millis(40),
            start,
        );
        assert!(clock.sample(start + Duration::from_millis(40)).finished);
    }
}
