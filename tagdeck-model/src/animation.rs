use std::fmt;

/// A transition animation the supervisor asks the render thread to play.
///
/// Each request blocks the supervisor until the render thread has drawn one
/// full cycle of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationRequest {
    /// The scanned tag resolved to an app.
    Success,
    /// The scanned tag has no app.
    Failure,
    /// Fade the whole interface to black before handing over the display.
    Fadeout,
}

impl AnimationRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationRequest::Success => "success",
            AnimationRequest::Failure => "failure",
            AnimationRequest::Fadeout => "fadeout",
        }
    }
}

impl fmt::Display for AnimationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
