//! Fixed deployment constants. These are the values the supervisor runs with
//! when started without arguments.

use std::time::Duration;

/// Interpreter used to run the scanner script.
pub const DEFAULT_INTERPRETER: &str = "/usr/bin/python";

/// Scanner script. It receives the scan pipe's write descriptor number as
/// its only argument.
pub const DEFAULT_SCANNER_SCRIPT: &str = "/usr/lib/tagdeck/scanner/scan.py";

/// Directory holding one sub-directory per bound tag.
pub const DEFAULT_APP_ROOT: &str = "/usr/lib/tagdeck/app";

/// Shell used to run app scripts.
pub const APP_SHELL: &str = "/bin/sh";

/// Default length of each transition animation.
pub const DEFAULT_SUCCESS_ANIMATION: Duration = Duration::from_secs(1);
#[allow(missing_docs)]
pub const DEFAULT_FAILURE_ANIMATION: Duration = Duration::from_secs(1);
#[allow(missing_docs)]
pub const DEFAULT_FADEOUT_ANIMATION: Duration = Duration::from_secs(1);

/// Render loop pacing (60 frames per second).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
