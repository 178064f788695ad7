//! Command-line flags for the supervisor binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::constants::{
    DEFAULT_APP_ROOT, DEFAULT_INTERPRETER, DEFAULT_SCANNER_SCRIPT,
};
use crate::models::{AnimationTimings, SupervisorConfig};

/// Command-line overrides for the fixed constants. Every flag defaults to the
/// deployed value, so running with no arguments is the production setup.
#[derive(Debug, Clone, Args)]
pub struct SupervisorArgs {
    /// Interpreter used to run the scanner script
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    pub interpreter: PathBuf,

    /// Scanner script; receives the scan pipe's write descriptor as argv[1]
    #[arg(long, default_value = DEFAULT_SCANNER_SCRIPT)]
    pub scanner_script: PathBuf,

    /// Directory containing `<HEX>/<HEX>.sh` app bindings
    #[arg(long, default_value = DEFAULT_APP_ROOT)]
    pub app_root: PathBuf,

    /// Length of the tag-recognised animation (e.g. `1s`, `250ms`)
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub success_animation: Duration,

    /// Length of the unknown-tag animation
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub failure_animation: Duration,

    /// Length of the fade to black before an app takes over the display
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub fadeout_animation: Duration,

    /// Time between rendered frames
    #[arg(long, default_value = "16667us", value_parser = humantime::parse_duration)]
    pub frame_interval: Duration,
}

impl From<SupervisorArgs> for SupervisorConfig {
    fn from(args: SupervisorArgs) -> Self {
        SupervisorConfig {
            interpreter: args.interpreter,
            scanner_script: args.scanner_script,
            app_root: args.app_root,
            animations: AnimationTimings {
                success: args.success_animation,
                failure: args.failure_animation,
                fadeout: args.fadeout_animation,
                frame_interval: args.frame_interval,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SupervisorArgs,
    }

    #[test]
    fn no_arguments_yield_the_default_config() {
        let harness = Harness::try_parse_from(["tagdeckd"]).unwrap();
        assert_eq!(
            SupervisorConfig::from(harness.args),
            SupervisorConfig::default()
        );
    }

    #[test]
    fn durations_use_humantime() {
        let harness = Harness::try_parse_from([
            "tagdeckd",
            "--success-animation",
            "250ms",
            "--app-root",
            "/srv/apps",
        ])
        .unwrap();
        let config = SupervisorConfig::from(harness.args);
        assert_eq!(config.animations.success, Duration::from_millis(250));
        assert_eq!(config.app_root, PathBuf::from("/srv/apps"));
    }
}
