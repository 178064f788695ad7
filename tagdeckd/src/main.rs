//! `tagdeckd`: supervises the tag scanner and launches one app per scanned
//! tag. Runs until something fails, then takes its whole process group down
//! and exits non-zero; restarting is left to the init system.

use clap::Parser;
use tagdeck_config::{SupervisorArgs, SupervisorConfig};
use tagdeck_core::{EXIT_FATAL, HeadlessRenderer, Supervisor, fatal, process};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tagdeckd", version, about = "Tag-driven kiosk supervisor")]
struct Cli {
    #[command(flatten)]
    supervisor: SupervisorArgs,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = SupervisorConfig::from(cli.supervisor);

    // Until this succeeds the group may include our parent, so failures
    // here must not be broadcast.
    match process::lead_process_group() {
        Ok(group) => info!(%group, "leading process group"),
        Err(err) => {
            error!(error = %err, "unable to create process group");
            std::process::exit(EXIT_FATAL);
        }
    }

    let outcome = Supervisor::start(&config, HeadlessRenderer::default())
        .and_then(Supervisor::run);
    match outcome {
        Ok(never) => match never {},
        Err(err) => fatal::shutdown(&err),
    }
}
