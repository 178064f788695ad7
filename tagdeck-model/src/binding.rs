use std::path::{Path, PathBuf};

use crate::tag::TagId;

/// Filesystem location of the app bound to a tag:
/// `<app-root>/<HEX>/<HEX>.sh`, run with `<app-root>/<HEX>` as its working
/// directory.
///
/// Bindings are recomputed for every scan. Existence of the script is the
/// only validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBinding {
    tag: TagId,
    dir: PathBuf,
    script: PathBuf,
}

impl AppBinding {
    pub fn resolve(app_root: impl AsRef<Path>, tag: TagId) -> Self {
        let hex = tag.to_hex();
        let dir = app_root.as_ref().join(&hex);
        let script = dir.join(format!("{hex}.sh"));
        Self { tag, dir, script }
    }

    pub fn tag(&self) -> TagId {
        self.tag
    }

    /// Directory the app runs from, so its relative resource paths resolve.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn exists(&self) -> bool {
        self.script.exists()
    }
}
