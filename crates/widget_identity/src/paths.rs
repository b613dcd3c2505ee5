use std::path::{Path, PathBuf};

pub const IDENTITY_DIR: &str = ".chat_widget";
pub const IDENTITY_FILE: &str = "identity.json";

/// Location of the durable key/value file under `root`.
#[must_use]
pub fn durable_store_path(root: &Path) -> PathBuf {
    root.join(IDENTITY_DIR).join(IDENTITY_FILE)
}
