use std::io;
use std::path::Path;

use tracing::debug;

/// Makes sure `dir` exists as a directory, creating it and any missing parents.
///
/// Idempotent: an existing directory is success. Fails when the path is taken
/// by something that is not a directory or when creation is refused.
pub async fn ensure_dir(dir: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    debug!(dir = %dir.display(), "directory ready");
    Ok(())
}
