//! Filesystem content store: `<dir>/<id>.md`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use monotone_shared::{MonotoneError, Result, RouteParam};
use tracing::{debug, instrument, warn};

use crate::{ContentResolver, require_id};

/// Resolver reading one Markdown file per tutorial from a directory.
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
    timeout: Duration,
}

impl DirResolver {
    pub fn new(root: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            timeout,
        }
    }
}

#[async_trait]
impl ContentResolver for DirResolver {
    #[instrument(skip_all, fields(param = %param, root = %self.root.display()))]
    async fn resolve(&self, param: &RouteParam) -> Result<String> {
        let id = require_id(param)?;
        let path = self.root.join(format!("{id}.md"));

        let read = tokio::time::timeout(self.timeout, tokio::fs::read_to_string(&path)).await;

        match read {
            Ok(Ok(text)) => {
                debug!(path = %path.display(), len = text.len(), "tutorial read");
                Ok(text)
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "tutorial file missing");
                Err(MonotoneError::not_found(param.as_str()))
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "tutorial read failed");
                Err(MonotoneError::unavailable(format!("{}: {e}", path.display())))
            }
            Err(_) => {
                warn!(path = %path.display(), timeout = ?self.timeout, "tutorial read timed out");
                Err(MonotoneError::unavailable(format!(
                    "{}: timed out after {:?}",
                    path.display(),
                    self.timeout
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn reads_markdown_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("4.md"), "# Four\n").expect("write");

        let resolver = DirResolver::new(dir.path(), TIMEOUT);
        let text = resolver.resolve(&RouteParam::new("4")).await.expect("resolve");
        assert_eq!(text, "# Four\n");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirResolver::new(dir.path(), TIMEOUT);
        let err = resolver.resolve(&RouteParam::new("999")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn traversal_param_never_touches_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("secret.md"), "nope").expect("write");

        let resolver = DirResolver::new(dir.path().join("tutorials"), TIMEOUT);
        let err = resolver
            .resolve(&RouteParam::new("../secret"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unreadable_entry_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where a file is expected fails with something other than NotFound.
        std::fs::create_dir(dir.path().join("5.md")).expect("mkdir");

        let resolver = DirResolver::new(dir.path(), TIMEOUT);
        let err = resolver.resolve(&RouteParam::new("5")).await.unwrap_err();
        assert!(matches!(err, MonotoneError::Unavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn invalid_utf8_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("6.md"), [0xff, 0xfe, 0x00]).expect("write");

        let resolver = DirResolver::new(dir.path(), TIMEOUT);
        let err = resolver.resolve(&RouteParam::new("6")).await.unwrap_err();
        assert!(matches!(err, MonotoneError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn blocked_read_times_out_as_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fifo = dir.path().join("7.md");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .expect("run mkfifo");
        assert!(status.success());

        // Opening a FIFO with no writer blocks until one appears.
        let resolver = DirResolver::new(dir.path(), Duration::from_millis(50));
        let err = resolver.resolve(&RouteParam::new("7")).await.unwrap_err();
        assert!(matches!(err, MonotoneError::Unavailable(_)), "got {err:?}");
        assert!(err.to_string().contains("timed out after 50ms"), "got {err}");

        // Release the blocked reader so the runtime can shut down.
        drop(std::fs::OpenOptions::new().write(true).open(&fifo).expect("open writer"));
    }
}
