//! Output writer.
//!
//! Every generated file is written atomically: content goes to a hidden
//! `.<name>.tmp` sibling first and is renamed into place, so a reader never
//! sees a half-written page. Files are independent and written concurrently.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use castindex_shared::{CastIndexError, Result};

/// A generated file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Destination path (already joined with the output directory).
    pub path: PathBuf,
    pub content: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Write one file atomically, creating parent directories as needed.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| CastIndexError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CastIndexError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| CastIndexError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| CastIndexError::io(path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Write all files concurrently. `on_written` is called once per finished file.
///
/// The first failure is returned; files already renamed into place stay.
#[instrument(skip_all, fields(files = files.len()))]
pub async fn write_all<F>(files: Vec<OutputFile>, mut on_written: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(&Path, usize, usize),
{
    let total = files.len();
    let mut tasks = JoinSet::new();

    for file in files {
        tasks.spawn_blocking(move || {
            write_atomic(&file.path, &file.content)?;
            Ok::<_, CastIndexError>(file.path)
        });
    }

    let mut written = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let path = joined.map_err(|e| CastIndexError::Task(e.to_string()))??;
        on_written(&path, written.len() + 1, total);
        written.push(path);
    }

    written.sort();
    info!(count = written.len(), "output written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "castindex-writer-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = temp_dir();
        let target = dir.join("page").join("2").join("index.html");

        write_atomic(&target, "<html></html>").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<html></html>");
        assert!(!dir.join("page/2/.index.html.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = temp_dir();
        let target = dir.join("sitemap.xml");
        std::fs::write(&target, "old").unwrap();

        write_atomic(&target, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn write_all_writes_every_file() {
        let dir = temp_dir();
        let files = vec![
            OutputFile::new(dir.join("index.html"), "home"),
            OutputFile::new(dir.join("page/2/index.html"), "two"),
            OutputFile::new(dir.join("sitemap.xml"), "<urlset/>"),
        ];

        let mut seen = 0;
        let written = write_all(files, |_, current, total| {
            assert!(current <= total);
            seen += 1;
        })
        .await
        .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(dir.join("page/2/index.html")).unwrap(), "two");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn write_all_reports_io_path() {
        let dir = temp_dir();
        // A regular file where a directory is needed.
        std::fs::write(dir.join("page"), "not a dir").unwrap();

        let files = vec![OutputFile::new(dir.join("page/2/index.html"), "two")];
        let err = write_all(files, |_, _, _| {}).await.unwrap_err();
        assert!(matches!(err, CastIndexError::Io { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
