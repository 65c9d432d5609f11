//! Crash-safe file replacement.
//!
//! Content is written to a temporary file next to its destination and only
//! renamed over the destination once it is complete and synced. A reader
//! therefore sees either the previous file or the complete new one, never a
//! prefix. Temporary files are removed when dropped unpublished, and
//! leftovers from a killed process are removed by the next attempt to write
//! the same destination.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::ShardWriter;
use crate::error::{Result, TaskError};
use crate::KeyValue;

/// A file being written at a temporary path.
pub struct StagedWriter {
    writer: ShardWriter<File>,
    temp: TempPath,
}

impl StagedWriter {
    /// Start writing the replacement for `dest`.
    pub fn create(dest: &Path) -> Result<Self> {
        remove_stale(dest);
        let temp = TempPath::beside(dest);
        let file = File::create(&temp.path).map_err(|e| TaskError::write(&temp.path, e))?;
        Ok(Self {
            writer: ShardWriter::new(file),
            temp,
        })
    }

    pub fn encode(&mut self, kv: &KeyValue) -> Result<()> {
        self.writer
            .encode(kv)
            .map_err(|e| TaskError::write(&self.temp.path, e))
    }

    pub fn written(&self) -> usize {
        self.writer.written()
    }

    /// Flush and sync the content. The file is closed afterwards but still
    /// invisible at its destination.
    pub fn finish(self) -> Result<Staged> {
        let Self { writer, temp } = self;
        let file = writer
            .into_inner()
            .map_err(|e| TaskError::write(&temp.path, e))?;
        file.sync_all().map_err(|e| TaskError::write(&temp.path, e))?;
        Ok(Staged { temp })
    }
}

/// Complete content waiting to be renamed into place.
pub struct Staged {
    temp: TempPath,
}

impl Staged {
    /// Atomically replace the destination with the staged content.
    pub fn publish(mut self) -> Result<PathBuf> {
        let dest = self.temp.dest.clone();
        fs::rename(&self.temp.path, &dest).map_err(|e| TaskError::write(&dest, e))?;
        self.temp.published = true;
        Ok(dest)
    }
}

struct TempPath {
    path: PathBuf,
    dest: PathBuf,
    published: bool,
}

impl TempPath {
    fn beside(dest: &Path) -> Self {
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = dest.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()));
        Self {
            path,
            dest: dest.to_path_buf(),
            published: false,
        }
    }
}

/// Delete temporary files for `dest` left behind by an attempt that died
/// before it could clean up. Only names of the form `.{name}.{uuid}.tmp` are
/// touched, so destinations that share a prefix keep their temporaries.
fn remove_stale(dest: &Path) {
    let (Some(dir), Some(name)) = (dest.parent(), dest.file_name()) else {
        return;
    };
    let name = name.to_string_lossy();
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let pattern = format!(
        "{}/.{}.*.tmp",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(&name)
    );
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot scan for stale temporaries of {:?}: {}", dest, e);
            return;
        }
    };
    let prefix = format!(".{}.", name);
    for path in entries.flatten() {
        let is_ours = path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| f.strip_prefix(prefix.as_str()))
            .and_then(|rest| rest.strip_suffix(".tmp"))
            .is_some_and(|id| Uuid::parse_str(id).is_ok());
        if !is_ours {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!(?path, "removed stale temporary file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove stale temporary file {:?}: {}", path, e),
        }
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove temporary file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn nothing_visible_until_published() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");

        let mut writer = StagedWriter::create(&dest).unwrap();
        writer.encode(&KeyValue::new("k", "v")).unwrap();
        assert_eq!(writer.written(), 1);
        let staged = writer.finish().unwrap();
        assert!(!dest.exists());

        assert_eq!(staged.publish().unwrap(), dest);
        let records = codec::read_all(File::open(&dest).unwrap()).unwrap();
        assert_eq!(records, vec![KeyValue::new("k", "v")]);
        assert_eq!(entries(dir.path()), vec!["out"]);
    }

    #[test]
    fn dropped_writer_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");
        fs::write(&dest, "previous").unwrap();

        let mut writer = StagedWriter::create(&dest).unwrap();
        writer.encode(&KeyValue::new("k", "v")).unwrap();
        drop(writer);

        let staged = StagedWriter::create(&dest).unwrap().finish().unwrap();
        drop(staged);

        assert_eq!(entries(dir.path()), vec!["out"]);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous");
    }

    #[test]
    fn publish_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");
        fs::write(&dest, "stale stale stale stale stale").unwrap();

        StagedWriter::create(&dest)
            .unwrap()
            .finish()
            .unwrap()
            .publish()
            .unwrap();
        assert_eq!(fs::read(&dest).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn leftovers_of_a_killed_attempt_are_removed() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");
        let leftover = dir.path().join(format!(".out.{}.tmp", Uuid::new_v4()));
        fs::write(&leftover, "half written").unwrap();
        // Temporaries of other destinations are not ours to remove.
        let other = dir.path().join(format!(".out.1.{}.tmp", Uuid::new_v4()));
        fs::write(&other, "busy").unwrap();
        fs::write(dir.path().join(".out.notes.tmp"), "").unwrap();

        StagedWriter::create(&dest)
            .unwrap()
            .finish()
            .unwrap()
            .publish()
            .unwrap();

        assert!(!leftover.exists());
        assert!(other.exists());
        assert_eq!(entries(dir.path()).len(), 3);
    }

    #[test]
    fn unwritable_directory_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing").join("out");
        match StagedWriter::create(&dest) {
            Err(TaskError::Write { .. }) => {}
            Err(e) => panic!("expected write error, got {e}"),
            Ok(_) => panic!("expected write error"),
        }
    }
}
