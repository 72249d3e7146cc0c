use crate::domain::error::{AppError, Result};
use crate::domain::report::ChartId;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const REPORT_HANDOFF_FILE: &str = "report_input.json";

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::Io(msg.into())
}

/// Files one pipeline run publishes under its output directory.
///
/// The directory must exist before the sink or renderer writes into it;
/// the driver calls [`OutputLayout::ensure`] once per run. Two runs must
/// not share an output directory concurrently.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    clean_table: PathBuf,
    report_handoff: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: &Path, clean_file_name: &str) -> Self {
        Self {
            root: output_dir.to_path_buf(),
            clean_table: output_dir.join(clean_file_name),
            report_handoff: output_dir.join(REPORT_HANDOFF_FILE),
        }
    }

    pub fn ensure(&self) -> Result<()> {
        ensure_dir(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn clean_table_path(&self) -> &Path {
        &self.clean_table
    }

    pub fn report_handoff_path(&self) -> &Path {
        &self.report_handoff
    }

    pub fn chart_path(&self, chart: ChartId) -> PathBuf {
        self.root.join(format!("{}.json", chart.as_str()))
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| io_err(format!("Failed to create dir {}: {e}", path.display())))?;
    Ok(())
}

/// Stage `bytes` next to `path`, then publish them under `path`.
///
/// On Unix the publish is a single rename, so a reader opening `path` finds
/// either the old contents or the new ones.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    if let Err(e) = stage(&staged, bytes) {
        fs::remove_file(&staged).ok();
        return Err(e);
    }
    publish(&staged, path)
}

fn stage(staged: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(staged)
        .map_err(|e| io_err(format!("Failed to create {}: {e}", staged.display())))?;
    file.write_all(bytes)
        .map_err(|e| io_err(format!("Failed to write {}: {e}", staged.display())))?;
    file.sync_all().ok();
    Ok(())
}

#[cfg(not(windows))]
fn publish(staged: &Path, path: &Path) -> Result<()> {
    fs::rename(staged, path).map_err(|e| {
        fs::remove_file(staged).ok();
        io_err(format!("Failed to publish {}: {e}", path.display()))
    })
}

// Windows refuses to rename over an existing file.
#[cfg(windows)]
fn publish(staged: &Path, path: &Path) -> Result<()> {
    let backup = path.with_extension(format!("bak-{}", Uuid::new_v4()));
    let had_previous = path.exists();
    if had_previous {
        fs::rename(path, &backup).map_err(|e| {
            fs::remove_file(staged).ok();
            io_err(format!("Failed to set aside {}: {e}", path.display()))
        })?;
    }

    if let Err(e) = fs::rename(staged, path) {
        if had_previous {
            fs::rename(&backup, path).ok();
        }
        fs::remove_file(staged).ok();
        return Err(io_err(format!("Failed to publish {}: {e}", path.display())));
    }

    if had_previous {
        fs::remove_file(&backup).ok();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new(Path::new("out"), "spotify_clean.csv");
        assert_eq!(layout.clean_table_path(), Path::new("out/spotify_clean.csv"));
        assert_eq!(layout.report_handoff_path(), Path::new("out/report_input.json"));
        assert_eq!(
            layout.chart_path(ChartId::FeatureCorr),
            PathBuf::from("out/feature_corr.json")
        );
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let root = std::env::temp_dir().join(format!("insight_storage_{}", Uuid::new_v4()));
        let layout = OutputLayout::new(&root, "clean.csv");
        layout.ensure().unwrap();

        let path = layout.clean_table_path();
        atomic_write_bytes(path, b"first").unwrap();
        atomic_write_bytes(path, b"second").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
        assert_eq!(fs::read_dir(&root).unwrap().count(), 1);
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_atomic_write_into_missing_dir_fails() {
        let root = std::env::temp_dir().join(format!("insight_storage_{}", Uuid::new_v4()));
        let path = root.join("clean.csv");

        let err = atomic_write_bytes(&path, b"data").unwrap_err();

        assert!(matches!(err, AppError::Io(_)));
        assert!(!path.exists());
    }
}
