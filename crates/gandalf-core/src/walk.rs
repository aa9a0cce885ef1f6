//! Spec tree to output path mapping

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// An artifact spec file and the file it renders to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    pub spec: PathBuf,
    pub output: PathBuf,
}

/// Find artifact specs under `specs` and pair them with output paths
///
/// A single spec file renders to `output`, or into `output` when that is an
/// existing directory. A spec directory is walked recursively and every
/// regular file maps to the same relative path below `output`. Results are
/// sorted by spec path.
pub fn find_artifacts(specs: &Path, output: &Path) -> Result<Vec<ArtifactPath>> {
    if fs::metadata(specs)?.is_file() {
        let output = match specs.file_name() {
            Some(name) if output.is_dir() => output.join(name),
            _ => output.to_path_buf(),
        };
        return Ok(vec![ArtifactPath {
            spec: specs.to_path_buf(),
            output,
        }]);
    }

    let mut found = Vec::new();
    walk_dir(specs, specs, output, &mut found);
    found.sort_by(|a, b| a.spec.cmp(&b.spec));
    Ok(found)
}

fn walk_dir(root: &Path, dir: &Path, output: &Path, found: &mut Vec<ArtifactPath>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => walk_dir(root, &path, output, found),
            Ok(_) if path.is_file() => {
                if let Ok(relative) = path.strip_prefix(root) {
                    found.push(ArtifactPath {
                        output: output.join(relative),
                        spec: path,
                    });
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
}
