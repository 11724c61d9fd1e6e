use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::formats::{self, FileKind};

/// One filesystem entry the batch driver will account for.
#[derive(Debug)]
pub struct WalkedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Resolve a file or directory argument to the flat list of files to
/// process, sorted so batch runs are deterministic.
pub fn collect_files(root: &Path) -> Result<Vec<WalkedFile>> {
    let mut files = Vec::new();
    if root.is_dir() {
        walk_dir(root, &mut files)?;
    } else {
        files.push(WalkedFile {
            path: root.to_path_buf(),
            kind: formats::classify(root),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn walk_dir(dir: &Path, out: &mut Vec<WalkedFile>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else {
            out.push(WalkedFile {
                kind: formats::classify(&path),
                path,
            });
        }
    }
    Ok(())
}
