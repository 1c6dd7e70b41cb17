use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Candidate filter used by batch scans: engine asset packages only,
/// never the externalized actor/object shards.
pub fn is_candidate_asset(path: &Path) -> bool {
    let p = path.to_string_lossy();
    p.ends_with(".uasset") && !p.contains("__External")
}

/// Recursively list candidate assets under a root, sorted.
pub fn list_assets(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter().flatten() {
        let p = entry.path();
        if p.is_file() && is_candidate_asset(p) {
            out.push(p.to_path_buf());
        }
    }
    out.sort();
    out
}
