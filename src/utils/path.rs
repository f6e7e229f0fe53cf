//! Path utilities

use std::path::{Path, PathBuf};

/// Normalize path separators to forward slashes (for archive names)
#[must_use]
pub fn normalize_separators(name: &str) -> String {
    name.replace('\\', "/")
}

/// Get the path for a specific archive part file
///
/// For part 0, returns the base path unchanged.
/// For part N > 0, returns `{stem}_{N}.{ext}` (e.g., `Textures_1.pak`)
#[must_use]
pub fn part_file_path(base_path: &Path, part: u32) -> Option<PathBuf> {
    if part == 0 {
        return Some(base_path.to_path_buf());
    }

    let stem = base_path.file_stem()?.to_str()?;
    let ext = base_path.extension()?.to_str()?;
    let parent = base_path.parent()?;

    Some(parent.join(format!("{stem}_{part}.{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_zero_is_the_base_path() {
        let base = Path::new("/data/Textures.pak");
        assert_eq!(part_file_path(base, 0).unwrap(), base);
    }

    #[test]
    fn parts_get_numbered_suffixes() {
        let base = Path::new("/data/Textures.pak");
        assert_eq!(
            part_file_path(base, 2).unwrap(),
            Path::new("/data/Textures_2.pak")
        );
    }

    #[test]
    fn separators_normalize_to_forward_slashes() {
        assert_eq!(normalize_separators(r"Mods\Shared\meta.lsx"), "Mods/Shared/meta.lsx");
    }
}
