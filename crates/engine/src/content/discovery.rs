use std::fs;
use std::path::{Path, PathBuf};

pub(crate) struct ReadError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// All `*.xml` files below `root`, ordered by their `/`-joined relative path so the
/// compile order does not depend on the platform's directory listing.
pub(crate) fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_cached_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path)));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn xml_files_are_sorted_by_relative_path_and_filtered() {
        let temp = TempDir::new().expect("temp");
        let root = temp.path();
        fs::create_dir_all(root.join("levels")).expect("mkdir");
        fs::write(root.join("weapons.xml"), "<Defs/>").expect("write");
        fs::write(root.join("levels").join("b.XML"), "<Defs/>").expect("write");
        fs::write(root.join("levels").join("a.xml"), "<Defs/>").expect("write");
        fs::write(root.join("notes.txt"), "ignored").expect("write");

        let files = collect_xml_files_sorted(root).ok().expect("collect");
        let rel: Vec<String> = files
            .iter()
            .map(|path| normalize_rel_path(path.strip_prefix(root).expect("under root")))
            .collect();
        assert_eq!(rel, vec!["levels/a.xml", "levels/b.XML", "weapons.xml"]);
    }

    #[test]
    fn missing_root_is_a_read_error() {
        let temp = TempDir::new().expect("temp");
        let missing = temp.path().join("nope");
        let error = collect_xml_files_sorted(&missing).err().expect("error");
        assert_eq!(error.path, missing);
    }
}
