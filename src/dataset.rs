/// Dataset layout helpers
///
/// A dataset root holds one directory per class:
/// `<root>/<class>/<files>`. These helpers find the classes and the
/// eligible files inside each one. Both pipelines use the same rules:
/// only directories count as classes, only regular files with a
/// whitelisted extension count as members.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PrepError, Result};

/// A labeled subset of the dataset (one directory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDirectory {
    /// Class label, the directory's base name
    pub name: String,
    /// Full path to the directory
    pub path: PathBuf,
}

/// Find the class directories directly under `root`, sorted by name
pub fn detect_classes(root: &Path) -> Result<Vec<ClassDirectory>> {
    if !root.is_dir() {
        return Err(PrepError::MissingRoot(root.to_path_buf()));
    }

    let mut classes = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        classes.push(ClassDirectory {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_path_buf(),
        });
    }

    classes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(classes)
}

/// List the eligible files of one class directory, sorted by file name
pub fn list_eligible_files(class_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(class_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| walk_error(class_dir, e))?;
        let path = entry.path();

        // Only process files (not directories)
        if !entry.file_type().is_file() {
            continue;
        }

        if has_valid_extension(path, extensions) {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Case-insensitive extension check; whitelist entries may omit the dot
pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(extension) = path.extension() else {
        return false;
    };
    let ext = extension.to_string_lossy().to_lowercase();

    extensions
        .iter()
        .any(|valid| valid.trim_start_matches('.').to_lowercase() == ext)
}

/// File name of a path as an owned string (empty if there is none)
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn walk_error(root: &Path, err: walkdir::Error) -> PrepError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
    PrepError::io(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn png_only() -> Vec<String> {
        vec![".png".to_string()]
    }

    #[test]
    fn test_extension_matching() {
        let exts = png_only();
        assert!(has_valid_extension(Path::new("a/b.png"), &exts));
        assert!(has_valid_extension(Path::new("a/B.PNG"), &exts));
        assert!(!has_valid_extension(Path::new("a/b.jpg"), &exts));
        assert!(!has_valid_extension(Path::new("a/png"), &exts));
        assert!(!has_valid_extension(Path::new("a/b.png.bak"), &exts));

        let no_dot = vec!["JPG".to_string()];
        assert!(has_valid_extension(Path::new("x.jpg"), &no_dot));
    }

    #[test]
    fn test_detect_classes_ignores_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dog")).unwrap();
        fs::create_dir(dir.path().join("cat")).unwrap();
        fs::write(dir.path().join("README.txt"), "not a class").unwrap();

        let classes = detect_classes(dir.path()).unwrap();
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["cat", "dog"]);
        assert_eq!(classes[0].path, dir.path().join("cat"));
    }

    #[test]
    fn test_detect_classes_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            detect_classes(&missing),
            Err(PrepError::MissingRoot(path)) if path == missing
        ));
    }

    #[test]
    fn test_list_eligible_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.PNG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = list_eligible_files(dir.path(), &png_only()).unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p)).collect();

        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }
}
