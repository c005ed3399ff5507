use crate::error::{ProcessingError, Result};
use crate::formats::has_extension;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An image file found by a walk, with its size on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub size: u64,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Reads the size from disk. The error keeps the path.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        match fs::metadata(&path) {
            Ok(metadata) => Ok(Self::new(path, metadata.len())),
            Err(source) => Err(ProcessingError::Unreadable { path, source }),
        }
    }
}

/// Recursive, restartable walk over the image files under a root.
///
/// Each call to [`ImageWalker::iter`] starts a fresh traversal. Entries are
/// sorted by file name so the order is the same on every filesystem.
/// Symbolic links are neither followed nor reported, so link cycles cannot
/// occur. Hidden files and directories are walked like any other.
#[derive(Debug, Clone)]
pub struct ImageWalker {
    root: PathBuf,
    extensions: &'static [&'static str],
}

impl ImageWalker {
    pub fn new(root: impl Into<PathBuf>, extensions: &'static [&'static str]) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ProcessingError::DirectoryNotFound(root));
        }
        Ok(Self { root, extensions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_extension(entry.path(), self.extensions)
                    {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(e) => Some(Err(ProcessingError::from(e))),
            })
    }

    /// Same walk as [`ImageWalker::iter`], with each file's size attached.
    pub fn sources(&self) -> impl Iterator<Item = Result<SourceImage>> + '_ {
        self.iter().map(|path| path.and_then(SourceImage::from_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{OPTIMIZE_EXTENSIONS, REPORT_EXTENSIONS};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path, bytes: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap().write_all(bytes).unwrap();
    }

    fn names(walker: &ImageWalker) -> Vec<String> {
        walker
            .iter()
            .map(|p| {
                p.unwrap()
                    .strip_prefix(walker.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_missing_root_is_reported() {
        let result = ImageWalker::new("/nonexistent/images", REPORT_EXTENSIONS);
        assert!(matches!(result, Err(ProcessingError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.jpg");
        touch(&file, b"x");
        assert!(ImageWalker::new(&file, REPORT_EXTENSIONS).is_err());
    }

    #[test]
    fn test_recursive_filtered_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.png"), b"png");
        touch(&root.join("a.JPG"), b"jpg");
        touch(&root.join("notes.txt"), b"text");
        touch(&root.join("sub/c.gif"), b"gif");
        touch(&root.join("sub/d.webp"), b"webp");

        let walker = ImageWalker::new(root, OPTIMIZE_EXTENSIONS).unwrap();
        assert_eq!(names(&walker), vec!["a.JPG", "b.png", "sub/c.gif"]);

        let walker = ImageWalker::new(root, REPORT_EXTENSIONS).unwrap();
        assert_eq!(
            names(&walker),
            vec!["a.JPG", "b.png", "sub/c.gif", "sub/d.webp"]
        );
    }

    #[test]
    fn test_walk_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("one.jpg"), b"1");
        touch(&temp_dir.path().join("deep/two.png"), b"22");

        let walker = ImageWalker::new(temp_dir.path(), REPORT_EXTENSIONS).unwrap();
        let first = names(&walker);
        let second = names(&walker);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hidden_entries_included() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join(".hero.jpg"), b"x");
        touch(&temp_dir.path().join(".thumbs/a.jpg"), b"x");
        touch(&temp_dir.path().join("b.jpg"), b"x");

        let walker = ImageWalker::new(temp_dir.path(), OPTIMIZE_EXTENSIONS).unwrap();
        assert_eq!(names(&walker), vec![".hero.jpg", ".thumbs/a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_vanished_file_error_names_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.jpg");

        let error = SourceImage::from_path(gone.clone()).unwrap_err();
        assert!(matches!(error, ProcessingError::Unreadable { .. }));
        assert_eq!(error.path(), Some(gone.as_path()));
        assert!(error.to_string().contains("gone.jpg"));
    }

    #[test]
    fn test_sources_carry_sizes() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.jpg"), &[0u8; 1500]);

        let walker = ImageWalker::new(temp_dir.path(), REPORT_EXTENSIONS).unwrap();
        let sources: Vec<SourceImage> = walker.sources().map(|s| s.unwrap()).collect();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].size, 1500);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("images");
        touch(&root.join("real.jpg"), b"x");
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("real.jpg"), root.join("alias.jpg")).unwrap();

        let walker = ImageWalker::new(&root, REPORT_EXTENSIONS).unwrap();
        assert_eq!(names(&walker), vec!["real.jpg"]);
    }
}
