//! Directory-backed asset store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;

use eds_engine::AssetStore;

/// Reads and writes sitplan images relative to a directory.
///
/// The directory is usually the one holding the YAML document.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store for the directory containing `document`.
    pub fn beside(document: &Path) -> Self {
        let root = document
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirAssets {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(name);
        debug!(path:? = path, bytes = bytes.len(); "Writing asset");
        fs::write(path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirAssets::new(dir.path());

        assert!(assets.read("plan.png").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut assets = DirAssets::new(dir.path().join("nested"));

        assets.write("image_0.png", b"png").unwrap();
        assert_eq!(assets.read("image_0.png").unwrap(), Some(b"png".to_vec()));
    }

    #[test]
    fn test_beside_bare_file_name() {
        assert_eq!(DirAssets::beside(Path::new("plan.yaml")).root(), Path::new("."));
        assert_eq!(
            DirAssets::beside(Path::new("docs/plan.yaml")).root(),
            Path::new("docs")
        );
    }
}
