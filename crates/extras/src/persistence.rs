//! Persistence of report assets
//!
//! The normalizer never touches the filesystem itself. When content has to
//! live outside the report page (linked screenshots, downloads, HTML pages)
//! it goes through a [`PersistenceGateway`], which returns a reference
//! relative to the report folder.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ExtrasError, ExtrasResult};

/// Folder an asset is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Downloads,
    Images,
    Sources,
    Videos,
    Audio,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Downloads,
        Category::Images,
        Category::Sources,
        Category::Videos,
        Category::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Downloads => "downloads",
            Category::Images => "images",
            Category::Sources => "sources",
            Category::Videos => "videos",
            Category::Audio => "audio",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data handed to [`PersistenceGateway::save`]
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl Payload<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

/// Stores report assets and hands back report-relative references
pub trait PersistenceGateway: Send + Sync {
    /// Write fresh content
    fn save(&self, data: Payload<'_>, extension: Option<&str>, category: Category) -> ExtrasResult<String>;

    /// Copy an existing file
    fn copy(&self, source: &Path, extension: Option<&str>, category: Category) -> ExtrasResult<String>;
}

/// Filesystem gateway rooted at the report folder.
///
/// Files are named with a random UUID plus the extension, so concurrent
/// writers never collide and no counter has to be shared.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store at `root`, creating the category folders
    pub fn new(root: impl AsRef<Path>) -> ExtrasResult<Self> {
        let store = Self {
            root: root.as_ref().to_path_buf(),
        };
        for category in Category::ALL {
            fs::create_dir_all(store.category_dir(category))?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// Remove assets left by a previous run and recreate empty folders
    pub fn prepare(&self) -> ExtrasResult<()> {
        for category in Category::ALL {
            let dir = self.category_dir(category);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            fs::create_dir_all(&dir)?;
        }
        info!("Prepared report assets under {}", self.root.display());
        Ok(())
    }

    /// Delete category folders that ended up empty
    pub fn remove_empty_folders(&self) -> ExtrasResult<()> {
        for category in Category::ALL {
            let dir = self.category_dir(category);
            if dir.is_dir() && fs::read_dir(&dir)?.next().is_none() {
                fs::remove_dir(&dir)?;
                debug!("Removed empty folder {}", dir.display());
            }
        }
        Ok(())
    }

    /// Resolve a reference returned by this store to a filesystem path
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }

    fn reserve(&self, extension: Option<&str>, category: Category) -> (PathBuf, String) {
        let token = Uuid::new_v4().simple().to_string();
        let name = match extension.map(|ext| ext.trim_start_matches('.')).filter(|ext| !ext.is_empty()) {
            Some(ext) => format!("{}.{}", token, ext),
            None => token,
        };
        let reference = format!("{}/{}", category.as_str(), name);
        (self.category_dir(category).join(name), reference)
    }
}

impl PersistenceGateway for FileStore {
    fn save(&self, data: Payload<'_>, extension: Option<&str>, category: Category) -> ExtrasResult<String> {
        let (path, reference) = self.reserve(extension, category);
        fs::create_dir_all(self.category_dir(category))?;
        fs::write(&path, data.as_bytes()).map_err(|e| {
            warn!("Failed to write {}: {}", path.display(), e);
            ExtrasError::Persistence(format!("{}: {}", path.display(), e))
        })?;
        debug!("Saved {} ({} bytes)", reference, data.as_bytes().len());
        Ok(reference)
    }

    fn copy(&self, source: &Path, extension: Option<&str>, category: Category) -> ExtrasResult<String> {
        let extension = extension
            .map(str::to_string)
            .or_else(|| source.extension().map(|ext| ext.to_string_lossy().into_owned()));
        let (path, reference) = self.reserve(extension.as_deref(), category);
        fs::create_dir_all(self.category_dir(category))?;
        fs::copy(source, &path).map_err(|e| {
            warn!("Failed to copy {} to {}: {}", source.display(), path.display(), e);
            ExtrasError::Persistence(format!("{}: {}", source.display(), e))
        })?;
        debug!("Copied {} to {}", source.display(), reference);
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_returns_relative_reference() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        let reference = store.save(Payload::Text("hello"), Some("txt"), Category::Sources).unwrap();
        assert!(reference.starts_with("sources/"));
        assert!(reference.ends_with(".txt"));
        assert_eq!(fs::read_to_string(store.resolve(&reference)).unwrap(), "hello");
    }

    #[test]
    fn test_save_names_are_unique() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        let a = store.save(Payload::Bytes(&[1, 2]), Some("png"), Category::Images).unwrap();
        let b = store.save(Payload::Bytes(&[1, 2]), Some("png"), Category::Images).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_save_without_extension() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        let reference = store.save(Payload::Bytes(b"x"), None, Category::Downloads).unwrap();
        assert!(!reference.contains('.'));
    }

    #[test]
    fn test_copy_uses_source_extension() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("report")).unwrap();
        let source = tmp.path().join("data.bin");
        fs::write(&source, b"payload").unwrap();

        let reference = store.copy(&source, None, Category::Downloads).unwrap();
        assert!(reference.starts_with("downloads/"));
        assert!(reference.ends_with(".bin"));
        assert_eq!(fs::read(store.resolve(&reference)).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();
        let err = store.copy(&tmp.path().join("missing"), None, Category::Downloads);
        assert!(matches!(err, Err(ExtrasError::Persistence(_))));
    }

    #[test]
    fn test_prepare_and_prune() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();
        store.save(Payload::Text("old"), Some("txt"), Category::Sources).unwrap();

        store.prepare().unwrap();
        assert_eq!(fs::read_dir(store.category_dir(Category::Sources)).unwrap().count(), 0);

        store.save(Payload::Bytes(b"png"), Some("png"), Category::Images).unwrap();
        store.remove_empty_folders().unwrap();
        assert!(store.category_dir(Category::Images).exists());
        assert!(!store.category_dir(Category::Sources).exists());
    }
}
