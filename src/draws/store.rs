//! Named persistence of draw collections.
//!
//! [`DrawStore`] is the only boundary between estimation and durable
//! storage. A tag names one collection; storing under an existing tag is an
//! error, so a collection is replaced only by an explicit `delete` first.
use crate::draws::{
    collection::DrawCollection,
    errors::{DrawError, DrawResult},
};
use indexmap::IndexMap;
use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

pub trait DrawStore {
    /// Take ownership of `collection` under `tag`.
    fn store(&mut self, tag: &str, collection: DrawCollection) -> DrawResult<()>;

    fn retrieve(&self, tag: &str) -> DrawResult<DrawCollection>;

    fn delete(&mut self, tag: &str) -> DrawResult<()>;

    /// Stored tags, in insertion order for memory stores and sorted for
    /// directory stores.
    fn tags(&self) -> DrawResult<Vec<String>>;

    fn contains(&self, tag: &str) -> DrawResult<bool> {
        Ok(self.tags()?.iter().any(|t| t == tag))
    }
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDrawStore {
    collections: IndexMap<String, DrawCollection>,
}

impl MemoryDrawStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawStore for MemoryDrawStore {
    fn store(&mut self, tag: &str, collection: DrawCollection) -> DrawResult<()> {
        validate_tag(tag)?;
        if self.collections.contains_key(tag) {
            return Err(DrawError::TagExists { tag: tag.to_string() });
        }
        self.collections.insert(tag.to_string(), collection);
        Ok(())
    }

    fn retrieve(&self, tag: &str) -> DrawResult<DrawCollection> {
        self.collections
            .get(tag)
            .cloned()
            .ok_or_else(|| DrawError::TagNotFound { tag: tag.to_string() })
    }

    fn delete(&mut self, tag: &str) -> DrawResult<()> {
        self.collections
            .shift_remove(tag)
            .map(|_| ())
            .ok_or_else(|| DrawError::TagNotFound { tag: tag.to_string() })
    }

    fn tags(&self) -> DrawResult<Vec<String>> {
        Ok(self.collections.keys().cloned().collect())
    }
}

/// One `<tag>.json` file per collection under `root`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> DrawResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, &e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, tag: &str) -> DrawResult<PathBuf> {
        validate_tag(tag)?;
        Ok(self.root.join(format!("{tag}.json")))
    }
}

impl DrawStore for JsonDirStore {
    fn store(&mut self, tag: &str, collection: DrawCollection) -> DrawResult<()> {
        let path = self.path_for(tag)?;
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DrawError::TagExists { tag: tag.to_string() });
            }
            Err(e) => return Err(io_error(&path, &e)),
        };
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &collection)
            .map_err(|e| DrawError::Serialization { tag: tag.to_string(), text: e.to_string() })?;
        writer.flush().map_err(|e| io_error(&path, &e))?;
        tracing::info!(
            tag,
            path = %path.display(),
            draws = collection.n_draws(),
            chain = collection.chain_id(),
            "stored draw collection"
        );
        Ok(())
    }

    fn retrieve(&self, tag: &str) -> DrawResult<DrawCollection> {
        let path = self.path_for(tag)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DrawError::TagNotFound { tag: tag.to_string() });
            }
            Err(e) => return Err(io_error(&path, &e)),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DrawError::Serialization { tag: tag.to_string(), text: e.to_string() })
    }

    fn delete(&mut self, tag: &str) -> DrawResult<()> {
        let path = self.path_for(tag)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DrawError::TagNotFound { tag: tag.to_string() })
            }
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    fn tags(&self) -> DrawResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| io_error(&self.root, &e))?;
        let mut tags = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(&self.root, &e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_tag(stem).is_ok() {
                    tags.push(stem.to_string());
                }
            }
        }
        tags.sort();
        Ok(tags)
    }
}

fn validate_tag(tag: &str) -> DrawResult<()> {
    let invalid = |reason| Err(DrawError::InvalidTag { tag: tag.to_string(), reason });
    if tag.is_empty() {
        return invalid("tag is empty");
    }
    if tag.starts_with('.') {
        return invalid("tag may not start with '.'");
    }
    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return invalid("only ASCII letters, digits, '_', '-' and '.' are allowed");
    }
    Ok(())
}

fn io_error(path: &Path, err: &std::io::Error) -> DrawError {
    DrawError::Io { path: path.display().to_string(), text: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::collection::{DrawMeta, Provenance};
    use ndarray::array;

    fn collection() -> DrawCollection {
        DrawCollection::new(
            vec!["a".into()],
            array![[1.0], [2.0]],
            vec![true, true],
            vec![-1.0, -2.0],
            vec![1, 2],
            DrawMeta { chain_id: 0, provenance: Provenance::Prior, n_burn: 0, thin: 1, complete: true },
        )
        .expect("collection")
    }

    #[test]
    // Purpose
    // -------
    // The memory store keeps collections until deleted and refuses
    // overwrites.
    //
    // Given
    // -----
    // - One collection stored as "prior", then stored again.
    //
    // Expect
    // ------
    // - Retrieval equals the original; second store is `TagExists`;
    //   after delete the tag is gone.
    fn memory_store_lifecycle() {
        let mut store = MemoryDrawStore::new();
        store.store("prior", collection()).expect("store");

        assert_eq!(store.retrieve("prior").expect("retrieve"), collection());
        assert!(matches!(store.store("prior", collection()), Err(DrawError::TagExists { .. })));

        store.delete("prior").expect("delete");
        assert!(!store.contains("prior").expect("tags"));
        assert!(matches!(store.retrieve("prior"), Err(DrawError::TagNotFound { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Tags that could escape the store directory are rejected.
    //
    // Given
    // -----
    // - "", "../x", ".hidden", "a/b".
    //
    // Expect
    // ------
    // - All `InvalidTag`; "run-1_v2.final" is accepted.
    fn tag_validation() {
        for bad in ["", "../x", ".hidden", "a/b"] {
            assert!(matches!(validate_tag(bad), Err(DrawError::InvalidTag { .. })), "{bad}");
        }
        assert!(validate_tag("run-1_v2.final").is_ok());
    }
}
