//! Registry directory discovery and loading.
//!
//! A registry directory holds any number of `*.yaml` / `*.yml` files. Each
//! file is decoded and validated on its own, so a broken file is reported by
//! name instead of surfacing later as a confusing merge result.
//!
//! Files are read in sorted file-name order, which decides which definition
//! wins when two files declare the same computer.

use crate::error::{RegistryError, Result};
use crate::registry::schema::REGISTRY_SCHEMA;
use crate::registry::validator::validate;
use indexmap::IndexMap;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Validated source documents keyed by file name, in load order.
pub type RawRegistry = IndexMap<String, Value>;

/// Number of registry directories kept in a loader's cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// List the YAML files of a registry directory in load order.
///
/// # Errors
///
/// Returns `NotADirectory` if `directory` is not a directory and
/// `EmptyRegistry` if it holds no YAML files.
pub fn registry_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(RegistryError::NotADirectory {
            path: directory.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && is_yaml(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(RegistryError::EmptyRegistry {
            path: directory.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

/// Decode and validate a single registry file.
///
/// # Errors
///
/// Returns `ReadFile` if the file is unreadable or not UTF-8, `Parse` if the
/// YAML is invalid, and `Schema` if the document does not match the registry
/// schema.
pub fn load_registry_file(path: &Path) -> Result<Value> {
    let content = read_registry_text(path)?;
    parse_registry_document(&content, path)
}

/// Read a registry file as text, naming the file on failure.
pub(crate) fn read_registry_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RegistryError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse YAML text into a validated registry document.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_registry_document(content: &str, source_path: &Path) -> Result<Value> {
    let raw: Value = serde_yaml::from_str(content).map_err(|e| RegistryError::Parse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;

    validate(&REGISTRY_SCHEMA, &raw).map_err(|source| RegistryError::Schema {
        file: file_name(source_path),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load every registry file in a directory without caching.
pub fn load_code_registry(directory: &Path) -> Result<RawRegistry> {
    let mut registry = RawRegistry::new();

    for path in registry_files(directory)? {
        let document = load_registry_file(&path)?;
        registry.insert(file_name(&path), document);
    }

    tracing::debug!(
        "Loaded {} registry file(s) from {}",
        registry.len(),
        directory.display()
    );
    Ok(registry)
}

/// Loads registry directories and remembers the most recent few.
///
/// Repeated loads of the same path return the same shared snapshot until the
/// path is invalidated. The cache is guarded by a mutex, so a loader can be
/// shared between threads.
pub struct RegistryLoader {
    cache: Mutex<LruCache<PathBuf, Arc<RawRegistry>>>,
}

impl RegistryLoader {
    /// Create a loader with the default cache capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a loader caching up to `capacity` directories (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Load a registry directory, using the cache when possible.
    pub fn load(&self, directory: &Path) -> Result<Arc<RawRegistry>> {
        if let Some(cached) = self.cache.lock().get(directory) {
            tracing::debug!("Registry cache hit for {}", directory.display());
            return Ok(Arc::clone(cached));
        }

        let registry = Arc::new(load_code_registry(directory)?);
        self.cache
            .lock()
            .put(directory.to_path_buf(), Arc::clone(&registry));
        Ok(registry)
    }

    /// Forget a cached directory. Returns whether it was cached.
    pub fn invalidate(&self, directory: &Path) -> bool {
        self.cache.lock().pop(directory).is_some()
    }

    /// Forget every cached directory.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached directories.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

impl Default for RegistryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegistryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryLoader")
            .field("cached", &self.cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::validator::SchemaErrorKind;
    use tempfile::TempDir;

    const LOCALHOST: &str = r#"
computers:
  - label: localhost
    setup:
      hostname: localhost
      transport: core.local
"#;

    fn registry_dir(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        temp
    }

    #[test]
    fn loads_yaml_and_yml_files() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST), ("b.yml", LOCALHOST)]);
        let registry = load_code_registry(temp.path()).unwrap();
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            vec!["a.yaml", "b.yml"]
        );
    }

    #[test]
    fn ignores_other_files() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST), ("README.md", "# docs")]);
        let registry = load_code_registry(temp.path()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn files_load_in_name_order() {
        let temp = registry_dir(&[("z.yaml", LOCALHOST), ("m.yml", LOCALHOST), ("a.yaml", LOCALHOST)]);
        let files = registry_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "m.yml", "z.yaml"]);
    }

    #[test]
    fn defaults_are_applied_on_load() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST)]);
        let registry = load_code_registry(temp.path()).unwrap();
        assert_eq!(
            registry["a.yaml"]["computers"][0]["setup"]["use_double_quotes"],
            false
        );
    }

    #[test]
    fn empty_directory_is_an_error() {
        let temp = registry_dir(&[("notes.txt", "nothing")]);
        let result = load_code_registry(temp.path());
        assert!(matches!(result, Err(RegistryError::EmptyRegistry { .. })));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = load_code_registry(&temp.path().join("missing"));
        assert!(matches!(result, Err(RegistryError::NotADirectory { .. })));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST)]);
        let result = load_code_registry(&temp.path().join("a.yaml"));
        assert!(matches!(result, Err(RegistryError::NotADirectory { .. })));
    }

    #[test]
    fn non_utf8_file_names_the_file() {
        let temp = registry_dir(&[("good.yaml", LOCALHOST)]);
        fs::write(temp.path().join("latin1.yaml"), b"# caf\xe9\ncomputers: []\n").unwrap();

        let err = load_code_registry(temp.path()).unwrap_err();
        match &err {
            RegistryError::ReadFile { path, .. } => assert!(path.ends_with("latin1.yaml")),
            other => panic!("expected read error, got {:?}", other),
        }
        assert!(err.to_string().contains("latin1.yaml"));
    }

    #[test]
    fn invalid_yaml_names_the_file() {
        let temp = registry_dir(&[("broken.yaml", "computers: [")]);
        match load_code_registry(temp.path()) {
            Err(RegistryError::Parse { path, .. }) => assert!(path.ends_with("broken.yaml")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn schema_violation_names_the_file() {
        let temp = registry_dir(&[
            ("good.yaml", LOCALHOST),
            ("bad.yaml", "computers:\n  - label: x\n    setup:\n      hostname: h\n"),
        ]);
        match load_code_registry(temp.path()) {
            Err(RegistryError::Schema { file, source }) => {
                assert_eq!(file, "bad.yaml");
                assert_eq!(source.path, "computers[0].setup.transport");
                assert_eq!(source.kind, SchemaErrorKind::MissingKey);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_fails_validation() {
        let temp = registry_dir(&[("empty.yaml", "")]);
        let result = load_code_registry(temp.path());
        assert!(matches!(result, Err(RegistryError::Schema { .. })));
    }

    #[test]
    fn loader_returns_cached_snapshot() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST)]);
        let loader = RegistryLoader::new();
        let first = loader.load(temp.path()).unwrap();
        let second = loader.load(temp.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let temp = registry_dir(&[("a.yaml", LOCALHOST)]);
        let loader = RegistryLoader::new();
        let first = loader.load(temp.path()).unwrap();

        fs::write(temp.path().join("b.yaml"), LOCALHOST).unwrap();
        assert_eq!(loader.load(temp.path()).unwrap().len(), 1);

        assert!(loader.invalidate(temp.path()));
        let reloaded = loader.load(temp.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.len(), 2);
        assert!(!loader.invalidate(&temp.path().join("other")));
    }

    #[test]
    fn cache_is_bounded() {
        let dirs: Vec<_> = (0..4).map(|_| registry_dir(&[("a.yaml", LOCALHOST)])).collect();
        let loader = RegistryLoader::with_capacity(2);
        for dir in &dirs {
            loader.load(dir.path()).unwrap();
        }
        assert_eq!(loader.cached(), 2);
        loader.clear();
        assert_eq!(loader.cached(), 0);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let temp = TempDir::new().unwrap();
        let loader = RegistryLoader::new();
        assert!(loader.load(temp.path()).is_err());
        assert_eq!(loader.cached(), 0);
    }
}
