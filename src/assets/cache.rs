use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::assets::error::AssetResult;
use crate::assets::loader::ModelLoader;
use crate::math::TriangleMesh;

/// Remembers successfully parsed models so revisiting a scene skips the disk.
/// Failures are not cached; the next attempt reads the file again.
pub struct CachedModelLoader<L> {
    inner: L,
    meshes: Mutex<HashMap<PathBuf, TriangleMesh>>,
}

impl<L: ModelLoader> CachedModelLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            meshes: Mutex::new(HashMap::new()),
        }
    }
}

impl<L: ModelLoader> ModelLoader for CachedModelLoader<L> {
    fn load(&self, path: &Path) -> AssetResult<TriangleMesh> {
        if let Some(mesh) = self.meshes.lock().get(path) {
            log::debug!("model cache hit: {}", path.display());
            return Ok(mesh.clone());
        }

        // Parse without holding the lock so parallel loads stay parallel.
        let mesh = self.inner.load(path)?;
        self.meshes.lock().insert(path.to_path_buf(), mesh.clone());
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, parse_obj};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, path: &Path) -> AssetResult<TriangleMesh> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.ends_with("bad.obj") {
                return Err(AssetError::Empty);
            }
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
        }
    }

    #[test]
    fn test_second_load_is_served_from_cache() {
        let loader = CachedModelLoader::new(CountingLoader::default());
        let first = loader.load(Path::new("a.obj")).unwrap();
        let second = loader.load(Path::new("a.obj")).unwrap();
        assert_eq!(first, second);
        assert_eq!(loader.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.meshes.lock().len(), 1);
    }

    #[test]
    fn test_failures_are_retried() {
        let loader = CachedModelLoader::new(CountingLoader::default());
        assert!(loader.load(Path::new("bad.obj")).is_err());
        assert!(loader.load(Path::new("bad.obj")).is_err());
        assert_eq!(loader.inner.calls.load(Ordering::SeqCst), 2);
        assert!(loader.meshes.lock().is_empty());
    }
}
