use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::assets::error::{AssetError, AssetResult};
use crate::assets::{parse_fbx, parse_obj};
use crate::math::TriangleMesh;

/// Turns a model file into a mesh.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> AssetResult<TriangleMesh>;
}

/// Picks a parser from the file extension.
#[derive(Clone, Copy, Default)]
pub struct FileModelLoader;

impl ModelLoader for FileModelLoader {
    fn load(&self, path: &Path) -> AssetResult<TriangleMesh> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => {
                let bytes = std::fs::read(path)?;
                parse_obj(&String::from_utf8_lossy(&bytes))
            }
            "fbx" => parse_fbx(&std::fs::read(path)?),
            "" => Err(AssetError::UnsupportedFormat("no file extension".to_string())),
            other => Err(AssetError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub struct LoadedModel {
    pub slot: usize,
    pub path: PathBuf,
    pub mesh: TriangleMesh,
}

enum LoadEvent {
    Loaded(LoadedModel),
    Failed {
        slot: usize,
        path: PathBuf,
        error: AssetError,
    },
}

/// A group of independent model loads that resolves once every load has finished.
///
/// Each path gets its own detached worker. A failed load is logged and counted as
/// resolved with nothing, so one bad file never holds back the rest of the batch.
/// Dropping the batch does not wait for workers still parsing; their results are
/// discarded.
pub struct ModelBatch {
    rx: Receiver<LoadEvent>,
    /// Paths whose worker has not reported yet, by slot.
    pending: Vec<Option<PathBuf>>,
    resolved: usize,
    models: Vec<LoadedModel>,
    failures: Vec<(PathBuf, String)>,
    delivered: bool,
}

impl ModelBatch {
    pub fn spawn(paths: Vec<PathBuf>, loader: Arc<dyn ModelLoader>) -> Self {
        let (tx, rx) = channel::unbounded::<LoadEvent>();
        let pending: Vec<Option<PathBuf>> = paths.iter().cloned().map(Some).collect();

        for (slot, path) in paths.into_iter().enumerate() {
            let tx: Sender<LoadEvent> = tx.clone();
            let loader = Arc::clone(&loader);
            thread::spawn(move || {
                log::info!("loading model {}", path.display());
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| loader.load(&path)));
                let event = match outcome {
                    Ok(Ok(mesh)) => LoadEvent::Loaded(LoadedModel { slot, path, mesh }),
                    Ok(Err(error)) => LoadEvent::Failed { slot, path, error },
                    Err(_) => LoadEvent::Failed {
                        slot,
                        path,
                        error: AssetError::LoaderPanicked,
                    },
                };
                let _ = tx.send(event);
            });
        }

        Self {
            rx,
            pending,
            resolved: 0,
            models: Vec::new(),
            failures: Vec::new(),
            delivered: false,
        }
    }

    fn record(&mut self, event: LoadEvent) {
        let slot = match &event {
            LoadEvent::Loaded(model) => model.slot,
            LoadEvent::Failed { slot, .. } => *slot,
        };
        if self.pending.get_mut(slot).and_then(Option::take).is_none() {
            return;
        }
        self.resolved += 1;

        match event {
            LoadEvent::Loaded(model) => {
                log::info!(
                    "loaded {} ({} triangles)",
                    model.path.display(),
                    model.mesh.triangle_count()
                );
                self.models.push(model);
            }
            LoadEvent::Failed { slot, path, error } => {
                log::error!("model {slot} ({}) failed to load: {error}", path.display());
                self.failures.push((path, error.to_string()));
            }
        }
    }

    /// Every sender is gone, so slots still pending will never report.
    fn abandon_pending(&mut self) {
        for slot in 0..self.pending.len() {
            if let Some(path) = self.pending[slot].take() {
                log::error!("model {slot} ({}) worker exited without a result", path.display());
                self.resolved += 1;
                self.failures
                    .push((path, "loader exited without a result".to_string()));
            }
        }
    }

    fn take_models(&mut self) -> Vec<LoadedModel> {
        self.delivered = true;
        let mut models = std::mem::take(&mut self.models);
        models.sort_by_key(|m| m.slot);
        models
    }

    /// Drains finished loads without blocking. Returns the loaded models exactly
    /// once, on the call where the last load resolves.
    pub fn poll(&mut self) -> Option<Vec<LoadedModel>> {
        if self.delivered {
            return None;
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => self.record(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.abandon_pending();
                    break;
                }
            }
        }

        if self.is_complete() {
            Some(self.take_models())
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved >= self.pending.len()
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.resolved, self.pending.len())
    }

    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    struct StubLoader;

    impl ModelLoader for StubLoader {
        fn load(&self, path: &Path) -> AssetResult<TriangleMesh> {
            let name = path.to_string_lossy();
            if name.contains("broken") {
                return Err(AssetError::Empty);
            }
            if name.contains("slow") {
                thread::sleep(Duration::from_millis(30));
            }
            if name.contains("crash") {
                panic!("loader crashed on {name}");
            }
            parse_obj(TRIANGLE)
        }
    }

    fn batch(names: &[&str]) -> ModelBatch {
        ModelBatch::spawn(
            names.iter().map(PathBuf::from).collect(),
            Arc::new(StubLoader),
        )
    }

    fn resolve(b: &mut ModelBatch) -> Vec<LoadedModel> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(models) = b.poll() {
                return models;
            }
            assert!(Instant::now() < deadline, "batch never resolved");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_failure_does_not_block_other_loads() {
        let models = resolve(&mut batch(&["a.obj", "broken.obj", "slow.obj", "d.obj"]));
        let slots: Vec<usize> = models.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![0, 2, 3]);
    }

    #[test]
    fn test_poll_delivers_once_after_all_resolve() {
        let mut b = batch(&["slow.obj", "broken.obj"]);
        let models = resolve(&mut b);

        assert_eq!(models.len(), 1);
        assert_eq!(b.failures().len(), 1);
        assert_eq!(b.progress(), (2, 2));
        assert!(b.poll().is_none());
    }

    #[test]
    fn test_panicking_loader_counts_as_failure() {
        let mut b = batch(&["a.obj", "crash.obj"]);
        let models = resolve(&mut b);

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].slot, 0);
        assert_eq!(b.progress(), (2, 2));
        assert_eq!(b.failures().len(), 1);
        assert_eq!(b.failures()[0].0, PathBuf::from("crash.obj"));
    }

    #[test]
    fn test_disconnected_channel_resolves_pending_slots() {
        let (tx, rx) = channel::unbounded::<LoadEvent>();
        let mut b = ModelBatch {
            rx,
            pending: vec![Some(PathBuf::from("a.obj")), Some(PathBuf::from("b.obj"))],
            resolved: 0,
            models: Vec::new(),
            failures: Vec::new(),
            delivered: false,
        };
        let mesh = parse_obj(TRIANGLE).unwrap();
        tx.send(LoadEvent::Loaded(LoadedModel {
            slot: 0,
            path: PathBuf::from("a.obj"),
            mesh,
        }))
        .unwrap();
        drop(tx);

        let models = b.poll().expect("batch resolves once every sender is gone");
        assert_eq!(models.len(), 1);
        assert_eq!(b.failures().len(), 1);
        assert_eq!(b.failures()[0].0, PathBuf::from("b.obj"));
    }

    #[test]
    fn test_dropping_batch_does_not_wait_for_workers() {
        let b = batch(&["slow.obj", "slow2.obj"]);
        let start = Instant::now();
        drop(b);
        assert!(start.elapsed() < Duration::from_millis(25));
    }

    #[test]
    fn test_empty_batch_is_immediately_complete() {
        let mut b = batch(&[]);
        assert!(b.is_complete());
        assert_eq!(b.poll().map(|m| m.len()), Some(0));
    }

    #[test]
    fn test_file_loader_rejects_unknown_extensions() {
        let loader = FileModelLoader;
        assert!(matches!(
            loader.load(Path::new("notes.txt")),
            Err(AssetError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            loader.load(Path::new("README")),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_loader_missing_files_are_io_errors() {
        for path in ["definitely/not/here.obj", "definitely/not/here.fbx"] {
            let err = FileModelLoader.load(Path::new(path)).unwrap_err();
            assert!(matches!(err, AssetError::Io(_)), "{path}: {err}");
        }
    }
}
