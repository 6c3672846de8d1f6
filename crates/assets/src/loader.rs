use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::import::load_model_file;
use crate::model::Model;
use crate::AssetError;

/// Resolution state of an asynchronous model load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Ready(Arc<Model>),
    Failed(String),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The model, once it has arrived.
    pub fn model(&self) -> Option<&Arc<Model>> {
        match self {
            Self::Ready(model) => Some(model),
            _ => None,
        }
    }
}

/// A model load in flight.
///
/// Owned by the update thread. Call `poll` once per frame; the state only
/// changes during a poll.
#[derive(Debug)]
pub struct LoadHandle {
    path: PathBuf,
    state: LoadState,
    receiver: Option<Receiver<Result<Model, AssetError>>>,
}

impl LoadHandle {
    /// Handle that resolves when a result arrives on `receiver`.
    pub fn from_receiver(
        path: impl Into<PathBuf>,
        receiver: Receiver<Result<Model, AssetError>>,
    ) -> Self {
        Self {
            path: path.into(),
            state: LoadState::Pending,
            receiver: Some(receiver),
        }
    }

    /// Handle that is already resolved to `model`.
    pub fn ready(path: impl Into<PathBuf>, model: Model) -> Self {
        Self {
            path: path.into(),
            state: LoadState::Ready(Arc::new(model)),
            receiver: None,
        }
    }

    /// Handle that is already failed.
    pub fn failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: LoadState::Failed(reason.into()),
            receiver: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Pick up a finished load, if any, and return the current state.
    ///
    /// A loader that hangs up without sending resolves to `Failed`.
    pub fn poll(&mut self) -> &LoadState {
        if let Some(receiver) = &self.receiver {
            let resolved = match receiver.try_recv() {
                Ok(Ok(model)) => Some(LoadState::Ready(Arc::new(model))),
                Ok(Err(e)) => Some(LoadState::Failed(e.to_string())),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    Some(LoadState::Failed("loader exited without a result".into()))
                }
            };
            if let Some(state) = resolved {
                match &state {
                    LoadState::Ready(_) => {
                        tracing::debug!(path = %self.path.display(), "model ready");
                    }
                    LoadState::Failed(reason) => {
                        tracing::warn!(path = %self.path.display(), %reason, "model load failed");
                    }
                    LoadState::Pending => {}
                }
                self.state = state;
                self.receiver = None;
            }
        }
        &self.state
    }
}

/// Capability to fetch a model by path.
pub trait ModelLoader {
    fn load(&self, path: &Path) -> LoadHandle;
}

/// Reads and parses model files on a background thread per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadedLoader;

impl ThreadedLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelLoader for ThreadedLoader {
    fn load(&self, path: &Path) -> LoadHandle {
        let (tx, rx) = mpsc::channel();
        let owned = path.to_path_buf();
        let spawned = std::thread::Builder::new()
            .name(format!("model-load:{}", path.display()))
            .spawn(move || {
                // The handle may have been dropped already; nothing to report to.
                let _ = tx.send(load_model_file(&owned));
            });
        match spawned {
            Ok(_) => LoadHandle::from_receiver(path, rx),
            Err(e) => LoadHandle::failed(path, format!("could not start loader thread: {e}")),
        }
    }
}

/// Resolves every request immediately with a placeholder box.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveLoader {
    pub base_color: [f32; 4],
}

impl Default for PrimitiveLoader {
    fn default() -> Self {
        Self {
            base_color: Model::DEFAULT_COLOR,
        }
    }
}

impl ModelLoader for PrimitiveLoader {
    fn load(&self, path: &Path) -> LoadHandle {
        let name = path
            .parent()
            .and_then(|p| p.file_name())
            .or_else(|| path.file_stem())
            .and_then(|n| n.to_str())
            .unwrap_or("primitive");
        LoadHandle::ready(path, Model::placeholder(name, self.base_color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_resolved(handle: &mut LoadHandle) -> LoadState {
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.poll().is_pending() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        handle.state().clone()
    }

    #[test]
    fn pending_until_result_arrives() {
        let (tx, rx) = mpsc::channel();
        let mut handle = LoadHandle::from_receiver("boat.gltf", rx);
        assert!(handle.poll().is_pending());

        tx.send(Ok(Model::placeholder("boat", Model::DEFAULT_COLOR)))
            .unwrap();
        assert_eq!(handle.poll().model().unwrap().name, "boat");
    }

    #[test]
    fn error_result_becomes_failed() {
        let (tx, rx) = mpsc::channel();
        let mut handle = LoadHandle::from_receiver("boat.gltf", rx);
        tx.send(Err(AssetError::Io(std::io::Error::other("broken"))))
            .unwrap();
        assert!(matches!(handle.poll(), LoadState::Failed(r) if r.contains("broken")));
    }

    #[test]
    fn hung_up_loader_becomes_failed() {
        let (tx, rx) = mpsc::channel::<Result<Model, AssetError>>();
        let mut handle = LoadHandle::from_receiver("boat.gltf", rx);
        drop(tx);
        assert!(matches!(handle.poll(), LoadState::Failed(_)));
    }

    #[test]
    fn resolved_state_is_sticky() {
        let mut handle = LoadHandle::failed("x.gltf", "nope");
        handle.poll();
        handle.poll();
        assert_eq!(handle.state(), &LoadState::Failed("nope".into()));
    }

    #[test]
    fn threaded_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trash.gltf");
        std::fs::write(&path, r#"{ "asset": { "version": "2.0" } }"#).unwrap();

        let mut handle = ThreadedLoader::new().load(&path);
        let state = poll_until_resolved(&mut handle);
        assert_eq!(state.model().unwrap().name, "trash");
    }

    #[test]
    fn threaded_loader_reports_missing_file() {
        let mut handle = ThreadedLoader::new().load(Path::new("/no/such/model.gltf"));
        let state = poll_until_resolved(&mut handle);
        assert!(matches!(state, LoadState::Failed(_)));
    }

    #[test]
    fn primitive_loader_is_immediate() {
        let loader = PrimitiveLoader {
            base_color: [0.0, 1.0, 0.0, 1.0],
        };
        let handle = loader.load(Path::new("assets/boat/scene.gltf"));
        let model = handle.state().model().unwrap();
        assert_eq!(model.name, "boat");
        assert_eq!(model.base_color, [0.0, 1.0, 0.0, 1.0]);
    }
}
