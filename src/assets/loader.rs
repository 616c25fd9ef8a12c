//! Background asset loader.
//!
//! File reads and decoding run on a dedicated worker thread. Requests are
//! fire-and-forget; completions come back as [`AssetEvent`]s that the main
//! thread drains with [`AssetLoader::poll`] without blocking.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use super::model::{load_model, ModelData};
use super::texture::{load_texture, TextureData, TextureOptions};
use crate::error::AppError;

/// Which scene slot an asset fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    /// Sprite sampled by the particle material.
    ParticleTexture,
    /// Baked texture shared by every model mesh.
    ModelTexture,
    /// The model geometry.
    Model,
}

/// Decoded asset.
#[derive(Debug)]
pub enum AssetPayload {
    /// RGBA8 texture.
    Texture(TextureData),
    /// Imported model.
    Model(ModelData),
}

/// Completion of one load request.
#[derive(Debug)]
pub struct AssetEvent {
    /// Slot the request was made for.
    pub key: AssetKey,
    /// Requested path.
    pub path: PathBuf,
    /// Decoded asset or the reason it failed.
    pub result: Result<AssetPayload, AppError>,
}

enum AssetRequest {
    Texture {
        key: AssetKey,
        path: PathBuf,
        options: TextureOptions,
    },
    Model {
        key: AssetKey,
        path: PathBuf,
    },
    Shutdown,
}

/// Worker thread that reads and decodes assets off the main thread.
pub struct AssetLoader {
    request_tx: mpsc::Sender<AssetRequest>,
    event_rx: mpsc::Receiver<AssetEvent>,
    thread: Option<std::thread::JoinHandle<()>>,
    in_flight: usize,
}

impl AssetLoader {
    /// Spawn the loader thread.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ThreadSpawn`] if the thread fails to spawn.
    pub fn new() -> Result<Self, AppError> {
        let (request_tx, request_rx) = mpsc::channel::<AssetRequest>();
        let (event_tx, event_rx) = mpsc::channel::<AssetEvent>();

        let thread = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || Self::thread_loop(&request_rx, &event_tx))
            .map_err(AppError::ThreadSpawn)?;

        Ok(Self {
            request_tx,
            event_rx,
            thread: Some(thread),
            in_flight: 0,
        })
    }

    /// Queue a texture load.
    pub fn load_texture(
        &mut self,
        key: AssetKey,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) {
        let path = path.as_ref().to_path_buf();
        log::info!("loading texture {}", path.display());
        self.send(AssetRequest::Texture { key, path, options });
    }

    /// Queue a model load.
    pub fn load_model(&mut self, key: AssetKey, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        log::info!("loading model {}", path.display());
        self.send(AssetRequest::Model { key, path });
    }

    /// Number of requests that have not completed yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Drain all completed loads (non-blocking).
    pub fn poll(&mut self) -> Vec<AssetEvent> {
        let events: Vec<AssetEvent> = self.event_rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    /// Block up to `timeout` for the next completion.
    pub fn wait(&mut self, timeout: Duration) -> Option<AssetEvent> {
        let event = self.event_rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Shut down the background thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(AssetRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn send(&mut self, request: AssetRequest) {
        if self.request_tx.send(request).is_ok() {
            self.in_flight += 1;
        } else {
            log::error!("asset loader thread is gone; request dropped");
        }
    }

    fn thread_loop(
        request_rx: &mpsc::Receiver<AssetRequest>,
        event_tx: &mpsc::Sender<AssetEvent>,
    ) {
        while let Ok(request) = request_rx.recv() {
            let event = match request {
                AssetRequest::Shutdown => break,
                AssetRequest::Texture { key, path, options } => {
                    let result =
                        load_texture(&path, options).map(AssetPayload::Texture);
                    AssetEvent { key, path, result }
                }
                AssetRequest::Model { key, path } => {
                    let result = load_model(&path).map(AssetPayload::Model);
                    AssetEvent { key, path, result }
                }
            };
            if event_tx.send(event).is_err() {
                break;
            }
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::model::tests::TRIANGLE_GLTF;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "astrobloom-loader-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_model_in_background() {
        let dir = scratch_dir("model");
        let path = dir.join("tri.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let mut loader = AssetLoader::new().unwrap();
        loader.load_model(AssetKey::Model, &path);
        assert_eq!(loader.pending(), 1);

        let event = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(event.key, AssetKey::Model);
        match event.result.unwrap() {
            AssetPayload::Model(model) => assert_eq!(model.meshes.len(), 1),
            AssetPayload::Texture(_) => panic!("expected a model"),
        }
        assert_eq!(loader.pending(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_texture_reports_failure() {
        let mut loader = AssetLoader::new().unwrap();
        loader.load_texture(
            AssetKey::ParticleTexture,
            "does/not/exist.png",
            TextureOptions::default(),
        );
        let event = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(event.key, AssetKey::ParticleTexture);
        assert!(matches!(event.result, Err(AppError::Io(_))));
    }

    #[test]
    fn poll_without_requests_is_empty() {
        let mut loader = AssetLoader::new().unwrap();
        assert!(loader.poll().is_empty());
        loader.shutdown();
        loader.shutdown();
    }
}
