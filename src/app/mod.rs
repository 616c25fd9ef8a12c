//! Application context and render loop.
//!
//! [`AppContext`] owns everything the frame timeline mutates: options and
//! live bloom settings, the scene graph, the camera with its orbit controls
//! and the asset loader. It is created once at start-up and handed to the
//! [`RenderLoop`], the resize handler and the input path; nothing is global.

mod command;
/// Frame scheduling, clock and compositor seams.
pub mod render_loop;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use command::AppCommand;
use rand::Rng;
pub use render_loop::{
    handle_resize, Clock, Compositor, Frame, LoopState, RenderLoop,
    ShutdownHandle, SystemClock,
};

use crate::assets::{
    AssetEvent, AssetKey, AssetLoader, AssetPayload, TextureOptions,
};
use crate::camera::{Camera, OrbitControls};
use crate::error::AppError;
use crate::options::{AssetOptions, BloomSetting, BloomSettings, Options};
use crate::renderer::postprocess::BloomParams;
use crate::scene::{compose_scene, AssetSlot, Scene, SceneHandles};

/// Options file written by [`AppCommand::SaveOptions`] when none was given.
pub const DEFAULT_OPTIONS_PATH: &str = "astrobloom.toml";

/// Mutable application state shared by the render loop, resize handler and
/// input path.
pub struct AppContext {
    options: Options,
    options_path: Option<PathBuf>,
    scene: Scene,
    handles: SceneHandles,
    camera: Camera,
    orbit: OrbitControls,
    bloom: BloomParams,
    viewport: (u32, u32),
    loader: Option<AssetLoader>,
}

impl AppContext {
    /// Build the scene and camera for a viewport of the given size. Assets
    /// are not requested until [`start_loading`](Self::start_loading).
    pub fn new<R: Rng + ?Sized>(
        options: Options,
        viewport: (u32, u32),
        rng: &mut R,
    ) -> Self {
        let viewport = (viewport.0.max(1), viewport.1.max(1));
        let (scene, handles) = compose_scene(&options, rng);
        let camera = Camera::from_options(
            &options.camera,
            viewport.0 as f32 / viewport.1 as f32,
        );
        let orbit = OrbitControls::from_options(&options.camera);
        let bloom = BloomParams::from_settings(&options.bloom);
        Self {
            options,
            options_path: None,
            scene,
            handles,
            camera,
            orbit,
            bloom,
            viewport,
            loader: None,
        }
    }

    /// Remember where options came from so saves go back to the same file.
    #[must_use]
    pub fn with_options_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_path = Some(path.into());
        self
    }

    /// Spawn the loader thread and request the particle sprite, the model
    /// texture and the model.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ThreadSpawn`] if the loader thread cannot start.
    pub fn start_loading(&mut self) -> Result<(), AppError> {
        let mut loader = AssetLoader::new()?;
        for (key, path, flags) in texture_requests(&self.options.assets) {
            loader.load_texture(key, path, flags);
        }
        loader.load_model(AssetKey::Model, &self.options.assets.model);
        self.loader = Some(loader);
        Ok(())
    }

    // -- Accessors --

    /// Current options (bloom settings included).
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene graph.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Ids of the composed nodes.
    #[must_use]
    pub fn handles(&self) -> SceneHandles {
        self.handles
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Orbit controls.
    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    /// Current viewport size in physical pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Bloom parameters as of the last tick.
    #[must_use]
    pub fn bloom_params(&self) -> BloomParams {
        self.bloom
    }

    /// Current `u_time` of the particle shader.
    #[must_use]
    pub fn particle_time(&self) -> f32 {
        self.scene
            .particles(SceneHandles::PARTICLES)
            .map_or(0.0, |field| field.material.time())
    }

    // -- Settings --

    /// Live bloom settings. Read by the render loop once per tick.
    #[must_use]
    pub fn settings(&self) -> &BloomSettings {
        &self.options.bloom
    }

    /// Mutable bloom settings. Out-of-range values are clamped when the
    /// render loop copies them into the bloom pass.
    pub fn settings_mut(&mut self) -> &mut BloomSettings {
        &mut self.options.bloom
    }

    /// Set one bloom setting, clamped to its range. Returns the stored
    /// value.
    pub fn set_bloom(&mut self, setting: BloomSetting, value: f32) -> f32 {
        let stored = self.options.bloom.set(setting, value);
        log::info!("bloom {setting:?} = {stored:.2}");
        stored
    }

    // -- Resize --

    /// Apply a viewport resize to the camera. Zero-sized events are
    /// ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.camera.set_viewport(width, height) {
            return false;
        }
        self.viewport = (width, height);
        true
    }

    // -- Commands --

    /// Apply a command from the input path.
    pub fn execute(&mut self, command: AppCommand) {
        match command {
            AppCommand::RotateCamera { delta } => {
                self.orbit.rotate(delta, self.viewport.1);
            }
            AppCommand::PanCamera { delta } => {
                self.orbit.pan(delta, self.viewport.1, &self.camera);
            }
            AppCommand::Zoom { delta } => self.orbit.zoom(delta),
            AppCommand::AdjustBloom { setting, delta } => {
                let stored = self.options.bloom.adjust(setting, delta);
                log::info!("bloom {setting:?} = {stored:.2}");
            }
            AppCommand::ResetBloom => {
                self.options.bloom = BloomSettings::default();
                log::info!("bloom settings reset");
            }
            AppCommand::ToggleAutoRotate => {
                self.orbit.auto_rotate = !self.orbit.auto_rotate;
                self.options.camera.auto_rotate = self.orbit.auto_rotate;
                log::info!("auto-rotate {}", self.orbit.auto_rotate);
            }
            AppCommand::SaveOptions => {
                if let Err(e) = self.save_options() {
                    log::error!("failed to save options: {e}");
                }
            }
        }
    }

    /// Write the current options to the options file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] or [`AppError::OptionsParse`] on failure.
    pub fn save_options(&self) -> Result<(), AppError> {
        let path = self
            .options_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OPTIONS_PATH));
        self.options.save(path)?;
        log::info!("saved options to {}", path.display());
        Ok(())
    }

    // -- Per-tick update steps --

    /// Resolve every completed asset load into the scene graph. Returns the
    /// number of events applied.
    pub fn update_assets(&mut self) -> usize {
        let Some(loader) = self.loader.as_mut() else {
            return 0;
        };
        let events = loader.poll();
        let count = events.len();
        for event in events {
            self.resolve_asset(event);
        }
        count
    }

    /// Resolve one completed load: the target slot becomes ready or failed.
    pub fn resolve_asset(&mut self, event: AssetEvent) {
        let AssetEvent { key, path, result } = event;
        let slot = match result {
            Ok(payload) => {
                log::info!("loaded {key:?} from {}", path.display());
                Ok(payload)
            }
            Err(e) => {
                log::warn!("failed to load {key:?} from {}: {e}", path.display());
                Err(e.to_string())
            }
        };

        match (key, slot) {
            (AssetKey::ParticleTexture, slot) => {
                if let Some(field) =
                    self.scene.particles_mut(SceneHandles::PARTICLES)
                {
                    field.material.texture = texture_slot(slot);
                }
            }
            (AssetKey::ModelTexture, slot) => {
                if let Some(model) = self.scene.model_mut(SceneHandles::MODEL) {
                    model.material.map = texture_slot(slot);
                }
            }
            (AssetKey::Model, slot) => {
                if let Some(model) = self.scene.model_mut(SceneHandles::MODEL) {
                    model.geometry = match slot {
                        Ok(AssetPayload::Model(data)) => {
                            for mesh in &data.meshes {
                                log::debug!(
                                    "mesh '{}' uses the shared model material",
                                    mesh.name
                                );
                            }
                            AssetSlot::Ready(Arc::new(data))
                        }
                        Ok(AssetPayload::Texture(_)) => {
                            AssetSlot::Failed("expected a model".to_owned())
                        }
                        Err(reason) => AssetSlot::Failed(reason),
                    };
                }
            }
        }
    }

    /// Push elapsed seconds into the particle shader's `u_time`.
    pub fn set_time(&mut self, elapsed: f32) {
        if let Some(field) = self.scene.particles_mut(SceneHandles::PARTICLES)
        {
            field.material.set_time(elapsed);
        }
    }

    /// Copy the live settings into the bloom pass parameters.
    pub fn sync_bloom(&mut self) {
        self.bloom = BloomParams::from_settings(&self.options.bloom);
    }

    /// Advance the orbit controls by one step.
    pub fn update_controls(&mut self) -> bool {
        self.orbit.update(&mut self.camera)
    }
}

/// Texture loads issued at start-up. The sprite is linear; the baked
/// model texture is sRGB with glTF's top-left UV origin.
fn texture_requests(
    assets: &AssetOptions,
) -> [(AssetKey, &str, TextureOptions); 2] {
    [
        (
            AssetKey::ParticleTexture,
            assets.particle_texture.as_str(),
            TextureOptions::sprite(),
        ),
        (
            AssetKey::ModelTexture,
            assets.model_texture.as_str(),
            TextureOptions::gltf_baked(),
        ),
    ]
}

fn texture_slot(
    slot: Result<AssetPayload, String>,
) -> AssetSlot<crate::assets::TextureData> {
    match slot {
        Ok(AssetPayload::Texture(texture)) => AssetSlot::Ready(Arc::new(texture)),
        Ok(AssetPayload::Model(_)) => {
            AssetSlot::Failed("expected a texture".to_owned())
        }
        Err(reason) => AssetSlot::Failed(reason),
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::assets::{ModelData, TextureData};

    fn context() -> AppContext {
        AppContext::new(
            Options::default(),
            (1024, 768),
            &mut StdRng::seed_from_u64(9),
        )
    }

    #[test]
    fn set_bloom_clamps() {
        let mut ctx = context();
        assert_eq!(ctx.set_bloom(BloomSetting::Strength, 12.0), 10.0);
        assert_eq!(ctx.set_bloom(BloomSetting::Threshold, -1.0), 0.0);
        assert_eq!(ctx.settings().strength, 10.0);
    }

    #[test]
    fn sprite_loads_linear_and_model_texture_srgb() {
        use crate::assets::ColorSpace;

        let assets = AssetOptions::default();
        let requests = texture_requests(&assets);
        let flags = |key| {
            requests
                .iter()
                .find(|(k, _, _)| *k == key)
                .map(|&(_, _, flags)| flags)
                .unwrap()
        };
        let sprite = flags(AssetKey::ParticleTexture);
        assert_eq!(sprite.color_space, ColorSpace::Linear);
        assert!(sprite.flip_y);
        let baked = flags(AssetKey::ModelTexture);
        assert_eq!(baked.color_space, ColorSpace::Srgb);
        assert!(!baked.flip_y);
    }

    #[test]
    fn set_time_reaches_particle_material() {
        let mut ctx = context();
        assert_eq!(ctx.particle_time(), 0.0);
        ctx.set_time(1.25);
        assert_eq!(ctx.particle_time(), 1.25);
    }

    #[test]
    fn settings_mut_is_clamped_on_sync() {
        let mut ctx = context();
        ctx.settings_mut().radius = 50.0;
        ctx.sync_bloom();
        assert_eq!(ctx.bloom_params().radius, 10.0);
    }

    #[test]
    fn key_commands_adjust_and_reset_bloom() {
        let mut ctx = context();
        ctx.execute(AppCommand::AdjustBloom {
            setting: BloomSetting::Strength,
            delta: 0.1,
        });
        assert!((ctx.settings().strength - 0.9).abs() < 1e-6);
        ctx.execute(AppCommand::AdjustBloom {
            setting: BloomSetting::Radius,
            delta: 20.0,
        });
        assert_eq!(ctx.settings().radius, 10.0);
        ctx.execute(AppCommand::ResetBloom);
        assert_eq!(*ctx.settings(), BloomSettings::default());
    }

    #[test]
    fn toggle_auto_rotate() {
        let mut ctx = context();
        ctx.execute(AppCommand::ToggleAutoRotate);
        assert!(!ctx.orbit_mut().auto_rotate);
        assert!(!ctx.options().camera.auto_rotate);
    }

    #[test]
    fn camera_commands_move_camera_after_update() {
        let mut ctx = context();
        ctx.orbit_mut().auto_rotate = false;
        ctx.orbit_mut().enable_damping = false;
        let eye = ctx.camera().eye;
        ctx.execute(AppCommand::RotateCamera {
            delta: Vec2::new(40.0, 0.0),
        });
        assert!(ctx.update_controls());
        assert_ne!(ctx.camera().eye, eye);
    }

    #[test]
    fn resize_ignores_zero() {
        let mut ctx = context();
        assert!(!ctx.resize(0, 0));
        assert_eq!(ctx.viewport(), (1024, 768));
        assert!(ctx.resize(800, 600));
        assert_eq!(ctx.camera().aspect, 800.0 / 600.0);
    }

    #[test]
    fn resolved_assets_fill_slots() {
        let mut ctx = context();
        ctx.resolve_asset(AssetEvent {
            key: AssetKey::ParticleTexture,
            path: "particle.png".into(),
            result: Ok(AssetPayload::Texture(TextureData::white())),
        });
        ctx.resolve_asset(AssetEvent {
            key: AssetKey::Model,
            path: "astronaut.glb".into(),
            result: Ok(AssetPayload::Model(ModelData::default())),
        });
        let scene = ctx.scene();
        let field = scene.particles(SceneHandles::PARTICLES).unwrap();
        assert!(field.material.texture.ready().is_some());
        let model = scene.model(SceneHandles::MODEL).unwrap();
        assert!(model.geometry.ready().is_some());
        assert!(model.material.map.is_pending());
    }

    #[test]
    fn failed_model_is_marked_failed() {
        let mut ctx = context();
        ctx.resolve_asset(AssetEvent {
            key: AssetKey::Model,
            path: "missing.glb".into(),
            result: Err(AppError::MissingPositions("hull".to_owned())),
        });
        let model = ctx.scene().model(SceneHandles::MODEL).unwrap();
        assert!(model.geometry.failure().unwrap().contains("hull"));
        let id = ctx.handles().model;
        assert!(!ctx.scene().node(id).unwrap().is_drawable());
    }

    #[test]
    fn mismatched_payload_fails_slot() {
        let mut ctx = context();
        ctx.resolve_asset(AssetEvent {
            key: AssetKey::ModelTexture,
            path: "baked.jpg".into(),
            result: Ok(AssetPayload::Model(ModelData::default())),
        });
        let model = ctx.scene().model(SceneHandles::MODEL).unwrap();
        assert!(model.material.map.failure().is_some());
    }

    #[test]
    fn save_options_writes_to_options_path() {
        let path = std::env::temp_dir().join(format!(
            "astrobloom-ctx-{}/saved.toml",
            std::process::id()
        ));
        let mut ctx = context().with_options_path(&path);
        let _ = ctx.set_bloom(BloomSetting::Radius, 3.0);
        ctx.execute(AppCommand::SaveOptions);
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.bloom.radius, 3.0);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
