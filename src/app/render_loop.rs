//! Frame scheduling.
//!
//! The host (a winit event loop) calls [`RenderLoop::tick`] once per redraw
//! and requests the next redraw afterwards. Each tick resolves finished
//! asset loads, advances `u_time`, copies the bloom settings into the bloom
//! pass, steps the orbit controls and renders. A shared `running` flag,
//! reachable through [`ShutdownHandle`], moves the loop to
//! [`LoopState::Terminated`]; later ticks do nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use web_time::Instant;

use super::AppContext;
use crate::camera::Camera;
use crate::renderer::postprocess::BloomParams;
use crate::scene::Scene;
use crate::util::frame_timing::FrameTiming;

/// Log FPS at debug level every this many frames.
const FPS_LOG_INTERVAL: u64 = 300;

/// Source of elapsed time.
pub trait Clock {
    /// Seconds since the clock started. Never decreases.
    fn elapsed(&self) -> f32;
}

/// Wall clock started at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Everything the compositor needs to draw one frame.
pub struct Frame<'a> {
    /// Frame number, starting at 0.
    pub index: u64,
    /// Elapsed seconds (the value written to `u_time`).
    pub elapsed: f32,
    /// The scene graph.
    pub scene: &'a Scene,
    /// Camera after this tick's orbit update.
    pub camera: &'a Camera,
    /// Bloom parameters copied from the settings this tick.
    pub bloom: BloomParams,
    /// Viewport size in physical pixels.
    pub viewport: (u32, u32),
}

/// Renders frames to a surface. Implemented by the GPU renderer and by
/// test doubles.
pub trait Compositor {
    /// Error returned when a frame cannot be rendered.
    type Error: std::fmt::Display;

    /// Render base pass plus bloom to the visible surface.
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;

    /// Resize the surface and every size-dependent render target.
    fn resize(&mut self, width: u32, height: u32);
}

/// Render loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ticking.
    Running,
    /// Shut down; ticks are ignored.
    Terminated,
}

/// Cloneable handle that stops a [`RenderLoop`].
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop the loop. Takes effect at the next tick.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether the loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Drives per-frame updates and rendering.
pub struct RenderLoop<C: Clock = SystemClock> {
    clock: C,
    running: Arc<AtomicBool>,
    frame: u64,
    timing: FrameTiming,
}

impl<C: Clock> RenderLoop<C> {
    /// Create a running loop timed by `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            running: Arc::new(AtomicBool::new(true)),
            frame: 0,
            timing: FrameTiming::new(),
        }
    }

    /// Handle for stopping the loop from elsewhere.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        if self.running.load(Ordering::Acquire) {
            LoopState::Running
        } else {
            LoopState::Terminated
        }
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Run one iteration. Returns the loop state after the tick.
    ///
    /// # Errors
    ///
    /// Returns the compositor's error if rendering fails. The loop stays
    /// running; the host decides whether to recover.
    pub fn tick<R: Compositor>(
        &mut self,
        ctx: &mut AppContext,
        compositor: &mut R,
    ) -> Result<LoopState, R::Error> {
        if self.state() == LoopState::Terminated {
            return Ok(LoopState::Terminated);
        }

        let _ = ctx.update_assets();
        let elapsed = self.clock.elapsed();
        ctx.set_time(elapsed);
        ctx.sync_bloom();
        let _ = ctx.update_controls();

        let frame = Frame {
            index: self.frame,
            elapsed,
            scene: ctx.scene(),
            camera: ctx.camera(),
            bloom: ctx.bloom_params(),
            viewport: ctx.viewport(),
        };
        let result = compositor.render(&frame);
        ctx.scene_mut().mark_rendered();

        self.frame += 1;
        self.timing.record(elapsed);
        if self.frame % FPS_LOG_INTERVAL == 0 {
            log::debug!("frame {}: {:.1} fps", self.frame, self.timing.fps());
        }

        result.map(|()| LoopState::Running)
    }
}

/// Apply a viewport resize to the camera and the compositor. Zero-sized
/// events (minimized windows) are ignored. Returns whether it was applied.
pub fn handle_resize<R: Compositor>(
    ctx: &mut AppContext,
    compositor: &mut R,
    width: u32,
    height: u32,
) -> bool {
    if !ctx.resize(width, height) {
        return false;
    }
    compositor.resize(width, height);
    true
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::assets::{AssetEvent, AssetKey};
    use crate::error::AppError;
    use crate::options::{BloomSetting, Options};

    /// Clock whose time is set by the test.
    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<f32>>);

    impl ManualClock {
        fn set(&self, seconds: f32) {
            self.0.set(seconds);
        }
    }

    impl Clock for ManualClock {
        fn elapsed(&self) -> f32 {
            self.0.get()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Observed {
        u_time: f32,
        elapsed: f32,
        bloom: BloomParams,
        aspect: f32,
        particles: usize,
    }

    /// Compositor that records what it was asked to draw.
    #[derive(Default)]
    struct RecordingCompositor {
        frames: Vec<Observed>,
        sizes: Vec<(u32, u32)>,
        fail_next: bool,
    }

    impl Compositor for RecordingCompositor {
        type Error = String;

        fn render(&mut self, frame: &Frame<'_>) -> Result<(), String> {
            if std::mem::take(&mut self.fail_next) {
                return Err("surface lost".to_owned());
            }
            let field = frame.scene.particles(crate::scene::SceneHandles::PARTICLES);
            self.frames.push(Observed {
                u_time: field.map_or(-1.0, |f| f.material.time()),
                elapsed: frame.elapsed,
                bloom: frame.bloom,
                aspect: frame.camera.aspect,
                particles: field.map_or(0, crate::scene::ParticleField::len),
            });
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    fn setup() -> (AppContext, RenderLoop<ManualClock>, ManualClock) {
        let ctx = AppContext::new(
            Options::default(),
            (1280, 720),
            &mut StdRng::seed_from_u64(11),
        );
        let clock = ManualClock::default();
        (ctx, RenderLoop::new(clock.clone()), clock)
    }

    #[test]
    fn default_scenario() {
        let (mut ctx, mut render_loop, clock) = setup();
        let mut compositor = RecordingCompositor::default();

        clock.set(0.0);
        let state = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(state, LoopState::Running);
        assert_eq!(compositor.frames[0].u_time, 0.0);
        assert_eq!(compositor.frames[0].bloom.strength, 0.8);

        clock.set(0.016);
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(compositor.frames[1].u_time, 0.016);

        assert!(handle_resize(&mut ctx, &mut compositor, 800, 600));
        assert!((ctx.camera().aspect - 1.3333).abs() < 1e-4);
        assert_eq!(compositor.sizes, vec![(800, 600)]);

        let _ = ctx.set_bloom(BloomSetting::Radius, 2.0);
        clock.set(0.032);
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(compositor.frames[2].bloom.radius, 2.0);
        assert_eq!(compositor.frames[2].aspect, 800.0 / 600.0);
    }

    #[test]
    fn u_time_follows_clock() {
        let (mut ctx, mut render_loop, clock) = setup();
        let mut compositor = RecordingCompositor::default();
        for t in [0.5, 1.25, 3.0] {
            clock.set(t);
            let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        }
        let times: Vec<f32> =
            compositor.frames.iter().map(|f| f.u_time).collect();
        assert_eq!(times, vec![0.5, 1.25, 3.0]);
        assert!(compositor.frames.iter().all(|f| f.u_time == f.elapsed));
    }

    #[test]
    fn particle_count_is_stable() {
        let (mut ctx, mut render_loop, clock) = setup();
        let mut compositor = RecordingCompositor::default();
        for (i, (w, h)) in [(320, 200), (1920, 1080)].into_iter().enumerate() {
            let _ = handle_resize(&mut ctx, &mut compositor, w, h);
            let _ = ctx.set_bloom(BloomSetting::Strength, i as f32 * 5.0);
            clock.set(i as f32);
            let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        }
        assert!(compositor.frames.iter().all(|f| f.particles == 2000));
    }

    #[test]
    fn many_resizes_leave_last_aspect() {
        let (mut ctx, _, _) = setup();
        let mut compositor = RecordingCompositor::default();
        for (w, h) in [(100, 100), (0, 50), (1600, 900), (333, 777)] {
            let _ = handle_resize(&mut ctx, &mut compositor, w, h);
        }
        assert_eq!(ctx.camera().aspect, 333.0 / 777.0);
        assert_eq!(compositor.sizes.len(), 3);
    }

    #[test]
    fn shutdown_terminates_loop() {
        let (mut ctx, mut render_loop, _) = setup();
        let mut compositor = RecordingCompositor::default();
        let handle = render_loop.shutdown_handle();
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();

        handle.request_shutdown();
        assert!(!handle.is_running());
        assert_eq!(render_loop.state(), LoopState::Terminated);
        let state = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(state, LoopState::Terminated);
        assert_eq!(compositor.frames.len(), 1);
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn render_error_keeps_loop_running() {
        let (mut ctx, mut render_loop, clock) = setup();
        let mut compositor = RecordingCompositor {
            fail_next: true,
            ..Default::default()
        };
        assert!(render_loop.tick(&mut ctx, &mut compositor).is_err());
        assert_eq!(render_loop.state(), LoopState::Running);
        clock.set(1.0);
        assert!(render_loop.tick(&mut ctx, &mut compositor).is_ok());
        assert_eq!(compositor.frames.len(), 1);
    }

    #[test]
    fn failed_asset_does_not_stop_rendering() {
        let (mut ctx, mut render_loop, _) = setup();
        let mut compositor = RecordingCompositor::default();
        ctx.resolve_asset(AssetEvent {
            key: AssetKey::Model,
            path: "missing.glb".into(),
            result: Err(AppError::Io(std::io::ErrorKind::NotFound.into())),
        });
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(compositor.frames.len(), 2);
    }

    #[test]
    fn missing_assets_resolve_failed_through_tick() {
        use std::time::{Duration, Instant};

        use crate::scene::{AssetSlot, SceneHandles};

        let mut options = Options::default();
        options.assets.particle_texture = "no/such/particle.png".into();
        options.assets.model_texture = "no/such/baked.jpg".into();
        options.assets.model = "no/such/astronaut.glb".into();
        let mut ctx =
            AppContext::new(options, (640, 480), &mut StdRng::seed_from_u64(3));
        ctx.start_loading().unwrap();

        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock.clone());
        let mut compositor = RecordingCompositor::default();
        let model_pending = |ctx: &AppContext| {
            ctx.scene()
                .model(SceneHandles::MODEL)
                .is_none_or(|node| node.geometry.is_pending())
        };

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut ticks = 0;
        while model_pending(&ctx) && Instant::now() < deadline {
            ticks += 1;
            clock.set(ticks as f32 * 0.016);
            let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }

        let node = ctx.scene().model(SceneHandles::MODEL).unwrap();
        assert!(matches!(node.geometry, AssetSlot::Failed(_)));
        assert_eq!(render_loop.state(), LoopState::Running);
        let _ = render_loop.tick(&mut ctx, &mut compositor).unwrap();
        assert_eq!(compositor.frames.len(), ticks + 1);
    }
}
