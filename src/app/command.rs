//! The application's interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press or a mouse
//! gesture, is represented as an `AppCommand`. Consumers construct commands
//! and pass them to [`AppContext::execute`](super::AppContext::execute).

use glam::Vec2;

use crate::options::BloomSetting;

/// A single user-facing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Orbit the camera by a cursor delta in pixels.
    RotateCamera {
        /// Cursor movement since the last event.
        delta: Vec2,
    },
    /// Pan the camera by a cursor delta in pixels.
    PanCamera {
        /// Cursor movement since the last event.
        delta: Vec2,
    },
    /// Dolly toward (positive) or away from (negative) the target.
    Zoom {
        /// Wheel delta.
        delta: f32,
    },
    /// Nudge one bloom setting.
    AdjustBloom {
        /// Which setting.
        setting: BloomSetting,
        /// Signed change.
        delta: f32,
    },
    /// Restore default bloom settings.
    ResetBloom,
    /// Flip turntable auto-rotation.
    ToggleAutoRotate,
    /// Persist options to the options file.
    SaveOptions,
}
