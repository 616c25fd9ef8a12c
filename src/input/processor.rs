//! Converts raw platform events into application commands.
//!
//! The `InputProcessor` owns all transient input state (cursor tracking,
//! held buttons, modifier keys). It is the only thing that sits between raw
//! window events and [`AppContext::execute`](crate::app::AppContext::execute).

use glam::Vec2;

use super::event::{InputEvent, MouseButton};
use crate::app::AppCommand;
use crate::options::KeybindingOptions;

/// Converts raw window events into [`AppCommand`]s.
///
/// ```ignore
/// if let Some(cmd) = input.handle_event(event) {
///     ctx.execute(cmd);
/// }
/// if let Some(cmd) = input.handle_key_press("KeyR", &ctx.options().keybindings) {
///     ctx.execute(cmd);
/// }
/// ```
pub struct InputProcessor {
    /// Last cursor position; `None` until the first move event.
    cursor: Option<Vec2>,
    /// Whether the rotate button (left) is held.
    rotate_held: bool,
    /// Whether a pan button (right or middle) is held.
    pan_held: bool,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
}

impl InputProcessor {
    /// Create a processor with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: None,
            rotate_held: false,
            pan_held: false,
            shift_pressed: false,
        }
    }

    /// Whether any camera drag button is held.
    #[must_use]
    pub fn dragging(&self) -> bool {
        self.rotate_held || self.pan_held
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(
        &self,
        key: &str,
        bindings: &KeybindingOptions,
    ) -> Option<AppCommand> {
        bindings.lookup(key).map(super::KeyAction::to_command)
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<AppCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                match button {
                    MouseButton::Left => self.rotate_held = pressed,
                    MouseButton::Right | MouseButton::Middle => {
                        self.pan_held = pressed;
                    }
                }
                None
            }
            InputEvent::Scroll { delta } => Some(AppCommand::Zoom { delta }),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }

    /// Cursor moved: compute delta, possibly produce a camera command.
    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<AppCommand> {
        let position = Vec2::new(x, y);
        let previous = self.cursor.replace(position)?;
        let delta = position - previous;

        if self.pan_held || (self.rotate_held && self.shift_pressed) {
            return Some(AppCommand::PanCamera { delta });
        }
        if self.rotate_held {
            return Some(AppCommand::RotateCamera { delta });
        }
        None
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BloomSetting;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    #[test]
    fn first_cursor_event_only_records_position() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert_eq!(input.handle_event(moved(10.0, 10.0)), None);
        assert_eq!(
            input.handle_event(moved(14.0, 7.0)),
            Some(AppCommand::RotateCamera {
                delta: Vec2::new(4.0, -3.0)
            })
        );
    }

    #[test]
    fn hover_without_buttons_does_nothing() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        assert_eq!(input.handle_event(moved(50.0, 50.0)), None);
        assert!(!input.dragging());
    }

    #[test]
    fn shift_or_right_drag_pans() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        let _ = input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(matches!(
            input.handle_event(moved(2.0, 0.0)),
            Some(AppCommand::PanCamera { .. })
        ));

        let _ = input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: false,
        });
        let _ = input.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert!(matches!(
            input.handle_event(moved(4.0, 0.0)),
            Some(AppCommand::PanCamera { .. })
        ));
    }

    #[test]
    fn scroll_zooms() {
        let mut input = InputProcessor::new();
        assert_eq!(
            input.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(AppCommand::Zoom { delta: 1.5 })
        );
    }

    #[test]
    fn bound_keys_produce_bloom_adjustments() {
        let input = InputProcessor::new();
        let bindings = KeybindingOptions::default();
        assert_eq!(
            input.handle_key_press("Digit4", &bindings),
            Some(AppCommand::AdjustBloom {
                setting: BloomSetting::Radius,
                delta: super::super::keyboard::BLOOM_KEY_STEP,
            })
        );
        assert_eq!(input.handle_key_press("KeyZ", &bindings), None);
    }
}
