/// Window-system independent input events.
///
/// The viewer translates winit events into these (see
/// [`InputEvent::from_window_event`]) and feeds them to an
/// [`InputProcessor`](super::InputProcessor), which turns them into
/// [`AppCommand`](crate::app::AppCommand) values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to an absolute window position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Wheel movement in lines; positive moves the camera closer.
    Scroll {
        /// Lines scrolled.
        delta: f32,
    },
    /// Modifier key state changed.
    ModifiersChanged {
        /// Whether the shift key is held.
        shift: bool,
    },
}

/// Mouse buttons the orbit controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Rotates (pans with shift held).
    Left,
    /// Pans.
    Right,
    /// Pans.
    Middle,
}

/// Trackpad pixels that count as one wheel line.
pub const PIXELS_PER_LINE: f32 = 100.0;

#[cfg(feature = "viewer")]
impl MouseButton {
    /// Map a winit button; back/forward/other buttons are not used.
    #[must_use]
    pub fn from_winit(button: winit::event::MouseButton) -> Option<Self> {
        match button {
            winit::event::MouseButton::Left => Some(Self::Left),
            winit::event::MouseButton::Right => Some(Self::Right),
            winit::event::MouseButton::Middle => Some(Self::Middle),
            _ => None,
        }
    }
}

#[cfg(feature = "viewer")]
impl InputEvent {
    /// Translate a pointer or modifier window event. Returns `None` for
    /// everything else, keyboard input included.
    #[must_use]
    pub fn from_window_event(event: &winit::event::WindowEvent) -> Option<Self> {
        use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

        match event {
            WindowEvent::CursorMoved { position, .. } => Some(Self::CursorMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::MouseInput { button, state, .. } => {
                MouseButton::from_winit(*button).map(|button| Self::MouseButton {
                    button,
                    pressed: *state == ElementState::Pressed,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => {
                        pos.y as f32 / PIXELS_PER_LINE
                    }
                };
                Some(Self::Scroll { delta })
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                Some(Self::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                })
            }
            _ => None,
        }
    }
}

#[cfg(all(test, feature = "viewer"))]
mod tests {
    use super::*;

    #[test]
    fn only_orbit_buttons_map() {
        assert_eq!(
            MouseButton::from_winit(winit::event::MouseButton::Middle),
            Some(MouseButton::Middle)
        );
        assert_eq!(
            MouseButton::from_winit(winit::event::MouseButton::Back),
            None
        );
    }
}
