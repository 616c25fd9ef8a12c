//! Input handling: event types, key actions, and the input processor
//! that converts raw window events into application commands.

/// Platform-agnostic input events.
pub mod event;
/// Bindable key actions.
pub mod keyboard;
/// Converts raw events into application commands.
pub mod processor;

pub use event::{InputEvent, MouseButton, PIXELS_PER_LINE};
pub use keyboard::{KeyAction, BLOOM_KEY_STEP};
pub use processor::InputProcessor;
