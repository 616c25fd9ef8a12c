use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

/// Bindings installed when the options file does not override them.
const DEFAULT_BINDINGS: [(KeyAction, &str); 9] = [
    (KeyAction::DecreaseBloomStrength, "Digit1"),
    (KeyAction::IncreaseBloomStrength, "Digit2"),
    (KeyAction::DecreaseBloomRadius, "Digit3"),
    (KeyAction::IncreaseBloomRadius, "Digit4"),
    (KeyAction::DecreaseBloomThreshold, "Digit5"),
    (KeyAction::IncreaseBloomThreshold, "Digit6"),
    (KeyAction::ResetBloom, "Backquote"),
    (KeyAction::ToggleAutoRotate, "KeyR"),
    (KeyAction::SaveOptions, "KeyP"),
];

/// Keyboard bindings from actions to physical key codes (winit
/// `KeyCode` debug names such as `"KeyR"` or `"Digit2"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeybindingOptions {
    /// Action → key code. Ordered so saved files are stable.
    pub bindings: BTreeMap<KeyAction, String>,
    /// Key code → action. Rebuilt after deserializing.
    #[serde(skip)]
    key_to_action: FxHashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let mut opts = Self {
            bindings: DEFAULT_BINDINGS
                .iter()
                .map(|&(action, key)| (action, key.to_owned()))
                .collect(),
            key_to_action: FxHashMap::default(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the key → action map from `bindings`.
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            if let Some(previous) = self.key_to_action.insert(key.clone(), *action) {
                log::warn!(
                    "key {key} bound to both {previous:?} and {action:?}; \
                     using {action:?}"
                );
            }
        }
    }

    /// Action bound to a key code.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }

    /// Key code bound to an action.
    #[must_use]
    pub fn key_for(&self, action: KeyAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }

    /// Bind `action` to `key`. Any other action holding `key` loses it.
    pub fn bind(&mut self, action: KeyAction, key: impl Into<String>) {
        let key = key.into();
        self.bindings.retain(|other, bound| *other == action || *bound != key);
        let _ = self.bindings.insert(action, key);
        self.rebuild_reverse_map();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_default_key() {
        let opts = KeybindingOptions::default();
        assert_eq!(opts.bindings.len(), DEFAULT_BINDINGS.len());
        assert_eq!(opts.key_for(KeyAction::ResetBloom), Some("Backquote"));
    }

    #[test]
    fn rebinding_steals_the_key() {
        let mut opts = KeybindingOptions::default();
        opts.bind(KeyAction::SaveOptions, "KeyR");
        assert_eq!(opts.lookup("KeyR"), Some(KeyAction::SaveOptions));
        assert_eq!(opts.lookup("KeyP"), None);
        assert_eq!(opts.key_for(KeyAction::ToggleAutoRotate), None);
    }
}
