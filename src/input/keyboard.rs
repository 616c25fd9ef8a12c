use serde::{Deserialize, Serialize};

use crate::app::AppCommand;
use crate::options::BloomSetting;

/// Amount a single key press moves a bloom setting.
pub const BLOOM_KEY_STEP: f32 = 0.1;

/// Application actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// toggle_auto_rotate = "KeyR"
/// increase_bloom_strength = "Digit2"
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Raise bloom strength by one step.
    IncreaseBloomStrength,
    /// Lower bloom strength by one step.
    DecreaseBloomStrength,
    /// Raise bloom radius by one step.
    IncreaseBloomRadius,
    /// Lower bloom radius by one step.
    DecreaseBloomRadius,
    /// Raise bloom threshold by one step.
    IncreaseBloomThreshold,
    /// Lower bloom threshold by one step.
    DecreaseBloomThreshold,
    /// Restore the default bloom settings.
    ResetBloom,
    /// Toggle turntable auto-rotation.
    ToggleAutoRotate,
    /// Write the current options back to the options file.
    SaveOptions,
}

impl KeyAction {
    /// Convert to the corresponding [`AppCommand`].
    #[must_use]
    pub fn to_command(self) -> AppCommand {
        let adjust = |setting, delta| AppCommand::AdjustBloom { setting, delta };
        match self {
            Self::IncreaseBloomStrength => {
                adjust(BloomSetting::Strength, BLOOM_KEY_STEP)
            }
            Self::DecreaseBloomStrength => {
                adjust(BloomSetting::Strength, -BLOOM_KEY_STEP)
            }
            Self::IncreaseBloomRadius => {
                adjust(BloomSetting::Radius, BLOOM_KEY_STEP)
            }
            Self::DecreaseBloomRadius => {
                adjust(BloomSetting::Radius, -BLOOM_KEY_STEP)
            }
            Self::IncreaseBloomThreshold => {
                adjust(BloomSetting::Threshold, BLOOM_KEY_STEP)
            }
            Self::DecreaseBloomThreshold => {
                adjust(BloomSetting::Threshold, -BLOOM_KEY_STEP)
            }
            Self::ResetBloom => AppCommand::ResetBloom,
            Self::ToggleAutoRotate => AppCommand::ToggleAutoRotate,
            Self::SaveOptions => AppCommand::SaveOptions,
        }
    }
}
