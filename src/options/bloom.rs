use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lower bound shared by every bloom setting.
pub const BLOOM_SETTING_MIN: f32 = 0.0;
/// Upper bound shared by every bloom setting.
pub const BLOOM_SETTING_MAX: f32 = 10.0;

/// One of the three live-tunable bloom settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BloomSetting {
    /// Overall bloom contribution.
    Strength,
    /// Blend between tight and wide blur levels.
    Radius,
    /// Luminance above which pixels bloom.
    Threshold,
}

/// Live-tunable bloom parameters, read once per frame by the bloom pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Bloom", inline)]
#[serde(default)]
pub struct BloomSettings {
    /// Overall bloom contribution.
    #[schemars(title = "Bloom Strength", range(min = 0.0, max = 10.0), extend("step" = 0.01))]
    pub strength: f32,
    /// Blend between tight and wide blur levels.
    #[schemars(title = "Bloom Radius", range(min = 0.0, max = 10.0), extend("step" = 0.01))]
    pub radius: f32,
    /// Luminance above which pixels bloom.
    #[schemars(title = "Bloom Threshold", range(min = 0.0, max = 10.0), extend("step" = 0.01))]
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 0.8,
            radius: 0.6,
            threshold: 0.2,
        }
    }
}

impl BloomSettings {
    /// Read a single setting.
    #[must_use]
    pub fn get(&self, setting: BloomSetting) -> f32 {
        match setting {
            BloomSetting::Strength => self.strength,
            BloomSetting::Radius => self.radius,
            BloomSetting::Threshold => self.threshold,
        }
    }

    /// Write a single setting, clamped to the declared range. Non-finite
    /// values are ignored. Returns the value actually stored.
    pub fn set(&mut self, setting: BloomSetting, value: f32) -> f32 {
        if !value.is_finite() {
            return self.get(setting);
        }
        let value = value.clamp(BLOOM_SETTING_MIN, BLOOM_SETTING_MAX);
        match setting {
            BloomSetting::Strength => self.strength = value,
            BloomSetting::Radius => self.radius = value,
            BloomSetting::Threshold => self.threshold = value,
        }
        value
    }

    /// Nudge a setting by `delta`, clamped to range.
    pub fn adjust(&mut self, setting: BloomSetting, delta: f32) -> f32 {
        self.set(setting, self.get(setting) + delta)
    }

    /// Copy with every field forced into range (used after loading files).
    #[must_use]
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let fix = |v: f32, d: f32| {
            if v.is_finite() {
                v.clamp(BLOOM_SETTING_MIN, BLOOM_SETTING_MAX)
            } else {
                d
            }
        };
        Self {
            strength: fix(self.strength, defaults.strength),
            radius: fix(self.radius, defaults.radius),
            threshold: fix(self.threshold, defaults.threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_values() {
        let s = BloomSettings::default();
        assert_eq!(s.strength, 0.8);
        assert_eq!(s.radius, 0.6);
        assert_eq!(s.threshold, 0.2);
    }

    #[test]
    fn set_clamps_to_range() {
        let mut s = BloomSettings::default();
        assert_eq!(s.set(BloomSetting::Strength, 42.0), 10.0);
        assert_eq!(s.set(BloomSetting::Radius, -1.0), 0.0);
        assert_eq!(s.set(BloomSetting::Threshold, f32::NAN), 0.2);
        assert_eq!(s.strength, 10.0);
        assert_eq!(s.radius, 0.0);
    }

    #[test]
    fn adjust_moves_from_current_value() {
        let mut s = BloomSettings::default();
        let v = s.adjust(BloomSetting::Radius, 0.5);
        assert!((v - 1.1).abs() < 1e-6);
        let _ = s.adjust(BloomSetting::Threshold, -5.0);
        assert_eq!(s.threshold, 0.0);
    }

    #[test]
    fn clamped_repairs_out_of_range_fields() {
        let s = BloomSettings {
            strength: 99.0,
            radius: f32::INFINITY,
            threshold: -3.0,
        }
        .clamped();
        assert_eq!(s.strength, 10.0);
        assert_eq!(s.radius, 0.6);
        assert_eq!(s.threshold, 0.0);
    }
}
