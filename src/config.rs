//! Board configuration
//!
//! Every tunable of the board lives here. Missing JSON fields fall back to the
//! defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// Reasons a configuration is rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid board config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board must have at least one column")]
    ZeroColumns,
    #[error("`{field}` must be positive")]
    NonPositive { field: &'static str },
    #[error("wall_damp must be in (0, 1], got {0}")]
    WallDampOutOfRange(f32),
    #[error("expected {expected} payouts (one per column), found {found}")]
    PayoutCount { expected: usize, found: usize },
    #[error("board does not fit: slot band top {slot_top} is above spawn height {spawn_y}")]
    SlotBandTooTall { slot_top: f32, spawn_y: f32 },
    #[cfg(not(target_arch = "wasm32"))]
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Board geometry, physics constants and payouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    // === Lattice ===
    pub rows: u32,
    pub cols: u32,
    pub spacing: f32,
    pub pin_top: f32,
    pub pin_radius: f32,

    // === Board ===
    pub height: f32,
    pub slot_band_height: f32,

    // === Balls ===
    pub radius: f32,
    pub max_balls: u32,
    pub spawn_y: f32,
    pub spawn_jitter: f32,
    pub spawn_interval: u64,

    // === Physics ===
    pub gravity: f32,
    pub vy_max: f32,
    pub wall_kick: f32,
    pub wall_damp: f32,
    pub friction: f32,
    pub pin_kick_x: f32,
    pub pin_kick_y: f32,
    pub pin_jitter: f32,

    // === Slots ===
    pub settle_gap: f32,
    pub payouts: Vec<i64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: consts::ROWS,
            cols: consts::COLS,
            spacing: consts::SPACING,
            pin_top: consts::PIN_TOP,
            pin_radius: consts::PIN_RADIUS,

            height: consts::BOARD_HEIGHT,
            slot_band_height: consts::SLOT_BAND_HEIGHT,

            radius: consts::BALL_RADIUS,
            max_balls: consts::MAX_BALLS,
            spawn_y: consts::SPAWN_Y,
            spawn_jitter: consts::SPAWN_JITTER,
            spawn_interval: consts::SPAWN_INTERVAL_FRAMES,

            gravity: consts::GRAVITY,
            vy_max: consts::VY_MAX,
            wall_kick: consts::WALL_KICK,
            wall_damp: consts::WALL_DAMP,
            friction: consts::FRICTION,
            pin_kick_x: consts::PIN_KICK_X,
            pin_kick_y: consts::PIN_KICK_Y,
            pin_jitter: consts::PIN_JITTER,

            settle_gap: consts::SETTLE_GAP,
            payouts: consts::PAYOUTS.to_vec(),
        }
    }
}

impl BoardConfig {
    /// Board width in pixels (one slot per column)
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.spacing
    }

    /// Horizontal center of the board
    pub fn center_x(&self) -> f32 {
        self.width() / 2.0
    }

    /// Y above which a ball is still in flight
    pub fn slot_top(&self) -> f32 {
        self.height - self.slot_band_height
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a playable board
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 {
            return Err(ConfigError::ZeroColumns);
        }

        let positive = [
            ("spacing", self.spacing),
            ("height", self.height),
            ("slot_band_height", self.slot_band_height),
            ("radius", self.radius),
            ("pin_radius", self.pin_radius),
            ("vy_max", self.vy_max),
            ("gravity", self.gravity),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.max_balls == 0 {
            return Err(ConfigError::NonPositive { field: "max_balls" });
        }

        if !(self.wall_damp > 0.0 && self.wall_damp <= 1.0) {
            return Err(ConfigError::WallDampOutOfRange(self.wall_damp));
        }

        if self.payouts.len() != self.cols as usize {
            return Err(ConfigError::PayoutCount {
                expected: self.cols as usize,
                found: self.payouts.len(),
            });
        }

        if self.slot_top() <= self.spawn_y {
            return Err(ConfigError::SlotBandTooTall {
                slot_top: self.slot_top(),
                spawn_y: self.spawn_y,
            });
        }

        if self.rows % 2 == 0 {
            log::warn!(
                "Even row count ({}): last pin row is not offset, lattice will look lopsided",
                self.rows
            );
        }

        Ok(())
    }

    /// Inline style for one payout label so it sits under its slot bin
    pub fn slot_label_style(&self) -> String {
        format!("width: {}px", self.spacing)
    }

    /// Load configuration from the page's `#board-config` JSON element (WASM only)
    ///
    /// Falls back to defaults when the element is absent or invalid.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        const ELEMENT_ID: &str = "board-config";

        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded board config from #{}", ELEMENT_ID);
                    return config;
                }
                Err(e) => log::error!("Ignoring #{}: {}", ELEMENT_ID, e),
            },
            _ => {}
        }

        log::info!("Using default board config");
        Self::default()
    }

    /// Load configuration from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width(), 400.0);
        assert_eq!(config.slot_top(), 540.0);
        assert_eq!(config.payouts.len(), config.cols as usize);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json(r#"{ "max_balls": 20, "gravity": 0.2 }"#).unwrap();
        assert_eq!(config.max_balls, 20);
        assert!((config.gravity - 0.2).abs() < 1e-6);
        assert_eq!(config.cols, consts::COLS);
        assert_eq!(config.payouts, consts::PAYOUTS.to_vec());
    }

    #[test]
    fn test_gravity_must_be_positive() {
        for gravity in [0.0, -0.15, f32::NAN] {
            let config = BoardConfig {
                gravity,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NonPositive { field: "gravity" })
            ));
        }
        let err = BoardConfig::from_json(r#"{ "gravity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "gravity" }));
    }

    #[test]
    fn test_slot_label_style_follows_spacing() {
        assert_eq!(BoardConfig::default().slot_label_style(), "width: 40px");
        let config = BoardConfig {
            spacing: 55.5,
            ..Default::default()
        };
        assert_eq!(config.slot_label_style(), "width: 55.5px");
    }

    #[test]
    fn test_payout_count_mismatch() {
        let err = BoardConfig::from_json(r#"{ "cols": 4 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PayoutCount {
                expected: 4,
                found: 10
            }
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = BoardConfig {
            cols: 0,
            payouts: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroColumns)));

        let config = BoardConfig {
            spacing: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "spacing" })
        ));

        let config = BoardConfig {
            wall_damp: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WallDampOutOfRange(_))
        ));

        let config = BoardConfig {
            slot_band_height: 590.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SlotBandTooTall { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            BoardConfig::from_json("{ rows: "),
            Err(ConfigError::Parse(_))
        ));
    }
}
