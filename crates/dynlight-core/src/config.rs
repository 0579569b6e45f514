//! Lighting configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::DEFAULT_CELL_SIZE;
use crate::error::{Error, Result};

/// Largest accepted spatial hash cell size in blocks.
const MAX_CELL_SIZE: u32 = 64;

/// How often light sources are re-evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Every tick.
    #[default]
    RealTime,
    /// Every 5 ticks.
    Slow,
    /// Every 10 ticks.
    Slower,
    /// Every 20 ticks.
    Background,
}

impl TickMode {
    /// Delay between two updates, in ticks.
    #[must_use]
    pub const fn delay(self) -> u32 {
        match self {
            Self::RealTime => 1,
            Self::Slow => 5,
            Self::Slower => 10,
            Self::Background => 20,
        }
    }

    /// Whether updates are skipped on some ticks.
    #[must_use]
    pub const fn has_delay(self) -> bool {
        self.delay() > 1
    }
}

/// Dynamic lighting quality mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicLightsMode {
    Off,
    Fastest,
    Fast,
    #[default]
    Fancy,
}

impl DynamicLightsMode {
    const ALL: [Self; 4] = [Self::Off, Self::Fastest, Self::Fast, Self::Fancy];

    /// Whether this mode enables dynamic lights at all.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Default tick mode for this quality level.
    #[must_use]
    pub const fn tick_mode(self) -> TickMode {
        match self {
            Self::Off | Self::Fancy => TickMode::RealTime,
            Self::Fastest => TickMode::Slower,
            Self::Fast => TickMode::Slow,
        }
    }

    /// Lowercase identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Fastest => "fastest",
            Self::Fast => "fast",
            Self::Fancy => "fancy",
        }
    }

    /// Look a mode up by identifier, ignoring case.
    #[must_use]
    pub fn by_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(id))
    }
}

/// Which chunk rebuild scheduler drives section rebuilds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    /// Rebuild every requested section right away.
    Immediate,
    /// Deduplicate requests and skip sections outside the camera frustum.
    #[default]
    Culling,
}

impl SchedulerMode {
    /// Next mode, cycling back to the first.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Immediate => Self::Culling,
            Self::Culling => Self::Immediate,
        }
    }

    /// Lowercase identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Culling => "culling",
        }
    }

    /// Look a mode up by identifier, ignoring case.
    #[must_use]
    pub fn by_id(id: &str) -> Option<Self> {
        [Self::Immediate, Self::Culling]
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(id))
    }
}

/// Lighting configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Quality mode.
    pub mode: DynamicLightsMode,
    /// Overrides the tick mode implied by `mode`.
    pub tick_mode: Option<TickMode>,
    /// Chunk rebuild scheduler.
    pub scheduler: SchedulerMode,
    /// Spatial hash cell size in blocks (power of two).
    pub cell_size: u32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            mode: DynamicLightsMode::default(),
            tick_mode: None,
            scheduler: SchedulerMode::default(),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl LightingConfig {
    /// Set the quality mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DynamicLightsMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force a tick mode regardless of the quality mode.
    #[must_use]
    pub fn with_tick_mode(mut self, tick_mode: TickMode) -> Self {
        self.tick_mode = Some(tick_mode);
        self
    }

    /// Set the scheduler mode.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerMode) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the spatial hash cell size.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Tick mode actually in effect.
    #[must_use]
    pub fn effective_tick_mode(&self) -> TickMode {
        self.tick_mode.unwrap_or_else(|| self.mode.tick_mode())
    }

    /// Check that every value is usable by the engine.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_power_of_two() || self.cell_size > MAX_CELL_SIZE {
            return Err(Error::InvalidConfig(format!(
                "cell_size must be a power of two between 1 and {MAX_CELL_SIZE}, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded lighting config from {}: mode={}, scheduler={}, cell_size={}",
            path.display(),
            config.mode.name(),
            config.scheduler.name(),
            config.cell_size
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LightingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_tick_mode(), TickMode::RealTime);
        assert_eq!(config.scheduler, SchedulerMode::Culling);
    }

    #[test]
    fn tick_mode_override_wins() {
        let config = LightingConfig::default()
            .with_mode(DynamicLightsMode::Fast)
            .with_tick_mode(TickMode::Background);
        assert_eq!(config.effective_tick_mode().delay(), 20);

        let config = LightingConfig::default().with_mode(DynamicLightsMode::Fastest);
        assert_eq!(config.effective_tick_mode(), TickMode::Slower);
    }

    #[test]
    fn parse_partial_toml() {
        let config = LightingConfig::from_toml_str(
            r#"
            mode = "fast"
            scheduler = "immediate"
            tick_mode = "background"
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, DynamicLightsMode::Fast);
        assert_eq!(config.scheduler, SchedulerMode::Immediate);
        assert_eq!(config.tick_mode, Some(TickMode::Background));
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
    }

    #[test]
    fn reject_bad_cell_size() {
        let err = LightingConfig::from_toml_str("cell_size = 12").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = LightingConfig::from_toml_str("cell_size = 128").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = LightingConfig::from_toml_str("mode = \"blinding\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn modes_roundtrip_by_name() {
        assert_eq!(DynamicLightsMode::by_id("FANCY"), Some(DynamicLightsMode::Fancy));
        assert_eq!(DynamicLightsMode::by_id("dim"), None);
        assert!(!DynamicLightsMode::Off.is_enabled());
        assert_eq!(SchedulerMode::by_id("Culling"), Some(SchedulerMode::Culling));
        assert_eq!(SchedulerMode::Culling.next(), SchedulerMode::Immediate);
    }

    #[test]
    fn only_real_time_updates_every_tick() {
        assert!(!TickMode::RealTime.has_delay());
        assert!(TickMode::Slow.has_delay());
        assert_eq!(TickMode::Background.delay(), 20);
    }
}
