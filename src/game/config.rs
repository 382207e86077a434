//! Simulation Configuration
//!
//! Tunables for the tick driver and the timed behaviors it runs.
//! Loaded from defaults, JSON, or `SCREENWALK_*` environment variables.

use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::overlap::DEFAULT_MAX_RESOLVE_ITERATIONS;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    /// A value failed to parse or is out of range.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Configuration for one simulation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Target ticks per second for hosts driving the loop
    pub tick_rate: u32,
    /// Elapsed time below which a tick is deferred
    pub min_tick_delay_ms: u64,
    /// Largest slice simulated in one tick; excess time is dropped
    pub max_tick_delay_ms: u64,
    /// Pass cap for overlap resolution
    pub max_resolve_iterations: u32,
    /// Delay between attacks
    pub attack_cooldown_ms: u64,
    /// Recovery window after contact damage
    pub invulnerability_ms: u64,
    /// Length of one animation frame
    pub animation_step_ms: u64,
    /// Frames per walk cycle
    pub animation_steps: u32,
    /// Health removed by hostile contact
    pub contact_damage: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: crate::DEFAULT_TICK_RATE,
            min_tick_delay_ms: 10,
            max_tick_delay_ms: 100,
            max_resolve_iterations: DEFAULT_MAX_RESOLVE_ITERATIONS,
            attack_cooldown_ms: 400,
            invulnerability_ms: 1_000,
            animation_step_ms: 150,
            animation_steps: 4,
            contact_damage: 1,
        }
    }
}

impl SimConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            tick_rate: env_or("SCREENWALK_TICK_RATE", defaults.tick_rate)?,
            min_tick_delay_ms: env_or("SCREENWALK_MIN_TICK_DELAY_MS", defaults.min_tick_delay_ms)?,
            max_tick_delay_ms: env_or("SCREENWALK_MAX_TICK_DELAY_MS", defaults.max_tick_delay_ms)?,
            max_resolve_iterations: env_or(
                "SCREENWALK_MAX_RESOLVE_ITERATIONS",
                defaults.max_resolve_iterations,
            )?,
            attack_cooldown_ms: env_or("SCREENWALK_ATTACK_COOLDOWN_MS", defaults.attack_cooldown_ms)?,
            invulnerability_ms: env_or("SCREENWALK_INVULNERABILITY_MS", defaults.invulnerability_ms)?,
            animation_step_ms: env_or("SCREENWALK_ANIMATION_STEP_MS", defaults.animation_step_ms)?,
            animation_steps: env_or("SCREENWALK_ANIMATION_STEPS", defaults.animation_steps)?,
            contact_damage: env_or("SCREENWALK_CONTACT_DAMAGE", defaults.contact_damage)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tick driver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", self.tick_rate));
        }
        if self.max_tick_delay_ms == 0 || self.min_tick_delay_ms > self.max_tick_delay_ms {
            return Err(invalid("min_tick_delay_ms", self.min_tick_delay_ms));
        }
        if self.max_resolve_iterations == 0 {
            return Err(invalid("max_resolve_iterations", self.max_resolve_iterations));
        }
        if self.animation_steps == 0 {
            return Err(invalid("animation_steps", self.animation_steps));
        }
        if self.animation_step_ms == 0 {
            return Err(invalid("animation_step_ms", self.animation_step_ms));
        }
        Ok(())
    }

    /// Nominal time between ticks at `tick_rate`.
    pub fn frame_ms(&self) -> u64 {
        (1_000 / self.tick_rate.max(1) as u64).max(1)
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_ms(), 16);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SimConfig::from_json(r#"{ "attack_cooldown_ms": 250 }"#).unwrap();
        assert_eq!(config.attack_cooldown_ms, 250);
        assert_eq!(config.max_resolve_iterations, DEFAULT_MAX_RESOLVE_ITERATIONS);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "animation_steps": 0 }"#),
            Err(ConfigError::InvalidValue { key: "animation_steps", .. })
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "min_tick_delay_ms": 500, "max_tick_delay_ms": 100 }"#),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(SimConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }
}
