//! Playback configuration
//!
//! Loaded from an optional TOML file, then overridden by `HARMONIA_*`
//! environment variables (e.g. `HARMONIA_CLOCK_TICK_MS=50`).

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Volume used until the saved volume is hydrated (0-100)
    #[serde(default = "default_volume")]
    pub default_volume: u8,

    /// Local clock period in milliseconds
    #[serde(default = "default_clock_tick_ms")]
    pub clock_tick_ms: u64,

    /// Seconds added to the local clock per tick
    #[serde(default = "default_clock_quantum_secs")]
    pub clock_quantum_secs: f64,

    /// Target length of extracted waveforms
    #[serde(default = "default_waveform_samples")]
    pub waveform_samples: usize,

    /// Samples appended per loading chunk
    #[serde(default = "default_waveform_chunk_size")]
    pub waveform_chunk_size: usize,

    /// Delay between loading chunks in milliseconds
    #[serde(default = "default_waveform_chunk_delay_ms")]
    pub waveform_chunk_delay_ms: u64,

    /// Reveal timer period in milliseconds
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// Number of waveforms kept by the pre-fetch cache
    #[serde(default = "default_waveform_cache_size")]
    pub waveform_cache_size: usize,

    /// Upper bound for a single engine command, unbounded when unset
    #[serde(default)]
    pub engine_timeout_ms: Option<u64>,
}

fn default_volume() -> u8 {
    50
}

fn default_clock_tick_ms() -> u64 {
    100
}

fn default_clock_quantum_secs() -> f64 {
    0.1
}

fn default_waveform_samples() -> usize {
    150
}

fn default_waveform_chunk_size() -> usize {
    30
}

fn default_waveform_chunk_delay_ms() -> u64 {
    16
}

fn default_reveal_interval_ms() -> u64 {
    4
}

fn default_waveform_cache_size() -> usize {
    64
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            clock_tick_ms: default_clock_tick_ms(),
            clock_quantum_secs: default_clock_quantum_secs(),
            waveform_samples: default_waveform_samples(),
            waveform_chunk_size: default_waveform_chunk_size(),
            waveform_chunk_delay_ms: default_waveform_chunk_delay_ms(),
            reveal_interval_ms: default_reveal_interval_ms(),
            waveform_cache_size: default_waveform_cache_size(),
            engine_timeout_ms: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(::config::File::from(path));
            }
        }

        // HARMONIA_CLOCK_TICK_MS -> clock_tick_ms (keys are flat, so no nesting separator)
        settings = settings.add_source(
            ::config::Environment::with_prefix("HARMONIA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_volume > 100 {
            return Err(PlaybackError::Config(format!(
                "default_volume must be within 0-100, got {}",
                self.default_volume
            )));
        }
        if self.clock_tick_ms == 0 {
            return Err(PlaybackError::Config("clock_tick_ms must be positive".into()));
        }
        if !(self.clock_quantum_secs.is_finite() && self.clock_quantum_secs > 0.0) {
            return Err(PlaybackError::Config(
                "clock_quantum_secs must be a positive number".into(),
            ));
        }
        if self.waveform_samples == 0 || self.waveform_chunk_size == 0 {
            return Err(PlaybackError::Config(
                "waveform_samples and waveform_chunk_size must be positive".into(),
            ));
        }
        if self.reveal_interval_ms == 0 {
            return Err(PlaybackError::Config("reveal_interval_ms must be positive".into()));
        }
        if self.waveform_cache_size == 0 {
            return Err(PlaybackError::Config("waveform_cache_size must be positive".into()));
        }
        if self.engine_timeout_ms == Some(0) {
            return Err(PlaybackError::Config("engine_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Timer periods are never zero, even for an unvalidated config
    pub(crate) fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms.max(1))
    }

    pub(crate) fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.waveform_chunk_delay_ms)
    }

    pub(crate) fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }

    pub(crate) fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.default_volume, 50);
        assert_eq!(config.clock_tick_ms, 100);
        assert_eq!(config.clock_quantum_secs, 0.1);
        assert_eq!(config.waveform_samples, 150);
        assert_eq!(config.waveform_chunk_size, 30);
        assert!(config.engine_timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_file_fills_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "waveform_samples = 200\nengine_timeout_ms = 2500").unwrap();

        let config = PlaybackConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.waveform_samples, 200);
        assert_eq!(config.engine_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.clock_tick_ms, 100);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlaybackConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.waveform_chunk_size, 30);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "waveform_chunk_size = 0").unwrap();
        assert!(matches!(
            PlaybackConfig::load(Some(file.path())),
            Err(PlaybackError::Config(_))
        ));

        let config = PlaybackConfig {
            default_volume: 101,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            clock_quantum_secs: 0.0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_periods_floor_at_one_millisecond() {
        let config = PlaybackConfig {
            clock_tick_ms: 0,
            reveal_interval_ms: 0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.clock_tick(), Duration::from_millis(1));
        assert_eq!(config.reveal_interval(), Duration::from_millis(1));
    }
}
