//! Volume and mute bookkeeping
//!
//! Levels are integer percent (0-100). The engine receives a linear value
//! in `[0, 1]`, forced to 0 while muted.

/// Level restored by unmute when nothing better is known
pub const FALLBACK_VOLUME: u8 = 50;

/// Volume state with mute memory
///
/// Changes are committed only after the engine accepted the matching
/// command, so the methods here split "what to send" from "what to record".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Mute state
    muted: bool,

    /// Last nonzero level, restored on unmute
    previous: u8,
}

impl Volume {
    /// Create new volume controller
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            previous: if level > 0 { level } else { FALLBACK_VOLUME },
        }
    }

    /// Clamp an arbitrary request into `0..=100`
    pub fn clamp_level(requested: i32) -> u8 {
        requested.clamp(0, 100) as u8
    }

    /// Linear engine value for a level
    pub fn to_engine(level: u8) -> f32 {
        f32::from(level.min(100)) / 100.0
    }

    /// Level from an engine value in `[0, 1]`
    pub fn from_engine(value: f32) -> u8 {
        if value.is_finite() {
            (value.clamp(0.0, 1.0) * 100.0).round() as u8
        } else {
            0
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn previous(&self) -> u8 {
        self.previous
    }

    /// Effective engine value: 0 while muted
    pub fn engine_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            Self::to_engine(self.level)
        }
    }

    /// Record an accepted level change
    ///
    /// A nonzero level also unmutes and becomes the restore point.
    pub fn commit_level(&mut self, level: u8) {
        self.level = level.min(100);
        if self.level > 0 {
            self.muted = false;
            self.previous = self.level;
        }
    }

    /// Level that unmute will restore
    pub fn unmute_level(&self) -> u8 {
        if self.previous > 0 {
            self.previous
        } else {
            FALLBACK_VOLUME
        }
    }

    /// Record an accepted unmute
    pub fn commit_unmute(&mut self, level: u8) {
        self.muted = false;
        self.level = level.min(100);
    }

    /// Record an accepted mute, remembering the current level
    pub fn commit_mute(&mut self) {
        self.previous = if self.level > 0 {
            self.level
        } else {
            FALLBACK_VOLUME
        };
        self.muted = true;
    }

    /// Adopt a persisted level without touching mute state
    pub fn hydrate(&mut self, level: u8) {
        self.level = level.min(100);
        if self.level > 0 {
            self.previous = self.level;
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(FALLBACK_VOLUME)
    }
}
