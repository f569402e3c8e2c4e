//! Game tuning and policy choices.
//!
//! Everything here is plain data so a [`GameConfig`] can live in a `static`.
//! Use [`GameConfig::DEFAULT`] for the stock game, or [`GameConfig::builder`]
//! when some knob has to change:
//!
//! ```ignore
//! let config = GameConfig::builder()
//!     .max_sequence(6)
//!     .debounce(DebouncePolicy::RisingEdge)
//!     .build()?;
//! ```

use core::fmt;
use core::time::Duration;

use crate::synth::MAX_VOLUME;

/// Longest pattern the game can ask for.
pub const MAX_SEQUENCE: usize = 10;

/// How raw keypad samples become events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DebouncePolicy {
    /// A press is the sample pattern `0, 0, 1`. Fast, reports presses only,
    /// and a bouncing contact can re-trigger.
    RisingEdge,
    /// Five consecutive equal samples that differ from the last stable state
    /// make a press or a release.
    #[default]
    Stable,
}

/// What happens after the "GAME OVER" screens.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GameOverPolicy {
    /// Go straight back to the menu.
    #[default]
    AutoAdvance,
    /// Hold on "OVER" until any key is pressed.
    WaitForKey,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Levels in a full game, 1..=[`MAX_SEQUENCE`]. Level n shows n digits.
    pub max_sequence: u8,
    pub initial_speed_ms: u16,
    pub speed_step_ms: u16,
    pub speed_floor_ms: u16,
    /// Blank pause between two pattern digits.
    pub digit_gap_ms: u16,
    /// How long a correct answer stays on the display.
    pub echo_ms: u16,
    pub start_key: char,
    pub seed: u64,
    pub debounce: DebouncePolicy,
    pub game_over: GameOverPolicy,
    /// Output scale, 0..=4095.
    pub volume: u16,
}

impl GameConfig {
    pub const DEFAULT: GameConfig = GameConfig {
        max_sequence: MAX_SEQUENCE as u8,
        initial_speed_ms: 1000,
        speed_step_ms: 100,
        speed_floor_ms: 300,
        digit_gap_ms: 300,
        echo_ms: 250,
        start_key: '#',
        seed: 0,
        debounce: DebouncePolicy::Stable,
        game_over: GameOverPolicy::AutoAdvance,
        volume: 2048,
    };

    pub const fn builder() -> GameConfigBuilder {
        GameConfigBuilder {
            config: GameConfig::DEFAULT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sequence == 0 || self.max_sequence as usize > MAX_SEQUENCE {
            return Err(ConfigError::MaxSequence(self.max_sequence));
        }
        if self.speed_floor_ms == 0 {
            return Err(ConfigError::ZeroSpeedFloor);
        }
        if self.speed_floor_ms > self.initial_speed_ms {
            return Err(ConfigError::FloorAboveInitial {
                floor_ms: self.speed_floor_ms,
                initial_ms: self.initial_speed_ms,
            });
        }
        if self.volume > MAX_VOLUME {
            return Err(ConfigError::Volume(self.volume));
        }
        if crate::keypad::Key::from_char(self.start_key).is_none() {
            return Err(ConfigError::StartKey(self.start_key));
        }
        Ok(())
    }

    /// Playback speed after clearing a level played at `speed_ms`.
    pub fn next_speed_ms(&self, speed_ms: u16) -> u16 {
        speed_ms
            .saturating_sub(self.speed_step_ms)
            .max(self.speed_floor_ms)
    }

    #[inline]
    pub fn digit_gap(&self) -> Duration {
        Duration::from_millis(self.digit_gap_ms as u64)
    }

    #[inline]
    pub fn echo(&self) -> Duration {
        Duration::from_millis(self.echo_ms as u64)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::DEFAULT
    }
}

pub struct GameConfigBuilder {
    config: GameConfig,
}

impl GameConfigBuilder {
    pub const fn max_sequence(mut self, levels: u8) -> Self {
        self.config.max_sequence = levels;
        self
    }

    pub const fn speeds(mut self, initial_ms: u16, step_ms: u16, floor_ms: u16) -> Self {
        self.config.initial_speed_ms = initial_ms;
        self.config.speed_step_ms = step_ms;
        self.config.speed_floor_ms = floor_ms;
        self
    }

    pub const fn digit_gap_ms(mut self, ms: u16) -> Self {
        self.config.digit_gap_ms = ms;
        self
    }

    pub const fn echo_ms(mut self, ms: u16) -> Self {
        self.config.echo_ms = ms;
        self
    }

    pub const fn start_key(mut self, key: char) -> Self {
        self.config.start_key = key;
        self
    }

    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub const fn debounce(mut self, policy: DebouncePolicy) -> Self {
        self.config.debounce = policy;
        self
    }

    pub const fn game_over(mut self, policy: GameOverPolicy) -> Self {
        self.config.game_over = policy;
        self
    }

    pub const fn volume(mut self, volume: u16) -> Self {
        self.config.volume = volume;
        self
    }

    pub fn build(self) -> Result<GameConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Level count outside 1..=MAX_SEQUENCE.
    MaxSequence(u8),
    ZeroSpeedFloor,
    FloorAboveInitial { floor_ms: u16, initial_ms: u16 },
    /// Volume above 4095 would push samples out of the 12-bit range.
    Volume(u16),
    /// The start key is not on the keypad.
    StartKey(char),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxSequence(n) => write!(f, "max sequence {n} outside 1..={MAX_SEQUENCE}"),
            Self::ZeroSpeedFloor => write!(f, "speed floor must be above 0ms"),
            Self::FloorAboveInitial {
                floor_ms,
                initial_ms,
            } => write!(
                f,
                "speed floor {floor_ms}ms is above the initial speed {initial_ms}ms"
            ),
            Self::Volume(v) => write!(f, "volume {v} above {MAX_VOLUME}"),
            Self::StartKey(c) => write!(f, "start key {c:?} is not on the keypad"),
        }
    }
}

impl core::error::Error for ConfigError {}
