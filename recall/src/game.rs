//! # The Memory Game
//!
//! A turn-based loop on the foreground. The board shows a growing pattern of
//! digits, each lit in its own color, and the player types it back:
//!
//! ```text
//!   Menu ─start key─> ShowPattern ──> AwaitInput ─correct─> Success ─> ShowPattern (level + 1)
//!    ^                                    │                    │
//!    │                                  wrong               last level
//!    │                                    v                    │
//!    ├──────── GameOver <─────────── Failure                   │
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Level `n` shows `n` digits and scores `n * 10` when cleared. Playback
//! speeds up by one step per cleared level until it hits the floor.
//!
//! [`Game::step`] runs one phase to completion and returns the next one, so
//! tests can stop between phases. [`Game::run`] is the firmware main loop.

use core::time::Duration;

use heapless::Vec;
use log::{debug, info, warn};

use crate::config::{GameConfig, GameOverPolicy, MAX_SEQUENCE};
use crate::cue;
use crate::display::Display;
use crate::hal::{Delay, DisplaySink, RandomSource, RgbSink};
use crate::keypad::{Key, KeyEvents};
use crate::led::Color;
use crate::shared::Shared;

const LOWEST_DIGIT: u32 = 1;
const HIGHEST_DIGIT: u32 = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    ShowPattern,
    AwaitInput,
    Success,
    Failure,
    GameOver,
}

/// Progress of the game being played.
///
/// Back in [`Phase::Menu`] the session still describes the game that just
/// ended, so the final score stays readable. After a win `level` is one past
/// the last level. Pressing the start key resets everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    pub phase: Phase,
    /// The level being played, `1..=max_sequence` during a game.
    pub level: u8,
    pub score: u16,
    /// How long each pattern digit stays lit.
    pub speed_ms: u16,
    /// The pattern of the current level.
    pub sequence: Vec<u8, MAX_SEQUENCE>,
    /// What the player typed so far this level.
    pub entered: Vec<u8, MAX_SEQUENCE>,
}

impl GameSession {
    fn new(config: &GameConfig) -> Self {
        Self {
            phase: Phase::Menu,
            level: 1,
            score: 0,
            speed_ms: config.initial_speed_ms,
            sequence: Vec::new(),
            entered: Vec::new(),
        }
    }
}

pub struct Game<'s, D, L, T, R> {
    config: GameConfig,
    start_key: Key,
    shared: &'s Shared,
    keys: KeyEvents<'s>,
    display: Display<D>,
    led: L,
    delay: T,
    rng: R,
    session: GameSession,
}

impl<'s, D, L, T, R> Game<'s, D, L, T, R>
where
    D: DisplaySink,
    L: RgbSink,
    T: Delay,
    R: RandomSource,
{
    pub fn new(config: GameConfig, shared: &'s Shared, display: D, led: L, delay: T, mut rng: R) -> Self {
        let mut config = config;
        let levels = config.max_sequence.clamp(1, MAX_SEQUENCE as u8);
        if levels != config.max_sequence {
            warn!("{} levels requested, playing {levels}", config.max_sequence);
            config.max_sequence = levels;
        }
        if shared.keys.policy() != config.debounce {
            warn!(
                "keypad debounces {:?}, config asks for {:?}",
                shared.keys.policy(),
                config.debounce
            );
        }

        let start_key = match Key::from_char(config.start_key) {
            Some(key) => key,
            None => {
                warn!("start key {:?} is not on the keypad, using #", config.start_key);
                Key::HASH
            }
        };
        rng.seed(config.seed);
        shared.synth.set_volume(config.volume);

        Self {
            session: GameSession::new(&config),
            config,
            start_key,
            shared,
            keys: KeyEvents::new(&shared.keys),
            display: Display::new(display),
            led,
            delay,
            rng,
        }
    }

    /// Firmware entry: greet, then play forever.
    pub fn run(&mut self) -> ! {
        self.boot();
        loop {
            self.step();
        }
    }

    /// Power-on greeting. Leaves the game in the menu.
    pub fn boot(&mut self) {
        self.display.print("MEMORY");
        cue::STARTUP.play(&self.shared.synth, &mut self.led, &mut self.delay);
        self.wait_ms(1000);
        self.session.phase = Phase::Menu;
    }

    /// Run the current phase to completion and move to the next.
    pub fn step(&mut self) -> Phase {
        let from = self.session.phase;
        let next = match from {
            Phase::Menu => self.menu(),
            Phase::ShowPattern => self.show_pattern(),
            Phase::AwaitInput => self.await_input(),
            Phase::Success => self.success(),
            Phase::Failure => self.failure(),
            Phase::GameOver => self.game_over(),
        };
        debug!(
            "{from:?} -> {next:?} (level {}, score {})",
            self.session.level, self.session.score
        );
        self.session.phase = next;
        next
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    #[inline]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Skip ahead to showing `level` with a zero score, at the speed that
    /// level would normally be played at.
    pub fn resume_at(&mut self, level: u8) {
        let level = level.min(self.config.max_sequence);
        let mut speed_ms = self.config.initial_speed_ms;
        for _ in 1..level {
            speed_ms = self.config.next_speed_ms(speed_ms);
        }

        self.session = GameSession {
            phase: Phase::ShowPattern,
            level,
            speed_ms,
            ..GameSession::new(&self.config)
        };
    }

    fn menu(&mut self) -> Phase {
        self.display.print("PRESS # ");
        self.keys.discard_pending();
        while self.keys.wait_press(&mut self.delay) != self.start_key {}

        self.session = GameSession {
            phase: Phase::Menu,
            ..GameSession::new(&self.config)
        };
        info!("new game, {} levels", self.config.max_sequence);
        Phase::ShowPattern
    }

    fn show_pattern(&mut self) -> Phase {
        self.display.show_level(self.session.level);
        self.wait_ms(1000);

        self.generate();
        debug!(
            "level {} pattern {:?}",
            self.session.level,
            self.session.sequence.as_slice()
        );

        let hold = Duration::from_millis(self.session.speed_ms as u64);
        let sequence = self.session.sequence.clone();
        for &digit in &sequence {
            self.show_digit(digit);
            self.delay.wait(hold);
            Color::OFF.apply(&mut self.led);
            self.display.clear();
            self.delay.wait(self.config.digit_gap());
        }

        self.display.print("YOUR GO!");
        self.wait_ms(500);
        Phase::AwaitInput
    }

    fn generate(&mut self) {
        let count = (self.session.level as usize).min(self.config.max_sequence as usize);
        self.session.sequence.clear();
        for _ in 0..count {
            let digit = self
                .rng
                .next_int_range(LOWEST_DIGIT, HIGHEST_DIGIT)
                .clamp(LOWEST_DIGIT, HIGHEST_DIGIT);
            // count never exceeds the capacity
            let _ = self.session.sequence.push(digit as u8);
        }
    }

    fn await_input(&mut self) -> Phase {
        // keys hit while the pattern played are not answers
        self.keys.discard_pending();
        self.session.entered.clear();

        for position in 0..self.session.sequence.len() {
            self.display.print("INPUT...");
            let key = self.keys.wait_press(&mut self.delay);
            let digit = match key.digit() {
                Some(digit @ 1..=9) => digit,
                _ => {
                    debug!("{key} is not a pattern digit");
                    return Phase::Failure;
                }
            };

            let _ = self.session.entered.push(digit);
            self.show_digit(digit);
            self.delay.wait(self.config.echo());

            let expected = self.session.sequence[position];
            if digit != expected {
                debug!("expected {expected} at {position}, got {digit}");
                return Phase::Failure;
            }
        }
        Phase::Success
    }

    fn success(&mut self) -> Phase {
        Color::OFF.apply(&mut self.led);
        self.display.print("CORRECT!");
        cue::SUCCESS.play(&self.shared.synth, &mut self.led, &mut self.delay);

        let cleared = self.session.level;
        self.session.score = self.session.score.saturating_add(cleared as u16 * 10);
        self.session.level = cleared.saturating_add(1);
        self.session.speed_ms = self.config.next_speed_ms(self.session.speed_ms);

        self.display.show_score(self.session.score);
        self.wait_ms(1000);

        if self.session.level > self.config.max_sequence {
            info!("won, score {}", self.session.score);
            self.display.print("YOU WIN!");
            cue::WIN.play(&self.shared.synth, &mut self.led, &mut self.delay);
            return Phase::Menu;
        }
        Phase::ShowPattern
    }

    fn failure(&mut self) -> Phase {
        Color::OFF.apply(&mut self.led);
        self.display.print("WRONG!");
        cue::FAILURE.play(&self.shared.synth, &mut self.led, &mut self.delay);
        Phase::GameOver
    }

    fn game_over(&mut self) -> Phase {
        info!(
            "game over at level {}, score {}",
            self.session.level, self.session.score
        );
        self.display.show_score(self.session.score);
        self.wait_ms(2000);
        self.display.print("GAME");
        self.wait_ms(500);

        match self.config.game_over {
            GameOverPolicy::AutoAdvance => {
                self.display.print("OVER");
                self.wait_ms(1000);
            }
            GameOverPolicy::WaitForKey => {
                self.keys.discard_pending();
                self.display.print("OVER");
                self.keys.wait_press(&mut self.delay);
            }
        }
        Phase::Menu
    }

    fn show_digit(&mut self, digit: u8) {
        self.display.show_digit(digit);
        Color::for_digit(digit).apply(&mut self.led);
    }

    fn wait_ms(&mut self, ms: u64) {
        self.delay.wait(Duration::from_millis(ms));
    }
}
