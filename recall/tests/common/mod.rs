#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use recall::display::{CELL_COUNT, DisplayCells, encode_text};
use recall::game::Game;
use recall::hal::{Delay, KeypadPort, RgbSink};
use recall::keypad::{Key, Rows};
use recall::led::Color;
use recall::random::StdRandom;
use recall::synth::Channel;
use recall::{GameConfig, Shared};

/// How long the typist holds a key down, then lets it go.
pub const HOLD_MS: u32 = 40;
pub const GAP_MS: u32 = 40;

/// Screens on which the game is waiting for a key.
const PROMPTS: [&str; 3] = ["PRESS # ", "INPUT...", "OVER"];

/// A keypad matrix with at most one key closed.
pub struct Matrix {
    pub closed: Option<Key>,
    pub driven: u8,
}

impl Matrix {
    pub fn new() -> Self {
        Self {
            closed: None,
            driven: 0,
        }
    }
}

impl KeypadPort for Matrix {
    fn read_rows(&mut self) -> Rows {
        match self.closed {
            Some(key) if key.column() == self.driven => Rows::only(key.row()),
            _ => Rows::empty(),
        }
    }

    fn drive_column(&mut self, column: u8) {
        self.driven = column;
    }
}

struct Inner {
    shared: &'static Shared,
    matrix: Matrix,
    queue: VecDeque<Key>,
    /// Keys pressed at a fixed time, prompt or not.
    scheduled: VecDeque<(u64, Key)>,
    /// Key being typed and how long ago it closed.
    typing: Option<(Key, u32)>,
    now_ms: u64,
    screens: Vec<[u16; CELL_COUNT]>,
    colors: Vec<Color>,
    tones: Vec<(u32, u32)>,
}

impl Inner {
    fn tick(&mut self) {
        self.type_next();
        self.shared.keys.on_scan_tick(&mut self.matrix);

        let screen = self.shared.display.snapshot();
        if self.screens.last() != Some(&screen) {
            self.screens.push(screen);
        }
        let steps = (
            self.shared.synth.step(Channel::A),
            self.shared.synth.step(Channel::B),
        );
        if self.tones.last() != Some(&steps) {
            self.tones.push(steps);
        }
        self.now_ms += 1;
    }

    fn type_next(&mut self) {
        match self.typing {
            Some((key, held)) if held < HOLD_MS => {
                self.matrix.closed = Some(key);
                self.typing = Some((key, held + 1));
            }
            Some((key, held)) if held < HOLD_MS + GAP_MS => {
                self.matrix.closed = None;
                self.typing = Some((key, held + 1));
            }
            _ => {
                self.matrix.closed = None;
                self.typing = None;
                if let Some(&(at_ms, key)) = self.scheduled.front() {
                    if at_ms <= self.now_ms {
                        self.scheduled.pop_front();
                        self.matrix.closed = Some(key);
                        self.typing = Some((key, 1));
                        return;
                    }
                }
                if self.prompting() {
                    if let Some(key) = self.queue.pop_front() {
                        self.matrix.closed = Some(key);
                        self.typing = Some((key, 1));
                    }
                }
            }
        }
    }

    fn prompting(&self) -> bool {
        let screen = self.shared.display.snapshot();
        PROMPTS.iter().any(|prompt| encode_text(prompt) == screen)
    }
}

/// Simulated board: every millisecond of [`Delay`] runs one keypad scan tick
/// against a scripted typist and records what the outputs showed.
///
/// The typist only starts a key while the display shows a prompt, the way a
/// player waits for "INPUT..." before answering.
#[derive(Clone)]
pub struct Bench(Rc<RefCell<Inner>>);

pub type TestGame = Game<'static, &'static DisplayCells, Bench, Bench, StdRandom>;

impl Bench {
    pub fn new(config: &GameConfig) -> Self {
        let shared: &'static Shared = Box::leak(Box::new(Shared::new(config)));
        Self(Rc::new(RefCell::new(Inner {
            shared,
            matrix: Matrix::new(),
            queue: VecDeque::new(),
            scheduled: VecDeque::new(),
            typing: None,
            now_ms: 0,
            screens: Vec::new(),
            colors: Vec::new(),
            tones: Vec::new(),
        })))
    }

    /// A bench and a game wired to it.
    pub fn with_game(config: GameConfig) -> (Bench, TestGame) {
        let bench = Bench::new(&config);
        let shared = bench.shared();
        let game = Game::new(
            config,
            shared,
            &shared.display,
            bench.clone(),
            bench.clone(),
            StdRandom::new(),
        );
        (bench, game)
    }

    pub fn shared(&self) -> &'static Shared {
        self.0.borrow().shared
    }

    pub fn type_keys(&self, keys: &str) {
        let mut inner = self.0.borrow_mut();
        for c in keys.chars() {
            let key = Key::from_char(c).unwrap_or_else(|| panic!("no key {c:?}"));
            inner.queue.push_back(key);
        }
    }

    /// Press `key` once the bench clock reaches `at_ms`, whatever is on
    /// the display. Calls must come in time order.
    pub fn press_at(&self, key: char, at_ms: u64) {
        let key = Key::from_char(key).unwrap_or_else(|| panic!("no key {key:?}"));
        self.0.borrow_mut().scheduled.push_back((at_ms, key));
    }

    pub fn scheduled_keys(&self) -> usize {
        self.0.borrow().scheduled.len()
    }

    pub fn type_digits(&self, digits: &[u8]) {
        for digit in digits {
            self.type_keys(&digit.to_string());
        }
    }

    pub fn pending_keys(&self) -> usize {
        self.0.borrow().queue.len()
    }

    pub fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }

    pub fn run_ms(&self, ms: u64) {
        for _ in 0..ms {
            self.0.borrow_mut().tick();
        }
    }

    pub fn screen(&self) -> [u16; CELL_COUNT] {
        self.shared().display.snapshot()
    }

    /// Whether `text` was on the display at some point.
    pub fn saw(&self, text: &str) -> bool {
        let cells = encode_text(text);
        self.0.borrow().screens.iter().any(|screen| *screen == cells)
    }

    /// Texts in the order they appeared, as long as each one was shown.
    pub fn saw_in_order(&self, texts: &[&str]) -> bool {
        let inner = self.0.borrow();
        let mut screens = inner.screens.iter();
        texts.iter().all(|text| {
            let cells = encode_text(text);
            screens.any(|screen| *screen == cells)
        })
    }

    pub fn colors(&self) -> Vec<Color> {
        self.0.borrow().colors.clone()
    }

    /// Channel A and B steps, each entry a change.
    pub fn tones(&self) -> Vec<(u32, u32)> {
        self.0.borrow().tones.clone()
    }

    pub fn clear_log(&self) {
        let mut inner = self.0.borrow_mut();
        inner.screens.clear();
        inner.colors.clear();
        inner.tones.clear();
    }
}

impl Delay for Bench {
    fn wait(&mut self, duration: Duration) {
        let mut inner = self.0.borrow_mut();
        for _ in 0..duration.as_millis() {
            inner.tick();
        }
    }
}

impl RgbSink for Bench {
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.0.borrow_mut().colors.push(Color::rgb(r, g, b));
    }
}
