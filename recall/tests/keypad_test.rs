use std::time::Duration;

use recall::hal::Delay;
use recall::keypad::{KEY_COUNT, Key, KeyEvent, KeyEvents, KeyHistory, Rows};
use recall::DebouncePolicy;
mod common;
use common::Matrix;

/// Feed `samples` for one key straight into its column.
fn feed(history: &KeyHistory, key: Key, samples: &[bool]) {
    for &closed in samples {
        let rows = if closed { Rows::only(key.row()) } else { Rows::empty() };
        history.scan_tick(key.column(), rows);
    }
}

fn drain(events: &mut KeyEvents<'_>) -> Vec<KeyEvent> {
    std::iter::from_fn(|| events.poll_event()).collect()
}

// =============================================================================
// Stable window
// =============================================================================

#[test]
fn test_short_pulses_never_press() {
    for index in 0..KEY_COUNT {
        let key = Key::from_index(index).unwrap();
        let history = KeyHistory::new(DebouncePolicy::Stable);
        let mut events = KeyEvents::new(&history);

        for width in 1..5 {
            let mut samples = vec![true; width];
            samples.extend([false; 5]);
            feed(&history, key, &samples);
        }
        assert_eq!(drain(&mut events), vec![], "key {key}");
    }
}

#[test]
fn test_chatter_around_a_press() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let mut events = KeyEvents::new(&history);
    let key = Key::from_char('8').unwrap();

    // bounce in, hold, bounce out
    feed(&history, key, &[true, false, true, true, false, true, true, true, true, true]);
    feed(&history, key, &[true; 20]);
    feed(&history, key, &[false, true, false, false, true, false, false, false, false, false]);

    assert_eq!(
        drain(&mut events),
        vec![KeyEvent::Press(key), KeyEvent::Release(key)]
    );
}

#[test]
fn test_presses_and_releases_alternate() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let mut events = KeyEvents::new(&history);
    let key = Key::from_char('#').unwrap();

    for _ in 0..3 {
        feed(&history, key, &[true; 6]);
        feed(&history, key, &[false; 6]);
    }
    // a reader that falls behind still sees every transition, in order
    let seen = drain(&mut events);
    assert_eq!(seen.len(), 6);
    assert!(seen.iter().step_by(2).all(|event| event.is_press()));
    assert!(seen.iter().skip(1).step_by(2).all(|event| !event.is_press()));
}

// =============================================================================
// Rising edge
// =============================================================================

#[test]
fn test_rising_edge_fires_on_third_sample() {
    let history = KeyHistory::new(DebouncePolicy::RisingEdge);
    let mut events = KeyEvents::new(&history);
    let key = Key::from_char('4').unwrap();

    feed(&history, key, &[false, false]);
    assert_eq!(events.poll_event(), None);
    feed(&history, key, &[true]);
    assert_eq!(events.poll_event(), Some(KeyEvent::Press(key)));
}

#[test]
fn test_rising_edge_ignores_single_gaps() {
    let history = KeyHistory::new(DebouncePolicy::RisingEdge);
    let mut events = KeyEvents::new(&history);
    let key = Key::from_char('B').unwrap();

    feed(&history, key, &[false, false, true, false, true, true, false, true]);
    assert_eq!(drain(&mut events), vec![KeyEvent::Press(key)]);
}

// =============================================================================
// Scanning
// =============================================================================

#[test]
fn test_scan_only_samples_driven_column() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let mut events = KeyEvents::new(&history);
    let mut matrix = Matrix::new();
    let key = Key::from_char('C').unwrap();
    matrix.closed = Some(key);

    // five full sweeps sample each column five times
    for _ in 0..5 * 4 {
        history.on_scan_tick(&mut matrix);
    }
    assert_eq!(drain(&mut events), vec![KeyEvent::Press(key)]);
    for other in (0..KEY_COUNT).filter(|&i| i != key.index()) {
        assert_eq!(history.window(Key::from_index(other).unwrap()), 0);
    }
}

#[test]
fn test_simultaneous_keys_come_out_in_index_order() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let mut events = KeyEvents::new(&history);

    for _ in 0..5 {
        for column in 0..4 {
            history.scan_tick(column, Rows::ROW_3 | Rows::ROW_1);
        }
    }
    let pressed: String = drain(&mut events)
        .into_iter()
        .map(|event| event.key().char())
        .collect();
    assert_eq!(pressed, "456B*0#D");
}

struct ScanningDelay<'a> {
    history: &'a KeyHistory,
    matrix: Matrix,
    elapsed_ms: u32,
    press_at_ms: u32,
    key: Key,
}

impl Delay for ScanningDelay<'_> {
    fn wait(&mut self, duration: Duration) {
        for _ in 0..duration.as_millis() {
            self.elapsed_ms += 1;
            self.matrix.closed = match self.elapsed_ms {
                t if t >= self.press_at_ms && t < self.press_at_ms + 40 => Some(self.key),
                _ => None,
            };
            self.history.on_scan_tick(&mut self.matrix);
        }
    }
}

#[test]
fn test_wait_press_blocks_until_debounced() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let mut events = KeyEvents::new(&history);
    let key = Key::from_char('7').unwrap();
    let mut delay = ScanningDelay {
        history: &history,
        matrix: Matrix::new(),
        elapsed_ms: 0,
        press_at_ms: 100,
        key,
    };

    assert_eq!(events.wait_press(&mut delay), key);
    // five samples of one column take at least 17 scan ticks
    assert!(delay.elapsed_ms >= 100 + 16);
    assert!(delay.elapsed_ms < 100 + 40);
}

#[test]
fn test_new_reader_skips_history() {
    let history = KeyHistory::new(DebouncePolicy::Stable);
    let key = Key::from_char('2').unwrap();
    feed(&history, key, &[true; 5]);

    let mut events = KeyEvents::new(&history);
    assert_eq!(events.poll_event(), None);
    feed(&history, key, &[false; 5]);
    assert_eq!(events.poll_event(), Some(KeyEvent::Release(key)));
}
