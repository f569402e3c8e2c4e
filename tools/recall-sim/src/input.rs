use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use recall::keypad::Key;
use tracing::{debug, warn};

use crate::board::Matrix;

/// How long a typed key stays closed, and how long it stays open after.
const HOLD: Duration = Duration::from_millis(40);
const GAP: Duration = Duration::from_millis(40);

/// A comma in the input waits this long before the next key.
const PAUSE: Duration = Duration::from_millis(1000);

enum Stroke {
    Key(Key),
    Pause,
}

/// Where keystrokes come from.
pub enum Source {
    Stdin,
    Script(String),
}

/// Read keys from `source` and press them on `matrix` one at a time. The
/// returned thread ends once the source is exhausted and every key was typed.
pub fn spawn(source: Source, matrix: &'static Matrix) -> JoinHandle<()> {
    let (tx, rx) = unbounded();
    thread::spawn(move || read(source, tx));
    thread::spawn(move || type_keys(rx, matrix))
}

fn read(source: Source, tx: Sender<Stroke>) {
    let send = |line: &str| {
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            let stroke = match (c, Key::from_char(c)) {
                (',', _) => Stroke::Pause,
                (_, Some(key)) => Stroke::Key(key),
                (_, None) => {
                    warn!("no key for {c:?}");
                    continue;
                }
            };
            if tx.send(stroke).is_err() {
                return false;
            }
        }
        true
    };

    match source {
        Source::Script(script) => {
            send(&script);
        }
        Source::Stdin => {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) if send(&line) => {}
                    Ok(_) => break,
                    Err(e) => {
                        warn!("stdin: {e}");
                        break;
                    }
                }
            }
        }
    }
    debug!("input exhausted");
}

fn type_keys(rx: Receiver<Stroke>, matrix: &Matrix) {
    for stroke in rx {
        match stroke {
            Stroke::Key(key) => {
                debug!("typing {key}");
                matrix.press(key);
                thread::sleep(HOLD);
                matrix.release(key);
                thread::sleep(GAP);
            }
            Stroke::Pause => thread::sleep(PAUSE),
        }
    }
}
