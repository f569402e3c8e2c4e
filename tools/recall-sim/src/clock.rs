//! Host replacement for the hardware timers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub const TICK: Duration = Duration::from_millis(1);

/// Call `on_tick` once per millisecond on a named thread until `running` is
/// cleared. Late ticks are caught up rather than skipped, so the callback
/// count tracks wall time.
pub fn spawn_ticker<F>(name: &str, running: Arc<AtomicBool>, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    let name = name.to_owned();
    thread::spawn(move || {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use thread_priority::*;
            // if it didn't work, oh well
            if set_current_thread_priority(ThreadPriority::Max).is_err() {
                debug!("{name} ticker runs at normal priority");
            }
        }

        let mut deadline = Instant::now();
        let mut behind = 0u32;
        while running.load(Ordering::Acquire) {
            deadline += TICK;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
                behind = 0;
            } else {
                behind += 1;
                if behind == 100 {
                    warn!("{name} ticker is 100 ticks behind");
                }
            }
            on_tick();
        }
    })
}
