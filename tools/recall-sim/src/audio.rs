use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use recall::synth::{SAMPLE_RATE, Synth};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, warn};

use crate::clock;

/// Samples rendered per millisecond tick.
const SAMPLES_PER_TICK: usize = SAMPLE_RATE as usize / 1000;

/// One second of audio.
const RING_CAPACITY: usize = SAMPLE_RATE as usize;

/// Runs the sample interrupt on the host. Every DAC code goes into a ring
/// buffer; a writer thread drains it to `dump` as 16-bit little-endian words.
pub struct AudioBridge {
    ticker: JoinHandle<()>,
    writer: Option<JoinHandle<io::Result<u64>>>,
}

impl AudioBridge {
    pub fn start(
        synth: &'static Synth,
        dump: Option<&Path>,
        running: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let (producer, consumer) = RingBuffer::<u16>::new(RING_CAPACITY);

        let writer = match dump {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating audio dump {}", path.display()))?;
                Some(thread::spawn(move || drain(consumer, BufWriter::new(file))))
            }
            None => None,
        };
        let mut producer = writer.is_some().then_some(producer);

        let ticker = clock::spawn_ticker("audio", running, move || {
            for _ in 0..SAMPLES_PER_TICK {
                let code = synth.on_sample_tick();
                if let Some(producer) = producer.as_mut() {
                    push(producer, code);
                }
            }
        });

        Ok(Self { ticker, writer })
    }

    /// Wait for both threads after `running` was cleared.
    pub fn finish(self) -> anyhow::Result<()> {
        let _ = self.ticker.join();
        if let Some(writer) = self.writer {
            let samples = writer
                .join()
                .map_err(|_| anyhow::anyhow!("audio writer panicked"))?
                .context("writing audio dump")?;
            debug!(
                "wrote {samples} samples ({:.1}s)",
                samples as f64 / SAMPLE_RATE as f64
            );
        }
        Ok(())
    }
}

fn push(producer: &mut Producer<u16>, code: u16) {
    if producer.push(code).is_err() {
        warn!("audio ring full; dropping sample");
    }
}

/// Runs until the ticker has stopped and dropped its producer.
fn drain(mut consumer: Consumer<u16>, mut out: impl Write) -> io::Result<u64> {
    let mut written = 0;
    loop {
        let mut idle = true;
        while let Ok(code) = consumer.pop() {
            out.write_all(&code.to_le_bytes())?;
            written += 1;
            idle = false;
        }
        if idle {
            if consumer.is_abandoned() && consumer.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
    out.flush()?;
    Ok(written)
}
