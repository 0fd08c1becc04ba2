use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::{Command, Engine, EngineErrorEvent, Event};

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sender used by consumers to dispatch commands to the engine thread.
pub type EngineCommandSender = mpsc::SyncSender<Command>;

/// Receiver used by consumers to read events emitted by the engine thread.
pub type EngineEventReceiver = mpsc::Receiver<Event>;

/// Runs `engine` on its own thread, one command at a time.
///
/// Failed commands surface as [`Event::Error`]. The thread exits when every
/// sender is dropped or the event receiver goes away.
pub fn spawn_engine_bridge(engine: Engine) -> (EngineCommandSender, EngineEventReceiver) {
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);

    thread::spawn(move || serve_commands(engine, command_rx, event_tx));

    (command_tx, event_rx)
}

fn serve_commands(
    mut engine: Engine,
    commands: mpsc::Receiver<Command>,
    events: mpsc::SyncSender<Event>,
) {
    let mut handled = 0u64;
    let mut rejected = 0u64;

    for command in commands.iter() {
        handled += 1;
        let batch = match engine.handle_command(command) {
            Ok(batch) => batch,
            Err(error) => {
                rejected += 1;
                debug!(%error, "command rejected, forwarding error event");
                vec![Event::Error(EngineErrorEvent::from_error(&error))]
            }
        };
        if batch.into_iter().try_for_each(|event| events.send(event)).is_err() {
            debug!(handled, rejected, "engine bridge stopped: event receiver dropped");
            return;
        }
    }
    debug!(handled, rejected, "engine bridge stopped: command channel closed");
}

/// Handle for a running playback ticker.
#[derive(Debug)]
pub struct PlaybackTicker {
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PlaybackTicker {
    /// Stops issuing ticks and waits for the ticker thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for PlaybackTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wall time accumulated since the last delivered tick.
///
/// Only the microseconds actually sent are consumed, so truncation and
/// dropped sends roll into the next tick instead of being lost.
#[derive(Debug, Clone, Copy)]
struct TickCarry {
    since: Instant,
}

impl TickCarry {
    fn new(since: Instant) -> Self {
        Self { since }
    }

    fn pending_us(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.since).as_micros() as u64
    }

    fn delivered(&mut self, elapsed_us: u64) {
        self.since += Duration::from_micros(elapsed_us);
    }
}

/// Sends a [`Command::Tick`] every `interval` until stopped.
///
/// Ticks go through the same channel as every other command, so they are
/// serialized with edits. The ticks delivered so far always sum to the wall
/// time since the ticker started, to the microsecond; a full channel never
/// blocks the ticker.
pub fn spawn_playback_ticker(commands: EngineCommandSender, interval: Duration) -> PlaybackTicker {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);

    let worker = thread::spawn(move || {
        let mut carry = TickCarry::new(Instant::now());
        while flag.load(Ordering::SeqCst) {
            thread::sleep(interval);
            let elapsed_us = carry.pending_us(Instant::now());
            match commands.try_send(Command::Tick { elapsed_us }) {
                Ok(()) => carry.delivered(elapsed_us),
                Err(mpsc::TrySendError::Full(_)) => {}
                Err(mpsc::TrySendError::Disconnected(_)) => break,
            }
        }
        debug!("playback ticker stopped");
    });

    PlaybackTicker {
        running,
        worker: Some(worker),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::{TickCarry, spawn_engine_bridge, spawn_playback_ticker};
    use crate::api::{Command, Engine, EngineErrorKind, Event};
    use crate::playback::PlaybackState;

    #[test]
    fn bridge_forwards_snapshot_then_command_event() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default());

        command_tx
            .send(Command::SetPlayhead { time: 2.5 })
            .expect("send set playhead");

        let first = event_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("first event");
        let second = event_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("second event");

        assert!(matches!(first, Event::TimelineChanged(_)));
        assert_eq!(second, Event::PlayheadChanged { time: 2.5 });
    }

    #[test]
    fn bridge_emits_error_event_when_command_fails() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default());

        command_tx
            .send(Command::SelectClip { clip_id: Some(42) })
            .expect("send select");

        let event = event_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("error event");
        let Event::Error(error) = event else {
            panic!("expected Event::Error");
        };
        assert_eq!(error.kind, EngineErrorKind::NotFound);
        assert!(error.message.contains("clip not found: 42"));
    }

    #[test]
    fn ticker_moves_playhead_once_playing() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default());
        command_tx.send(Command::Play).expect("send play");

        let ticker = spawn_playback_ticker(command_tx.clone(), Duration::from_millis(5));
        let mut advanced = None;
        for _ in 0..200 {
            let event = event_rx
                .recv_timeout(Duration::from_secs(1))
                .expect("event while playing");
            if let Event::PlayheadChanged { time } = event {
                if time > 0.0 {
                    advanced = Some(time);
                    break;
                }
            }
        }
        drop(event_rx);
        ticker.stop();

        assert!(advanced.is_some(), "playhead should advance while playing");
    }

    #[test]
    fn tick_carry_keeps_sub_microsecond_remainders_and_skipped_sends() {
        let start = Instant::now();
        let mut carry = TickCarry::new(start);
        let mut delivered_us = 0u64;

        for step in 1..=1000u64 {
            let now = start + Duration::from_nanos(1_500_700 * step);
            let elapsed_us = carry.pending_us(now);
            // every third send finds the channel full
            if step % 3 != 0 {
                delivered_us += elapsed_us;
                carry.delivered(elapsed_us);
            }
        }

        assert_eq!(delivered_us, 1_500_700);
    }

    #[test]
    fn ticker_keeps_playhead_in_step_with_wall_time() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default());
        command_tx.send(Command::Play).expect("send play");

        let drainer = thread::spawn(move || {
            let mut playhead = 0.0;
            while let Ok(event) = event_rx.recv() {
                match event {
                    Event::PlayheadChanged { time } => playhead = time,
                    Event::PlaybackChanged {
                        state: PlaybackState::Paused,
                    } => break,
                    _ => {}
                }
            }
            playhead
        });

        let started = Instant::now();
        let ticker = spawn_playback_ticker(command_tx.clone(), Duration::from_millis(2));
        thread::sleep(Duration::from_millis(300));
        ticker.stop();
        let wall = started.elapsed().as_secs_f64();
        command_tx.send(Command::Pause).expect("send pause");

        let playhead = drainer.join().expect("drainer thread");
        assert!(playhead <= wall + 1e-3, "playhead {playhead} ahead of wall {wall}");
        assert!(wall - playhead < 0.05, "playhead {playhead} lags wall {wall}");
    }
}
