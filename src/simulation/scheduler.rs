//! Periodic tick driver, decoupled from the tick logic itself

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::simulation::engine::SimulationEngine;

/// Drives `SimulationEngine::tick` on a real-time cadence. Owns start and
/// stop; the same tick logic runs manually in tests. Stopping is the only
/// cancellation point: an in-flight tick always completes.
#[derive(Default)]
pub struct TickScheduler {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

/// Sleep slices stay short so stop requests are honored promptly
const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Begin ticking the engine every `tick_interval_ms / time_multiplier`
    /// real milliseconds. Returns false if already running or the
    /// multiplier is not positive.
    pub fn start(&mut self, engine: Arc<Mutex<SimulationEngine>>, time_multiplier: f64) -> bool {
        if self.is_running() || time_multiplier <= 0.0 {
            return false;
        }

        let interval_ms = {
            let engine = match engine.lock() {
                Ok(engine) => engine,
                Err(_) => return false,
            };
            engine.config.tick_interval_ms
        };
        let period = Duration::from_millis(
            ((interval_ms as f64 / time_multiplier).max(1.0)) as u64,
        );

        self.stop.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.stop);

        tracing::info!("simulation driver started, period {:?}", period);
        self.handle = Some(std::thread::spawn(move || {
            let mut elapsed = Duration::ZERO;
            loop {
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                std::thread::sleep(POLL_INTERVAL);
                elapsed += POLL_INTERVAL;
                if elapsed < period {
                    continue;
                }
                elapsed = Duration::ZERO;

                match engine.lock() {
                    Ok(mut engine) => engine.tick(),
                    Err(_) => break,
                }
            }
        }));
        true
    }

    /// Stop the driver and wait for any in-flight tick to finish.
    /// Returns false if nothing was running.
    pub fn stop(&mut self) -> bool {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => return false,
        };
        self.stop.store(true, Ordering::SeqCst);
        let _ = handle.join();
        tracing::info!("simulation driver stopped");
        true
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    fn engine() -> Arc<Mutex<SimulationEngine>> {
        let config = SimulationConfig {
            tick_interval_ms: 20,
            random_event_frequency: 0.0,
            ..Default::default()
        };
        Arc::new(Mutex::new(SimulationEngine::new(config, 5)))
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let engine = engine();
        let mut scheduler = TickScheduler::new();

        assert!(!scheduler.is_running());
        assert!(scheduler.start(Arc::clone(&engine), 1.0));
        assert!(scheduler.is_running());
        // Second start is refused
        assert!(!scheduler.start(Arc::clone(&engine), 1.0));

        std::thread::sleep(Duration::from_millis(120));
        assert!(scheduler.stop());
        assert!(!scheduler.stop());

        let ticks = engine.lock().unwrap().ticks();
        assert!(ticks > 0, "driver never ticked");
    }

    #[test]
    fn test_rejects_bad_multiplier() {
        let mut scheduler = TickScheduler::new();
        assert!(!scheduler.start(engine(), 0.0));
        assert!(!scheduler.start(engine(), -2.0));
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let engine = engine();
        let mut scheduler = TickScheduler::new();
        scheduler.start(Arc::clone(&engine), 1.0);
        std::thread::sleep(Duration::from_millis(60));
        scheduler.stop();

        let ticks = engine.lock().unwrap().ticks();
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(engine.lock().unwrap().ticks(), ticks);
    }
}
