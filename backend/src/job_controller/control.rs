//! Cooperative pause/resume/stop for a running merge job.
//!
//! The HTTP handlers flip the flags; the worker thread calls
//! [`JobControl::checkpoint`] before each row and blocks on a condition
//! variable while the job is paused. A stop never interrupts work already in
//! progress: it is observed at the next checkpoint or wakes a paused worker.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    stopped: bool,
}

/// What the worker should do after a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Not paused; carry on with the next row.
    Proceed,
    /// Was paused and has been resumed.
    Resumed,
    /// A stop was requested; process no further rows.
    Stop,
}

#[derive(Debug, Default)]
pub struct JobControl {
    flags: Mutex<Flags>,
    signal: Condvar,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pause(&self) {
        self.flags().paused = true;
    }

    pub fn resume(&self) {
        self.flags().paused = false;
        self.signal.notify_all();
    }

    /// Requests a stop. Also releases a worker blocked in a pause.
    pub fn stop(&self) {
        self.flags().stopped = true;
        self.signal.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.flags().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.flags().stopped
    }

    /// Called by the worker between rows.
    ///
    /// Stop is checked first. If the job is paused, `on_pause` runs once
    /// (without the lock held) and the calling thread then sleeps until
    /// either `resume` or `stop` is called.
    pub fn checkpoint(&self, on_pause: impl FnOnce()) -> Checkpoint {
        {
            let flags = self.flags();
            if flags.stopped {
                return Checkpoint::Stop;
            }
            if !flags.paused {
                return Checkpoint::Proceed;
            }
        }

        on_pause();

        let mut flags = self.flags();
        while flags.paused && !flags.stopped {
            flags = self
                .signal
                .wait(flags)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if flags.stopped {
            Checkpoint::Stop
        } else {
            Checkpoint::Resumed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn idle_control_proceeds() {
        let control = JobControl::new();
        let mut paused = false;
        assert_eq!(control.checkpoint(|| paused = true), Checkpoint::Proceed);
        assert!(!paused);
    }

    #[test]
    fn stop_wins_over_pause() {
        let control = JobControl::new();
        control.pause();
        control.stop();
        assert_eq!(control.checkpoint(|| panic!("must not pause")), Checkpoint::Stop);
    }

    #[test]
    fn paused_worker_waits_for_resume() {
        let control = Arc::new(JobControl::new());
        control.pause();

        let (paused_tx, paused_rx) = mpsc::channel();
        let worker = {
            let control = control.clone();
            thread::spawn(move || control.checkpoint(move || paused_tx.send(()).unwrap()))
        };

        paused_rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!worker.is_finished());

        control.resume();
        assert_eq!(worker.join().unwrap(), Checkpoint::Resumed);
    }

    #[test]
    fn stop_releases_paused_worker() {
        let control = Arc::new(JobControl::new());
        control.pause();

        let (paused_tx, paused_rx) = mpsc::channel();
        let worker = {
            let control = control.clone();
            thread::spawn(move || control.checkpoint(move || paused_tx.send(()).unwrap()))
        };

        paused_rx.recv().unwrap();
        control.stop();
        assert_eq!(worker.join().unwrap(), Checkpoint::Stop);
        assert!(control.is_stopped());
    }
}
