//! Update trigger.
//!
//! Merges a fixed polling interval with ad-hoc "check now" signals into a
//! stream of pulses.  Signals are coalesced: any number of
//! [`UpdateTrigger::signal_now`] calls made while a listener is busy
//! result in a single pending pulse for that listener.
//!
//! Every listener gets its own timer and its own pending slot, so two
//! listeners never split a burst of signals between them.

use std::time::Duration;

use log::debug;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Smallest interval the timer accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct UpdateTrigger {
    interval: Duration,
    notify: watch::Sender<u64>,
    shutdown: CancellationToken,
}

impl UpdateTrigger {
    /// Creates a trigger that fires every `interval`. A zero interval is
    /// raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            interval: interval.max(MIN_INTERVAL),
            notify,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Requests an immediate check from every listener. Never blocks, and
    /// works whether or not anyone is listening yet.
    pub fn signal_now(&self) {
        self.notify.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Starts a new listener.
    ///
    /// The listener yields one pulse right away, then one per timer tick
    /// or pending signal, until it is cancelled or dropped, or the trigger
    /// shuts down.
    ///
    /// Signals raised before this call are covered by the first pulse and
    /// do not produce a second one.
    pub fn listen(&self) -> Listener {
        let (tx, rx) = mpsc::channel(1);
        let cancel = self.shutdown.child_token();
        let notify = self.notify.subscribe();

        tokio::spawn(forward(self.interval, notify, tx, cancel.clone()));

        Listener { rx, cancel }
    }

    /// Stops every listener created from this trigger.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

async fn forward(
    period: Duration,
    mut notify: watch::Receiver<u64>,
    tx: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    if tx.send(()).await.is_err() {
        return;
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // A signal raised alongside the tick is served by this pulse.
                notify.borrow_and_update();
            }
            changed = notify.changed() => {
                if changed.is_err() {
                    // Trigger dropped.
                    break;
                }
                // A tick that came due alongside the signal is served too.
                ticker.reset();
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(()) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Update trigger listener stopped");
}

/// One consumer's stream of update pulses.
///
/// Dropping the listener stops its background task.
pub struct Listener {
    rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

impl Listener {
    /// Waits for the next pulse. Returns `None` once the listener has
    /// been stopped and every buffered pulse was consumed.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Stops this listener only.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
