//! Tokio-backed [`Timer`]: a single pending sleep that publishes
//! [`ControllerEvent::TimerFired`] when it elapses.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use ventmon_domain::event::ControllerEvent;

use crate::ports::{EventPublisher, Timer};

#[derive(Default)]
struct Schedule {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    expired: bool,
}

impl Schedule {
    /// Drop the pending sleep and any unclaimed expiry.
    fn supersede(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.expired = false;
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        self.generation
    }
}

/// Rearmable single-shot timer.
///
/// Arming aborts the pending sleep, if any. An expiry whose event is
/// already queued when the timer is re-armed can no longer be claimed.
/// Must be armed from within a tokio runtime.
pub struct TokioTimer<E> {
    publisher: E,
    schedule: Arc<Mutex<Schedule>>,
}

impl<E> TokioTimer<E>
where
    E: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(publisher: E) -> Self {
        Self {
            publisher,
            schedule: Arc::default(),
        }
    }
}

fn lock(schedule: &Mutex<Schedule>) -> MutexGuard<'_, Schedule> {
    schedule.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E> Timer for TokioTimer<E>
where
    E: EventPublisher + Clone + Send + Sync + 'static,
{
    fn arm(&self, after: Duration) {
        let mut schedule = lock(&self.schedule);
        let generation = schedule.supersede();
        let publisher = self.publisher.clone();
        let shared = Arc::clone(&self.schedule);
        schedule.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            {
                let mut schedule = lock(&shared);
                if schedule.generation != generation {
                    return;
                }
                schedule.expired = true;
                schedule.pending = None;
            }
            if let Err(err) = publisher.publish(ControllerEvent::TimerFired).await {
                tracing::error!(%err, "failed to publish timer event");
            }
        }));
    }

    fn disarm(&self) {
        lock(&self.schedule).supersede();
    }

    fn claim_expiry(&self) -> bool {
        std::mem::take(&mut lock(&self.schedule).expired)
    }
}

impl<E> Drop for TokioTimer<E> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.schedule).pending.take() {
            handle.abort();
        }
    }
}
