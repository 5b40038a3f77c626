// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled expiry of temporary drawings
//!
//! Each pending expiry is a tokio task sleeping for the remaining lifetime,
//! keyed by `(scenario, drawing)` and abortable through its handle. A fired
//! timer only hands its [`ExpiryTicket`] to the owner; the owner re-checks the
//! board before removing anything.

use crate::{DrawingId, ScenarioId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Callback invoked when a timer fires
pub type ExpiryCallback = Arc<dyn Fn(ExpiryTicket) + Send + Sync>;

/// Identifies one scheduled expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryTicket {
    pub scenario_id: ScenarioId,
    pub drawing_id: DrawingId,
    generation: u64,
}

struct PendingExpiry {
    generation: u64,
    handle: AbortHandle,
}

/// Id-keyed table of cancellable expiry timers
#[derive(Default)]
pub struct ExpiryScheduler {
    pending: HashMap<(ScenarioId, DrawingId), PendingExpiry>,
    next_generation: u64,
    on_fire: Option<ExpiryCallback>,
}

impl fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("pending", &self.pending.len())
            .field("wired", &self.on_fire.is_some())
            .finish()
    }
}

impl ExpiryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route fired timers to `callback`
    pub fn wire(&mut self, callback: ExpiryCallback) {
        self.on_fire = Some(callback);
    }

    pub fn is_wired(&self) -> bool {
        self.on_fire.is_some()
    }

    /// (Re)schedule expiry of a drawing after `delay`.
    ///
    /// Returns false if the scheduler is not wired or no tokio runtime is
    /// running; the drawing is then left to a sweep.
    pub fn schedule(&mut self, scenario_id: ScenarioId, drawing_id: DrawingId, delay: Duration) -> bool {
        self.cancel(&scenario_id, &drawing_id);

        let Some(on_fire) = self.on_fire.clone() else {
            tracing::debug!(drawing = %drawing_id, "Expiry scheduler not wired, skipping timer");
            return false;
        };
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    drawing = %drawing_id,
                    "No async runtime available, temporary drawing left for sweep"
                );
                return false;
            }
        };

        self.next_generation += 1;
        let ticket = ExpiryTicket {
            scenario_id,
            drawing_id,
            generation: self.next_generation,
        };

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(ticket);
        });

        self.pending.insert(
            (scenario_id, drawing_id),
            PendingExpiry {
                generation: ticket.generation,
                handle: task.abort_handle(),
            },
        );
        tracing::debug!(drawing = %drawing_id, delay_ms = delay.as_millis() as u64, "Scheduled drawing expiry");
        true
    }

    /// Claim a fired ticket. Returns false if it was cancelled or superseded.
    pub fn complete(&mut self, ticket: ExpiryTicket) -> bool {
        let key = (ticket.scenario_id, ticket.drawing_id);
        match self.pending.get(&key) {
            Some(entry) if entry.generation == ticket.generation => {
                self.pending.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self, scenario_id: &ScenarioId, drawing_id: &DrawingId) -> bool {
        match self.pending.remove(&(*scenario_id, *drawing_id)) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every timer belonging to one scenario
    pub fn cancel_scenario(&mut self, scenario_id: &ScenarioId) -> usize {
        let keys: Vec<_> = self
            .pending
            .keys()
            .filter(|(scenario, _)| scenario == scenario_id)
            .copied()
            .collect();
        for (scenario, drawing) in &keys {
            self.cancel(scenario, drawing);
        }
        keys.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, entry) in self.pending.drain() {
            entry.handle.abort();
        }
        count
    }

    pub fn is_pending(&self, scenario_id: &ScenarioId, drawing_id: &DrawingId) -> bool {
        self.pending.contains_key(&(*scenario_id, *drawing_id))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
