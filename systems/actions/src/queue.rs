//! Queue of pending timed effects.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use boss_arena_core::{ActionKind, Position, Timestamp};

/// Handle that can cancel a scheduled effect before it resolves.
#[derive(Clone, Debug, Default)]
pub struct EffectToken {
    cancelled: Arc<AtomicBool>,
}

impl EffectToken {
    /// Prevents the associated effect from resolving.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Reports whether the associated effect was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Damage scheduled to land on the boss at a later time.
#[derive(Clone, Debug)]
pub struct PendingEffect {
    /// Time at which the effect resolves.
    pub due: Timestamp,
    /// Action that scheduled the effect.
    pub action: ActionKind,
    /// Damage requested before falloff.
    pub amount: u32,
    /// Player position captured when the action was triggered.
    pub source: Position,
    token: EffectToken,
}

impl PendingEffect {
    /// Creates an effect with a fresh cancellation token.
    #[must_use]
    pub fn new(due: Timestamp, action: ActionKind, amount: u32, source: Position) -> Self {
        Self {
            due,
            action,
            amount,
            source,
            token: EffectToken::default(),
        }
    }

    /// Token cancelling this effect.
    #[must_use]
    pub fn token(&self) -> &EffectToken {
        &self.token
    }
}

/// Thread-safe queue of effects ordered by due time.
#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Mutex<Vec<PendingEffect>>,
}

impl EffectQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingEffect>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an effect and returns its cancellation token.
    pub fn schedule(&self, effect: PendingEffect) -> EffectToken {
        let token = effect.token.clone();
        self.lock().push(effect);
        token
    }

    /// Removes every effect due at `now`, in due order.
    ///
    /// Effects scheduled for the same instant keep their scheduling order.
    /// Cancelled effects are discarded.
    pub fn drain_due(&self, now: Timestamp) -> Vec<PendingEffect> {
        let mut pending = self.lock();
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|effect| effect.due <= now);
        *pending = waiting;
        drop(pending);

        due.retain(|effect| !effect.token.is_cancelled());
        due.sort_by_key(|effect| effect.due);
        due
    }

    /// Cancels every pending effect.
    pub fn cancel_all(&self) {
        for effect in self.lock().iter() {
            effect.token.cancel();
        }
    }

    /// Earliest due time among effects that were not cancelled.
    #[must_use]
    pub fn next_due(&self) -> Option<Timestamp> {
        self.lock()
            .iter()
            .filter(|effect| !effect.token.is_cancelled())
            .map(|effect| effect.due)
            .min()
    }

    /// Number of queued effects, cancelled ones included until drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(due_ms: u64, amount: u32) -> PendingEffect {
        PendingEffect::new(
            Timestamp::from_millis(due_ms),
            ActionKind::Light,
            amount,
            Position::new(0, 0),
        )
    }

    #[test]
    fn drains_only_due_effects_in_order() {
        let queue = EffectQueue::new();
        let _ = queue.schedule(effect(900, 3));
        let _ = queue.schedule(effect(500, 1));
        let _ = queue.schedule(effect(500, 2));
        let _ = queue.schedule(effect(1_500, 4));

        let due: Vec<_> = queue
            .drain_due(Timestamp::from_millis(1_000))
            .into_iter()
            .map(|effect| effect.amount)
            .collect();
        assert_eq!(due, vec![1, 2, 3]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(Timestamp::from_millis(1_500)));
    }

    #[test]
    fn cancelled_effects_never_resolve() {
        let queue = EffectQueue::new();
        let token = queue.schedule(effect(100, 1));
        let _ = queue.schedule(effect(100, 2));
        token.cancel();

        let due = queue.drain_due(Timestamp::from_millis(100));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].amount, 2);
    }

    #[test]
    fn cancel_all_empties_next_due() {
        let queue = EffectQueue::new();
        let _ = queue.schedule(effect(100, 1));
        let _ = queue.schedule(effect(200, 2));
        queue.cancel_all();
        assert_eq!(queue.next_due(), None);
        assert!(queue.drain_due(Timestamp::from_millis(1_000)).is_empty());
        assert!(queue.is_empty());
    }
}
