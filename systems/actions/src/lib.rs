#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Delayed-damage player actions for Boss Arena.
//!
//! Triggering an action captures the player position and schedules a
//! [`PendingEffect`]. Effects are resolved later against the shared boss
//! either by the frame driver through [`resolve_due`] or by a dedicated
//! [`TimerThread`].

mod queue;
mod timer;

use std::{sync::Arc, time::Duration};

use boss_arena_core::{
    ActionKind, CooldownWindow, DamageRejection, Event, Position, Timestamp,
    HEAVY_ACTION_COOLDOWN, HEAVY_ACTION_DAMAGE, HEAVY_ACTION_DELAY, LIGHT_ACTION_DAMAGE,
    LIGHT_ACTION_DELAY,
};
use boss_arena_world::BossHandle;
use tracing::{debug, info, warn};

pub use queue::{EffectQueue, EffectToken, PendingEffect};
pub use timer::TimerThread;

/// Schedules light and heavy actions onto a shared effect queue.
#[derive(Debug)]
pub struct ActionHandlers {
    queue: Arc<EffectQueue>,
    heavy_cooldown: CooldownWindow,
}

impl Default for ActionHandlers {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionHandlers {
    /// Creates handlers with their own queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_queue(Arc::new(EffectQueue::new()))
    }

    /// Creates handlers that schedule onto `queue`.
    #[must_use]
    pub fn with_queue(queue: Arc<EffectQueue>) -> Self {
        Self {
            queue,
            heavy_cooldown: CooldownWindow::new(HEAVY_ACTION_COOLDOWN),
        }
    }

    /// Queue receiving scheduled effects.
    #[must_use]
    pub fn queue(&self) -> &Arc<EffectQueue> {
        &self.queue
    }

    /// Time left before the heavy action may be used again.
    #[must_use]
    pub fn heavy_cooldown_remaining(&self, now: Timestamp) -> Duration {
        self.heavy_cooldown.remaining(now)
    }

    /// Triggers `action` from `source`, dispatching to the matching handler.
    pub fn trigger(
        &mut self,
        action: ActionKind,
        source: Position,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> Option<EffectToken> {
        match action {
            ActionKind::Light => Some(self.trigger_light(source, now, out_events)),
            ActionKind::Heavy => self.trigger_heavy(source, now, out_events),
        }
    }

    /// Schedules light damage. The light action has no cooldown.
    pub fn trigger_light(
        &mut self,
        source: Position,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> EffectToken {
        self.schedule(
            ActionKind::Light,
            LIGHT_ACTION_DAMAGE,
            LIGHT_ACTION_DELAY,
            source,
            now,
            out_events,
        )
    }

    /// Schedules heavy damage if its cooldown has elapsed.
    ///
    /// The cooldown starts at trigger time, not when the damage lands. When
    /// the action is still cooling down nothing is scheduled and an
    /// [`Event::ActionOnCooldown`] reports the time left.
    pub fn trigger_heavy(
        &mut self,
        source: Position,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> Option<EffectToken> {
        if !self.heavy_cooldown.is_ready(now) {
            let remaining = self.heavy_cooldown.remaining(now);
            warn!(
                "{} on cooldown: {}s remaining",
                ActionKind::Heavy,
                format_cooldown(remaining)
            );
            out_events.push(Event::ActionOnCooldown {
                action: ActionKind::Heavy,
                remaining,
            });
            return None;
        }

        self.heavy_cooldown.trigger(now);
        Some(self.schedule(
            ActionKind::Heavy,
            HEAVY_ACTION_DAMAGE,
            HEAVY_ACTION_DELAY,
            source,
            now,
            out_events,
        ))
    }

    fn schedule(
        &self,
        action: ActionKind,
        amount: u32,
        delay: Duration,
        source: Position,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> EffectToken {
        let due = now.saturating_add(delay);
        debug!(%action, %source, %due, "action scheduled");
        out_events.push(Event::ActionTriggered {
            action,
            source,
            due,
        });
        self.queue
            .schedule(PendingEffect::new(due, action, amount, source))
    }
}

/// Formats a cooldown in seconds with one decimal place.
#[must_use]
pub fn format_cooldown(remaining: Duration) -> String {
    format!("{:.1}", remaining.as_secs_f64())
}

/// Applies every effect due at `now` to the boss and returns how many were resolved.
///
/// Each effect is re-validated under the boss lock, so an effect that lands
/// after the boss died is reported as [`DamageRejection::Dead`] and skipped.
pub fn resolve_due(
    queue: &EffectQueue,
    boss: &BossHandle,
    now: Timestamp,
    out_events: &mut Vec<Event>,
) -> usize {
    let due = queue.drain_due(now);
    for effect in &due {
        let outcome = boss.apply_damage(
            Some(effect.action),
            effect.amount,
            effect.source,
            now,
            out_events,
        );
        match outcome {
            Ok(applied) => {
                info!(
                    action = %effect.action,
                    applied = applied.applied,
                    hit_points = applied.remaining_hit_points,
                    "{} landed, boss at {} HP",
                    effect.action,
                    applied.remaining_hit_points
                );
                if applied.killed {
                    info!("boss defeated by {}", effect.action);
                }
            }
            Err(DamageRejection::Dead) => {
                debug!(action = %effect.action, "boss already dead, effect skipped");
            }
            Err(reason) => {
                debug!(action = %effect.action, ?reason, "effect rejected");
            }
        }
    }
    due.len()
}
