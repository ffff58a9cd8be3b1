//! Per-frame script hook.

use boss_arena_core::{Command, Event, Position, Timestamp};
use boss_arena_world::{apply, query, BossSnapshot, World};
use tracing::trace;

/// Access to the world handed to scripts once per frame.
///
/// Scripts see the same operations as every other system: read-only queries
/// and mutations expressed as [`Command`] values.
#[derive(Debug)]
pub struct ScriptContext<'a> {
    world: &'a mut World,
    now: Timestamp,
    events: &'a mut Vec<Event>,
}

impl<'a> ScriptContext<'a> {
    /// Wraps the world for the duration of one hook invocation.
    pub fn new(world: &'a mut World, now: Timestamp, events: &'a mut Vec<Event>) -> Self {
        Self { world, now, events }
    }

    /// Read-only view of the world for use with [`query`] functions.
    #[must_use]
    pub fn world(&self) -> &World {
        self.world
    }

    /// Time of the frame being processed.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(&self) -> Position {
        query::player_position(self.world)
    }

    /// Plain copy of the boss, if present.
    #[must_use]
    pub fn boss(&self) -> Option<BossSnapshot> {
        query::boss(self.world)
    }

    /// Applies a command and records the events it produced.
    pub fn apply(&mut self, command: Command) {
        apply(self.world, command, self.events);
    }
}

/// Opaque hook invoked once per frame after the boss update.
pub trait ScriptHook {
    /// Runs every registered script.
    fn execute_all(&mut self, context: &mut ScriptContext<'_>);
}

/// Script callable by a [`ScriptHost`].
pub type Script = Box<dyn FnMut(&mut ScriptContext<'_>)>;

/// Runs named scripts in registration order.
#[derive(Default)]
pub struct ScriptHost {
    scripts: Vec<(String, Script)>,
}

impl ScriptHost {
    /// Creates a host without scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a script that runs after the ones registered before it.
    pub fn register<F>(&mut self, name: impl Into<String>, script: F)
    where
        F: FnMut(&mut ScriptContext<'_>) + 'static,
    {
        self.scripts.push((name.into(), Box::new(script)));
    }

    /// Names of the registered scripts in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Reports whether no scripts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ScriptHook for ScriptHost {
    fn execute_all(&mut self, context: &mut ScriptContext<'_>) {
        for (name, script) in &mut self.scripts {
            trace!(script = %name, "running script");
            script(context);
        }
    }
}
