//! Registry of renderable and transient world objects.

use std::{collections::BTreeMap, time::Duration};

use boss_arena_core::{ObjectId, Position, SpriteKey, Timestamp};

/// Explosive left behind by the player; expires after a fixed lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bomb {
    created_at: Timestamp,
    lifetime: Duration,
}

impl Bomb {
    /// Creates a bomb that lives for `lifetime` starting at `created_at`.
    #[must_use]
    pub const fn new(created_at: Timestamp, lifetime: Duration) -> Self {
        Self {
            created_at,
            lifetime,
        }
    }

    /// Time at which the bomb was placed.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// How long the bomb lives.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Reports whether the bomb's lifetime has run out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.saturating_since(self.created_at) >= self.lifetime
    }
}

/// Variants of objects stored in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Purely visual object.
    Decoration {
        /// Sprite drawn for the decoration.
        sprite: SpriteKey,
    },
    /// Transient explosive.
    Bomb(Bomb),
    /// Registry identity of the player; drawn separately.
    PlayerAnchor,
}

/// Entry of the object registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldObject {
    id: ObjectId,
    position: Position,
    kind: ObjectKind,
}

impl WorldObject {
    /// Identifier of the object.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Location of the object.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Variant of the object.
    #[must_use]
    pub const fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Sprite to draw, or `None` for objects the render pass skips.
    #[must_use]
    pub const fn sprite(&self) -> Option<SpriteKey> {
        match self.kind {
            ObjectKind::Decoration { sprite } => Some(sprite),
            ObjectKind::Bomb(_) => Some(SpriteKey::Bomb),
            ObjectKind::PlayerAnchor => None,
        }
    }

    /// Whether the render pass draws this object.
    #[must_use]
    pub const fn is_renderable(&self) -> bool {
        self.sprite().is_some()
    }

    /// Lifetime of transient objects; permanent objects have none.
    #[must_use]
    pub const fn lifetime(&self) -> Option<Duration> {
        match &self.kind {
            ObjectKind::Bomb(bomb) => Some(bomb.lifetime()),
            ObjectKind::Decoration { .. } | ObjectKind::PlayerAnchor => None,
        }
    }

    /// Reports whether the object is transient and its lifetime ran out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match &self.kind {
            ObjectKind::Bomb(bomb) => bomb.is_expired(now),
            ObjectKind::Decoration { .. } | ObjectKind::PlayerAnchor => false,
        }
    }
}

/// Owns every active world object keyed by identifier.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    entries: BTreeMap<ObjectId, WorldObject>,
    next_id: u32,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its freshly allocated identifier.
    ///
    /// Allocation wraps around the id space and skips identifiers that are
    /// still in use, so a live object is never replaced.
    pub fn insert(&mut self, position: Position, kind: ObjectKind) -> ObjectId {
        let mut candidate = self.next_id;
        while self.entries.contains_key(&ObjectId::new(candidate)) {
            candidate = candidate.wrapping_add(1);
        }
        let id = ObjectId::new(candidate);
        self.next_id = candidate.wrapping_add(1);
        let _ = self.entries.insert(id, WorldObject { id, position, kind });
        id
    }

    /// Removes the object with the provided identifier.
    pub fn remove(&mut self, id: ObjectId) -> Option<WorldObject> {
        self.entries.remove(&id)
    }

    /// Moves an existing object, returning whether it was found.
    pub fn relocate(&mut self, id: ObjectId, position: Position) -> bool {
        match self.entries.get_mut(&id) {
            Some(object) => {
                object.position = position;
                true
            }
            None => false,
        }
    }

    /// Looks up an object by identifier.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.entries.get(&id)
    }

    /// Reports whether an object with the identifier exists.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterates over all objects in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.entries.values()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
