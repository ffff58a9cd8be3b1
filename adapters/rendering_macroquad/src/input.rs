//! Keyboard and mouse bindings for the arena.

use boss_arena_core::Direction;
use boss_arena_rendering::{HeldAction, InputEvent, InputSource};
use glam::Vec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};

/// Keys that move the player in `direction`. WASD and the arrow keys both work.
#[must_use]
pub fn direction_keys(direction: Direction) -> [KeyCode; 2] {
    match direction {
        Direction::Up => [KeyCode::W, KeyCode::Up],
        Direction::Down => [KeyCode::S, KeyCode::Down],
        Direction::Left => [KeyCode::A, KeyCode::Left],
        Direction::Right => [KeyCode::D, KeyCode::Right],
    }
}

/// Key that keeps `action` active while held.
#[must_use]
pub fn held_action_key(action: HeldAction) -> KeyCode {
    match action {
        HeldAction::Attack => KeyCode::Space,
        HeldAction::PlaceBomb => KeyCode::B,
    }
}

/// Key that fires the light delayed-damage action.
pub const LIGHT_ACTION_KEY: KeyCode = KeyCode::F;
/// Key that fires the heavy delayed-damage action.
pub const HEAVY_ACTION_KEY: KeyCode = KeyCode::G;

/// Edge-triggered presses waiting for the frame that consumes them.
#[derive(Debug, Default)]
pub struct PendingInput {
    events: Vec<InputEvent>,
}

impl PendingInput {
    /// Records a press observed this frame.
    pub fn register(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Number of presses waiting to be consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no press is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hands every waiting press to `out` in the order they were registered.
    pub fn take_into(&mut self, out: &mut Vec<InputEvent>) {
        out.append(&mut self.events);
    }
}

/// Input source reading macroquad's keyboard and mouse state.
#[derive(Debug, Default)]
pub(crate) struct MacroquadInput {
    pending: PendingInput,
}

impl MacroquadInput {
    /// Latches the presses of the current frame.
    pub(crate) fn poll(&mut self) {
        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            self.pending.register(InputEvent::ClickAt(Vec2::new(x, y)));
        }
        if is_key_pressed(LIGHT_ACTION_KEY) {
            self.pending.register(InputEvent::LightAction);
        }
        if is_key_pressed(HEAVY_ACTION_KEY) {
            self.pending.register(InputEvent::HeavyAction);
        }
    }
}

impl InputSource for MacroquadInput {
    fn is_direction_down(&self, direction: Direction) -> bool {
        direction_keys(direction).into_iter().any(is_key_down)
    }

    fn is_action_down(&self, action: HeldAction) -> bool {
        is_key_down(held_action_key(action))
    }

    fn drain_events(&mut self, out: &mut Vec<InputEvent>) {
        self.pending.take_into(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_direction_has_distinct_keys() {
        let mut seen = Vec::new();
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            for key in direction_keys(direction) {
                assert!(!seen.contains(&key), "{key:?} bound twice");
                seen.push(key);
            }
        }
        assert!(!seen.contains(&held_action_key(HeldAction::Attack)));
        assert!(!seen.contains(&held_action_key(HeldAction::PlaceBomb)));
        assert!(!seen.contains(&LIGHT_ACTION_KEY));
        assert!(!seen.contains(&HEAVY_ACTION_KEY));
    }
}
