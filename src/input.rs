//! Input surface shared by keyboard and touch
//!
//! The UI layer translates key events and touch buttons into the same
//! identifier space and feeds them in through `press`/`release`. The
//! simulation reads held state plus an edge-detected "pressed this frame"
//! set that is cleared at end of frame.

use std::collections::HashSet;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// A per-fighter key binding set.
#[derive(Clone, Copy, Debug)]
pub struct Binding {
    pub left: &'static str,
    pub right: &'static str,
    pub up: &'static str,
    pub down: &'static str,
    pub attack: &'static str,
    pub special: &'static str,
    pub block: &'static str,
}

pub const P1_BINDING: Binding = Binding {
    left: "a",
    right: "d",
    up: "w",
    down: "s",
    attack: "f",
    special: "t",
    block: "g",
};

impl Binding {
    /// Key identifier for a named on-screen button, so touch controls feed
    /// the same space as the keyboard.
    pub fn key_for(&self, action: &str) -> Option<&'static str> {
        match action {
            "left" => Some(self.left),
            "right" => Some(self.right),
            "up" => Some(self.up),
            "down" => Some(self.down),
            "attack" => Some(self.attack),
            "special" => Some(self.special),
            "block" => Some(self.block),
            _ => None,
        }
    }
}

/// Used for the second player in 1v1 when human control is selected.
pub const P2_BINDING: Binding = Binding {
    left: "arrowleft",
    right: "arrowright",
    up: "arrowup",
    down: "arrowdown",
    attack: "k",
    special: "j",
    block: "l",
};

/// Live set of held input identifiers plus a one-shot pressed set.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<String>,
    pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-down (or touch-start). Repeated events while held re-arm the
    /// pressed set, matching browser key auto-repeat.
    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_string());
        self.pressed.insert(key.to_string());
    }

    /// Key-up (or touch-end).
    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    pub fn was_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    /// Held or pressed this frame. Attack/special triggers use this so a
    /// tap registers even if released between frames.
    pub fn is_active(&self, key: &str) -> bool {
        self.is_held(key) || self.was_pressed(key)
    }

    /// Clears the one-shot pressed set. Called once per frame tick.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_clears_at_end_of_frame() {
        let mut input = InputState::new();
        input.press("f");
        assert!(input.was_pressed("f"));
        assert!(input.is_held("f"));

        input.end_frame();
        assert!(!input.was_pressed("f"));
        assert!(input.is_held("f"));
    }

    #[test]
    fn touch_buttons_map_onto_player_keys() {
        let mut input = InputState::new();
        let key = P1_BINDING.key_for("attack").expect("mapped");
        input.press(key);
        assert!(input.is_held(P1_BINDING.attack));
        assert_eq!(P1_BINDING.key_for("taunt"), None);
    }

    #[test]
    fn tap_within_one_frame_stays_active() {
        let mut input = InputState::new();
        input.press("f");
        input.release("f");
        assert!(!input.is_held("f"));
        assert!(input.is_active("f"));

        input.end_frame();
        assert!(!input.is_active("f"));
    }
}
