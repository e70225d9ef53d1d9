use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Mouse button reported with a pointer event. `None` means no button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerButton {
    None,
    Primary,
    Secondary,
    Tertiary,
}

/// Pointer sample delivered to the camera controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
}

impl PointerEvent {
    pub const fn new(x: f32, y: f32, button: PointerButton) -> Self {
        Self { x, y, button }
    }
}

/// Turns separate host press/release/cursor notifications into pointer events
/// that carry the button currently held.
///
/// When several buttons are down the lowest one wins (primary before
/// secondary before tertiary).
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: BTreeSet<PointerButton>,
    position: Vec2,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_down(&mut self, button: PointerButton) -> PointerEvent {
        if button != PointerButton::None {
            self.held.insert(button);
        }
        self.current()
    }

    pub fn button_up(&mut self, button: PointerButton) -> PointerEvent {
        self.held.remove(&button);
        self.current()
    }

    pub fn moved(&mut self, position: Vec2) -> PointerEvent {
        self.position = position;
        self.current()
    }

    pub fn held_button(&self) -> PointerButton {
        self.held
            .iter()
            .next()
            .copied()
            .unwrap_or(PointerButton::None)
    }

    fn current(&self) -> PointerEvent {
        PointerEvent::new(self.position.x, self.position.y, self.held_button())
    }
}
