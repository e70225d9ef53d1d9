use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{PointerButton, PointerEvent};

/// Radians of yaw/pitch per pixel of primary-button drag.
pub const ROTATE_SPEED: f32 = 0.005;
/// Units of x/y pan per pixel of secondary-button drag.
pub const PAN_XY_SPEED: f32 = 0.03;
/// Units of z pan per pixel of vertical tertiary-button drag.
pub const PAN_Z_SPEED: f32 = 0.05;

pub const DEFAULT_PAN: Vec3 = Vec3::new(0.0, -5.0, -15.0);

/// Last pointer sample seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousPointer {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    pub is_down: bool,
}

impl Default for PreviousPointer {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            button: PointerButton::None,
            is_down: false,
        }
    }
}

/// Orbit camera state accumulated from pointer drags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub pan_offset: Vec3,
    /// `(yaw, pitch)` in radians.
    pub rotation: Vec2,
    pub previous_pointer: PreviousPointer,
}

impl CameraState {
    pub fn with_pan(pan_offset: Vec3) -> Self {
        Self {
            pan_offset,
            rotation: Vec2::ZERO,
            previous_pointer: PreviousPointer::default(),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.x
    }

    pub fn pitch(&self) -> f32 {
        self.rotation.y
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::with_pan(DEFAULT_PAN)
    }
}

/// Turns pointer drags into rotation and pan. Rotation and pan are unbounded.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    state: CameraState,
}

impl CameraController {
    pub fn new(initial_pan: Vec3) -> Self {
        Self {
            state: CameraState::with_pan(initial_pan),
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        let previous = self.state.previous_pointer;
        if previous.is_down && previous.button == event.button {
            let dx = event.x - previous.x;
            let dy = event.y - previous.y;
            match event.button {
                PointerButton::Primary => {
                    self.state.rotation.x += dx * ROTATE_SPEED;
                    self.state.rotation.y += dy * ROTATE_SPEED;
                }
                PointerButton::Secondary => {
                    self.state.pan_offset.x += dx * PAN_XY_SPEED;
                    self.state.pan_offset.y -= dy * PAN_XY_SPEED;
                }
                PointerButton::Tertiary => {
                    self.state.pan_offset.z += dy * PAN_Z_SPEED;
                }
                PointerButton::None => {}
            }
        } else {
            // First sample after a press or button change: remember it, no jump.
            self.state.previous_pointer.button = event.button;
            self.state.previous_pointer.is_down = true;
        }
        self.state.previous_pointer.x = event.x;
        self.state.previous_pointer.y = event.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(controller: &mut CameraController, button: PointerButton, points: &[(f32, f32)]) {
        for &(x, y) in points {
            controller.on_pointer_event(PointerEvent::new(x, y, button));
        }
    }

    #[test]
    fn primary_drag_accumulates_rotation() {
        let mut controller = CameraController::new(Vec3::ZERO);
        drag(
            &mut controller,
            PointerButton::Primary,
            &[(10.0, 10.0), (30.0, 5.0), (25.0, 45.0), (125.0, 45.0)],
        );
        // Deltas after the press sample: (20, -5), (-5, 40), (100, 0).
        let state = controller.state();
        assert!((state.yaw() - ROTATE_SPEED * 115.0).abs() < 1e-6);
        assert!((state.pitch() - ROTATE_SPEED * 35.0).abs() < 1e-6);
        assert_eq!(state.pan_offset, Vec3::ZERO);
    }

    #[test]
    fn first_event_after_press_contributes_nothing() {
        let mut controller = CameraController::new(Vec3::ZERO);
        controller.on_pointer_event(PointerEvent::new(500.0, 500.0, PointerButton::Primary));
        assert_eq!(controller.state().rotation, Vec2::ZERO);
        assert!(controller.state().previous_pointer.is_down);
    }

    #[test]
    fn secondary_drag_pans_xy() {
        let mut controller = CameraController::new(DEFAULT_PAN);
        drag(
            &mut controller,
            PointerButton::Secondary,
            &[(0.0, 0.0), (100.0, 0.0)],
        );
        let pan = controller.state().pan_offset;
        assert!((pan.x - 3.0).abs() < 1e-5);
        assert_eq!(pan.y, DEFAULT_PAN.y);
        assert_eq!(pan.z, DEFAULT_PAN.z);

        drag(&mut controller, PointerButton::Secondary, &[(100.0, 10.0)]);
        assert!((controller.state().pan_offset.y - (DEFAULT_PAN.y - 0.3)).abs() < 1e-5);
    }

    #[test]
    fn tertiary_drag_pans_z_only() {
        let mut controller = CameraController::new(Vec3::ZERO);
        drag(
            &mut controller,
            PointerButton::Tertiary,
            &[(0.0, 0.0), (40.0, 20.0)],
        );
        let pan = controller.state().pan_offset;
        assert_eq!((pan.x, pan.y), (0.0, 0.0));
        assert!((pan.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn switching_buttons_resets_the_drag_origin() {
        let mut controller = CameraController::new(Vec3::ZERO);
        drag(&mut controller, PointerButton::Primary, &[(0.0, 0.0), (10.0, 0.0)]);
        let yaw = controller.state().yaw();
        // The secondary press lands far away and must not pan.
        drag(&mut controller, PointerButton::Secondary, &[(400.0, 400.0)]);
        assert_eq!(controller.state().pan_offset, Vec3::ZERO);
        assert_eq!(controller.state().yaw(), yaw);
        assert_eq!(controller.state().previous_pointer.button, PointerButton::Secondary);
    }

    #[test]
    fn moves_without_a_button_change_nothing() {
        let mut controller = CameraController::new(DEFAULT_PAN);
        drag(
            &mut controller,
            PointerButton::None,
            &[(0.0, 0.0), (50.0, 80.0), (-10.0, 3.0)],
        );
        assert_eq!(controller.state().pan_offset, DEFAULT_PAN);
        assert_eq!(controller.state().rotation, Vec2::ZERO);
        assert_eq!(controller.state().previous_pointer.x, -10.0);
    }

    #[test]
    fn rotation_is_not_clamped() {
        let mut controller = CameraController::new(Vec3::ZERO);
        drag(
            &mut controller,
            PointerButton::Primary,
            &[(0.0, 0.0), (10_000.0, 10_000.0)],
        );
        assert!(controller.state().yaw() > std::f32::consts::TAU);
        assert!(controller.state().pitch() > std::f32::consts::PI);
    }
}
