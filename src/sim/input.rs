//! Input buffering and resolution
//!
//! The input collaborator writes [`InputEvent`]s into the session's
//! [`TickInput`] buffer between ticks. Each tick resolves the buffer once
//! into a [`ResolvedInput`] and then clears the one-shot fields
//! (`interact`, `drop_slot`) so they fire exactly once.

use glam::Vec2;

use super::state::Session;

/// Digital movement keys (WASD-style)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Raw direction (not normalized; diagonals have length √2)
    pub fn vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v
    }
}

/// Buffered input state for the next tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub keys: MoveKeys,
    /// Virtual joystick; overrides the keys when non-zero
    pub joystick: Vec2,
    /// Analog aim stick
    pub aim_stick: Vec2,
    /// Pointer position in world coordinates (aim fallback)
    pub pointer: Option<Vec2>,
    /// Mouse button held
    pub mouse_fire: bool,
    /// Virtual fire button held
    pub button_fire: bool,
    /// One-shot interact pulse
    pub interact: bool,
    /// Interact key held (legacy decode path)
    pub interact_held: bool,
    /// One-shot drop command
    pub drop_slot: Option<usize>,
}

/// A single update from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Keys(MoveKeys),
    Joystick(Vec2),
    AimStick(Vec2),
    Pointer(Option<Vec2>),
    MouseFire(bool),
    ButtonFire(bool),
    Interact,
    InteractHeld(bool),
    Drop(usize),
}

impl TickInput {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Keys(keys) => self.keys = keys,
            InputEvent::Joystick(v) => self.joystick = v,
            InputEvent::AimStick(v) => self.aim_stick = v,
            InputEvent::Pointer(p) => self.pointer = p,
            InputEvent::MouseFire(held) => self.mouse_fire = held,
            InputEvent::ButtonFire(held) => self.button_fire = held,
            InputEvent::Interact => self.interact = true,
            InputEvent::InteractHeld(held) => self.interact_held = held,
            InputEvent::Drop(slot) => self.drop_slot = Some(slot),
        }
    }

    /// Mark one-shot signals as consumed
    pub fn clear_one_shots(&mut self) {
        self.interact = false;
        self.drop_slot = None;
    }
}

/// Input merged into the values the player controller needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedInput {
    /// Unit keyboard direction, or the joystick vector verbatim
    pub movement: Vec2,
    /// Aim angle, if any aim source is active
    pub aim: Option<f32>,
    pub fire: bool,
    pub interact: bool,
    pub interact_held: bool,
    pub drop_slot: Option<usize>,
}

impl ResolvedInput {
    pub fn is_moving(&self) -> bool {
        self.movement != Vec2::ZERO
    }
}

/// Merge both input sources relative to the player position
pub fn resolve(input: &TickInput, player_pos: Vec2, aim_deadzone: f32) -> ResolvedInput {
    let movement = if input.joystick != Vec2::ZERO {
        input.joystick
    } else {
        input.keys.vector().normalize_or_zero()
    };

    let aim = if input.aim_stick.length() > aim_deadzone {
        Some(crate::heading(input.aim_stick))
    } else {
        input
            .pointer
            .map(|p| p - player_pos)
            .filter(|d| *d != Vec2::ZERO)
            .map(crate::heading)
    };

    ResolvedInput {
        movement,
        aim,
        fire: input.mouse_fire || input.button_fire,
        interact: input.interact,
        interact_held: input.interact_held,
        drop_slot: input.drop_slot,
    }
}

impl Session {
    /// Buffer an input update for the next tick
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.apply(event);
    }
}
