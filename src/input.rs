//! Input boundary: pointer position, viewport size and user actions.
//!
//! Raw window events are reduced to three things the core cares about:
//!
//! - the pointer in normalized device coordinates (`[-1, 1]²`, y up),
//! - the viewport size (camera aspect, field of view, portal base scale),
//! - discrete [`Action`]s (enter, return, toggle sound).
//!
//! The pointer is low-pass filtered once per frame so that parallax and the
//! portal's mouse warp trail the cursor instead of snapping to it.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::config::DeviceTier;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Screen class for responsive tuning.
    pub fn tier(&self) -> DeviceTier {
        DeviceTier::from_width(self.width)
    }

    /// Whether the viewport has a drawable area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Convert a pixel position (origin top-left) to NDC.
    pub fn to_ndc(&self, x: f64, y: f64) -> Vec2 {
        if self.is_empty() {
            return Vec2::ZERO;
        }
        Vec2::new(
            (x as f32 / self.width as f32) * 2.0 - 1.0,
            1.0 - (y as f32 / self.height as f32) * 2.0, // Y flipped
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Exponentially smoothed pointer.
#[derive(Debug, Clone, Copy)]
pub struct Pointer {
    raw: Vec2,
    smoothed: Vec2,
    smoothing: f32,
}

impl Pointer {
    /// Pointer at the centre with the given per-frame smoothing factor.
    pub fn new(smoothing: f32) -> Self {
        Self {
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    /// Record a new raw NDC position, clamped to `[-1, 1]²`.
    pub fn set_raw(&mut self, ndc: Vec2) {
        if ndc.is_finite() {
            self.raw = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
        }
    }

    /// Move the smoothed position one frame towards the raw one.
    pub fn smooth(&mut self) -> Vec2 {
        self.smoothed += (self.raw - self.smoothed) * self.smoothing;
        self.smoothed
    }

    /// Last raw position.
    pub fn raw(&self) -> Vec2 {
        self.raw
    }

    /// Current smoothed position.
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }
}

/// Discrete user intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Step through the portal.
    Enter,
    /// Come back out.
    Return,
    /// Fade the ambient track in or out.
    ToggleSound,
}

/// Translates window events into pointer updates and actions.
#[derive(Debug, Default)]
pub struct Input {
    viewport: Viewport,
    cursor_ndc: Option<Vec2>,
}

impl Input {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cursor_ndc: None,
        }
    }

    /// Update the viewport used for NDC conversion.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Cursor position in NDC, if the cursor has moved inside the window.
    pub fn cursor_ndc(&self) -> Option<Vec2> {
        self.cursor_ndc
    }

    /// Process a window event. Returns the action it maps to, if any.
    ///
    /// Key repeats are ignored so a held key fires once.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Action> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_ndc = Some(self.viewport.to_ndc(position.x, position.y));
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_ndc = None;
                None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => Some(Action::Enter),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => action_for_key(code),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Key bindings.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Enter | KeyCode::NumpadEnter | KeyCode::Space => Some(Action::Enter),
        KeyCode::Escape | KeyCode::Backspace => Some(Action::Return),
        KeyCode::KeyM => Some(Action::ToggleSound),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_ndc() {
        let viewport = Viewport::new(800, 600);

        // Center of window should be (0, 0) in NDC
        let centre = viewport.to_ndc(400.0, 300.0);
        assert!(centre.x.abs() < 0.01);
        assert!(centre.y.abs() < 0.01);

        let top_left = viewport.to_ndc(0.0, 0.0);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
        assert_eq!(Viewport::new(0, 10).to_ndc(5.0, 5.0), Vec2::ZERO);
    }

    #[test]
    fn test_pointer_smoothing_converges() {
        let mut pointer = Pointer::new(0.08);
        pointer.set_raw(Vec2::new(1.0, -1.0));

        let first = pointer.smooth();
        assert!((first.x - 0.08).abs() < 1e-6);
        assert!((first.y + 0.08).abs() < 1e-6);

        for _ in 0..200 {
            pointer.smooth();
        }
        assert!((pointer.smoothed() - Vec2::new(1.0, -1.0)).length() < 1e-3);
    }

    #[test]
    fn test_pointer_clamps_raw() {
        let mut pointer = Pointer::new(0.5);
        pointer.set_raw(Vec2::new(3.0, -7.0));
        assert_eq!(pointer.raw(), Vec2::new(1.0, -1.0));
        pointer.set_raw(Vec2::new(f32::NAN, 0.0));
        assert_eq!(pointer.raw(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key(KeyCode::Enter), Some(Action::Enter));
        assert_eq!(action_for_key(KeyCode::Escape), Some(Action::Return));
        assert_eq!(action_for_key(KeyCode::KeyM), Some(Action::ToggleSound));
        assert_eq!(action_for_key(KeyCode::KeyQ), None);
    }
}
