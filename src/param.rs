//! Animatable scalar parameters.
//!
//! A [`Param`] is an owned, shared `f32` cell. Subsystems own their params
//! (the state machine owns progress, the camera rig owns its depth, the scene
//! owns portal scale and exposure) and hand out [`ParamRef`] weak handles to
//! the timeline scheduler. When the owner is dropped the handle goes dead and
//! any sequence still animating it is abandoned.
//!
//! Cells are `Rc<Cell<_>>`: params are deliberately `!Send`, all animation
//! happens on the frame thread.

use std::cell::Cell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct Slot {
    value: Cell<f32>,
    min: f32,
    max: f32,
}

impl Slot {
    fn store(&self, value: f32) {
        // NaN never makes it into a param
        if !value.is_nan() {
            self.value.set(value.clamp(self.min, self.max));
        }
    }
}

/// Owned animatable value.
#[derive(Debug, Clone)]
pub struct Param(Rc<Slot>);

impl Param {
    /// Create an unbounded param.
    pub fn new(value: f32) -> Self {
        Self::bounded(value, f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Create a param whose writes are clamped to `[min, max]`.
    pub fn bounded(value: f32, min: f32, max: f32) -> Self {
        let slot = Slot {
            value: Cell::new(min),
            min,
            max,
        };
        slot.store(value);
        Self(Rc::new(slot))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.0.value.get()
    }

    /// Overwrite the value, clamped to the param's bounds.
    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value);
    }

    /// Weak handle for the scheduler.
    pub fn handle(&self) -> ParamRef {
        ParamRef(Rc::downgrade(&self.0))
    }
}

/// Non-owning handle to a [`Param`].
#[derive(Debug, Clone)]
pub struct ParamRef(Weak<Slot>);

impl ParamRef {
    /// A handle that was never attached to a param. Always dead.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    /// Current value, or `None` if the owning param has been dropped.
    pub fn get(&self) -> Option<f32> {
        self.0.upgrade().map(|slot| slot.value.get())
    }

    /// Whether the owning param still exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Write through the handle. Returns `false` if the param is gone.
    pub(crate) fn set(&self, value: f32) -> bool {
        match self.0.upgrade() {
            Some(slot) => {
                slot.store(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_clamps_writes() {
        let p = Param::bounded(2.0, 0.0, 1.0);
        assert_eq!(p.get(), 1.0);
        p.set(-0.5);
        assert_eq!(p.get(), 0.0);
        p.set(f32::NAN);
        assert_eq!(p.get(), 0.0);
    }

    #[test]
    fn test_handle_writes_through() {
        let p = Param::new(0.0);
        let h = p.handle();
        assert!(h.set(3.5));
        assert_eq!(p.get(), 3.5);
        assert_eq!(h.get(), Some(3.5));
    }

    #[test]
    fn test_handle_dies_with_owner() {
        let p = Param::new(1.0);
        let h = p.handle();
        drop(p);
        assert!(!h.is_alive());
        assert_eq!(h.get(), None);
        assert!(!h.set(2.0));
        assert!(!ParamRef::detached().is_alive());
    }
}
