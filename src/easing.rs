//! Easing curves for timeline tweens.
//!
//! Every curve maps `t ∈ [0, 1]` monotonically onto `[0, 1]` with
//! `f(0) = 0` and `f(1) = 1`. Power curves follow the common animation
//! naming where `power N` uses exponent `N + 1` (so `power2` is cubic).

use std::f32::consts::PI;

/// Easing curve applied to a tween's normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    /// Constant rate.
    #[default]
    Linear,
    /// Accelerating power curve.
    PowerIn(u8),
    /// Decelerating power curve.
    PowerOut(u8),
    /// S-shaped power curve.
    PowerInOut(u8),
    /// Exponential acceleration.
    ExpoIn,
    /// Exponential deceleration.
    ExpoOut,
    /// Exponential S-curve; very slow at both ends.
    ExpoInOut,
    /// Sinusoidal S-curve.
    SineInOut,
}

impl Ease {
    /// Apply the curve. Input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Ease::Linear => t,
            Ease::PowerIn(n) => t.powi(exponent(n)),
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(exponent(n)),
            Ease::PowerInOut(n) => {
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(exponent(n))
                } else {
                    1.0 - 0.5 * (2.0 * (1.0 - t)).powi(exponent(n))
                }
            }
            Ease::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Ease::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Ease::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[inline]
fn exponent(power: u8) -> i32 {
    i32::from(power) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 14] = [
        Ease::Linear,
        Ease::PowerIn(1),
        Ease::PowerIn(2),
        Ease::PowerOut(2),
        Ease::PowerOut(3),
        Ease::PowerInOut(1),
        Ease::PowerInOut(2),
        Ease::PowerInOut(3),
        Ease::PowerInOut(4),
        Ease::ExpoIn,
        Ease::ExpoOut,
        Ease::ExpoInOut,
        Ease::SineInOut,
        Ease::PowerOut(0),
    ];

    #[test]
    fn test_end_points() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-6, "{:?} at 0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", ease);
        }
    }

    #[test]
    fn test_monotonic() {
        for ease in ALL {
            let mut last = ease.apply(0.0);
            for i in 1..=200 {
                let v = ease.apply(i as f32 / 200.0);
                assert!(v + 1e-6 >= last, "{:?} decreased at step {}", ease, i);
                last = v;
            }
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        assert!((Ease::PowerInOut(4).apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Ease::ExpoInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Ease::SineInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_input_clamped() {
        assert_eq!(Ease::PowerOut(2).apply(3.0), 1.0);
        assert_eq!(Ease::PowerIn(2).apply(-1.0), 0.0);
        assert_eq!(Ease::Linear.apply(f32::NAN), 0.0);
    }
}
