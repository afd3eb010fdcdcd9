//! Single-variable PID controller, generic over the error type.
//!
//! Plain rectangular integration and raw derivative; no filtering and no
//! intrinsic saturation. Windup safety comes from the cascade re-initializing
//! the inactive controller on every mode switch, not from clamping here.

use std::ops::{Add, Mul, Sub};

use striker_common::gains::GainSet;
use striker_common::math::Vec2;

/// Capability set a PID error type needs: componentwise add/subtract,
/// scalar multiply, and a zero. No norm required.
pub trait ControlVariable:
    Copy
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + PartialEq
    + std::fmt::Debug
    + Send
    + 'static
{
}

impl ControlVariable for f64 {}
impl ControlVariable for Vec2 {}

/// PID controller state: gains, fixed period, integral accumulator and
/// previous error.
///
/// `init` fixes the period from the control frequency and zeroes the
/// accumulated state; `calculate` must not be called before the first
/// `init` (it returns zero if it is).
#[derive(Debug, Clone, Copy)]
pub struct PidController<T> {
    gains: GainSet,
    /// Control period [s]; 0 until `init` runs.
    dt: f64,
    /// Sum of past errors × dt since the last (re)initialization.
    integral: T,
    /// Argument of the most recent `calculate` call.
    prev_error: T,
}

impl<T: ControlVariable> PidController<T> {
    pub fn new(gains: GainSet) -> Self {
        Self {
            gains,
            dt: 0.0,
            integral: T::default(),
            prev_error: T::default(),
        }
    }

    /// Fix the period to `1 / frequency_hz` and zero integral and
    /// previous error. Called on startup and on every mode switch.
    pub fn init(&mut self, frequency_hz: f64) {
        self.dt = 1.0 / frequency_hz;
        self.integral = T::default();
        self.prev_error = T::default();
    }

    /// Replace the gains; accumulated state is untouched.
    pub fn update_gains(&mut self, gains: GainSet) {
        self.gains = gains;
    }

    /// One controller step.
    ///
    /// Returns `Kp·e + Ki·∫ + Kd·(e − prev)/Δt`, where `∫` is the
    /// accumulator before this call; then folds `e·Δt` into the accumulator
    /// and remembers `e`.
    pub fn calculate(&mut self, error: T) -> T {
        if self.dt <= 0.0 {
            return T::default();
        }
        let p_term = error * self.gains.kp;
        let i_term = self.integral * self.gains.ki;
        let d_term = (error - self.prev_error) * (self.gains.kd / self.dt);

        self.integral = self.integral + error * self.dt;
        self.prev_error = error;

        p_term + i_term + d_term
    }

    /// Integral accumulator (for diagnostics and invariant checks).
    pub fn integral(&self) -> T {
        self.integral
    }

    /// Previous error (zero after (re)initialization).
    pub fn prev_error(&self) -> T {
        self.prev_error
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FREQ: f64 = 100.0;

    fn controller(kp: f64, ki: f64, kd: f64) -> PidController<f64> {
        let mut pid = PidController::new(GainSet::new(kp, ki, kd));
        pid.init(FREQ);
        pid
    }

    #[test]
    fn pure_proportional() {
        let mut pid = controller(10.0, 0.0, 0.0);
        let out = pid.calculate(1.5);
        assert!((out - 15.0).abs() < 1e-12);
    }

    #[test]
    fn zero_error_after_init_is_zero_for_any_gains() {
        for gains in [
            GainSet::new(1.0, 1.0, 1.0),
            GainSet::new(-3.0, 0.5, 100.0),
            GainSet::ZERO,
        ] {
            let mut pid = PidController::<f64>::new(gains);
            pid.init(FREQ);
            assert_eq!(pid.calculate(0.0), 0.0);
        }
    }

    #[test]
    fn calculate_before_init_returns_zero() {
        let mut pid = PidController::<f64>::new(GainSet::new(10.0, 1.0, 1.0));
        assert_eq!(pid.calculate(5.0), 0.0);
    }

    #[test]
    fn integral_accumulates_rectangularly() {
        let mut pid = controller(0.0, 1.0, 0.0);
        for _ in 0..10 {
            pid.calculate(1.0);
        }
        // integral = e * n / f = 1.0 * 10 / 100
        assert!((pid.integral() - 0.1).abs() < 1e-12);
        // the 11th call sees Ki * integral with the accumulator of the 10
        let out = pid.calculate(0.0);
        assert!((out - 0.1).abs() < 1e-12);
    }

    #[test]
    fn integral_term_lags_one_step() {
        let mut pid = controller(0.0, 1.0, 0.0);
        // first call: accumulator is still zero
        assert_eq!(pid.calculate(1.0), 0.0);
        // second call: accumulator holds one step worth
        let out = pid.calculate(1.0);
        assert!((out - 1.0 / FREQ).abs() < 1e-12);
    }

    #[test]
    fn derivative_responds_to_error_change() {
        let mut pid = controller(0.0, 0.0, 1.0);
        assert_eq!(pid.calculate(0.0), 0.0);
        // step to 1.0: d = (1 - 0) / dt = f
        let out = pid.calculate(1.0);
        assert!((out - FREQ).abs() < 1e-9);
    }

    #[test]
    fn first_call_is_linear_in_the_error() {
        let gains = GainSet::new(2.0, 0.7, 0.3);
        let (a, b) = (1.7, -0.4);
        let (e1, e2) = (3.0, -5.0);

        let mut fresh = PidController::<f64>::new(gains);
        fresh.init(FREQ);
        let combined = fresh.calculate(a * e1 + b * e2);

        let mut one = PidController::<f64>::new(gains);
        one.init(FREQ);
        let mut two = PidController::<f64>::new(gains);
        two.init(FREQ);
        let split = a * one.calculate(e1) + b * two.calculate(e2);

        assert!((combined - split).abs() < 1e-9);
    }

    #[test]
    fn update_gains_preserves_state() {
        let mut pid = controller(0.0, 1.0, 0.0);
        for _ in 0..5 {
            pid.calculate(2.0);
        }
        let integral = pid.integral();
        pid.update_gains(GainSet::new(1.0, 2.0, 0.0));
        assert_eq!(pid.integral(), integral);
        assert_eq!(pid.prev_error(), 2.0);
    }

    #[test]
    fn reinit_zeroes_accumulated_state() {
        let mut pid = controller(1.0, 1.0, 1.0);
        for _ in 0..20 {
            pid.calculate(3.0);
        }
        assert!(pid.integral() > 0.0);
        pid.init(FREQ);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);
    }

    #[test]
    fn vector_operations_are_componentwise() {
        let mut pid = PidController::<Vec2>::new(GainSet::new(2.0, 0.0, 0.0));
        pid.init(FREQ);
        let out = pid.calculate(Vec2::new(1.0, -3.0));
        assert_eq!(out, Vec2::new(2.0, -6.0));

        // each component evolves like an independent scalar controller
        let mut scalar = controller(2.0, 0.5, 0.1);
        let mut vector = PidController::<Vec2>::new(GainSet::new(2.0, 0.5, 0.1));
        vector.init(FREQ);
        for e in [1.0, 0.5, -0.25, 2.0] {
            let s = scalar.calculate(e);
            let v = vector.calculate(Vec2::new(e, 0.0));
            assert!((v.x - s).abs() < 1e-12);
            assert_eq!(v.y, 0.0);
        }
    }
}
