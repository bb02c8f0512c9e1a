//! PWM output abstractions

/// Single PWM channel with a fixed resolution
pub trait PwmPin {
    /// Duty value that corresponds to 100% on-time
    fn max_duty(&self) -> u16;

    /// Set the duty cycle (0 ..= `max_duty()`)
    fn set_duty(&mut self, duty: u16);

    /// Set the duty cycle as a fraction of full scale
    ///
    /// The fraction is clamped to `0.0..=1.0`; NaN is treated as 0.0.
    /// Scaling truncates toward zero.
    fn set_duty_fraction(&mut self, fraction: f32) {
        let duty = fraction_to_duty(fraction, self.max_duty());
        self.set_duty(duty);
    }
}

/// Map a fraction onto `0..=max_duty`, clamping out-of-range input
pub fn fraction_to_duty(fraction: f32, max_duty: u16) -> u16 {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    (fraction * max_duty as f32) as u16
}
