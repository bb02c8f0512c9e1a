//! Blocking delays
//!
//! Panel bring-up waits are blocking sleeps on the calling thread.

/// Millisecond-resolution blocking delay
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: DelayMs + ?Sized> DelayMs for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}
