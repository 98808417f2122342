//! The hardware side of the bus: a polled half-duplex serial line and a
//! bounded wait used to detect silent devices.

/// Which way the half-duplex line is driven.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Transmit,
    Receive,
}

/// A polled serial line.
///
/// Implementations map these calls directly onto UART status flags and
/// data registers. None of them may block.
pub trait Line {
    /// Put one byte into the transmit holding register.
    fn write_byte(&mut self, byte: u8);

    /// True once the last written byte has left the shift register.
    fn transmit_empty(&mut self) -> bool;

    /// Take a received byte, if one is available.
    fn read_byte(&mut self) -> Option<u8>;

    /// Switch the bus transceiver between driving and listening.
    fn set_direction(&mut self, _direction: Direction) {}
}

impl<L: Line + ?Sized> Line for &mut L {
    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }

    fn transmit_empty(&mut self) -> bool {
        (**self).transmit_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction)
    }
}

/// Bounded wait for a single byte.
pub trait Countdown {
    /// Re-arm the countdown. Called before waiting for each byte.
    fn start(&mut self);

    /// Polled while waiting; true once the wait is over.
    fn expired(&mut self) -> bool;
}

/// Iteration counting timeout, for targets without a usable clock.
#[derive(Debug, Clone)]
pub struct SpinCountdown {
    iterations: u32,
    remaining: u32,
}

impl SpinCountdown {
    /// Roughly one millisecond of polling on a 200 MHz PRU, at 30 ns per iteration.
    pub const PRU_ONE_MS: u32 = 0x0005_1615;

    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations,
            remaining: iterations,
        }
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for SpinCountdown {
    fn default() -> Self {
        Self::new(Self::PRU_ONE_MS)
    }
}

impl Countdown for SpinCountdown {
    fn start(&mut self) {
        self.remaining = self.iterations;
    }

    fn expired(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(remaining) => {
                self.remaining = remaining;
                false
            }
            None => true,
        }
    }
}

#[cfg(feature = "std")]
pub use self::deadline::Deadline;

#[cfg(feature = "std")]
mod deadline {
    use super::Countdown;
    use std::time::{Duration, Instant};

    /// Wall clock timeout.
    #[derive(Debug, Clone)]
    pub struct Deadline {
        timeout: Duration,
        started: Instant,
    }

    impl Deadline {
        pub fn new(timeout: Duration) -> Self {
            Self {
                timeout,
                started: Instant::now(),
            }
        }

        pub const fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    impl Countdown for Deadline {
        fn start(&mut self) {
            self.started = Instant::now();
        }

        fn expired(&mut self) -> bool {
            self.started.elapsed() >= self.timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_countdown() {
        let mut countdown = SpinCountdown::new(3);
        countdown.start();
        assert!(!countdown.expired());
        assert!(!countdown.expired());
        assert!(!countdown.expired());
        assert!(countdown.expired());
        assert!(countdown.expired());
        countdown.start();
        assert!(!countdown.expired());
        assert_eq!(SpinCountdown::default().iterations(), 333_333);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_deadline() {
        use std::time::Duration;
        let mut zero = Deadline::new(Duration::from_secs(0));
        zero.start();
        assert!(zero.expired());
        let mut long = Deadline::new(Duration::from_secs(3600));
        long.start();
        assert!(!long.expired());
    }
}
