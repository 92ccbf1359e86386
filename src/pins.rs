//! Line-level I/O used by the [`Driver`](crate::Driver).
//!
//! A charlieplexed panel needs tri-state lines: driven high, driven low or
//! released (high impedance). [`LinePins`] is the minimal capability the
//! driver needs; implement it on top of the port registers of your MCU. All
//! operations are synchronous and infallible because they run inside the
//! refresh interrupt.
//!
//! [`RecordingPins`] implements the trait without hardware. It records every
//! operation and tracks the level of each line, so the LEDs lit by a tick can
//! be checked on the host.
//!
//! # Example
//! ```rust
//! use charlieplex_framebuffer::pins::{LineLevel, LineOp, RecordingPins};
//! use charlieplex_framebuffer::LinePins;
//!
//! let mut pins = RecordingPins::<8>::new();
//! pins.release_all();
//! pins.set_high(7);
//! pins.set_low(3);
//!
//! assert_eq!(pins.ops(), &[LineOp::ReleaseAll, LineOp::High(7), LineOp::Low(3)]);
//! assert_eq!(pins.level(3), LineLevel::Low);
//! assert!(pins.lit().eq([(7, 3)]));
//! ```

use heapless::Vec;

use crate::NUM_LINES;

/// Tri-state control of the panel's drive lines
///
/// `line` is always below [`NUM_LINES`](crate::NUM_LINES).
pub trait LinePins {
    /// Drive `line` to logic high.
    fn set_high(&mut self, line: usize);

    /// Drive `line` to logic low.
    fn set_low(&mut self, line: usize);

    /// Put `line` into high impedance so it takes no part in the circuit.
    fn release(&mut self, line: usize);

    /// Release every line. Override this when the port can do it in one
    /// register write.
    fn release_all(&mut self) {
        for line in 0..NUM_LINES {
            self.release(line);
        }
    }
}

impl<T: LinePins + ?Sized> LinePins for &mut T {
    fn set_high(&mut self, line: usize) {
        (**self).set_high(line);
    }

    fn set_low(&mut self, line: usize) {
        (**self).set_low(line);
    }

    fn release(&mut self, line: usize) {
        (**self).release(line);
    }

    fn release_all(&mut self) {
        (**self).release_all();
    }
}

/// One recorded line operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineOp {
    /// [`LinePins::set_high`]
    High(usize),
    /// [`LinePins::set_low`]
    Low(usize),
    /// [`LinePins::release`]
    Release(usize),
    /// [`LinePins::release_all`]
    ReleaseAll,
}

/// Electrical state of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineLevel {
    /// High impedance
    #[default]
    Released,
    /// Driven high
    High,
    /// Driven low
    Low,
}

/// [`LinePins`] test double.
///
/// Keeps the first `N` operations since the last
/// [`RecordingPins::clear_ops`] (later ones are dropped, see
/// [`RecordingPins::overflowed`]) and the current level of every line.
#[derive(Debug, Clone)]
pub struct RecordingPins<const N: usize = 32> {
    ops: Vec<LineOp, N>,
    levels: [LineLevel; NUM_LINES],
    overflowed: bool,
}

impl<const N: usize> Default for RecordingPins<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RecordingPins<N> {
    /// All lines released, nothing recorded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: Vec::new(),
            levels: [LineLevel::Released; NUM_LINES],
            overflowed: false,
        }
    }

    /// Operations recorded since the last [`RecordingPins::clear_ops`]
    #[must_use]
    pub fn ops(&self) -> &[LineOp] {
        &self.ops
    }

    /// Forget the recorded operations; line levels are kept.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
        self.overflowed = false;
    }

    /// Whether operations were dropped because the log was full
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Current level of `line`
    #[must_use]
    pub fn level(&self, line: usize) -> LineLevel {
        self.levels[line]
    }

    /// `(high, low)` line pairs currently conducting, i.e. the LEDs lit.
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let highs = self.lines_at(LineLevel::High);
        highs.flat_map(move |high| self.lines_at(LineLevel::Low).map(move |low| (high, low)))
    }

    fn lines_at(&self, level: LineLevel) -> impl Iterator<Item = usize> + '_ {
        self.levels
            .iter()
            .enumerate()
            .filter(move |&(_, &l)| l == level)
            .map(|(line, _)| line)
    }

    fn record(&mut self, op: LineOp) {
        if self.ops.push(op).is_err() {
            self.overflowed = true;
        }
    }
}

impl<const N: usize> LinePins for RecordingPins<N> {
    fn set_high(&mut self, line: usize) {
        self.levels[line] = LineLevel::High;
        self.record(LineOp::High(line));
    }

    fn set_low(&mut self, line: usize) {
        self.levels[line] = LineLevel::Low;
        self.record(LineOp::Low(line));
    }

    fn release(&mut self, line: usize) {
        self.levels[line] = LineLevel::Released;
        self.record(LineOp::Release(line));
    }

    fn release_all(&mut self) {
        self.levels = [LineLevel::Released; NUM_LINES];
        self.record(LineOp::ReleaseAll);
    }
}
