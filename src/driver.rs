//! Refresh driver for the charlieplexed panel.
//!
//! [`Driver::drive`] performs one refresh tick: it advances the
//! [`RefreshState`], picks the high line for this tick and pulls low every
//! line whose LED should be lit, reading the pixel bytes through a
//! precomputed [`ScanMap`]. Call it from a periodic timer at 500 Hz or more.
//!
//! ## Monochrome
//! Every tick scans the next high line, so 11 ticks cover the whole panel.
//!
//! ## Gray / blink
//! Every high line is held for two ticks. The first half lights every pixel
//! that is not off (blinking pixels only while the blink phase is active),
//! the second half releases the low intensity pixels, giving them half the
//! duty cycle of the bright ones.
//!
//! ```rust
//! use charlieplex_framebuffer::pins::RecordingPins;
//! use charlieplex_framebuffer::{Driver, Gray12x8, Orientation, RefreshState};
//!
//! static DRIVER: Driver<Gray12x8> = Driver::new(Orientation::Landscape);
//!
//! let mut framebuffer = Gray12x8::new();
//! framebuffer.set_pixel(0, 0, 0b10);
//!
//! // the top left LED hangs between line 7 (high) and line 3 (low)
//! let mut state = RefreshState::new().with_counter(13);
//! let mut pins = RecordingPins::<32>::new();
//! DRIVER.drive(&mut state, &framebuffer, &mut pins);
//! assert!(pins.lit().eq([(7, 3)]));
//! ```

use core::marker::PhantomData;

use crate::pins::LinePins;
use crate::scan_map::{Orientation, ScanMap, Wiring};
use crate::{Format, FrameBuffer, NUM_LINES};

/// Blink mask used by [`RefreshState::new`].
///
/// At a 1 kHz tick rate blinking pixels toggle roughly once per second.
pub const DEFAULT_BLINK_MASK: u32 = 512;

/// Tick counter and blink phase of one refresh loop
///
/// Keep one per independently driven framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshState {
    counter: u32,
    blink_mask: u32,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshState {
    /// Counter at zero, [`DEFAULT_BLINK_MASK`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: 0,
            blink_mask: DEFAULT_BLINK_MASK,
        }
    }

    /// Use `blink_mask` to select the counter bits that gate blinking
    /// pixels. They are shown while `counter & blink_mask == 0`.
    #[must_use]
    pub const fn with_blink_mask(mut self, blink_mask: u32) -> Self {
        self.blink_mask = blink_mask;
        self
    }

    /// Start counting at `counter`.
    #[must_use]
    pub const fn with_counter(mut self, counter: u32) -> Self {
        self.counter = counter;
        self
    }

    /// Number of ticks driven so far, wrapping at `u32::MAX`.
    #[must_use]
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Counter bits gating blinking pixels
    #[must_use]
    pub const fn blink_mask(&self) -> u32 {
        self.blink_mask
    }

    /// Change the blink rate; takes effect on the next tick.
    pub fn set_blink_mask(&mut self, blink_mask: u32) {
        self.blink_mask = blink_mask;
    }

    /// Restart the counter so that blinking pixels start in their visible
    /// phase.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Whether blinking pixels are shown in the current tick.
    #[must_use]
    pub const fn flash(&self) -> bool {
        self.counter & self.blink_mask == 0
    }

    #[inline]
    fn advance(&mut self) -> u32 {
        self.counter = self.counter.wrapping_add(1);
        self.counter
    }
}

/// Drives one kind of framebuffer onto the panel
///
/// The scan table is computed by the `const` constructors, so a driver
/// declared as a `static` is built entirely at compile time. The
/// framebuffer type fixes the format, dimensions and bit order.
///
/// # Type Parameters
///
/// * `B` - Framebuffer type, e.g. [`Mono12x8`](crate::Mono12x8)
pub struct Driver<B> {
    map: ScanMap,
    _buffer: PhantomData<fn() -> B>,
}

impl<B> Clone for Driver<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Driver<B> {}

impl<B> core::fmt::Debug for Driver<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Driver").field("map", &self.map).finish()
    }
}

#[cfg(feature = "defmt")]
impl<B> defmt::Format for Driver<B> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Driver {{ map: {} }}", self.map);
    }
}

impl<B: FrameBuffer> Driver<B> {
    /// Driver for the UNO R4 panel showing the buffer from its first pixel.
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        Self::with_wiring(&Wiring::UNO_R4, orientation, 0)
    }

    /// Driver for the UNO R4 panel showing the window that starts
    /// `pixel_offset` pixels into the buffer.
    #[must_use]
    pub const fn with_offset(orientation: Orientation, pixel_offset: usize) -> Self {
        Self::with_wiring(&Wiring::UNO_R4, orientation, pixel_offset)
    }

    /// Driver for a panel with custom wiring.
    #[must_use]
    pub const fn with_wiring(wiring: &Wiring, orientation: Orientation, pixel_offset: usize) -> Self {
        Self {
            map: ScanMap::new(wiring, orientation, B::LAYOUT, pixel_offset),
            _buffer: PhantomData,
        }
    }

    /// The scan table used by this driver.
    #[must_use]
    pub const fn scan_map(&self) -> &ScanMap {
        &self.map
    }

    /// Run one refresh tick.
    #[inline]
    pub fn drive<P: LinePins>(&self, state: &mut RefreshState, buffer: &B, pins: P) {
        self.drive_at(state, buffer, 0, pins);
    }

    /// Run one refresh tick with the window moved `byte_offset` bytes
    /// further into the buffer, wrapping at its end.
    pub fn drive_at<P: LinePins>(
        &self,
        state: &mut RefreshState,
        buffer: &B,
        byte_offset: usize,
        mut pins: P,
    ) {
        let bytes = buffer.as_bytes();
        let byte_offset = byte_offset % bytes.len();
        match B::LAYOUT.format() {
            Format::Monochrome => self.mono_tick(state, bytes, byte_offset, &mut pins),
            Format::GrayBlink => self.gray_tick(state, bytes, byte_offset, &mut pins),
        }
    }

    fn mono_tick<P: LinePins>(
        &self,
        state: &mut RefreshState,
        bytes: &[u8],
        byte_offset: usize,
        pins: &mut P,
    ) {
        let high = state.advance() as usize % NUM_LINES;
        pins.release_all();
        pins.set_high(high);
        for (slot, location) in self.map.row(high).iter().enumerate() {
            if location.sample(bytes, byte_offset, 0b1) != 0 {
                pins.set_low(ScanMap::low_line(high, slot));
            }
        }
    }

    fn gray_tick<P: LinePins>(
        &self,
        state: &mut RefreshState,
        bytes: &[u8],
        byte_offset: usize,
        pins: &mut P,
    ) {
        let counter = state.advance();
        let gray_on = counter & 1 == 0;
        let high = (counter >> 1) as usize % NUM_LINES;
        let row = self.map.row(high);

        if gray_on {
            let flash = state.flash();
            pins.release_all();
            pins.set_high(high);
            for (slot, location) in row.iter().enumerate() {
                let lit = match location.sample(bytes, byte_offset, 0b11) {
                    0b01 | 0b10 => true,
                    0b11 => flash,
                    _ => false,
                };
                if lit {
                    pins.set_low(ScanMap::low_line(high, slot));
                }
            }
        } else {
            // second half: drop the dim pixels
            for (slot, location) in row.iter().enumerate() {
                if location.sample(bytes, byte_offset, 0b11) == 0b01 {
                    pins.release(ScanMap::low_line(high, slot));
                }
            }
        }
    }
}
