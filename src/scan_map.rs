//! Static scan tables for the charlieplexed panel.
//!
//! The panel's 96 LEDs hang between 11 lines. [`Wiring`] lists, for every LED
//! in panel order (left to right, top to bottom), the line that has to be
//! driven high and the line that has to be pulled low to light it. A
//! [`ScanMap`] inverts that list for one framebuffer [`Layout`],
//! [`Orientation`] and window offset: for every high line it holds the
//! location of the pixel controlling each of the 10 other lines.
//!
//! Both are built by `const fn`, so a table declared as a `const` or `static`
//! costs nothing at run time, and a malformed wiring table fails the build.
//!
//! ```rust
//! use charlieplex_framebuffer::{FrameBuffer, Mono12x8, Orientation, ScanMap, Wiring};
//!
//! const MAP: ScanMap = ScanMap::new(&Wiring::UNO_R4, Orientation::Landscape, Mono12x8::LAYOUT, 0);
//!
//! // LED 0 (top left) sits between line 7 (high) and line 3 (low)
//! let location = MAP.location(7, 3).unwrap();
//! assert_eq!((location.offset(), location.shift()), (0, 7));
//! ```

use bitfield::bitfield;

use crate::{Layout, NUM_LEDS, NUM_LINES, PANEL_HEIGHT, PANEL_WIDTH};

/// How the framebuffer is laid over the physical panel
///
/// The names describe where the board's USB connector ends up when the
/// content appears upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// 8 × 12, connector at the top. Panel column `x` is buffer row `x`,
    /// panel row `y` is buffer column `7 - y`.
    #[default]
    Portrait,
    /// 12 × 8, connector on the left. Panel and buffer coincide.
    Landscape,
    /// 8 × 12, connector at the bottom. [`Orientation::Portrait`] turned by
    /// 180°.
    ReversePortrait,
    /// 12 × 8, connector on the right. [`Orientation::Landscape`] turned by
    /// 180°.
    ReverseLandscape,
}

impl Orientation {
    /// Linear buffer index (`col + row * width`) of the pixel shown at panel
    /// position `(x, y)`.
    ///
    /// Axes the orientation does not mirror may run past the panel, which
    /// addresses the rest of a larger buffer.
    ///
    /// # Panics
    ///
    /// If a mirrored axis is outside the panel: `y > 7` for
    /// [`Orientation::Portrait`], `x > 11` for
    /// [`Orientation::ReversePortrait`], either for
    /// [`Orientation::ReverseLandscape`].
    #[must_use]
    pub const fn pixel_index(self, x: usize, y: usize, width: usize) -> usize {
        match self {
            Orientation::Portrait => {
                assert!(y < PANEL_HEIGHT, "panel row out of range");
                (PANEL_HEIGHT - 1 - y) + x * width
            }
            Orientation::Landscape => x + y * width,
            Orientation::ReversePortrait => {
                assert!(x < PANEL_WIDTH, "panel column out of range");
                y + (PANEL_WIDTH - 1 - x) * width
            }
            Orientation::ReverseLandscape => {
                assert!(x < PANEL_WIDTH, "panel column out of range");
                assert!(y < PANEL_HEIGHT, "panel row out of range");
                (PANEL_WIDTH - 1 - x) + (PANEL_HEIGHT - 1 - y) * width
            }
        }
    }

    /// Smallest buffer width that holds one panel row (landscape) or
    /// column (portrait) without spilling into the next buffer row.
    #[must_use]
    pub const fn min_width(self) -> usize {
        match self {
            Orientation::Portrait | Orientation::ReversePortrait => PANEL_HEIGHT,
            Orientation::Landscape | Orientation::ReverseLandscape => PANEL_WIDTH,
        }
    }
}

/// Reasons a wiring table is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WiringError {
    /// An entry names a line outside `0..NUM_LINES`
    LineOutOfRange {
        /// Index of the offending entry
        entry: usize,
        /// The line named
        line: u8,
    },
    /// An entry connects a line to itself
    SelfPair {
        /// Index of the offending entry
        entry: usize,
        /// The line named twice
        line: u8,
    },
    /// Two entries describe the same (high, low) pair
    DuplicatePair {
        /// Index of the later entry
        entry: usize,
        /// Index of the entry it repeats
        first: usize,
    },
}

impl core::fmt::Display for WiringError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WiringError::LineOutOfRange { entry, line } => {
                write!(f, "wiring entry {entry} names line {line}, only {NUM_LINES} exist")
            }
            WiringError::SelfPair { entry, line } => {
                write!(f, "wiring entry {entry} connects line {line} to itself")
            }
            WiringError::DuplicatePair { entry, first } => {
                write!(f, "wiring entry {entry} repeats entry {first}")
            }
        }
    }
}

impl core::error::Error for WiringError {}

/// Physical wiring of the panel: one `[high, low]` line pair per LED.
///
/// Entry `i` is the LED at panel position `(i % 12, i / 12)`. Both `[a, b]`
/// and `[b, a]` may appear since they are two LEDs of opposite polarity; the
/// same ordered pair may not appear twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wiring {
    entries: [[u8; 2]; NUM_LEDS],
}

impl Wiring {
    /// LED matrix of the Arduino UNO R4 WiFi
    #[rustfmt::skip]
    pub const UNO_R4: Wiring = Wiring::new([
        // row 0
        [7, 3], [3, 7], [7, 4], [4, 7], [3, 4], [4, 3],
        [7, 8], [8, 7], [3, 8], [8, 3], [4, 8], [8, 4],
        // row 1
        [7, 0], [0, 7], [3, 0], [0, 3], [4, 0], [0, 4],
        [8, 0], [0, 8], [7, 6], [6, 7], [3, 6], [6, 3],
        // row 2
        [4, 6], [6, 4], [8, 6], [6, 8], [0, 6], [6, 0],
        [7, 5], [5, 7], [3, 5], [5, 3], [4, 5], [5, 4],
        // row 3
        [8, 5], [5, 8], [0, 5], [5, 0], [6, 5], [5, 6],
        [7, 1], [1, 7], [3, 1], [1, 3], [4, 1], [1, 4],
        // row 4
        [8, 1], [1, 8], [0, 1], [1, 0], [6, 1], [1, 6],
        [5, 1], [1, 5], [7, 2], [2, 7], [3, 2], [2, 3],
        // row 5
        [4, 2], [2, 4], [8, 2], [2, 8], [0, 2], [2, 0],
        [6, 2], [2, 6], [5, 2], [2, 5], [1, 2], [2, 1],
        // row 6
        [7, 10], [10, 7], [3, 10], [10, 3], [4, 10], [10, 4],
        [8, 10], [10, 8], [0, 10], [10, 0], [6, 10], [10, 6],
        // row 7
        [5, 10], [10, 5], [1, 10], [10, 1], [2, 10], [10, 2],
        [7, 9], [9, 7], [3, 9], [9, 3], [4, 9], [9, 4],
    ]);

    /// Validate and wrap a wiring table.
    ///
    /// # Panics
    /// Panics if [`Wiring::check`] rejects the table. Used in a `const`
    /// this turns a bad table into a build error.
    #[must_use]
    pub const fn new(entries: [[u8; 2]; NUM_LEDS]) -> Self {
        match Self::check(&entries) {
            Ok(()) => Self { entries },
            Err(WiringError::LineOutOfRange { .. }) => panic!("wiring entry names an unknown line"),
            Err(WiringError::SelfPair { .. }) => panic!("wiring entry connects a line to itself"),
            Err(WiringError::DuplicatePair { .. }) => panic!("wiring entry is duplicated"),
        }
    }

    /// Check that every entry names two distinct lines below
    /// [`NUM_LINES`] and that no (high, low) pair repeats.
    ///
    /// # Errors
    /// Returns the first problem found, in entry order.
    pub const fn check(entries: &[[u8; 2]; NUM_LEDS]) -> Result<(), WiringError> {
        let mut first_seen = [usize::MAX; NUM_LINES * NUM_LINES];
        let mut entry = 0;
        while entry < NUM_LEDS {
            let [high, low] = entries[entry];
            if high as usize >= NUM_LINES {
                return Err(WiringError::LineOutOfRange { entry, line: high });
            }
            if low as usize >= NUM_LINES {
                return Err(WiringError::LineOutOfRange { entry, line: low });
            }
            if high == low {
                return Err(WiringError::SelfPair { entry, line: high });
            }
            let pair = high as usize * NUM_LINES + low as usize;
            if first_seen[pair] != usize::MAX {
                return Err(WiringError::DuplicatePair {
                    entry,
                    first: first_seen[pair],
                });
            }
            first_seen[pair] = entry;
            entry += 1;
        }
        Ok(())
    }

    /// The raw `[high, low]` entries
    #[must_use]
    pub const fn entries(&self) -> &[[u8; 2]; NUM_LEDS] {
        &self.entries
    }

    /// `(high, low)` lines of LED `led`.
    #[must_use]
    pub const fn entry(&self, led: usize) -> (usize, usize) {
        let [high, low] = self.entries[led];
        (high as usize, low as usize)
    }

    /// Index of the LED lit by driving `high` high and `low` low, if any.
    #[must_use]
    pub fn position(&self, high: usize, low: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|&[h, l]| usize::from(h) == high && usize::from(l) == low)
    }
}

bitfield! {
    /// 16-bit location of the pixel controlling one LED.
    ///
    /// The bit layout is as follows:
    /// - Bits 15-4: Byte offset within the framebuffer
    /// - Bits 3-0: Right shift of the pixel within that byte
    ///
    /// A shift of 8 marks a slot without an LED; sampling it always yields 0.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PixelLocation(u16);
    impl Debug;
    pub u16, offset, _: 15, 4;
    pub u8, shift, _: 3, 0;
}

impl PixelLocation {
    /// Slot of a line pair with no LED attached
    pub const UNWIRED: Self = Self(8);

    /// Location of the pixel at byte `offset`, right shift `shift`.
    #[must_use]
    pub const fn new(offset: usize, shift: u8) -> Self {
        assert!(offset < crate::MAX_BUFFER_BYTES, "pixel offset out of range");
        assert!(shift < 8, "pixel shift out of range");
        Self(((offset as u16) << 4) | shift as u16)
    }

    /// Whether an LED is attached to this slot
    #[must_use]
    pub fn is_wired(&self) -> bool {
        self.shift() < 8
    }

    /// Read the pixel from `bytes`, displaced by `byte_offset` bytes and
    /// wrapping at the end of the buffer. `byte_offset` must be smaller than
    /// `bytes.len()`.
    #[inline]
    pub(crate) fn sample(self, bytes: &[u8], byte_offset: usize, mask: u8) -> u8 {
        let mut index = byte_offset + usize::from(self.offset());
        if index >= bytes.len() {
            index -= bytes.len();
        }
        // shift 8 empties the byte for unwired slots
        ((u32::from(bytes[index]) >> self.shift()) & u32::from(mask)) as u8
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PixelLocation {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PixelLocation {{ offset: {}, shift: {} }}", self.offset(), self.shift());
    }
}

/// Per high line, the pixel locations controlling the 10 other lines.
///
/// Row `high` lists the other lines in ascending order with `high` itself
/// skipped; [`ScanMap::low_line`] converts a slot back to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMap {
    rows: [[PixelLocation; NUM_LINES - 1]; NUM_LINES],
}

impl ScanMap {
    /// Build the table for a framebuffer.
    ///
    /// # Arguments
    ///
    /// * `wiring` - Physical wiring of the panel
    /// * `orientation` - How the buffer is laid over the panel
    /// * `layout` - Geometry and packing of the framebuffer
    /// * `pixel_offset` - Position, in pixels, of the visible window's first
    ///   pixel inside the buffer. Locations past the end wrap around.
    ///
    /// # Panics
    ///
    /// If the buffer is narrower than [`Orientation::min_width`].
    #[must_use]
    pub const fn new(
        wiring: &Wiring,
        orientation: Orientation,
        layout: Layout,
        pixel_offset: usize,
    ) -> Self {
        assert!(
            layout.width() >= orientation.min_width(),
            "buffer too narrow for the orientation"
        );
        let mut rows = [[PixelLocation::UNWIRED; NUM_LINES - 1]; NUM_LINES];
        let mut led = 0;
        while led < NUM_LEDS {
            let (high, low) = wiring.entry(led);
            let slot = if low > high { low - 1 } else { low };
            let pixel =
                orientation.pixel_index(led % PANEL_WIDTH, led / PANEL_WIDTH, layout.width());
            let (byte, shift) = layout.locate(pixel + pixel_offset);
            rows[high][slot] = PixelLocation::new(byte % layout.byte_count(), shift);
            led += 1;
        }
        Self { rows }
    }

    /// Line controlled by `slot` of high line `high`.
    #[must_use]
    pub const fn low_line(high: usize, slot: usize) -> usize {
        if slot >= high {
            slot + 1
        } else {
            slot
        }
    }

    /// The 10 slots of high line `high`.
    #[must_use]
    pub const fn row(&self, high: usize) -> &[PixelLocation; NUM_LINES - 1] {
        &self.rows[high]
    }

    /// Location of the pixel lighting the LED between `high` and `low`, or
    /// `None` if no LED is wired there.
    #[must_use]
    pub fn location(&self, high: usize, low: usize) -> Option<PixelLocation> {
        if high >= NUM_LINES || low >= NUM_LINES || high == low {
            return None;
        }
        let slot = if low > high { low - 1 } else { low };
        let location = self.rows[high][slot];
        location.is_wired().then_some(location)
    }

    /// Number of slots with an LED attached
    #[must_use]
    pub fn wired_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|location| location.is_wired())
            .count()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScanMap {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ScanMap {{ wired: {} }}", self.wired_count());
    }
}
