//! Framebuffer and refresh driver for charlieplexed LED matrices.
//!
//! ## How Charlieplexed LED Matrices Work
//!
//! A charlieplexed matrix uses N tri-state I/O lines to address up to
//! N × (N − 1) LEDs. Every ordered pair of lines (A, B) can host one LED with
//! its anode on A and its cathode on B, and a second LED of opposite polarity
//! on (B, A).
//!
//! ### Line states
//! - **High** – the line sources current into every anode connected to it
//! - **Low** – the line sinks current from every cathode connected to it
//! - **Released** (high impedance) – the line takes no part in the circuit
//!
//! ### Scanning workflow
//! 1. Release every line so no LED is lit.
//! 2. Drive one line (the *high row*) high.
//! 3. Drive low every other line whose LED (high row → line) should be lit.
//!    All other lines stay released.
//! 4. On the next refresh tick, move on to the next high row.
//! 5. After N ticks every LED has been given its time slot. Repeated fast
//!    enough (at least 500 Hz for the 11 line panel) the eye sees a steady
//!    image.
//!
//! Only one high row is active at a time, so each LED is lit for at most
//! 1/N of the time and every high row contributes the same duty cycle.
//!
//! ### Brightness and blinking
//! The 2-bit [`GrayBlink`] format splits every high row slot into two half
//! ticks. Bright pixels are lit in both halves, dim pixels are released in
//! the second half, and blinking pixels are only lit while the slowly
//! toggling blink phase (see [`RefreshState::blink_mask`]) is active. No PWM
//! hardware is needed.
//!
//! ## The 12 × 8 Panel
//!
//! The default wiring, [`Wiring::UNO_R4`], describes the 96 LED matrix of the
//! Arduino UNO R4 WiFi: 11 lines, 96 of the 110 possible LEDs populated, laid
//! out as 12 columns by 8 rows. The [`ScanMap`] translating every LED to the
//! bit of the pixel buffer that controls it is built once in `const` context,
//! so a refresh tick only reads bytes and toggles lines.
//!
//! ## Usage
//!
//! ```rust
//! use charlieplex_framebuffer::pins::RecordingPins;
//! use charlieplex_framebuffer::{Driver, Mono12x8, Orientation, RefreshState};
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//!
//! // Built at compile time.
//! static DRIVER: Driver<Mono12x8> = Driver::new(Orientation::Landscape);
//!
//! let mut framebuffer = Mono12x8::new();
//! Rectangle::new(Point::new(2, 2), Size::new(4, 3))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut framebuffer)
//!     .unwrap();
//!
//! // Call this from a timer interrupt running at 500 Hz or faster.
//! let mut state = RefreshState::new();
//! let mut pins = RecordingPins::<32>::new();
//! DRIVER.drive(&mut state, &framebuffer, &mut pins);
//! ```
//!
//! ## Virtual Screens
//! A buffer can be larger than the visible 12 × 8 window. The window is
//! placed either when the driver is built ([`Driver::with_offset`], any pixel
//! offset) or on every tick ([`Driver::drive_at`], whole-byte offsets). For
//! smooth scrolling text use a portrait buffer (8 pixels wide, any height),
//! draw the text through [`remap::Rotated`] and advance the byte offset.
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types so they can be emitted
//! with the `defmt` logging framework. No functional changes; purely adds
//! trait impls.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod buffer;
pub mod driver;
pub mod pins;
pub mod remap;
pub mod scan_map;
pub mod shared;

pub use buffer::{GrayBlink, LsbFirst, Monochrome, MsbFirst, PixelBuffer, Shade};
pub use driver::{Driver, RefreshState};
pub use pins::LinePins;
pub use scan_map::{Orientation, PixelLocation, ScanMap, Wiring, WiringError};

/// Number of physical drive lines of the panel.
pub const NUM_LINES: usize = 11;

/// Number of LEDs populated on the panel.
pub const NUM_LEDS: usize = 96;

/// Width of the physical panel in LEDs.
pub const PANEL_WIDTH: usize = 12;

/// Height of the physical panel in LEDs.
pub const PANEL_HEIGHT: usize = 8;

/// Upper bound of `PANEL_WIDTH * width` for any framebuffer.
pub const MAX_FRAME_BITS: usize = 2048;

/// Largest framebuffer, in bytes, that a [`ScanMap`] can address.
///
/// Byte offsets are packed into 12 bits of a [`PixelLocation`], which caps
/// an 8 pixel wide scrolling strip at 4096 monochrome or 2048 gray rows.
pub const MAX_BUFFER_BYTES: usize = 4096;

/// Pixel encoding of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// 1 bit per pixel: 1 is on, 0 is off
    Monochrome,
    /// 2 bits per pixel: 00 off, 01 low intensity, 10 high intensity,
    /// 11 blinking high intensity
    GrayBlink,
}

impl Format {
    /// Number of bits each pixel occupies.
    #[must_use]
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Format::Monochrome => 1,
            Format::GrayBlink => 2,
        }
    }

    /// Mask selecting one pixel value once shifted down.
    #[must_use]
    pub const fn mask(self) -> u8 {
        (1 << self.bits_per_pixel()) - 1
    }
}

/// Placement of consecutive pixels within a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// The first pixel occupies the most significant bits
    MsbFirst,
    /// The first pixel occupies the least significant bits
    LsbFirst,
}

impl BitOrder {
    /// Right shift that brings a pixel starting at bit `within` (counted from
    /// the start of its byte in pixel order) down to bit 0.
    #[must_use]
    pub const fn shift(self, within: usize, bits_per_pixel: u8) -> u8 {
        match self {
            BitOrder::MsbFirst => 8 - bits_per_pixel - within as u8,
            BitOrder::LsbFirst => within as u8,
        }
    }
}

/// Computes the number of bytes backing a framebuffer
///
/// # Arguments
///
/// * `width` - Width of the framebuffer in pixels
/// * `height` - Height of the framebuffer in pixels
/// * `format` - Pixel encoding
///
/// # Returns
///
/// `ceil(width * height * bits_per_pixel / 8)`
#[must_use]
pub const fn compute_buffer_bytes(width: usize, height: usize, format: Format) -> usize {
    (width * height * format.bits_per_pixel() as usize).div_ceil(8)
}

/// Geometry and packing rule of a framebuffer.
///
/// Both [`PixelBuffer`] and [`ScanMap`] locate pixels through
/// [`Layout::locate`], so what is drawn is exactly what is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    width: usize,
    height: usize,
    format: Format,
    order: BitOrder,
    byte_count: usize,
}

impl Layout {
    /// Describe a framebuffer. Panics (at compile time when used in a
    /// `const`) if the dimensions are empty, the frame is too large for the
    /// panel or `byte_count` does not match [`compute_buffer_bytes`].
    #[must_use]
    pub const fn new(
        width: usize,
        height: usize,
        format: Format,
        order: BitOrder,
        byte_count: usize,
    ) -> Self {
        assert!(width > 0, "width can't be zero");
        assert!(height > 0, "height can't be zero");
        assert!(PANEL_WIDTH * width < MAX_FRAME_BITS, "too large frame");
        assert!(
            byte_count == compute_buffer_bytes(width, height, format),
            "byte count does not match compute_buffer_bytes"
        );
        assert!(
            byte_count <= MAX_BUFFER_BYTES,
            "framebuffer too large to be scanned"
        );
        Self {
            width,
            height,
            format,
            order,
            byte_count,
        }
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixel encoding
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Bit order within a byte
    #[must_use]
    pub const fn order(&self) -> BitOrder {
        self.order
    }

    /// Size of the backing storage in bytes
    #[must_use]
    pub const fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Mask of one pixel value
    #[must_use]
    pub const fn mask(&self) -> u8 {
        self.format.mask()
    }

    /// Byte index and right shift of the pixel with linear index
    /// `pixel_index` (`x + y * width`).
    #[must_use]
    pub const fn locate(&self, pixel_index: usize) -> (usize, u8) {
        let bits_per_pixel = self.format.bits_per_pixel();
        let bit = pixel_index * bits_per_pixel as usize;
        (bit / 8, self.order.shift(bit % 8, bits_per_pixel))
    }
}

/// Trait for framebuffers the [`Driver`] can scan
///
/// The layout is a compile time constant so the driver's scan table can be
/// built in `const` context and the tick never branches on the format.
pub trait FrameBuffer {
    /// Geometry and packing of the buffer
    const LAYOUT: Layout;

    /// The packed pixel bytes, exactly `LAYOUT.byte_count()` long.
    fn as_bytes(&self) -> &[u8];
}

/// 12 × 8 monochrome buffer matching the panel in landscape orientation
pub type Mono12x8 =
    PixelBuffer<PANEL_WIDTH, PANEL_HEIGHT, { compute_buffer_bytes(12, 8, Format::Monochrome) }>;

/// 12 × 8 gray/blink buffer matching the panel in landscape orientation
pub type Gray12x8 = PixelBuffer<
    PANEL_WIDTH,
    PANEL_HEIGHT,
    { compute_buffer_bytes(12, 8, Format::GrayBlink) },
    GrayBlink,
>;

/// 8 × 12 monochrome buffer matching the panel in portrait orientation
pub type Mono8x12 =
    PixelBuffer<PANEL_HEIGHT, PANEL_WIDTH, { compute_buffer_bytes(8, 12, Format::Monochrome) }>;

/// 8 × 12 gray/blink buffer matching the panel in portrait orientation
pub type Gray8x12 = PixelBuffer<
    PANEL_HEIGHT,
    PANEL_WIDTH,
    { compute_buffer_bytes(8, 12, Format::GrayBlink) },
    GrayBlink,
>;

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;

    #[test]
    fn test_bits_per_pixel() {
        assert_eq!(Format::Monochrome.bits_per_pixel(), 1);
        assert_eq!(Format::GrayBlink.bits_per_pixel(), 2);
        assert_eq!(Format::Monochrome.mask(), 0b1);
        assert_eq!(Format::GrayBlink.mask(), 0b11);
    }

    #[test]
    fn test_compute_buffer_bytes() {
        assert_eq!(compute_buffer_bytes(12, 8, Format::Monochrome), 12);
        assert_eq!(compute_buffer_bytes(12, 8, Format::GrayBlink), 24);
        assert_eq!(compute_buffer_bytes(8, 12, Format::Monochrome), 12);

        // partial bytes are rounded up
        assert_eq!(compute_buffer_bytes(3, 3, Format::Monochrome), 2);
        assert_eq!(compute_buffer_bytes(3, 1, Format::GrayBlink), 1);
        assert_eq!(compute_buffer_bytes(5, 1, Format::GrayBlink), 2);
    }

    #[test]
    fn test_bit_order_shift() {
        // first pixel of a byte
        assert_eq!(BitOrder::MsbFirst.shift(0, 1), 7);
        assert_eq!(BitOrder::LsbFirst.shift(0, 1), 0);
        // last pixel of a byte
        assert_eq!(BitOrder::MsbFirst.shift(7, 1), 0);
        assert_eq!(BitOrder::LsbFirst.shift(7, 1), 7);
        // 2 bit pixels
        assert_eq!(BitOrder::MsbFirst.shift(0, 2), 6);
        assert_eq!(BitOrder::MsbFirst.shift(6, 2), 0);
        assert_eq!(BitOrder::LsbFirst.shift(2, 2), 2);
    }

    #[test]
    fn test_layout_locate_monochrome() {
        let layout = Layout::new(12, 8, Format::Monochrome, BitOrder::MsbFirst, 12);
        assert_eq!(layout.locate(0), (0, 7));
        assert_eq!(layout.locate(7), (0, 0));
        assert_eq!(layout.locate(8), (1, 7));
        assert_eq!(layout.locate(95), (11, 0));

        let layout = Layout::new(12, 8, Format::Monochrome, BitOrder::LsbFirst, 12);
        assert_eq!(layout.locate(0), (0, 0));
        assert_eq!(layout.locate(9), (1, 1));
    }

    #[test]
    fn test_layout_locate_gray() {
        let layout = Layout::new(12, 8, Format::GrayBlink, BitOrder::MsbFirst, 24);
        assert_eq!(layout.locate(0), (0, 6));
        assert_eq!(layout.locate(3), (0, 0));
        assert_eq!(layout.locate(4), (1, 6));

        let layout = Layout::new(12, 8, Format::GrayBlink, BitOrder::LsbFirst, 24);
        assert_eq!(layout.locate(1), (0, 2));
        assert_eq!(layout.locate(5), (1, 2));
    }

    #[test]
    fn test_layout_accessors() {
        const LAYOUT: Layout = Layout::new(8, 12, Format::GrayBlink, BitOrder::LsbFirst, 24);
        assert_eq!(LAYOUT.width(), 8);
        assert_eq!(LAYOUT.height(), 12);
        assert_eq!(LAYOUT.format(), Format::GrayBlink);
        assert_eq!(LAYOUT.order(), BitOrder::LsbFirst);
        assert_eq!(LAYOUT.byte_count(), 24);
        assert_eq!(LAYOUT.mask(), 0b11);
    }

    #[test]
    #[should_panic(expected = "byte count does not match")]
    fn test_layout_rejects_wrong_byte_count() {
        let _ = Layout::new(12, 8, Format::Monochrome, BitOrder::MsbFirst, 13);
    }

    #[test]
    #[should_panic(expected = "too large frame")]
    fn test_layout_rejects_wide_frame() {
        let _ = Layout::new(171, 1, Format::Monochrome, BitOrder::MsbFirst, 22);
    }

    #[test]
    fn test_tallest_strip_is_accepted() {
        let layout = Layout::new(8, 4096, Format::Monochrome, BitOrder::MsbFirst, 4096);
        assert_eq!(layout.byte_count(), MAX_BUFFER_BYTES);
        let layout = Layout::new(8, 2048, Format::GrayBlink, BitOrder::MsbFirst, 4096);
        assert_eq!(layout.byte_count(), MAX_BUFFER_BYTES);
    }

    #[test]
    #[should_panic(expected = "framebuffer too large to be scanned")]
    fn test_layout_rejects_oversized_strip() {
        let _ = Layout::new(8, 4097, Format::Monochrome, BitOrder::MsbFirst, 4097);
    }

    #[test]
    fn test_widest_frame_is_accepted() {
        let layout = Layout::new(170, 8, Format::Monochrome, BitOrder::MsbFirst, 170);
        assert_eq!(layout.width(), 170);
    }

    #[test]
    fn test_panel_aliases() {
        assert_eq!(Mono12x8::LAYOUT.byte_count(), 12);
        assert_eq!(Gray12x8::LAYOUT.byte_count(), 24);
        assert_eq!(Mono8x12::LAYOUT.width(), 8);
        assert_eq!(Gray8x12::LAYOUT.height(), 12);
    }

    #[test]
    fn test_format_debug() {
        assert_eq!(format!("{:?}", Format::Monochrome), "Monochrome");
        assert_eq!(format!("{:?}", BitOrder::LsbFirst), "LsbFirst");
    }
}
