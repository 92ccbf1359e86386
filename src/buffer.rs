//! Packed pixel storage for charlieplexed LED panels.
//!
//! A [`PixelBuffer`] is a plain byte array holding `WIDTH × HEIGHT` pixels in
//! one of two formats:
//!
//! - [`Monochrome`] – 1 bit per pixel, drawn with
//!   [`BinaryColor`](embedded_graphics::pixelcolor::BinaryColor)
//! - [`GrayBlink`] – 2 bits per pixel, drawn with [`Shade`]
//!
//! and one of two bit orders ([`MsbFirst`], [`LsbFirst`]). Pixel `(x, y)` has
//! linear index `x + y * WIDTH`; its bits start at `index * bits_per_pixel`.
//!
//! The buffer can be larger than the visible panel to form a virtual screen.
//! Its width is limited to 170 pixels because `12 × WIDTH` must stay below
//! 2048 bits. For scrolling text prefer a portrait buffer (8 pixels wide)
//! and rotated glyphs. Its height is bounded only by the storage limit of
//! [`MAX_BUFFER_BYTES`](crate::MAX_BUFFER_BYTES): the scan table addresses
//! bytes with 12 bits, so a strip holds at most 4096 rows in
//! [`Monochrome`] and 2048 rows in [`GrayBlink`].
//!
//! Out of range coordinates are ignored by every write and read as zero, so
//! drawing code never has to clip.
//!
//! # Example
//! ```rust
//! use charlieplex_framebuffer::{Gray12x8, Shade};
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{Line, PrimitiveStyle};
//!
//! let mut framebuffer = Gray12x8::new();
//!
//! // Draw a dim diagonal and one blinking pixel
//! Line::new(Point::new(0, 0), Point::new(7, 7))
//!     .into_styled(PrimitiveStyle::with_stroke(Shade::Dim, 1))
//!     .draw(&mut framebuffer)
//!     .unwrap();
//! framebuffer.set_pixel(11, 0, Shade::Blink as u8);
//!
//! assert_eq!(framebuffer.get_pixel(3, 3), Shade::Dim as u8);
//! assert_eq!(framebuffer.get_pixel(11, 0), 0b11);
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_graphics::pixelcolor::raw::RawU2;
use embedded_graphics::pixelcolor::{BinaryColor, Gray2, GrayColor, PixelColor};
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use embedded_graphics::primitives::{PointsIter, Rectangle};

use crate::{BitOrder, Format, FrameBuffer, Layout};

/// Pixel encoding of a [`PixelBuffer`], chosen at compile time.
pub trait PixelFormat {
    /// Encoding stored in the buffer
    const FORMAT: Format;

    /// Colour accepted by the `embedded-graphics` draw target
    type Color: PixelColor;

    /// Raw pixel value of a colour
    fn to_raw(color: Self::Color) -> u8;

    /// Colour of a raw pixel value
    fn from_raw(raw: u8) -> Self::Color;
}

/// Bit order of a [`PixelBuffer`], chosen at compile time.
pub trait PixelOrder {
    /// Placement of consecutive pixels within a byte
    const ORDER: BitOrder;
}

/// 1 bit per pixel: on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Monochrome;

impl PixelFormat for Monochrome {
    const FORMAT: Format = Format::Monochrome;

    type Color = BinaryColor;

    fn to_raw(color: BinaryColor) -> u8 {
        u8::from(color.is_on())
    }

    fn from_raw(raw: u8) -> BinaryColor {
        BinaryColor::from(raw & 1 != 0)
    }
}

/// 2 bits per pixel: off, low intensity, high intensity, blinking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrayBlink;

impl PixelFormat for GrayBlink {
    const FORMAT: Format = Format::GrayBlink;

    type Color = Shade;

    fn to_raw(color: Shade) -> u8 {
        color as u8
    }

    fn from_raw(raw: u8) -> Shade {
        Shade::from_raw(raw)
    }
}

/// First pixel in the most significant bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsbFirst;

impl PixelOrder for MsbFirst {
    const ORDER: BitOrder = BitOrder::MsbFirst;
}

/// First pixel in the least significant bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LsbFirst;

impl PixelOrder for LsbFirst {
    const ORDER: BitOrder = BitOrder::LsbFirst;
}

/// Colour of a [`GrayBlink`] pixel.
///
/// The discriminants are the raw 2-bit values stored in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Shade {
    /// LED off (`00`)
    #[default]
    Off = 0b00,
    /// Low intensity, lit for half of its slot (`01`)
    Dim = 0b01,
    /// High intensity, lit for its whole slot (`10`)
    Bright = 0b10,
    /// High intensity while the blink phase is active (`11`)
    Blink = 0b11,
}

impl Shade {
    /// Shade of a raw pixel value; bits above the lowest two are ignored.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw & 0b11 {
            0b00 => Shade::Off,
            0b01 => Shade::Dim,
            0b10 => Shade::Bright,
            _ => Shade::Blink,
        }
    }
}

impl PixelColor for Shade {
    type Raw = RawU2;
}

impl From<Gray2> for Shade {
    fn from(color: Gray2) -> Self {
        Shade::from_raw(color.luma())
    }
}

impl From<BinaryColor> for Shade {
    fn from(color: BinaryColor) -> Self {
        if color.is_on() {
            Shade::Bright
        } else {
            Shade::Off
        }
    }
}

/// Packed framebuffer for a charlieplexed panel.
///
/// # Type Parameters
/// - `WIDTH`: Width in pixels (at most 170)
/// - `HEIGHT`: Height in pixels
/// - `BYTES`: Size of the backing storage; must equal
///   [`compute_buffer_bytes`](crate::compute_buffer_bytes)`(WIDTH, HEIGHT, F::FORMAT)`
/// - `F`: [`Monochrome`] or [`GrayBlink`]
/// - `O`: [`MsbFirst`] or [`LsbFirst`]
///
/// A mismatching `BYTES` or an oversized frame fails to compile as soon as
/// the buffer is constructed.
///
/// # Example
/// ```rust
/// use charlieplex_framebuffer::{compute_buffer_bytes, Format, PixelBuffer};
///
/// const WIDTH: usize = 24;
/// const HEIGHT: usize = 8;
/// const BYTES: usize = compute_buffer_bytes(WIDTH, HEIGHT, Format::Monochrome);
///
/// // A virtual screen twice as wide as the panel
/// let mut screen: PixelBuffer<WIDTH, HEIGHT, BYTES> = PixelBuffer::new();
/// screen.set_pixel(23, 7, 1);
/// assert_eq!(screen.as_bytes()[BYTES - 1], 0b0000_0001);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<
    const WIDTH: usize,
    const HEIGHT: usize,
    const BYTES: usize,
    F = Monochrome,
    O = MsbFirst,
> {
    pixels: [u8; BYTES],
    _format: PhantomData<(F, O)>,
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O> Default
    for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O>
    PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    /// Create a cleared framebuffer.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_bytes([0; BYTES])
    }

    /// Create a framebuffer from packed pixel bytes, e.g. a `const` image.
    #[must_use]
    pub const fn from_bytes(pixels: [u8; BYTES]) -> Self {
        let _layout = <Self as FrameBuffer>::LAYOUT;
        Self {
            pixels,
            _format: PhantomData,
        }
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> usize {
        WIDTH
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// The packed pixel bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTES] {
        &self.pixels
    }

    /// Mutable access to the packed pixel bytes for bulk copies.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BYTES] {
        &mut self.pixels
    }

    /// Clear every pixel.
    pub fn erase(&mut self) {
        self.pixels.fill(0);
    }

    /// Set every pixel to `value` (masked to the pixel width).
    pub fn fill(&mut self, value: u8) {
        let layout = <Self as FrameBuffer>::LAYOUT;
        let value = value & layout.mask();
        let bits = layout.format().bits_per_pixel();
        let mut pattern = 0u8;
        let mut filled = 0;
        while filled < 8 {
            pattern = (pattern << bits) | value;
            filled += bits;
        }
        self.pixels.fill(pattern);
    }

    /// Set the pixel at `(x, y)` to `value`, masked to the pixel width.
    /// Coordinates outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let layout = <Self as FrameBuffer>::LAYOUT;
        let (byte, shift) = layout.locate(x + y * WIDTH);
        let mask = layout.mask() << shift;
        let pixel = &mut self.pixels[byte];
        *pixel = (*pixel & !mask) | ((value << shift) & mask);
    }

    /// Value of the pixel at `(x, y)`, or 0 outside the buffer.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        if x >= WIDTH || y >= HEIGHT {
            return 0;
        }
        let layout = <Self as FrameBuffer>::LAYOUT;
        let (byte, shift) = layout.locate(x + y * WIDTH);
        (self.pixels[byte] >> shift) & layout.mask()
    }

    /// Set the pixel at `p` to `color`. Points outside the buffer are
    /// ignored.
    pub fn set_color(&mut self, p: Point, color: F::Color) {
        if p.x < 0 || p.y < 0 {
            return;
        }
        self.set_pixel(p.x as usize, p.y as usize, F::to_raw(color));
    }

    /// Colour of the pixel at `p`; the zero colour outside the buffer.
    #[must_use]
    pub fn color(&self, p: Point) -> F::Color {
        if p.x < 0 || p.y < 0 {
            return F::from_raw(0);
        }
        F::from_raw(self.get_pixel(p.x as usize, p.y as usize))
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O> FrameBuffer
    for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    const LAYOUT: Layout = Layout::new(WIDTH, HEIGHT, F::FORMAT, O::ORDER, BYTES);

    fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O> OriginDimensions
    for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O>
    embedded_graphics::draw_target::DrawTarget for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    type Color = F::Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            self.set_color(pixel.0, pixel.1);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&Rectangle::new(Point::zero(), self.size()));
        let value = F::to_raw(color);
        for p in area.points() {
            self.set_pixel(p.x as usize, p.y as usize, value);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(F::to_raw(color));
        Ok(())
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O> core::fmt::Debug
    for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &WIDTH)
            .field("height", &HEIGHT)
            .field("format", &F::FORMAT)
            .field("order", &O::ORDER)
            .field("size", &BYTES)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize, F, O> defmt::Format
    for PixelBuffer<WIDTH, HEIGHT, BYTES, F, O>
where
    F: PixelFormat,
    O: PixelOrder,
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PixelBuffer<{}, {}, {}>", WIDTH, HEIGHT, BYTES);
        defmt::write!(f, " format: {}", F::FORMAT);
        defmt::write!(f, " order: {}", O::ORDER);
    }
}
