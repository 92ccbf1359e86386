//! Drawing in panel coordinates into buffers scanned in any orientation.
//!
//! A framebuffer scanned with [`Orientation::Portrait`] appears on the panel
//! turned by 90°. Wrapping it in [`Rotated`] lets you draw as if looking at
//! the panel: the point `(x, y)` lands in the buffer pixel that the driver
//! shows at panel column `x`, row `y`, using the same
//! [`Orientation::pixel_index`] rule as the scan table. Axes the orientation
//! mirrors end at the panel's edge; the others extend over the whole buffer.
//! A portrait buffer taller than the panel therefore becomes a long
//! horizontal strip that can be scrolled one column per byte with
//! [`Driver::drive_at`](crate::Driver::drive_at).
//!
//! ```rust
//! use charlieplex_framebuffer::remap::Rotated;
//! use charlieplex_framebuffer::{compute_buffer_bytes, Format, Orientation, PixelBuffer};
//! use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::text::{Baseline, Text};
//!
//! const LENGTH: usize = 64;
//! const BYTES: usize = compute_buffer_bytes(8, LENGTH, Format::Monochrome);
//! type Strip = PixelBuffer<8, LENGTH, BYTES>;
//!
//! let mut strip = Rotated::new(Strip::new(), Orientation::Portrait);
//! assert_eq!(strip.size(), Size::new(64, 8));
//!
//! let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
//! Text::with_baseline("Hello", Point::zero(), style, Baseline::Top)
//!     .draw(&mut strip)
//!     .unwrap();
//! let strip = strip.into_inner();
//! ```

use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, PixelColor, Point, Size};

use crate::scan_map::Orientation;
use crate::{PANEL_HEIGHT, PANEL_WIDTH};

/// Translates points drawn in panel coordinates into target coordinates.
pub trait PixelRemapper {
    /// Map `(x, y)` inside [`PixelRemapper::virtual_size`] to a pixel of a
    /// target of size `target`.
    fn remap_xy(&self, x: usize, y: usize, target: Size) -> (usize, usize);

    /// Drawable area, seen from the panel, for a target of size `target`.
    fn virtual_size(&self, target: Size) -> Size;

    /// Map a point, sending anything outside the virtual area off the
    /// target.
    #[inline]
    #[must_use]
    fn remap_point(&self, point: Point, target: Size) -> Point {
        if point.x < 0 || point.y < 0 {
            // Skip remapping points which are off the screen
            return point;
        }
        let size = self.virtual_size(target);
        let (x, y) = (point.x as usize, point.y as usize);
        if x >= size.width as usize || y >= size.height as usize {
            return Point::new(-1, -1);
        }
        let (re_x, re_y) = self.remap_xy(x, y, target);
        Point::new(re_x as i32, re_y as i32)
    }

    /// Map the position of a pixel, keeping its colour.
    #[inline]
    fn remap<C: PixelColor>(&self, mut pixel: Pixel<C>, target: Size) -> Pixel<C> {
        pixel.0 = self.remap_point(pixel.0, target);
        pixel
    }
}

impl PixelRemapper for Orientation {
    fn remap_xy(&self, x: usize, y: usize, target: Size) -> (usize, usize) {
        let width = target.width as usize;
        let index = self.pixel_index(x, y, width);
        (index % width, index / width)
    }

    fn virtual_size(&self, target: Size) -> Size {
        // mirrored axes are anchored at the panel and end with it
        let panel_width = PANEL_WIDTH as u32;
        let panel_height = PANEL_HEIGHT as u32;
        match self {
            Orientation::Portrait => Size::new(target.height, target.width.min(panel_height)),
            Orientation::Landscape => target,
            Orientation::ReversePortrait => {
                Size::new(target.height.min(panel_width), target.width)
            }
            Orientation::ReverseLandscape => Size::new(
                target.width.min(panel_width),
                target.height.min(panel_height),
            ),
        }
    }
}

/// Draw target that remaps every pixel before passing it on
///
/// # Type Parameters
///
/// * `T` - The wrapped target, usually a [`PixelBuffer`](crate::PixelBuffer)
/// * `R` - The remapping policy, by default the [`Orientation`] the target
///   is scanned with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated<T, R = Orientation> {
    target: T,
    remapper: R,
}

impl<T, R> Rotated<T, R> {
    /// Wrap `target`.
    #[must_use]
    pub const fn new(target: T, remapper: R) -> Self {
        Self { target, remapper }
    }

    /// The wrapped target
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.target
    }

    /// The wrapped target, e.g. to hand it to the driver between frames.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Unwrap the target.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.target
    }
}

impl<T: OriginDimensions, R: PixelRemapper> OriginDimensions for Rotated<T, R> {
    fn size(&self) -> Size {
        self.remapper.virtual_size(self.target.size())
    }
}

impl<T, R> DrawTarget for Rotated<T, R>
where
    T: DrawTarget + OriginDimensions,
    R: PixelRemapper,
{
    type Color = T::Color;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let target = self.target.size();
        let remapper = &self.remapper;
        self.target
            .draw_iter(pixels.into_iter().map(|pixel| remapper.remap(pixel, target)))
    }
}
