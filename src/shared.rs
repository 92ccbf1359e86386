//! Framebuffer shared between the main loop and the refresh interrupt.
//!
//! The usual arrangement draws in the main loop and refreshes the panel from
//! a timer interrupt. [`SharedDisplay`] keeps the framebuffer, its
//! [`RefreshState`] and the runtime window offset behind a
//! [`critical_section::Mutex`], so both sides can reach it through a
//! `static`.
//!
//! ```rust
//! use charlieplex_framebuffer::pins::RecordingPins;
//! use charlieplex_framebuffer::shared::SharedDisplay;
//! use charlieplex_framebuffer::{Driver, Mono12x8, Orientation};
//!
//! static DISPLAY: SharedDisplay<Mono12x8> =
//!     SharedDisplay::new(Driver::new(Orientation::Landscape), Mono12x8::new());
//!
//! // main loop
//! DISPLAY.update(|framebuffer| framebuffer.set_pixel(0, 0, 1));
//!
//! // timer interrupt
//! let mut pins = RecordingPins::<32>::new();
//! DISPLAY.tick(&mut pins);
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::{Driver, RefreshState};
use crate::pins::LinePins;
use crate::FrameBuffer;

struct Shared<B> {
    state: RefreshState,
    buffer: B,
    byte_offset: usize,
}

/// Driver, refresh state and framebuffer for use from an interrupt
///
/// Every method runs inside a critical section. Calling another method of
/// the same display from within an [`SharedDisplay::update`] closure panics.
pub struct SharedDisplay<B> {
    driver: Driver<B>,
    shared: Mutex<RefCell<Shared<B>>>,
}

impl<B: FrameBuffer> SharedDisplay<B> {
    /// Bundle `driver` with the framebuffer it shows.
    #[must_use]
    pub const fn new(driver: Driver<B>, buffer: B) -> Self {
        Self {
            driver,
            shared: Mutex::new(RefCell::new(Shared {
                state: RefreshState::new(),
                buffer,
                byte_offset: 0,
            })),
        }
    }

    /// Run one refresh tick. Call this from the timer interrupt.
    pub fn tick<P: LinePins>(&self, pins: P) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let shared = &mut *shared;
            self.driver
                .drive_at(&mut shared.state, &shared.buffer, shared.byte_offset, pins);
        });
    }

    /// Modify the framebuffer. The panel keeps refreshing the old content
    /// until `f` returns, so keep it short.
    pub fn update<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        critical_section::with(|cs| f(&mut self.shared.borrow_ref_mut(cs).buffer))
    }

    /// Read the framebuffer.
    pub fn read<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        critical_section::with(|cs| f(&self.shared.borrow_ref(cs).buffer))
    }

    /// Move the visible window `byte_offset` bytes into the buffer; see
    /// [`Driver::drive_at`].
    pub fn set_byte_offset(&self, byte_offset: usize) {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).byte_offset = byte_offset);
    }

    /// Current window offset in bytes
    #[must_use]
    pub fn byte_offset(&self) -> usize {
        critical_section::with(|cs| self.shared.borrow_ref(cs).byte_offset)
    }

    /// Change the blink rate, see [`RefreshState::with_blink_mask`].
    pub fn set_blink_mask(&self, blink_mask: u32) {
        critical_section::with(|cs| {
            self.shared.borrow_ref_mut(cs).state.set_blink_mask(blink_mask);
        });
    }

    /// Restart the blink phase, e.g. after new blinking content was drawn.
    pub fn reset(&self) {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).state.reset());
    }

    /// Snapshot of the refresh state
    #[must_use]
    pub fn state(&self) -> RefreshState {
        critical_section::with(|cs| self.shared.borrow_ref(cs).state)
    }

    /// The driver used by [`SharedDisplay::tick`]
    #[must_use]
    pub const fn driver(&self) -> &Driver<B> {
        &self.driver
    }
}

impl<B> core::fmt::Debug for SharedDisplay<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedDisplay")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::pins::{LineOp, RecordingPins};
    use crate::{Gray12x8, Mono12x8, Orientation, PixelBuffer, NUM_LINES};

    static DISPLAY: SharedDisplay<Mono12x8> =
        SharedDisplay::new(Driver::new(Orientation::Landscape), Mono12x8::new());

    #[test]
    fn test_static_display() {
        DISPLAY.update(|buffer| buffer.set_pixel(0, 0, 1));
        assert_eq!(DISPLAY.read(|buffer| buffer.get_pixel(0, 0)), 1);

        let mut pins = RecordingPins::<32>::new();
        let mut lit = 0;
        for _ in 0..NUM_LINES {
            pins.clear_ops();
            DISPLAY.tick(&mut pins);
            lit += pins.lit().filter(|&pair| pair == (7, 3)).count();
        }
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_tick_advances_state() {
        let display = SharedDisplay::new(Driver::new(Orientation::Landscape), Gray12x8::new());
        let mut pins = RecordingPins::<32>::new();
        display.tick(&mut pins);
        display.tick(&mut pins);
        assert_eq!(display.state().counter(), 2);

        display.set_blink_mask(0b100);
        assert_eq!(display.state().blink_mask(), 0b100);
        display.reset();
        assert_eq!(display.state().counter(), 0);
        assert_eq!(display.state().blink_mask(), 0b100);
    }

    #[test]
    fn test_byte_offset_scrolls() {
        type Wide = PixelBuffer<24, 8, 24>;
        let mut buffer = Wide::new();
        // pixel 8 of the first row is the first pixel of byte 1
        buffer.set_pixel(8, 0, 1);
        let display = SharedDisplay::new(Driver::new(Orientation::Landscape), buffer);
        display.set_byte_offset(1);
        assert_eq!(display.byte_offset(), 1);

        // with the window moved one byte it shows up at panel (0, 0)
        let mut pins = RecordingPins::<32>::new();
        for _ in 0..7 {
            pins.clear_ops();
            display.tick(&mut pins);
        }
        assert_eq!(
            pins.ops(),
            &[LineOp::ReleaseAll, LineOp::High(7), LineOp::Low(3)]
        );
    }

    #[test]
    fn test_update_from_another_thread() {
        let display = Arc::new(SharedDisplay::new(
            Driver::new(Orientation::Landscape),
            Mono12x8::new(),
        ));

        let writer = {
            let display = Arc::clone(&display);
            thread::spawn(move || {
                for x in 0..12 {
                    display.update(|buffer| buffer.set_pixel(x, 3, 1));
                }
            })
        };
        let mut pins = RecordingPins::<32>::new();
        for _ in 0..100 {
            pins.clear_ops();
            display.tick(&mut pins);
        }
        writer.join().unwrap();

        let row: u8 = (0..12).map(|x| display.read(|buffer| buffer.get_pixel(x, 3))).sum();
        assert_eq!(row, 12);
        assert_eq!(display.state().counter(), 100);
    }

    #[test]
    fn test_driver_accessor() {
        const DRIVER: Driver<Mono12x8> = Driver::with_offset(Orientation::Landscape, 8);
        let display = SharedDisplay::new(DRIVER, Mono12x8::new());
        assert_eq!(display.driver().scan_map(), DRIVER.scan_map());
        assert_ne!(
            display.driver().scan_map(),
            Driver::<Mono12x8>::new(Orientation::Landscape).scan_map()
        );
    }

    #[test]
    fn test_debug() {
        let display = SharedDisplay::new(Driver::new(Orientation::Landscape), Mono12x8::new());
        assert!(format!("{display:?}").starts_with("SharedDisplay { driver: Driver"));
    }
}
