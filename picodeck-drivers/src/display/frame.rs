//! RGB565 frame buffer
//!
//! The buffer is borrowed from the caller (usually a `static`) so that the
//! 150 KiB of pixel data is never moved or reallocated. Pixels are stored
//! row-major, two bytes each, big-endian: the layout the panel expects after
//! RAMWR, so the whole buffer goes out as a single write.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::{HEIGHT, WIDTH};

/// Bytes per pixel (RGB565)
pub const BYTES_PER_PIXEL: usize = 2;

/// Frame buffer construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Backing slice is not exactly one panel of pixels
    Length { expected: usize, actual: usize },
}

/// Full-panel frame buffer over caller-owned memory
pub struct Frame<'a> {
    buf: &'a mut [u8],
}

impl<'a> Frame<'a> {
    /// Size of the backing slice in bytes
    pub const BYTES: usize = WIDTH as usize * HEIGHT as usize * BYTES_PER_PIXEL;

    /// Wrap a buffer of exactly [`Frame::BYTES`] bytes
    pub fn new(buf: &'a mut [u8]) -> Result<Self, FrameError> {
        if buf.len() != Self::BYTES {
            return Err(FrameError::Length {
                expected: Self::BYTES,
                actual: buf.len(),
            });
        }
        Ok(Self { buf })
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: Rgb565) {
        let bytes = raw(color).to_be_bytes();
        for px in self.buf.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Set one pixel; coordinates outside the panel are ignored
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) {
        if let Some(i) = offset(x, y) {
            self.buf[i..i + BYTES_PER_PIXEL].copy_from_slice(&raw(color).to_be_bytes());
        }
    }

    /// Read one pixel back, `None` outside the panel
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        let i = offset(x, y)?;
        let value = u16::from_be_bytes([self.buf[i], self.buf[i + 1]]);
        Some(RawU16::new(value).into())
    }

    /// Raw panel bytes, ready for RAMWR
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Give the backing slice back
    pub fn release(self) -> &'a mut [u8] {
        self.buf
    }
}

fn raw(color: Rgb565) -> u16 {
    RawU16::from(color).into_inner()
}

fn offset(x: u16, y: u16) -> Option<usize> {
    if x >= WIDTH || y >= HEIGHT {
        return None;
    }
    Some((y as usize * WIDTH as usize + x as usize) * BYTES_PER_PIXEL)
}

impl OriginDimensions for Frame<'_> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Frame<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Negative coordinates fail the conversion and are clipped
            if let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Frame::clear(self, color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use std::vec;

    #[test]
    fn test_length_checked() {
        let mut short = vec![0u8; Frame::BYTES - 1];
        assert_eq!(
            Frame::new(&mut short).err(),
            Some(FrameError::Length {
                expected: 153_600,
                actual: 153_599
            })
        );

        let mut exact = vec![0u8; Frame::BYTES];
        assert!(Frame::new(&mut exact).is_ok());
    }

    #[test]
    fn test_clear_big_endian() {
        let mut buf = vec![0u8; Frame::BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();

        frame.clear(Rgb565::RED);
        assert_eq!(&frame.as_bytes()[..4], &[0xF8, 0x00, 0xF8, 0x00]);
        assert!(frame.as_bytes().chunks(2).all(|px| px == [0xF8, 0x00]));
    }

    #[test]
    fn test_set_pixel_row_major() {
        let mut buf = vec![0u8; Frame::BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();

        frame.set_pixel(1, 2, Rgb565::BLUE);
        let i = (2 * 320 + 1) * 2;
        assert_eq!(&frame.as_bytes()[i..i + 2], &[0x00, 0x1F]);
        assert_eq!(frame.pixel(1, 2), Some(Rgb565::BLUE));
        assert_eq!(frame.pixel(0, 0), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut buf = vec![0u8; Frame::BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();

        frame.set_pixel(320, 0, Rgb565::WHITE);
        frame.set_pixel(0, 240, Rgb565::WHITE);
        assert_eq!(frame.pixel(320, 0), None);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_clips() {
        let mut buf = vec![0u8; Frame::BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();

        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.pixel(0, 0), Some(Rgb565::GREEN));
        assert_eq!(frame.pixel(1, 1), Some(Rgb565::GREEN));
        assert_eq!(frame.pixel(2, 2), Some(Rgb565::BLACK));

        Rectangle::new(Point::new(318, 238), Size::new(5, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(&mut frame)
            .unwrap();
        assert_eq!(frame.pixel(319, 239), Some(Rgb565::GREEN));
    }

    #[test]
    fn test_dimensions() {
        let mut buf = vec![0u8; Frame::BYTES];
        let frame = Frame::new(&mut buf).unwrap();
        assert_eq!(frame.size(), Size::new(320, 240));
    }
}
