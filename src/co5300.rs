// CO5300 AMOLED panel driver without a framebuffer (Standard SPI, no D/C pin).
//
// Protocol (Standard SPI):
//   Every write begins with [0x02, 0x00, CMD, 0x00], then N data bytes.
//   Example: [0x02, 0x00, 0x11, 0x00]       -> Sleep Out
//            [0x02, 0x00, 0x3A, 0x00, 0x55] -> Pixel Format = 16bpp (RGB565)
// Geometry: panel is 466 x 466 logical pixels, columns shifted by 6.
//
// Pixels go straight from the decoder to the panel: a window is programmed,
// then the pixel stream is packed big-endian into a bounce buffer and sent
// with RAMWR (first chunk) and RAMWRC (every following chunk).

use embedded_graphics::pixelcolor::raw::RawData;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::color::Color;
use crate::hal::PixelSink;

pub const CO5300_WIDTH: u16 = 466;
pub const CO5300_HEIGHT: u16 = 466;
const RAMWR_OPCODE: u8 = 0x2C;
const RAMWRC_OPCODE: u8 = 0x3C;

/// Bounce buffer size in bytes; two bytes per pixel.
pub const BOUNCE: usize = 4096;

/// Error type that wraps SPI and GPIO errors.
#[derive(Debug)]
pub enum Co5300Error<SpiE, GpioE> {
    Spi(SpiE),
    Gpio(GpioE),
    OutOfBounds,
}

/// A small CO5300 panel driver speaking the "0x02 + CMD + DATA" SPI framing.
/// No D/C pin is used; CS is handled by the `SpiDevice` implementation.
pub struct Co5300Display<SPI, RST> {
    spi: SPI,
    rst: Option<RST>,
    w: u16,
    h: u16,
    x_off: u16,
    y_off: u16,
    bounce: heapless::Vec<u8, BOUNCE>,
    // Next flush starts a new RAMWR burst.
    first: bool,
    // Current window has no pixels; writes are dropped.
    empty: bool,
}

impl<SPI, RST> Co5300Display<SPI, RST>
where
    // embedded-hal 1.0 `SpiDevice<u8>` so we can do atomic CS-asserted transfers.
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    /// Create + init the panel. Call once at startup.
    ///
    /// * `spi` - an SPI device with CS control (e.g., `embedded_hal_bus::spi::ExclusiveDevice`)
    /// * `rst` - optional reset pin (recommended to wire)
    /// * `delay` - any `DelayNs` impl (spin delay is fine)
    /// * `width`, `height` - normally 466x466 for this AMOLED
    pub fn new(
        spi: SPI,
        rst: Option<RST>,
        delay: &mut impl DelayNs,
        width: u16,
        height: u16,
    ) -> Result<Self, Co5300Error<SPI::Error, RST::Error>> {
        if width == 0 || height == 0 {
            return Err(Co5300Error::OutOfBounds);
        }

        let mut this = Self {
            spi,
            rst,
            w: width,
            h: height,
            x_off: 0x0006,
            y_off: 0x0000,
            bounce: heapless::Vec::new(),
            first: true,
            empty: true,
        };

        // Hard reset sequence
        if let Some(r) = this.rst.as_mut() {
            r.set_high().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(2);
            r.set_low().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(80);
            r.set_high().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(200);
        }

        // SW reset + settle
        this.cmd(0x01, &[])?;
        delay.delay_ms(150);

        // Sleep out + settle
        this.cmd(0x11, &[])?;
        delay.delay_ms(180);

        // Pixel format RGB565
        this.cmd(0x3A, &[0x55])?;
        delay.delay_ms(2);

        this.cmd(0xC4, &[0x80])?;
        this.cmd(0x13, &[])?; // NORMAL DISPLAY MODE

        // BCTRL
        this.cmd(0x53, &[0x20])?;
        delay.delay_ms(1);

        // vendor enable
        this.cmd(0x63, &[0xFF])?;
        delay.delay_ms(1);

        this.set_brightness(0x00)?;
        delay.delay_ms(1);

        // Display ON + longer settle before any RAMWR
        this.cmd(0x29, &[])?;
        delay.delay_ms(200);

        this.set_brightness(0xFF)?;

        // Memory access control (orientation)
        this.cmd(0x36, &[0x00])?;

        log::debug!("co5300 up, {}x{}", width, height);
        Ok(this)
    }

    // Panel width in pixels.
    #[inline]
    pub fn width(&self) -> u16 {
        self.w
    }

    // Panel height in pixels.
    #[inline]
    pub fn height(&self) -> u16 {
        self.h
    }

    pub fn size(&self) -> (u16, u16) {
        (self.w, self.h)
    }

    pub fn release(self) -> (SPI, Option<RST>) {
        (self.spi, self.rst)
    }

    // Raw window set, inclusive corners, still applies panel offsets.
    fn set_window_raw(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if x0 > x1 || y0 > y1 || x1 >= self.w || y1 >= self.h {
            return Err(Co5300Error::OutOfBounds);
        }

        let x0p = x0 + self.x_off;
        let x1p = x1 + self.x_off;
        let y0p = y0 + self.y_off;
        let y1p = y1 + self.y_off;

        let ca = [(x0p >> 8) as u8, (x0p & 0xFF) as u8, (x1p >> 8) as u8, (x1p & 0xFF) as u8];
        let ra = [(y0p >> 8) as u8, (y0p & 0xFF) as u8, (y1p >> 8) as u8, (y1p & 0xFF) as u8];

        self.cmd(0x2A, &ca)?;
        self.cmd(0x2B, &ra)?;
        Ok(())
    }

    // adjustable brightness (0-255)
    pub fn set_brightness(&mut self, bright: u8) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        self.cmd(0x51, &[bright])
    }

    // Quick blank/unblank without sleep
    pub fn display_off(&mut self) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        self.cmd(0x28, &[])
    }

    pub fn display_on(&mut self, delay: &mut impl DelayNs) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        self.cmd(0x29, &[])?;
        delay.delay_ms(10);
        Ok(())
    }

    // Send whatever is in the bounce buffer as one RAMWR/RAMWRC chunk.
    fn flush(&mut self) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if self.bounce.is_empty() {
            return Ok(());
        }
        let cmd = if self.first { RAMWR_OPCODE } else { RAMWRC_OPCODE };
        self.first = false;
        let hdr: [u8; 4] = [0x02, 0x00, cmd, 0x00];
        self.spi
            .transaction(&mut [Operation::Write(&hdr), Operation::Write(&self.bounce[..])])
            .map_err(Co5300Error::Spi)?;
        self.bounce.clear();
        Ok(())
    }

    #[inline]
    fn push(&mut self, color: Color) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if self.bounce.len() + 2 > BOUNCE {
            self.flush()?;
        }
        // Cannot fail: room for two bytes was made above.
        let _ = self.bounce.extend_from_slice(&color.into_inner().to_be_bytes());
        Ok(())
    }

    // ---- Low-level helpers ----

    fn cmd(&mut self, cmd: u8, data: &[u8]) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        let hdr: [u8; 4] = [0x02, 0x00, cmd, 0x00];
        if data.is_empty() {
            self.spi.write(&hdr).map_err(Co5300Error::Spi)
        } else {
            self.spi
                .transaction(&mut [Operation::Write(&hdr), Operation::Write(data)])
                .map_err(Co5300Error::Spi)
        }
    }
}

impl<SPI, RST> PixelSink for Co5300Display<SPI, RST>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    type Error = Co5300Error<SPI::Error, RST::Error>;

    fn set_draw_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        self.flush()?;
        self.first = true;
        self.empty = x0 >= x1 || y0 >= y1;
        if self.empty {
            return Ok(());
        }
        self.set_window_raw(x0, y0, x1 - 1, y1 - 1)
    }

    fn draw_pixel(&mut self, color: Color) -> Result<(), Self::Error> {
        if self.empty {
            return Ok(());
        }
        self.push(color)
    }

    fn fill_batch(&mut self, color: Color, count: u32) -> Result<(), Self::Error> {
        if self.empty {
            return Ok(());
        }
        let be = color.into_inner().to_be_bytes();
        let mut left = count as usize;
        while left > 0 {
            if self.bounce.len() + 2 > BOUNCE {
                self.flush()?;
            }
            let room = (BOUNCE - self.bounce.len()) / 2;
            for _ in 0..room.min(left) {
                let _ = self.bounce.extend_from_slice(&be);
            }
            left -= room.min(left);
        }
        Ok(())
    }

    fn fill_array(&mut self, colors: &[Color]) -> Result<(), Self::Error> {
        if self.empty {
            return Ok(());
        }
        for &c in colors {
            self.push(c)?;
        }
        Ok(())
    }

    fn end_draw(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }
}

// Convenience builder for the 466x466 panel with a full-screen window set.
pub fn new_with_defaults<SPI, RST>(
    spi: SPI,
    rst: Option<RST>,
    delay: &mut impl DelayNs,
) -> Result<Co5300Display<SPI, RST>, Co5300Error<SPI::Error, RST::Error>>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    let mut display = Co5300Display::new(spi, rst, delay, CO5300_WIDTH, CO5300_HEIGHT)?;
    display.set_window_raw(0, 0, CO5300_WIDTH - 1, CO5300_HEIGHT - 1)?;
    Ok(display)
}
