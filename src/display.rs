//! Panel bring-up for the supported boards.
//
// - `setup_display` picks the right backend based on features and returns a
//   `PixelSink` the renderers can draw into directly.
// - GC9A01 path uses mipidsi (240x240, D/C) behind the DrawTarget adapter.
// - CO5300 path uses the framebuffer-less driver (466x466, no D/C, 0x02 framing).

use esp_backtrace as _;

use esp_hal::{gpio::Output, spi::master::Config, spi::Mode, time::Rate, Blocking};

use embedded_hal::delay::DelayNs;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use crate::wiring::DisplayPins;

// Busy-wait delay for panel init; `delay_us`/`delay_ms` come from the trait.
struct SpinDelay;

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        for _ in 0..=ns / 50 {
            core::hint::spin_loop();
        }
    }
}

// ==================================================================
// GC9A01 (240x240) backend, feature: devkit-esp32s3-disp128
// ==================================================================
#[cfg(feature = "devkit-esp32s3-disp128")]
mod gc9a01_backend {
    use super::*;
    use crate::target::DrawTargetSink;
    use esp_hal::spi::master::Spi;
    use mipidsi::interface::SpiInterface;
    use mipidsi::{
        models::GC9A01,
        options::{ColorInversion, ColorOrder, Orientation, Rotation},
        Builder as DisplayBuilder,
    };

    pub const SCREEN_W: u16 = 240;
    pub const SCREEN_H: u16 = 240;

    pub type DisplayType<'a> = DrawTargetSink<
        mipidsi::Display<
            SpiInterface<'a, ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>,
            GC9A01,
            Output<'a>,
        >,
    >;

    pub fn setup_display<'a>(display_pins: DisplayPins<'a>, display_buf: &'a mut [u8]) -> DisplayType<'a> {
        let DisplayPins {
            spi2,
            spi_sck,
            spi_mosi,
            lcd_cs,
            lcd_dc,
            mut lcd_rst,
            mut lcd_bl,
        } = display_pins;

        let mut delay = SpinDelay;
        lcd_rst.set_low();
        delay.delay_us(100);
        lcd_rst.set_high();
        lcd_bl.set_high();

        // SPI @ 40 MHz, Mode 0
        let spi_cfg = Config::default()
            .with_frequency(Rate::from_hz(40_000_000))
            .with_mode(Mode::_0);

        let spi = Spi::new(spi2, spi_cfg)
            .expect("SPI2 config rejected")
            .with_sck(spi_sck)
            .with_mosi(spi_mosi);

        // SPI device + display interface (needs D/C and a buffer)
        let spi_dev = ExclusiveDevice::new(spi, lcd_cs, NoDelay).expect("CS pin setup failed");
        let di = SpiInterface::new(spi_dev, lcd_dc, display_buf);

        let panel = DisplayBuilder::new(GC9A01, di)
            .display_size(SCREEN_W, SCREEN_H)
            .display_offset(0, 0)
            .orientation(Orientation::new().rotate(Rotation::Deg180))
            .invert_colors(ColorInversion::Inverted)
            .color_order(ColorOrder::Bgr)
            .reset_pin(lcd_rst)
            .init(&mut delay)
            .expect("GC9A01 init failed");

        log::info!("gc9a01 up, {}x{}", SCREEN_W, SCREEN_H);
        DrawTargetSink::new(panel)
    }
}

// ==================================================================
// CO5300 (466x466) backend, feature: esp32s3-disp143Oled
// ==================================================================
#[cfg(feature = "esp32s3-disp143Oled")]
mod co5300_backend {
    use super::*;
    use crate::co5300::{self, Co5300Display, CO5300_HEIGHT, CO5300_WIDTH};
    use esp_hal::dma::{DmaRxBuf, DmaTxBuf};
    use esp_hal::dma_buffers;
    use esp_hal::spi::master::{Spi, SpiDmaBus};

    pub const SCREEN_W: u16 = CO5300_WIDTH;
    pub const SCREEN_H: u16 = CO5300_HEIGHT;

    pub type DisplayType<'a> =
        Co5300Display<ExclusiveDevice<SpiDmaBus<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>;

    pub fn setup_display<'a>(display_pins: DisplayPins<'a>) -> DisplayType<'a> {
        let DisplayPins {
            spi2,
            cs,
            clk,
            do0,
            rst,
            mut en,
            dma_ch0,
        } = display_pins;

        let mut delay = SpinDelay;

        // quick toggle EN pin
        en.set_low();
        delay.delay_ms(10);
        en.set_high();
        delay.delay_ms(100); // give panel power rails time to stabilise

        // SPI @ 60 MHz, Mode 0
        let spi = Spi::new(
            spi2,
            Config::default()
                .with_frequency(Rate::from_hz(60_000_000))
                .with_mode(Mode::_0),
        )
        .expect("SPI2 config rejected")
        .with_sck(clk)
        .with_mosi(do0)
        .with_dma(dma_ch0);

        let (rx_buf, rx_desc, tx_buf, tx_desc) = dma_buffers!(4096, co5300::BOUNCE);
        let rx = DmaRxBuf::new(rx_desc, rx_buf).expect("DMA rx buffer");
        let tx = DmaTxBuf::new(tx_desc, tx_buf).expect("DMA tx buffer");

        let spi_bus: SpiDmaBus<'_, Blocking> = spi.with_buffers(rx, tx);
        let spi_dev = ExclusiveDevice::new(spi_bus, cs, NoDelay).expect("CS pin setup failed");

        co5300::new_with_defaults(spi_dev, Some(rst), &mut delay).expect("CO5300 init failed")
    }
}

#[cfg(feature = "devkit-esp32s3-disp128")]
pub use gc9a01_backend::{setup_display, DisplayType, SCREEN_H, SCREEN_W};

#[cfg(feature = "esp32s3-disp143Oled")]
pub use co5300_backend::{setup_display, DisplayType, SCREEN_H, SCREEN_W};
