// Board-specific pin mappings, selected via Cargo features.
//
// esp32s3-disp143Oled (Waveshare ESP32-S3 Touch AMOLED 1.43", CO5300):
//   CS  = GPIO9, SCK = GPIO10, IO0/MOSI = GPIO11, RST = GPIO21, EN = GPIO42
//   BOOT button = GPIO0
// devkit-esp32s3-disp128 (ESP32-S3 devkit + GC9A01 240x240 module):
//   CS = GPIO9, DC = GPIO8, RST = GPIO14, BL = GPIO2, SCK = GPIO10, MOSI = GPIO11
//   Button = GPIO15
// Buttons are wired to GND when pressed (internal pull-up).

use esp_hal::gpio::{Event, Input, InputConfig, Io, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::Peripherals;
#[cfg(any(feature = "esp32s3-disp143Oled", feature = "devkit-esp32s3-disp128"))]
use esp_hal::peripherals::{GPIO10, GPIO11, SPI2};
#[cfg(feature = "esp32s3-disp143Oled")]
use esp_hal::peripherals::DMA_CH0;

#[cfg(feature = "esp32s3-disp143Oled")]
pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub cs: Output<'a>,
    pub clk: GPIO10<'a>,
    pub do0: GPIO11<'a>,
    pub rst: Output<'a>,
    pub en: Output<'a>,
    pub dma_ch0: DMA_CH0<'a>,
}

#[cfg(feature = "devkit-esp32s3-disp128")]
pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub spi_sck: GPIO10<'a>,
    pub spi_mosi: GPIO11<'a>,
    pub lcd_cs: Output<'a>,
    pub lcd_dc: Output<'a>,
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

pub struct BoardPins<'a> {
    pub btn1: Input<'a>,
    #[cfg(any(feature = "esp32s3-disp143Oled", feature = "devkit-esp32s3-disp128"))]
    pub display_pins: DisplayPins<'a>,
}

#[cfg(feature = "esp32s3-disp143Oled")]
pub fn init_board_pins<'a>(p: Peripherals) -> (Io<'a>, BoardPins<'a>) {
    let io = Io::new(p.IO_MUX);

    let mut btn1 = Input::new(p.GPIO0, InputConfig::default().with_pull(Pull::Up));
    btn1.listen(Event::AnyEdge);

    // Panel held in reset and powered down until display setup runs
    let display_pins = DisplayPins {
        spi2: p.SPI2,
        cs: Output::new(p.GPIO9, Level::High, OutputConfig::default()),
        clk: p.GPIO10,
        do0: p.GPIO11,
        rst: Output::new(p.GPIO21, Level::Low, OutputConfig::default()),
        en: Output::new(p.GPIO42, Level::Low, OutputConfig::default()),
        dma_ch0: p.DMA_CH0,
    };

    (io, BoardPins { btn1, display_pins })
}

#[cfg(feature = "devkit-esp32s3-disp128")]
pub fn init_board_pins<'a>(p: Peripherals) -> (Io<'a>, BoardPins<'a>) {
    let io = Io::new(p.IO_MUX);

    let mut btn1 = Input::new(p.GPIO15, InputConfig::default().with_pull(Pull::Up));
    btn1.listen(Event::AnyEdge);

    // LCD control pins; GPIO10/11 stay raw for the SPI peripheral
    let display_pins = DisplayPins {
        spi2: p.SPI2,
        spi_sck: p.GPIO10,
        spi_mosi: p.GPIO11,
        lcd_cs: Output::new(p.GPIO9, Level::High, OutputConfig::default()),
        lcd_dc: Output::new(p.GPIO8, Level::Low, OutputConfig::default()),
        lcd_rst: Output::new(p.GPIO14, Level::High, OutputConfig::default()),
        lcd_bl: Output::new(p.GPIO2, Level::High, OutputConfig::default()),
    };

    (io, BoardPins { btn1, display_pins })
}
