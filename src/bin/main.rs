//! Streaming graphics demo
//! ========================================
//! source ~/export-esp.sh
//! cargo run --release --features esp32s3-disp143Oled
//! ========================================
//!
//! Shows an uptime clock that only redraws the digits that changed, and a
//! progress bar that steps forward on every button press.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

#[cfg(not(any(feature = "esp32s3-disp143Oled", feature = "devkit-esp32s3-disp128")))]
compile_error!("pick a display feature: esp32s3-disp143Oled or devkit-esp32s3-disp128");

// Application description placed in a special section of the binary,
// checked by the bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

use core::cell::{Cell, RefCell};
use core::fmt::Write as _;
use critical_section::Mutex;
use esp_backtrace as _;

use esp_hal::{
    delay::Delay,
    gpio::Input,
    handler, main, ram,
    timer::systimer::{SystemTimer, Unit},
    Config,
};

use embedded_graphics::pixelcolor::raw::RawU16;
use heapless::String;

use streamgfx::{
    codec::{OP_RGB565, OP_RUN},
    display::{setup_display, SCREEN_H, SCREEN_W},
    fill_progress_bar, fill_rect, fill_text_center,
    font::{AsciiIndex, Compression},
    wiring::{init_board_pins, BoardPins},
    Direction, Fill, Font, Image, Style, CAPABILITIES,
};

#[cfg(feature = "devkit-esp32s3-disp128")]
#[ram]
static mut DISPLAY_BUF: [u8; 1024] = [0; 1024];

// Button shared with the interrupt handler
static BUTTON: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));
static BUTTON_LAST_LEVEL: Mutex<Cell<bool>> = Mutex::new(Cell::new(true));
static BUTTON_LAST_MS: Mutex<Cell<u64>> = Mutex::new(Cell::new(0));
static PRESSES: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

// Current debounce time (milliseconds)
const DEBOUNCE_MS: u64 = 240;

// -------------------- Assets --------------------

const BAR_W: u16 = 200;
const BAR_H: u16 = 16;
const BAR_STEP: u16 = 20;
// One raw pixel, then enough maximal runs to cover the rest of the bar.
const BAR_BYTES: usize = 3 + (BAR_W as usize * BAR_H as usize - 1).div_ceil(62);

// Solid-color image stream: the decoder stops at the pixel budget.
const fn solid_bar(word: u16) -> [u8; BAR_BYTES] {
    let mut out = [OP_RUN | 61; BAR_BYTES];
    let be = word.to_be_bytes();
    out[0] = OP_RGB565;
    out[1] = be[0];
    out[2] = be[1];
    out
}

static BAR_FULL_DATA: [u8; BAR_BYTES] = solid_bar(0x07E0);
static BAR_EMPTY_DATA: [u8; BAR_BYTES] = solid_bar(0x2104);
static BAR_FULL: Image<'static> = Image::new(&BAR_FULL_DATA, BAR_W, BAR_H);
static BAR_EMPTY: Image<'static> = Image::new(&BAR_EMPTY_DATA, BAR_W, BAR_H);

// 8x8 glyphs for '0'..=':', one byte per row, MSB left.
#[rustfmt::skip]
static CLOCK_GLYPHS: [u8; 88] = [
    0x3C, 0x66, 0x6E, 0x76, 0x66, 0x66, 0x3C, 0x00, // 0
    0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00, // 1
    0x3C, 0x66, 0x06, 0x0C, 0x30, 0x60, 0x7E, 0x00, // 2
    0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00, // 3
    0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x00, // 4
    0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00, // 5
    0x3C, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x3C, 0x00, // 6
    0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00, // 7
    0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00, // 8
    0x3C, 0x66, 0x66, 0x3E, 0x06, 0x0C, 0x38, 0x00, // 9
    0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x00, 0x00, // :
];

static CLOCK_FONT: Font<'static> = Font {
    ascii: AsciiIndex::Packed { base: b'0', count: 11 },
    wide: &[],
    pool: &CLOCK_GLYPHS,
    width: 8,
    height: 8,
    compression: Compression::Monochrome,
};

// Interrupt handler
#[handler]
#[ram]
fn handler() {
    let now_ms = {
        let t = SystemTimer::unit_value(Unit::Unit0);
        t.saturating_mul(1000) / SystemTimer::ticks_per_second()
    };

    critical_section::with(|cs| {
        let mut binding = BUTTON.borrow_ref_mut(cs);
        let Some(input) = binding.as_mut() else { return };

        if !input.is_interrupt_set() {
            return;
        }
        input.clear_interrupt();

        // Falling edge, debounced
        let level_is_low = input.is_low();
        let last_high = BUTTON_LAST_LEVEL.borrow(cs).get();
        BUTTON_LAST_LEVEL.borrow(cs).set(!level_is_low);

        if last_high && level_is_low {
            let last = BUTTON_LAST_MS.borrow(cs).get();
            if now_ms.saturating_sub(last) > DEBOUNCE_MS {
                BUTTON_LAST_MS.borrow(cs).set(now_ms);
                let presses = PRESSES.borrow(cs);
                presses.set(presses.get().wrapping_add(1));
            }
        }
    });
}

fn uptime_secs() -> u32 {
    (SystemTimer::unit_value(Unit::Unit0) / SystemTimer::ticks_per_second()) as u32
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);
    log::info!("capabilities: {:?}", CAPABILITIES);

    let peripherals = esp_hal::init(Config::default());
    let (mut io, pins) = init_board_pins(peripherals);
    let BoardPins { btn1, display_pins } = pins;

    critical_section::with(|cs| {
        BUTTON.borrow_ref_mut(cs).replace(btn1);
        BUTTON_LAST_LEVEL.borrow(cs).set(true);
    });
    io.set_interrupt_handler(handler);

    let mut display = {
        #[cfg(feature = "devkit-esp32s3-disp128")]
        {
            // Safe because DISPLAY_BUF is only used here
            unsafe { setup_display(display_pins, &mut *core::ptr::addr_of_mut!(DISPLAY_BUF)) }
        }

        #[cfg(feature = "esp32s3-disp143Oled")]
        {
            setup_display(display_pins)
        }
    };

    let style = Style::new(RawU16::new(0xFFFF), RawU16::new(0x0000));
    let text_w = SCREEN_W / 2;
    let text_x = (SCREEN_W - text_w) / 2;
    let text_y = SCREEN_H / 2 - 24;
    let bar_x = (SCREEN_W - BAR_W) / 2;
    let bar_y = SCREEN_H / 2 + 8;

    if let Err(e) = fill_rect(&mut display, 0, 0, SCREEN_W, SCREEN_H, style.background) {
        log::warn!("clear failed: {:?}", e);
    }
    if let Err(e) = BAR_EMPTY.draw(&mut display, &style, bar_x, bar_y) {
        log::warn!("bar draw failed: {:?}", e);
    }

    let delay = Delay::new();
    let mut last_text: String<12> = String::new();
    let mut last_value: u16 = 0;

    loop {
        let secs = uptime_secs();
        let mut text: String<12> = String::new();
        let _ = write!(text, "{:02}:{:02}:{:02}", secs / 3600 % 100, secs / 60 % 60, secs % 60);

        if text != last_text {
            match fill_text_center(
                &mut display,
                &style,
                &CLOCK_FONT,
                text_x,
                text_y,
                text_w,
                text.as_bytes(),
                last_text.as_bytes(),
                Fill::Solid(style.background),
            ) {
                Ok(()) => last_text = text,
                Err(e) => log::warn!("clock draw failed: {:?}", e),
            }
        }

        let presses = critical_section::with(|cs| PRESSES.borrow(cs).get());
        let value = (presses % u32::from(BAR_W / BAR_STEP + 1)) as u16 * BAR_STEP;
        if value != last_value {
            log::info!("progress {} -> {}", last_value, value);
            match fill_progress_bar(
                &mut display,
                &style,
                bar_x,
                bar_y,
                value,
                last_value,
                &BAR_FULL,
                &BAR_EMPTY,
                Direction::Right,
            ) {
                Ok(()) => last_value = value,
                Err(e) => log::warn!("progress draw failed: {:?}", e),
            }
        }

        delay.delay_millis(50);
    }
}
