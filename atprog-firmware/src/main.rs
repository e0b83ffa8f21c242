//! atprog - Parallel EEPROM Programmer Firmware
//!
//! Programs AT28C64 / AT28C256 EEPROMs from an RP2040 board, driven by a
//! single-key serial console.
//!
//! Board wiring:
//! - GPIO0 / GPIO1: UART0 TX / RX (console)
//! - GPIO16 / GPIO17: I2C0 SDA / SCL to the MCP23017
//! - MCP23017 port A: EEPROM I/O0-I/O7
//! - MCP23017 port B: EEPROM A0-A7
//! - GPIO2: WE, GPIO3: OE, GPIO4: CE (all active low)
//! - GPIO5-GPIO11: A8-A14 (A13 and A14 only on the AT28C256)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Blocking, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use atprog_core::{At28c, PollLimit, ProgrammerConfig};
use atprog_drivers::{ControlPins, Mcp23017, ParallelBus};

use crate::console::Console;

mod console;
mod rom;

/// Constants generated by build.rs from programmer.toml
mod board {
    use atprog_core::ChipFamily;

    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART buffers must live forever. The RX side holds HEX lines that
// arrive while a byte is being programmed.
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Bus driver as wired on the board
pub type Bus = ParallelBus<I2c<'static, I2C0, Blocking>, Output<'static>>;

/// Programming engine as wired on the board
pub type Programmer = At28c<Bus, Delay>;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("atprog firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Console UART
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = board::BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let mut console = Console::new(tx, rx);

    info!("UART initialized at {} baud", board::BAUD);

    // MCP23017 on I2C0
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = board::I2C_FREQUENCY;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);

    // Control strobes idle high (inactive)
    let control = ControlPins {
        chip_enable: Output::new(p.PIN_4, Level::High),
        write_enable: Output::new(p.PIN_2, Level::High),
        output_enable: Output::new(p.PIN_3, Level::High),
    };

    let chip = board::CHIP.config();
    let address_pins = [
        Output::new(p.PIN_5, Level::Low),
        Output::new(p.PIN_6, Level::Low),
        Output::new(p.PIN_7, Level::Low),
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_9, Level::Low),
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
    ];
    let mut high_address = Vec::new();
    for pin in address_pins
        .into_iter()
        .take(chip.high_address_bits() as usize)
    {
        // Seven pins at most, the vector holds seven
        let _ = high_address.push(pin);
    }

    let poll_limit = match board::POLL_LIMIT {
        0 => PollLimit::Unbounded,
        n => PollLimit::Attempts(n),
    };
    let mut config = ProgrammerConfig::new(chip).with_poll_limit(poll_limit);
    config.expander_address = board::EXPANDER_ADDRESS;

    let expander = Mcp23017::new(i2c, config.expander_address);
    let bus = ParallelBus::new(expander, control, high_address);
    let mut programmer = At28c::new(bus, Delay, config);

    console.banner(&chip);

    if let Err(e) = programmer.init() {
        error!("Programmer init failed: {}", Debug2Format(&e));
        console.print("Error: MCP23017 initialization failed!\n");

        loop {
            Timer::after_secs(60).await;
        }
    }

    info!("{} ready, {} bytes", chip.name, chip.size);

    spawner
        .spawn(console::console_task(console, programmer))
        .unwrap();

    info!("Console task spawned, firmware running");
}
