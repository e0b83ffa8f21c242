//! Serial console task
//!
//! Reads single-key commands from UART0 and runs them against the
//! programmer. Operations are blocking; the console only awaits while
//! waiting for input.

use core::fmt::{self, Write};

use defmt::{debug, error, info, trace, warn, Debug2Format};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use embedded_io_async::Read;

use atprog_core::console::{
    Command, DumpRow, ExecutionTime, HexInput, HexKey, Key, PageKey, Pager, DUMP_PAGE_PROMPT, HELP,
    PROMPT, UNKNOWN_COMMAND,
};
use atprog_core::diagnostics::{check_image, run_full_test, write_image};
use atprog_core::{ChipConfig, ProgramError, Report, Reporter};
use atprog_protocol::{Feed, HexParser, StreamEnd};

use crate::rom::ROM;
use crate::{Bus, Programmer};

type CommandResult = Result<(), ProgramError<<Bus as atprog_core::EepromBus>::Error>>;

/// How long input must stay quiet before it counts as drained
const DRAIN_QUIET: Duration = Duration::from_millis(10);

/// Console UART halves
pub struct Console {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl Console {
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx) -> Self {
        Self { tx, rx }
    }

    /// Print text, dropping it if the UART fails
    pub fn print(&mut self, s: &str) {
        if self.write_str(s).is_err() {
            warn!("Console write failed");
        }
    }

    /// Startup banner
    pub fn banner(&mut self, chip: &ChipConfig) {
        let _ = write!(
            self,
            "\n======================\n\
             EEPROM Programmer v0.1\n\
             ======================\n\
             \nSelected chip: {}\n\
             Memory size:   {}\n",
            chip.name, chip.size
        );
    }

    /// Wait for the next received byte
    async fn read_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        loop {
            match self.rx.read(&mut buf).await {
                Ok(1) => return buf[0],
                Ok(_) => {}
                Err(e) => warn!("UART read error: {:?}", e),
            }
        }
    }

    /// Discard input until the line goes quiet
    async fn drain(&mut self) {
        let mut buf = [0u8; 16];
        while let Ok(Ok(n)) = with_timeout(DRAIN_QUIET, self.rx.read(&mut buf)).await {
            if n == 0 {
                break;
            }
        }
    }

    /// Prompted hex entry of up to `N` digits
    async fn read_hex<const N: usize>(&mut self, default: u32) -> u32 {
        self.drain().await;

        let mut input = HexInput::<N>::new();
        loop {
            match input.push(self.read_byte().await) {
                HexKey::Echo(c) => {
                    let _ = self.write_char(c as char);
                }
                HexKey::Ignored => {}
                HexKey::Done => break,
            }
        }

        self.drain().await;
        input.value_or(default)
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        embedded_io::Write::write_all(&mut self.tx, s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl Reporter for Console {
    fn report(&mut self, report: Report) {
        if let Report::VerifyFailed { address, .. } = report {
            debug!("Reporting mismatch at {=u16:#x}", address);
        }
        let _ = write!(self, "{}", report);
    }
}

/// Console task: owns the UART and the programmer for the firmware's lifetime
#[embassy_executor::task]
pub async fn console_task(mut console: Console, mut programmer: Programmer) {
    info!("Console task started");
    console.print(HELP);

    loop {
        let c = console.read_byte().await;

        let command = match Key::classify(c) {
            Key::LineEnd => {
                console.print(PROMPT);
                Timer::after_millis(100).await;
                console.drain().await;
                continue;
            }
            Key::Unknown(c) => {
                trace!("Unknown key {=u8:#x}", c);
                console.print(UNKNOWN_COMMAND);
                continue;
            }
            Key::Command(command) => command,
        };

        info!("Command {}", command);
        let _ = console.write_char(command.key());

        let result = match command {
            Command::Erase => erase(&mut console, &mut programmer).await,
            Command::Check => check(&mut console, &mut programmer),
            Command::Dump => dump(&mut console, &mut programmer).await,
            Command::WriteHex => write_hex(&mut console, &mut programmer).await,
            Command::WriteRom => write_rom(&mut console, &mut programmer),
            Command::Test => test(&mut console, &mut programmer),
            Command::EnableProtect => write_protect(&mut console, &mut programmer, true),
            Command::DisableProtect => write_protect(&mut console, &mut programmer, false),
            Command::Help => Ok(()),
        };

        if let Err(e) = result {
            error!("Command {} failed: {}", command, Debug2Format(&e));
            let _ = write!(console, "\nError: {}\n", e);
        }

        console.print(HELP);
    }
}

/// Fill a prompted range with a prompted pattern
async fn erase(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    let size = programmer.chip().size;

    console.print("\nStart: ");
    let start = console.read_hex::<4>(0).await % size;
    console.print("\nEnd: ");
    let end = console.read_hex::<4>(0).await % size;
    console.print("\nPattern: ");
    let pattern = console.read_hex::<2>(0xFF).await as u8;
    console.print("\n");

    // End 0 means the whole chip
    let end = if end == 0 { size } else { end };

    let started = Instant::now();
    programmer.erase_section(start as u16, end as u16, pattern, &mut *console)?;
    print_execution_time(console, started);
    Ok(())
}

/// Compare the chip against the built-in ROM image
fn check(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    check_image(programmer, ROM, console)?;
    Ok(())
}

/// Hex dump from a prompted address, paged every ten rows
async fn dump(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    let size = programmer.chip().size;

    console.print("\nAddr: ");
    let mut address = console.read_hex::<4>(0).await % size;

    let mut pager = Pager::new();
    while address < size {
        console.print("\n");

        if pager.next_row() {
            console.print(DUMP_PAGE_PROMPT);
            loop {
                match PageKey::classify(console.read_byte().await) {
                    PageKey::Quit => {
                        console.print("\n");
                        return Ok(());
                    }
                    PageKey::Continue => {
                        console.print("\n");
                        pager.new_page();
                        console.drain().await;
                        break;
                    }
                    PageKey::Other => {}
                }
            }
        }

        let row = DumpRow::read(programmer, address as u16)?;
        let _ = write!(console, "{}", row);
        address = row.next_address();
    }

    Ok(())
}

/// Program Intel HEX typed or pasted on the console
async fn write_hex(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    console.print("\n");
    Timer::after_millis(200).await;
    console.drain().await;

    console.print("Enter Intel HEX data (finish with empty line):\n");
    let mut parser: HexParser = HexParser::new();
    let started = Instant::now();

    loop {
        let c = console.read_byte().await;
        match parser.feed_char(c, programmer) {
            Feed::Continue => {}
            Feed::LineOk(line) => {
                let _ = writeln!(
                    console,
                    "Line - Type: 0, Address: {:X}h, Byte count: {}",
                    line.address, line.byte_count
                );
            }
            Feed::LineError(e) => {
                warn!("HEX line failed: {}", Debug2Format(&e));
                let _ = writeln!(console, "Error: {}", e);
            }
            Feed::StreamEnd(end) => {
                if end == StreamEnd::EndOfFile {
                    // Swallow the line ending that follows the EOF record
                    console.drain().await;
                }
                console.print("\nHex input complete.\n");
                break;
            }
        }
    }

    print_execution_time(console, started);
    Ok(())
}

/// Erase, write and verify the built-in ROM image
fn write_rom(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    console.print("\n");
    let started = Instant::now();
    write_image(programmer, ROM, console)?;
    print_execution_time(console, started);
    Ok(())
}

/// Destructive full-chip pattern test
fn test(console: &mut Console, programmer: &mut Programmer) -> CommandResult {
    let started = Instant::now();
    let summary = run_full_test(programmer, console)?;
    info!("Full test: {} errors", summary.errors);
    print_execution_time(console, started);
    Ok(())
}

fn write_protect(console: &mut Console, programmer: &mut Programmer, enable: bool) -> CommandResult {
    console.print("\nWrite protection: ");
    console.print(if enable { "enable...\n" } else { "disable...\n" });

    if !programmer.chip().supports_write_protect() {
        let _ = writeln!(console, "{} has no write protection", programmer.chip().name);
    }
    programmer.set_write_protect(enable)?;

    console.print("Done.\n");
    Ok(())
}

fn print_execution_time(console: &mut Console, started: Instant) {
    let elapsed = ExecutionTime::from_millis(started.elapsed().as_millis());
    let _ = write!(console, "{}", elapsed);
}
