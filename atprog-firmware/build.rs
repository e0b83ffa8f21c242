//! Build script for atprog-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates programmer.toml and generates board constants from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_board_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgrammerToml {
    chip: String,
    #[serde(default)]
    expander: ExpanderToml,
    #[serde(default)]
    programming: ProgrammingToml,
    #[serde(default)]
    console: ConsoleToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ExpanderToml {
    address: i64,
    frequency: i64,
}

impl Default for ExpanderToml {
    fn default() -> Self {
        Self {
            address: 0x20,
            frequency: 400_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ProgrammingToml {
    poll_limit: i64,
}

impl Default for ProgrammingToml {
    fn default() -> Self {
        Self { poll_limit: 50_000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ConsoleToml {
    baud: i64,
}

impl Default for ConsoleToml {
    fn default() -> Self {
        Self { baud: 115_200 }
    }
}

/// Validate programmer.toml at compile time
fn validate_config() -> ProgrammerToml {
    println!("cargo:rerun-if-changed=programmer.toml");

    let config_path = Path::new("programmer.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: programmer.toml not found!                               ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a programmer.toml configuration file.     ║\n\
            ║  Please create one in the atprog-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read programmer.toml                           ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: ProgrammerToml = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid programmer.toml                                  ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_values(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid programmer configuration                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=programmer.toml validated successfully");
    config
}

/// Range checks the schema cannot express
fn check_values(config: &ProgrammerToml) -> Vec<String> {
    let mut errors = Vec::new();

    if chip_variant(&config.chip).is_none() {
        errors.push(format!(
            "chip '{}' must be 'AT28C64' or 'AT28C256'",
            config.chip
        ));
    }

    if !(0x20..=0x27).contains(&config.expander.address) {
        errors.push(format!(
            "[expander] address 0x{:X} must be 0x20-0x27",
            config.expander.address
        ));
    }

    if !(10_000..=1_000_000).contains(&config.expander.frequency) {
        errors.push("[expander] frequency must be 10000-1000000 Hz".to_string());
    }

    if !(0..=i64::from(u32::MAX)).contains(&config.programming.poll_limit) {
        errors.push("[programming] poll_limit must be 0 or a positive u32".to_string());
    }

    if !(1_200..=921_600).contains(&config.console.baud) {
        errors.push("[console] baud must be 1200-921600".to_string());
    }

    errors
}

/// `ChipFamily` variant for a chip name
fn chip_variant(name: &str) -> Option<&'static str> {
    match name.to_ascii_uppercase().as_str() {
        "AT28C64" => Some("At28c64"),
        "AT28C256" => Some("At28c256"),
        _ => None,
    }
}

/// Write the validated values as Rust constants
fn generate_board_config(config: &ProgrammerToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let variant = chip_variant(&config.chip).unwrap();

    let source = format!(
        "// Generated from programmer.toml\n\
         pub const CHIP: ChipFamily = ChipFamily::{};\n\
         pub const EXPANDER_ADDRESS: u8 = 0x{:02X};\n\
         pub const I2C_FREQUENCY: u32 = {};\n\
         pub const POLL_LIMIT: u32 = {};\n\
         pub const BAUD: u32 = {};\n",
        variant,
        config.expander.address,
        config.expander.frequency,
        config.programming.poll_limit,
        config.console.baud,
    );

    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
