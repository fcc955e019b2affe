//! Build script for pirdrive-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml and emits it as a `const BOARD`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pirdrive_core::BoardConfig;

fn main() {
    setup_linker();
    let board = load_board_config();
    emit_board_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate board.toml
fn load_board_config() -> BoardConfig {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file in the    ║\n\
            ║  pirdrive-firmware directory.                                    ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let board: BoardConfig = match toml::from_str(&content) {
        Ok(board) => board,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid board.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e.to_string()
                    .lines()
                    .map(|l| format!("║  {:<64}║", l))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
    };

    if let Err(e) = board.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            ║  • {:<62}║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            e.to_string()
        );
    }

    board
}

/// Write `board_config.rs` into OUT_DIR
fn emit_board_config(board: &BoardConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let source = format!(
        "/// Board configuration from board.toml\n\
         pub const BOARD: pirdrive_core::BoardConfig = pirdrive_core::BoardConfig {{\n\
         \x20   sensor_pin: pirdrive_core::PinId::new(pirdrive_hal::PortId::{:?}, {}),\n\
         \x20   pwm_pin: pirdrive_core::PinId::new(pirdrive_hal::PortId::{:?}, {}),\n\
         \x20   pwm: pirdrive_core::PwmConfig {{\n\
         \x20       period: {},\n\
         \x20       compare: {},\n\
         \x20       clock: pirdrive_hal::ClockSource::{:?},\n\
         \x20       output_mode: pirdrive_hal::OutputMode::{:?},\n\
         \x20   }},\n\
         \x20   low_power: pirdrive_hal::LowPowerMode::{:?},\n\
         }};\n",
        board.sensor_pin.port,
        board.sensor_pin.bit,
        board.pwm_pin.port,
        board.pwm_pin.bit,
        board.pwm.period,
        board.pwm.compare,
        board.pwm.clock,
        board.pwm.output_mode,
        board.low_power,
    );

    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}
