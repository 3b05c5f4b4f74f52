//! Machine constants, fixed at build time.
//!
//! The assembler and the VM disagree on the maximum ROM size (`ROM_SIZE`
//! vs `VM_ROM_CAP`). That disagreement is part of the machine's spec, not
//! a bug to paper over, so both constants are kept and exposed here.

/// Total RAM cells, each 8 bits.
pub const RAM_SIZE: usize = 16;

/// Maximum program image bytes the assembler accepts by default.
pub const ROM_SIZE: usize = 256;

/// ROM cells the VM pads to and executes within by default.
pub const VM_ROM_CAP: usize = 0x80;

/// Reserved RAM address: reading it via `sto` prompts for user input.
pub const INPUT_ADDR: u8 = 0xE;

/// Reserved RAM address: writing it via `pop` prints to stdout; reading it
/// via `sto` returns a random byte.
pub const OUTPUT_ADDR: u8 = 0xF;
