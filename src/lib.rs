//! Machine model for a tiny, nibble-encoded 8-bit toy computer: 16 RAM
//! cells, a padded ROM, one accumulator register, and sixteen
//! instructions.
//!
//! This crate owns the parts with real design content: the opcode table
//! and the fetch-decode-execute loop, including the reserved I/O
//! addresses' side effects. It knows nothing about files, CLI flags, or
//! terminal output — see the `asm` and `vm` crates for that.

pub mod constants;
pub mod io;
mod machine;
mod opcode;

pub use io::MachineIo;
pub use machine::{Machine, StepInfo, StepOutcome};
pub use opcode::OpCode;
