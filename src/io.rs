//! The machine's I/O seam.
//!
//! `sto`/`pop` on the reserved addresses are core ISA semantics (which
//! address triggers which effect is fixed by the opcode table), but *how*
//! a number is prompted for, parsed, or printed is CLI glue. `MachineIo`
//! is that seam: [`Machine`](crate::Machine) only ever calls it, never
//! touches stdio or an RNG directly.

/// Supplies the side effects `sto`/`pop` need on the reserved I/O addresses.
pub trait MachineIo {
    /// Reads the next input number (`sto &INPUT`), already masked to 8 bits.
    fn read_input(&mut self) -> u8;

    /// Reports the register value written out (`pop &OUTPUT`).
    fn write_output(&mut self, value: u8);

    /// Supplies a random byte (`sto &OUTPUT`).
    fn random_byte(&mut self) -> u8;
}

/// A scripted [`MachineIo`] for deterministic tests: consumes inputs and
/// random bytes from fixed queues, records every value written out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedIo {
    inputs: std::collections::VecDeque<u8>,
    random_bytes: std::collections::VecDeque<u8>,
    pub outputs: Vec<u8>,
}

impl ScriptedIo {
    pub fn new() -> ScriptedIo {
        ScriptedIo::default()
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = u8>) -> ScriptedIo {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_random_bytes(mut self, bytes: impl IntoIterator<Item = u8>) -> ScriptedIo {
        self.random_bytes.extend(bytes);
        self
    }
}

impl MachineIo for ScriptedIo {
    fn read_input(&mut self) -> u8 {
        self.inputs
            .pop_front()
            .expect("test program read more input than was scripted")
    }

    fn write_output(&mut self, value: u8) {
        self.outputs.push(value);
    }

    fn random_byte(&mut self) -> u8 {
        self.random_bytes
            .pop_front()
            .expect("test program consumed more random bytes than were scripted")
    }
}
