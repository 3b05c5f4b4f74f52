use crate::constants::{INPUT_ADDR, OUTPUT_ADDR, RAM_SIZE};
use crate::io::MachineIo;
use crate::opcode::OpCode;

/// What happened after a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Halted,
}

/// Everything about a just-executed instruction, for debug dumps and traces.
#[derive(Debug, Clone, Copy)]
pub struct StepInfo {
    /// The program counter the instruction was fetched from.
    pub pc: u8,
    pub opcode: OpCode,
    pub data: u8,
    pub outcome: StepOutcome,
}

/// CPU state, RAM, and ROM for the toy machine.
///
/// `register` and every RAM cell are always in `0..=255`; `pc` always
/// indexes into `rom` between instructions. Both are enforced by
/// construction rather than checked after the fact.
pub struct Machine {
    ram: [u8; RAM_SIZE],
    rom: Vec<u8>,
    pc: u8,
    register: u8,
    halted: bool,
}

impl Machine {
    /// Builds a machine for `rom`, zero-padded up to `min_len` bytes.
    ///
    /// `min_len` is a CLI-level decision (the default `VM_ROM_CAP`, or
    /// `max(file_size, VM_ROM_CAP)` under `-w`), so it's a parameter here
    /// rather than a constant baked into the machine.
    pub fn new(mut rom: Vec<u8>, min_len: usize) -> Machine {
        if rom.len() < min_len {
            rom.resize(min_len, 0);
        }
        Machine {
            ram: [0; RAM_SIZE],
            rom,
            pc: 0,
            register: 0,
            halted: true,
        }
    }

    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn register(&self) -> u8 {
        self.register
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    /// The padded ROM image, for startup debug dumps. Not used by the
    /// fetch-decode-execute loop itself.
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// Fetches, decodes, and executes exactly one instruction.
    pub fn step(&mut self, io: &mut dyn MachineIo) -> StepInfo {
        let pc = self.pc;
        let instr = self.rom[pc as usize];
        let opcode = OpCode::decode(instr >> 4);
        let data = instr & 0xF;

        self.execute(opcode, data, io);

        let outcome = if self.halted {
            StepOutcome::Halted
        } else {
            self.advance(1);
            StepOutcome::Running
        };

        StepInfo {
            pc,
            opcode,
            data,
            outcome,
        }
    }

    /// Runs until `hlt`, calling `on_step` after every executed instruction.
    pub fn run(&mut self, io: &mut dyn MachineIo, mut on_step: impl FnMut(&Machine, &StepInfo)) {
        self.halted = false;
        loop {
            let info = self.step(io);
            on_step(self, &info);
            if info.outcome == StepOutcome::Halted {
                break;
            }
        }
    }

    fn execute(&mut self, opcode: OpCode, data: u8, io: &mut dyn MachineIo) {
        match opcode {
            OpCode::Nop => {}

            OpCode::Hlt => self.halted = true,

            OpCode::Sto => {
                self.register = match data {
                    INPUT_ADDR => io.read_input(),
                    OUTPUT_ADDR => io.random_byte(),
                    d => self.ram[d as usize],
                };
            }

            OpCode::Pop => {
                if data == OUTPUT_ADDR {
                    io.write_output(self.register);
                } else {
                    self.ram[data as usize] = self.register;
                }
            }

            OpCode::Set => {
                let value = self.fetch_next();
                if data == INPUT_ADDR {
                    self.register = value;
                } else {
                    self.ram[data as usize] = value;
                }
            }

            OpCode::Add => {
                self.register = self.register.wrapping_add(self.ram[data as usize]);
            }

            OpCode::Jmp => {
                let target = self.fetch_next();
                self.jump(target);
            }

            OpCode::Jmc => {
                let target = self.fetch_next();
                if self.register == 0xFF {
                    self.jump(target);
                }
            }

            // Negates the immediate nibble `data`, not `RAM[data]` — a
            // quirk of the original machine, preserved rather than fixed.
            OpCode::Neg => {
                self.ram[data as usize] = data.wrapping_neg();
            }

            OpCode::Rgt => self.compare(data, |r, d| r > d),
            OpCode::Rlt => self.compare(data, |r, d| r < d),
            OpCode::Req => self.compare(data, |r, d| r == d),

            OpCode::Not => self.register = !self.register,
            OpCode::And => self.register &= self.ram[data as usize],
            OpCode::Xor => self.register ^= self.ram[data as usize],
            OpCode::Orr => self.register |= self.ram[data as usize],
        }
    }

    fn compare(&mut self, data: u8, cmp: impl Fn(u8, u8) -> bool) {
        self.register = if cmp(self.register, self.ram[data as usize]) {
            0xFF
        } else {
            0x00
        };
    }

    /// Advances PC by one then returns the byte it now points at — the
    /// two-byte instructions' shared immediate-fetch helper.
    fn fetch_next(&mut self) -> u8 {
        self.advance(1);
        self.rom[self.pc as usize]
    }

    /// Sets PC to `target - 1` so the step loop's unconditional `+1`
    /// lands exactly on `target`.
    fn jump(&mut self, target: u8) {
        self.set_pc(target.wrapping_sub(1));
    }

    fn advance(&mut self, delta: i32) {
        let len = self.rom.len() as i32;
        self.pc = (self.pc as i32 + delta).rem_euclid(len) as u8;
    }

    fn set_pc(&mut self, value: u8) {
        let len = self.rom.len() as i32;
        self.pc = (value as i32).rem_euclid(len) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ScriptedIo;

    fn run_to_halt(rom: Vec<u8>) -> (Machine, ScriptedIo) {
        run_with_io(rom, ScriptedIo::new())
    }

    fn run_with_io(rom: Vec<u8>, mut io: ScriptedIo) -> (Machine, ScriptedIo) {
        let mut machine = Machine::new(rom, crate::constants::VM_ROM_CAP);
        machine.run(&mut io, |_, _| {});
        (machine, io)
    }

    #[test]
    fn scenario_a_constant_load_and_halt() {
        let (machine, _) = run_to_halt(vec![0x4E, 0x2A, 0x10]);
        assert_eq!(machine.register(), 0x2A);
        assert!(machine.is_halted());
    }

    #[test]
    fn scenario_b_add_two_constants() {
        // def &a (addr 0), def &b (addr 1), set &a 0x03, set &b 0x04,
        // sto &a, add &b, hlt
        let rom = vec![
            0x40, 0x03, // set RAM[0] = 3
            0x41, 0x04, // set RAM[1] = 4
            0x20, // sto <- RAM[0]
            0x51, // add RAM[1]
            0x10, // hlt
        ];
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.register(), 0x07);
        assert_eq!(machine.ram()[0], 0x03);
        assert_eq!(machine.ram()[1], 0x04);
    }

    #[test]
    fn scenario_c_unconditional_jump() {
        // jmp .end ; hlt (unreachable) ; lbl .end: set &INPUT 0x99 ; hlt
        let rom = vec![
            0x60, 0x03, // jmp -> line 3
            0x10, // hlt (unreachable)
            0x4E, 0x99, // set register = 0x99
            0x10, // hlt
        ];
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.register(), 0x99);
    }

    #[test]
    fn scenario_d_conditional_branch_not_taken() {
        let rom = vec![
            0x4E, 0x00, // set register = 0
            0x70, 0x07, // jmc -> line 7 (not taken, register != 0xFF)
            0x4E, 0x11, // set register = 0x11
            0x10, // hlt
            0x4E, 0x22, // set register = 0x22 (skip target)
            0x10, // hlt
        ];
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.register(), 0x11);
    }

    #[test]
    fn conditional_branch_taken() {
        let rom = vec![
            0x4E, 0xFF, // set register = 0xFF
            0x70, 0x07, // jmc -> line 7 (taken)
            0x4E, 0x11, // set register = 0x11 (skipped)
            0x10, // hlt
            0x4E, 0x22, // set register = 0x22
            0x10, // hlt
        ];
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.register(), 0x22);
    }

    #[test]
    fn sto_input_prompts_and_masks() {
        let rom = vec![0x2E, 0x10]; // sto &INPUT; hlt
        let io = ScriptedIo::new().with_inputs([300u32 as u8]);
        let (machine, _) = run_with_io(rom, io);
        assert_eq!(machine.register(), 300u32 as u8);
    }

    #[test]
    fn sto_output_is_random() {
        let rom = vec![0x2F, 0x10]; // sto &OUTPUT; hlt
        let io = ScriptedIo::new().with_random_bytes([0x77]);
        let (machine, _) = run_with_io(rom, io);
        assert_eq!(machine.register(), 0x77);
    }

    #[test]
    fn pop_output_is_captured_not_ram() {
        let rom = vec![0x4E, 0x42, 0x3F, 0x10]; // set register=0x42; pop &OUTPUT; hlt
        let (machine, io) = run_to_halt(rom);
        assert_eq!(io.outputs, vec![0x42]);
        assert_eq!(machine.ram()[0xF], 0x00);
    }

    #[test]
    fn add_wraps_modulo_256() {
        let rom = vec![
            0x40, 0xFF, // RAM[0] = 0xFF
            0x20, // sto <- RAM[0] (register = 0xFF)
            0x50, // add RAM[0]: 0xFF + 0xFF wraps to 0xFE
            0x10,
        ];
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.register(), 0xFE);
    }

    #[test]
    fn neg_operates_on_the_nibble_not_ram() {
        // neg RAM[5]: writes (-5) & 0xFF into RAM[5], regardless of its
        // prior contents.
        let rom = vec![0x45, 0x99, 0x85, 0x10]; // set RAM[5]=0x99; neg 5; hlt
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.ram()[5], (0u8).wrapping_sub(5));
    }

    #[test]
    fn comparisons_are_always_00_or_ff() {
        let rom = vec![
            0x40, 0x05, // RAM[0] = 5
            0x4E, 0x0A, // register = 0x0A
            0x90, // rgt RAM[0]: 10 > 5 -> 0xFF
            0x30, // pop RAM[0] (store result)
            0x4E, 0x01, // register = 1
            0xA0, // rlt RAM[0]: 1 < 0xFF -> 0xFF
            0x10,
        ];
        let (machine, _) = run_to_halt(rom);
        assert!(machine.register() == 0x00 || machine.register() == 0xFF);
    }

    #[test]
    fn hlt_freezes_ram_at_decode_time() {
        let rom = vec![0x40, 0x07, 0x10, 0x41, 0x09]; // set RAM[0]=7; hlt; (never reached) set RAM[1]=9
        let (machine, _) = run_to_halt(rom);
        assert_eq!(machine.ram()[0], 0x07);
        assert_eq!(machine.ram()[1], 0x00);
    }

    #[test]
    fn pc_wraps_modulo_rom_length() {
        let mut machine = Machine::new(vec![0x00, 0x00, 0x00, 0x00], 4);
        let mut io = ScriptedIo::new();
        for _ in 0..4 {
            machine.step(&mut io);
        }
        assert!((machine.pc() as usize) < machine.rom_len());
    }

    #[test]
    fn padding_extends_short_rom_with_zeros() {
        let machine = Machine::new(vec![0x10], 8);
        assert_eq!(machine.rom_len(), 8);
    }
}
