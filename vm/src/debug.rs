//! Per-step state dump for `-d, --debug`. Not part of the machine's
//! normative behavior — purely a human-readable trace, ported from the
//! reference tool's own debug printout.

use std::io::{self, BufRead};

use octocore::{Machine, StepInfo};

fn phex(byte: u8) -> String {
    format!("{:02X}", byte)
}

fn pbin(byte: u8) -> String {
    format!("{:08b}", byte)
}

/// Prints the ROM as 8 rows of 16 bytes, right after loading.
pub fn dump_loaded_rom(rom: &[u8]) {
    println!("Loaded ROM:\n");
    for row in rom.chunks(16) {
        let cells: Vec<String> = row.iter().map(|b| phex(*b)).collect();
        println!("    {}", cells.join(" "));
    }
    println!();
}

/// Prints RAM (general-purpose cells only), the register, the line the
/// just-executed instruction was fetched from, and its mnemonic, then
/// blocks on stdin until the user presses enter.
pub fn dump_step(machine: &Machine, info: &StepInfo) {
    println!("  addr | hex   bin");
    for (addr, byte) in machine.ram().iter().enumerate().take(machine.ram().len() - 2) {
        println!("    {} | {}    {} ", phex(addr as u8), phex(*byte), pbin(*byte));
    }
    println!("    rr | {}    {}", phex(machine.register()), pbin(machine.register()));
    println!("\nline {}: ", phex(info.pc));
    println!(
        " executed:  {} {} \n",
        info.opcode.mnemonic(),
        format!("{:X}", info.data)
    );
    let mut discard = String::new();
    let _ = io::stdin().lock().read_line(&mut discard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phex_pads_single_digit_values() {
        assert_eq!(phex(0x0A), "0A");
        assert_eq!(phex(0xFF), "FF");
    }

    #[test]
    fn pbin_is_always_eight_digits() {
        assert_eq!(pbin(0x01), "00000001");
        assert_eq!(pbin(0xFF), "11111111");
    }
}
