#[macro_use]
extern crate clap;

mod debug;
mod stdio;

use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};

use octocore::Machine;
use octocore::constants::VM_ROM_CAP;
use stdio::StdIo;

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Capacity(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "file \"{}\" failed: {}", path.display(), err),
            Error::Capacity(msg) => write!(f, "{}", msg),
        }
    }
}

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("file")
                .help("Compiled binary file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .help("Show running output per step"),
        )
        .arg(
            Arg::with_name("skip_rom_size_check")
                .short("w")
                .long("skip-rom-size-check")
                .help("Do not fail if the given binary is larger than the actual system ROM"),
        )
        .get_matches();

    let file = matches.value_of("file").unwrap();
    let debug = matches.is_present("debug");
    let skip_check = matches.is_present("skip_rom_size_check");

    if let Err(err) = run(file, debug, skip_check) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

/// Resolves the ROM length the machine will be padded to, per the VM CLI's
/// `-w` rule: fail if oversized without it, else pad to `max(size, cap)`.
fn rom_length_for(binary_len: usize, skip_check: bool) -> Result<usize, Error> {
    if skip_check {
        Ok(binary_len.max(VM_ROM_CAP))
    } else if binary_len > VM_ROM_CAP {
        Err(Error::Capacity(format!(
            "System does not have enough ROM to hold this program! Length: {}  available: {}",
            binary_len, VM_ROM_CAP
        )))
    } else {
        Ok(VM_ROM_CAP)
    }
}

fn run(file: &str, debug: bool, skip_check: bool) -> Result<(), Error> {
    let path = Path::new(file);
    log::debug!("loading binary from {}", path.display());
    let binary = fs::read(path).map_err(|err| Error::Io(err, path.to_owned()))?;

    let rom_length = rom_length_for(binary.len(), skip_check)?;

    let mut machine = Machine::new(binary, rom_length);

    if debug {
        debug::dump_loaded_rom(machine.rom());
    }

    let mut io = StdIo::new();
    machine.run(&mut io, |m, info| {
        log::trace!("pc={:#04x} {} {:#03x}", info.pc, info.opcode, info.data);
        if debug {
            debug::dump_step(m, info);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rom_length_is_the_vm_cap() {
        assert_eq!(rom_length_for(10, false).unwrap(), VM_ROM_CAP);
    }

    #[test]
    fn oversized_rom_fails_without_the_override() {
        let err = rom_length_for(VM_ROM_CAP + 1, false).unwrap_err();
        assert!(matches!(err, Error::Capacity(_)));
    }

    #[test]
    fn override_pads_to_the_larger_of_size_and_cap() {
        assert_eq!(rom_length_for(VM_ROM_CAP + 50, true).unwrap(), VM_ROM_CAP + 50);
        assert_eq!(rom_length_for(10, true).unwrap(), VM_ROM_CAP);
    }

    #[test]
    fn exactly_at_cap_succeeds_without_override() {
        assert_eq!(rom_length_for(VM_ROM_CAP, false).unwrap(), VM_ROM_CAP);
    }
}
