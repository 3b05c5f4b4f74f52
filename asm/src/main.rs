#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};

use octocore::constants::ROM_SIZE;

#[derive(Debug)]
enum Error {
    Asm(asm::error::Error),
    Capacity(String),
    Io(std::io::Error, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Asm(err) => write!(f, "{}", err),
            Error::Capacity(msg) => write!(f, "{}", msg),
            Error::Io(err, path) => write!(f, "file \"{}\" failed: {}", path.display(), err),
        }
    }
}

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("infile")
                .help("Assembly file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("outfile")
                .short("o")
                .long("outfile")
                .takes_value(true)
                .value_name("PATH")
                .help("Name of compiled binary file. Defaults to '<infile>.bin'."),
        )
        .arg(
            Arg::with_name("skip_rom_size_check")
                .short("w")
                .long("skip-rom-size-check")
                .help("Do not fail if the compiled binary is larger than the usable ROM"),
        )
        .get_matches();

    let infile = matches.value_of("infile").unwrap();
    let outfile = matches.value_of("outfile");
    let skip_check = matches.is_present("skip_rom_size_check");

    if let Err(err) = run(infile, outfile, skip_check) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

/// The assembler's ROM-size gate, extracted so it can be unit-tested like
/// `vm::rom_length_for` tests the VM-side analogue.
fn check_rom_size(len: usize, skip_check: bool) -> Result<(), Error> {
    if len > ROM_SIZE && !skip_check {
        Err(Error::Capacity(format!(
            "No program space available - Ran out of usable ROM space. Usable ROM is {} bytes, and compiled binary is {}.",
            ROM_SIZE, len
        )))
    } else {
        Ok(())
    }
}

/// Strips a literal trailing `.asm`, otherwise leaves the name untouched,
/// then appends `.bin` — matching the original compiler's `infile[:-4]`
/// rather than `Path::with_extension`, which would clobber any other
/// extension (`foo.txt` must become `foo.txt.bin`, not `foo.bin`).
fn default_outfile(infile: &str) -> PathBuf {
    let stem = infile.strip_suffix(".asm").unwrap_or(infile);
    PathBuf::from(format!("{}.bin", stem))
}

fn run(infile: &str, outfile: Option<&str>, skip_check: bool) -> Result<(), Error> {
    let infile_path = Path::new(infile);
    log::debug!("reading source from {}", infile_path.display());
    let source = fs::read_to_string(infile_path).map_err(|err| Error::Io(err, infile_path.to_owned()))?;

    let binary = asm::assemble(&source).map_err(Error::Asm)?;

    check_rom_size(binary.len(), skip_check)?;

    let outfile_path: PathBuf = outfile.map(PathBuf::from).unwrap_or_else(|| default_outfile(infile));
    fs::write(&outfile_path, &binary).map_err(|err| Error::Io(err, outfile_path.clone()))?;

    println!("Done. No errors reported.");
    println!("Compiled size: {} bytes", binary.len());
    Ok(())
}
