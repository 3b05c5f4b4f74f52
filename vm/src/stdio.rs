use std::io::{self, Write};

use octocore::MachineIo;
use rand::Rng;

/// The real-world [`MachineIo`]: prompts on stdin, prints to stdout, and
/// draws random bytes from the platform RNG. Never seeded from the CLI —
/// the seed is not something a program running on the machine can observe.
pub struct StdIo {
    rng: rand::rngs::ThreadRng,
}

impl StdIo {
    pub fn new() -> StdIo {
        StdIo {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for StdIo {
    fn default() -> StdIo {
        StdIo::new()
    }
}

impl MachineIo for StdIo {
    fn read_input(&mut self) -> u8 {
        loop {
            print!("input 8-bit number >");
            io::stdout().flush().ok();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                // Stdin closed: re-prompting would spin forever re-parsing
                // an empty string, so abort instead of looping.
                Ok(0) => {
                    eprintln!("input closed while waiting for an 8-bit number");
                    std::process::exit(1);
                }
                Ok(_) => {}
                Err(_) => continue,
            }
            match line.trim().parse::<i64>() {
                Ok(value) => return (value & 0xFF) as u8,
                Err(_) => continue,
            }
        }
    }

    fn write_output(&mut self, value: u8) {
        println!("{}", value);
    }

    fn random_byte(&mut self) -> u8 {
        self.rng.gen_range(0x00..=0xFF)
    }
}
