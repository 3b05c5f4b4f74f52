use std::collections::HashMap;

use octocore::constants::{INPUT_ADDR, OUTPUT_ADDR, RAM_SIZE};

use crate::error::{Error, ErrorKind};

/// One RAM address's binding: free, reserved at construction time, or
/// bound to a user `def`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    Free,
    Reserved(&'static str),
    User(String),
}

impl Slot {
    fn name(&self) -> Option<&str> {
        match self {
            Slot::Free => None,
            Slot::Reserved(name) => Some(name),
            Slot::User(name) => Some(name.as_str()),
        }
    }
}

/// Variable table (RAM addresses) and label table (ROM line indices),
/// tracked together since a fatal error dumps both at once.
pub struct SymbolTable {
    variables: [Slot; RAM_SIZE],
    labels: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        let mut variables = std::array::from_fn(|_| Slot::Free);
        variables[INPUT_ADDR as usize] = Slot::Reserved("INPUT");
        variables[OUTPUT_ADDR as usize] = Slot::Reserved("OUTPUT");
        SymbolTable {
            variables,
            labels: HashMap::new(),
        }
    }

    /// Allocates the lowest free RAM address to `name`.
    pub fn alloc_var(&mut self, name: &str, line: usize, tokens: &[String]) -> Result<u8, Error> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::new(
                ErrorKind::Syntax(format!(
                    "Expected variable declaration, got '{}'. Variable names must be alphanumeric with no whitespace characters.",
                    name
                )),
                line,
                tokens,
                self,
            ));
        }
        if self.variables.iter().any(|slot| slot.name() == Some(name)) {
            return Err(Error::new(
                ErrorKind::Syntax(format!("Variable with name '{}' already defined", name)),
                line,
                tokens,
                self,
            ));
        }
        match self.variables.iter().position(|slot| *slot == Slot::Free) {
            Some(addr) => {
                self.variables[addr] = Slot::User(name.to_owned());
                Ok(addr as u8)
            }
            None => Err(Error::new(
                ErrorKind::Capacity(format!(
                    "No memory available - Ran out of usable RAM space trying to allocate new variable {}",
                    name
                )),
                line,
                tokens,
                self,
            )),
        }
    }

    /// Frees the address bound to `name`. Reserved names can never be freed.
    pub fn free_var(&mut self, name: &str, line: usize, tokens: &[String]) -> Result<u8, Error> {
        if self
            .variables
            .iter()
            .any(|slot| matches!(slot, Slot::Reserved(n) if *n == name))
        {
            return Err(Error::new(
                ErrorKind::Logic("Cannot free special addresses!".to_owned()),
                line,
                tokens,
                self,
            ));
        }
        match self
            .variables
            .iter()
            .position(|slot| matches!(slot, Slot::User(n) if n == name))
        {
            Some(addr) => {
                self.variables[addr] = Slot::Free;
                Ok(addr as u8)
            }
            None => Err(Error::new(
                ErrorKind::Syntax(format!("variable with name '{}' not found", name)),
                line,
                tokens,
                self,
            )),
        }
    }

    pub fn get_var(&self, name: &str, line: usize, tokens: &[String]) -> Result<u8, Error> {
        match self.variables.iter().position(|slot| slot.name() == Some(name)) {
            Some(addr) => Ok(addr as u8),
            None => Err(Error::new(
                ErrorKind::Syntax(format!("Variable with name '{}' not found", name)),
                line,
                tokens,
                self,
            )),
        }
    }

    pub fn add_label(&mut self, name: &str, position: u32, line: usize, tokens: &[String]) -> Result<(), Error> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::new(
                ErrorKind::Syntax(format!(
                    "Expected jump label declaration, got '{}'. Jump label names must be alphanumeric with no whitespace characters.",
                    name
                )),
                line,
                tokens,
                self,
            ));
        }
        if self.labels.contains_key(name) {
            return Err(Error::new(
                ErrorKind::Syntax(format!("Jump label with name '{}' already defined", name)),
                line,
                tokens,
                self,
            ));
        }
        self.labels.insert(name.to_owned(), position);
        Ok(())
    }

    pub fn get_label(&self, name: &str, line: usize, tokens: &[String]) -> Result<u32, Error> {
        match self.labels.get(name) {
            Some(position) => Ok(*position),
            None => Err(Error::new(
                ErrorKind::Syntax(format!("Jump label with name '{}' not found", name)),
                line,
                tokens,
                self,
            )),
        }
    }

    /// Renders both tables for a fatal-error dump: addresses with their
    /// bound name (or "None"), then the registered label names.
    pub fn dump(&self) -> String {
        let alloc: Vec<String> = self
            .variables
            .iter()
            .enumerate()
            .map(|(addr, slot)| format!("{:#x} {}", addr, slot.name().unwrap_or("None")))
            .collect();
        let labels = if self.labels.is_empty() {
            "None".to_owned()
        } else {
            self.labels.keys().cloned().collect::<Vec<_>>().join(" ")
        };
        format!(
            "Allocated memory:  {}\nRegistered labels:  {}",
            alloc.join(" | "),
            labels
        )
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}
