use crate::error::{Error, ErrorKind};
use crate::symbols::SymbolTable;

/// A single operand token, not yet resolved to a concrete value.
#[derive(Clone, Debug)]
pub enum Operand {
    /// `&name` — a variable reference.
    Variable(String),
    /// `.name` — a label reference, only meaningful after `jmp`/`jmc`.
    Label(String),
    /// A numeric literal, base auto-detected.
    Literal(i64),
}

impl Operand {
    /// Parses an operand token without resolving it against any table yet.
    /// `&name` and `.name` are recognized by prefix; anything else is
    /// attempted as a literal.
    pub fn parse(token: &str, line: usize, tokens: &[String], symbols: &SymbolTable) -> Result<Operand, Error> {
        if let Some(name) = token.strip_prefix('&') {
            Ok(Operand::Variable(name.to_owned()))
        } else if let Some(name) = token.strip_prefix('.') {
            Ok(Operand::Label(name.to_owned()))
        } else {
            parse_literal(token).map(Operand::Literal).map_err(|_| {
                Error::new(
                    ErrorKind::Syntax(format!("Could not parse variable or value '{}'", token)),
                    line,
                    tokens,
                    symbols,
                )
            })
        }
    }

    /// Resolves this operand to a concrete data nibble/byte value, for
    /// verbs whose operand is `&name` or a literal (not a label).
    pub fn resolve_data(&self, line: usize, tokens: &[String], symbols: &SymbolTable) -> Result<i64, Error> {
        match self {
            Operand::Variable(name) => symbols.get_var(name, line, tokens).map(i64::from),
            Operand::Literal(value) => Ok(*value),
            Operand::Label(name) => Err(Error::new(
                ErrorKind::Syntax(format!("Could not parse variable or value '.{}'", name)),
                line,
                tokens,
                symbols,
            )),
        }
    }
}

/// Base-auto-detecting literal parse: decimal, `0x` hex, `0o` octal, `0b`
/// binary, each optionally negative.
fn parse_literal(token: &str) -> Result<i64, std::num::ParseIntError> {
    let (sign, rest) = match token.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, token),
    };
    let value = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)?
    } else if let Some(oct) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8)?
    } else if let Some(bin) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2)?
    } else {
        rest.parse::<i64>()?
    };
    Ok(sign * value)
}
