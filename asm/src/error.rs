use crate::symbols::SymbolTable;

/// The three fatal classes from the assembler's error taxonomy, plus the
/// non-fatal warning that only ever gets printed, never returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Unknown verb, malformed or missing operand, undefined name,
    /// duplicate name, non-alphanumeric name, unparseable literal.
    Syntax(String),
    /// `fre` of a reserved name.
    Logic(String),
    /// RAM exhausted during `def`, or ROM budget exceeded without `-w`.
    Capacity(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Syntax(msg) => write!(f, "{}", msg),
            ErrorKind::Logic(msg) => write!(f, "{}", msg),
            ErrorKind::Capacity(msg) => write!(f, "{}", msg),
        }
    }
}

/// A fatal assembler error, carrying everything the fail-fast-with-context
/// policy requires: the offending line, its raw tokens, and a dump of the
/// symbol tables at the moment of failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
    pub tokens: Vec<String>,
    pub dump: String,
}

impl Error {
    pub fn new(kind: ErrorKind, line: usize, tokens: &[String], symbols: &SymbolTable) -> Error {
        Error {
            kind,
            line,
            tokens: tokens.to_vec(),
            dump: symbols.dump(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} on line {}: {}", self.kind, self.line, self.tokens.join(" "))?;
        write!(f, "System dump: {}", self.dump)
    }
}

impl std::error::Error for Error {}
