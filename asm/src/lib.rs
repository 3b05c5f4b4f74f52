//! Assembler for the [octocore](../octocore/index.html) toy machine.
//!
//! [`assemble`] takes the full text of a `.asm` source file and produces a
//! flat byte image, ready to be padded and run by the `vm` crate. The
//! pipeline is: tokenize each line, encode verb-by-verb against a running
//! variable/label table, then fix up any label references that weren't
//! resolvable at the point they were used.

pub mod error;
pub mod operand;
pub mod symbols;

use octocore::OpCode;

use error::{Error, ErrorKind};
use operand::Operand;
use symbols::SymbolTable;

const RUNTIME_VERBS: [&str; 16] = [
    "nop", "hlt", "sto", "pop", "set", "add", "jmp", "jmc", "neg", "rgt", "rlt", "req", "not",
    "and", "xor", "orr",
];

fn opcode_index(verb: &str) -> Option<u8> {
    RUNTIME_VERBS.iter().position(|v| *v == verb).map(|i| i as u8)
}

/// A byte already resolved, or a still-pending reference to a label that
/// may not have been declared yet at the point it was used.
enum OutByte {
    Byte(u8),
    LabelRef {
        name: String,
        line: usize,
        tokens: Vec<String>,
    },
}

/// Assembles `source` into a flat byte image.
///
/// Does not apply the ROM-size check; callers decide whether to enforce
/// `ROM_SIZE` and whether `-w` is set.
pub fn assemble(source: &str) -> Result<Vec<u8>, Error> {
    let mut symbols = SymbolTable::new();
    let mut output: Vec<OutByte> = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let tokens: Vec<String> = raw_line.split_whitespace().map(str::to_owned).collect();
        if tokens.is_empty() {
            continue;
        }

        let verb = tokens[0].as_str();
        if verb == "cmt" {
            continue;
        }

        if !RUNTIME_VERBS.contains(&verb) && !["def", "fre", "lbl", "rnd"].contains(&verb) {
            return Err(Error::new(
                ErrorKind::Syntax(format!("verb {} not found", verb)),
                line_no,
                &tokens,
                &symbols,
            ));
        }

        if ["nop", "hlt", "not", "rnd"].contains(&verb) {
            warn_on_extra(verb, &tokens, 1, line_no);
            if verb == "rnd" {
                output.push(OutByte::Byte(0x2E)); // alias for sto &INPUT
            } else {
                let opcode = opcode_index(verb).expect("nop/hlt/not are runtime verbs");
                output.push(OutByte::Byte(opcode << 4));
            }
            continue;
        }

        if tokens.len() < 2 {
            return Err(Error::new(
                ErrorKind::Syntax(format!("Incomplete data for verb {} on line {}", verb, line_no)),
                line_no,
                &tokens,
                &symbols,
            ));
        }
        let data_token = &tokens[1];

        match verb {
            "def" => {
                let name = expect_sigil(data_token, '&', line_no, &tokens, &symbols)?;
                symbols.alloc_var(name, line_no, &tokens)?;
                continue;
            }
            "fre" => {
                let name = expect_sigil(data_token, '&', line_no, &tokens, &symbols)?;
                symbols.free_var(name, line_no, &tokens)?;
                continue;
            }
            "lbl" => {
                let name = expect_sigil(data_token, '.', line_no, &tokens, &symbols)?;
                symbols.add_label(name, output.len() as u32, line_no, &tokens)?;
                continue;
            }
            "jmp" | "jmc" => {
                warn_on_extra(verb, &tokens, 2, line_no);
                let opcode = opcode_index(verb).expect("jmp/jmc are runtime verbs");
                output.push(OutByte::Byte(opcode << 4));
                let operand = Operand::parse(data_token, line_no, &tokens, &symbols)?;
                match operand {
                    Operand::Label(name) => output.push(OutByte::LabelRef {
                        name,
                        line: line_no,
                        tokens: tokens.clone(),
                    }),
                    _ => {
                        let target = operand.resolve_data(line_no, &tokens, &symbols)?;
                        output.push(OutByte::Byte(target as u8));
                    }
                }
                continue;
            }
            _ => {}
        }

        let operand = Operand::parse(data_token, line_no, &tokens, &symbols)?;
        let data = operand.resolve_data(line_no, &tokens, &symbols)? as u8 & 0xF;
        let opcode = opcode_index(verb).ok_or_else(|| {
            Error::new(
                ErrorKind::Syntax(format!("Verb {} not implemented", verb)),
                line_no,
                &tokens,
                &symbols,
            )
        })?;

        if verb == "set" {
            if tokens.len() < 3 {
                return Err(Error::new(
                    ErrorKind::Syntax(format!("Incomplete data for verb {} on line {}", verb, line_no)),
                    line_no,
                    &tokens,
                    &symbols,
                ));
            }
            warn_on_extra(verb, &tokens, 3, line_no);
            let value_operand = Operand::parse(&tokens[2], line_no, &tokens, &symbols)?;
            let value = value_operand.resolve_data(line_no, &tokens, &symbols)?;
            output.push(OutByte::Byte((opcode << 4) | data));
            output.push(OutByte::Byte(value as u8));
        } else {
            warn_on_extra(verb, &tokens, 2, line_no);
            output.push(OutByte::Byte((opcode << 4) | data));
        }
    }

    resolve(output, &symbols)
}

/// Replaces every pending label reference with its resolved position;
/// fails if any label was never declared.
fn resolve(output: Vec<OutByte>, symbols: &SymbolTable) -> Result<Vec<u8>, Error> {
    output
        .into_iter()
        .map(|b| match b {
            OutByte::Byte(byte) => Ok(byte),
            OutByte::LabelRef { name, line, tokens } => {
                symbols.get_label(&name, line, &tokens).map(|pos| pos as u8)
            }
        })
        .collect()
}

fn expect_sigil<'a>(
    token: &'a str,
    sigil: char,
    line: usize,
    tokens: &[String],
    symbols: &SymbolTable,
) -> Result<&'a str, Error> {
    token.strip_prefix(sigil).ok_or_else(|| {
        let expected = if sigil == '&' {
            "variable declaration"
        } else {
            "jump label declaration"
        };
        Error::new(
            ErrorKind::Syntax(format!("Expected {}, got '{}'", expected, token)),
            line,
            tokens,
            symbols,
        )
    })
}

fn warn_on_extra(verb: &str, tokens: &[String], expected: usize, line: usize) {
    if tokens.len() > expected {
        log::warn!(
            "extra data '{}' on line {} ignored ({} takes at most {} operand(s))",
            tokens[expected..].join(" "),
            line,
            verb,
            expected - 1,
        );
    }
}

/// Verifies decoding `assemble`'s output with the real opcode table
/// succeeds, catching drift between the verb list here and [`OpCode`].
#[cfg(test)]
fn assert_decodes(byte: u8) {
    let _ = OpCode::decode(byte >> 4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_a_constant_load_and_halt() {
        let bin = assemble("set &INPUT 0x2A\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x4E, 0x2A, 0x10]);
    }

    #[test]
    fn scenario_b_add_two_constants() {
        let source = "def &a\ndef &b\nset &a 0x03\nset &b 0x04\nsto &a\nadd &b\nhlt\n";
        let bin = assemble(source).unwrap();
        assert_eq!(bin, vec![0x40, 0x03, 0x41, 0x04, 0x20, 0x51, 0x10]);
    }

    #[test]
    fn scenario_c_unconditional_jump() {
        let source = "jmp .end\nhlt\nlbl .end\nset &INPUT 0x99\nhlt\n";
        let bin = assemble(source).unwrap();
        assert_eq!(bin, vec![0x60, 0x03, 0x10, 0x4E, 0x99, 0x10]);
    }

    #[test]
    fn scenario_d_conditional_branch_not_taken() {
        let source =
            "set &INPUT 0x00\njmc .skip\nset &INPUT 0x11\nhlt\nlbl .skip\nset &INPUT 0x22\nhlt\n";
        let bin = assemble(source).unwrap();
        assert_eq!(
            bin,
            vec![0x4E, 0x00, 0x70, 0x07, 0x4E, 0x11, 0x10, 0x4E, 0x22, 0x10]
        );
    }

    #[test]
    fn scenario_e_capacity_error_on_fifteenth_def() {
        let mut source = String::new();
        for n in 0..15 {
            source.push_str(&format!("def &v{}\n", n));
        }
        let err = assemble(&source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Capacity(_)));
    }

    #[test]
    fn forward_label_reference_resolves() {
        let bin = assemble("jmp .later\nlbl .later\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x60, 0x02, 0x10]);
    }

    #[test]
    fn unresolved_label_is_a_fatal_error() {
        let err = assemble("jmp .nowhere\nhlt\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }

    #[test]
    fn rnd_is_the_literal_byte_0x2e() {
        let bin = assemble("rnd\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x2E, 0x10]);
    }

    #[test]
    fn numeric_jump_targets_bypass_the_label_table() {
        let bin = assemble("jmp 5\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x60, 0x05, 0x10]);
    }

    #[test]
    fn numeric_literal_permitted_where_a_variable_is_expected() {
        // `eval_data` permits both &name and a bare literal; preserved here.
        let bin = assemble("sto 0x3\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x23, 0x10]);
    }

    #[test]
    fn unknown_verb_is_a_syntax_error() {
        let err = assemble("frobnicate &x\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }

    #[test]
    fn fre_reserved_name_is_a_logic_error() {
        let err = assemble("fre &INPUT\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Logic(_)));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let bin = assemble("\ncmt this is ignored entirely\n   \nhlt\n").unwrap();
        assert_eq!(bin, vec![0x10]);
    }

    #[test]
    fn free_then_redefine_reuses_the_address() {
        let bin = assemble("def &a\nfre &a\ndef &b\nset &b 1\nhlt\n").unwrap();
        assert_eq!(bin, vec![0x40, 0x01, 0x10]);
    }

    #[test]
    fn byte_count_matches_the_verb_accounting_formula() {
        let source = "nop\nhlt\nnot\nrnd\nsto 0\nset &INPUT 1\njmp 0\n";
        let bin = assemble(source).unwrap();
        // 4 single-byte niladic verbs + 1 single-operand verb + 2 two-byte verbs
        assert_eq!(bin.len(), 4 + 1 + 2 * 2);
        for byte in &bin {
            assert_decodes(*byte);
        }
    }
}
