//! Text parser for the board DSL
//!
//! Parses whitespace-separated token programs into the IR representation.
//! The two bracket kinds open operand groups (parentheses) and sub-program
//! blocks (braces); a post-pass splices each group into the preceding
//! instruction.

use std::fmt;

use crate::board::Board;
use crate::ir::{BitOp, Direction, Instruction, MoveOp, Operand, Transform};

/// Parse error with the offending token and its position
#[derive(Debug, Clone)]
pub struct ParseError {
    /// 1-based token index in the padded source
    pub position: usize,
    pub token: String,
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            position,
            token: token.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token {} ('{}'): {}",
            self.position, self.token, self.message
        )
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    Paren,
    Brace,
}

impl GroupKind {
    fn open(&self) -> char {
        match self {
            GroupKind::Paren => '(',
            GroupKind::Brace => '{',
        }
    }
}

/// Item produced by the first scan, before groups are spliced
#[derive(Debug)]
enum RawItem {
    Instr(usize, Instruction),
    /// `{N}x` repeat marker awaiting its grouped block
    Times(usize, usize),
    Group(usize, GroupKind, Vec<RawItem>),
}

/// Parse a DSL source string into an instruction list
///
/// Fails on mismatched grouping or any token of unrecognized shape; no
/// partial program is ever returned.
pub fn parse_program(source: &str) -> Result<Vec<Instruction>, ParseError> {
    let padded = pad_brackets(source);
    // Stack of open groups; the bottom frame is the program itself.
    let mut stack: Vec<(Option<(usize, GroupKind)>, Vec<RawItem>)> = vec![(None, Vec::new())];

    for (index, token) in padded.split_whitespace().enumerate() {
        let pos = index + 1;
        match token {
            "(" => stack.push((Some((pos, GroupKind::Paren)), Vec::new())),
            "{" => stack.push((Some((pos, GroupKind::Brace)), Vec::new())),
            ")" | "}" => {
                let kind = if token == ")" {
                    GroupKind::Paren
                } else {
                    GroupKind::Brace
                };
                let (open, items) = stack.pop().expect("stack holds the program frame");
                match open {
                    Some((open_pos, open_kind)) if open_kind == kind => {
                        let top = stack.last_mut().expect("closing leaves the parent frame");
                        top.1.push(RawItem::Group(open_pos, kind, items));
                    }
                    Some((_, open_kind)) => {
                        return Err(ParseError::new(
                            pos,
                            token,
                            format!("mismatched nesting: expected to close '{}'", open_kind.open()),
                        ));
                    }
                    None => {
                        return Err(ParseError::new(pos, token, "no open group to close"));
                    }
                }
            }
            _ => {
                let item = classify_token(token)
                    .map_err(|message| ParseError::new(pos, token, message))?;
                let raw = match item {
                    Token::Instr(instr) => RawItem::Instr(pos, instr),
                    Token::Times(count) => RawItem::Times(pos, count),
                };
                stack.last_mut().expect("stack is never empty").1.push(raw);
            }
        }
    }

    if stack.len() != 1 {
        let (open, _) = stack.pop().expect("unclosed frame");
        let (pos, kind) = open.expect("non-bottom frames carry their opener");
        return Err(ParseError::new(pos, kind.open(), "unclosed group"));
    }

    let (_, items) = stack.pop().expect("program frame");
    resolve_items(items)
}

/// A classified non-bracket token
enum Token {
    Instr(Instruction),
    Times(usize),
}

fn pad_brackets(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 8);
    for ch in source.chars() {
        match ch {
            '(' | ')' | '{' | '}' => {
                out.push(' ');
                out.push(ch);
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn is_board_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_alphabetic())
}

/// Classify a token by its lexical shape into exactly one instruction kind
fn classify_token(token: &str) -> Result<Token, String> {
    if is_board_name(token) {
        return Ok(Token::Instr(Instruction::Load(token.to_string())));
    }

    let first = token.chars().next().expect("split_whitespace yields no empty tokens");

    if "atdcxsr".contains(first) {
        return parse_move(token).map(Token::Instr);
    }

    if let Some(rest) = token.strip_prefix('m') {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(code), None) => Transform::from_code(code)
                .map(|tf| Token::Instr(Instruction::Transform(tf)))
                .ok_or_else(|| format!("unknown transform code '{}'", code)),
            _ => Err("transform expects exactly one code letter".to_string()),
        };
    }

    if token == "~" {
        return Ok(Token::Instr(Instruction::Not));
    }

    if "&|^=".contains(first) {
        return parse_bitwise(token).map(Token::Instr);
    }

    if let Some(bits) = token.strip_prefix('#') {
        return Ok(Token::Instr(Instruction::Literal(read_board(bits))));
    }

    if first == 'o' || first == 'i' {
        return parse_sized_literal(token).map(Token::Instr);
    }

    if let Some(name) = token.strip_prefix('>') {
        if is_board_name(name) {
            return Ok(Token::Instr(Instruction::Store(name.to_string())));
        }
        return Err("store expects an uppercase-led board name".to_string());
    }

    if let Some(digits) = token.strip_suffix('x') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            let count = digits
                .parse::<usize>()
                .map_err(|_| "repeat count out of range".to_string())?;
            return Ok(Token::Times(count));
        }
    }

    Err("unrecognized token".to_string())
}

/// Parse a directional command: one of `atdcxsr`, optional fill flags,
/// a direction letter, and an optional count
fn parse_move(token: &str) -> Result<Instruction, String> {
    let mut chars = token.chars();
    let cmd = chars.next().expect("caller checked the leading letter");
    // Fill flags are accepted for compatibility but carry no semantics.
    let rest = chars.as_str().trim_start_matches(|c| matches!(c, 'o' | 'i' | 'e'));

    let mut chars = rest.chars();
    let dir = chars
        .next()
        .and_then(Direction::from_code)
        .ok_or_else(|| "directional command needs a direction letter (l/r/t/b)".to_string())?;
    let digits = chars.as_str();
    let count = if digits.is_empty() {
        0
    } else {
        digits
            .parse::<usize>()
            .map_err(|_| "malformed count".to_string())?
    };

    Ok(match MoveOp::from_code(cmd) {
        Some(op) => Instruction::Move { op, dir, count },
        None => Instruction::Append { dir, operand: None },
    })
}

fn parse_bitwise(token: &str) -> Result<Instruction, String> {
    match token {
        "&" => {
            return Ok(Instruction::Bitwise {
                op: BitOp::And,
                operand: None,
            })
        }
        "|" => {
            return Ok(Instruction::Bitwise {
                op: BitOp::Or,
                operand: None,
            })
        }
        "^" => {
            return Ok(Instruction::Bitwise {
                op: BitOp::Xor,
                operand: None,
            })
        }
        "=" => return Ok(Instruction::Equals { operand: None }),
        _ => {}
    }

    // Row folds: a doubled symbol plus a direction, e.g. `&&l`.
    let chars: Vec<char> = token.chars().collect();
    if chars.len() == 3 && chars[0] == chars[1] {
        let op = match chars[0] {
            '&' => Some(BitOp::And),
            '|' => Some(BitOp::Or),
            '^' => Some(BitOp::Xor),
            _ => None,
        };
        if let (Some(op), Some(dir)) = (op, Direction::from_code(chars[2])) {
            return Ok(Instruction::RowFold { op, dir });
        }
    }

    Err("malformed bitwise command".to_string())
}

fn parse_sized_literal(token: &str) -> Result<Instruction, String> {
    let (bit, rest) = match token.split_at(1) {
        ("o", rest) => (false, rest),
        ("i", rest) => (true, rest),
        _ => unreachable!("caller checked the leading letter"),
    };
    let (height, width) = rest
        .split_once('x')
        .ok_or_else(|| "sized literal expects the form o{H}x{W} or i{H}x{W}".to_string())?;
    let parse_dim = |s: &str| {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            s.parse::<usize>().ok()
        } else {
            None
        }
    };
    match (parse_dim(height), parse_dim(width)) {
        (Some(height), Some(width)) => Ok(Instruction::Literal(if bit {
            Board::full(height, width)
        } else {
            Board::empty(height, width)
        })),
        _ => Err("sized literal expects the form o{H}x{W} or i{H}x{W}".to_string()),
    }
}

/// Read a `#` board literal body: rows of `0`/`1` separated by `/`
///
/// Malformed bodies (ragged rows or illegal characters) do not fail the
/// parse; they substitute a fixed 3x3 checkerboard. Documented quirk kept
/// for compatibility.
pub(crate) fn read_board(bits: &str) -> Board<bool> {
    let mut rows: Vec<Vec<bool>> = vec![Vec::new()];
    for ch in bits.chars() {
        match ch {
            '/' => rows.push(Vec::new()),
            '0' => rows.last_mut().expect("rows is non-empty").push(false),
            '1' => rows.last_mut().expect("rows is non-empty").push(true),
            _ => return fallback_board(),
        }
    }
    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return fallback_board();
    }
    Board::plot(rows.len(), width, |i, j| rows[i][j])
}

fn fallback_board() -> Board<bool> {
    Board::plot(3, 3, |i, j| (i + j) % 2 == 0)
}

/// Splice groups into the preceding instructions, recursively
fn resolve_items(items: Vec<RawItem>) -> Result<Vec<Instruction>, ParseError> {
    let mut out = Vec::new();
    let mut iter = items.into_iter().peekable();
    while let Some(item) = iter.next() {
        match item {
            RawItem::Group(pos, kind, _) => {
                return Err(ParseError::new(
                    pos,
                    kind.open(),
                    "group does not follow an instruction that accepts an operand",
                ));
            }
            RawItem::Times(pos, count) => match iter.next() {
                Some(RawItem::Group(_, _, body)) => {
                    out.push(Instruction::Repeat {
                        count,
                        body: resolve_items(body)?,
                    });
                }
                _ => {
                    return Err(ParseError::new(
                        pos,
                        format!("{}x", count),
                        "repeat wrapper requires a grouped block",
                    ));
                }
            },
            RawItem::Instr(_, instr) => {
                if matches!(iter.peek(), Some(RawItem::Group(..))) {
                    let Some(RawItem::Group(gpos, kind, body)) = iter.next() else {
                        unreachable!("peeked a group");
                    };
                    out.push(attach_group(instr, kind, body, gpos)?);
                } else {
                    out.push(instr);
                }
            }
        }
    }
    Ok(out)
}

/// Attach a group to the instruction preceding it as its operand
fn attach_group(
    instr: Instruction,
    kind: GroupKind,
    body: Vec<RawItem>,
    gpos: usize,
) -> Result<Instruction, ParseError> {
    if kind != GroupKind::Paren {
        return Err(ParseError::new(
            gpos,
            kind.open(),
            "operand groups use parentheses",
        ));
    }
    match instr {
        Instruction::Bitwise { op, .. } => Ok(Instruction::Bitwise {
            op,
            operand: Some(operand_from_group(body, gpos)?),
        }),
        Instruction::Equals { .. } => Ok(Instruction::Equals {
            operand: Some(operand_from_group(body, gpos)?),
        }),
        Instruction::Append { dir, .. } => Ok(Instruction::Append {
            dir,
            operand: Some(operand_from_group(body, gpos)?),
        }),
        // Take and delete accept an operand group for historical reasons
        // but never consult it.
        Instruction::Move {
            op: op @ (MoveOp::Take | MoveOp::Delete),
            dir,
            count,
        } => {
            operand_from_group(body, gpos)?;
            Ok(Instruction::Move { op, dir, count })
        }
        other => Err(ParseError::new(
            gpos,
            GroupKind::Paren.open(),
            format!("'{}' does not take an operand group", other),
        )),
    }
}

fn operand_from_group(body: Vec<RawItem>, gpos: usize) -> Result<Operand, ParseError> {
    let mut instrs = resolve_items(body)?;
    if instrs.len() == 1 {
        match instrs.pop().expect("length checked") {
            Instruction::Literal(board) => return Ok(Operand::Literal(board)),
            Instruction::Load(name) => return Ok(Operand::Named(name)),
            _ => {}
        }
    }
    Err(ParseError::new(
        gpos,
        GroupKind::Paren.open(),
        "operand group must contain exactly one board literal or name",
    ))
}
