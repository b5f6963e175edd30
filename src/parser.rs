//! The incremental push-driven parser.
use std::mem;

use crate::b64::WriteDecoder;
use crate::format::Format;
use crate::value::Value;

/// Errors surfaced while parsing. All are fatal for the parse in progress.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unexpected character for the current state. Also reported on the
    /// terminator of a `|...|` or `#...#` atom whose decoded length does not
    /// match its length hint.
    #[error("invalid token: unexpected character {0:?}")]
    InvalidToken(char),
    /// More nested lists than the format allows.
    #[error("list depth limit exceeded")]
    DepthLimitExceeded,
    /// `)` without a matching `(`.
    #[error("attempted to close a list while not in a list")]
    ListEnd,
    /// Integer literal outside the representable range.
    #[error("integer out of range")]
    IntegerRange,
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Drifting,
    Integer,
    NegIntegerStart,
    LengthByteString,
    LengthQuotedString,
    QuotedString,
    QuotedStringEscape,
    QuotedStringHexEscape,
    QuotedStringHexEscape2,
    QuotedStringOctalEscape,
    QuotedStringOctalEscape2,
    QuotedStringOctalEscape3,
    QuotedStringEscapeCr,
    QuotedStringEscapeLf,
    Base64String,
    Token,
    HexString,
    HexStringOdd,
}

/// A push-driven parser, created with [`Format::parser`].
///
/// Feed input with [`Parser::write`] in chunks of any size, then call
/// [`Parser::close`] to flush a trailing atom and take the parsed values.
/// An instance is single-threaded; parsing state survives across writes, so
/// atoms and even multi-byte escape sequences may straddle chunk boundaries.
///
/// [`Format::parser`]: crate::format::Format::parser
#[derive(Debug)]
pub struct Parser {
    format: Format,
    state: State,
    /// Text atom under construction.
    text: Vec<u8>,
    /// Binary atom under construction.
    data: Vec<u8>,
    /// Pending length hint, or the remaining count of a length-prefixed body.
    hint: u64,
    /// Integer magnitude, also nibble scratch for hex and octal escapes.
    accum: u64,
    neg: bool,
    len_hint: bool,
    reissue: bool,
    /// While non-zero, input is consumed as raw octets, not UTF-8.
    byte_depth: u32,
    tokens: Vec<Value>,
    stack: Vec<Vec<Value>>,
    depth: u32,
    eof: bool,
    /// Decoder for `|...|` bodies.
    b64: WriteDecoder,
    /// Decoder for the `{...}` envelope.
    sub_b64: WriteDecoder,
    sublexing: bool,
}

fn is_token_start(r: char) -> bool {
    r.is_ascii_alphabetic() || matches!(r, '_' | '.' | '/' | ':' | '*' | '+' | '=' | '-')
}

fn is_token_char(r: char) -> bool {
    is_token_start(r) || r.is_ascii_digit()
}

fn dechex(r: char) -> Option<u8> {
    match r {
        '0'..='9' => Some(r as u8 - b'0'),
        'a'..='f' => Some(r as u8 - b'a' + 10),
        'A'..='F' => Some(r as u8 - b'A' + 10),
        _ => None,
    }
}

fn decoct(r: char) -> Option<u8> {
    match r {
        '0'..='7' => Some(r as u8 - b'0'),
        _ => None,
    }
}

/// Decode the first character of `buf`. A malformed sequence consumes one
/// byte and yields U+FFFD.
fn decode_char(buf: &[u8]) -> (char, usize) {
    let prefix = &buf[..buf.len().min(4)];
    let valid = match std::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(err) => {
            std::str::from_utf8(&prefix[..err.valid_up_to()]).unwrap_or_default()
        }
    };
    match valid.chars().next() {
        Some(r) => (r, r.len_utf8()),
        None => (char::REPLACEMENT_CHARACTER, 1),
    }
}

impl Parser {
    pub(crate) fn new(format: Format) -> Self {
        Self {
            format,
            state: State::Drifting,
            text: Vec::new(),
            data: Vec::new(),
            hint: 0,
            accum: 0,
            neg: false,
            len_hint: false,
            reissue: false,
            byte_depth: if format.unicode_stream { 0 } else { 1 },
            tokens: Vec::new(),
            stack: Vec::new(),
            depth: 0,
            eof: false,
            b64: WriteDecoder::new(),
            sub_b64: WriteDecoder::new(),
            sublexing: false,
        }
    }

    /// Feed a chunk of input.
    ///
    /// On error the parse is dead: the partial token list should be
    /// discarded and no further writes made.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.sublexing {
            // Inside a {...} envelope everything up to the closing brace is
            // base64 of s-expression source, which feeds back through the
            // ordinary per-byte loop below.
            let mut decoded = Vec::new();
            return match buf.iter().position(|&b| b == b'}') {
                None => {
                    self.sub_b64.write(buf, &mut decoded);
                    self.step(&decoded)
                }
                Some(idx) => {
                    self.sub_b64.write(&buf[..idx], &mut decoded);
                    self.sub_b64.finish(&mut decoded);
                    self.step(&decoded)?;
                    self.sublexing = false;
                    self.step(&buf[idx + 1..])
                }
            };
        }
        self.step(buf)
    }

    /// Flush any trailing atom and return the accumulated top-level values.
    pub fn close(mut self) -> Result<Vec<Value>> {
        self.eof = true;
        self.write(&[0])?;
        Ok(self.tokens)
    }

    fn step(&mut self, buf: &[u8]) -> Result<()> {
        let mut i = 0usize;
        let mut r = '\0';
        loop {
            if self.reissue {
                self.reissue = false;
            } else {
                if i >= buf.len() {
                    break;
                }
                if self.byte_depth > 0 {
                    r = buf[i] as char;
                    i += 1;
                } else {
                    let (c, len) = decode_char(&buf[i..]);
                    r = c;
                    i += len;
                }
            }

            match self.state {
                State::Drifting => {
                    if self.eof {
                        return Ok(());
                    }
                    match r {
                        ' ' | '\t' | '\r' | '\n' => {}
                        '0'..='9' if self.format.integers => {
                            self.state = State::Integer;
                            self.reissue = true;
                        }
                        '-' if self.format.integers => {
                            self.state = State::NegIntegerStart;
                        }
                        '(' if self.format.lists => {
                            if self.depth >= self.format.max_depth {
                                return Err(Error::DepthLimitExceeded);
                            }
                            self.depth += 1;
                            self.stack.push(mem::take(&mut self.tokens));
                        }
                        ')' if self.format.lists => {
                            let Some(mut parent) = self.stack.pop() else {
                                return Err(Error::ListEnd);
                            };
                            self.depth -= 1;
                            parent.push(Value::List(mem::take(&mut self.tokens)));
                            self.tokens = parent;
                        }
                        '"' if self.format.quoted_strings => {
                            self.state = State::QuotedString;
                        }
                        '|' if self.format.base64_strings => {
                            self.state = State::Base64String;
                            self.b64 = WriteDecoder::new();
                            self.byte_depth += 1;
                        }
                        '{' if self.format.verbatim_base64 && !self.sublexing => {
                            self.sublexing = true;
                            self.sub_b64 = WriteDecoder::new();
                            return self.write(&buf[i..]);
                        }
                        '#' if self.format.hex_strings => {
                            self.state = State::HexString;
                        }
                        _ if self.format.tokens && is_token_start(r) => {
                            self.state = State::Token;
                            self.reissue = true;
                        }
                        _ => return Err(Error::InvalidToken(r)),
                    }
                }
                State::Token => {
                    if is_token_char(r) {
                        self.push_char(r);
                    } else {
                        self.reissue = true;
                        self.state = State::Drifting;
                        self.push_text();
                    }
                }
                State::NegIntegerStart => match r {
                    '0'..='9' => {
                        self.state = State::Integer;
                        self.neg = true;
                        self.reissue = true;
                    }
                    _ => {
                        // Not a negative integer after all: a bare token
                        // starting with '-'.
                        self.state = State::Token;
                        self.text.push(b'-');
                        self.reissue = true;
                    }
                },
                State::Integer => match r {
                    '0'..='9' => {
                        let digit = (r as u8 - b'0') as u64;
                        self.accum = self
                            .accum
                            .checked_mul(10)
                            .and_then(|v| v.checked_add(digit))
                            .ok_or(Error::IntegerRange)?;
                    }
                    '"' if self.format.quoted_strings && !self.neg => {
                        self.hint = mem::take(&mut self.accum);
                        self.state = State::LengthQuotedString;
                    }
                    '#' if self.format.hex_strings && !self.neg => {
                        self.hint = mem::take(&mut self.accum);
                        self.len_hint = true;
                        self.state = State::HexString;
                    }
                    '|' if self.format.base64_strings && !self.neg => {
                        self.hint = mem::take(&mut self.accum);
                        self.len_hint = true;
                        self.state = State::Base64String;
                        self.b64 = WriteDecoder::new();
                        self.byte_depth += 1;
                    }
                    ':' if self.format.verbatim_byte_strings && !self.neg => {
                        self.hint = mem::take(&mut self.accum);
                        self.len_hint = true;
                        self.state = State::LengthByteString;
                        self.byte_depth += 1;
                    }
                    _ => {
                        let value = self.finish_integer()?;
                        self.push(value);
                        self.reissue = true;
                        self.state = State::Drifting;
                    }
                },
                State::LengthByteString => {
                    if self.hint == 0 {
                        self.byte_depth -= 1;
                        self.state = State::Drifting;
                        let data = mem::take(&mut self.data);
                        self.push(Value::Bytes(data));
                        self.reissue = true;
                    } else {
                        self.data.push(r as u8);
                        self.hint -= 1;
                    }
                }
                State::LengthQuotedString => {
                    if self.hint == 0 {
                        if r != '"' {
                            return Err(Error::InvalidToken(r));
                        }
                        self.state = State::Drifting;
                        self.push_text();
                    } else {
                        self.push_char(r);
                        self.hint -= 1;
                    }
                }
                State::QuotedString => match r {
                    '"' => {
                        self.state = State::Drifting;
                        self.push_text();
                    }
                    '\\' => self.state = State::QuotedStringEscape,
                    _ => self.push_char(r),
                },
                State::QuotedStringEscape => {
                    self.state = State::QuotedString;
                    match r {
                        'a' => self.text.push(0x07),
                        'b' => self.text.push(0x08),
                        'f' => self.text.push(0x0c),
                        'n' => self.text.push(b'\n'),
                        'r' => self.text.push(b'\r'),
                        't' => self.text.push(b'\t'),
                        'v' => self.text.push(0x0b),
                        '\r' => self.state = State::QuotedStringEscapeLf,
                        '\n' => self.state = State::QuotedStringEscapeCr,
                        'x' => self.state = State::QuotedStringHexEscape,
                        '0'..='7' => {
                            self.state = State::QuotedStringOctalEscape;
                            self.accum = 0;
                            self.reissue = true;
                        }
                        _ => self.push_char(r),
                    }
                }
                State::QuotedStringHexEscape => {
                    let nibble = dechex(r).ok_or(Error::InvalidToken(r))?;
                    self.accum = nibble as u64;
                    self.state = State::QuotedStringHexEscape2;
                }
                State::QuotedStringHexEscape2 => {
                    let nibble = dechex(r).ok_or(Error::InvalidToken(r))?;
                    self.text.push(((self.accum as u8) << 4) | nibble);
                    self.accum = 0;
                    self.state = State::QuotedString;
                }
                State::QuotedStringOctalEscape => {
                    let digit = decoct(r).ok_or(Error::InvalidToken(r))?;
                    self.accum = digit as u64;
                    self.state = State::QuotedStringOctalEscape2;
                }
                State::QuotedStringOctalEscape2 => {
                    let digit = decoct(r).ok_or(Error::InvalidToken(r))?;
                    self.accum = (((self.accum as u8) << 3) | digit) as u64;
                    self.state = State::QuotedStringOctalEscape3;
                }
                State::QuotedStringOctalEscape3 => {
                    let digit = decoct(r).ok_or(Error::InvalidToken(r))?;
                    self.text.push(((self.accum as u8) << 3) | digit);
                    self.accum = 0;
                    self.state = State::QuotedString;
                }
                // A backslash–newline continuation swallows the other half
                // of a CRLF or LFCR pair if present.
                State::QuotedStringEscapeLf => {
                    if r != '\n' {
                        self.reissue = true;
                    }
                    self.state = State::QuotedString;
                }
                State::QuotedStringEscapeCr => {
                    if r != '\r' {
                        self.reissue = true;
                    }
                    self.state = State::QuotedString;
                }
                State::Base64String => {
                    if r == '|' {
                        self.b64.finish(&mut self.text);
                        self.byte_depth -= 1;
                        if self.len_hint && self.text.len() as u64 != self.hint {
                            return Err(Error::InvalidToken(r));
                        }
                        self.state = State::Drifting;
                        self.push_text();
                    } else {
                        self.b64.push(r as u8, &mut self.text);
                    }
                }
                State::HexString => match r {
                    '#' => {
                        if self.len_hint && self.data.len() as u64 != self.hint {
                            return Err(Error::InvalidToken(r));
                        }
                        self.state = State::Drifting;
                        self.accum = 0;
                        let data = mem::take(&mut self.data);
                        self.push(Value::Bytes(data));
                    }
                    ' ' | '\t' | '\r' | '\n' => {}
                    _ => {
                        let nibble = dechex(r).ok_or(Error::InvalidToken(r))?;
                        self.accum = nibble as u64;
                        self.state = State::HexStringOdd;
                    }
                },
                State::HexStringOdd => match r {
                    ' ' | '\t' | '\r' | '\n' => {}
                    _ => {
                        let nibble = dechex(r).ok_or(Error::InvalidToken(r))?;
                        self.data.push(((self.accum as u8) << 4) | nibble);
                        self.state = State::HexString;
                    }
                },
            }
        }
        Ok(())
    }

    /// Narrow the accumulated magnitude to the smallest fitting variant.
    fn finish_integer(&mut self) -> Result<Value> {
        let magnitude = mem::take(&mut self.accum);
        let neg = mem::take(&mut self.neg);
        if neg {
            if magnitude <= 1 << 31 {
                Ok(Value::I32((magnitude as u32).wrapping_neg() as i32))
            } else if magnitude <= 1 << 63 {
                Ok(Value::I64(magnitude.wrapping_neg() as i64))
            } else {
                Err(Error::IntegerRange)
            }
        } else if magnitude <= i32::MAX as u64 {
            Ok(Value::I32(magnitude as i32))
        } else {
            Ok(Value::U64(magnitude))
        }
    }

    fn push(&mut self, value: Value) {
        self.tokens.push(value);
        self.len_hint = false;
        self.hint = 0;
    }

    /// Push the text atom under construction, as a symbol if its contents
    /// are UTF-8 and as raw bytes otherwise.
    fn push_text(&mut self) {
        let text = mem::take(&mut self.text);
        let value = match String::from_utf8(text) {
            Ok(s) => Value::Symbol(s.into()),
            Err(err) => Value::Bytes(err.into_bytes()),
        };
        self.push(value);
    }

    fn push_char(&mut self, r: char) {
        let mut buf = [0u8; 4];
        self.text
            .extend_from_slice(r.encode_utf8(&mut buf).as_bytes());
    }
}
