//! Pull-style JSON tokenizer over any `Read`.
//!
//! The export can be far larger than memory is comfortable with, so neither pass
//! decodes the whole document. `TokenReader` walks it one token at a time and, when
//! the caller is positioned on a value it cares about, `decode` captures exactly that
//! value's bytes and hands them to serde_json. Peak memory is one value.

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Read};

/// A single lexical JSON token. Object keys are reported separately from string values.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Key(String),
    Str(String),
    /// Number text exactly as written in the document.
    Number(String),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the innermost open container accepts next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    KeyOrEnd,   // just after '{'
    Key,        // after ',' in an object
    Colon,      // after a key
    Value,      // after ':' or after ',' in an array
    ValueOrEnd, // just after '['
    CommaOrEnd, // after a complete member/element
}

#[derive(Debug)]
struct Frame {
    kind: Container,
    step: Step,
}

pub struct TokenReader<R: Read> {
    rdr: BufReader<R>,
    stack: Vec<Frame>,
    offset: u64,
    scratch: Vec<u8>,
}

impl<R: Read> TokenReader<R> {
    pub fn new(inner: R, buf_bytes: usize) -> Self {
        Self {
            rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), inner),
            stack: Vec::with_capacity(16),
            offset: 0,
            scratch: Vec::with_capacity(16 * 1024),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Number of currently open objects/arrays.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // ----------------------------- Byte level ------------------------------------

    #[inline]
    fn peek(&mut self) -> Result<Option<u8>> {
        let buf = self.rdr.fill_buf().context("read export")?;
        Ok(buf.first().copied())
    }

    #[inline]
    fn bump(&mut self) {
        self.rdr.consume(1);
        self.offset += 1;
    }

    fn next_byte(&mut self) -> Result<u8> {
        match self.peek()? {
            Some(b) => {
                self.bump();
                Ok(b)
            }
            None => Err(self.eof_error()),
        }
    }

    fn skip_ws(&mut self) -> Result<()> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.bump();
        }
        Ok(())
    }

    fn eof_error(&self) -> anyhow::Error {
        anyhow!("unexpected end of JSON input at byte {}", self.offset)
    }

    fn unexpected(&self, b: u8, wanted: &str) -> anyhow::Error {
        anyhow!(
            "invalid character {:?} at byte {}: expected {}",
            b as char,
            self.offset,
            wanted
        )
    }

    // ----------------------------- Structure -------------------------------------

    fn set_step(&mut self, step: Step) {
        if let Some(f) = self.stack.last_mut() {
            f.step = step;
        }
    }

    fn after_value(&mut self) {
        self.set_step(Step::CommaOrEnd);
    }

    fn close(&mut self) {
        self.stack.pop();
        self.after_value();
    }

    // ----------------------------- Tokens ----------------------------------------

    /// Next token, or `None` once input runs out between tokens. Input that stops with
    /// containers still open is reported the same way; `depth()` tells the two apart.
    /// Running out in the middle of a token is an error.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            self.skip_ws()?;
            let Some(b) = self.peek()? else {
                return Ok(None);
            };
            let top = self.stack.last().map(|f| (f.kind, f.step));
            match top {
                None | Some((_, Step::Value)) => return self.value_token(b).map(Some),
                Some((_, Step::ValueOrEnd)) => {
                    if b == b']' {
                        self.bump();
                        self.close();
                        return Ok(Some(Token::EndArray));
                    }
                    return self.value_token(b).map(Some);
                }
                Some((_, step @ (Step::KeyOrEnd | Step::Key))) => {
                    if b == b'}' && step == Step::KeyOrEnd {
                        self.bump();
                        self.close();
                        return Ok(Some(Token::EndObject));
                    }
                    if b != b'"' {
                        return Err(self.unexpected(b, "object key"));
                    }
                    let key = self.read_string()?;
                    self.set_step(Step::Colon);
                    return Ok(Some(Token::Key(key)));
                }
                Some((_, Step::Colon)) => {
                    if b != b':' {
                        return Err(self.unexpected(b, "':' after object key"));
                    }
                    self.bump();
                    self.set_step(Step::Value);
                }
                Some((kind, Step::CommaOrEnd)) => match (b, kind) {
                    (b',', Container::Object) => {
                        self.bump();
                        self.set_step(Step::Key);
                    }
                    (b',', Container::Array) => {
                        self.bump();
                        self.set_step(Step::Value);
                    }
                    (b'}', Container::Object) => {
                        self.bump();
                        self.close();
                        return Ok(Some(Token::EndObject));
                    }
                    (b']', Container::Array) => {
                        self.bump();
                        self.close();
                        return Ok(Some(Token::EndArray));
                    }
                    _ => return Err(self.unexpected(b, "',' or end of container")),
                },
            }
        }
    }

    fn value_token(&mut self, b: u8) -> Result<Token> {
        match b {
            b'{' => {
                self.bump();
                self.stack.push(Frame { kind: Container::Object, step: Step::KeyOrEnd });
                Ok(Token::BeginObject)
            }
            b'[' => {
                self.bump();
                self.stack.push(Frame { kind: Container::Array, step: Step::ValueOrEnd });
                Ok(Token::BeginArray)
            }
            b'"' => {
                let s = self.read_string()?;
                self.after_value();
                Ok(Token::Str(s))
            }
            b't' | b'f' | b'n' => {
                let mut word = Vec::with_capacity(5);
                self.capture_scalar(&mut word)?;
                let tok = match word.as_slice() {
                    b"true" => Token::Bool(true),
                    b"false" => Token::Bool(false),
                    b"null" => Token::Null,
                    other => bail!(
                        "invalid literal {:?} ending at byte {}",
                        String::from_utf8_lossy(other),
                        self.offset
                    ),
                };
                self.after_value();
                Ok(tok)
            }
            b'-' | b'0'..=b'9' => {
                let mut num = Vec::with_capacity(16);
                self.capture_scalar(&mut num)?;
                serde_json::from_slice::<serde_json::Number>(&num)
                    .with_context(|| format!("invalid number ending at byte {}", self.offset))?;
                self.after_value();
                Ok(Token::Number(String::from_utf8_lossy(&num).into_owned()))
            }
            other => Err(self.unexpected(other, "value")),
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let mut raw = Vec::with_capacity(32);
        self.capture_string(&mut raw)?;
        serde_json::from_slice::<String>(&raw)
            .with_context(|| format!("invalid string ending at byte {}", self.offset))
    }

    // ----------------------------- Raw capture -----------------------------------

    /// Copy one string literal (quotes and escapes intact) into `out`.
    fn capture_string(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let first = self.next_byte()?;
        if first != b'"' {
            return Err(self.unexpected(first, "'\"'"));
        }
        out.push(first);
        loop {
            let b = self.next_byte()?;
            out.push(b);
            match b {
                b'\\' => out.push(self.next_byte()?),
                b'"' => return Ok(()),
                _ => {}
            }
        }
    }

    /// Copy a bare scalar (number or literal) up to the next delimiter.
    fn capture_scalar(&mut self, out: &mut Vec<u8>) -> Result<()> {
        while let Some(b) = self.peek()? {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b']' | b'}' | b'[' | b'{' | b'"') {
                break;
            }
            out.push(b);
            self.bump();
        }
        if out.is_empty() {
            return Err(self.eof_error());
        }
        Ok(())
    }

    /// Copy one complete value of any shape into `out`. Bracket balance is tracked;
    /// full validation is left to serde_json.
    fn capture_value(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.skip_ws()?;
        let Some(first) = self.peek()? else { return Err(self.eof_error()) };
        match first {
            b'"' => self.capture_string(out),
            b'{' | b'[' => {
                let mut depth = 0usize;
                loop {
                    let Some(b) = self.peek()? else { return Err(self.eof_error()) };
                    match b {
                        b'"' => self.capture_string(out)?,
                        b'{' | b'[' => {
                            depth += 1;
                            out.push(b);
                            self.bump();
                        }
                        b'}' | b']' => {
                            out.push(b);
                            self.bump();
                            depth -= 1;
                            if depth == 0 {
                                return Ok(());
                            }
                        }
                        _ => {
                            out.push(b);
                            self.bump();
                        }
                    }
                }
            }
            b'}' | b']' | b',' | b':' => Err(self.unexpected(first, "value")),
            _ => self.capture_scalar(out),
        }
    }

    /// Consume the separator that precedes a value (':' after a key, ',' between
    /// array elements) so the reader sits on the value itself.
    fn prepare_value(&mut self) -> Result<()> {
        self.skip_ws()?;
        let top = self.stack.last().map(|f| (f.kind, f.step));
        match top {
            None | Some((_, Step::Value)) => Ok(()),
            Some((_, Step::ValueOrEnd)) => match self.peek()? {
                Some(b']') => Err(anyhow!("no value to decode at byte {}: array is empty", self.offset)),
                _ => Ok(()),
            },
            Some((_, Step::Colon)) => {
                let b = self.next_byte()?;
                if b != b':' {
                    return Err(self.unexpected(b, "':' after object key"));
                }
                self.set_step(Step::Value);
                Ok(())
            }
            Some((Container::Array, Step::CommaOrEnd)) => {
                let b = self.next_byte()?;
                if b != b',' {
                    return Err(self.unexpected(b, "',' between array elements"));
                }
                self.set_step(Step::Value);
                Ok(())
            }
            Some(_) => Err(anyhow!("cannot decode a value at byte {}: an object key comes next", self.offset)),
        }
    }

    /// Decode the next complete value into `T`. The reader advances past the value even
    /// when `T` rejects it, so a failure here never leaves the tokenizer mid-value.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.prepare_value()?;
        let start = self.offset;
        let mut raw = std::mem::take(&mut self.scratch);
        raw.clear();
        let captured = self.capture_value(&mut raw);
        if captured.is_ok() {
            self.after_value();
        }
        let decoded = captured.and_then(|_| {
            serde_json::from_slice::<T>(&raw).with_context(|| format!("decode value at byte {start}"))
        });
        self.scratch = raw;
        decoded
    }

    /// True when another element or member follows in the current container.
    pub fn more(&mut self) -> Result<bool> {
        self.skip_ws()?;
        let next = self.peek()?;
        if let Some(b',') = next {
            return Ok(true);
        }
        Ok(!matches!(next, None | Some(b']') | Some(b'}')))
    }

    /// Walk forward until the object key `key` has just been read, at any depth.
    /// Returns `false` if input ends first.
    pub fn seek_key(&mut self, key: &str) -> Result<bool> {
        while let Some(tok) = self.next_token()? {
            if matches!(&tok, Token::Key(k) if k == key) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
