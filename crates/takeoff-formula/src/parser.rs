//! Arithmetic over `+ - * / ( )`, decimal literals, and whitespace.
//!
//! Formulas reach this module only after every `{token}` has been replaced
//! by a number. [`sanitize`] drops anything outside the arithmetic alphabet
//! and [`evaluate_arithmetic`] runs a recursive-descent parser over the rest.
//! Nothing here can execute anything but arithmetic.

use crate::types::FormulaError;

/// Returns `true` for characters the arithmetic parser accepts.
pub fn is_arithmetic_char(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_ascii_whitespace()
        || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Drop every character outside the arithmetic alphabet.
///
/// Returns the cleaned expression and the dropped characters, excluding
/// braces (leftover braces are expected and not worth reporting).
pub fn sanitize(expr: &str) -> (String, String) {
    let mut clean = String::with_capacity(expr.len());
    let mut dropped = String::new();
    for c in expr.chars() {
        if is_arithmetic_char(c) {
            clean.push(c);
        } else if c != '{' && c != '}' {
            dropped.push(c);
        }
    }
    (clean, dropped)
}

/// Evaluate a sanitized arithmetic expression.
///
/// Standard precedence (`*` `/` bind tighter than `+` `-`), left
/// associativity, unary `+`/`-`, and parentheses nested at most
/// `max_nesting` deep. The result may be infinite or NaN (e.g. division by
/// zero); callers decide what to do with that.
pub fn evaluate_arithmetic(expr: &str, max_nesting: usize) -> Result<f64, FormulaError> {
    let mut parser = Parser {
        bytes: expr.as_bytes(),
        pos: 0,
        depth: 0,
        max_nesting,
    };
    parser.skip_ws();
    if parser.at_end() {
        return Err(FormulaError::malformed(0, "empty expression"));
    }
    let value = parser.expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(FormulaError::malformed(
            parser.pos,
            format!("unexpected '{}'", parser.bytes[parser.pos] as char),
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_nesting: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    /// term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    acc /= self.unary()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    /// unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<f64, FormulaError> {
        self.skip_ws();
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                self.nested(|p| p.unary())
            }
            Some(b'-') => {
                self.pos += 1;
                self.nested(|p| p.unary()).map(|v| -v)
            }
            _ => self.primary(),
        }
    }

    /// primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, FormulaError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                let open = self.pos;
                self.pos += 1;
                let value = self.nested(|p| p.expr())?;
                self.skip_ws();
                if self.peek() != Some(b')') {
                    return Err(FormulaError::malformed(open, "unbalanced parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(b) => Err(FormulaError::malformed(
                self.pos,
                format!("expected a number, found '{}'", b as char),
            )),
            None => Err(FormulaError::malformed(self.pos, "missing operand")),
        }
    }

    fn number(&mut self) -> Result<f64, FormulaError> {
        let start = self.pos;
        let mut dots = 0;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' => {
                    dots += 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or(".");
        if dots > 1 || text == "." {
            return Err(FormulaError::malformed(
                start,
                format!("invalid number '{}'", text),
            ));
        }
        text.parse::<f64>()
            .map_err(|_| FormulaError::malformed(start, format!("invalid number '{}'", text)))
    }

    /// Run `f` one nesting level deeper, enforcing `max_nesting`.
    fn nested<F>(&mut self, f: F) -> Result<f64, FormulaError>
    where
        F: FnOnce(&mut Self) -> Result<f64, FormulaError>,
    {
        if self.depth >= self.max_nesting {
            return Err(FormulaError::malformed(
                self.pos,
                format!("nesting deeper than {} levels", self.max_nesting),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
