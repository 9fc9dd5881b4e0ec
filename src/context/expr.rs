//! Expression evaluator
//!
//! A recursive-descent evaluator over flattened expression text. Precedence,
//! lowest first:
//!
//! ```text
//! or  ||            a or b
//! and &&            a and b
//! not !             not a
//! == != < <= > >=   comparisons, chainable
//! + -
//! * / // %
//! unary - +
//! primary           literals, [lists], range(..), len(..), (expr), identifiers
//! ```
//!
//! Identifiers still present after flattening are undefined and evaluate to
//! their own name as a string.
//!
//! `and` and `or` short-circuit: an operand that cannot change the result is
//! parsed but never evaluated, so it cannot fail.

use super::value::Value;
use crate::error::PrologueError;

/// Largest number of values `range()` may produce
pub const MAX_RANGE_LEN: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

const OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "//", "<", ">", "+", "-", "*", "/", "%", "!",
];

/// Evaluate flattened expression text
pub fn evaluate(text: &str) -> Result<Value, PrologueError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(PrologueError::Expression(format!(
            "Empty expression '{}'",
            text
        )));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        text,
        live: true,
    };
    let value = parser.or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("Unexpected trailing input"));
    }
    Ok(value)
}

fn tokenize(text: &str) -> Result<Vec<Token>, PrologueError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut idx = 0;

    'outer: while idx < chars.len() {
        let c = chars[idx];
        if c.is_whitespace() {
            idx += 1;
            continue;
        }
        match c {
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            ',' => tokens.push(Token::Comma),
            '"' | '\'' => {
                let start = idx + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == c)
                    .map(|offset| start + offset)
                    .ok_or_else(|| {
                        PrologueError::Expression(format!(
                            "Unterminated string literal in '{}'",
                            text
                        ))
                    })?;
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                idx = end + 1;
                continue;
            }
            _ if c.is_ascii_digit()
                || (c == '.' && chars.get(idx + 1).map_or(false, |n| n.is_ascii_digit())) =>
            {
                let start = idx;
                while idx < chars.len()
                    && (chars[idx].is_ascii_alphanumeric() || matches!(chars[idx], '.' | '_'))
                {
                    // exponent sign
                    if (chars[idx] == 'e' || chars[idx] == 'E')
                        && matches!(chars.get(idx + 1), Some('+') | Some('-'))
                    {
                        idx += 1;
                    }
                    idx += 1;
                }
                let literal: String = chars[start..idx].iter().filter(|&&ch| ch != '_').collect();
                tokens.push(number(&literal, text)?);
                continue;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = idx;
                while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_') {
                    idx += 1;
                }
                tokens.push(Token::Ident(chars[start..idx].iter().collect()));
                continue;
            }
            _ => {
                for op in OPERATORS {
                    let width = op.chars().count();
                    if chars[idx..].iter().take(width).copied().eq(op.chars()) {
                        tokens.push(Token::Op(op));
                        idx += width;
                        continue 'outer;
                    }
                }
                return Err(PrologueError::Expression(format!(
                    "Unexpected character '{}' in expression '{}'",
                    c, text
                )));
            }
        }
        idx += 1;
    }
    Ok(tokens)
}

fn number(literal: &str, text: &str) -> Result<Token, PrologueError> {
    let invalid = || {
        PrologueError::Expression(format!(
            "Invalid numeric literal '{}' in expression '{}'",
            literal, text
        ))
    };
    let lower = literal.to_ascii_lowercase();
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix));
    if let Some((prefix, radix)) = radix {
        return i64::from_str_radix(&lower[prefix.len()..], *radix)
            .map(Token::Int)
            .map_err(|_| invalid());
    }
    if let Ok(value) = literal.parse::<i64>() {
        return Ok(Token::Int(value));
    }
    literal.parse::<f64>().map(Token::Float).map_err(|_| invalid())
}

struct Parser<'t> {
    tokens: Vec<Token>,
    pos: usize,
    text: &'t str,
    /// Cleared while parsing an operand whose value is already decided
    live: bool,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: &str) -> PrologueError {
        PrologueError::Expression(format!("{} in expression '{}'", message, self.text))
    }

    fn expect(&mut self, token: Token) -> Result<(), PrologueError> {
        match self.advance() {
            Some(found) if found == token => Ok(()),
            _ => Err(self.error(&format!("Expected {:?}", token))),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    fn is_op(&self, op: &str) -> bool {
        matches!(self.peek(), Some(Token::Op(found)) if *found == op)
    }

    /// Parse with `rule`, evaluating only if `decided` is false
    fn operand(
        &mut self,
        decided: bool,
        rule: fn(&mut Self) -> Result<Value, PrologueError>,
    ) -> Result<Value, PrologueError> {
        let live = self.live;
        self.live = live && !decided;
        let value = rule(self);
        self.live = live;
        value
    }

    /// Run `op` when evaluating; a placeholder stands in for skipped operands
    fn apply<F>(&self, op: F) -> Result<Value, PrologueError>
    where
        F: FnOnce() -> Result<Value, PrologueError>,
    {
        if self.live {
            op()
        } else {
            Ok(Value::Bool(false))
        }
    }

    fn or(&mut self) -> Result<Value, PrologueError> {
        let mut lhs = self.and()?;
        while self.is_keyword("or") || self.is_op("||") {
            self.advance();
            let decided = lhs.truthy();
            let rhs = self.operand(decided, Self::and)?;
            if !decided {
                lhs = rhs;
            }
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Value, PrologueError> {
        let mut lhs = self.not()?;
        while self.is_keyword("and") || self.is_op("&&") {
            self.advance();
            let decided = !lhs.truthy();
            let rhs = self.operand(decided, Self::not)?;
            if !decided {
                lhs = rhs;
            }
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Value, PrologueError> {
        if self.is_keyword("not") || self.is_op("!") {
            self.advance();
            let value = self.not()?;
            return Ok(Value::Bool(!value.truthy()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value, PrologueError> {
        let mut lhs = self.additive()?;
        let mut result: Option<bool> = None;
        loop {
            let op = match self.peek() {
                Some(Token::Op(op)) if matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=") => {
                    *op
                }
                _ => break,
            };
            self.advance();
            let rhs = self.additive()?;
            let holds = match op {
                _ if !self.live => false,
                "==" => lhs.loose_eq(&rhs),
                "!=" => !lhs.loose_eq(&rhs),
                "<" => lhs.compare(&rhs, op)?.is_lt(),
                "<=" => lhs.compare(&rhs, op)?.is_le(),
                ">" => lhs.compare(&rhs, op)?.is_gt(),
                _ => lhs.compare(&rhs, op)?.is_ge(),
            };
            result = Some(result.unwrap_or(true) && holds);
            lhs = rhs;
        }
        Ok(match result {
            Some(flag) => Value::Bool(flag),
            None => lhs,
        })
    }

    fn additive(&mut self) -> Result<Value, PrologueError> {
        let mut lhs = self.term()?;
        loop {
            if self.is_op("+") {
                self.advance();
                let rhs = self.term()?;
                lhs = self.apply(|| lhs.add(&rhs))?;
            } else if self.is_op("-") {
                self.advance();
                let rhs = self.term()?;
                lhs = self.apply(|| lhs.sub(&rhs))?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> Result<Value, PrologueError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op(op)) if matches!(*op, "*" | "/" | "//" | "%") => *op,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = self.apply(|| match op {
                "*" => lhs.mul(&rhs),
                "/" => lhs.div(&rhs),
                "//" => lhs.floor_div(&rhs),
                _ => lhs.rem(&rhs),
            })?;
        }
    }

    fn unary(&mut self) -> Result<Value, PrologueError> {
        if self.is_op("-") {
            self.advance();
            let value = self.unary()?;
            return self.apply(|| value.neg());
        }
        if self.is_op("+") {
            self.advance();
            let value = self.unary()?;
            return self.apply(|| value.pos());
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, PrologueError> {
        match self.advance() {
            Some(Token::Int(number)) => Ok(Value::Int(number)),
            Some(Token::Float(number)) => Ok(Value::Float(number)),
            Some(Token::Str(text)) => Ok(Value::Str(text)),
            Some(Token::LParen) => {
                let value = self.or()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::LBracket) => Ok(Value::List(self.items(Token::RBracket)?)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" | "True" => Ok(Value::Bool(true)),
                "false" | "False" => Ok(Value::Bool(false)),
                "range" if self.peek() == Some(&Token::LParen) => {
                    self.advance();
                    let args = self.items(Token::RParen)?;
                    self.apply(|| self.range(&args))
                }
                "len" if self.peek() == Some(&Token::LParen) => {
                    self.advance();
                    let args = self.items(Token::RParen)?;
                    self.apply(|| match args.as_slice() {
                        [Value::Str(text)] => Ok(Value::Int(text.chars().count() as i64)),
                        [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
                        [other] => Err(self.error(&format!(
                            "Object of type {} has no len()",
                            other.type_name()
                        ))),
                        _ => Err(self.error("len() takes exactly one argument")),
                    })
                }
                _ => Ok(Value::Str(name)),
            },
            _ => Err(self.error("Unexpected token")),
        }
    }

    /// Comma separated values up to `close`, allowing a trailing comma
    fn items(&mut self, close: Token) -> Result<Vec<Value>, PrologueError> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&close) {
                self.advance();
                return Ok(items);
            }
            items.push(self.or()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(token) if token == close => return Ok(items),
                _ => return Err(self.error("Expected ',' or closing bracket")),
            }
        }
    }

    fn range(&self, args: &[Value]) -> Result<Value, PrologueError> {
        let ints = args
            .iter()
            .map(|arg| match arg {
                Value::Int(number) => Ok(*number),
                Value::Bool(flag) => Ok(*flag as i64),
                other => Err(self.error(&format!(
                    "range() arguments must be integers, not {}",
                    other.type_name()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (start, stop, step) = match ints.as_slice() {
            [stop] => (0, *stop, 1),
            [start, stop] => (*start, *stop, 1),
            [start, stop, step] => (*start, *stop, *step),
            _ => return Err(self.error("range() expects one to three arguments")),
        };
        if step == 0 {
            return Err(self.error("range() step must not be zero"));
        }
        let span = if step > 0 {
            i128::from(stop) - i128::from(start)
        } else {
            i128::from(start) - i128::from(stop)
        };
        let step_size = i128::from(step).abs();
        let count = if span > 0 { (span + step_size - 1) / step_size } else { 0 };
        if count > i128::from(MAX_RANGE_LEN) {
            return Err(PrologueError::Limit(format!(
                "range() would produce {} values, more than the limit of {}",
                count, MAX_RANGE_LEN
            )));
        }
        let mut values = Vec::with_capacity(count as usize);
        let mut current = start;
        while (step > 0 && current < stop) || (step < 0 && current > stop) {
            values.push(Value::Int(current));
            current = match current.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(Value::List(values))
    }
}
