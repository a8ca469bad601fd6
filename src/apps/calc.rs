//! Arithmetic expression evaluator for the calculator.
//!
//! Recursive descent over decimal literals and the four binary operators
//! with standard precedence. Unary plus/minus is accepted (so "+5" and
//! "5++3" evaluate the way the keypad allows them to be typed); anything
//! else is an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("malformed number")]
    BadNumber,
    #[error("trailing input after expression")]
    TrailingInput,
    #[error("misplaced operator")]
    MisplacedOperator,
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '0'..='9' | '.' => {
                let mut text = String::new();
                let mut seen_dot = false;
                while let Some(&c) = chars.peek() {
                    match c {
                        '0'..='9' => {
                            text.push(c);
                            chars.next();
                        }
                        '.' if !seen_dot => {
                            seen_dot = true;
                            text.push(c);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if !text.chars().any(|c| c.is_ascii_digit()) {
                    return Err(CalcError::BadNumber);
                }
                let value: f64 = text.parse().map_err(|_| CalcError::BadNumber)?;
                tokens.push(Token::Number(value));
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Star => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // unary := ('+' | '-')* number
    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Plus) => self.unary(),
            Some(Token::Minus) => Ok(-self.unary()?),
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Star) | Some(Token::Slash) => Err(CalcError::MisplacedOperator),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(CalcError::TrailingInput);
    }
    Ok(value)
}

/// Stringify a result so it can be fed back in as the left operand of the
/// next computation. Integral values render without a fraction.
pub fn format_result(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_precedence() {
        assert_eq!(evaluate("2+3*4"), Ok(14.0));
        assert_eq!(evaluate("2*3+4"), Ok(10.0));
        assert_eq!(evaluate("10-4/2"), Ok(8.0));
    }

    #[test]
    fn left_associative_chains() {
        assert_eq!(evaluate("10-3-2"), Ok(5.0));
        assert_eq!(evaluate("100/5/2"), Ok(10.0));
    }

    #[test]
    fn decimals() {
        assert_eq!(evaluate("1.5+2.25"), Ok(3.75));
        assert_eq!(evaluate("5/2"), Ok(2.5));
        assert_eq!(evaluate(".5*4"), Ok(2.0));
        assert_eq!(evaluate("2."), Ok(2.0));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("+5"), Ok(5.0));
        assert_eq!(evaluate("-5"), Ok(-5.0));
        assert_eq!(evaluate("5++3"), Ok(8.0));
        assert_eq!(evaluate("5+-3"), Ok(2.0));
        assert_eq!(evaluate("-6+2"), Ok(-4.0));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("5/0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("1/0.0"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(evaluate("3+"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("."), Err(CalcError::BadNumber));
        assert_eq!(evaluate("1..2"), Err(CalcError::TrailingInput));
        assert_eq!(evaluate("5*"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("*5"), Err(CalcError::MisplacedOperator));
        assert_eq!(evaluate("2+3x"), Err(CalcError::UnexpectedChar('x')));
    }

    #[test]
    fn result_formatting() {
        assert_eq!(format_result(14.0), "14");
        assert_eq!(format_result(2.5), "2.5");
        assert_eq!(format_result(-6.0), "-6");
        assert_eq!(format_result(0.0), "0");
    }
}
