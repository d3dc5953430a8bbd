//! Arithmetic expression engine
//!
//! Tokenize -> shunting-yard -> RPN evaluation. Supports the four basic
//! operators, parentheses, unary minus, and decimal literals. Malformed
//! input is rejected with a typed error rather than a best-effort guess.

use thiserror::Error;

/// Errors produced while parsing or evaluating an expression.
#[derive(Debug, Error, PartialEq)]
pub enum ArithError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("malformed number literal '{0}'")]
    BadNumber(String),
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("malformed expression")]
    Malformed,
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(Op),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    /// Unary minus, rewritten from `-` in prefix position.
    Neg,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Neg => 3,
        }
    }

    fn right_associative(self) -> bool {
        matches!(self, Op::Neg)
    }
}

/// Evaluate an arithmetic expression string.
pub fn evaluate(expr: &str) -> Result<f64, ArithError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ArithError::Empty);
    }
    let rpn = to_rpn(&tokens)?;
    eval_rpn(&rpn)
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ArithError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ArithError::BadNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            '+' => {
                chars.next();
                // A '+' in prefix position is a no-op sign.
                if !prefix_position(&tokens) {
                    tokens.push(Token::Op(Op::Add));
                }
            }
            '-' => {
                chars.next();
                if prefix_position(&tokens) {
                    tokens.push(Token::Op(Op::Neg));
                } else {
                    tokens.push(Token::Op(Op::Sub));
                }
            }
            '*' => {
                chars.next();
                tokens.push(Token::Op(Op::Mul));
            }
            '/' => {
                chars.next();
                tokens.push(Token::Op(Op::Div));
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(ArithError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Whether the next `-`/`+` acts as a sign rather than a binary operator:
/// at the start of the expression, after another operator, or after `(`.
fn prefix_position(tokens: &[Token]) -> bool {
    match tokens.last() {
        None => true,
        Some(Token::Op(_)) | Some(Token::LParen) => true,
        Some(Token::Number(_)) | Some(Token::RParen) => false,
    }
}

fn to_rpn(tokens: &[Token]) -> Result<Vec<Token>, ArithError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = stack.last() {
                    let pops = if op.right_associative() {
                        top.precedence() > op.precedence()
                    } else {
                        top.precedence() >= op.precedence()
                    };
                    if pops {
                        stack.pop();
                        output.push(Token::Op(top));
                    } else {
                        break;
                    }
                }
                stack.push(token);
            }
            Token::LParen => stack.push(token),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Token::LParen) => break,
                    Some(op @ Token::Op(_)) => output.push(op),
                    _ => return Err(ArithError::UnbalancedParens),
                }
            },
        }
    }

    while let Some(token) = stack.pop() {
        match token {
            Token::Op(_) => output.push(token),
            Token::LParen => return Err(ArithError::UnbalancedParens),
            _ => return Err(ArithError::Malformed),
        }
    }

    Ok(output)
}

fn eval_rpn(rpn: &[Token]) -> Result<f64, ArithError> {
    let mut stack: Vec<f64> = Vec::new();

    for &token in rpn {
        match token {
            Token::Number(value) => stack.push(value),
            Token::Op(Op::Neg) => {
                let value = stack.pop().ok_or(ArithError::Malformed)?;
                stack.push(-value);
            }
            Token::Op(op) => {
                let rhs = stack.pop().ok_or(ArithError::Malformed)?;
                let lhs = stack.pop().ok_or(ArithError::Malformed)?;
                let value = match op {
                    Op::Add => lhs + rhs,
                    Op::Sub => lhs - rhs,
                    Op::Mul => lhs * rhs,
                    Op::Div => {
                        if rhs == 0.0 {
                            return Err(ArithError::DivisionByZero);
                        }
                        lhs / rhs
                    }
                    Op::Neg => unreachable!(),
                };
                stack.push(value);
            }
            _ => return Err(ArithError::Malformed),
        }
    }

    if stack.len() == 1 {
        Ok(stack[0])
    } else {
        Err(ArithError::Malformed)
    }
}
