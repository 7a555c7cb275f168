//! Operator input parsing.
//!
//! Each line is either the `quit` keyword or exactly three finite real
//! numbers: `<lower> <upper> <tolerance>`.

use quadrant_api::PendingRequest;
use thiserror::Error;

/// Keyword that ends the session.
pub const QUIT_KEYWORD: &str = "quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit(PendingRequest),
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("expected 3 numbers, found {found}")]
    WrongArity { found: usize },
    #[error("'{token}' is not a number")]
    InvalidNumber { token: String },
    #[error("'{token}' is not a finite number")]
    NonFinite { token: String },
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses one raw input line as read from the operator's stream.
pub fn parse_bytes(raw: &[u8]) -> Result<Command, InputError> {
    let line = std::str::from_utf8(raw).map_err(|_| InputError::InvalidEncoding)?;
    parse_line(line)
}

pub fn parse_line(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    if line == QUIT_KEYWORD {
        return Ok(Command::Quit);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [lower, upper, tolerance] = tokens.as_slice() else {
        return Err(InputError::WrongArity { found: tokens.len() });
    };

    Ok(Command::Submit(PendingRequest::new(
        parse_real(lower)?,
        parse_real(upper)?,
        parse_real(tolerance)?,
    )))
}

fn parse_real(token: &str) -> Result<f64, InputError> {
    let value: f64 = token.parse().map_err(|_| InputError::InvalidNumber {
        token: token.to_string(),
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite {
            token: token.to_string(),
        })
    }
}
