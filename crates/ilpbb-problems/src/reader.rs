use std::str::{FromStr, SplitWhitespace};

use ilpbb_solver::ProblemError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstanceError {
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number: expected {expected}, found '{found}' at token {position}")]
    InvalidNumber {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("Missing header: {0}")]
    MissingHeader(String),
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Model error: {0}")]
    Model(#[from] ProblemError),
}

/// Whitespace-separated token stream over an instance file.
///
/// Benchmark files wrap long rows across lines, so readers consume values
/// by count rather than by line.
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: source.split_whitespace(),
            position: 0,
        }
    }

    /// Next raw token.
    pub fn next_token(&mut self, expected: &str) -> Result<&'a str, InstanceError> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| InstanceError::UnexpectedEof(expected.to_string()))?;
        self.position += 1;
        Ok(token)
    }

    /// Next token parsed as `T`.
    pub fn parse<T: FromStr>(&mut self, expected: &str) -> Result<T, InstanceError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| InstanceError::InvalidNumber {
            expected: expected.to_string(),
            found: token.to_string(),
            position: self.position,
        })
    }

    /// Next `count` tokens parsed as `f64`.
    pub fn floats(&mut self, count: usize, expected: &str) -> Result<Vec<f64>, InstanceError> {
        (0..count).map(|_| self.parse(expected)).collect()
    }

    /// Next `rows * cols` tokens as a row-major matrix.
    pub fn matrix(&mut self, rows: usize, cols: usize, expected: &str) -> Result<Vec<Vec<f64>>, InstanceError> {
        (0..rows).map(|_| self.floats(cols, expected)).collect()
    }

    /// Tokens consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }
}
