use std::str::{FromStr, SplitAsciiWhitespace};

use anyhow::{Context, Result};

/// Whitespace-separated token reader over a judge input.
pub struct Scanner<'a> {
    tokens: SplitAsciiWhitespace<'a>,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_ascii_whitespace(),
            position: 0,
        }
    }

    pub fn value<T>(&mut self) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.position += 1;
        let token = self
            .tokens
            .next()
            .with_context(|| format!("unexpected end of input at token {}", self.position))?;
        token
            .parse()
            .with_context(|| format!("malformed token {token:?} at position {}", self.position))
    }
}
