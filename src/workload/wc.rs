//! A MapReduce-compatible implementation of word count.
//!

use crate::*;
use anyhow::Result;
use bytes::Bytes;

pub fn map(_filename: &str, contents: &str, _aux: &Bytes) -> Result<Vec<KeyValue>> {
    Ok(contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|s| !s.is_empty())
        .map(|word| KeyValue::new(word, "1"))
        .collect())
}

/// Sums the counts recorded for `_word`.
pub fn reduce(_word: &str, counts: &[String], _aux: &Bytes) -> Result<String> {
    let mut total: u64 = 0;
    for count in counts {
        total += count.parse::<u64>()?;
    }
    Ok(total.to_string())
}
