//! A MapReduce-compatible implementation of `grep`.
//!
//! Output is keyed by file name; the value lists every matching line of
//! that file, prefixed with its line number.

use crate::*;
use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use itertools::Itertools;

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    #[clap(short, long, value_parser)]
    term: String,
}

fn parse_args(aux: &Bytes) -> Result<Args> {
    Ok(Args::try_parse_from(utils::decode_args(aux)?)?)
}

pub fn map(filename: &str, contents: &str, aux: &Bytes) -> Result<Vec<KeyValue>> {
    let term = parse_args(aux)?.term;
    Ok(contents
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(&term))
        .map(|(i, line)| KeyValue::new(filename, format!("{}: {}", i + 1, line)))
        .collect())
}

pub fn reduce(_filename: &str, lines: &[String], _aux: &Bytes) -> Result<String> {
    let mut numbered = Vec::with_capacity(lines.len());
    for line in lines {
        let (no, _) = line
            .split_once(": ")
            .with_context(|| format!("unnumbered line {line:?}"))?;
        numbered.push((no.parse::<u64>()?, line));
    }
    Ok(numbered
        .into_iter()
        .sorted_by_key(|(no, _)| *no)
        .map(|(_, line)| line)
        .join("\n"))
}
