//! An inverted index: for every word, the files it appears in.
//!

use std::collections::HashSet;

use crate::*;
use anyhow::Result;
use bytes::Bytes;
use itertools::Itertools;

pub fn map(filename: &str, contents: &str, _aux: &Bytes) -> Result<Vec<KeyValue>> {
    let mut seen = HashSet::new();
    Ok(contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty() && seen.insert(*w))
        .map(|w| KeyValue::new(w, filename))
        .collect())
}

pub fn reduce(_word: &str, filenames: &[String], _aux: &Bytes) -> Result<String> {
    let files = filenames.iter().sorted().dedup().collect_vec();
    Ok(format!("{} {}", files.len(), files.iter().join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_record_per_distinct_word() {
        let kvs = map("doc", "to be or not to be", &Bytes::new()).unwrap();
        let words: Vec<_> = kvs.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(words, vec!["to", "be", "or", "not"]);
        assert!(kvs.iter().all(|kv| kv.value == "doc"));
    }

    #[test]
    fn lists_files_sorted_and_once() {
        let files = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(reduce("w", &files, &Bytes::new()).unwrap(), "2 a,b");
    }
}
