//! Encoding of shard and output files.
//!
//! A file is a plain concatenation of records. Each record is one JSON
//! object `{"Key":..,"Value":..}` followed by a newline, so it delimits itself and keys or values
//! may hold any character, newlines and quotes included.
//!
//! ```
//! use mrtask::{codec, KeyValue};
//!
//! let mut writer = codec::ShardWriter::new(Vec::new());
//! writer.encode(&KeyValue::new("line\nbreak", "\"quoted\"")).unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! let records = codec::read_all(bytes.as_slice()).unwrap();
//! assert_eq!(records, vec![KeyValue::new("line\nbreak", "\"quoted\"")]);
//! ```

use std::io::{self, BufReader, BufWriter, Read, Write};

use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use thiserror::Error;

use crate::KeyValue;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The stream holds bytes that are not a complete record, for example
    /// the tail of a write that was cut short.
    #[error("record #{record} is malformed: {source}")]
    Malformed {
        record: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Appends records to a byte stream.
pub struct ShardWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> ShardWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            written: 0,
        }
    }

    /// Append one record.
    pub fn encode(&mut self, kv: &KeyValue) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, kv)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records encoded so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered records and return the underlying stream.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

/// Reads records back from a byte stream.
pub struct ShardReader<R: Read> {
    records: StreamDeserializer<'static, IoRead<BufReader<R>>, KeyValue>,
    decoded: usize,
}

impl<R: Read> ShardReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            records: serde_json::Deserializer::from_reader(BufReader::new(inner)).into_iter(),
            decoded: 0,
        }
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. An empty stream is
    /// exhausted from the start.
    pub fn decode(&mut self) -> Result<Option<KeyValue>, CodecError> {
        match self.records.next() {
            None => Ok(None),
            Some(Ok(kv)) => {
                self.decoded += 1;
                Ok(Some(kv))
            }
            Some(Err(e)) if e.is_io() => Err(CodecError::Io(e.into())),
            Some(Err(source)) => Err(CodecError::Malformed {
                record: self.decoded,
                source,
            }),
        }
    }

    /// Number of records decoded so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl<R: Read> Iterator for ShardReader<R> {
    type Item = Result<KeyValue, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode().transpose()
    }
}

/// Decode every record in `reader`.
pub fn read_all<R: Read>(reader: R) -> Result<Vec<KeyValue>, CodecError> {
    ShardReader::new(reader).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(kvs: &[KeyValue]) -> Vec<u8> {
        let mut writer = ShardWriter::new(Vec::new());
        for kv in kvs {
            writer.encode(kv).unwrap();
        }
        assert_eq!(writer.written(), kvs.len());
        writer.into_inner().unwrap()
    }

    #[test]
    fn empty_stream_has_no_records() {
        let mut reader = ShardReader::new(&b""[..]);
        assert!(reader.decode().unwrap().is_none());
        assert!(reader.decode().unwrap().is_none());
    }

    #[test]
    fn awkward_content_survives() {
        let kvs = vec![
            KeyValue::new("", ""),
            KeyValue::new("a\nb", "{\"key\":\"x\"}"),
            KeyValue::new("tab\there", "back\\slash"),
            KeyValue::new("nul\0byte", "ünïcødé ✓"),
            KeyValue::new("}\n{", "\n"),
        ];
        assert_eq!(read_all(encode_all(&kvs).as_slice()).unwrap(), kvs);
    }

    #[test]
    fn one_record_per_line() {
        let bytes = encode_all(&[KeyValue::new("a", "1"), KeyValue::new("b\nc", "2")]);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.lines().next(), Some(r#"{"Key":"a","Value":"1"}"#));
    }

    #[test]
    fn reads_records_written_by_go_workers() {
        // encoding/json output for KeyValue{Key, Value}, one Encode call each.
        let bytes = b"{\"Key\":\"a\",\"Value\":\"1\"}\n{\"Key\":\"b c\",\"Value\":\"\\u003cx\\u003e\"}\n";
        assert_eq!(
            read_all(&bytes[..]).unwrap(),
            vec![KeyValue::new("a", "1"), KeyValue::new("b c", "<x>")]
        );
    }

    #[test]
    fn lowercase_field_names_are_rejected() {
        match read_all(&b"{\"key\":\"a\",\"value\":\"1\"}\n"[..]) {
            Err(CodecError::Malformed { record: 0, .. }) => {}
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_is_malformed_not_eof() {
        let mut bytes = encode_all(&[KeyValue::new("a", "1"), KeyValue::new("b", "2")]);
        bytes.truncate(bytes.len() - 6);

        let mut reader = ShardReader::new(bytes.as_slice());
        assert_eq!(reader.decode().unwrap(), Some(KeyValue::new("a", "1")));
        match reader.decode() {
            Err(CodecError::Malformed { record, .. }) => assert_eq!(record, 1),
            other => panic!("expected malformed record, got {other:?}"),
        }
        assert_eq!(reader.decoded(), 1);
    }

    #[test]
    fn garbage_is_malformed() {
        match read_all(&b"not json\n"[..]) {
            Err(CodecError::Malformed { record: 0, .. }) => {}
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_malformed() {
        match read_all(&b"{\"Key\":\"a\"}\n"[..]) {
            Err(CodecError::Malformed { .. }) => {}
            other => panic!("expected malformed record, got {other:?}"),
        }
    }
}
