//! Utility functions shared by the binaries and workloads.
//!

use anyhow::Result;
use bytes::Bytes;
use tracing_subscriber::EnvFilter;

/// Serialize auxiliary workload arguments so they can be handed to the
/// application functions.
pub fn encode_args(args: &[String]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(args)?))
}

/// Inverse of [`encode_args`]. Empty `aux` means no arguments.
pub fn decode_args(aux: &Bytes) -> Result<Vec<String>> {
    if aux.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(aux)?)
}

/// Install a `tracing` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_survive_encoding() {
        let args = vec!["--term".to_string(), "two words".to_string()];
        let aux = encode_args(&args).unwrap();
        assert_eq!(decode_args(&aux).unwrap(), args);
    }

    #[test]
    fn empty_aux_means_no_args() {
        assert!(decode_args(&Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn garbage_aux_is_an_error() {
        assert!(decode_args(&Bytes::from_static(b"{")).is_err());
    }
}
