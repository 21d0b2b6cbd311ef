//! # Decode and Roundtrip Subcommands
//!
//! Both read one JSON document, decode it as the named schema and report on
//! the result. Decode failures are printed with their JSON path and exit 1.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use protojson_codec::{ProtoJsonMapper, DEFAULT_MAX_DEPTH};
use protojson_core::CodecError;
use protojson_registry::TypeRegistry;

/// Arguments shared by `protojson decode` and `protojson roundtrip`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Full name of the target schema, e.g. `shop.Order`.
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: String,

    /// Maximum message nesting accepted while decoding.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// JSON input file. Reads standard input when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Outcome of a round trip check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundTrip {
    /// Decode, encode and decode again gave the same message.
    Stable(String),
    /// The second decode differs from the first.
    Diverged {
        /// Encoding of the first decode.
        first: String,
        /// Encoding of the second decode.
        second: String,
    },
}

/// Decode `input` as `type_name` and return the canonical re-encoding.
pub fn decode_canonical(
    mapper: &ProtoJsonMapper<'_>,
    input: &[u8],
    type_name: &str,
) -> Result<String, CodecError> {
    let message = mapper.decode_slice(input, type_name)?;
    Ok(mapper.encode_to_string(&message))
}

/// Decode, encode, decode again and compare.
pub fn round_trip(
    mapper: &ProtoJsonMapper<'_>,
    input: &[u8],
    type_name: &str,
) -> Result<RoundTrip, CodecError> {
    let first = mapper.decode_slice(input, type_name)?;
    let text = mapper.encode_to_string(&first);
    let second = mapper.decode_slice(text.as_bytes(), type_name)?;
    if first == second {
        Ok(RoundTrip::Stable(text))
    } else {
        Ok(RoundTrip::Diverged {
            first: text,
            second: mapper.encode_to_string(&second),
        })
    }
}

/// Execute the decode subcommand.
pub fn run_decode(args: &ConvertArgs, registry: &TypeRegistry) -> Result<u8> {
    let input = crate::read_input(args.input.as_deref())?;
    let mapper = ProtoJsonMapper::new(registry).with_max_depth(args.max_depth);
    match decode_canonical(&mapper, &input, &args.type_name) {
        Ok(text) => {
            println!("{text}");
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}

/// Execute the roundtrip subcommand.
pub fn run_roundtrip(args: &ConvertArgs, registry: &TypeRegistry) -> Result<u8> {
    let input = crate::read_input(args.input.as_deref())?;
    let mapper = ProtoJsonMapper::new(registry).with_max_depth(args.max_depth);
    match round_trip(&mapper, &input, &args.type_name) {
        Ok(RoundTrip::Stable(_)) => {
            println!("OK: {} round trip is stable", args.type_name);
            Ok(0)
        }
        Ok(RoundTrip::Diverged { first, second }) => {
            println!("FAIL: {} round trip diverged", args.type_name);
            println!("first:\n{first}\nsecond:\n{second}");
            Ok(1)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}
