//! Session protocol
//!
//! Newline-delimited JSON: one request per input line, one response per
//! output line. Lines are trimmed; blank lines are ignored by the session.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

mod messages;
pub use messages::{Request, Response};

use crate::constants::session::MAX_REQUEST_LEN;

/// Serialize a message as a single line (without the trailing newline)
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).context("Failed to serialize message to JSON")
}

/// Decode one request line
pub fn decode_request(line: &str) -> Result<Request> {
    // Sanity check (reject absurdly long lines before parsing)
    if line.len() > MAX_REQUEST_LEN {
        return Err(anyhow!("Request too large: {} bytes (max: {})", line.len(), MAX_REQUEST_LEN));
    }
    serde_json::from_str(line.trim()).context("Failed to deserialize request from JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_decode_set_value() {
        let request = decode_request(r#"{"SetValue":{"name":"radius","value":10}}"#).unwrap();
        match request {
            Request::SetValue { name, value } => {
                assert_eq!(name, "radius");
                assert_eq!(value, Value::Number(10.0));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unit_variants() {
        assert!(matches!(decode_request(r#""Reset""#).unwrap(), Request::Reset));
        assert!(matches!(decode_request(" \"Ping\" \n").unwrap(), Request::Ping));
        assert!(matches!(decode_request(r#""Shutdown""#).unwrap(), Request::Shutdown));
    }

    #[test]
    fn test_decode_load_schema() {
        let request =
            decode_request(r#"{"LoadSchema":[{"name":"gap","type":"slider","property":"--gap","unit":"px"}]}"#).unwrap();
        match request {
            Request::LoadSchema(options) => assert_eq!(options[0].name, "gap"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_decode_sources_with_defaults() {
        let request = decode_request(r#"{"SetSources":{"prefix_css":".a { margin: 0; }","hide_prefix":true}}"#).unwrap();
        match request {
            Request::SetSources(sources) => {
                assert_eq!(sources.scope_selector, ":root");
                assert!(sources.hide_prefix);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_decode_errors() {
        assert!(decode_request("").is_err());
        assert!(decode_request(r#"{"Explode":{}}"#).is_err());
        let huge = format!("\"{}\"", "x".repeat(MAX_REQUEST_LEN));
        let err = decode_request(&huge).unwrap_err();
        assert!(err.to_string().contains("Request too large"));
    }

    #[test]
    fn test_encode_response_is_single_line() {
        let line = encode_line(&Response::HighlightsExpired {
            lines: vec![1],
            remaining: vec![],
        })
        .unwrap();
        assert_eq!(line, r#"{"HighlightsExpired":{"lines":[1],"remaining":[]}}"#);
        assert!(!encode_line(&Response::Error("a\nb".to_string())).unwrap().contains('\n'));
    }
}
