//! Request parsing.
//!
//! A request artifact is UTF-8 text of the form `{sessionId}|{mode}|{message}`.
//! The message payload may itself contain `|`, so everything after the second
//! separator is rejoined verbatim.

use crate::error::ParseError;

/// Field separator for request artifacts.
pub const FIELD_SEPARATOR: &str = "|";

/// A parsed delivery request.
///
/// Lives for one pipeline run only; never persisted. The session id is an
/// opaque correlation string and is not validated against a live session.
/// The mode is kept as the raw string here; it is resolved to a [`Mode`]
/// at dispatch so an unrecognized value is a terminal outcome, not a parse
/// failure.
///
/// [`Mode`]: crate::dispatch::Mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub session_id: String,
    pub mode: String,
    pub message: String,
}

impl Request {
    /// Session id truncated for logging and acknowledgement notes.
    pub fn short_session_id(&self) -> &str {
        let end = self
            .session_id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.session_id.len());
        &self.session_id[..end]
    }
}

/// Parse raw artifact text into a [`Request`].
///
/// The whole input is trimmed before splitting; the message is taken
/// verbatim (no per-field trimming).
pub fn parse_request(raw: &str) -> Result<Request, ParseError> {
    let trimmed = raw.trim();
    let segments: Vec<&str> = trimmed.split(FIELD_SEPARATOR).collect();

    if segments.len() < 3 {
        return Err(ParseError::MalformedSegmentCount {
            segments: segments.len(),
        });
    }

    let session_id = segments[0];
    let mode = segments[1];
    let message = segments[2..].join(FIELD_SEPARATOR);

    let mut empty = Vec::new();
    if session_id.is_empty() {
        empty.push("sessionId");
    }
    if mode.is_empty() {
        empty.push("mode");
    }
    if message.is_empty() {
        empty.push("message");
    }
    if !empty.is_empty() {
        return Err(ParseError::EmptyField { fields: empty });
    }

    Ok(Request {
        session_id: session_id.to_string(),
        mode: mode.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_request() {
        let req = parse_request("sess-1|send|hello there").unwrap();
        assert_eq!(req.session_id, "sess-1");
        assert_eq!(req.mode, "send");
        assert_eq!(req.message, "hello there");
    }

    #[test]
    fn message_rejoins_extra_separators() {
        let req = parse_request("abc|send|hello|world").unwrap();
        assert_eq!(req.session_id, "abc");
        assert_eq!(req.mode, "send");
        assert_eq!(req.message, "hello|world");
    }

    #[test]
    fn two_segments_is_malformed() {
        let err = parse_request("abc|send").unwrap_err();
        match err {
            ParseError::MalformedSegmentCount { segments } => assert_eq!(segments, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = parse_request("").unwrap_err();
        match err {
            ParseError::MalformedSegmentCount { segments } => assert_eq!(segments, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_session_id_reported() {
        let err = parse_request("|send|hi").unwrap_err();
        match err {
            ParseError::EmptyField { fields } => assert_eq!(fields, vec!["sessionId"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_empty_fields_reported_together() {
        let err = parse_request("||").unwrap_err();
        match err {
            ParseError::EmptyField { fields } => {
                assert_eq!(fields, vec!["sessionId", "mode", "message"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn whole_input_is_trimmed() {
        let req = parse_request("  abc|send|hi  \n").unwrap();
        assert_eq!(req.session_id, "abc");
        assert_eq!(req.message, "hi");
    }

    #[test]
    fn message_whitespace_kept_verbatim() {
        // Only the outer edges of the whole input are trimmed.
        let req = parse_request("abc|send| padded ").unwrap();
        assert_eq!(req.message, " padded");
    }

    #[test]
    fn unknown_mode_still_parses() {
        // Mode value validation happens at dispatch, not here.
        let req = parse_request("abc|frobnicate|hi").unwrap();
        assert_eq!(req.mode, "frobnicate");
    }

    #[test]
    fn short_session_id_truncates_to_eight() {
        let req = parse_request("abcdefghijkl|send|hi").unwrap();
        assert_eq!(req.short_session_id(), "abcdefgh");
    }

    #[test]
    fn short_session_id_handles_short_ids() {
        let req = parse_request("abc|send|hi").unwrap();
        assert_eq!(req.short_session_id(), "abc");
    }
}
