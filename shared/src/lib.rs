//! Wire format shared by the relay server and simulator clients.
//!
//! Inbound messages travel as a flat text envelope, `<sessionId>|||<payload>`,
//! posted to [`SEND_PATH`]. Outbound broadcasts are pulled by polling
//! [`EVENTS_PATH`] with a cursor and arrive as a [`PollResponse`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DELIMITER: &str = "|||";
pub const SEND_PATH: &str = "/api/send";
pub const EVENTS_PATH: &str = "/api/events";
pub const DEFAULT_PORT: u16 = 8080;
/// Number of broadcast records the outbound log retains.
pub const LOG_CAPACITY: usize = 500;

pub const JOIN: &str = "JOIN";
pub const EXIT: &str = "EXIT";
pub const MOVE: &str = "MOVE";
pub const ROSTER_PREFIX: &str = ":PLAYERS:";
const ROSTER_NAME: &str = "SimUser";

/// One decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub session_id: String,
    pub payload: String,
}

impl Envelope {
    pub fn new(session_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            payload: payload.into(),
        }
    }

    pub fn command(&self) -> Payload<'_> {
        Payload::classify(&self.payload)
    }
}

/// Payload grammar recognised by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Join,
    Exit,
    /// Suffix after `MOVE`, with one leading `:` separator removed.
    Move(&'a str),
    Other(&'a str),
}

impl<'a> Payload<'a> {
    pub fn classify(payload: &'a str) -> Self {
        match payload {
            JOIN => Payload::Join,
            EXIT => Payload::Exit,
            _ => match payload.strip_prefix(MOVE) {
                Some(rest) => Payload::Move(rest.strip_prefix(':').unwrap_or(rest)),
                None => Payload::Other(payload),
            },
        }
    }

    /// Detail carried into a forwarded input event, if this payload forwards one.
    pub fn detail(&self) -> Option<&'a str> {
        match *self {
            Payload::Move(detail) | Payload::Other(detail) => Some(detail),
            Payload::Join | Payload::Exit => None,
        }
    }
}

/// Converts between raw wire text and [`Envelope`]s.
///
/// The relay only talks to this trait, so the delimiter format can be swapped
/// for a structured one without touching message processing.
pub trait EnvelopeCodec {
    fn decode(&self, raw: &str) -> Option<Envelope>;
    fn encode(&self, envelope: &Envelope) -> String;
}

/// The `<sessionId>|||<payload>` text format. No escaping is performed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedCodec;

impl EnvelopeCodec for DelimitedCodec {
    fn decode(&self, raw: &str) -> Option<Envelope> {
        let (session_id, payload) = raw.split_once(DELIMITER)?;
        Some(Envelope::new(session_id, payload))
    }

    fn encode(&self, envelope: &Envelope) -> String {
        format!("{}{}{}", envelope.session_id, DELIMITER, envelope.payload)
    }
}

pub fn decode(raw: &str) -> Option<Envelope> {
    DelimitedCodec.decode(raw)
}

pub fn encode(envelope: &Envelope) -> String {
    DelimitedCodec.encode(envelope)
}

/// Body of a `GET /api/events` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    pub last_id: u64,
    pub messages: Vec<String>,
}

/// One `index:SimUser:id` entry of a roster broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub index: usize,
    pub session_id: String,
}

impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.index, ROSTER_NAME, self.session_id)
    }
}

/// Builds `:PLAYERS:0:SimUser:a,1:SimUser:b,...`, indexing ids in the order given.
pub fn format_roster<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let entries: Vec<String> = ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            RosterEntry {
                index,
                session_id: id.to_string(),
            }
            .to_string()
        })
        .collect();
    format!("{}{}", ROSTER_PREFIX, entries.join(","))
}

/// Parses a roster broadcast. Returns `None` if `text` is not a roster message.
pub fn parse_roster(text: &str) -> Option<Vec<RosterEntry>> {
    let body = text.strip_prefix(ROSTER_PREFIX)?;
    if body.is_empty() {
        return Some(Vec::new());
    }

    body.split(',')
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let index = parts.next()?.parse().ok()?;
            let name = parts.next()?;
            let session_id = parts.next()?;
            (name == ROSTER_NAME).then(|| RosterEntry {
                index,
                session_id: session_id.to_string(),
            })
        })
        .collect()
}

/// Host-side forwarded input: `<sessionId>:MOVE:<detail>`.
pub fn format_input(session_id: &str, detail: &str) -> String {
    format!("{}:{}:{}", session_id, MOVE, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_splits_on_first_delimiter() {
        let envelope = decode("U1|||MOVE:UP:PRESS").unwrap();
        assert_eq!(envelope.session_id, "U1");
        assert_eq!(envelope.payload, "MOVE:UP:PRESS");

        let nested = decode("U1|||a|||b").unwrap();
        assert_eq!(nested.payload, "a|||b");
    }

    #[test]
    fn test_decode_rejects_missing_delimiter() {
        assert_eq!(decode("onlyonepart"), None);
        assert_eq!(decode("U1||JOIN"), None);
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_decode_allows_empty_parts() {
        assert_eq!(decode("|||JOIN"), Some(Envelope::new("", "JOIN")));
        assert_eq!(decode("U1|||"), Some(Envelope::new("U1", "")));
    }

    #[test]
    fn test_encode_matches_wire_format() {
        let envelope = Envelope::new("SimPlayer_1", "JOIN");
        assert_eq!(encode(&envelope), "SimPlayer_1|||JOIN");
        assert_eq!(decode(&encode(&envelope)), Some(envelope));
    }

    #[test]
    fn test_payload_classification() {
        assert_eq!(Payload::classify("JOIN"), Payload::Join);
        assert_eq!(Payload::classify("EXIT"), Payload::Exit);
        assert_eq!(Payload::classify("MOVE:UP:PRESS"), Payload::Move("UP:PRESS"));
        assert_eq!(Payload::classify("MOVE"), Payload::Move(""));
        assert_eq!(Payload::classify("MOVEX"), Payload::Move("X"));
        assert_eq!(Payload::classify("join"), Payload::Other("join"));
        assert_eq!(Payload::classify("JOIN "), Payload::Other("JOIN "));
    }

    #[test]
    fn test_payload_detail() {
        assert_eq!(Payload::Join.detail(), None);
        assert_eq!(Payload::Exit.detail(), None);
        assert_eq!(Payload::Move("UP:PRESS").detail(), Some("UP:PRESS"));
        assert_eq!(Payload::Other("FIRE").detail(), Some("FIRE"));
    }

    #[test]
    fn test_format_roster() {
        assert_eq!(
            format_roster(["a", "b", "c"]),
            ":PLAYERS:0:SimUser:a,1:SimUser:b,2:SimUser:c"
        );
        assert_eq!(format_roster(std::iter::empty()), ":PLAYERS:");
    }

    #[test]
    fn test_parse_roster() {
        let entries = parse_roster(":PLAYERS:0:SimUser:a,1:SimUser:b").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].session_id, "b");

        assert_eq!(parse_roster(":PLAYERS:"), Some(Vec::new()));
        assert_eq!(parse_roster("U1:MOVE:UP"), None);
        assert_eq!(parse_roster(":PLAYERS:x:SimUser:a"), None);
    }

    #[test]
    fn test_format_input() {
        assert_eq!(format_input("U1", "UP:PRESS"), "U1:MOVE:UP:PRESS");
    }

    #[test]
    fn test_poll_response_json_shape() {
        let response = PollResponse {
            last_id: 10,
            messages: vec!["hello".to_string()],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"last_id":10,"messages":["hello"]}"#);
    }
}
