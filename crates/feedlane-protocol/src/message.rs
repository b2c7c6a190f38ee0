//! Message model: the tagged envelope distinguishing invocations from
//! replies, and its positional wire form.
//!
//! Wire form is a 4-element JSON array:
//!
//!   `["invoke", ticket, operation, [arguments...]]`
//!   `["return", ticket, "ok"|"fail", payload]`

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FrameError;

/// Correlation identifier linking an invocation to its eventual reply.
///
/// Chosen by the invoking side and scoped to that side's outbound
/// calls; replies always echo the invoker's ticket, so the two sides
/// never need to reconcile namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticket {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Whether the remote handler produced a value or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Ok,
    Fail,
}

impl ReplyOutcome {
    fn as_wire(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fail => "fail",
        }
    }

    fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "ok" => Some(Self::Ok),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Decoded structured content of one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Invocation {
        ticket: Ticket,
        operation: String,
        arguments: Vec<Value>,
    },
    Reply {
        ticket: Ticket,
        outcome: ReplyOutcome,
        payload: Value,
    },
}

impl Message {
    pub fn invocation(ticket: Ticket, operation: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self::Invocation {
            ticket,
            operation: operation.into(),
            arguments,
        }
    }

    pub fn reply_ok(ticket: Ticket, payload: Value) -> Self {
        Self::Reply {
            ticket,
            outcome: ReplyOutcome::Ok,
            payload,
        }
    }

    pub fn reply_fail(ticket: Ticket, description: impl Into<String>) -> Self {
        Self::Reply {
            ticket,
            outcome: ReplyOutcome::Fail,
            payload: Value::String(description.into()),
        }
    }

    /// Render the positional wire form.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Invocation {
                ticket,
                operation,
                arguments,
            } => json!(["invoke", ticket, operation, arguments]),
            Self::Reply {
                ticket,
                outcome,
                payload,
            } => json!(["return", ticket, outcome.as_wire(), payload]),
        }
    }

    /// Classify a decoded payload into a message.
    ///
    /// Anything other than the two known 4-element shapes is a shape
    /// error, which the session treats as fatal.
    pub fn from_wire(value: Value) -> Result<Self, FrameError> {
        let Value::Array(parts) = value else {
            return Err(FrameError::Shape("message is not an array".into()));
        };
        if parts.len() != 4 {
            return Err(FrameError::Shape(format!(
                "expected 4 elements, got {}",
                parts.len()
            )));
        }
        let mut parts = parts.into_iter();
        let tag = expect_string(parts.next(), "tag")?;
        let ticket = Ticket::new(expect_string(parts.next(), "ticket")?);
        match tag.as_str() {
            "invoke" => {
                let operation = expect_string(parts.next(), "operation")?;
                let arguments = match parts.next() {
                    Some(Value::Array(arguments)) => arguments,
                    _ => return Err(FrameError::Shape("arguments are not an array".into())),
                };
                Ok(Self::Invocation {
                    ticket,
                    operation,
                    arguments,
                })
            }
            "return" => {
                let tag = expect_string(parts.next(), "outcome")?;
                let outcome = ReplyOutcome::from_wire(&tag)
                    .ok_or_else(|| FrameError::Shape(format!("unknown outcome {tag:?}")))?;
                let payload = parts.next().unwrap_or(Value::Null);
                Ok(Self::Reply {
                    ticket,
                    outcome,
                    payload,
                })
            }
            other => Err(FrameError::Shape(format!("unknown message tag {other:?}"))),
        }
    }
}

fn expect_string(value: Option<Value>, what: &str) -> Result<String, FrameError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(FrameError::Shape(format!("{what} is not a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_wire_form() {
        let message = Message::invocation(Ticket::from("5"), "echo", vec![json!("hi")]);
        assert_eq!(message.to_wire(), json!(["invoke", "5", "echo", ["hi"]]));
    }

    #[test]
    fn reply_wire_forms() {
        let ok = Message::reply_ok(Ticket::from("2"), json!({"a": 1}));
        assert_eq!(ok.to_wire(), json!(["return", "2", "ok", {"a": 1}]));

        let fail = Message::reply_fail(Ticket::from("2"), "boom");
        assert_eq!(fail.to_wire(), json!(["return", "2", "fail", "boom"]));
    }

    #[test]
    fn wire_round_trip() {
        let messages = vec![
            Message::invocation(Ticket::from("1"), "select", vec![json!({"interface": "x"}), json!(false)]),
            Message::reply_ok(Ticket::from("1"), json!(["ok", {"selections": {}}])),
            Message::reply_fail(Ticket::from("9"), "no such feed"),
        ];
        for message in messages {
            let decoded = Message::from_wire(message.to_wire()).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = Message::from_wire(json!(["ping", "1", "x", []])).unwrap_err();
        assert!(matches!(err, FrameError::Shape(_)));
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = Message::from_wire(json!(["invoke", "1", "echo"])).unwrap_err();
        assert!(matches!(err, FrameError::Shape(_)));
    }

    #[test]
    fn rejects_non_string_ticket() {
        let err = Message::from_wire(json!(["invoke", 7, "echo", []])).unwrap_err();
        assert!(matches!(err, FrameError::Shape(_)));
    }

    #[test]
    fn rejects_unknown_outcome() {
        let err = Message::from_wire(json!(["return", "1", "maybe", null])).unwrap_err();
        assert!(matches!(err, FrameError::Shape(_)));
    }

    #[test]
    fn rejects_non_array_message() {
        let err = Message::from_wire(json!({"op": "invoke"})).unwrap_err();
        assert!(matches!(err, FrameError::Shape(_)));
    }
}
