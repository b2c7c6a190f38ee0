//! Driver session orchestration.
//!
//! Spawns the worker, services the version-negotiation bootstrap, runs
//! the top-level `select` call, and shapes its payload for printing.

use serde_json::{json, Value};

use feedlane_protocol::{ApiVersion, OperationRegistry, Session, SessionError};

use crate::config::DriverConfig;
use crate::handlers;
use crate::worker_link::WorkerLink;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to launch worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The worker's first message was not the version proposal.
    #[error("worker did not negotiate an API version")]
    NoNegotiation,

    #[error("malformed select response: {0}")]
    MalformedResponse(String),
}

/// Outcome of a select call: the worker's status string and the
/// selections document.
#[derive(Debug)]
pub struct Selection {
    pub api_version: ApiVersion,
    pub status: String,
    pub selections: Value,
}

pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Resolve an interface URI through the worker.
    pub fn select(&self, interface: &str, refresh: bool) -> Result<Selection, DriverError> {
        let mut link = WorkerLink::spawn(&self.config.worker_command, &self.config.worker_args)?;
        let (reader, writer) = link.split()?;

        let mut registry = OperationRegistry::new();
        let version = handlers::register_driver_handlers(&mut registry, self.config.key_policy);
        let mut session = Session::new(reader, writer, registry);

        // Exactly one inbound invocation (the version proposal) must be
        // serviced before any application-level call goes out.
        session.pump()?;
        let api_version = (*version.borrow()).ok_or(DriverError::NoNegotiation)?;

        let requirements = json!({ "interface": interface });
        let payload = session.call("select", vec![requirements, Value::Bool(refresh)])?;
        parse_selection(api_version, payload)
    }
}

/// A select reply carries `[status, selections]`.
fn parse_selection(api_version: ApiVersion, payload: Value) -> Result<Selection, DriverError> {
    let mut parts = match payload {
        Value::Array(parts) if parts.len() == 2 => parts,
        other => return Err(DriverError::MalformedResponse(other.to_string())),
    };
    let selections = parts.pop().unwrap_or(Value::Null);
    let status = match parts.pop() {
        Some(Value::String(status)) => status,
        other => {
            return Err(DriverError::MalformedResponse(
                other.unwrap_or(Value::Null).to_string(),
            ))
        }
    };
    Ok(Selection {
        api_version,
        status,
        selections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_and_selections() {
        let selection = parse_selection(
            ApiVersion::new(2, 5),
            json!(["ok", {"selections": {"i": {"version": "1.2"}}}]),
        )
        .unwrap();
        assert_eq!(selection.status, "ok");
        assert_eq!(selection.selections["selections"]["i"]["version"], "1.2");
    }

    #[test]
    fn rejects_malformed_payloads() {
        for payload in [
            json!(null),
            json!("ok"),
            json!(["ok"]),
            json!(["ok", {}, "extra"]),
            json!([7, {}]),
        ] {
            assert!(matches!(
                parse_selection(ApiVersion::new(2, 5), payload),
                Err(DriverError::MalformedResponse(_))
            ));
        }
    }
}
