//! Feedlane reference worker.
//!
//! Serves the selection protocol on a pair of byte streams: proposes
//! an API version, then answers `select` invocations against an
//! in-memory feed store, calling back into the driver to confirm
//! untrusted signing keys.

pub mod handlers;
pub mod store;

pub use store::{Candidate, Feed, FeedStore, KeyInfo};

use std::io::{BufRead, Write};

use serde_json::json;

use feedlane_protocol::{
    ApiVersion, OperationRegistry, Session, SessionError, API_VERSION, SELECT_API_VERSION,
};

/// Run a worker session until the driver closes the stream.
pub fn run(
    reader: impl BufRead + 'static,
    writer: impl Write + 'static,
    store: FeedStore,
) -> Result<(), SessionError> {
    let mut registry = OperationRegistry::new();
    handlers::register_worker_handlers(&mut registry, store);
    let mut session = Session::new(reader, writer, registry);

    // Propose our highest version before serving anything else.
    let agreed = session.call(SELECT_API_VERSION, vec![json!(API_VERSION.to_string())])?;
    match agreed.as_str().map(str::parse::<ApiVersion>) {
        Some(Ok(version)) => tracing::info!(%version, "api version agreed"),
        _ => {
            return Err(SessionError::Remote(format!(
                "driver returned a malformed API version: {agreed}"
            )))
        }
    }

    session.serve()
}
