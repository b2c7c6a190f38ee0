//! Operation registry: name-to-handler mapping for inbound invocations.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::SessionError;
use crate::session::Session;

/// Locally registered logic executed when the peer invokes an
/// operation by name.
///
/// Handlers run synchronously on the protocol thread and receive the
/// session so they may issue nested outbound calls (which re-enter the
/// pump). A handler that blocks indefinitely stalls the whole session.
pub trait Handler {
    fn handle(&self, session: &mut Session, arguments: &[Value]) -> Result<Value, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&mut Session, &[Value]) -> Result<Value, HandlerError>,
{
    fn handle(&self, session: &mut Session, arguments: &[Value]) -> Result<Value, HandlerError> {
        self(session, arguments)
    }
}

/// Why a handler did not produce a value.
#[derive(Debug)]
pub enum HandlerError {
    /// Reported to the peer as a `fail` reply; the session continues.
    Fail(String),
    /// The session itself is broken; propagates and ends the session.
    Fatal(SessionError),
}

impl HandlerError {
    pub fn fail(description: impl Into<String>) -> Self {
        Self::Fail(description.into())
    }
}

impl From<SessionError> for HandlerError {
    /// A nested call failing remotely is the handler's failure to
    /// report; a broken stream or correlation state is not recoverable
    /// by replying.
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Remote(description) => Self::Fail(description),
            fatal => Self::Fatal(fatal),
        }
    }
}

/// Mapping from operation name to handler, populated before the
/// session loop starts.
#[derive(Default)]
pub struct OperationRegistry {
    handlers: HashMap<String, Rc<dyn Handler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(name.into(), Rc::new(handler));
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }
}
