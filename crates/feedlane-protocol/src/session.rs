//! Session dispatcher: the protocol state machine.
//!
//! One `Session` owns one duplex byte stream plus the ticket and
//! operation registries for its side. The protocol is synchronous and
//! cooperative: a single logical thread per side, no background
//! reader, and the only suspension point is the blocking frame read
//! inside [`Session::pump`]. Frames are processed strictly in arrival
//! order, so an inbound invocation may be fully serviced (including
//! nested outbound calls) before the reply to an earlier outbound call
//! arrives; both roles are symmetric and simultaneous.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use serde_json::Value;

use crate::error::{FrameError, SessionError};
use crate::frame;
use crate::message::{Message, ReplyOutcome, Ticket};
use crate::registry::{HandlerError, OperationRegistry};
use crate::tickets::TicketRegistry;

/// Logic run when a specific ticket's reply arrives. Receives the
/// session so it may issue further invocations, and the remote
/// outcome: the reply payload, or the peer's failure description.
pub type Continuation =
    Box<dyn FnOnce(&mut Session, Result<Value, String>) -> Result<(), SessionError>>;

pub struct Session {
    reader: Box<dyn BufRead>,
    writer: Box<dyn Write>,
    tickets: TicketRegistry,
    operations: OperationRegistry,
}

impl Session {
    pub fn new(
        reader: impl BufRead + 'static,
        writer: impl Write + 'static,
        operations: OperationRegistry,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            tickets: TicketRegistry::new(),
            operations,
        }
    }

    /// Issue an invocation, registering the continuation to run when
    /// its reply arrives.
    pub fn invoke(
        &mut self,
        operation: &str,
        arguments: Vec<Value>,
        continuation: Continuation,
    ) -> Result<Ticket, SessionError> {
        let ticket = self.tickets.allocate();
        self.tickets.register(ticket.clone(), continuation);
        self.send(&Message::invocation(ticket.clone(), operation, arguments))?;
        Ok(ticket)
    }

    /// A continuation that ignores the reply value. A `fail` outcome
    /// still surfaces, as a `Remote` error at whoever is pumping.
    pub fn discard() -> Continuation {
        Box::new(|_, result| match result {
            Ok(_) => Ok(()),
            Err(description) => Err(SessionError::Remote(description)),
        })
    }

    /// Invoke an operation and pump until its reply arrives.
    ///
    /// The wait is an explicit loop, not recursion: keep pumping until
    /// the completion slot fills. Inbound traffic arriving before the
    /// reply (including new invocations from the peer) is serviced in
    /// order along the way. A `fail` outcome surfaces here as
    /// [`SessionError::Remote`]; there is no retry.
    pub fn call(&mut self, operation: &str, arguments: Vec<Value>) -> Result<Value, SessionError> {
        let slot: Rc<RefCell<Option<Result<Value, String>>>> = Rc::new(RefCell::new(None));
        let filled = Rc::clone(&slot);
        self.invoke(
            operation,
            arguments,
            Box::new(move |_, result| {
                *filled.borrow_mut() = Some(result);
                Ok(())
            }),
        )?;
        loop {
            if let Some(result) = slot.borrow_mut().take() {
                return result.map_err(SessionError::Remote);
            }
            self.pump()?;
        }
    }

    /// One protocol step: read one message and route it.
    ///
    /// Frame errors propagate and end the session. Errors local to
    /// servicing one inbound invocation are converted to a `fail`
    /// reply and never escape this step.
    pub fn pump(&mut self) -> Result<(), SessionError> {
        let message = frame::read_frame(&mut *self.reader)?;
        tracing::debug!(?message, "recv");
        match message {
            Message::Invocation {
                ticket,
                operation,
                arguments,
            } => self.service(ticket, &operation, &arguments),
            Message::Reply {
                ticket,
                outcome,
                payload,
            } => {
                let continuation = self.tickets.resolve(&ticket)?;
                let result = match outcome {
                    ReplyOutcome::Ok => Ok(payload),
                    ReplyOutcome::Fail => Err(describe_failure(payload)),
                };
                continuation(self, result)
            }
        }
    }

    /// Pump until the peer closes the stream at a frame boundary.
    pub fn serve(&mut self) -> Result<(), SessionError> {
        loop {
            match self.pump() {
                Ok(()) => {}
                Err(SessionError::Frame(FrameError::Closed)) => return Ok(()),
                Err(error) => return Err(error),
            }
        }
    }

    fn service(
        &mut self,
        ticket: Ticket,
        operation: &str,
        arguments: &[Value],
    ) -> Result<(), SessionError> {
        let Some(handler) = self.operations.lookup(operation) else {
            tracing::warn!(operation, "unknown operation");
            return self.send(&Message::reply_fail(
                ticket,
                format!("unknown operation: {operation}"),
            ));
        };
        match handler.handle(self, arguments) {
            Ok(value) => self.send(&Message::reply_ok(ticket, value)),
            Err(HandlerError::Fail(description)) => {
                tracing::warn!(operation, %description, "operation failed");
                self.send(&Message::reply_fail(ticket, description))
            }
            Err(HandlerError::Fatal(error)) => Err(error),
        }
    }

    fn send(&mut self, message: &Message) -> Result<(), SessionError> {
        tracing::debug!(?message, "send");
        frame::write_frame(&mut *self.writer, message)?;
        Ok(())
    }

    /// Number of outbound calls still awaiting a reply.
    pub fn pending_calls(&self) -> usize {
        self.tickets.pending()
    }
}

fn describe_failure(payload: Value) -> String {
    match payload {
        Value::String(description) => description,
        other => other.to_string(),
    }
}
