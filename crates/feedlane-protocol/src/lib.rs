//! Feedlane Protocol Engine
//!
//! Implements the duplex RPC protocol spoken between the driver and the
//! worker subprocess over a single byte stream: length-prefixed JSON
//! frames, ticket-based call/reply correlation, and bidirectional
//! dispatch. Either side may invoke named operations on the other, and
//! invocations may nest inside the handling of another invocation.

pub mod error;
pub mod frame;
pub mod message;
pub mod registry;
pub mod session;
pub mod tickets;
pub mod version;

pub use error::{FrameError, SessionError};
pub use message::{Message, ReplyOutcome, Ticket};
pub use registry::{Handler, HandlerError, OperationRegistry};
pub use session::{Continuation, Session};
pub use tickets::TicketRegistry;
pub use version::{ApiVersion, ParseVersionError};

/// Highest API version this implementation speaks.
pub const API_VERSION: ApiVersion = ApiVersion::new(2, 5);

/// Operation name for the version-negotiation exchange that must
/// complete before any application-level invocation.
pub const SELECT_API_VERSION: &str = "select-api-version";
