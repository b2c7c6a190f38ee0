//! Driver-side operation handlers.
//!
//! These service invocations issued by the worker: the version
//! negotiation that must open every session, key-confirmation
//! requests, and key-info update notices.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use serde_json::{json, Map, Value};

use feedlane_protocol::{
    ApiVersion, HandlerError, OperationRegistry, Session, API_VERSION, SELECT_API_VERSION,
};

use crate::config::KeyPolicy;

/// Slot the negotiation handler records the agreed version in. Stays
/// `None` until the worker's proposal has been serviced.
pub type VersionSlot = Rc<RefCell<Option<ApiVersion>>>;

/// Register all driver-side handlers and return the version slot.
pub fn register_driver_handlers(registry: &mut OperationRegistry, policy: KeyPolicy) -> VersionSlot {
    let slot: VersionSlot = Rc::new(RefCell::new(None));

    let agreed = Rc::clone(&slot);
    registry.register(SELECT_API_VERSION, move |_: &mut Session, args: &[Value]| {
        let version = negotiate(args)?;
        *agreed.borrow_mut() = Some(version);
        tracing::info!(%version, "api version agreed");
        Ok(Value::String(version.to_string()))
    });

    registry.register("confirm-keys", move |_: &mut Session, args: &[Value]| {
        confirm_keys(policy, args)
    });

    // Cache refresh notice from the worker; nothing to do here.
    registry.register("update-key-info", |_: &mut Session, _: &[Value]| Ok(Value::Null));

    slot
}

/// The worker proposes its highest version; we answer with the lower
/// of the two maxima, which both sides then use.
fn negotiate(args: &[Value]) -> Result<ApiVersion, HandlerError> {
    let proposed = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::fail("select-api-version expects one string argument"))?;
    let proposed: ApiVersion = proposed
        .parse()
        .map_err(|e| HandlerError::fail(format!("{e}")))?;
    Ok(API_VERSION.agree(proposed))
}

fn confirm_keys(policy: KeyPolicy, args: &[Value]) -> Result<Value, HandlerError> {
    let feed = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::fail("confirm-keys expects a feed URL"))?;
    let keys = args
        .get(1)
        .and_then(Value::as_object)
        .ok_or_else(|| HandlerError::fail("confirm-keys expects a key map"))?;

    let trusted: Vec<&String> = match policy {
        KeyPolicy::Accept => keys.keys().collect(),
        KeyPolicy::Reject => Vec::new(),
        KeyPolicy::Prompt => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            prompt_for_keys(&mut stdin.lock(), &mut stdout, feed, keys)
                .map_err(|e| HandlerError::fail(format!("prompt failed: {e}")))?
        }
    };
    Ok(json!(trusted))
}

/// Show the feed, its keys, and their hint lines, then ask for a Y/N
/// answer. Blocking the protocol loop on the terminal is acceptable
/// only because no concurrent peer traffic is expected during this
/// operation.
fn prompt_for_keys<'k, R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    feed: &str,
    keys: &'k Map<String, Value>,
) -> io::Result<Vec<&'k String>> {
    writeln!(output, "Feed: {feed}")?;
    writeln!(output, "The feed is correctly signed with the following keys:")?;
    for (key_id, hints) in keys {
        writeln!(output, "- {key_id}")?;
        for hint in hints.as_array().into_iter().flatten() {
            let vote = hint[0].as_str().unwrap_or("");
            let message = hint[1].as_str().unwrap_or("");
            writeln!(output, "    {} {message}", vote.to_uppercase())?;
        }
    }

    loop {
        write!(output, "Trust these keys? [YN] ")?;
        output.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(Vec::new());
        }
        match answer.trim() {
            "y" | "Y" => return Ok(keys.keys().collect()),
            "n" | "N" => return Ok(Vec::new()),
            _ => {}
        }
    }
}
