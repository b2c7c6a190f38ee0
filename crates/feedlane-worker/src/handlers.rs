//! Worker-side operation handlers.
//!
//! `select` resolves an interface against the feed store. When a feed
//! is signed with keys the store does not yet trust, the handler calls
//! back into the driver with `confirm-keys` — a nested outbound call
//! issued while the driver's own `select` call is still outstanding —
//! and follows up with an `update-key-info` notice it does not wait
//! for.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Map, Value};

use feedlane_protocol::{HandlerError, OperationRegistry, Session};

use crate::store::{Feed, FeedStore};

pub fn register_worker_handlers(registry: &mut OperationRegistry, store: FeedStore) {
    let store = Rc::new(RefCell::new(store));
    registry.register("select", move |session: &mut Session, args: &[Value]| {
        select(session, &store, args)
    });
}

fn select(
    session: &mut Session,
    store: &Rc<RefCell<FeedStore>>,
    args: &[Value],
) -> Result<Value, HandlerError> {
    let requirements = args
        .first()
        .and_then(Value::as_object)
        .ok_or_else(|| HandlerError::fail("select expects a requirements object"))?;
    let interface = requirements
        .get("interface")
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::fail("requirements are missing an interface"))?;
    let _refresh = args.get(1).and_then(Value::as_bool).unwrap_or(false);

    let feed = store
        .borrow()
        .get(interface)
        .cloned()
        .ok_or_else(|| HandlerError::fail(format!("unknown interface: {interface}")))?;

    if feed.keys.iter().any(|key| !key.trusted) {
        confirm_feed_keys(session, store, &feed)?;
    }

    let best = feed
        .candidates
        .first()
        .ok_or_else(|| HandlerError::fail(format!("no candidates for {interface}")))?;
    let selections = json!({
        "interface": interface,
        "selections": {
            interface: { "id": best.id, "version": best.version }
        }
    });
    Ok(json!(["ok", selections]))
}

/// Ask the driver which of the feed's keys to trust. An empty answer
/// means the feed is rejected.
fn confirm_feed_keys(
    session: &mut Session,
    store: &Rc<RefCell<FeedStore>>,
    feed: &Feed,
) -> Result<(), HandlerError> {
    let mut key_map = Map::new();
    for key in &feed.keys {
        let hints: Vec<Value> = key
            .hints
            .iter()
            .map(|(vote, message)| json!([vote, message]))
            .collect();
        key_map.insert(key.key_id.clone(), Value::Array(hints));
    }

    let approved = session.call(
        "confirm-keys",
        vec![json!(feed.url), Value::Object(key_map)],
    )?;
    let approved: Vec<String> = approved
        .as_array()
        .map(|keys| {
            keys.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if approved.is_empty() {
        return Err(HandlerError::fail(format!(
            "not signed with a trusted key: {}",
            feed.url
        )));
    }
    for key_id in &approved {
        store.borrow_mut().mark_trusted(&feed.url, key_id);
    }
    tracing::info!(feed = %feed.url, keys = approved.len(), "keys confirmed");

    // Cache refresh notice; the reply is not waited for.
    session.invoke("update-key-info", vec![json!(feed.url)], Session::discard())?;
    Ok(())
}
