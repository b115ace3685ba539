//! Method handlers.
//!
//! Each handler gets already-validated, typed arguments and returns its
//! payload together with the diagnostics it wants logged.

use serde_json::{json, Map, Value};

use crate::dispatch::context::Diagnostics;
use crate::requests::{ClientsInterestsArgs, OnlineScoreArgs};
use crate::scoring;
use crate::store::{Store, StoreError};

/// Score handed to the admin login without consulting the store.
pub const ADMIN_SCORE: u32 = 42;

/// A validated call to one method.
#[derive(Debug, Clone)]
pub struct Invocation<T> {
    pub args: T,
    /// Argument names that passed their emptiness rule.
    pub filled: Vec<&'static str>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    pub payload: Value,
    pub diagnostics: Diagnostics,
}

pub async fn online_score(
    store: &Store,
    call: Invocation<OnlineScoreArgs>,
) -> Result<HandlerOutput, StoreError> {
    let diagnostics = Diagnostics::with_has(&call.filled);
    let payload = if call.is_admin {
        json!({ "score": ADMIN_SCORE })
    } else {
        json!({ "score": scoring::get_score(store, &call.args).await })
    };
    Ok(HandlerOutput { payload, diagnostics })
}

pub async fn clients_interests(
    store: &Store,
    call: Invocation<ClientsInterestsArgs>,
) -> Result<HandlerOutput, StoreError> {
    let mut payload = Map::new();
    for id in &call.args.client_ids {
        let interests = scoring::get_interests(store, *id).await?;
        payload.insert(id.to_string(), Value::from(interests));
    }
    Ok(HandlerOutput {
        payload: Value::Object(payload),
        diagnostics: Diagnostics::with_nclients(call.args.client_ids.len()),
    })
}
