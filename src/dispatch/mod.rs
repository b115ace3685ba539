//! Method dispatch.
//!
//! # Data Flow
//! ```text
//! JSON object body
//!     → envelope shape (validate, aggregate reasons)     → 422
//!     → Authenticator::check                              → 403
//!     → registry.rs (method name → Method)                → 422
//!     → inner shape for the method (validate)             → 422
//!     → handlers.rs (typed args + store)                  → 500 on store failure
//!     → payload, plus diagnostics merged into the Context
//! ```
//!
//! # Design Decisions
//! - The dispatcher is stateless apart from the shared store handle
//! - Handlers return diagnostics instead of writing into shared state

pub mod context;
pub mod handlers;
pub mod registry;

pub use context::{Context, Diagnostics};
pub use handlers::{HandlerOutput, Invocation, ADMIN_SCORE};
pub use registry::Method;

use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;
use crate::requests::{ClientsInterestsArgs, MethodRequest, OnlineScoreArgs, RequestArgs};
use crate::security::Authenticator;
use crate::store::Store;

/// Result of one dispatched call.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub context: Context,
    pub result: Result<Value, ApiError>,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<Store>,
    auth: Authenticator,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>, auth: Authenticator) -> Self {
        Self { store, auth }
    }

    pub async fn dispatch(&self, request_id: &str, body: &Value) -> DispatchOutcome {
        let mut context = Context::new(request_id);
        let result = self.run(body, &mut context).await;
        if let Err(ApiError::Internal(detail)) = &result {
            tracing::error!(request_id = %request_id, error = %detail, "Unexpected error");
        }
        DispatchOutcome { context, result }
    }

    async fn run(&self, body: &Value, context: &mut Context) -> Result<Value, ApiError> {
        if !body.is_object() {
            return Err(ApiError::BadRequest);
        }

        let (request, _) = bind::<MethodRequest>(body)?;
        if !self.auth.check(&request) {
            return Err(ApiError::Forbidden);
        }

        let method = Method::parse(&request.method).ok_or_else(|| {
            ApiError::InvalidRequest(format!("method '{}' is not supported", request.method))
        })?;
        let is_admin = request.is_admin(self.auth.admin_login());

        let output = match method {
            Method::OnlineScore => {
                let (args, filled) = bind::<OnlineScoreArgs>(&request.arguments)?;
                let invocation = Invocation { args, filled, is_admin };
                handlers::online_score(&self.store, invocation).await?
            }
            Method::ClientsInterests => {
                let (args, filled) = bind::<ClientsInterestsArgs>(&request.arguments)?;
                let invocation = Invocation { args, filled, is_admin };
                handlers::clients_interests(&self.store, invocation).await?
            }
        };

        context.merge(output.diagnostics);
        Ok(output.payload)
    }
}

/// Validate `raw` against `T`'s shape and convert it.
fn bind<T: RequestArgs>(raw: &Value) -> Result<(T, Vec<&'static str>), ApiError> {
    let instance = T::shape().bind_value(raw);
    let validation = T::validate(&instance);
    if !validation.is_valid {
        let shape = T::shape().name();
        tracing::debug!(shape, reason = %validation.reason, "Arguments rejected");
        return Err(ApiError::InvalidRequest(validation.reason));
    }
    Ok((T::from_instance(&instance), instance.filled_fields()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::RetryPolicy;
    use crate::store::MemoryBackend;
    use chrono::Local;
    use serde_json::json;
    use std::time::Duration;

    fn dispatcher(backend: &MemoryBackend) -> Dispatcher {
        let store = Store::new(
            Arc::new(backend.clone()),
            RetryPolicy::new(2, Duration::from_millis(10)),
        );
        Dispatcher::new(Arc::new(store), Authenticator::default())
    }

    fn signed(mut body: Value) -> Value {
        let auth = Authenticator::default();
        let account = body["account"].as_str().map(str::to_string);
        let login = body["login"].as_str().unwrap_or_default().to_string();
        let token = auth.token_for(account.as_deref(), &login, Local::now().naive_local());
        body["token"] = json!(token);
        body
    }

    fn user_call(method: &str, arguments: Value) -> Value {
        signed(json!({
            "account": "horns&hoofs",
            "login": "h&f",
            "method": method,
            "arguments": arguments,
        }))
    }

    fn admin_call(method: &str, arguments: Value) -> Value {
        signed(json!({
            "account": "horns&hoofs",
            "login": "admin",
            "method": method,
            "arguments": arguments,
        }))
    }

    #[tokio::test]
    async fn test_empty_request() {
        let d = dispatcher(&MemoryBackend::new());
        let outcome = d.dispatch("r", &json!({})).await;
        let err = outcome.result.unwrap_err();
        assert_eq!(err.code(), 422);
        assert!(err.to_string().contains("required"));
    }

    #[tokio::test]
    async fn test_non_object_body() {
        let d = dispatcher(&MemoryBackend::new());
        for body in [json!([]), json!("x"), json!(1), Value::Null] {
            assert_eq!(d.dispatch("r", &body).await.result.unwrap_err().code(), 400);
        }
    }

    #[tokio::test]
    async fn test_bad_auth() {
        let d = dispatcher(&MemoryBackend::new());
        let cases = [("h&f", ""), ("h&f", "sdd"), ("admin", "")];
        for (login, token) in cases {
            let body = json!({
                "account": "horns&hoofs",
                "login": login,
                "method": "online_score",
                "token": token,
                "arguments": {},
            });
            let err = d.dispatch("r", &body).await.result.unwrap_err();
            assert_eq!(err.code(), 403);
            assert_eq!(err.to_string(), "Forbidden");
        }
    }

    #[tokio::test]
    async fn test_invalid_method_request() {
        let d = dispatcher(&MemoryBackend::new());
        let cases = [
            signed(json!({"account": "horns&hoofs", "login": "h&f", "method": "online_score"})),
            signed(json!({"account": "horns&hoofs", "login": "h&f", "arguments": {}})),
            signed(json!({"account": "horns&hoofs", "method": "online_score", "arguments": {}})),
        ];
        for body in cases {
            let err = d.dispatch("r", &body).await.result.unwrap_err();
            assert_eq!(err.code(), 422, "{body}");
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let d = dispatcher(&MemoryBackend::new());
        let err = d.dispatch("r", &user_call("offline_score", json!({}))).await.result.unwrap_err();
        assert_eq!(err.code(), 422);
        assert_eq!(err.to_string(), "method 'offline_score' is not supported");
    }

    #[tokio::test]
    async fn test_unknown_method_is_checked_after_auth() {
        let d = dispatcher(&MemoryBackend::new());
        let body = json!({"login": "h&f", "token": "bad", "method": "nope", "arguments": {}});
        assert_eq!(d.dispatch("r", &body).await.result.unwrap_err().code(), 403);
    }

    #[tokio::test]
    async fn test_invalid_score_arguments() {
        let d = dispatcher(&MemoryBackend::new());
        let cases = [
            json!({}),
            json!({"phone": "79175002040"}),
            json!({"phone": "89175002040", "email": "stupnikov@otus.ru"}),
            json!({"phone": "79175002040", "email": "stupnikovotus.ru"}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": -1}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": "1"}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1,
                   "birthday": "01.01.1890"}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1,
                   "birthday": "XXX"}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1,
                   "birthday": "01.01.2000", "first_name": 1}),
            json!({"phone": "79175002040", "birthday": "01.01.2000", "first_name": "s"}),
        ];
        for arguments in cases {
            let outcome = d.dispatch("r", &user_call("online_score", arguments.clone())).await;
            let err = outcome.result.unwrap_err();
            assert_eq!(err.code(), 422, "{arguments}");
            assert!(!err.to_string().is_empty());
            assert_eq!(outcome.context.has, None);
        }
    }

    #[tokio::test]
    async fn test_ok_score_request() {
        let d = dispatcher(&MemoryBackend::new());
        let cases = [
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru"}),
            json!({"phone": 79175002040u64, "email": "stupnikov@otus.ru"}),
            json!({"gender": 1, "birthday": "01.01.2000", "first_name": "a", "last_name": "b"}),
            json!({"gender": 0, "birthday": "01.01.2000"}),
            json!({"gender": 2, "birthday": "01.01.2000"}),
            json!({"first_name": "a", "last_name": "b"}),
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1,
                   "birthday": "01.01.2000", "first_name": "a", "last_name": "b"}),
        ];
        for arguments in cases {
            let outcome = d.dispatch("r", &user_call("online_score", arguments.clone())).await;
            let payload = outcome.result.unwrap();
            let score = payload["score"].as_f64().unwrap();
            assert!(score >= 0.0, "{arguments}");

            let mut has = outcome.context.has.unwrap();
            let mut expected: Vec<String> =
                arguments.as_object().unwrap().keys().cloned().collect();
            has.sort();
            expected.sort();
            assert_eq!(has, expected);
        }
    }

    #[tokio::test]
    async fn test_ok_score_admin_request() {
        let backend = MemoryBackend::new();
        backend.set_available(false);
        let d = dispatcher(&backend);

        let cases = [
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru"}),
            json!({"first_name": "a", "last_name": "b"}),
        ];
        for arguments in cases {
            let outcome = d.dispatch("r", &admin_call("online_score", arguments)).await;
            assert_eq!(outcome.result.unwrap(), json!({"score": 42}));
        }
        assert_eq!(backend.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_interests_request() {
        let d = dispatcher(&MemoryBackend::with_sample_interests(10));
        let cases = [
            json!({}),
            json!({"date": "20.07.2017"}),
            json!({"client_ids": [], "date": "20.07.2017"}),
            json!({"client_ids": {"1": 2}, "date": "20.07.2017"}),
            json!({"client_ids": ["1", "2"], "date": "20.07.2017"}),
            json!({"client_ids": [1, 2], "date": "XXX"}),
        ];
        for arguments in cases {
            let outcome = d.dispatch("r", &user_call("clients_interests", arguments.clone())).await;
            assert_eq!(outcome.result.unwrap_err().code(), 422, "{arguments}");
            assert_eq!(outcome.context.nclients, None);
        }
    }

    #[tokio::test]
    async fn test_ok_interests_request() {
        let d = dispatcher(&MemoryBackend::with_sample_interests(10));
        let arguments = json!({"client_ids": [1, 2, 3], "date": "20.07.2017"});

        let outcome = d.dispatch("r", &user_call("clients_interests", arguments)).await;
        let payload = outcome.result.unwrap();
        let map = payload.as_object().unwrap();
        assert_eq!(map.len(), 3);
        for id in ["1", "2", "3"] {
            let interests = map[id].as_array().unwrap();
            assert!(!interests.is_empty());
            assert!(interests.iter().all(Value::is_string));
        }
        assert_eq!(outcome.context.nclients, Some(3));
        assert_eq!(outcome.context.request_id, "r");
    }

    #[tokio::test]
    async fn test_store_outage_is_internal_error() {
        let backend = MemoryBackend::with_sample_interests(10);
        backend.set_available(false);
        let d = dispatcher(&backend);

        let outcome = d
            .dispatch("r", &user_call("clients_interests", json!({"client_ids": [1]})))
            .await;
        let err = outcome.result.unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
