//! Action services: the seam between callers and the OpenWhisk API.
//!
//! [`http::HttpActionService`] talks to a real deployment. [`MockActionService`]
//! keeps actions in memory and emulates the platform behaviors callers
//! depend on, so lifecycle code can be tested without network access:
//!
//! ```
//! use openwhisk::backend::{ActionService, MockActionService};
//! use openwhisk::Action;
//!
//! let mock = MockActionService::new();
//! mock.insert("hello", &Action::named("hello"), false).unwrap();
//!
//! assert!(mock.get("hello").is_ok());
//! assert!(mock.get("missing").unwrap_err().is_not_found());
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{Action, DEFAULT_VERSION, EXEC_ANNOTATION, KeyValue};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Operations on actions within one namespace.
pub trait ActionService: Send + Sync {
    /// Create or replace an action.
    ///
    /// The target name travels separately from the payload so partial
    /// update payloads can omit it. Without `overwrite`, inserting over an
    /// existing action fails with a 409 conflict.
    fn insert(&self, name: &str, action: &Action, overwrite: bool) -> Result<Action>;

    /// Fetch an action by name.
    ///
    /// # Errors
    ///
    /// Returns an error with status 404 if the action does not exist.
    fn get(&self, name: &str) -> Result<Action>;

    /// Delete an action by name.
    fn delete(&self, name: &str) -> Result<()>;
}

/// A request observed by [`MockActionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `insert(name, payload, overwrite)`
    Insert {
        /// Target name.
        name: String,
        /// Payload as sent.
        payload: Action,
        /// Overwrite flag.
        overwrite: bool,
    },
    /// `get(name)`
    Get {
        /// Target name.
        name: String,
    },
    /// `delete(name)`
    Delete {
        /// Target name.
        name: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    actions: BTreeMap<String, Action>,
    requests: Vec<Request>,
    fail_next: Option<Error>,
    fail_next_get: Option<Error>,
}

/// In-memory action service for tests.
///
/// Clones share the same storage, so a test can hand one clone to the code
/// under test and inspect the other afterwards.
#[derive(Debug, Clone)]
pub struct MockActionService {
    namespace: String,
    inject_exec_annotation: bool,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockActionService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockActionService {
    /// Create an empty mock for the `guest` namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: "guest".to_string(),
            inject_exec_annotation: true,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Whether stored actions get the platform's `exec` annotation.
    #[must_use]
    pub fn with_exec_annotation(mut self, inject: bool) -> Self {
        self.inject_exec_annotation = inject;
        self
    }

    /// Seed an action directly, bypassing request recording.
    ///
    /// The action is stored under [`Action::qualified_name`].
    pub fn add_action(&self, action: Action) {
        let mut state = self.lock();
        state.actions.insert(action.qualified_name(), action);
    }

    /// Get a stored action without recording a request.
    #[must_use]
    pub fn stored(&self, name: &str) -> Option<Action> {
        self.lock().actions.get(name).cloned()
    }

    /// All requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: Error) {
        self.lock().fail_next = Some(error);
    }

    /// Make the next `get` fail with `error`; other requests are unaffected.
    pub fn fail_next_get(&self, error: Error) {
        self.lock().fail_next_get = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn merge(&self, existing: Option<Action>, name: &str, payload: &Action) -> Action {
        // Packaged actions come back with a bare name and the package
        // appended to the namespace
        let (namespace, bare) = match name.split_once('/') {
            Some((package, bare)) => (format!("{}/{}", self.namespace, package), bare),
            None => (self.namespace.clone(), name),
        };
        let mut action = existing.unwrap_or_else(|| Action::named(bare));
        action.name = bare.to_string();
        action.namespace = Some(namespace);

        if !payload.version.is_empty() {
            action.version = payload.version.clone();
        }
        if action.version.is_empty() {
            action.version = DEFAULT_VERSION.to_string();
        }
        if payload.publish.is_some() {
            action.publish = payload.publish;
        }
        if action.publish.is_none() {
            action.publish = Some(false);
        }
        if payload.exec.is_some() {
            action.exec = payload.exec.clone();
        }
        if payload.limits.is_some() {
            action.limits = payload.limits;
        }
        if !payload.parameters.is_empty() {
            action.parameters = payload.parameters.clone();
        }
        if !payload.annotations.is_empty() {
            action.annotations = payload.annotations.clone();
        }

        if self.inject_exec_annotation {
            let kind = action
                .exec
                .as_ref()
                .map(|e| e.kind.clone())
                .unwrap_or_default();
            action.annotations.retain(|kv| kv.key != EXEC_ANNOTATION);
            action.annotations.push(KeyValue::new(EXEC_ANNOTATION, kind));
        }

        action
    }
}

impl ActionService for MockActionService {
    fn insert(&self, name: &str, action: &Action, overwrite: bool) -> Result<Action> {
        let mut state = self.lock();
        state.requests.push(Request::Insert {
            name: name.to_string(),
            payload: action.clone(),
            overwrite,
        });
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }

        let existing = state.actions.get(name).cloned();
        if existing.is_some() && !overwrite {
            return Err(Error::Api {
                status: 409,
                message: "resource already exists".to_string(),
                code: None,
            });
        }

        let stored = self.merge(existing, name, action);
        state.actions.insert(name.to_string(), stored.clone());
        Ok(stored)
    }

    fn get(&self, name: &str) -> Result<Action> {
        let mut state = self.lock();
        state.requests.push(Request::Get {
            name: name.to_string(),
        });
        if let Some(err) = state.fail_next.take().or_else(|| state.fail_next_get.take()) {
            return Err(err);
        }

        state
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(name))
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.requests.push(Request::Delete {
            name: name.to_string(),
        });
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }

        state
            .actions
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exec, Limits};

    fn sample(name: &str) -> Action {
        Action {
            name: name.to_string(),
            exec: Some(Exec {
                kind: "nodejs:20".to_string(),
                code: Some("function main() {}".to_string()),
                ..Exec::default()
            }),
            limits: Some(Limits {
                timeout: Some(600),
                memory: Some(128),
            }),
            ..Action::default()
        }
    }

    #[test]
    fn test_insert_then_get() {
        let mock = MockActionService::new();
        let stored = mock.insert("hello", &sample("hello"), false).unwrap();
        assert_eq!(stored.version, DEFAULT_VERSION);
        assert_eq!(stored.publish, Some(false));
        assert_eq!(stored.namespace.as_deref(), Some("guest"));

        let fetched = mock.get("hello").unwrap();
        assert_eq!(fetched, stored);
    }

    #[test]
    fn test_insert_injects_exec_annotation() {
        let mock = MockActionService::new();
        let stored = mock.insert("hello", &sample("hello"), false).unwrap();
        assert_eq!(
            stored.annotation(EXEC_ANNOTATION),
            Some(&serde_json::Value::String("nodejs:20".to_string()))
        );

        let plain = MockActionService::new().with_exec_annotation(false);
        let stored = plain.insert("hello", &sample("hello"), false).unwrap();
        assert!(stored.annotations.is_empty());
    }

    #[test]
    fn test_insert_existing_without_overwrite_conflicts() {
        let mock = MockActionService::new();
        mock.insert("hello", &sample("hello"), false).unwrap();

        let err = mock.insert("hello", &sample("hello"), false).unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_overwrite_merges_partial_payload() {
        let mock = MockActionService::new();
        mock.insert("hello", &sample("hello"), false).unwrap();

        let partial = Action {
            version: "0.0.2".to_string(),
            ..Action::default()
        };
        let stored = mock.insert("hello", &partial, true).unwrap();
        assert_eq!(stored.version, "0.0.2");
        assert_eq!(stored.exec.unwrap().kind, "nodejs:20");
        assert_eq!(stored.limits.unwrap().memory, Some(128));
    }

    #[test]
    fn test_packaged_action_reports_bare_name() {
        let mock = MockActionService::new();
        let stored = mock
            .insert("utils/hello", &sample("utils/hello"), false)
            .unwrap();
        assert_eq!(stored.name, "hello");
        assert_eq!(stored.namespace.as_deref(), Some("guest/utils"));
        assert_eq!(stored.qualified_name(), "utils/hello");

        assert_eq!(mock.get("utils/hello").unwrap(), stored);
        assert!(mock.get("hello").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mock = MockActionService::new();
        assert!(mock.delete("ghost").unwrap_err().is_not_found());

        mock.add_action(sample("hello"));
        mock.delete("hello").unwrap();
        assert!(mock.stored("hello").is_none());
    }

    #[test]
    fn test_requests_are_recorded_across_clones() {
        let mock = MockActionService::new();
        let handle = mock.clone();
        let _ = handle.get("hello");
        handle.insert("hello", &sample("hello"), true).unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            Request::Get {
                name: "hello".to_string()
            }
        );
        assert!(matches!(&requests[1], Request::Insert { overwrite: true, .. }));

        mock.clear_requests();
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let mock = MockActionService::new();
        mock.add_action(sample("hello"));
        mock.fail_next(Error::http("connection reset", None));

        assert!(mock.get("hello").is_err());
        assert!(mock.get("hello").is_ok());
    }

    #[test]
    fn test_fail_next_get_skips_other_requests() {
        let mock = MockActionService::new();
        mock.fail_next_get(Error::http("connection reset", None));

        mock.insert("hello", &sample("hello"), false).unwrap();
        assert!(mock.get("hello").is_err());
        assert!(mock.get("hello").is_ok());
    }
}
