//! Request context threaded through token endpoint validation steps.
//!
//! Each step inspects the context and either enriches it or marks it failed.
//! A failed context is passed through unchanged by later steps, so a pipeline
//! of checks surfaces the first failure without every step re-checking state.

use std::collections::HashMap;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::Client;

/// Parsed request parameters plus the state accumulated by validation steps.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    params: HashMap<String, String>,
    client: Option<Client>,
    error: Option<AuthError>,
}

impl RequestContext {
    /// Creates a context from request parameters.
    #[must_use]
    pub fn new(params: HashMap<String, String>) -> Self {
        Self {
            params,
            client: None,
            error: None,
        }
    }

    /// Adds a request parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns a request parameter, treating blank values as absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns the client attached by a successful client lookup.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Returns the failure recorded by an earlier step, if any.
    #[must_use]
    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    /// Returns `true` once any step has failed the request.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Attaches a resolved client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Marks the request failed. The first recorded failure is kept.
    #[must_use]
    pub fn fail(mut self, error: AuthError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Converts the context into the attached client or the recorded failure.
    ///
    /// # Errors
    ///
    /// Returns the recorded failure, or `InvalidClient` if no step attached
    /// a client.
    pub fn into_client(self) -> AuthResult<Client> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.client
            .ok_or_else(|| AuthError::invalid_client("No client attached to request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_param_is_absent() {
        let ctx = RequestContext::default()
            .with_param("client_id", "  ")
            .with_param("scope", "read");
        assert_eq!(ctx.param("client_id"), None);
        assert_eq!(ctx.param("scope"), Some("read"));
        assert_eq!(ctx.param("missing"), None);
    }

    #[test]
    fn test_first_failure_wins() {
        let ctx = RequestContext::default()
            .fail(AuthError::invalid_request("first"))
            .fail(AuthError::invalid_client("second"));
        assert!(ctx.is_failed());
        assert_eq!(ctx.error(), Some(&AuthError::invalid_request("first")));
    }

    #[test]
    fn test_into_client() {
        let client = Client::new("my-app", "My App");
        let ctx = RequestContext::default().with_client(client.clone());
        assert_eq!(ctx.into_client().unwrap(), client);

        let err = RequestContext::default().into_client().unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));

        let err = RequestContext::default()
            .with_client(client)
            .fail(AuthError::invalid_scope("nope"))
            .into_client()
            .unwrap_err();
        assert_eq!(err, AuthError::invalid_scope("nope"));
    }
}
