//! Authenticated request context
//!
//! Passed explicitly to every collaborator call that talks to the API, never
//! read from process-wide state.

/// Credentials for one user's requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
    user_id: Option<String>,
}

impl AuthContext {
    /// Context for requests made without a session
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Headers to attach to an API request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        self.token
            .iter()
            .map(|token| ("Authorization", token.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        assert!(AuthContext::anonymous().headers().is_empty());
        let auth = AuthContext::with_token("mra_abc").for_user("u1");
        assert_eq!(auth.headers(), vec![("Authorization", "mra_abc".to_string())]);
        assert_eq!(auth.user_id(), Some("u1"));
        assert!(auth.is_authenticated());
    }
}
