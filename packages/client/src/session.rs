//! The authenticated session context.

/// Server-issued authentication context.
///
/// Created empty, established by a successful login and invalidated before
/// every new login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    authenticated: bool,
    customer_key: String,
}

impl Session {
    pub fn new(customer_key: impl Into<String>) -> Self {
        Self {
            customer_key: customer_key.into(),
            ..Default::default()
        }
    }

    pub fn establish(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
        self.authenticated = !self.session_id.is_empty();
    }

    pub fn invalidate(&mut self) {
        self.session_id.clear();
        self.authenticated = false;
    }

    /// True only when authenticated with a non-empty session id.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && !self.session_id.is_empty()
    }

    /// The session id, if authenticated.
    pub fn session_id(&self) -> Option<&str> {
        self.is_authenticated().then_some(self.session_id.as_str())
    }

    pub fn customer_key(&self) -> &str {
        &self.customer_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut session = Session::new("cust");
        assert!(!session.is_authenticated());
        assert_eq!(session.session_id(), None);

        session.establish("sess-1");
        assert_eq!(session.session_id(), Some("sess-1"));

        session.invalidate();
        assert_eq!(session.session_id(), None);
        assert_eq!(session.customer_key(), "cust");
    }

    #[test]
    fn empty_id_is_not_authenticated() {
        let mut session = Session::new("cust");
        session.establish("");
        assert!(!session.is_authenticated());
    }
}
