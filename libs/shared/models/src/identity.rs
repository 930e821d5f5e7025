use std::fmt;

/// Opaque bearer token identifying the operator to the admin API.
///
/// The token is never inspected here; the authentication service owns it.
#[derive(Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Returns `None` for blank tokens so an empty header counts as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallerIdentity(***)")
    }
}
