//! Permanent-admin access policy.

use std::collections::HashSet;

use crate::user::{Role, UserRecord};

/// Emails that always resolve to [`Role::Admin`], whatever the backend says.
///
/// Built once from configuration and passed to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    permanent_admins: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(permanent_admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            permanent_admins: permanent_admins
                .into_iter()
                .map(|email| normalize(email.as_ref()))
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    /// Create from the comma-separated `PERMANENT_ADMINS` environment variable.
    pub fn from_env() -> Self {
        std::env::var("PERMANENT_ADMINS")
            .map(|s| Self::new(s.split(',')))
            .unwrap_or_default()
    }

    pub fn is_permanent_admin(&self, email: &str) -> bool {
        self.permanent_admins.contains(&normalize(email))
    }

    /// Role the user actually gets.
    pub fn effective_role(&self, email: &str, declared: Role) -> Role {
        if self.is_permanent_admin(email) {
            Role::Admin
        } else {
            declared
        }
    }

    pub fn is_admin(&self, user: &UserRecord) -> bool {
        user.role == Role::Admin || self.is_permanent_admin(&user.email)
    }

    /// Apply the policy to a user record fetched from the backend.
    pub fn apply(&self, mut user: UserRecord) -> UserRecord {
        user.role = self.effective_role(&user.email, user.role);
        user
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
