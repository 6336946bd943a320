use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Allow-list gate in front of every reviewer operation. Comparisons ignore case.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    authorized: BTreeSet<String>,
    admins: BTreeSet<String>,
}

/// An authenticated reviewer. `email` is lower-cased and serves as the evaluator identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reviewer {
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not authorized to review case studies")]
    NotAuthorized(String),
}

impl AccessPolicy {
    /// Admins are always authorized.
    pub fn new<A, B>(authorized: A, admins: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let normalize = |email: &str| email.trim().to_lowercase();
        let admins: BTreeSet<String> = admins
            .into_iter()
            .map(|email| normalize(email.as_ref()))
            .filter(|email| !email.is_empty())
            .collect();
        let authorized = authorized
            .into_iter()
            .map(|email| normalize(email.as_ref()))
            .filter(|email| !email.is_empty())
            .chain(admins.iter().cloned())
            .collect();
        Self { authorized, admins }
    }

    pub fn authorize(&self, email: &str) -> Result<Reviewer, AccessError> {
        let trimmed = email.trim();
        if !is_valid_email(trimmed) {
            return Err(AccessError::InvalidEmail(trimmed.to_string()));
        }

        let email = trimmed.to_lowercase();
        if !self.authorized.contains(&email) {
            warn!(reviewer = %email, "rejected unauthorized reviewer");
            return Err(AccessError::NotAuthorized(email));
        }

        Ok(Reviewer {
            is_admin: self.admins.contains(&email),
            email,
        })
    }

    pub fn authorized_count(&self) -> usize {
        self.authorized.len()
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(["Reviewer@Example.com", " second@example.com "], ["lead@example.com"])
    }

    #[test]
    fn authorizes_case_insensitively() {
        let reviewer = policy()
            .authorize("  REVIEWER@example.COM ")
            .expect("authorized");
        assert_eq!(
            reviewer,
            Reviewer {
                email: "reviewer@example.com".to_string(),
                is_admin: false,
            }
        );
    }

    #[test]
    fn admins_are_authorized_and_flagged() {
        let reviewer = policy().authorize("lead@example.com").expect("admin");
        assert!(reviewer.is_admin);
        assert_eq!(policy().authorized_count(), 3);
    }

    #[test]
    fn rejects_malformed_and_unknown_emails() {
        assert_eq!(
            policy().authorize("not-an-email"),
            Err(AccessError::InvalidEmail("not-an-email".to_string()))
        );
        assert_eq!(
            policy().authorize("someone@example.c"),
            Err(AccessError::InvalidEmail("someone@example.c".to_string()))
        );
        assert_eq!(
            policy().authorize("stranger@example.com"),
            Err(AccessError::NotAuthorized("stranger@example.com".to_string()))
        );
    }

    #[test]
    fn empty_policy_rejects_everyone() {
        let err = AccessPolicy::default()
            .authorize("reviewer@example.com")
            .expect_err("nobody allowed");
        assert!(matches!(err, AccessError::NotAuthorized(_)));
    }
}
