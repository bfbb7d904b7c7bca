//! Permission set held by a client session.
//!
//! A session starts [`SessionPermissions::Unloaded`], becomes `Loaded` once the
//! login or profile response arrives, and goes back to `Unloaded` on logout.
//! Everything here is UX only: hiding a button or refusing navigation never
//! replaces the server-side check.

use std::collections::HashSet;

use crate::claims::Claims;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionPermissions {
    #[default]
    Unloaded,
    Loaded(HashSet<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny,
}

impl SessionPermissions {
    pub fn from_claims(claims: &Claims) -> Self {
        Self::Loaded(claims.permissions.iter().cloned().collect())
    }

    pub fn load<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Self::Loaded(codes.into_iter().map(Into::into).collect());
    }

    /// Logout.
    pub fn clear(&mut self) {
        *self = Self::Unloaded;
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Never fails: unknown, empty or malformed codes are simply not granted.
    pub fn has_permission(&self, code: &str) -> bool {
        match self {
            Self::Unloaded => false,
            Self::Loaded(codes) => codes.contains(code),
        }
    }

    /// Route guard.
    pub fn guard(&self, required: &str) -> GuardDecision {
        if self.has_permission(required) {
            GuardDecision::Allow
        } else {
            GuardDecision::Deny
        }
    }

    /// Keep only the actions whose required code the session holds.
    pub fn visible_actions<'a, T>(&self, actions: &'a [(T, &'a str)]) -> Vec<&'a T> {
        actions
            .iter()
            .filter(|(_, code)| self.has_permission(code))
            .map(|(action, _)| action)
            .collect()
    }
}
