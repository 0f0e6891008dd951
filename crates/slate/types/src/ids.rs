//! Identifier newtypes

use serde::{Deserialize, Serialize};

/// Identity of the sailor owning a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a new random UserId.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a UserId from a known string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a job billet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BilletId(pub String);

impl BilletId {
    /// Generate a new random BilletId.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a BilletId from a known string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BilletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of an application on the slate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Generate a new random ApplicationId.
    pub fn generate() -> Self {
        Self(format!("app-{}", uuid::Uuid::new_v4()))
    }

    /// Create an ApplicationId from a known string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Short display form (first 12 chars).
    pub fn short(&self) -> String {
        self.0.chars().take(12).collect()
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ApplicationId::generate(), ApplicationId::generate());
        assert_ne!(BilletId::generate(), BilletId::generate());
    }

    #[test]
    fn test_application_id_prefix() {
        let id = ApplicationId::generate();
        assert!(id.0.starts_with("app-"));
        assert_eq!(id.short().len(), 12);
    }

    #[test]
    fn test_ids_serialize_transparently_as_newtypes() {
        let json = serde_json::to_string(&BilletId::new("B-100")).unwrap();
        assert_eq!(json, "\"B-100\"");
    }
}
