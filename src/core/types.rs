use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a partnership request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an established partnership
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnershipId(pub String);

impl PartnershipId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for PartnershipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an email invitation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub String);

impl InvitationId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a partnership request.
///
/// Created pending; the receiver alone moves it to one of the two terminal
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Lifecycle state of an email invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

/// An unordered pair of users stored in one unique representation.
///
/// The lexicographically smaller identifier is always `first`, so the
/// unordered pair {A,B} maps to exactly one `CanonicalPair` and can serve
/// as a unique key for partnerships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalPair {
    first: UserId,
    second: UserId,
}

impl CanonicalPair {
    /// Build the canonical representation of the unordered pair {a, b}.
    ///
    /// The two identifiers must be distinct; a user cannot pair with
    /// themselves.
    #[must_use]
    pub fn new(a: UserId, b: UserId) -> Self {
        debug_assert!(a != b, "a pair must reference two distinct users");
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    #[must_use]
    pub fn first(&self) -> &UserId {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &UserId {
        &self.second
    }

    /// Does this pair include the given user?
    #[must_use]
    pub fn contains(&self, user: &UserId) -> bool {
        &self.first == user || &self.second == user
    }

    /// The other member of the pair, if `user` is a member.
    #[must_use]
    pub fn other_member(&self, user: &UserId) -> Option<&UserId> {
        if &self.first == user {
            Some(&self.second)
        } else if &self.second == user {
            Some(&self.first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_order_independent() {
        let a = UserId::new("alice");
        let b = UserId::new("bob");

        let pair1 = CanonicalPair::new(a.clone(), b.clone());
        let pair2 = CanonicalPair::new(b.clone(), a.clone());

        assert_eq!(pair1, pair2);
        assert_eq!(pair1.first(), &a);
        assert_eq!(pair1.second(), &b);
    }

    #[test]
    fn test_canonical_pair_membership() {
        let a = UserId::new("alice");
        let b = UserId::new("bob");
        let c = UserId::new("carol");

        let pair = CanonicalPair::new(b.clone(), a.clone());
        assert!(pair.contains(&a));
        assert!(pair.contains(&b));
        assert!(!pair.contains(&c));

        assert_eq!(pair.other_member(&a), Some(&b));
        assert_eq!(pair.other_member(&b), Some(&a));
        assert_eq!(pair.other_member(&c), None);
    }

    #[test]
    fn test_generated_ids_unique() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| UserId::generate().0).collect();
        assert_eq!(ids.len(), 100);
    }
}
