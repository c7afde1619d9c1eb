use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::profile::UserRecord;
use crate::core::types::{
    CanonicalPair, InvitationId, InvitationStatus, PartnershipId, RequestId, RequestStatus, UserId,
};
use crate::partnership::error::PartnershipError;

/// A one-directional proposal to pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnershipRequest {
    pub id: RequestId,
    pub sender: UserId,
    pub receiver: UserId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// An established, symmetric pairing keyed by its canonical pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub id: PartnershipId,
    pub pair: CanonicalPair,
    pub created_at: DateTime<Utc>,
}

/// An email-addressed, token-based recruitment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    /// Target email, stored lowercased
    pub email: String,
    pub token: String,
    pub sender: UserId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// The relational tables behind the store.
///
/// Partnership membership is represented only by the relation keyed on the
/// canonical pair; "does user X have a partner" is always an existence
/// query, never a denormalized pointer that could drift.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    users: HashMap<UserId, UserRecord>,
    /// lowercased email -> user id (unique secondary key)
    email_index: HashMap<String, UserId>,
    requests: HashMap<RequestId, PartnershipRequest>,
    partnerships: HashMap<PartnershipId, Partnership>,
    /// canonical pair -> partnership id (unordered-pair uniqueness)
    pair_index: HashMap<CanonicalPair, PartnershipId>,
    invitations: HashMap<InvitationId, Invitation>,
    /// invitation token -> invitation id (unique secondary key)
    token_index: HashMap<String, InvitationId>,
    /// bearer access token -> user id; the only path from credential to user
    access_tokens: HashMap<String, UserId>,
}

impl Tables {
    // === users ===

    /// Insert a new user, enforcing email uniqueness.
    pub fn insert_user(&mut self, record: UserRecord) -> Result<(), PartnershipError> {
        if self.email_index.contains_key(&record.email) {
            return Err(PartnershipError::EmailTaken);
        }
        self.email_index
            .insert(record.email.clone(), record.id.clone());
        self.users.insert(record.id.clone(), record);
        Ok(())
    }

    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&UserRecord> {
        self.users.get(id)
    }

    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.email_index.get(email).and_then(|id| self.users.get(id))
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Bind a bearer access token to a user.
    pub fn insert_access_token(&mut self, token: String, user: UserId) {
        self.access_tokens.insert(token, user);
    }

    /// Resolve a bearer access token to its user.
    ///
    /// User ids are visible to other users through suggestions and
    /// profiles; only tokens from this index may authenticate.
    #[must_use]
    pub fn user_by_access_token(&self, token: &str) -> Option<&UserRecord> {
        self.access_tokens
            .get(token)
            .and_then(|id| self.users.get(id))
    }

    /// All users with no partnership, excluding the given user
    #[must_use]
    pub fn unpartnered_users_excluding(&self, exclude: &UserId) -> Vec<&UserRecord> {
        self.users
            .values()
            .filter(|record| &record.id != exclude && self.partner_of(&record.id).is_none())
            .collect()
    }

    // === partnerships ===

    /// The current partner of a user, if any: an existence query over the
    /// relation table.
    #[must_use]
    pub fn partner_of(&self, user: &UserId) -> Option<UserId> {
        self.pair_index
            .keys()
            .find_map(|pair| pair.other_member(user).cloned())
    }

    /// The partnership a user belongs to, if any
    #[must_use]
    pub fn partnership_of(&self, user: &UserId) -> Option<&Partnership> {
        self.pair_index.iter().find_map(|(pair, id)| {
            if pair.contains(user) {
                self.partnerships.get(id)
            } else {
                None
            }
        })
    }

    /// Create a partnership between two users.
    ///
    /// Enforces the unordered-pair uniqueness constraint and the one-partner
    /// invariant for both members. Callers run this inside a transaction, so
    /// the checks and the insert are atomic with respect to other writers.
    pub fn create_partnership(
        &mut self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Partnership, PartnershipError> {
        if a == b {
            return Err(PartnershipError::InvalidState(
                "cannot partner a user with themselves",
            ));
        }
        let pair = CanonicalPair::new(a.clone(), b.clone());
        if self.pair_index.contains_key(&pair) {
            return Err(PartnershipError::Conflict);
        }
        if self.partner_of(a).is_some() || self.partner_of(b).is_some() {
            return Err(PartnershipError::AlreadyPartnered);
        }

        let partnership = Partnership {
            id: PartnershipId::generate(),
            pair: pair.clone(),
            created_at: Utc::now(),
        };
        self.pair_index.insert(pair, partnership.id.clone());
        self.partnerships
            .insert(partnership.id.clone(), partnership.clone());
        Ok(partnership)
    }

    /// Remove the partnership a user belongs to, returning it if one existed.
    ///
    /// A single relation delete clears both sides at once; there is no
    /// per-user state to update separately.
    pub fn remove_partnership_of(&mut self, user: &UserId) -> Option<Partnership> {
        let pair = self
            .pair_index
            .keys()
            .find(|pair| pair.contains(user))
            .cloned()?;
        let id = self.pair_index.remove(&pair)?;
        self.partnerships.remove(&id)
    }

    #[must_use]
    pub fn partnership_count(&self) -> usize {
        self.partnerships.len()
    }

    // === requests ===

    pub fn insert_request(&mut self, request: PartnershipRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    #[must_use]
    pub fn request(&self, id: &RequestId) -> Option<&PartnershipRequest> {
        self.requests.get(id)
    }

    pub fn request_mut(&mut self, id: &RequestId) -> Option<&mut PartnershipRequest> {
        self.requests.get_mut(id)
    }

    /// Is there a pending request in either direction between the two?
    #[must_use]
    pub fn has_pending_between(&self, a: &UserId, b: &UserId) -> bool {
        self.requests.values().any(|request| {
            request.status == RequestStatus::Pending
                && ((&request.sender == a && &request.receiver == b)
                    || (&request.sender == b && &request.receiver == a))
        })
    }

    /// Pending requests sent or received by a user, newest first
    #[must_use]
    pub fn pending_requests_for(&self, user: &UserId) -> Vec<&PartnershipRequest> {
        let mut pending: Vec<&PartnershipRequest> = self
            .requests
            .values()
            .filter(|request| {
                request.status == RequestStatus::Pending
                    && (&request.sender == user || &request.receiver == user)
            })
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending
    }

    // === invitations ===

    pub fn insert_invitation(&mut self, invitation: Invitation) {
        self.token_index
            .insert(invitation.token.clone(), invitation.id.clone());
        self.invitations.insert(invitation.id.clone(), invitation);
    }

    #[must_use]
    pub fn invitation_by_token(&self, token: &str) -> Option<&Invitation> {
        self.token_index
            .get(token)
            .and_then(|id| self.invitations.get(id))
    }

    pub fn invitation_mut(&mut self, id: &InvitationId) -> Option<&mut Invitation> {
        self.invitations.get_mut(id)
    }

    /// Pending invitations sent by a user, newest first
    #[must_use]
    pub fn pending_invitations_from(&self, sender: &UserId) -> Vec<&Invitation> {
        let mut pending: Vec<&Invitation> = self
            .invitations
            .values()
            .filter(|invitation| {
                invitation.status == InvitationStatus::Pending && &invitation.sender == sender
            })
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending
    }
}

/// In-memory relational store with transactional multi-row updates.
///
/// One lock serializes every multi-step operation, so read-then-write
/// sequences inside a [`transaction`](PartnerStore::transaction) closure are
/// atomic with respect to all other readers and writers. A failed closure
/// rolls the tables back to their pre-transaction snapshot.
///
/// This is the bundled reference backend for the storage collaborator; a
/// SQL-backed implementation would supply the same atomicity with real
/// transactions.
#[derive(Debug, Default)]
pub struct PartnerStore {
    tables: Mutex<Tables>,
}

impl PartnerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only query against a consistent snapshot of the tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self
            .tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&tables)
    }

    /// Run a closure atomically against the tables.
    ///
    /// All reads and writes inside the closure happen under one lock; on
    /// `Err` every mutation the closure made is rolled back, so callers can
    /// interleave validation and writes freely.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, PartnershipError>,
    ) -> Result<R, PartnershipError> {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let snapshot = tables.clone();
        match f(&mut tables) {
            Ok(result) => Ok(result),
            Err(error) => {
                *tables = snapshot;
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::UserRecord;

    fn user(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            name: id.to_string(),
            email: email.to_string(),
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_email_uniqueness() {
        let mut tables = Tables::default();
        tables.insert_user(user("a", "a@example.com")).unwrap();

        let err = tables.insert_user(user("b", "a@example.com")).unwrap_err();
        assert!(matches!(err, PartnershipError::EmailTaken));
        assert!(tables.user(&UserId::new("b")).is_none());
    }

    #[test]
    fn test_partnership_pair_uniqueness() {
        let mut tables = Tables::default();
        tables.insert_user(user("a", "a@example.com")).unwrap();
        tables.insert_user(user("b", "b@example.com")).unwrap();

        tables
            .create_partnership(&UserId::new("a"), &UserId::new("b"))
            .unwrap();

        let err = tables
            .create_partnership(&UserId::new("b"), &UserId::new("a"))
            .unwrap_err();
        assert!(matches!(err, PartnershipError::Conflict));
    }

    #[test]
    fn test_one_partner_invariant() {
        let mut tables = Tables::default();
        for (id, email) in [("a", "a@x.co"), ("b", "b@x.co"), ("c", "c@x.co")] {
            tables.insert_user(user(id, email)).unwrap();
        }

        tables
            .create_partnership(&UserId::new("a"), &UserId::new("b"))
            .unwrap();

        let err = tables
            .create_partnership(&UserId::new("a"), &UserId::new("c"))
            .unwrap_err();
        assert!(matches!(err, PartnershipError::AlreadyPartnered));
    }

    #[test]
    fn test_self_partnership_rejected() {
        let mut tables = Tables::default();
        tables.insert_user(user("a", "a@x.co")).unwrap();

        let err = tables
            .create_partnership(&UserId::new("a"), &UserId::new("a"))
            .unwrap_err();
        assert!(matches!(err, PartnershipError::InvalidState(_)));
    }

    #[test]
    fn test_remove_partnership_clears_both_sides() {
        let mut tables = Tables::default();
        tables.insert_user(user("a", "a@x.co")).unwrap();
        tables.insert_user(user("b", "b@x.co")).unwrap();

        tables
            .create_partnership(&UserId::new("a"), &UserId::new("b"))
            .unwrap();
        let removed = tables.remove_partnership_of(&UserId::new("b"));
        assert!(removed.is_some());

        assert!(tables.partner_of(&UserId::new("a")).is_none());
        assert!(tables.partner_of(&UserId::new("b")).is_none());
        assert_eq!(tables.partnership_count(), 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = PartnerStore::new();

        let result: Result<(), PartnershipError> = store.transaction(|tables| {
            tables.insert_user(user("a", "a@x.co"))?;
            Err(PartnershipError::Conflict)
        });
        assert!(result.is_err());

        // The user insert inside the failed transaction must not persist
        store.read(|tables| {
            assert_eq!(tables.user_count(), 0);
            assert!(tables.user_by_email("a@x.co").is_none());
        });
    }

    #[test]
    fn test_pending_requests_sorted_newest_first() {
        let mut tables = Tables::default();
        let me = UserId::new("me");
        let old = PartnershipRequest {
            id: RequestId::new("r1"),
            sender: me.clone(),
            receiver: UserId::new("x"),
            status: RequestStatus::Pending,
            created_at: Utc::now() - chrono::Duration::minutes(5),
        };
        let new = PartnershipRequest {
            id: RequestId::new("r2"),
            sender: UserId::new("y"),
            receiver: me.clone(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        tables.insert_request(old);
        tables.insert_request(new);

        let pending = tables.pending_requests_for(&me);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, RequestId::new("r2"));
    }
}
