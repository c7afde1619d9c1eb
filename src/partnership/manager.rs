use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::profile::{NewUser, UserProfile, UserRecord};
use crate::core::types::{InvitationId, InvitationStatus, RequestId, RequestStatus, UserId};
use crate::matching::finder::Candidate;
use crate::partnership::error::PartnershipError;
use crate::partnership::store::{Invitation, PartnerStore, Partnership, PartnershipRequest};
use crate::partnership::token::{generate_access_token, generate_invitation_token};
use crate::utils::validation::{normalize_email, validate_bio, validate_name};

/// Outcome of a registration, including whether an invitation token was
/// consumed into a partnership
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: UserRecord,
    /// Bearer credential for the new user. Handed out exactly once, here;
    /// it is not the user id, which other users get to see.
    pub access_token: String,
    pub partnership_created: bool,
}

/// A pending request together with both parties' public profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestView {
    pub id: RequestId,
    pub sender: UserProfile,
    pub receiver: UserProfile,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Outcome of accepting a request
#[derive(Debug, Clone)]
pub struct AcceptedMatch {
    pub partnership: Partnership,
    /// The other member, from the acting user's point of view
    pub partner: UserProfile,
}

/// Mediates the three pairing pathways as one state machine over the
/// unordered pair {A,B}: direct request/accept/reject, email invitation
/// consumed at registration, and mutual unmatch.
///
/// Every operation validates and commits inside a single store transaction,
/// so the one-partner-per-user and unique-pair invariants hold under
/// concurrent requests: of two racing accepts touching the same user,
/// exactly one commits.
#[derive(Debug, Clone)]
pub struct PartnershipManager {
    store: Arc<PartnerStore>,
}

impl PartnershipManager {
    #[must_use]
    pub fn new(store: Arc<PartnerStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<PartnerStore> {
        &self.store
    }

    /// Resolve a bearer access token to the user it was issued to.
    ///
    /// Returns `None` for anything that is not a live token, including
    /// user ids, which are public.
    #[must_use]
    pub fn authenticate(&self, access_token: &str) -> Option<UserId> {
        self.store.read(|tables| {
            tables
                .user_by_access_token(access_token)
                .map(|record| record.id.clone())
        })
    }

    /// Register a new user, consuming a pending invitation token when one
    /// is supplied and valid.
    ///
    /// An invalid, already-consumed, or email-mismatched token never fails
    /// the registration; it is ignored and the invitation (if any) is left
    /// untouched. A valid token creates the user, the partnership with the
    /// inviter, and the accepted-invitation mark in one transaction.
    ///
    /// # Errors
    ///
    /// `EmailTaken` if the email is already registered; `Validation` for
    /// malformed input.
    pub fn register_user(
        &self,
        new_user: &NewUser,
        invite_token: Option<&str>,
    ) -> Result<Registration, PartnershipError> {
        let name = validate_name(&new_user.name)?;
        let email = normalize_email(&new_user.email)?;
        let bio = validate_bio(new_user.bio.as_deref())?;
        let token = invite_token.map(str::trim).filter(|t| !t.is_empty());
        let access_token = generate_access_token();

        self.store.transaction(|tables| {
            // Resolve the invitation before creating the user so a
            // mismatched token is ignored cleanly
            let invitation = token
                .and_then(|t| tables.invitation_by_token(t))
                .filter(|inv| inv.status == InvitationStatus::Pending && inv.email == email)
                .map(|inv| (inv.id.clone(), inv.sender.clone()));

            let user = UserRecord {
                id: UserId::generate(),
                name: name.clone(),
                email: email.clone(),
                bio: bio.clone(),
                created_at: Utc::now(),
            };
            tables.insert_user(user.clone())?;
            tables.insert_access_token(access_token.clone(), user.id.clone());

            let mut partnership_created = false;
            if let Some((invitation_id, inviter)) = invitation {
                // The inviter may have paired with someone else since
                // sending this invitation; in that case registration still
                // succeeds and the invitation stays pending.
                match tables.create_partnership(&inviter, &user.id) {
                    Ok(partnership) => {
                        if let Some(inv) = tables.invitation_mut(&invitation_id) {
                            inv.status = InvitationStatus::Accepted;
                            inv.accepted_at = Some(Utc::now());
                        }
                        tracing::info!(
                            partnership = %partnership.id,
                            inviter = %inviter,
                            "invitation consumed at registration"
                        );
                        partnership_created = true;
                    }
                    Err(
                        PartnershipError::AlreadyPartnered
                        | PartnershipError::Conflict
                        | PartnershipError::InvalidState(_),
                    ) => {
                        tracing::warn!(
                            inviter = %inviter,
                            "invitation valid but inviter no longer available; skipping partnership"
                        );
                    }
                    Err(other) => return Err(other),
                }
            }

            Ok(Registration {
                user,
                access_token,
                partnership_created,
            })
        })
    }

    /// Send a partnership request from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// `AlreadyPartnered` if either side has a partner, `DuplicatePending`
    /// if a pending request already exists in either direction, `NotFound`
    /// for unknown users, `InvalidState` for self-requests.
    pub fn send_request(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> Result<PartnershipRequest, PartnershipError> {
        self.store.transaction(|tables| {
            if sender == receiver {
                return Err(PartnershipError::InvalidState(
                    "cannot send a request to yourself",
                ));
            }
            if tables.user(sender).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            if tables.user(receiver).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            if tables.partner_of(sender).is_some() || tables.partner_of(receiver).is_some() {
                return Err(PartnershipError::AlreadyPartnered);
            }
            if tables.has_pending_between(sender, receiver) {
                return Err(PartnershipError::DuplicatePending);
            }

            let request = PartnershipRequest {
                id: RequestId::generate(),
                sender: sender.clone(),
                receiver: receiver.clone(),
                status: RequestStatus::Pending,
                created_at: Utc::now(),
            };
            tables.insert_request(request.clone());
            tracing::debug!(request = %request.id, %sender, %receiver, "request created");
            Ok(request)
        })
    }

    /// Pending requests sent or received by a user, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub fn pending_requests(&self, user: &UserId) -> Result<Vec<RequestView>, PartnershipError> {
        self.store.read(|tables| {
            if tables.user(user).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            let views = tables
                .pending_requests_for(user)
                .into_iter()
                .filter_map(|request| {
                    let sender = tables.user(&request.sender)?;
                    let receiver = tables.user(&request.receiver)?;
                    Some(RequestView {
                        id: request.id.clone(),
                        sender: UserProfile::from_record(sender),
                        receiver: UserProfile::from_record(receiver),
                        status: request.status,
                        created_at: request.created_at,
                    })
                })
                .collect();
            Ok(views)
        })
    }

    /// Accept a pending request as its receiver.
    ///
    /// Creates the partnership and marks the request accepted in one
    /// transaction; the partner-state of both members is re-checked under
    /// the same lock, so a racing accept involving either user loses with
    /// `AlreadyPartnered`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAuthorized` (acting user is not the receiver),
    /// `InvalidState` (no longer pending), `AlreadyPartnered`/`Conflict`.
    pub fn accept_request(
        &self,
        request_id: &RequestId,
        acting: &UserId,
    ) -> Result<AcceptedMatch, PartnershipError> {
        self.store.transaction(|tables| {
            let (sender, receiver, status) = {
                let request = tables
                    .request(request_id)
                    .ok_or(PartnershipError::NotFound("Request"))?;
                (
                    request.sender.clone(),
                    request.receiver.clone(),
                    request.status,
                )
            };

            if &receiver != acting {
                return Err(PartnershipError::NotAuthorized);
            }
            if status != RequestStatus::Pending {
                return Err(PartnershipError::InvalidState("request is no longer pending"));
            }

            let partnership = tables.create_partnership(&sender, &receiver)?;
            if let Some(request) = tables.request_mut(request_id) {
                request.status = RequestStatus::Accepted;
            }

            let partner = tables
                .user(&sender)
                .map(UserProfile::from_record)
                .ok_or(PartnershipError::NotFound("User"))?;

            tracing::info!(partnership = %partnership.id, request = %request_id, "request accepted");
            Ok(AcceptedMatch {
                partnership,
                partner,
            })
        })
    }

    /// Reject a pending request as its receiver.
    ///
    /// Rejection is terminal for the request, but a fresh request between
    /// the same pair may be sent afterwards.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAuthorized`, `InvalidState`.
    pub fn reject_request(
        &self,
        request_id: &RequestId,
        acting: &UserId,
    ) -> Result<(), PartnershipError> {
        self.store.transaction(|tables| {
            let (receiver, status) = {
                let request = tables
                    .request(request_id)
                    .ok_or(PartnershipError::NotFound("Request"))?;
                (request.receiver.clone(), request.status)
            };

            if &receiver != acting {
                return Err(PartnershipError::NotAuthorized);
            }
            if status != RequestStatus::Pending {
                return Err(PartnershipError::InvalidState("request is no longer pending"));
            }

            if let Some(request) = tables.request_mut(request_id) {
                request.status = RequestStatus::Rejected;
            }
            Ok(())
        })
    }

    /// Dissolve the acting user's partnership, returning the former
    /// partner's id.
    ///
    /// One relation delete removes both memberships; neither side can be
    /// left pointing at a partner who no longer points back.
    ///
    /// # Errors
    ///
    /// `NoPartner` if the user is not currently partnered, `NotFound` for
    /// an unknown user.
    pub fn unmatch(&self, acting: &UserId) -> Result<UserId, PartnershipError> {
        self.store.transaction(|tables| {
            if tables.user(acting).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            let partnership = tables
                .remove_partnership_of(acting)
                .ok_or(PartnershipError::NoPartner)?;
            let former = partnership
                .pair
                .other_member(acting)
                .cloned()
                .ok_or(PartnershipError::NoPartner)?;
            tracing::info!(partnership = %partnership.id, "partnership dissolved");
            Ok(former)
        })
    }

    /// Create an email invitation from an unpartnered sender to an email
    /// that is not yet registered.
    ///
    /// The returned invitation carries the freshly generated token. Email
    /// delivery is the caller's concern and must never roll this back.
    ///
    /// # Errors
    ///
    /// `AlreadyPartnered`, `EmailTaken` (use a direct request instead),
    /// `NotFound`, `Validation` for a malformed address.
    pub fn invite_by_email(
        &self,
        sender: &UserId,
        target_email: &str,
    ) -> Result<Invitation, PartnershipError> {
        let email = normalize_email(target_email)?;
        let token = generate_invitation_token();

        self.store.transaction(|tables| {
            if tables.user(sender).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            if tables.partner_of(sender).is_some() {
                return Err(PartnershipError::AlreadyPartnered);
            }
            if tables.user_by_email(&email).is_some() {
                return Err(PartnershipError::EmailTaken);
            }

            let invitation = Invitation {
                id: InvitationId::generate(),
                email: email.clone(),
                token: token.clone(),
                sender: sender.clone(),
                status: InvitationStatus::Pending,
                created_at: Utc::now(),
                accepted_at: None,
            };
            tables.insert_invitation(invitation.clone());
            tracing::info!(invitation = %invitation.id, "invitation created");
            Ok(invitation)
        })
    }

    /// Pending invitations sent by a user, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub fn sent_invitations(&self, sender: &UserId) -> Result<Vec<Invitation>, PartnershipError> {
        self.store.read(|tables| {
            if tables.user(sender).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            Ok(tables
                .pending_invitations_from(sender)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// The acting user's current partner, if any.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub fn current_partner(&self, user: &UserId) -> Result<Option<UserProfile>, PartnershipError> {
        self.store.read(|tables| {
            if tables.user(user).is_none() {
                return Err(PartnershipError::NotFound("User"));
            }
            Ok(tables
                .partner_of(user)
                .and_then(|partner| tables.user(&partner).map(UserProfile::from_record)))
        })
    }

    /// The requester's record plus every unpartnered candidate, for the
    /// match finder.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown requester, `AlreadyPartnered` when the
    /// requester has a partner (suggestions make no sense then).
    pub fn suggestion_pool(
        &self,
        requester: &UserId,
    ) -> Result<(UserRecord, Vec<Candidate>), PartnershipError> {
        self.store.read(|tables| {
            let requester_record = tables
                .user(requester)
                .cloned()
                .ok_or(PartnershipError::NotFound("User"))?;
            if tables.partner_of(requester).is_some() {
                return Err(PartnershipError::AlreadyPartnered);
            }
            let candidates = tables
                .unpartnered_users_excluding(requester)
                .into_iter()
                .map(|record| Candidate {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    bio: record.bio.clone(),
                    has_partner: false,
                    member_since: record.created_at,
                })
                .collect();
            Ok((requester_record, candidates))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PartnershipManager {
        PartnershipManager::new(Arc::new(PartnerStore::new()))
    }

    fn register(manager: &PartnershipManager, name: &str) -> UserId {
        manager
            .register_user(
                &NewUser {
                    name: name.to_string(),
                    email: format!("{name}@example.com"),
                    bio: None,
                },
                None,
            )
            .unwrap()
            .user
            .id
    }

    #[test]
    fn test_access_token_authenticates_public_id_does_not() {
        let manager = manager();
        let registration = manager
            .register_user(
                &NewUser {
                    name: "Alice".to_string(),
                    email: "alice@example.com".to_string(),
                    bio: None,
                },
                None,
            )
            .unwrap();

        // The credential is a fresh random token, not the public id
        assert_ne!(registration.access_token, registration.user.id.0);
        assert_eq!(
            manager.authenticate(&registration.access_token),
            Some(registration.user.id.clone())
        );

        // A user id leaked through profiles must never authenticate
        assert_eq!(manager.authenticate(&registration.user.id.0), None);
    }

    #[test]
    fn test_duplicate_pending_in_either_direction() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");

        manager.send_request(&a, &b).unwrap();
        assert!(matches!(
            manager.send_request(&a, &b).unwrap_err(),
            PartnershipError::DuplicatePending
        ));
        assert!(matches!(
            manager.send_request(&b, &a).unwrap_err(),
            PartnershipError::DuplicatePending
        ));
    }

    #[test]
    fn test_accept_creates_symmetric_partnership() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");

        let request = manager.send_request(&a, &b).unwrap();
        let accepted = manager.accept_request(&request.id, &b).unwrap();
        assert_eq!(accepted.partner.id, a);

        let partner_of_a = manager.current_partner(&a).unwrap().unwrap();
        let partner_of_b = manager.current_partner(&b).unwrap().unwrap();
        assert_eq!(partner_of_a.id, b);
        assert_eq!(partner_of_b.id, a);
    }

    #[test]
    fn test_accept_requires_receiver() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");
        let c = register(&manager, "carol");

        let request = manager.send_request(&a, &b).unwrap();
        assert!(matches!(
            manager.accept_request(&request.id, &a).unwrap_err(),
            PartnershipError::NotAuthorized
        ));
        assert!(matches!(
            manager.accept_request(&request.id, &c).unwrap_err(),
            PartnershipError::NotAuthorized
        ));
    }

    #[test]
    fn test_accept_twice_is_invalid_state() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");

        let request = manager.send_request(&a, &b).unwrap();
        manager.accept_request(&request.id, &b).unwrap();
        assert!(matches!(
            manager.accept_request(&request.id, &b).unwrap_err(),
            PartnershipError::InvalidState(_)
        ));
        // No duplicate partnership was created by the retry
        manager
            .store()
            .read(|tables| assert_eq!(tables.partnership_count(), 1));
    }

    #[test]
    fn test_reject_then_new_request_allowed() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");

        let request = manager.send_request(&a, &b).unwrap();
        manager.reject_request(&request.id, &b).unwrap();

        // Terminal: cannot reject or accept again
        assert!(matches!(
            manager.reject_request(&request.id, &b).unwrap_err(),
            PartnershipError::InvalidState(_)
        ));

        // But the pair may try again
        manager.send_request(&b, &a).unwrap();
    }

    #[test]
    fn test_unmatch_clears_both_then_fails() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");

        let request = manager.send_request(&a, &b).unwrap();
        manager.accept_request(&request.id, &b).unwrap();

        let former = manager.unmatch(&a).unwrap();
        assert_eq!(former, b);
        assert!(manager.current_partner(&a).unwrap().is_none());
        assert!(manager.current_partner(&b).unwrap().is_none());

        assert!(matches!(
            manager.unmatch(&a).unwrap_err(),
            PartnershipError::NoPartner
        ));
    }

    #[test]
    fn test_invite_rejects_registered_email() {
        let manager = manager();
        let a = register(&manager, "alice");
        register(&manager, "bob");

        assert!(matches!(
            manager.invite_by_email(&a, "bob@example.com").unwrap_err(),
            PartnershipError::EmailTaken
        ));
        // No invitation record was created
        assert!(manager.sent_invitations(&a).unwrap().is_empty());
    }

    #[test]
    fn test_invitation_consumed_on_matching_registration() {
        let manager = manager();
        let a = register(&manager, "alice");

        let invitation = manager.invite_by_email(&a, "new@example.com").unwrap();
        let registration = manager
            .register_user(
                &NewUser {
                    name: "Newcomer".to_string(),
                    email: "new@example.com".to_string(),
                    bio: None,
                },
                Some(&invitation.token),
            )
            .unwrap();

        assert!(registration.partnership_created);
        let partner = manager.current_partner(&a).unwrap().unwrap();
        assert_eq!(partner.id, registration.user.id);
        assert!(manager.sent_invitations(&a).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_invitation_email_ignored() {
        let manager = manager();
        let a = register(&manager, "alice");

        let invitation = manager.invite_by_email(&a, "intended@example.com").unwrap();
        let registration = manager
            .register_user(
                &NewUser {
                    name: "Stranger".to_string(),
                    email: "other@example.com".to_string(),
                    bio: None,
                },
                Some(&invitation.token),
            )
            .unwrap();

        assert!(!registration.partnership_created);
        assert!(manager.current_partner(&a).unwrap().is_none());
        // Invitation stays pending for the intended recipient
        assert_eq!(manager.sent_invitations(&a).unwrap().len(), 1);
    }

    #[test]
    fn test_bogus_token_ignored() {
        let manager = manager();
        let registration = manager
            .register_user(
                &NewUser {
                    name: "Solo".to_string(),
                    email: "solo@example.com".to_string(),
                    bio: None,
                },
                Some("deadbeef"),
            )
            .unwrap();
        assert!(!registration.partnership_created);
    }

    #[test]
    fn test_suggestion_pool_excludes_partnered() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");
        let c = register(&manager, "carol");
        let d = register(&manager, "dave");

        let request = manager.send_request(&c, &d).unwrap();
        manager.accept_request(&request.id, &d).unwrap();

        let (requester, pool) = manager.suggestion_pool(&a).unwrap();
        assert_eq!(requester.id, a);
        let ids: Vec<&UserId> = pool.iter().map(|c| &c.id).collect();
        assert_eq!(ids, vec![&b]);
    }

    #[test]
    fn test_suggestion_pool_refused_when_partnered() {
        let manager = manager();
        let a = register(&manager, "alice");
        let b = register(&manager, "bob");
        let request = manager.send_request(&a, &b).unwrap();
        manager.accept_request(&request.id, &b).unwrap();

        assert!(matches!(
            manager.suggestion_pool(&a).unwrap_err(),
            PartnershipError::AlreadyPartnered
        ));
    }
}
