//! Resource visibility policy
//!
//! This module decides who may see what. The decision itself is a pure
//! function over a resource's sharing scope and the requester's current
//! family memberships; [`AccessPolicy`] wraps it with the store reads needed
//! to evaluate family-gated scopes against current state rather than the
//! membership snapshot carried in [`AuthContext`].

use std::sync::Arc;

use crate::database::stores::FamilyStore;
use crate::models::{
    Document, Event, Family, Meal, Medication, Recipe, SharingCategory, ShoppingList,
};
use crate::utils::errors::{NestMateError, Result};
use crate::utils::logging::log_access_denied;

/// Authenticated-user context supplied by the external auth collaborator.
///
/// `family_ids` is a snapshot taken at authentication time and is advisory
/// only: membership can change between requests, so every guard re-reads
/// current membership from the store.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub family_ids: Vec<i64>,
}

impl AuthContext {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            family_ids: Vec::new(),
        }
    }

    pub fn with_families(user_id: i64, family_ids: Vec<i64>) -> Self {
        Self { user_id, family_ids }
    }
}

/// Outcome of a visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    SharedRead,
    Forbidden,
}

impl Access {
    pub fn is_readable(&self) -> bool {
        !matches!(self, Access::Forbidden)
    }
}

/// How a resource exposes itself beyond its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingScope<'a> {
    /// Owner only
    Private,
    /// Readable by the listed user ids
    ExplicitGrant(&'a [i64]),
    /// Readable by current members of the family, subject to the family's
    /// per-category sharing toggle
    FamilyGated {
        family_id: i64,
        category: SharingCategory,
    },
    /// Readable by anyone
    Public,
}

/// The type-specific sharing signal of the five resource categories
pub trait Shareable {
    fn resource_id(&self) -> i64;
    fn owner_user_id(&self) -> i64;
    fn sharing_scope(&self) -> SharingScope<'_>;
    /// Resource noun used in errors and logs
    fn resource_name(&self) -> &'static str;
}

impl Shareable for Event {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    // The family id on an event is informational only; the read grant is
    // the explicit shared_with set
    fn sharing_scope(&self) -> SharingScope<'_> {
        SharingScope::ExplicitGrant(&self.shared_with)
    }

    fn resource_name(&self) -> &'static str {
        "event"
    }
}

impl Shareable for ShoppingList {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    fn sharing_scope(&self) -> SharingScope<'_> {
        SharingScope::ExplicitGrant(&self.shared_with)
    }

    fn resource_name(&self) -> &'static str {
        "shopping_list"
    }
}

impl Shareable for Meal {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    fn sharing_scope(&self) -> SharingScope<'_> {
        SharingScope::Private
    }

    fn resource_name(&self) -> &'static str {
        "meal"
    }
}

impl Shareable for Recipe {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    fn sharing_scope(&self) -> SharingScope<'_> {
        if self.is_public {
            SharingScope::Public
        } else {
            SharingScope::Private
        }
    }

    fn resource_name(&self) -> &'static str {
        "recipe"
    }
}

impl Shareable for Medication {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    // Family membership alone is not enough: the family's share_medications
    // toggle gates the single-record read path as well as the listings
    fn sharing_scope(&self) -> SharingScope<'_> {
        match self.family_id {
            Some(family_id) => SharingScope::FamilyGated {
                family_id,
                category: SharingCategory::Medications,
            },
            None => SharingScope::Private,
        }
    }

    fn resource_name(&self) -> &'static str {
        "medication"
    }
}

impl Shareable for Document {
    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    // Both the per-document is_shared flag and a family attachment are
    // required before the family toggle is even consulted
    fn sharing_scope(&self) -> SharingScope<'_> {
        match self.family_id {
            Some(family_id) if self.is_shared => SharingScope::FamilyGated {
                family_id,
                category: SharingCategory::Documents,
            },
            _ => SharingScope::Private,
        }
    }

    fn resource_name(&self) -> &'static str {
        "document"
    }
}

/// Pure visibility decision.
///
/// The owner always wins, whatever the scope says. Family-gated access
/// requires the requester to be a current member of the named family and the
/// family's toggle for the category to be on; `families` carries whatever
/// family state the caller holds (typically the one family the scope names).
pub fn evaluate_access<R: Shareable>(resource: &R, user_id: i64, families: &[Family]) -> Access {
    if resource.owner_user_id() == user_id {
        return Access::Owner;
    }

    match resource.sharing_scope() {
        SharingScope::Private => Access::Forbidden,
        SharingScope::Public => Access::SharedRead,
        SharingScope::ExplicitGrant(user_ids) => {
            if user_ids.contains(&user_id) {
                Access::SharedRead
            } else {
                Access::Forbidden
            }
        }
        SharingScope::FamilyGated { family_id, category } => {
            let allowed = families
                .iter()
                .any(|f| f.id == family_id && f.is_member(user_id) && f.sharing.allows(category));
            if allowed {
                Access::SharedRead
            } else {
                Access::Forbidden
            }
        }
    }
}

/// Owner-only write guard; family-shared access never grants write authority
pub fn ensure_owner<R: Shareable>(resource: &R, user_id: i64, action: &str) -> Result<()> {
    if resource.owner_user_id() == user_id {
        return Ok(());
    }
    log_access_denied(resource.resource_name(), resource.resource_id(), user_id, action);
    Err(NestMateError::forbidden(&format!(
        "{action} this {}",
        resource.resource_name()
    )))
}

/// Store-backed policy referee.
///
/// Family-gated decisions re-read the family from the store on every call so
/// that a membership change or toggle flip takes effect immediately.
#[derive(Clone)]
pub struct AccessPolicy {
    families: Arc<dyn FamilyStore>,
}

impl AccessPolicy {
    pub fn new(families: Arc<dyn FamilyStore>) -> Self {
        Self { families }
    }

    /// Read access against current store state
    pub async fn read_access<R: Shareable>(&self, resource: &R, user_id: i64) -> Result<Access> {
        if resource.owner_user_id() != user_id {
            if let SharingScope::FamilyGated { family_id, .. } = resource.sharing_scope() {
                let families = match self.families.find_by_id(family_id).await? {
                    Some(family) => vec![family],
                    None => Vec::new(),
                };
                return Ok(evaluate_access(resource, user_id, &families));
            }
        }
        Ok(evaluate_access(resource, user_id, &[]))
    }

    /// Guard a read; the error reveals nothing beyond the denial itself
    pub async fn ensure_readable<R: Shareable>(&self, resource: &R, user_id: i64) -> Result<()> {
        if self.read_access(resource, user_id).await?.is_readable() {
            return Ok(());
        }
        log_access_denied(resource.resource_name(), resource.resource_id(), user_id, "view");
        Err(NestMateError::forbidden(&format!(
            "view this {}",
            resource.resource_name()
        )))
    }

    /// Input-validation guard for create/update calls that reference a
    /// family: the acting user must currently be a member. Re-run on every
    /// call because membership can change between requests.
    pub async fn ensure_member(&self, family_id: i64, user_id: i64) -> Result<()> {
        match self.families.find_by_id(family_id).await? {
            Some(family) if family.is_member(user_id) => Ok(()),
            _ => Err(NestMateError::InvalidMembership { family_id, user_id }),
        }
    }
}
