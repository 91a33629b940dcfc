//! Family model
//!
//! The family aggregate: member list with roles, per-category sharing
//! toggles, and the membership mutation primitives. Invariant guards (last
//! admin, authorization) live in the service layer; the primitives here only
//! report whether they mutated anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::NestMateError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub created_by: i64,
    pub members: Vec<FamilyMember>,
    pub sharing: SharingSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub user_id: i64,
    pub role: FamilyRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Admin,
    Member,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyRole::Admin => "admin",
            FamilyRole::Member => "member",
        }
    }
}

impl std::str::FromStr for FamilyRole {
    type Err = NestMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(FamilyRole::Admin),
            "member" => Ok(FamilyRole::Member),
            other => Err(NestMateError::Validation(format!("unknown family role: {other}"))),
        }
    }
}

/// Per-category sharing toggles.
///
/// Calendar, shopping lists and meal plans are shared with the family by
/// default; medications and documents are privacy-sensitive and opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingSettings {
    pub share_calendar: bool,
    pub share_shopping_lists: bool,
    pub share_meal_plans: bool,
    pub share_medications: bool,
    pub share_documents: bool,
}

impl Default for SharingSettings {
    fn default() -> Self {
        Self {
            share_calendar: true,
            share_shopping_lists: true,
            share_meal_plans: true,
            share_medications: false,
            share_documents: false,
        }
    }
}

/// The five resource categories a family can toggle sharing for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingCategory {
    Calendar,
    ShoppingLists,
    MealPlans,
    Medications,
    Documents,
}

impl SharingSettings {
    pub fn allows(&self, category: SharingCategory) -> bool {
        match category {
            SharingCategory::Calendar => self.share_calendar,
            SharingCategory::ShoppingLists => self.share_shopping_lists,
            SharingCategory::MealPlans => self.share_meal_plans,
            SharingCategory::Medications => self.share_medications,
            SharingCategory::Documents => self.share_documents,
        }
    }
}

impl Family {
    pub fn member(&self, user_id: i64) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.member(user_id).is_some()
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.member(user_id)
            .map(|m| m.role == FamilyRole::Admin)
            .unwrap_or(false)
    }

    pub fn admin_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == FamilyRole::Admin)
            .count()
    }

    /// True when `user_id` holds the only admin seat of a non-empty family
    pub fn is_sole_admin(&self, user_id: i64) -> bool {
        self.is_admin(user_id) && self.admin_count() == 1
    }

    /// Append a member. Returns false (no mutation) if already present.
    pub fn add_member(&mut self, user_id: i64, role: FamilyRole) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(FamilyMember {
            user_id,
            role,
            joined_at: Utc::now(),
        });
        true
    }

    /// Remove a member. Returns false (no mutation) if not present.
    ///
    /// Callers are responsible for the last-admin check; self-removal and
    /// admin-initiated removal share this primitive and differ only in the
    /// guards applied before it.
    pub fn remove_member(&mut self, user_id: i64) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.user_id != user_id);
        self.members.len() != before
    }

    /// Change a member's role. Returns false (no mutation) if not present.
    pub fn update_member_role(&mut self, user_id: i64, new_role: FamilyRole) -> bool {
        match self.members.iter_mut().find(|m| m.user_id == user_id) {
            Some(member) => {
                member.role = new_role;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

/// Partial update of the per-category sharing toggles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSharingRequest {
    pub share_calendar: Option<bool>,
    pub share_shopping_lists: Option<bool>,
    pub share_meal_plans: Option<bool>,
    pub share_medications: Option<bool>,
    pub share_documents: Option<bool>,
}

impl UpdateSharingRequest {
    /// COALESCE-style merge over the current settings
    pub fn apply_to(&self, current: SharingSettings) -> SharingSettings {
        SharingSettings {
            share_calendar: self.share_calendar.unwrap_or(current.share_calendar),
            share_shopping_lists: self
                .share_shopping_lists
                .unwrap_or(current.share_shopping_lists),
            share_meal_plans: self.share_meal_plans.unwrap_or(current.share_meal_plans),
            share_medications: self.share_medications.unwrap_or(current.share_medications),
            share_documents: self.share_documents.unwrap_or(current.share_documents),
        }
    }
}
