//! Family service
//!
//! The membership registry and every guard around it: admin authorization,
//! the last-admin invariant (enforced at the removal and demotion boundary,
//! before the mutation primitive runs), and the two-write protocol that keeps
//! `User.family_ids` in sync with the member list. The two writes are not
//! transactional; a failed second write is logged and surfaced, never masked.

use tracing::{debug, info, warn};

use crate::database::stores::Stores;
use crate::models::{CreateFamilyRequest, Family, FamilyRole, UpdateSharingRequest};
use crate::services::auth::AuthContext;
use crate::utils::errors::{NestMateError, Result};
use crate::utils::logging::{log_access_denied, log_membership_change};

#[derive(Clone)]
pub struct FamilyService {
    stores: Stores,
}

impl FamilyService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn load(&self, family_id: i64) -> Result<Family> {
        self.stores
            .families
            .find_by_id(family_id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "family",
                id: family_id,
            })
    }

    fn ensure_admin(family: &Family, user_id: i64, action: &str) -> Result<()> {
        if family.is_admin(user_id) {
            return Ok(());
        }
        log_access_denied("family", family.id, user_id, action);
        Err(NestMateError::forbidden(&format!("{action} this family")))
    }

    /// Create a family; the creator becomes its sole admin member
    pub async fn create_family(
        &self,
        ctx: &AuthContext,
        request: CreateFamilyRequest,
    ) -> Result<Family> {
        if request.name.trim().is_empty() {
            return Err(NestMateError::Validation(
                "family name must not be empty".to_string(),
            ));
        }

        // The creator must exist or the reverse write below can never succeed
        self.stores
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "user",
                id: ctx.user_id,
            })?;

        debug!(user_id = ctx.user_id, "Creating family");
        let family = self.stores.families.create(request, ctx.user_id).await?;

        if let Err(e) = self.stores.users.attach_family(ctx.user_id, family.id).await {
            warn!(
                family_id = family.id,
                user_id = ctx.user_id,
                error = %e,
                "Reverse membership write failed after family create"
            );
            return Err(e);
        }

        log_membership_change(family.id, ctx.user_id, ctx.user_id, "created family as admin");
        info!(family_id = family.id, created_by = ctx.user_id, "Family created");
        Ok(family)
    }

    /// Member-only read
    pub async fn get_family(&self, ctx: &AuthContext, family_id: i64) -> Result<Family> {
        let family = self.load(family_id).await?;
        if !family.is_member(ctx.user_id) {
            log_access_denied("family", family_id, ctx.user_id, "view");
            return Err(NestMateError::forbidden("view this family"));
        }
        Ok(family)
    }

    pub async fn list_families(&self, ctx: &AuthContext) -> Result<Vec<Family>> {
        self.stores.families.find_for_user(ctx.user_id).await
    }

    /// Admin-only
    pub async fn rename_family(
        &self,
        ctx: &AuthContext,
        family_id: i64,
        name: String,
    ) -> Result<Family> {
        if name.trim().is_empty() {
            return Err(NestMateError::Validation(
                "family name must not be empty".to_string(),
            ));
        }

        let mut family = self.load(family_id).await?;
        Self::ensure_admin(&family, ctx.user_id, "rename")?;

        family.name = name;
        let family = self.stores.families.save(&family).await?;
        info!(family_id, user_id = ctx.user_id, "Family renamed");
        Ok(family)
    }

    /// Admin-only partial update of the per-category sharing toggles
    pub async fn update_sharing(
        &self,
        ctx: &AuthContext,
        family_id: i64,
        request: UpdateSharingRequest,
    ) -> Result<Family> {
        let mut family = self.load(family_id).await?;
        Self::ensure_admin(&family, ctx.user_id, "change sharing for")?;

        family.sharing = request.apply_to(family.sharing);
        let family = self.stores.families.save(&family).await?;
        info!(family_id, user_id = ctx.user_id, "Family sharing settings updated");
        Ok(family)
    }

    /// Admin-only. Performs both membership writes.
    pub async fn add_member(
        &self,
        ctx: &AuthContext,
        family_id: i64,
        user_id: i64,
        role: FamilyRole,
    ) -> Result<Family> {
        let mut family = self.load(family_id).await?;
        Self::ensure_admin(&family, ctx.user_id, "add members to")?;

        // The target must be a real user or the reverse write can never succeed
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "user",
                id: user_id,
            })?;

        if !family.add_member(user_id, role) {
            return Err(NestMateError::Validation(format!(
                "user {user_id} is already a member of this family"
            )));
        }
        let family = self.stores.families.save(&family).await?;

        if let Err(e) = self.stores.users.attach_family(user_id, family_id).await {
            warn!(
                family_id,
                user_id,
                error = %e,
                "Reverse membership write failed after member add"
            );
            return Err(e);
        }

        log_membership_change(family_id, user_id, ctx.user_id, "added");
        info!(family_id, user_id, actor_id = ctx.user_id, "Member added");
        Ok(family)
    }

    /// Admin-initiated removal or self-removal; both run the last-admin
    /// guard before the mutation primitive, so a rejected call leaves the
    /// member list untouched.
    pub async fn remove_member(
        &self,
        ctx: &AuthContext,
        family_id: i64,
        user_id: i64,
    ) -> Result<Family> {
        let mut family = self.load(family_id).await?;
        if ctx.user_id != user_id {
            Self::ensure_admin(&family, ctx.user_id, "remove members from")?;
        }

        if family.is_sole_admin(user_id) {
            warn!(family_id, user_id, "Rejected removal of the last admin");
            return Err(NestMateError::LastAdminViolation { family_id, user_id });
        }

        if !family.remove_member(user_id) {
            return Err(NestMateError::NotFound {
                resource: "member",
                id: user_id,
            });
        }
        let family = self.stores.families.save(&family).await?;

        if let Err(e) = self.stores.users.detach_family(user_id, family_id).await {
            warn!(
                family_id,
                user_id,
                error = %e,
                "Reverse membership write failed after member removal"
            );
            return Err(e);
        }

        log_membership_change(family_id, user_id, ctx.user_id, "removed");
        info!(family_id, user_id, actor_id = ctx.user_id, "Member removed");
        Ok(family)
    }

    /// Admin-only; demoting the sole admin trips the same guard as removal
    pub async fn update_member_role(
        &self,
        ctx: &AuthContext,
        family_id: i64,
        user_id: i64,
        new_role: FamilyRole,
    ) -> Result<Family> {
        let mut family = self.load(family_id).await?;
        Self::ensure_admin(&family, ctx.user_id, "change roles in")?;

        if new_role == FamilyRole::Member && family.is_sole_admin(user_id) {
            warn!(family_id, user_id, "Rejected demotion of the last admin");
            return Err(NestMateError::LastAdminViolation { family_id, user_id });
        }

        if !family.update_member_role(user_id, new_role) {
            return Err(NestMateError::NotFound {
                resource: "member",
                id: user_id,
            });
        }
        let family = self.stores.families.save(&family).await?;

        log_membership_change(
            family_id,
            user_id,
            ctx.user_id,
            &format!("role changed to {}", new_role.as_str()),
        );
        Ok(family)
    }

    /// Admin-only. Detaches the family from every member's reverse list
    /// before deleting the aggregate, so a failed detach leaves the family
    /// intact and the whole call retryable.
    pub async fn delete_family(&self, ctx: &AuthContext, family_id: i64) -> Result<()> {
        let family = self.load(family_id).await?;
        Self::ensure_admin(&family, ctx.user_id, "delete")?;

        for member in &family.members {
            self.stores.users.detach_family(member.user_id, family_id).await?;
        }

        self.stores.families.delete(family_id).await?;
        info!(family_id, user_id = ctx.user_id, "Family deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUserRequest, UserRole};
    use crate::utils::errors::ErrorKind;
    use assert_matches::assert_matches;

    async fn setup() -> (FamilyService, Stores, i64, i64) {
        let stores = Stores::memory();
        let service = FamilyService::new(stores.clone());
        let alice = stores
            .users
            .create(CreateUserRequest {
                display_name: "Alice".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        let bob = stores
            .users
            .create(CreateUserRequest {
                display_name: "Bob".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        (service, stores, alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_create_family_performs_both_writes() {
        let (service, stores, alice, _) = setup().await;
        let ctx = AuthContext::new(alice);

        let family = service
            .create_family(
                &ctx,
                CreateFamilyRequest {
                    name: "Homestead".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(family.is_sole_admin(alice));
        let user = stores.users.find_by_id(alice).await.unwrap().unwrap();
        assert_eq!(user.family_ids, vec![family.id]);
    }

    #[tokio::test]
    async fn test_add_member_requires_admin() {
        let (service, _, alice, bob) = setup().await;
        let family = service
            .create_family(&AuthContext::new(alice), CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();

        let err = service
            .add_member(&AuthContext::new(bob), family.id, bob, FamilyRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_add_member_rejects_duplicates_and_ghosts() {
        let (service, _, alice, bob) = setup().await;
        let ctx = AuthContext::new(alice);
        let family = service
            .create_family(&ctx, CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();

        service
            .add_member(&ctx, family.id, bob, FamilyRole::Member)
            .await
            .unwrap();
        let err = service
            .add_member(&ctx, family.id, bob, FamilyRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .add_member(&ctx, family.id, 999, FamilyRole::Member)
            .await
            .unwrap_err();
        assert_matches!(err, NestMateError::NotFound { resource: "user", .. });
    }

    #[tokio::test]
    async fn test_sole_admin_cannot_leave_or_be_demoted() {
        let (service, stores, alice, bob) = setup().await;
        let ctx = AuthContext::new(alice);
        let family = service
            .create_family(&ctx, CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();
        service
            .add_member(&ctx, family.id, bob, FamilyRole::Member)
            .await
            .unwrap();

        let err = service.remove_member(&ctx, family.id, alice).await.unwrap_err();
        assert_matches!(err, NestMateError::LastAdminViolation { .. });

        let err = service
            .update_member_role(&ctx, family.id, alice, FamilyRole::Member)
            .await
            .unwrap_err();
        assert_matches!(err, NestMateError::LastAdminViolation { .. });

        // The member list is untouched by the rejected calls
        let family = stores.families.find_by_id(family.id).await.unwrap().unwrap();
        assert_eq!(family.members.len(), 2);
        assert!(family.is_sole_admin(alice));
    }

    #[tokio::test]
    async fn test_removal_allowed_once_another_admin_exists() {
        let (service, stores, alice, bob) = setup().await;
        let ctx = AuthContext::new(alice);
        let family = service
            .create_family(&ctx, CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();
        service
            .add_member(&ctx, family.id, bob, FamilyRole::Admin)
            .await
            .unwrap();

        // Self-removal works now that bob also holds an admin seat
        service.remove_member(&ctx, family.id, alice).await.unwrap();

        let user = stores.users.find_by_id(alice).await.unwrap().unwrap();
        assert!(user.family_ids.is_empty());
        let family = stores.families.find_by_id(family.id).await.unwrap().unwrap();
        assert!(!family.is_member(alice));
        assert!(family.is_admin(bob));
    }

    #[tokio::test]
    async fn test_delete_family_cascades_reverse_detach() {
        let (service, stores, alice, bob) = setup().await;
        let ctx = AuthContext::new(alice);
        let family = service
            .create_family(&ctx, CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();
        service
            .add_member(&ctx, family.id, bob, FamilyRole::Member)
            .await
            .unwrap();

        service.delete_family(&ctx, family.id).await.unwrap();

        assert!(stores.families.find_by_id(family.id).await.unwrap().is_none());
        for id in [alice, bob] {
            let user = stores.users.find_by_id(id).await.unwrap().unwrap();
            assert!(user.family_ids.is_empty());
        }
    }

    #[tokio::test]
    async fn test_get_family_hides_from_non_members() {
        let (service, _, alice, bob) = setup().await;
        let family = service
            .create_family(&AuthContext::new(alice), CreateFamilyRequest { name: "H".to_string() })
            .await
            .unwrap();

        let err = service
            .get_family(&AuthContext::new(bob), family.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = service
            .get_family(&AuthContext::new(alice), 12345)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
