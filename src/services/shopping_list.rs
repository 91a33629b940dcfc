//! Shopping list service

use tracing::info;

use crate::database::stores::Stores;
use crate::models::{CreateShoppingListRequest, ShoppingList, UpdateShoppingListRequest};
use crate::services::auth::{ensure_owner, AccessPolicy, AuthContext};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct ShoppingListService {
    stores: Stores,
    policy: AccessPolicy,
}

impl ShoppingListService {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    async fn load(&self, id: i64) -> Result<ShoppingList> {
        self.stores
            .shopping_lists
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "shopping list",
                id,
            })
    }

    pub async fn create_list(
        &self,
        ctx: &AuthContext,
        request: CreateShoppingListRequest,
    ) -> Result<ShoppingList> {
        if request.name.trim().is_empty() {
            return Err(NestMateError::Validation(
                "shopping list name must not be empty".to_string(),
            ));
        }
        if let Some(family_id) = request.family_id {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let list = self.stores.shopping_lists.create(ctx.user_id, request).await?;
        info!(list_id = list.id, user_id = ctx.user_id, "Shopping list created");
        Ok(list)
    }

    pub async fn get_list(&self, ctx: &AuthContext, id: i64) -> Result<ShoppingList> {
        let list = self.load(id).await?;
        self.policy.ensure_readable(&list, ctx.user_id).await?;
        Ok(list)
    }

    pub async fn update_list(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateShoppingListRequest,
    ) -> Result<ShoppingList> {
        let list = self.load(id).await?;
        ensure_owner(&list, ctx.user_id, "update")?;

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(NestMateError::Validation(
                    "shopping list name must not be empty".to_string(),
                ));
            }
        }
        if let Some(family_id) = request.family_id.or(list.family_id) {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let list = self.stores.shopping_lists.update(id, request).await?;
        info!(list_id = id, user_id = ctx.user_id, "Shopping list updated");
        Ok(list)
    }

    pub async fn delete_list(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let list = self.load(id).await?;
        ensure_owner(&list, ctx.user_id, "delete")?;

        self.stores.shopping_lists.delete(id).await?;
        info!(list_id = id, user_id = ctx.user_id, "Shopping list deleted");
        Ok(())
    }

    /// Lists the user owns or can read, most recently updated first
    pub async fn list_lists(&self, ctx: &AuthContext) -> Result<Vec<ShoppingList>> {
        self.stores.shopping_lists.find_for_user(ctx.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUserRequest, ShoppingItem, UserRole};
    use crate::utils::errors::ErrorKind;

    async fn setup() -> (ShoppingListService, Stores, i64, i64) {
        let stores = Stores::memory();
        let policy = AccessPolicy::new(stores.families.clone());
        let service = ShoppingListService::new(stores.clone(), policy);
        let owner = stores
            .users
            .create(CreateUserRequest {
                display_name: "Owner".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        let other = stores
            .users
            .create(CreateUserRequest {
                display_name: "Other".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        (service, stores, owner.id, other.id)
    }

    fn request(name: &str) -> CreateShoppingListRequest {
        CreateShoppingListRequest {
            name: name.to_string(),
            family_id: None,
            shared_with: vec![],
            items: vec![ShoppingItem {
                name: "Milk".to_string(),
                quantity: Some("2l".to_string()),
                checked: false,
            }],
            is_urgent: false,
        }
    }

    #[tokio::test]
    async fn test_create_list_rejects_blank_name() {
        let (service, _, owner, _) = setup().await;
        let err = service
            .create_list(&AuthContext::new(owner), request("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_grantee_reads_but_cannot_write() {
        let (service, _, owner, other) = setup().await;

        let mut req = request("Groceries");
        req.shared_with = vec![other];
        let list = service.create_list(&AuthContext::new(owner), req).await.unwrap();

        let reader = AuthContext::new(other);
        let fetched = service.get_list(&reader, list.id).await.unwrap();
        assert_eq!(fetched.items.len(), 1);

        let update = UpdateShoppingListRequest {
            is_urgent: Some(true),
            ..Default::default()
        };
        let err = service.update_list(&reader, list.id, update).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_owner_updates_items_and_urgency() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);

        let list = service.create_list(&ctx, request("Groceries")).await.unwrap();
        let update = UpdateShoppingListRequest {
            items: Some(vec![
                ShoppingItem {
                    name: "Milk".to_string(),
                    quantity: Some("2l".to_string()),
                    checked: true,
                },
                ShoppingItem {
                    name: "Bread".to_string(),
                    quantity: None,
                    checked: false,
                },
            ]),
            is_urgent: Some(true),
            ..Default::default()
        };

        let updated = service.update_list(&ctx, list.id, update).await.unwrap();
        assert!(updated.is_urgent);
        assert_eq!(updated.items.len(), 2);
        assert!(updated.items[0].checked);
    }

    #[tokio::test]
    async fn test_get_missing_list_is_not_found() {
        let (service, _, owner, _) = setup().await;
        let err = service
            .get_list(&AuthContext::new(owner), 404)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
