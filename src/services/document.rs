//! Document service
//!
//! Owns document metadata; the storage key is minted here at create time and
//! the blob itself is the external file store's concern.

use tracing::info;
use uuid::Uuid;

use crate::database::stores::Stores;
use crate::models::{CreateDocumentRequest, Document, UpdateDocumentRequest};
use crate::services::auth::{ensure_owner, AccessPolicy, AuthContext};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct DocumentService {
    stores: Stores,
    policy: AccessPolicy,
}

impl DocumentService {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    async fn load(&self, id: i64) -> Result<Document> {
        self.stores
            .documents
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "document",
                id,
            })
    }

    pub async fn create_document(
        &self,
        ctx: &AuthContext,
        request: CreateDocumentRequest,
    ) -> Result<Document> {
        if request.title.trim().is_empty() {
            return Err(NestMateError::Validation(
                "document title must not be empty".to_string(),
            ));
        }
        if request.file_name.trim().is_empty() {
            return Err(NestMateError::Validation(
                "document file name must not be empty".to_string(),
            ));
        }
        if let Some(family_id) = request.family_id {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let storage_key = Uuid::new_v4().to_string();
        let document = self
            .stores
            .documents
            .create(ctx.user_id, storage_key, request)
            .await?;
        info!(
            document_id = document.id,
            user_id = ctx.user_id,
            storage_key = %document.storage_key,
            "Document registered"
        );
        Ok(document)
    }

    pub async fn get_document(&self, ctx: &AuthContext, id: i64) -> Result<Document> {
        let document = self.load(id).await?;
        self.policy.ensure_readable(&document, ctx.user_id).await?;
        Ok(document)
    }

    pub async fn update_document(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateDocumentRequest,
    ) -> Result<Document> {
        let document = self.load(id).await?;
        ensure_owner(&document, ctx.user_id, "update")?;

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(NestMateError::Validation(
                    "document title must not be empty".to_string(),
                ));
            }
        }
        if let Some(file_name) = &request.file_name {
            if file_name.trim().is_empty() {
                return Err(NestMateError::Validation(
                    "document file name must not be empty".to_string(),
                ));
            }
        }
        if let Some(family_id) = request.family_id.or(document.family_id) {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let document = self.stores.documents.update(id, request).await?;
        info!(document_id = id, user_id = ctx.user_id, "Document updated");
        Ok(document)
    }

    pub async fn delete_document(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let document = self.load(id).await?;
        ensure_owner(&document, ctx.user_id, "delete")?;

        self.stores.documents.delete(id).await?;
        info!(document_id = id, user_id = ctx.user_id, "Document deleted");
        Ok(())
    }

    pub async fn list_documents(&self, ctx: &AuthContext) -> Result<Vec<Document>> {
        self.stores.documents.find_for_owner(ctx.user_id).await
    }
}
