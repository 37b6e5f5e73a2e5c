//! Product catalog and product management endpoints.

use bazaar_core::{Product, ProductDraft, ProductPage, ProductSnapshot, ProductStatus};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{ApiClient, ApiError, ItemEnvelope, ItemsEnvelope};

/// Largest page the backend serves from `/api/products`.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Filters for the public catalog listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emi_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_coupon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Copy with blank text filters dropped and `limit` capped at
    /// [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn normalized(&self) -> Self {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            category: text(&self.category),
            q: text(&self.q),
            brand: text(&self.brand),
            source_company: text(&self.source_company),
            limit: self.limit.map(|limit| limit.clamp(1, MAX_PAGE_SIZE)),
            ..self.clone()
        }
    }
}

/// Filters for the staff management listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    pub page: u32,
}

/// An image to send in a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub(crate) fn into_part(self) -> Part {
        Part::bytes(self.bytes).file_name(self.file_name)
    }
}

#[derive(Deserialize)]
struct UploadedImages {
    #[serde(default)]
    images: Vec<String>,
}

impl ApiClient {
    /// Public catalog listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let request = self
            .request(Method::GET, "/api/products")
            .await?
            .query(&query.normalized());
        let envelope: ItemsEnvelope<Product> = self.send_json(request).await?;
        Ok(envelope.items)
    }

    /// A single public product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if there is no such product.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let envelope: ItemEnvelope<Product> =
            self.get_json(&format!("/api/products/{}", urlencoding::encode(id))).await?;
        Ok(envelope.item)
    }

    /// A single public product exactly as the backend sent it, for storing in
    /// a cart or wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product has no id.
    #[instrument(skip(self))]
    pub async fn product_snapshot(&self, id: &str) -> Result<ProductSnapshot, ApiError> {
        let envelope: ItemEnvelope<serde_json::Value> =
            self.get_json(&format!("/api/products/{}", urlencoding::encode(id))).await?;
        ProductSnapshot::from_value(envelope.item).map_err(|_| ApiError::MissingField("id"))
    }

    /// Products owned by the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_products(&self) -> Result<Vec<Product>, ApiError> {
        let envelope: ItemsEnvelope<Product> = self.get_json("/api/products/mine").await?;
        Ok(envelope.items)
    }

    /// Staff listing of every product, any status, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn manage_products(&self, query: &ManageQuery) -> Result<ProductPage, ApiError> {
        let query = ManageQuery {
            q: query
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            status: query.status,
            page: query.page.max(1),
        };
        let request = self
            .request(Method::GET, "/api/products/manage/all")
            .await?
            .query(&query);
        self.send_json(request).await
    }

    /// A product with its management-only fields, for the edit form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if there is no such product.
    #[instrument(skip(self))]
    pub async fn managed_product(&self, id: &str) -> Result<Product, ApiError> {
        let envelope: ItemEnvelope<Product> = self
            .get_json(&format!("/api/products/{}/manage", urlencoding::encode(id)))
            .await?;
        Ok(envelope.item)
    }

    /// Create a product from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let request = self
            .request(Method::POST, "/api/products")
            .await?
            .json(draft);
        let envelope: ItemEnvelope<Product> = self.send_json(request).await?;
        info!(product_id = %envelope.item.id, "Product created");
        Ok(envelope.item)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, draft))]
    pub async fn update_product(
        &self,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/api/products/{}", urlencoding::encode(id)))
            .await?
            .json(draft);
        let envelope: ItemEnvelope<Product> = self.send_json(request).await?;
        Ok(envelope.item)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, &format!("/api/products/{}", urlencoding::encode(id)))
            .await?;
        self.send_empty(request).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Upload product images through the backend. Returns their URLs.
    ///
    /// Sending no files makes no request.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_product_images(
        &self,
        files: Vec<ImageFile>,
    ) -> Result<Vec<String>, ApiError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let form = files
            .into_iter()
            .fold(Form::new(), |form, file| form.part("images", file.into_part()));
        let request = self
            .request(Method::POST, "/api/uploads/product-images")
            .await?
            .multipart(form);
        let uploaded: UploadedImages = self.send_json(request).await?;
        Ok(uploaded.images)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_query_normalization() {
        let query = ProductQuery {
            category: Some("electronics".into()),
            q: Some("   ".into()),
            brand: Some(" Acme ".into()),
            limit: Some(500),
            ..ProductQuery::default()
        }
        .normalized();
        assert_eq!(query.q, None);
        assert_eq!(query.brand.as_deref(), Some("Acme"));
        assert_eq!(query.limit, Some(MAX_PAGE_SIZE));
        assert_eq!(query.category.as_deref(), Some("electronics"));
    }

    #[test]
    fn test_query_serializes_camel_case_and_skips_unset() {
        let query = ProductQuery {
            source_company: Some("amazon".into()),
            min_price: Some(Decimal::from_str("9.99").unwrap()),
            bank_offer: Some(true),
            page: Some(1),
            ..ProductQuery::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "sourceCompany": "amazon",
                "minPrice": "9.99",
                "bankOffer": true,
                "page": 1
            })
        );
    }

    #[test]
    fn test_image_file_debug_omits_bytes() {
        let file = ImageFile {
            file_name: "a.png".into(),
            bytes: vec![0; 1024],
        };
        assert_eq!(format!("{file:?}"), r#"ImageFile { file_name: "a.png", len: 1024 }"#);
    }
}
