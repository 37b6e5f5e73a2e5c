//! Catalog browsing and product management.

use std::path::{Path, PathBuf};

use bazaar_client::api::{ImageFile, ManageQuery, ProductQuery};
use bazaar_client::uploads::{ImageUploader, MAX_IMAGES};
use bazaar_client::{QueryKey, UploadError};
use bazaar_core::{Category, Product, ProductDraft, ProductStatus, normalize_tags};
use clap::Args;
use rust_decimal::Decimal;
use tracing::info;

use super::{CliError, Context, print_table};

/// Product form fields given on the command line. Unset fields keep the
/// draft's current value.
#[derive(Debug, Clone, Default, Args)]
pub struct DraftFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub price: Option<Decimal>,
    /// Price before discount
    #[arg(long)]
    pub original_price: Option<Decimal>,
    #[arg(long)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub sku: Option<String>,
    #[arg(long)]
    pub shipping_cost: Option<Decimal>,
    #[arg(long)]
    pub status: Option<ProductStatus>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
}

impl DraftFields {
    /// Overwrite the fields that were given.
    pub fn apply(self, draft: &mut ProductDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(original_price) = self.original_price {
            draft.original_price = original_price;
        }
        if let Some(stock) = self.stock {
            draft.stock = stock;
        }
        if let Some(sku) = self.sku {
            draft.sku = sku;
        }
        if let Some(shipping_cost) = self.shipping_cost {
            draft.shipping_cost = shipping_cost;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(tags) = self.tags {
            draft.tags = normalize_tags(&tags);
        }
    }
}

fn product_row(product: &Product) -> Vec<String> {
    vec![
        product.id.to_string(),
        product.title.clone(),
        product.display_price().display(),
        product.category.clone().unwrap_or_default(),
        product
            .status
            .map(|status| status.to_string())
            .unwrap_or_default(),
    ]
}

fn print_products(products: &[Product]) {
    let rows: Vec<_> = products.iter().map(product_row).collect();
    print_table(&["ID", "TITLE", "PRICE", "CATEGORY", "STATUS"], &rows);
}

/// Public catalog listing.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(ctx: &Context, query: &ProductQuery) -> Result<(), CliError> {
    let products = ctx.api().products(query).await?;
    print_products(&products);
    Ok(())
}

/// One product in detail.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
pub async fn show(ctx: &Context, id: &str) -> Result<(), CliError> {
    let api = ctx.api();
    let product: Product = ctx
        .cache
        .get_or_fetch(QueryKey::from(["product", id]), || api.product(id))
        .await?;

    println!("{}", product.title);
    println!("  id:       {}", product.id);
    println!("  price:    {}", product.display_price().display());
    if let Some(original) = product.original_price.filter(|p| *p > product.price) {
        println!("  was:      {original}");
    }
    if let Some(category) = &product.category {
        println!("  category: {category}");
    }
    if let Some(stock) = product.stock {
        println!("  stock:    {stock}");
    }
    if let Some(image) = product.primary_image() {
        println!("  image:    {image}");
    }
    if !product.tags.is_empty() {
        println!("  tags:     {}", product.tags.join(", "));
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    Ok(())
}

/// The signed-in seller's products.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn mine(ctx: &Context) -> Result<(), CliError> {
    ctx.require_user()?;
    let products = ctx.api().my_products().await?;
    print_products(&products);
    Ok(())
}

/// Staff listing with status filter and paging.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn manage(ctx: &Context, query: &ManageQuery) -> Result<(), CliError> {
    ctx.require_user()?;
    let page = ctx.api().manage_products(query).await?;
    print_products(&page.items);
    println!("page {} of {}", page.page, page.total_pages);
    Ok(())
}

/// Validate, upload images and create a product.
///
/// # Errors
///
/// Returns an error if validation, an upload or the creation fails.
pub async fn create(
    ctx: &Context,
    fields: DraftFields,
    images: &[PathBuf],
) -> Result<(), CliError> {
    ctx.require_user()?;
    let mut draft = ProductDraft::default();
    fields.apply(&mut draft);
    let mut draft = draft.validate()?;
    let uploaded = upload(ctx, images).await?;
    draft.images.extend(uploaded);

    let product = ctx.api().create_product(&draft).await?;
    ctx.cache.invalidate_prefix(&QueryKey::from(["products"]));
    ctx.notices.push("Product created");
    println!("Created {} ({})", product.title, product.id);
    Ok(())
}

/// Change some fields of an existing product, optionally adding images.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded, validation or an
/// upload fails, or the backend rejects the update.
pub async fn edit(
    ctx: &Context,
    id: &str,
    fields: DraftFields,
    images: &[PathBuf],
) -> Result<(), CliError> {
    ctx.require_user()?;
    let current = ctx.api().managed_product(id).await?;
    let mut draft = ProductDraft::from_product(&current);
    fields.apply(&mut draft);
    let mut draft = draft.validate()?;
    draft.images.extend(upload(ctx, images).await?);

    let product = ctx.api().update_product(id, &draft).await?;
    ctx.cache.invalidate_prefix(&QueryKey::from(["product", id]));
    ctx.cache.invalidate_prefix(&QueryKey::from(["products"]));
    ctx.notices.push("Product updated");
    println!("Updated {} ({})", product.title, product.id);
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the deletion fails.
pub async fn delete(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().delete_product(id).await?;
    ctx.cache.invalidate_prefix(&QueryKey::from(["product", id]));
    ctx.cache.invalidate_prefix(&QueryKey::from(["products"]));
    ctx.notices.push("Product deleted");
    Ok(())
}

/// Upload images and print their URLs.
///
/// # Errors
///
/// Returns an error if a file cannot be read or an upload fails.
pub async fn upload_images(ctx: &Context, images: &[PathBuf]) -> Result<(), CliError> {
    for url in upload(ctx, images).await? {
        println!("{url}");
    }
    Ok(())
}

/// Upload through ImgBB when a key is configured, otherwise through the
/// backend's own upload endpoint.
async fn upload(ctx: &Context, paths: &[PathBuf]) -> Result<Vec<String>, CliError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    if paths.len() > MAX_IMAGES {
        return Err(UploadError::TooMany { limit: MAX_IMAGES }.into());
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_image(path).await?);
    }

    if ctx.config.imgbb_api_key.is_some() {
        let uploader =
            ImageUploader::new(ctx.config.imgbb_api_key.clone(), ctx.config.api.timeout)?;
        let urls = uploader
            .upload_images(files, MAX_IMAGES, |progress| {
                if progress.index < progress.total {
                    info!(
                        "Uploading image {} of {}",
                        progress.index + 1,
                        progress.total
                    );
                }
            })
            .await?;
        return Ok(urls);
    }

    Ok(ctx.api().upload_product_images(files).await?)
}

async fn read_image(path: &Path) -> Result<ImageFile, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    Ok(ImageFile { file_name, bytes })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_row() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Desk Lamp",
            "price": 19.5,
            "category": "home",
            "status": "APPROVED"
        }))
        .unwrap();
        assert_eq!(
            product_row(&product),
            ["p1", "Desk Lamp", "USD 19.50", "home", "APPROVED"]
        );
    }

    #[test]
    fn test_draft_fields_only_overwrite_given_values() {
        let mut draft = ProductDraft {
            title: "Old title".to_string(),
            stock: 4,
            ..ProductDraft::default()
        };
        DraftFields {
            price: Some(Decimal::new(1999, 2)),
            tags: Some(" desk, , lamp ".to_string()),
            status: Some(ProductStatus::PendingApproval),
            ..DraftFields::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.title, "Old title");
        assert_eq!(draft.stock, 4);
        assert_eq!(draft.price, Decimal::new(1999, 2));
        assert_eq!(draft.tags, ["desk", "lamp"]);
        assert_eq!(draft.status, ProductStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_read_image_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lamp.png");
        std::fs::write(&path, [1_u8, 2, 3]).unwrap();
        let image = read_image(&path).await.unwrap();
        assert_eq!(image.file_name, "lamp.png");
        assert_eq!(image.bytes, [1, 2, 3]);
    }
}
