//! Super admin console: settings, moderation, users and reports.

use std::path::{Path, PathBuf};

use bazaar_client::QueryKey;
use bazaar_client::api::{NewAdmin, Report, UserQuery};
use bazaar_core::{MaintenanceUpdate, PlatformSettings, ProductStatus, Role, SellerStatus, User};
use rust_decimal::Decimal;
use tracing::info;

use super::{CliError, Context, print_table};

fn settings_key() -> QueryKey {
    QueryKey::from(["superadmin", "settings"])
}

fn print_settings(settings: &PlatformSettings) {
    println!("commission:  {}%", settings.commission_pct.normalize());
    println!(
        "maintenance: {}",
        if settings.maintenance_enabled { "on" } else { "off" }
    );
    if !settings.maintenance_message.is_empty() {
        println!("message:     {}", settings.maintenance_message);
    }
}

/// Current platform settings.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn settings(ctx: &Context) -> Result<(), CliError> {
    ctx.require_user()?;
    let api = ctx.api();
    let settings: PlatformSettings = ctx
        .cache
        .get_or_fetch(settings_key(), || api.platform_settings())
        .await?;
    print_settings(&settings);
    Ok(())
}

/// Change the platform commission.
///
/// # Errors
///
/// Returns an error if the percentage is out of range or the update fails.
pub async fn set_commission(ctx: &Context, pct: Decimal) -> Result<(), CliError> {
    ctx.require_user()?;
    if pct.is_sign_negative() || pct > Decimal::ONE_HUNDRED {
        return Err(CliError::Usage(
            "Commission must be between 0 and 100".to_string(),
        ));
    }
    let settings = ctx.api().update_commission(pct).await?;
    ctx.cache.invalidate(&settings_key()).await;
    ctx.notices.push("Commission updated");
    print_settings(&settings);
    Ok(())
}

/// Switch maintenance mode.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_maintenance(
    ctx: &Context,
    enabled: bool,
    message: Option<String>,
) -> Result<(), CliError> {
    ctx.require_user()?;
    let update = MaintenanceUpdate {
        maintenance_enabled: enabled,
        maintenance_message: message.unwrap_or_default().trim().to_string(),
    };
    let settings = ctx.api().update_maintenance(&update).await?;
    ctx.cache.invalidate(&settings_key()).await;
    ctx.notices.push("Maintenance settings updated");
    print_settings(&settings);
    Ok(())
}

fn user_row(user: &User) -> Vec<String> {
    vec![
        user.account_id().unwrap_or("").to_string(),
        user.display_name().to_string(),
        user.identity.email.clone().unwrap_or_default(),
        user.role.to_string(),
        user.seller_status
            .map(|status| status.to_string())
            .unwrap_or_default(),
        if user.disabled { "disabled" } else { "active" }.to_string(),
    ]
}

fn print_users(users: &[User]) {
    let rows: Vec<_> = users.iter().map(user_row).collect();
    print_table(&["ID", "NAME", "EMAIL", "ROLE", "SELLER", "STATE"], &rows);
}

// ===== Moderation =====

/// Seller accounts, optionally filtered by approval status.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn sellers(ctx: &Context, status: Option<SellerStatus>) -> Result<(), CliError> {
    ctx.require_user()?;
    print_users(&ctx.api().sellers(status).await?);
    Ok(())
}

/// Approve, reject or suspend a seller.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_seller_status(
    ctx: &Context,
    id: &str,
    status: SellerStatus,
) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().set_seller_status(id, status).await?;
    ctx.notices.push(format!("Seller marked {status}"));
    Ok(())
}

/// Products awaiting or past moderation.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn products(ctx: &Context, status: Option<ProductStatus>) -> Result<(), CliError> {
    ctx.require_user()?;
    let products = ctx.api().moderation_products(status).await?;
    let rows: Vec<_> = products
        .iter()
        .map(|product| {
            vec![
                product.id.to_string(),
                product.title.clone(),
                product
                    .status
                    .map(|status| status.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "STATUS"], &rows);
    Ok(())
}

/// Approve or reject a product.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_product_status(
    ctx: &Context,
    id: &str,
    status: ProductStatus,
) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().set_product_status(id, status).await?;
    ctx.cache.invalidate_prefix(&QueryKey::from(["product", id]));
    ctx.cache.invalidate_prefix(&QueryKey::from(["products"]));
    ctx.notices.push(format!("Product marked {status}"));
    Ok(())
}

// ===== Users =====

/// The user directory.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn users(ctx: &Context, query: &UserQuery) -> Result<(), CliError> {
    ctx.require_user()?;
    print_users(&ctx.api().users(query).await?);
    Ok(())
}

/// Enable or disable an account.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn toggle_user(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().toggle_user(id).await?;
    ctx.notices.push("User updated");
    Ok(())
}

/// Change an account's role.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_role(ctx: &Context, id: &str, role: Role) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().set_user_role(id, role).await?;
    ctx.notices.push(format!("Role set to {role}"));
    Ok(())
}

/// Admin accounts.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn admins(ctx: &Context) -> Result<(), CliError> {
    ctx.require_user()?;
    print_users(&ctx.api().admins().await?);
    Ok(())
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if a field is empty or the backend rejects the account.
pub async fn create_admin(ctx: &Context, admin: NewAdmin<'_>) -> Result<(), CliError> {
    ctx.require_user()?;
    if [admin.name, admin.username, admin.email, admin.password]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(CliError::Usage("All fields are required".to_string()));
    }
    ctx.api().create_admin(&admin).await?;
    ctx.notices.push("Admin created");
    Ok(())
}

/// Enable or disable an admin account.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn toggle_admin(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.api().toggle_admin(id).await?;
    ctx.notices.push("Admin updated");
    Ok(())
}

// ===== Reports =====

fn report_destination(report: Report, out: Option<PathBuf>) -> PathBuf {
    match out {
        Some(path) if path.is_dir() => path.join(report.file_name()),
        Some(path) => path,
        None => PathBuf::from(report.file_name()),
    }
}

/// Download a CSV report to disk.
///
/// # Errors
///
/// Returns an error if the download or the file write fails.
pub async fn report(ctx: &Context, report: Report, out: Option<PathBuf>) -> Result<(), CliError> {
    ctx.require_user()?;
    let bytes = ctx.api().download_report(report).await?;
    let path = report_destination(report, out);
    write_report(&path, &bytes).await?;
    info!(report = %report, path = %path.display(), bytes = bytes.len(), "Report saved");
    println!("Saved {}", path.display());
    Ok(())
}

async fn write_report(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_row() {
        let user: User = serde_json::from_value(json!({
            "_id": "u7",
            "name": "Rin",
            "email": "rin@example.com",
            "role": "SELLER",
            "sellerStatus": "APPROVED",
            "disabled": true
        }))
        .unwrap();
        assert_eq!(
            user_row(&user),
            ["u7", "Rin", "rin@example.com", "SELLER", "APPROVED", "disabled"]
        );
    }

    #[test]
    fn test_report_destination() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            report_destination(Report::Orders, Some(dir.path().to_path_buf())),
            dir.path().join("orders.csv")
        );
        assert_eq!(
            report_destination(Report::Sellers, None),
            PathBuf::from("sellers.csv")
        );
        assert_eq!(
            report_destination(Report::Products, Some(PathBuf::from("out/p.csv"))),
            PathBuf::from("out/p.csv")
        );
    }

    #[tokio::test]
    async fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports/orders.csv");
        write_report(&path, b"id,total\n").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"id,total\n");
    }
}
