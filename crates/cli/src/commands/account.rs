//! Orders, profile and dashboards of the signed-in account.

use bazaar_client::QueryKey;
use bazaar_client::api::{AccountUpdate, AnalyticsSummary};
use bazaar_core::{Order, Role, User};
use serde_json::Value;

use super::{CliError, Context, print_table};

/// Orders shown on staff and seller dashboards.
const RECENT_ORDERS: u32 = 10;

fn order_row(order: &Order) -> Vec<String> {
    vec![
        order.id.short().to_string(),
        order.status.clone(),
        order.rounded_total().to_string(),
        order
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    ]
}

/// Orders visible to the signed-in account.
///
/// Customers see their own orders; staff and sellers see the most recent
/// ones in their area.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the API request fails.
pub async fn orders(ctx: &Context, limit: Option<u32>) -> Result<(), CliError> {
    let role = ctx.require_user()?.role;
    let api = ctx.api();
    let orders = match role {
        Role::Customer => api.customer_orders().await?,
        _ => api.recent_orders(limit.unwrap_or(RECENT_ORDERS)).await?,
    };
    let rows: Vec<_> = orders.iter().map(order_row).collect();
    print_table(&["ORDER", "STATUS", "TOTAL", "PLACED"], &rows);
    Ok(())
}

fn account_key() -> QueryKey {
    QueryKey::from(["customer", "account"])
}

/// Print the profile as stored on the backend.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the API request fails.
pub async fn show(ctx: &Context) -> Result<(), CliError> {
    ctx.require_user()?;
    let api = ctx.api();
    let user: User = ctx
        .cache
        .get_or_fetch(account_key(), || api.account())
        .await?;
    println!("name:  {}", user.name.as_deref().unwrap_or(""));
    println!("phone: {}", user.phone.as_deref().unwrap_or(""));
    if let Some(email) = &user.identity.email {
        println!("email: {email}");
    }
    Ok(())
}

/// Change name and/or phone, keeping the other field as it is.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the update is rejected.
pub async fn update(
    ctx: &Context,
    name: Option<String>,
    phone: Option<String>,
) -> Result<(), CliError> {
    let user = ctx.require_user()?;
    if name.is_none() && phone.is_none() {
        return Err(CliError::Usage("Nothing to update".to_string()));
    }

    let mut update = AccountUpdate::from_user(user);
    if let Some(name) = name {
        update.name = name.trim().to_string();
    }
    if let Some(phone) = phone {
        update.phone = phone.trim().to_string();
    }

    ctx.api().update_account(&update).await?;
    ctx.cache.invalidate(&account_key()).await;
    ctx.notices.push("Profile saved");
    Ok(())
}

fn kpi_rows(summary: &AnalyticsSummary) -> Vec<Vec<String>> {
    summary
        .kpis
        .iter()
        .map(|(name, value)| vec![name.clone(), render_value(value)])
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Dashboard figures for the signed-in role.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the role has no dashboard or
/// the API request fails.
pub async fn dashboard(ctx: &Context, advanced: bool) -> Result<(), CliError> {
    let role = ctx.require_user()?.role;
    let api = ctx.api();
    let summary: AnalyticsSummary = ctx
        .cache
        .get_or_fetch(
            QueryKey::from(["analytics", role.as_str(), "summary"]),
            || api.analytics_summary(role),
        )
        .await?;

    print_table(&["KPI", "VALUE"], &kpi_rows(&summary));
    if !summary.monthly.is_empty() {
        println!("{} month(s) of history", summary.monthly.len());
    }

    if advanced {
        if role != Role::SuperAdmin {
            return Err(CliError::Usage(
                "Advanced analytics are for the super admin".to_string(),
            ));
        }
        let report = api.advanced_analytics(RECENT_ORDERS).await?;
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
        );
    }
    Ok(())
}
