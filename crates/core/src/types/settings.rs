//! Platform-wide settings managed by the super admin.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission and maintenance controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    /// Commission the platform keeps on each sale, in percent.
    #[serde(default)]
    pub commission_pct: Decimal,
    #[serde(default)]
    pub maintenance_enabled: bool,
    #[serde(default)]
    pub maintenance_message: String,
}

/// Body of a commission change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionUpdate {
    #[serde(with = "rust_decimal::serde::float")]
    pub commission_pct: Decimal,
}

/// Body of a maintenance-mode change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceUpdate {
    pub maintenance_enabled: bool,
    pub maintenance_message: String,
}
