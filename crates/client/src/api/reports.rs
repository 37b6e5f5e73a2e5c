//! CSV report downloads.

use std::fmt;
use std::str::FromStr;

use tracing::{info, instrument};

use super::{ApiClient, ApiError};

/// Downloadable CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Orders,
    Products,
    Sellers,
}

impl Report {
    pub const ALL: [Self; 3] = [Self::Orders, Self::Products, Self::Sellers];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Products => "products",
            Self::Sellers => "sellers",
        }
    }

    /// Suggested file name for the download.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }

    fn path(self) -> String {
        format!("/api/reports/{}", self.as_str())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Report {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|report| report.as_str() == wanted)
            .ok_or_else(|| format!("unknown report: {s}"))
    }
}

impl ApiClient {
    /// Download a report as raw CSV bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn download_report(&self, report: Report) -> Result<Vec<u8>, ApiError> {
        let request = self
            .request(reqwest::Method::GET, &report.path())
            .await?;
        let body = self.send_bytes(request).await?;
        info!(report = %report, bytes = body.len(), "Report downloaded");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_names() {
        assert_eq!(Report::Sellers.file_name(), "sellers.csv");
        assert_eq!(Report::Orders.path(), "/api/reports/orders");
        assert_eq!("Products".parse::<Report>().unwrap(), Report::Products);
        assert!("payouts".parse::<Report>().is_err());
    }
}
