//! Record kinds served by the console and their per-page conventions.
//!
//! Every list page of the console is backed by exactly one [`RecordKind`].
//! The kind decides which backend collection is fetched, which fields the
//! free-text search looks at, which sort fields are exposed, and whether
//! records of that kind can be reviewed (approved / rejected).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::filter::SortField;
use super::stats::StatsScope;
use crate::error::GatewayError;

/// Kind of back-office record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Client deposit request.
    Deposit,
    /// Client withdrawal request.
    Withdrawal,
    /// Withdrawal of an investment position back to the client balance.
    InvestmentSettlement,
    /// Referral reward.
    Referral,
    /// Ledger transaction (transaction history page).
    Transaction,
    /// News / broadcast post.
    NewsPost,
}

/// Field of a [`super::Record`] that free-text search may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Record identifier.
    Id,
    /// Owning user's display name.
    UserName,
    /// Owning user's email address.
    UserEmail,
    /// On-chain or payment-provider transaction id.
    TxId,
    /// Post title.
    Title,
}

impl RecordKind {
    /// Every kind, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Deposit,
        Self::Withdrawal,
        Self::InvestmentSettlement,
        Self::Referral,
        Self::Transaction,
        Self::NewsPost,
    ];

    /// Returns the kind as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::InvestmentSettlement => "investment_settlement",
            Self::Referral => "referral",
            Self::Transaction => "transaction",
            Self::NewsPost => "news_post",
        }
    }

    /// Collection path on the backend, relative to its base URL.
    #[must_use]
    pub const fn backend_path(self) -> &'static str {
        match self {
            Self::Deposit => "deposits",
            Self::Withdrawal => "withdrawals",
            Self::InvestmentSettlement => "investments/withdrawals",
            Self::Referral => "referrals",
            Self::Transaction => "transactions",
            Self::NewsPost => "news",
        }
    }

    /// Fields matched by the free-text search on this kind's page.
    #[must_use]
    pub const fn searchable_fields(self) -> &'static [SearchField] {
        match self {
            Self::Deposit | Self::Withdrawal | Self::Transaction => &[
                SearchField::UserName,
                SearchField::UserEmail,
                SearchField::Id,
                SearchField::TxId,
            ],
            Self::InvestmentSettlement | Self::Referral => {
                &[SearchField::UserName, SearchField::UserEmail, SearchField::Id]
            }
            Self::NewsPost => &[SearchField::Title, SearchField::Id],
        }
    }

    /// Sort fields exposed by this kind's page. Date is always available.
    #[must_use]
    pub const fn sortable_fields(self) -> &'static [SortField] {
        match self {
            Self::Deposit | Self::Withdrawal | Self::InvestmentSettlement | Self::Transaction => {
                &[SortField::Date, SortField::Amount, SortField::Status]
            }
            Self::Referral => &[SortField::Date, SortField::Amount],
            Self::NewsPost => &[SortField::Date],
        }
    }

    /// Whether the console may request approve / reject on this kind.
    #[must_use]
    pub const fn supports_transitions(self) -> bool {
        matches!(
            self,
            Self::Deposit | Self::Withdrawal | Self::InvestmentSettlement
        )
    }

    /// Collection the page's summary cards are computed over by default.
    #[must_use]
    pub const fn default_stats_scope(self) -> StatsScope {
        match self {
            Self::Transaction | Self::NewsPost => StatsScope::Filtered,
            Self::Deposit | Self::Withdrawal | Self::InvestmentSettlement | Self::Referral => {
                StatsScope::Global
            }
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = GatewayError;

    /// Accepts the wire string as well as the plural page slugs the console
    /// routes use (`deposits`, `investment-withdrawals`, `news`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "deposit" | "deposits" => Ok(Self::Deposit),
            "withdrawal" | "withdrawals" => Ok(Self::Withdrawal),
            "investment_settlement"
            | "investment_settlements"
            | "investment_withdrawal"
            | "investment_withdrawals" => Ok(Self::InvestmentSettlement),
            "referral" | "referrals" => Ok(Self::Referral),
            "transaction" | "transactions" => Ok(Self::Transaction),
            "news_post" | "news_posts" | "news" => Ok(Self::NewsPost),
            _ => Err(GatewayError::InvalidRecordKind(s.to_string())),
        }
    }
}
