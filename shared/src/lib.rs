//! Shared types for the donation tracker.
//!
//! Everything the REST API sends or receives lives here so the service and
//! any consumer (admin SPA, public page, scripts) agree on one wire contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label shown on the public feed for every donor that is not the pinned
/// affiliated organisation. Stored names are never exposed publicly.
pub const ANONYMOUS_DONOR_LABEL: &str = "Hamba Alloh";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Lifecycle state of a fundraising event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(EventStatus::Active),
            "completed" => Some(EventStatus::Completed),
            "cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

/// A fundraising event / campaign. Events are toggled and edited but never
/// deleted, so historic donations always keep a valid owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Whether the event is shown on the public page.
    pub is_active: bool,
    pub status: EventStatus,
    /// Fundraising target in the smallest currency unit, if one was set.
    pub target_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_amount: Option<i64>,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_amount: Option<i64>,
    pub status: Option<EventStatus>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub total_items: u32,
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

/// A donor on file. Created explicitly, or implicitly the first time a
/// donation names someone unknown. Donors are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonorRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorListResponse {
    pub donors: Vec<Donor>,
    pub total_items: u32,
}

// ---------------------------------------------------------------------------
// Payment method
// ---------------------------------------------------------------------------

/// How a donation was received.
///
/// The stored column is the legacy display string (`"Tunai"`, `"Transfer"`,
/// `"Transfer (BSI 7185674333)"`), so this type round-trips to and from that
/// form. Rows whose text matches neither shape are preserved verbatim as
/// `Other` and only count toward grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer { account: Option<String> },
    Other { label: String },
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("tunai") || lower.contains("cash") {
            return PaymentMethod::Cash;
        }
        if lower.contains("transfer") {
            let account = raw
                .split_once('(')
                .and_then(|(_, rest)| rest.rsplit_once(')'))
                .map(|(inner, _)| inner.trim().to_string())
                .filter(|s| !s.is_empty());
            return PaymentMethod::Transfer { account };
        }
        PaymentMethod::Other {
            label: raw.to_string(),
        }
    }

    /// The stored / displayed string form.
    pub fn label(&self) -> String {
        match self {
            PaymentMethod::Cash => "Tunai".to_string(),
            PaymentMethod::Transfer { account: None } => "Transfer".to_string(),
            PaymentMethod::Transfer {
                account: Some(account),
            } => format!("Transfer ({})", account),
            PaymentMethod::Other { label } => label.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

/// A recorded donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub event_id: String,
    /// None for anonymous / unregistered donors.
    pub donor_id: Option<String>,
    /// Copy of the donor's name taken when the donation was recorded, so
    /// historical displays survive later donor edits.
    pub donor_name: Option<String>,
    /// Amount in the smallest currency unit; absent on imported rows.
    pub amount: Option<i64>,
    pub method: PaymentMethod,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    pub event_id: String,
    /// Use an existing donor directly. When absent, `donor_name` is resolved
    /// by exact-name lookup, creating the donor if needed.
    pub donor_id: Option<String>,
    pub donor_name: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    /// Defaults to now when omitted.
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDonationRequest {
    pub event_id: Option<String>,
    pub donor_id: Option<String>,
    pub donor_name: Option<String>,
    pub amount: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub transaction_date: Option<DateTime<Utc>>,
}

/// A donation joined with the owning event's name for list display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRow {
    #[serde(flatten)]
    pub donation: Donation,
    pub event_name: Option<String>,
}

/// Subtotals over a set of donations, bucketed by payment method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationBreakdown {
    pub total: i64,
    pub cash: i64,
    pub transfer: i64,
    /// Per-account transfer subtotals, keyed by the account label.
    pub by_account: BTreeMap<String, i64>,
    /// Transfers that carry no account qualifier.
    pub other_transfer: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationListResponse {
    pub donations: Vec<DonationRow>,
    pub total_items: u32,
    /// Computed over the full filtered set, not just the returned page.
    pub breakdown: DonationBreakdown,
}

// ---------------------------------------------------------------------------
// Disbursements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisbursementMethod {
    Cash,
    Transfer,
}

impl DisbursementMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisbursementMethod::Cash => "cash",
            DisbursementMethod::Transfer => "transfer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cash" => Some(DisbursementMethod::Cash),
            "transfer" => Some(DisbursementMethod::Transfer),
            _ => None,
        }
    }
}

/// Money paid out of an event's funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disbursement {
    pub id: String,
    pub event_id: String,
    pub description: String,
    pub amount: Option<i64>,
    pub disbursement_date: DateTime<Utc>,
    pub recipient: String,
    pub method: DisbursementMethod,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDisbursementRequest {
    pub event_id: String,
    pub description: String,
    pub amount: i64,
    pub disbursement_date: DateTime<Utc>,
    pub recipient: String,
    pub method: DisbursementMethod,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDisbursementRequest {
    pub event_id: Option<String>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub disbursement_date: Option<DateTime<Utc>>,
    pub recipient: Option<String>,
    pub method: Option<DisbursementMethod>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementRow {
    #[serde(flatten)]
    pub disbursement: Disbursement,
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementListResponse {
    pub disbursements: Vec<DisbursementRow>,
    pub total_items: u32,
    /// Donations minus disbursements for the current event filter.
    pub balance: i64,
}

// ---------------------------------------------------------------------------
// Fund mutations
// ---------------------------------------------------------------------------

/// A transfer between the foundation's own accounts (e.g. cash deposited to
/// a bank account). Source and destination must differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundMutation {
    pub id: String,
    pub event_id: String,
    pub mutation_date: DateTime<Utc>,
    pub from_account: String,
    pub to_account: String,
    pub amount: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFundMutationRequest {
    pub event_id: String,
    pub mutation_date: DateTime<Utc>,
    pub from_account: String,
    pub to_account: String,
    pub amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateFundMutationRequest {
    pub event_id: Option<String>,
    pub mutation_date: Option<DateTime<Utc>>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundMutationRow {
    #[serde(flatten)]
    pub mutation: FundMutation,
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundMutationListResponse {
    pub mutations: Vec<FundMutationRow>,
    pub total_items: u32,
}

// ---------------------------------------------------------------------------
// Users / profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Defaults to staff.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<Profile>,
    pub total_items: u32,
}

/// Identifier of the row a mutation touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Public page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationStats {
    pub total_amount: i64,
    pub donation_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicSummaryResponse {
    /// The currently active event, if any.
    pub event: Option<Event>,
    pub stats: DonationStats,
}

/// One line of the public donation feed. `display_name` is already redacted:
/// only the pinned affiliated donor's real name appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub display_name: String,
    pub amount: i64,
    pub method: String,
    pub transaction_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicFeedResponse {
    pub entries: Vec<FeedEntry>,
    pub page: u32,
}

// ---------------------------------------------------------------------------
// Admin dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: String,
    pub donor_name: Option<String>,
    pub event_name: Option<String>,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_donations: i64,
    pub transaction_count: u32,
    pub total_donors: u32,
    pub active_events: u32,
    pub recent_activities: Vec<ActivityRow>,
}
