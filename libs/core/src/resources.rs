//! REST resource records passed through between the dashboard and the
//! backend. The client performs no business logic on these; date-only and
//! time-of-day fields stay as the wire strings, timestamps are RFC 3339.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::User;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: i64,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub date: String,
    pub shift_start: String,
    pub shift_end: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ScheduleStatus,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub assigned_to: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_by_ai: bool,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Pending,
    Paid,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payroll {
    pub id: i64,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub period_start: String,
    pub period_end: String,
    pub base_salary: f64,
    pub bonuses: f64,
    pub deductions: f64,
    pub net_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<String>,
    pub status: PayrollStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,
    pub created_by: i64,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Income {
    pub id: i64,
    pub source: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Expense => "expense",
            CategoryKind::Income => "income",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FinanceCategory {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub is_default: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub payroll: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Aggregated totals computed by the backend; rendered as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FinanceSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_payroll: f64,
    pub balance: f64,
    pub monthly: Vec<MonthlyTotals>,
    pub expense_by_category: Vec<CategoryTotal>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Schedule,
    Task,
    Payment,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Schedule => "schedule",
            NotificationKind::Task => "task",
            NotificationKind::Payment => "payment",
            NotificationKind::System => "system",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Clock-in/out record for a staff member.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeCard {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub clock_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<String>,
    pub device_type: String,
    pub is_ipad: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadResult {
    pub url: String,
    pub filename: String,
}
