use serde::Serialize;

use crewdesk_core::{Expense, FinanceSummary, Income, Payroll, PayrollStatus};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Serialize)]
pub struct PayrollCreate {
    pub user_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub base_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonuses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deductions: Option<f64>,
    pub net_amount: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PayrollUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PayrollStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExpenseCreate {
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IncomeCreate {
    pub source: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub category: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct IncomeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub async fn payroll(client: &ApiClient, user_id: Option<i64>) -> Result<Vec<Payroll>, ApiError> {
    client
        .get_json("/payroll", &[("user_id", user_id.map(|id| id.to_string()))])
        .await
}

pub async fn create_payroll(
    client: &ApiClient,
    request: &PayrollCreate,
) -> Result<Payroll, ApiError> {
    client.post_json("/payroll", request).await
}

pub async fn update_payroll(
    client: &ApiClient,
    id: i64,
    patch: &PayrollUpdate,
) -> Result<Payroll, ApiError> {
    client.put_json(&format!("/payroll/{id}"), patch).await
}

pub async fn delete_payroll(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/payroll/{id}")).await
}

pub async fn expenses(client: &ApiClient) -> Result<Vec<Expense>, ApiError> {
    client.get_json("/expenses", &[]).await
}

pub async fn create_expense(
    client: &ApiClient,
    request: &ExpenseCreate,
) -> Result<Expense, ApiError> {
    client.post_json("/expenses", request).await
}

pub async fn update_expense(
    client: &ApiClient,
    id: i64,
    patch: &ExpenseUpdate,
) -> Result<Expense, ApiError> {
    client.put_json(&format!("/expenses/{id}"), patch).await
}

pub async fn delete_expense(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/expenses/{id}")).await
}

pub async fn income(client: &ApiClient) -> Result<Vec<Income>, ApiError> {
    client.get_json("/income", &[]).await
}

pub async fn create_income(client: &ApiClient, request: &IncomeCreate) -> Result<Income, ApiError> {
    client.post_json("/income", request).await
}

pub async fn update_income(
    client: &ApiClient,
    id: i64,
    patch: &IncomeUpdate,
) -> Result<Income, ApiError> {
    client.put_json(&format!("/income/{id}"), patch).await
}

pub async fn delete_income(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/income/{id}")).await
}

/// Aggregates are computed server-side; this is a read-only view.
pub async fn summary(client: &ApiClient) -> Result<FinanceSummary, ApiError> {
    client.get_json("/finance/summary", &[]).await
}
