// src/hr_client.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

// Constants
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Caller-identity header carrying the acting employee id alongside the
/// bearer token, as the backend expects on every request.
pub const EMP_ID_HEADER: &str = "x-emp-id";

// Error type for the HR API client
#[derive(Error, Debug)]
pub enum HrApiError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("HR API error: Status={status}, Message='{message}'")]
    Api { status: StatusCode, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// Configuration for the HR API client
#[derive(Clone, Debug)]
pub struct HrApiConfig {
    pub base_url: String,
    pub auth_token: String,
    /// Employee id of the acting admin/supervisor; sent as the caller
    /// identity header and stamped into bulk create payloads.
    pub admin_emp_id: String,
    pub request_timeout_secs: u64,
}

impl Default for HrApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: String::new(),
            admin_emp_id: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

// --- Wire payloads (field names match the backend contract exactly) ---

#[derive(Debug, Clone, Serialize)]
pub struct BulkShiftPayload {
    pub array_employee_emp_id: Vec<String>,
    pub admin_emp_id: String,
    pub shift_in: String,
    pub shift_out: String,
    pub array_selected_days: Vec<String>,
    pub schedule_type_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakDefinition {
    pub name: String,
    pub shift_in: String,
    pub shift_out: String,
    pub schedule_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkBreakPayload {
    pub array_employee_emp_id: Vec<String>,
    pub admin_emp_id: String,
    pub array_selected_days: Vec<String>,
    pub array_break: Vec<BreakDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeletePayload {
    pub array_employee_emp_id: Vec<String>,
    pub array_selected_days: Vec<String>,
}

// --- Response types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTypeInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeTypeInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: Option<i64>,
    pub emp_id: String,
    pub date: String,
    pub shift_in: Option<String>,
    pub shift_out: Option<String>,
    pub schedule_type_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTypeListResponse {
    pub data: Vec<ScheduleTypeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeTypeListResponse {
    pub data: Vec<OvertimeTypeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    pub data: Vec<ScheduleRow>,
}

// Error body the backend returns on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// --- API surface ---

/// The backend operations the dispatcher depends on. Kept behind a trait so
/// the fan-out logic can be exercised against a recording mock in tests.
#[async_trait]
pub trait ScheduleApi {
    /// One bulk create covering the full employee list and day list; the
    /// backend performs the employee x day cross-product server-side.
    async fn create_shift_schedules(&self, payload: &BulkShiftPayload) -> Result<(), HrApiError>;

    async fn create_break_schedules(&self, payload: &BulkBreakPayload) -> Result<(), HrApiError>;

    /// Deletes schedule rows of one type for every (employee, day) pair in
    /// the payload. The type id travels in the path.
    async fn delete_schedules(
        &self,
        schedule_type_id: &str,
        payload: &BulkDeletePayload,
    ) -> Result<(), HrApiError>;

    async fn fetch_schedule_types(&self) -> Result<Vec<ScheduleTypeInfo>, HrApiError>;

    async fn fetch_overtime_types(&self) -> Result<Vec<OvertimeTypeInfo>, HrApiError>;

    /// Supervisor-scoped schedule listing, used as the authoritative re-fetch
    /// after a mutation has been applied.
    async fn fetch_schedules(
        &self,
        supervisor_emp_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduleRow>, HrApiError>;
}

// HR API client implementation
#[derive(Clone)]
pub struct HrApiClient {
    config: Arc<HrApiConfig>,
    http_client: Client,
}

impl HrApiClient {
    pub fn new(config: HrApiConfig) -> Result<Self, HrApiError> {
        if config.base_url.is_empty() {
            return Err(HrApiError::Config("API base URL is not set".to_string()));
        }
        // Validate the base URL up front rather than on every request
        Url::parse(&config.base_url)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    pub fn admin_emp_id(&self) -> &str {
        &self.config.admin_emp_id
    }

    fn build_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, HrApiError> {
        let url = if endpoint.starts_with('/') {
            format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
        } else {
            format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
        };
        Url::parse(&url)?;

        Ok(self
            .http_client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.auth_token))
            .header(EMP_ID_HEADER, &self.config.admin_emp_id)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json"))
    }

    /// Sends a request and maps non-2xx responses to `HrApiError::Api`,
    /// preferring the backend's own `message` field over the raw body.
    async fn send_checked(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<reqwest::Response, HrApiError> {
        debug!("Sending request: {}", context_msg);
        let response = request_builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        let message = match serde_json::from_str::<ApiErrorBody>(&error_body) {
            Ok(parsed) => parsed.message.unwrap_or(error_body),
            Err(_) => error_body,
        };
        error!(
            "HR API request '{}' failed: Status={}, Message='{}'",
            context_msg, status, message
        );
        Err(HrApiError::Api { status, message })
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, HrApiError> {
        let response = self.send_checked(request_builder, context_msg).await?;
        let parsed = response.json::<T>().await?;
        Ok(parsed)
    }
}

#[async_trait]
impl ScheduleApi for HrApiClient {
    async fn create_shift_schedules(&self, payload: &BulkShiftPayload) -> Result<(), HrApiError> {
        let request = self
            .build_request(Method::POST, "/schedules/bulk")?
            .json(payload);
        self.send_checked(request, "bulk shift create").await?;
        Ok(())
    }

    async fn create_break_schedules(&self, payload: &BulkBreakPayload) -> Result<(), HrApiError> {
        let request = self
            .build_request(Method::POST, "/schedules/breaks/bulk")?
            .json(payload);
        self.send_checked(request, "bulk break create").await?;
        Ok(())
    }

    async fn delete_schedules(
        &self,
        schedule_type_id: &str,
        payload: &BulkDeletePayload,
    ) -> Result<(), HrApiError> {
        let endpoint = format!("/schedules/type/{}/bulk", schedule_type_id);
        let request = self.build_request(Method::DELETE, &endpoint)?.json(payload);
        let context = format!("bulk delete (type {})", schedule_type_id);
        self.send_checked(request, &context).await?;
        Ok(())
    }

    async fn fetch_schedule_types(&self) -> Result<Vec<ScheduleTypeInfo>, HrApiError> {
        let request = self.build_request(Method::GET, "/schedule-types")?;
        let response: ScheduleTypeListResponse = self
            .send_and_deserialize(request, "fetch schedule types")
            .await?;
        Ok(response.data)
    }

    async fn fetch_overtime_types(&self) -> Result<Vec<OvertimeTypeInfo>, HrApiError> {
        let request = self.build_request(Method::GET, "/overtime-types")?;
        let response: OvertimeTypeListResponse = self
            .send_and_deserialize(request, "fetch overtime types")
            .await?;
        Ok(response.data)
    }

    async fn fetch_schedules(
        &self,
        supervisor_emp_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduleRow>, HrApiError> {
        let endpoint = format!(
            "/supervisor/{}/schedules?from={}&to={}",
            supervisor_emp_id,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        let request = self.build_request(Method::GET, &endpoint)?;
        let response: ScheduleListResponse = self
            .send_and_deserialize(request, "fetch supervisor schedules")
            .await?;
        Ok(response.data)
    }
}
