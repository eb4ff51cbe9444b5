//! REST transport for the LeadPilot API.
//!
//! Every endpoint has a typed method. Non-2xx responses become
//! [`ClientError::Http`] with the server's message, transport failures
//! become [`ClientError::Network`], and 2xx bodies that do not match the
//! endpoint schema become [`ClientError::Decode`]. Nothing is retried.

use crate::config::TuiConfig;
use leadpilot_core::{
    ActivityItem, AssignToCampaign, CampaignDraft, CampaignId, CampaignStats,
    CampaignStatusUpdate, CheckoutSession, ClientError, ClientResult, CreatePayment,
    CreatedResponse, CurrentSubscription, EmailCampaign, EmailLog, EnrichEmail,
    EnrichEmailResponse, GenerateMessageRequest, GeneratedMessage, Lead, LeadId,
    LeadListResponse, LeadStatusUpdate, LeadUpdateResponse, MessageResponse, PerformancePoint,
    Plan, ScrapeLeadsRequest, SendCampaign, UploadLeads, Usage,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Paths that answer without a bearer token.
const PUBLIC_PATHS: &[&str] = &["/api/subscriptions/plans"];

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.has_token())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: build_auth_headers(token)?,
        })
    }

    pub fn from_config(config: &TuiConfig, token: Option<&str>) -> ClientResult<Self> {
        Self::new(&config.api_base_url, token, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.auth_header.contains_key(AUTHORIZATION)
    }

    // ------------------------------------------------------------------------
    // Leads
    // ------------------------------------------------------------------------

    pub async fn list_leads(&self, unassigned: bool) -> ClientResult<Vec<Lead>> {
        let path = format!("/api/leads/list?unassigned={unassigned}");
        let response: LeadListResponse = self.get_json(&path).await?;
        Ok(response.leads)
    }

    pub async fn upload_leads(&self, req: &UploadLeads) -> ClientResult<LeadUpdateResponse> {
        self.post_json("/api/leads/upload", req).await
    }

    pub async fn update_lead_status(
        &self,
        lead_id: LeadId,
        req: &LeadStatusUpdate,
    ) -> ClientResult<LeadUpdateResponse> {
        self.put_json(&format!("/api/{lead_id}"), req).await
    }

    pub async fn delete_lead(&self, lead_id: LeadId) -> ClientResult<MessageResponse> {
        self.delete_json(&format!("/api/{lead_id}")).await
    }

    pub async fn enrich_email(&self, req: &EnrichEmail) -> ClientResult<EnrichEmailResponse> {
        self.post_json("/api/enrich-email", req).await
    }

    pub async fn assign_to_campaign(&self, req: &AssignToCampaign) -> ClientResult<MessageResponse> {
        self.post_json("/api/assign-to-campaign", req).await
    }

    pub async fn scrape_leads(&self, req: &ScrapeLeadsRequest) -> ClientResult<MessageResponse> {
        self.post_json("/api/scrape-linkedin-leads", req).await
    }

    /// Raw CSV export of the lead table.
    pub async fn export_leads(&self, unassigned: bool) -> ClientResult<String> {
        let path = format!("/api/export?unassigned={unassigned}");
        self.request_text(Method::GET, &path).await
    }

    // ------------------------------------------------------------------------
    // Email campaigns
    // ------------------------------------------------------------------------

    pub async fn list_campaigns(&self) -> ClientResult<Vec<EmailCampaign>> {
        self.get_json("/api/email-campaigns").await
    }

    pub async fn create_campaign(&self, req: &CampaignDraft) -> ClientResult<CreatedResponse> {
        self.post_json("/api/email-campaigns", req).await
    }

    pub async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        req: &CampaignDraft,
    ) -> ClientResult<MessageResponse> {
        self.put_json(&format!("/api/email-campaigns/{campaign_id}"), req)
            .await
    }

    pub async fn set_campaign_status(
        &self,
        campaign_id: CampaignId,
        req: &CampaignStatusUpdate,
    ) -> ClientResult<MessageResponse> {
        self.put_json(&format!("/api/email-campaigns/{campaign_id}"), req)
            .await
    }

    pub async fn delete_campaign(&self, campaign_id: CampaignId) -> ClientResult<MessageResponse> {
        self.delete_json(&format!("/api/email-campaigns/{campaign_id}"))
            .await
    }

    pub async fn send_campaign(
        &self,
        campaign_id: CampaignId,
        req: &SendCampaign,
    ) -> ClientResult<MessageResponse> {
        self.post_json(&format!("/api/email-campaigns/{campaign_id}/send"), req)
            .await
    }

    pub async fn campaign_logs(&self, campaign_id: CampaignId) -> ClientResult<Vec<EmailLog>> {
        self.get_json(&format!("/api/email-campaigns/{campaign_id}/logs"))
            .await
    }

    pub async fn campaign_performance(&self) -> ClientResult<Vec<PerformancePoint>> {
        self.get_json("/api/email-campaigns/performance").await
    }

    pub async fn campaign_stats(&self) -> ClientResult<CampaignStats> {
        self.get_json("/api/campaigns/stats").await
    }

    // ------------------------------------------------------------------------
    // Activity, subscriptions, AI
    // ------------------------------------------------------------------------

    pub async fn activity(&self) -> ClientResult<Vec<ActivityItem>> {
        self.get_json("/api/activity").await
    }

    pub async fn usage(&self) -> ClientResult<Usage> {
        self.get_json("/api/subscriptions/usage").await
    }

    pub async fn plans(&self) -> ClientResult<Vec<Plan>> {
        self.get_json("/api/subscriptions/plans").await
    }

    pub async fn current_subscription(&self) -> ClientResult<CurrentSubscription> {
        self.get_json("/api/subscriptions/current").await
    }

    pub async fn create_payment(&self, req: &CreatePayment) -> ClientResult<CheckoutSession> {
        self.post_json("/api/subscriptions/create-payment", req)
            .await
    }

    pub async fn generate_message(
        &self,
        req: &GenerateMessageRequest,
    ) -> ClientResult<GeneratedMessage> {
        self.post_json("/api/generate-message", req).await
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }

    /// Send a request and decode its JSON body as `T`.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(path, error = %e, "Response did not match schema");
            ClientError::Decode {
                endpoint: endpoint_name(path),
                reason: e.to_string(),
            }
        })
    }

    /// Send a request and return the raw body text.
    pub async fn request_text(&self, method: Method, path: &str) -> ClientResult<String> {
        self.send::<()>(method, path, None).await
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<String>
    where
        B: Serialize + ?Sized,
    {
        if !self.has_token() && !PUBLIC_PATHS.contains(&endpoint_name(path).as_str()) {
            return Err(ClientError::MissingToken);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "Sending request");
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.auth_header.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(network_error)?;
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return Ok(text);
        }

        let message = error_message(status, &text);
        warn!(%method, path, status = status.as_u16(), %message, "Request failed");
        Err(ClientError::http(status.as_u16(), message))
    }
}

fn network_error(err: reqwest::Error) -> ClientError {
    warn!(error = %err, "Network failure");
    ClientError::Network(err.to_string())
}

/// Path without its query string.
fn endpoint_name(path: &str) -> String {
    path.split('?').next().unwrap_or(path).to_string()
}

/// Human-readable message for a failed response.
///
/// Prefers a JSON `message` string, then a JSON `detail` (a string, or the
/// `msg` entries of a validation error list), then the raw body text, and
/// finally `HTTP <code> <reason>`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
        match map.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    )
}

fn build_auth_headers(token: Option<&str>) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            leadpilot_core::ValidationError::invalid(
                "access token",
                "contains characters not allowed in a header",
            )
        })?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let body = r#"{"message":"Campaign name is required.","detail":"ignored"}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "Campaign name is required."
        );
    }

    #[test]
    fn detail_string_and_list() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"detail":"Campaign not found"}"#),
            "Campaign not found"
        );
        let body = r#"{"detail":[{"loc":["body","name"],"msg":"field required"},{"msg":"bad tone"}]}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "field required; bad tone"
        );
    }

    #[test]
    fn falls_back_to_text_then_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream timed out\n"),
            "upstream timed out"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "   "),
            "HTTP 503 Service Unavailable"
        );
    }

    #[test]
    fn endpoint_name_strips_query() {
        assert_eq!(endpoint_name("/api/leads/list?unassigned=true"), "/api/leads/list");
        assert_eq!(endpoint_name("/api/activity"), "/api/activity");
    }

    #[tokio::test]
    async fn requests_without_token_fail_fast() {
        let api = ApiClient::new("http://127.0.0.1:9", None, Duration::from_millis(200))
            .expect("client should build");
        assert!(!api.has_token());
        assert_eq!(api.usage().await, Err(ClientError::MissingToken));
    }

    #[test]
    fn blank_token_is_ignored() {
        let api = ApiClient::new("http://localhost:8000/", Some("  "), Duration::from_secs(1))
            .expect("client should build");
        assert!(!api.has_token());
        assert_eq!(api.base_url(), "http://localhost:8000");
    }
}
