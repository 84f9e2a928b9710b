//! Code sign-in endpoints.

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{Contact, ContactKind};
use crate::domains::account::AccountSummary;
use crate::domains::auth::actions::{issue_code, verify_code, IssuedCode, VerifiedAccount};
use crate::domains::auth::AuthError;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::ClientIp;

#[derive(Deserialize)]
pub struct IssueCodeRequest {
    contact: String,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    contact: String,
    code: String,
}

#[derive(Deserialize)]
pub struct EmailCodeRequest {
    email: String,
}

#[derive(Deserialize)]
pub struct SmsCodeRequest {
    phone: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    email: String,
    code: String,
}

#[derive(Deserialize)]
pub struct VerifySmsRequest {
    phone: String,
    code: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IssueCodeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: String,
    pub account: AccountSummary,
    pub token: String,
}

#[derive(Serialize, Debug)]
pub struct ProviderAvailability {
    pub email: bool,
    pub sms: bool,
}

#[derive(Serialize, Debug)]
pub struct ProvidersResponse {
    pub providers: ProviderAvailability,
    pub status: &'static str,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text(), None))
}

fn issued(result: IssuedCode) -> Json<IssueCodeResponse> {
    let destination = match result.contact.kind() {
        ContactKind::Email => "email",
        ContactKind::Phone => "phone",
    };
    Json(IssueCodeResponse {
        success: true,
        message: format!("Verification code sent to your {}", destination),
        dev_code: result.dev_code,
    })
}

fn verified(kind: ContactKind, result: VerifiedAccount) -> Json<VerifyCodeResponse> {
    let what = match kind {
        ContactKind::Email => "Email",
        ContactKind::Phone => "Phone",
    };
    Json(VerifyCodeResponse {
        success: true,
        message: format!("{} verified successfully", what),
        account: result.account,
        token: result.token,
    })
}

fn log_request(endpoint: &str, client_ip: Option<Extension<ClientIp>>) {
    match client_ip {
        Some(Extension(ClientIp(ip))) => info!(endpoint, client_ip = %ip, "Code request"),
        None => info!(endpoint, "Code request"),
    }
}

/// POST /issue-code
pub async fn issue_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<IssueCodeRequest>, JsonRejection>,
) -> Result<Json<IssueCodeResponse>, ApiError> {
    log_request("issue-code", client_ip);
    let request = body(payload)?;
    let contact = Contact::parse(&request.contact).map_err(AuthError::from)?;
    Ok(issued(issue_code(contact, &state.deps).await?))
}

/// POST /verify-code
pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    log_request("verify-code", client_ip);
    let request = body(payload)?;
    let contact = Contact::parse(&request.contact).map_err(AuthError::from)?;
    let kind = contact.kind();
    Ok(verified(kind, verify_code(contact, &request.code, &state.deps).await?))
}

/// POST /auth/send-email-code
pub async fn send_email_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<EmailCodeRequest>, JsonRejection>,
) -> Result<Json<IssueCodeResponse>, ApiError> {
    log_request("send-email-code", client_ip);
    let request = body(payload)?;
    let on_err = |e| ApiError::from_auth(e, "email");
    let contact = Contact::parse_email(&request.email)
        .map_err(AuthError::from)
        .map_err(on_err)?;
    Ok(issued(issue_code(contact, &state.deps).await.map_err(on_err)?))
}

/// POST /auth/send-sms-code
pub async fn send_sms_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<SmsCodeRequest>, JsonRejection>,
) -> Result<Json<IssueCodeResponse>, ApiError> {
    log_request("send-sms-code", client_ip);
    let request = body(payload)?;
    let on_err = |e| ApiError::from_auth(e, "phone");
    let contact = Contact::parse_phone(&request.phone)
        .map_err(AuthError::from)
        .map_err(on_err)?;
    Ok(issued(issue_code(contact, &state.deps).await.map_err(on_err)?))
}

/// POST /auth/verify-email-code
pub async fn verify_email_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    log_request("verify-email-code", client_ip);
    let request = body(payload)?;
    let on_err = |e| ApiError::from_auth(e, "email");
    let contact = Contact::parse_email(&request.email)
        .map_err(AuthError::from)
        .map_err(on_err)?;
    let result = verify_code(contact, &request.code, &state.deps)
        .await
        .map_err(on_err)?;
    Ok(verified(ContactKind::Email, result))
}

/// POST /auth/verify-sms-code
pub async fn verify_sms_code_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<VerifySmsRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    log_request("verify-sms-code", client_ip);
    let request = body(payload)?;
    let on_err = |e| ApiError::from_auth(e, "phone");
    let contact = Contact::parse_phone(&request.phone)
        .map_err(AuthError::from)
        .map_err(on_err)?;
    let result = verify_code(contact, &request.code, &state.deps)
        .await
        .map_err(on_err)?;
    Ok(verified(ContactKind::Phone, result))
}

/// GET /auth/providers
pub async fn providers_handler(Extension(state): Extension<AppState>) -> Json<ProvidersResponse> {
    let settings = &state.deps.settings;
    Json(ProvidersResponse {
        providers: ProviderAvailability {
            email: settings.channel_enabled(ContactKind::Email),
            sms: settings.channel_enabled(ContactKind::Phone),
        },
        status: "ok",
    })
}
