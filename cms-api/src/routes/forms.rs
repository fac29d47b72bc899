/// Form endpoints
///
/// Listing, reading and submitting forms is public. Managing forms and
/// reading submissions requires an `editor` or `admin`.
///
/// # Endpoints
///
/// - `GET /api/forms` - List forms
/// - `POST /api/forms` - Create form
/// - `GET /api/forms/:id` - Get form
/// - `PUT /api/forms/:id` - Update form
/// - `DELETE /api/forms/:id` - Delete form (submissions are kept)
/// - `POST /api/forms/:id/submit` - Submit data to a form
/// - `GET /api/forms/:id/submissions` - List a form's submissions

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use cms_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        form::{CreateForm, Form, Submission, UpdateForm},
        next_id,
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub message: String,
    pub form: Form,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub message: String,
    pub submission_id: String,
}

fn form_not_found() -> ApiError {
    ApiError::NotFound("Form not found".to_string())
}

pub async fn list_forms(State(state): State<AppState>) -> ApiResult<Json<Vec<Form>>> {
    let forms: Vec<Form> = state.store.read_as(Collection::Forms).await?;
    Ok(Json(forms))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Form>> {
    let forms: Vec<Form> = state.store.read_as(Collection::Forms).await?;

    forms
        .into_iter()
        .find(|f| f.id == id)
        .map(Json)
        .ok_or_else(form_not_found)
}

pub async fn create_form(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateForm>,
) -> ApiResult<(StatusCode, Json<FormResponse>)> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let form = state
        .store
        .update(Collection::Forms, |forms: &mut Vec<Form>| {
            let form = Form::new(next_id(forms.iter().map(|f| f.id.as_str())), req);
            forms.push(form.clone());
            Ok::<_, ApiError>(form)
        })
        .await?;

    info!(form_id = %form.id, name = %form.name, fields = form.fields.len(), "Form created");

    Ok((
        StatusCode::CREATED,
        Json(FormResponse {
            message: "Form created successfully".to_string(),
            form,
        }),
    ))
}

pub async fn update_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateForm>,
) -> ApiResult<Json<FormResponse>> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let form = state
        .store
        .update(Collection::Forms, |forms: &mut Vec<Form>| {
            let form = forms.iter_mut().find(|f| f.id == id).ok_or_else(form_not_found)?;
            form.apply(req);
            Ok::<_, ApiError>(form.clone())
        })
        .await?;

    info!(form_id = %form.id, "Form updated");

    Ok(Json(FormResponse {
        message: "Form updated successfully".to_string(),
        form,
    }))
}

pub async fn delete_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Editor)?;

    state
        .store
        .update(Collection::Forms, |forms: &mut Vec<Form>| {
            let before = forms.len();
            forms.retain(|f| f.id != id);

            if forms.len() == before {
                return Err(form_not_found());
            }
            Ok(())
        })
        .await?;

    info!(form_id = %id, "Form deleted");

    Ok(MessageResponse::new("Form deleted successfully"))
}

/// Submits data to a form
///
/// Required fields must be present and non-blank. The submission is stored
/// first, then the form's counter is incremented; the two collection locks
/// are taken one after the other, never nested.
///
/// # Errors
///
/// - `400 Bad Request`: Form disabled or a required field missing
/// - `404 Not Found`: No such form
pub async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ApiJson(data): ApiJson<Map<String, Value>>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let forms: Vec<Form> = state.store.read_as(Collection::Forms).await?;
    let form = forms.iter().find(|f| f.id == id).ok_or_else(form_not_found)?;

    form.check_submission(&data)?;

    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let submission_id = state
        .store
        .update(Collection::Submissions, |submissions: &mut Vec<Submission>| {
            let submission_id = next_id(submissions.iter().map(|s| s.id.as_str()));
            submissions.push(Submission::new(submission_id.clone(), id.clone(), data, ip));
            Ok::<_, ApiError>(submission_id)
        })
        .await?;

    // A form deleted in between keeps the submission but has no counter
    state
        .store
        .update(Collection::Forms, |forms: &mut Vec<Form>| {
            if let Some(form) = forms.iter_mut().find(|f| f.id == id) {
                form.submissions += 1;
            }
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(form_id = %id, submission_id = %submission_id, "Form submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Form submitted successfully".to_string(),
            submission_id,
        }),
    ))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Submission>>> {
    require_role(&auth, Role::Editor)?;

    let forms: Vec<Form> = state.store.read_as(Collection::Forms).await?;
    if !forms.iter().any(|f| f.id == id) {
        return Err(form_not_found());
    }

    let submissions: Vec<Submission> = state.store.read_as(Collection::Submissions).await?;
    let submissions: Vec<Submission> = submissions
        .into_iter()
        .filter(|s| s.form_id == id)
        .collect();

    debug!(form_id = %id, count = submissions.len(), "Listing submissions");
    Ok(Json(submissions))
}

/// Client address, preferring the first `X-Forwarded-For` entry
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)).as_deref(), Some("127.0.0.1"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
