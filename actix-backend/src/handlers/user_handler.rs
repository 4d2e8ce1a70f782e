use actix_web::{error::ErrorUnauthorized, get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::{
    access::{executions, stats, users},
    middleware::jwt_middleware::bearer_token,
    models::Identity,
    AppState,
};

// _______________________________________ Profile _______________________________________

#[post("/sync")]
pub async fn sync_user(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
) -> actix_web::Result<impl Responder> {
    let user = users::sync_user(app_data.repo(), identity.as_deref()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/{userId}")]
pub async fn get_user(app_data: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let user = users::get_user(app_data.repo(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Called by the billing provider once a subscription is paid. Registered
/// outside the identity middleware since the bearer here is the billing secret.
#[post("/v1/users/{userId}/pro")]
pub async fn upgrade_to_pro(
    app_data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let Some(secret) = app_data.billing_secret.as_deref() else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({ "error": "Billing is not configured" })));
    };
    if !bearer_token(req.headers()).is_some_and(|token| secrets_match(token, secret)) {
        log::warn!("rejected pro upgrade for {} with a bad billing secret", path.as_str());
        return Err(ErrorUnauthorized("Invalid billing secret"));
    }

    let user = users::upgrade_to_pro(app_data.repo(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Compares without stopping at the first differing byte.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    given.len() == expected.len() && given.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

// _______________________________________ Activity _______________________________________

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[get("/{userId}/executions")]
pub async fn list_executions(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<HistoryParams>,
) -> actix_web::Result<impl Responder> {
    let HistoryParams { cursor, limit } = params.into_inner();
    let page = executions::list_executions(app_data.repo(), &path.into_inner(), cursor.as_deref(), limit).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/{userId}/stats")]
pub async fn get_user_stats(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let stats = stats::get_user_stats(app_data.repo(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
