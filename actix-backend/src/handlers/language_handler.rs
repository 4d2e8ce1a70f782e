use actix_web::{get, HttpResponse, Responder};

use crate::languages::{LANGUAGES, THEMES};

#[get("")]
pub async fn list_languages() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "languages": LANGUAGES, "themes": THEMES }))
}
