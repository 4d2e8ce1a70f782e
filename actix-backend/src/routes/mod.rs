pub mod execution_routes;
pub mod language_routes;
pub mod snippet_routes;
pub mod user_routes;

use actix_web::web;

use crate::{middleware::jwt_middleware::Authenticate, AppState};

/// Everything served under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig, app_data: web::Data<AppState>) {
    let authenticate = Authenticate::new(app_data);

    user_routes::config(cfg, authenticate.clone());
    execution_routes::config(cfg, authenticate.clone());
    snippet_routes::config(cfg, authenticate);
    language_routes::config(cfg);
}
