use actix_web::web;

use crate::{handlers::user_handler, middleware::jwt_middleware::Authenticate};

pub fn config(config: &mut web::ServiceConfig, authenticate: Authenticate) {
    // Billing callback first, it must not reach the identity middleware.
    config.service(user_handler::upgrade_to_pro).service(
        web::scope("/v1/users")
            .service(user_handler::sync_user)
            .service(user_handler::list_executions)
            .service(user_handler::get_user_stats)
            .service(user_handler::get_user)
            .wrap(authenticate),
    );
}
