use actix_web::web;

use crate::{handlers::execution_handler, middleware::jwt_middleware::Authenticate};

pub fn config(config: &mut web::ServiceConfig, authenticate: Authenticate) {
    config.service(
        web::scope("/v1/executions")
            .service(execution_handler::record_execution)
            .wrap(authenticate),
    );
}
