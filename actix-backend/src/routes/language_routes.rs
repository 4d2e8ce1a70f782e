use actix_web::web;

use crate::handlers::language_handler;

pub fn config(config: &mut web::ServiceConfig) {
    config.service(web::scope("/v1/languages").service(language_handler::list_languages));
}
