use actix_web::web;

use crate::{handlers::snippet_handler, middleware::jwt_middleware::Authenticate};

pub fn config(config: &mut web::ServiceConfig, authenticate: Authenticate) {
    config
        .service(
            web::scope("/v1/snippets")
                .service(snippet_handler::list_snippets)
                .service(snippet_handler::create_snippet)
                // before "/{snippetId}"
                .service(snippet_handler::starred_snippets)
                .service(snippet_handler::get_snippet)
                .service(snippet_handler::delete_snippet)
                .service(snippet_handler::toggle_star)
                .service(snippet_handler::star_summary)
                .service(snippet_handler::get_comments)
                .service(snippet_handler::add_comment)
                .wrap(authenticate.clone()),
        )
        .service(
            web::scope("/v1/comments")
                .service(snippet_handler::delete_comment)
                .wrap(authenticate),
        );
}
