#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().app_data($state.clone()).service(
                actix_web::web::scope("/api").configure(|cfg| crate::routes::configure(cfg, $state.clone())),
            ),
        )
        .await
    };
}

pub mod execution_handler;
pub mod language_handler;
pub mod snippet_handler;
pub mod user_handler;
