use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    access::executions::{self, RecordExecution},
    models::Identity,
    AppState,
};

#[post("")]
pub async fn record_execution(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    data_json: web::Json<RecordExecution>,
) -> actix_web::Result<impl Responder> {
    let record = executions::record_execution(app_data.repo(), identity.as_deref(), data_json.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::handlers::testing::{bearer, state};

    #[actix_web::test]
    async fn free_tier_only_records_the_free_language() {
        let state = state();
        let app = test_app!(state);
        let req = test::TestRequest::post().uri("/api/v1/users/sync").insert_header(bearer("ada")).to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/executions")
            .insert_header(bearer("ada"))
            .set_json(json!({ "language": "python", "code": "print(1)", "output": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "A pro subscription is required to use this language");

        let req = test::TestRequest::post()
            .uri("/api/v1/executions")
            .insert_header(bearer("ada"))
            .set_json(json!({ "language": "javascript", "code": "console.log(1)", "output": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["userId"], "ada");
        assert_eq!(body["language"], "javascript");
    }

    #[actix_web::test]
    async fn anonymous_callers_cannot_record() {
        let state = state();
        let app = test_app!(state);
        let req = test::TestRequest::post()
            .uri("/api/v1/executions")
            .set_json(json!({ "language": "javascript", "code": "1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
