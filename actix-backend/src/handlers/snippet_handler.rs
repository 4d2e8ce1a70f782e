use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    access::snippets::{self, CreateSnippet},
    models::Identity,
    presentation::SnippetFilter,
    AppState,
};

// _______________________________________ Snippets _______________________________________

#[get("")]
pub async fn list_snippets(
    app_data: web::Data<AppState>,
    params: web::Query<SnippetFilter>,
) -> actix_web::Result<impl Responder> {
    let list = snippets::list_snippets(app_data.repo(), &params).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[post("")]
pub async fn create_snippet(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    data_json: web::Json<CreateSnippet>,
) -> actix_web::Result<impl Responder> {
    let snippet = snippets::create_snippet(app_data.repo(), identity.as_deref(), data_json.into_inner()).await?;
    Ok(HttpResponse::Created().json(snippet))
}

#[get("/starred")]
pub async fn starred_snippets(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
) -> actix_web::Result<impl Responder> {
    let starred = snippets::starred_snippets(app_data.repo(), identity.as_deref()).await?;
    Ok(HttpResponse::Ok().json(starred))
}

#[get("/{snippetId}")]
pub async fn get_snippet(app_data: web::Data<AppState>, path: web::Path<Uuid>) -> actix_web::Result<impl Responder> {
    let snippet = snippets::get_snippet(app_data.repo(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(snippet))
}

#[delete("/{snippetId}")]
pub async fn delete_snippet(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    snippets::delete_snippet(app_data.repo(), identity.as_deref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

// _______________________________________ Stars _______________________________________

#[post("/{snippetId}/star")]
pub async fn toggle_star(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let starred = snippets::toggle_star(app_data.repo(), identity.as_deref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "starred": starred })))
}

#[get("/{snippetId}/stars")]
pub async fn star_summary(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let snippet_id = path.into_inner();
    let count = snippets::star_count(app_data.repo(), snippet_id).await?;
    let starred = snippets::is_starred(app_data.repo(), identity.as_deref(), snippet_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "count": count, "starred": starred })))
}

// _______________________________________ Comments _______________________________________

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

#[get("/{snippetId}/comments")]
pub async fn get_comments(app_data: web::Data<AppState>, path: web::Path<Uuid>) -> actix_web::Result<impl Responder> {
    let comments = snippets::get_comments(app_data.repo(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[post("/{snippetId}/comments")]
pub async fn add_comment(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    path: web::Path<Uuid>,
    data_json: web::Json<AddCommentRequest>,
) -> actix_web::Result<impl Responder> {
    let comment = snippets::add_comment(
        app_data.repo(),
        identity.as_deref(),
        path.into_inner(),
        data_json.into_inner().content,
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[delete("/{commentId}")]
pub async fn delete_comment(
    app_data: web::Data<AppState>,
    identity: Option<web::ReqData<Identity>>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    snippets::delete_comment(app_data.repo(), identity.as_deref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::handlers::testing::{bearer, state};

    #[actix_web::test]
    async fn share_star_comment_and_delete() {
        let state = state();
        let app = test_app!(state);
        for user in ["ada", "bob"] {
            let req = test::TestRequest::post().uri("/api/v1/users/sync").insert_header(bearer(user)).to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/snippets")
            .insert_header(bearer("ada"))
            .set_json(json!({ "title": "Fizzbuzz", "language": "python", "code": "print('fizz')" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let snippet: Value = test::read_body_json(resp).await;
        assert_eq!(snippet["userName"], "ada name");
        let id = snippet["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/snippets/{id}/star"))
            .insert_header(bearer("bob"))
            .to_request();
        let toggled: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(toggled["starred"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/snippets/{id}/stars"))
            .insert_header(bearer("bob"))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary, json!({ "count": 1, "starred": true }));

        let req = test::TestRequest::get().uri(&format!("/api/v1/snippets/{id}/stars")).to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["starred"], false);

        let req = test::TestRequest::get().uri("/api/v1/snippets/starred").insert_header(bearer("bob")).to_request();
        let starred: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(starred.as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/snippets/{id}/comments"))
            .insert_header(bearer("bob"))
            .set_json(json!({ "content": "Shorter:\n```python\nprint('buzz')\n```" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri(&format!("/api/v1/snippets/{id}/comments")).to_request();
        let comments: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(comments[0]["userName"], "bob name");
        assert_eq!(comments[0]["segments"][1]["kind"], "code");
        assert_eq!(comments[0]["segments"][1]["language"], "python");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/snippets/{id}"))
            .insert_header(bearer("bob"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/snippets/{id}"))
            .insert_header(bearer("ada"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/api/v1/snippets/{id}")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = test::TestRequest::get().uri(&format!("/api/v1/snippets/{id}/comments")).to_request();
        let comments: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(comments, json!([]));
    }

    #[actix_web::test]
    async fn listing_is_public_and_filtered() {
        let state = state();
        let app = test_app!(state);
        let req = test::TestRequest::post().uri("/api/v1/users/sync").insert_header(bearer("ada")).to_request();
        test::call_service(&app, req).await;

        for (title, language) in [("Quicksort", "rust"), ("Hello", "go"), ("Mergesort", "go")] {
            let req = test::TestRequest::post()
                .uri("/api/v1/snippets")
                .insert_header(bearer("ada"))
                .set_json(json!({ "title": title, "language": language, "code": "" }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/api/v1/snippets?search=sort&language=go").to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list["snippets"].as_array().map(Vec::len), Some(1));
        assert_eq!(list["snippets"][0]["title"], "Mergesort");
        assert_eq!(list["languages"].as_array().map(Vec::len), Some(2));
        assert_eq!(list["popularLanguages"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn validation_and_missing_targets() {
        let state = state();
        let app = test_app!(state);
        let req = test::TestRequest::post().uri("/api/v1/users/sync").insert_header(bearer("ada")).to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/snippets")
            .insert_header(bearer("ada"))
            .set_json(json!({ "title": "x", "language": "brainfuck", "code": "+" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::new_v4();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/snippets/{missing}/star"))
            .insert_header(bearer("ada"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/comments/{missing}"))
            .insert_header(bearer("ada"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri(&format!("/api/v1/snippets/{missing}/star")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
