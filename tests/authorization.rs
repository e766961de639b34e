//! Post Authority Tests
//!
//! Update and delete of a post are allowed for its author and for role
//! holders of the post's subforum; everyone else is turned away before the
//! handler runs.

mod common;

use axum::http::StatusCode;
use common::{app, TestApp};
use serde_json::json;
use uuid::Uuid;

struct Scene {
    author: Uuid,
    moderator: Uuid,
    stranger: Uuid,
    subforum: Uuid,
    post: Uuid,
}

async fn scene(app: &TestApp) -> Scene {
    let author = app.create_user("author").await;
    let moderator = app.create_user("moderator").await;
    let stranger = app.create_user("stranger").await;
    let subforum = app.create_subforum("general", None).await;
    app.grant_role(subforum, moderator).await;
    let post = app.create_post(author, subforum, "Guarded").await;
    Scene {
        author,
        moderator,
        stranger,
        subforum,
        post,
    }
}

fn edit(subforum: Uuid, title: &str) -> serde_json::Value {
    json!({ "subforum_id": subforum, "title": title, "content": "edited" })
}

#[tokio::test]
async fn author_may_update() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app
        .put_json(&format!("/posts/{}", s.post), edit(s.subforum, "By author"), Some(s.author))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["title"].as_str().unwrap(), "By author");
}

#[tokio::test]
async fn moderator_may_update_and_authorship_is_kept() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app
        .put_json(
            &format!("/posts/{}", s.post),
            edit(s.subforum, "By moderator"),
            Some(s.moderator),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["title"].as_str().unwrap(), "By moderator");
    assert_eq!(body["user_id"].as_str().unwrap(), s.author.to_string());
}

#[tokio::test]
async fn stranger_may_not_update() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app
        .put_json(&format!("/posts/{}", s.post), edit(s.subforum, "Vandalised"), Some(s.stranger))
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(
        resp.error_message(),
        "only the author or a subforum moderator may modify this post"
    );

    let post = app.get(&format!("/posts/{}", s.post)).await.json();
    assert_eq!(post["title"].as_str().unwrap(), "Guarded");
}

#[tokio::test]
async fn stranger_may_not_delete() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app.delete(&format!("/posts/{}", s.post), Some(s.stranger)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.get(&format!("/posts/{}", s.post)).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn moderator_may_delete() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app.delete(&format!("/posts/{}", s.post), Some(s.moderator)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = app.get(&format!("/posts/{}", s.post)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moderator_of_another_subforum_is_denied() {
    let app = app().await;
    let s = scene(&app).await;
    let elsewhere = app.create_subforum("elsewhere", None).await;
    let outsider = app.create_user("outsider").await;
    app.grant_role(elsewhere, outsider).await;

    let resp = app.delete(&format!("/posts/{}", s.post), Some(outsider)).await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn revoked_moderator_is_denied() {
    let app = app().await;
    let author = app.create_user("author").await;
    let moderator = app.create_user("moderator").await;
    let subforum = app.create_subforum("general", None).await;
    let role = app.grant_role(subforum, moderator).await;
    let post = app.create_post(author, subforum, "Guarded").await;

    let resp = app
        .delete_admin(
            &format!("/subforums/{}/roles/{}", subforum, role),
            Some(common::TEST_ADMIN_TOKEN),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = app.delete(&format!("/posts/{}", post), Some(moderator)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unresolvable_user_is_bad_request() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app.delete(&format!("/posts/{}", s.post), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "missing x-user-id header");

    let resp = app
        .delete(&format!("/posts/{}", s.post), Some(Uuid::new_v4()))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "unknown user");

    let resp = app
        .request(
            axum::http::Method::DELETE,
            &format!("/posts/{}", s.post),
            None,
            &[("x-user-id", "not-a-uuid".to_string())],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "invalid x-user-id header");
}

#[tokio::test]
async fn missing_post_is_not_found_before_permission() {
    let app = app().await;
    let s = scene(&app).await;

    let resp = app
        .put_json(
            &format!("/posts/{}", Uuid::new_v4()),
            edit(s.subforum, "Ghost"),
            Some(s.stranger),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "post not found");
}

#[tokio::test]
async fn moderators_inherited_from_parent_may_delete() {
    let app = app().await;
    let moderator = app.create_user("moderator").await;
    let author = app.create_user("author").await;
    let parent = app.create_subforum("parent", None).await;
    app.grant_role(parent, moderator).await;
    let child = app.create_subforum("child", Some(parent)).await;
    let post = app.create_post(author, child, "In child").await;

    let resp = app.delete(&format!("/posts/{}", post), Some(moderator)).await;

    assert_eq!(resp.status, StatusCode::NO_CONTENT);
}
