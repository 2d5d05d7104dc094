mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

async fn create(app: &TestApp, body: &Value) -> Value {
    let response = app.create_project(body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[actix_rt::test]
async fn create_project_takes_ownership_of_media_and_tech_stack() {
    let app = TestApp::spawn().await;
    let logo = app.upload_png("logo.png").await;
    let logo_id = logo["id"].as_str().unwrap();

    let project = create(&app, &project_body("Portfolio", &[logo_id], &["Rust", "Postgres"])).await;

    assert_eq!(project["name"], "Portfolio");
    assert_eq!(project["views"], 0);
    assert_eq!(project["media"].as_array().unwrap().len(), 1);
    assert_eq!(project["media"][0]["projectId"], project["id"]);
    assert_eq!(project["techStack"].as_array().unwrap().len(), 2);

    let media: Value = app.get(&format!("/media/{}", logo_id)).await.json().await.unwrap();
    assert_eq!(media["projectId"], project["id"]);
}

#[actix_rt::test]
async fn create_project_with_unknown_media_creates_nothing() {
    let app = TestApp::spawn().await;
    let missing = uuid::Uuid::new_v4().to_string();

    let response = app.create_project(&project_body("Ghost", &[&missing], &["Rust"])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let projects: Vec<Value> = app.get("/projects").await.json().await.unwrap();
    assert!(projects.is_empty());
    let technologies: Vec<Value> = app.get("/technologies").await.json().await.unwrap();
    assert!(technologies.is_empty());
}

#[actix_rt::test]
async fn create_project_with_invalid_fields_is_rejected() {
    let app = TestApp::spawn().await;

    let mut body = project_body("", &[], &[]);
    body["repositoryLink"] = json!("not a url");

    let response = app.create_project(&body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Validation failed");
}

#[actix_rt::test]
async fn attaching_same_media_twice_is_a_duplicate_association() {
    let app = TestApp::spawn().await;
    let project = create(&app, &project_body("Portfolio", &[], &[])).await;
    let project_id = project["id"].as_str().unwrap();
    let media = app.upload_png("shot.png").await;
    let body = json!({ "mediaId": media["id"] });

    let response = app.admin_post(&format!("/projects/{}/media", project_id), &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let attached: Value = response.json().await.unwrap();
    assert_eq!(attached["media"].as_array().unwrap().len(), 1);

    let response = app.admin_post(&format!("/projects/{}/media", project_id), &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let project: Value = app.get(&format!("/projects/{}", project_id)).await.json().await.unwrap();
    assert_eq!(project["media"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn media_owned_by_another_project_cannot_be_attached() {
    let app = TestApp::spawn().await;
    let media = app.upload_png("shot.png").await;
    let media_id = media["id"].as_str().unwrap();
    create(&app, &project_body("First", &[media_id], &[])).await;
    let second = create(&app, &project_body("Second", &[], &[])).await;

    let response = app
        .admin_post(
            &format!("/projects/{}/media", second["id"].as_str().unwrap()),
            &json!({ "mediaId": media_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.create_project(&project_body("Third", &[media_id], &[])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn technology_is_shared_between_projects() {
    let app = TestApp::spawn().await;
    let first = create(&app, &project_body("First", &[], &["Rust"])).await;
    let second = create(&app, &project_body("Second", &[], &["Rust", "Actix"])).await;

    let rust_id = first["techStack"][0]["id"].clone();
    let second_rust = second["techStack"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Rust")
        .unwrap();
    assert_eq!(second_rust["id"], rust_id);

    let technologies: Vec<Value> = app.get("/technologies").await.json().await.unwrap();
    assert_eq!(technologies.len(), 2);

    let rust: Value = app
        .get(&format!("/technologies/{}", rust_id.as_str().unwrap()))
        .await
        .json()
        .await
        .unwrap();
    let project_ids = rust["projectIds"].as_array().unwrap();
    assert_eq!(project_ids.len(), 2);
    assert!(project_ids.contains(&first["id"]));
    assert!(project_ids.contains(&second["id"]));
}

#[actix_rt::test]
async fn deleting_project_removes_media_and_keeps_technologies() {
    let app = TestApp::spawn().await;
    let cover = app.upload_png("cover.png").await;
    let demo = app.upload("demo.mp4", "video/mp4", vec![7u8; 64]).await;
    assert_eq!(demo.status(), StatusCode::CREATED);
    let demo: Value = demo.json().await.unwrap();

    let doomed = create(
        &app,
        &project_body(
            "Doomed",
            &[cover["id"].as_str().unwrap(), demo["id"].as_str().unwrap()],
            &["Rust"],
        ),
    )
    .await;
    let survivor = create(&app, &project_body("Survivor", &[], &["Rust"])).await;
    let doomed_id = doomed["id"].as_str().unwrap();
    let rust_id = doomed["techStack"][0]["id"].as_str().unwrap().to_string();

    let response = app.admin_delete(&format!("/projects/{}", doomed_id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.storage.delete_count(), 2);
    assert!(!app.storage.contains(&key_of(&cover)));
    assert!(!app.storage.contains(&key_of(&demo)));

    for media in [&cover, &demo] {
        let response = app.get(&format!("/media/{}", media["id"].as_str().unwrap())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app.get(&format!("/projects/{}", doomed_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let rust: Value = app.get(&format!("/technologies/{}", rust_id)).await.json().await.unwrap();
    assert_eq!(rust["projectIds"], json!([survivor["id"]]));
}

#[actix_rt::test]
async fn signed_url_for_media_of_deleted_project_is_not_found() {
    let app = TestApp::spawn().await;
    let media = app.upload_png("cover.png").await;
    let media_id = media["id"].as_str().unwrap();
    let project = create(&app, &project_body("Gone", &[media_id], &[])).await;

    let response = app.admin_delete(&format!("/projects/{}", project["id"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .post(app.url(&format!("/media/{}/signed-url", media_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn detaching_media_deletes_it() {
    let app = TestApp::spawn().await;
    let media = app.upload_png("cover.png").await;
    let media_id = media["id"].as_str().unwrap();
    let project = create(&app, &project_body("Portfolio", &[media_id], &[])).await;
    let project_id = project["id"].as_str().unwrap();

    let response = app.admin_delete(&format!("/projects/{}/media/{}", project_id, media_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert!(updated["media"].as_array().unwrap().is_empty());
    assert!(!app.storage.contains(&key_of(&media)));

    let response = app.get(&format!("/media/{}", media_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.admin_delete(&format!("/projects/{}/media/{}", project_id, media_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn attach_and_detach_technology() {
    let app = TestApp::spawn().await;
    let project = create(&app, &project_body("Portfolio", &[], &[])).await;
    let project_id = project["id"].as_str().unwrap();
    let body = json!({ "name": "Tokio", "iconUrl": "https://icons.example.com/tokio.svg" });

    let response = app.admin_post(&format!("/projects/{}/technologies", project_id), &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["techStack"].as_array().unwrap().len(), 1);
    let tokio_id = updated["techStack"][0]["id"].as_str().unwrap().to_string();

    // Linking again is a no-op
    let response = app.admin_post(&format!("/projects/{}/technologies", project_id), &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["techStack"].as_array().unwrap().len(), 1);

    let response = app
        .admin_delete(&format!("/projects/{}/technologies/{}", project_id, tokio_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert!(updated["techStack"].as_array().unwrap().is_empty());

    let response = app.get(&format!("/technologies/{}", tokio_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn project_detail_counts_views() {
    let app = TestApp::spawn().await;
    let project = create(&app, &project_body("Portfolio", &[], &[])).await;
    let path = format!("/projects/{}", project["id"].as_str().unwrap());

    let first: Value = app.get(&path).await.json().await.unwrap();
    let second: Value = app.get(&path).await.json().await.unwrap();

    assert_eq!(
        second["views"].as_i64().unwrap(),
        first["views"].as_i64().unwrap() + 1
    );
}

#[actix_rt::test]
async fn update_project_clears_link_and_filters_published() {
    let app = TestApp::spawn().await;
    let project = create(&app, &project_body("Portfolio", &[], &[])).await;
    let project_id = project["id"].as_str().unwrap();

    let response = app
        .client
        .patch(app.url(&format!("/projects/{}", project_id)))
        .bearer_auth(app.admin_token())
        .json(&json!({ "repositoryLink": null, "isPublished": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert!(updated["repositoryLink"].is_null());
    assert_eq!(updated["isPublished"], false);
    assert_eq!(updated["name"], "Portfolio");

    let published: Vec<Value> = app.get("/projects?published=true").await.json().await.unwrap();
    assert!(published.is_empty());
    let all: Vec<Value> = app.get("/projects").await.json().await.unwrap();
    assert_eq!(all.len(), 1);
}
