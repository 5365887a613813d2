//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use statpub_core::{
  content::DataQuery,
  release::ReleaseType,
  render::TableBuilder,
};
use statpub_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::api_router;

#[derive(Debug, thiserror::Error)]
#[error("subject {0} is not loaded")]
struct NotLoaded(String);

/// Answers only for subject "1".
struct FakeTables;

impl TableBuilder for FakeTables {
  type Error = NotLoaded;

  async fn query(&self, query: &DataQuery) -> Result<Value, NotLoaded> {
    if query.subject_id == "1" {
      Ok(json!({ "rows": [["2016/17", "4.7"]] }))
    } else {
      Err(NotLoaded(query.subject_id.clone()))
    }
  }
}

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store), Arc::new(FakeTables))
}

async fn send(
  app:    &Router,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Theme → topic → publication; returns the publication id.
async fn publication(app: &Router) -> String {
  let (status, theme) = send(
    app,
    "POST",
    "/themes",
    Some(json!({ "slug": "pupils-and-schools", "title": "Pupils and schools" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, topic) = send(
    app,
    "POST",
    "/topics",
    Some(json!({
      "theme_id": theme["theme_id"],
      "slug": "pupil-absence",
      "title": "Pupil absence",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, publication) = send(
    app,
    "POST",
    "/publications",
    Some(json!({
      "topic_id": topic["topic_id"],
      "slug": "pupil-absence-in-schools-in-england",
      "title": "Pupil absence in schools in England",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{publication}");
  publication["publication_id"].as_str().unwrap().to_owned()
}

fn release_body(publication_id: &str) -> Value {
  json!({
    "publication_id": publication_id,
    "order": 0,
    "release_note": "Check figures with the data team",
    "content": {
      "sections": [{
        "order": 1,
        "heading": "About this release",
        "content": [
          { "type": "data", "order": 2, "query": { "subject_id": "99" } },
          { "type": "markdown", "order": 1, "body": "Overall absence rose." },
          { "type": "data", "order": 3, "query": { "subject_id": "1" } },
        ],
      }],
    },
    "summary": {
      "release_name": "2016/17",
      "slug": "2016-17",
      "summary": "Read national statistical summaries",
      "release_type_id": ReleaseType::NATIONAL_STATISTICS,
      "time_period_coverage": "AY",
    },
  })
}

async fn move_to(app: &Router, release_id: &str, status: &str) -> StatusCode {
  send(
    app,
    "POST",
    &format!("/releases/{release_id}/status"),
    Some(json!({ "status": status })),
  )
  .await
  .0
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn time_periods_lists_codes_and_labels() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/time-periods", None).await;
  assert_eq!(status, StatusCode::OK);
  let rows = body.as_array().unwrap();
  assert!(rows.contains(&json!({ "code": "AY", "label": "Academic Year" })));
  assert!(rows.iter().all(|r| r["code"].as_str().unwrap().len() <= 6));
}

#[tokio::test]
async fn release_types_are_seeded() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/release-types", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 3);
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn error_statuses_follow_store_kinds() {
  let app = app().await;
  publication(&app).await;

  let (status, body) = send(
    &app,
    "POST",
    "/themes",
    Some(json!({ "slug": "pupils-and-schools", "title": "Again" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("pupils-and-schools"));

  let (status, _) = send(
    &app,
    "POST",
    "/themes",
    Some(json!({ "slug": "Not A Slug", "title": "Bad" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send(
    &app,
    "GET",
    &format!("/themes/{}", uuid::Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn referenced_methodology_delete_conflicts() {
  let app = app().await;
  let publication_id = publication(&app).await;

  let (status, methodology) = send(
    &app,
    "POST",
    "/methodologies",
    Some(json!({
      "title": "Pupil absence statistics: methodology",
      "content": { "sections": [] },
      "annexes": { "sections": [] },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{methodology}");
  let methodology_id = methodology["methodology_id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    "PUT",
    &format!("/publications/{publication_id}/methodology"),
    Some(json!({ "methodology_id": methodology_id })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let uri = format!("/methodologies/{methodology_id}");
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  send(
    &app,
    "PUT",
    &format!("/publications/{publication_id}/methodology"),
    Some(json!({ "methodology_id": null })),
  )
  .await;
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() {
  let app = app().await;
  let publication_id = publication(&app).await;

  let mut body = release_body(&publication_id);
  body["summary"]["time_period_coverage"] = json!("XX");
  let (status, error) = send(&app, "POST", "/releases", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error["error"].as_str().unwrap().contains("XX"), "{error}");

  let (_, view) =
    send(&app, "POST", "/releases", Some(release_body(&publication_id))).await;
  let release_id = view["release"]["release_id"].as_str().unwrap();
  let (status, error) = send(
    &app,
    "POST",
    &format!("/releases/{release_id}/status"),
    Some(json!({ "status": "2" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error["error"].is_string());
}

// ─── Release lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn release_is_public_only_once_published() {
  let app = app().await;
  let publication_id = publication(&app).await;

  let (status, view) =
    send(&app, "POST", "/releases", Some(release_body(&publication_id))).await;
  assert_eq!(status, StatusCode::CREATED, "{view}");
  assert_eq!(view["release"]["status"], "Draft");
  let release_id = view["release"]["release_id"].as_str().unwrap().to_owned();
  let summary_id = view["summary"]["summary_id"].as_str().unwrap().to_owned();

  let public_uri =
    "/public/publications/pupil-absence-in-schools-in-england/releases/2016-17";
  let (status, _) = send(&app, "GET", public_uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (_, index) = send(&app, "GET", "/public/themes", None).await;
  assert_eq!(index, json!([]));

  assert_eq!(move_to(&app, &release_id, "Published").await, StatusCode::CONFLICT);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/releases/{release_id}/updates"),
    Some(json!({ "on": "2018-03-22", "reason": "Too early" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  for next in ["HigherLevelReview", "Approved", "Published"] {
    assert_eq!(move_to(&app, &release_id, next).await, StatusCode::OK);
  }

  let (status, version) = send(
    &app,
    "POST",
    &format!("/summaries/{summary_id}/versions"),
    Some(json!({
      "release_name": "2016/17",
      "slug": "2016-17",
      "summary": "Revised national statistical summaries",
      "release_type_id": ReleaseType::NATIONAL_STATISTICS,
      "time_period_coverage": "AY",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{version}");

  let (status, release) = send(&app, "GET", public_uri, None).await;
  assert_eq!(status, StatusCode::OK, "{release}");
  assert_eq!(release["summary"], "Revised national statistical summaries");
  assert_eq!(release["time_period_label"], "Academic Year");
  assert!(release.get("release_note").is_none());

  let blocks = release["content"][0]["content"].as_array().unwrap();
  assert_eq!(blocks[0]["type"], "markdown");
  assert_eq!(blocks[1]["live"]["status"], "unavailable");
  assert_eq!(blocks[2]["live"]["status"], "resolved");
  assert_eq!(blocks[2]["live"]["result"]["rows"][0][1], "4.7");

  let (status, tree) = send(
    &app,
    "GET",
    "/public/publications/pupil-absence-in-schools-in-england",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree["releases"].as_array().unwrap().len(), 1);
  assert!(tree["methodology"].is_null());

  let (status, history) =
    send(&app, "GET", &format!("/summaries/{summary_id}/versions"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn client_cannot_backdate_or_postdate_a_version() {
  let app = app().await;
  let publication_id = publication(&app).await;
  let (_, view) =
    send(&app, "POST", "/releases", Some(release_body(&publication_id))).await;
  let summary_id = view["summary"]["summary_id"].as_str().unwrap().to_owned();
  let uri = format!("/summaries/{summary_id}/versions");

  let version = |summary: &str| {
    json!({
      "release_name": "2016/17",
      "slug": "2016-17",
      "summary": summary,
      "release_type_id": ReleaseType::NATIONAL_STATISTICS,
      "time_period_coverage": "AY",
      "created_at": "2099-01-01T00:00:00Z",
    })
  };

  let (status, forged) = send(&app, "POST", &uri, Some(version("Forged"))).await;
  assert_eq!(status, StatusCode::CREATED, "{forged}");
  assert_ne!(forged["created_at"], "2099-01-01T00:00:00Z");

  send(&app, "POST", &uri, Some(version("Real edit"))).await;
  let (status, latest) =
    send(&app, "GET", &format!("/summaries/{summary_id}/latest"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(latest["summary"], "Real edit");
}

#[tokio::test]
async fn published_release_accepts_updates_and_edits() {
  let app = app().await;
  let publication_id = publication(&app).await;
  let (_, view) =
    send(&app, "POST", "/releases", Some(release_body(&publication_id))).await;
  let release_id = view["release"]["release_id"].as_str().unwrap().to_owned();
  for next in ["HigherLevelReview", "Approved", "Published"] {
    move_to(&app, &release_id, next).await;
  }

  let (status, update) = send(
    &app,
    "POST",
    &format!("/releases/{release_id}/updates"),
    Some(json!({ "on": "2018-04-19", "reason": "Corrected regional figures" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{update}");

  let (status, release) = send(
    &app,
    "PUT",
    &format!("/releases/{release_id}/note"),
    Some(json!({ "note": null })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(release["release_note"].is_null());

  let (status, release) = send(
    &app,
    "PUT",
    &format!("/releases/{release_id}/key-statistics"),
    Some(json!({ "order": 0, "query": { "subject_id": "1" } })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{release}");
  assert_eq!(release["key_statistics"]["query"]["subject_id"], "1");

  let (_, updates) =
    send(&app, "GET", &format!("/releases/{release_id}/updates"), None).await;
  assert_eq!(updates[0]["reason"], "Corrected regional figures");
}
