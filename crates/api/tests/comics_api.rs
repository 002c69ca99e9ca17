//! Comics, panels and progressions against a real database.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, FakeImages, Fakes, ScriptedText};
use serde_json::json;
use sqlx::PgPool;

async fn create_comic(pool: &PgPool, prompt: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/comics", json!({ "initial_prompt": prompt })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comic_title_defaults_to_prompt_prefix(pool: PgPool) {
    let prompt = "Goddess Durga riding her lion into battle against the demon Mahishasura";
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/comics", json!({ "initial_prompt": prompt })).await;

    let data = body_json(response).await["data"].clone();
    let title = data["title"].as_str().unwrap();
    assert!(title.ends_with("..."));
    assert!(prompt.starts_with(title.trim_end_matches("...")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generated_panels_take_consecutive_sequence_numbers(pool: PgPool) {
    let id = create_comic(&pool, "Hanuman leaping across the ocean").await;
    let fakes = Fakes::with_images(FakeImages::new(0));

    for expected in 1..=2 {
        let app = common::build_test_app_with(pool.clone(), &fakes);
        let response = post_json(
            app,
            &format!("/api/v1/comics/{id}/panels/next"),
            json!({ "prompt": "Hanuman lands on the shore of Lanka" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let panel = body_json(response).await["data"].clone();
        assert_eq!(panel["sequence_number"], expected);
        assert_eq!(
            panel["image_url"],
            format!("https://blobs.test/comics/{id}/panel-{expected}.png").as_str()
        );
    }

    let app = common::build_test_app(pool);
    let comic = body_json(get(app, &format!("/api/v1/comics/{id}")).await).await;
    let sequence: Vec<i64> = comic["data"]["panels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sequence_number"].as_i64().unwrap())
        .collect();
    assert_eq!(sequence, vec![1, 2]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progression_is_generated_and_stored(pool: PgPool) {
    let id = create_comic(&pool, "Krishna revealing his cosmic form").await;
    let fakes = Fakes::with_text(ScriptedText::answers(&[
        r#"["Arjuna kneels in awe", "  ", "The conch sounds across the field"]"#,
    ]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json(
        app,
        &format!("/api/v1/comics/{id}/progression"),
        json!({ "count": 3 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["source_prompt"], "Krishna revealing his cosmic form");
    assert_eq!(
        data["generated_prompts"],
        json!(["Arjuna kneels in awe", "The conch sounds across the field"])
    );

    let app = common::build_test_app(pool);
    let listed = body_json(get(app, &format!("/api/v1/comics/{id}/progression")).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn panel_for_unknown_comic_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/panels",
        json!({
            "comic_id": 424242,
            "prompt": "A lonely panel",
            "image_url": "https://cdn.test/p.png",
            "sequence_number": 1
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Comic with id 424242 not found"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn random_panel_is_null_until_panels_exist(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let empty = body_json(get(app, "/api/v1/panels/random").await).await;
    assert!(empty["data"]["image_url"].is_null());

    let id = create_comic(&pool, "Hanuman leaping across the ocean").await;
    let app = common::build_test_app(pool.clone());
    let created = post_json(
        app,
        "/api/v1/panels",
        json!({
            "comic_id": id,
            "prompt": "Hanuman mid-leap",
            "image_url": "https://cdn.test/leap.png",
            "sequence_number": 1
        }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let random = body_json(get(app, "/api/v1/panels/random").await).await;
    assert_eq!(random["data"]["image_url"], "https://cdn.test/leap.png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_next_panels_get_distinct_numbers_and_images(pool: PgPool) {
    let id = create_comic(&pool, "Hanuman leaping across the ocean").await;
    let fakes = Fakes::with_images(FakeImages::new(0));
    let uri = format!("/api/v1/comics/{id}/panels/next");

    let (first, second) = tokio::join!(
        post_json(
            common::build_test_app_with(pool.clone(), &fakes),
            &uri,
            json!({ "prompt": "Hanuman grows to the size of a mountain" }),
        ),
        post_json(
            common::build_test_app_with(pool.clone(), &fakes),
            &uri,
            json!({ "prompt": "Hanuman springs from the cliff" }),
        ),
    );
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);

    let mut panels = vec![
        body_json(first).await["data"].clone(),
        body_json(second).await["data"].clone(),
    ];
    panels.sort_by_key(|p| p["sequence_number"].as_i64().unwrap());
    for (panel, expected) in panels.iter().zip(1..) {
        assert_eq!(panel["sequence_number"], expected);
        assert_eq!(
            panel["image_url"],
            format!("https://blobs.test/comics/{id}/panel-{expected}.png").as_str()
        );
    }

    let mut keys = fakes.blobs.keys.lock().unwrap().clone();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            format!("comics/{id}/panel-1.png"),
            format!("comics/{id}/panel-2.png"),
        ]
    );
    assert_eq!(fakes.images.calls(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_panel_image_releases_its_sequence_number(pool: PgPool) {
    let id = create_comic(&pool, "Durga riding her lion").await;
    let uri = format!("/api/v1/comics/{id}/panels/next");

    let failing = Fakes::with_images(FakeImages::new(3));
    let response = post_json(
        common::build_test_app_with(pool.clone(), &failing),
        &uri,
        json!({ "prompt": "The lion roars" }),
    )
    .await;
    assert!(!response.status().is_success());

    let app = common::build_test_app(pool.clone());
    let comic = body_json(get(app, &format!("/api/v1/comics/{id}")).await).await;
    assert_eq!(comic["data"]["panels"], json!([]));

    let working = Fakes::with_images(FakeImages::new(0));
    let response = post_json(
        common::build_test_app_with(pool, &working),
        &uri,
        json!({ "prompt": "The lion roars" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["sequence_number"], 1);
}
