// tests/optik_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn sheet_count_is_clamped() {
    let app = spawn_app().await;

    let cases = [("?count=5", 5), ("?count=0", 1), ("", 20), ("?count=999", 200), ("?count=abc", 1)];
    for (query, expected) in cases {
        let sheet: Value = app
            .client
            .get(app.url(&format!("/api/optik/sheet{}", query)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(sheet["question_count"], expected, "query {query:?}");
        assert_eq!(sheet["rows"].as_array().unwrap().len(), expected as usize);
        assert_eq!(sheet["completion_ratio"], 0.0);
    }
}

#[tokio::test]
async fn sheet_rows_carry_four_options() {
    let app = spawn_app().await;

    let sheet: Value = app
        .client
        .get(app.url("/api/optik/sheet?count=2&test=Deneme&cat=Fen"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(sheet["rows"][1]["number"], 2);
    assert_eq!(sheet["rows"][1]["options"], json!(["A", "B", "C", "D"]));
    assert_eq!(sheet["context"]["test"], "Deneme");
}

#[tokio::test]
async fn state_parameters_win_over_query() {
    let app = spawn_app().await;

    let sheet: Value = app
        .client
        .post(app.url("/api/optik/sheet?count=3&test=Eski"))
        .json(&json!({ "state": { "count": "7", "test": "" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(sheet["question_count"], 7);
    // Blank state values fall back to the query string.
    assert_eq!(sheet["context"]["test"], "Eski");
}

#[tokio::test]
async fn submit_requires_a_session() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/optik/submit"))
        .json(&json!({ "query": { "id": "1" }, "answers": { "1": "A" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn full_submission_flow() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (email, student) = app.student(&admin, "ömer", "faruk").await;
    let test_id = app.create_test(&admin, "Matematik", 7, "Kesirler", 3, "ABD").await;

    let response = app
        .client
        .post(app.url("/api/optik/submit"))
        .bearer_auth(&student)
        .json(&json!({
            "query": { "id": test_id.to_string(), "count": "3" },
            "answers": { "1": "B", "3": "d" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["status"], "ok");
    let record = &receipt["record"];
    assert_eq!(record["type"], "submission");
    assert_eq!(record["answers"], "B-D");
    assert_eq!(record["answersArray"], json!(["B", "-", "D"]));
    assert_eq!(record["answersMap"], json!({ "1": "B", "3": "D" }));
    assert_eq!(record["answeredCount"], 2);
    assert_eq!(record["count"], 3);
    assert_eq!(record["studentKey"], "omer_faruk");
    assert_eq!(record["user"]["email"], email);
    assert_eq!(record["user"]["name"], "Ömer Faruk");
    assert_eq!(record["test"]["category"], "Matematik");
    assert_eq!(record["test"]["grade"], 7);

    // Same test again is rejected.
    let again = app
        .client
        .post(app.url("/api/optik/submit"))
        .bearer_auth(&student)
        .json(&json!({ "query": { "id": test_id.to_string() }, "answers": { "2": "A" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 409);

    let dashboard: Value = app
        .client
        .get(app.url("/api/dashboard"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["profile"]["student_key"], "omer_faruk");
    let grade_seven = dashboard["grades"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["grade"] == 7)
        .unwrap();
    assert_eq!(grade_seven["tests"][0]["items"][0]["solved"], true);

    let solved: Vec<Value> = app
        .client
        .get(app.url("/api/dashboard/solved"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(solved.len(), 1);
    assert_eq!(solved[0]["test_id"], test_id);

    let submissions: Vec<Value> = app
        .client
        .get(app.url("/api/dashboard/submissions"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["answers"], "B-D");
}

#[tokio::test]
async fn precomputed_student_key_is_normalized() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, student) = app.student(&admin, "Zeynep", "Yıldız").await;
    let test_id = app.create_test(&admin, "Türkçe", 5, "Sözcük", 2, "AB").await;

    let receipt: Value = app
        .client
        .post(app.url("/api/optik/submit"))
        .bearer_auth(&student)
        .json(&json!({
            "query": { "id": test_id.to_string(), "student": "ZEYNEP_Y" },
            "answers": {},
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(receipt["record"]["studentKey"], "zeynep_y");
    assert_eq!(receipt["record"]["answers"], "--");
    assert_eq!(receipt["record"]["answeredCount"], 0);
}

#[tokio::test]
async fn submit_rejects_bad_input() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, student) = app.student(&admin, "Ali", "Can").await;
    let test_id = app.create_test(&admin, "Fen", 8, "Kuvvet", 4, "ABCD").await;

    let submit = |body: Value| {
        let request = app
            .client
            .post(app.url("/api/optik/submit"))
            .bearer_auth(&student)
            .json(&body);
        async move { request.send().await.unwrap().status().as_u16() }
    };

    // Count disagrees with the stored test.
    let mismatch = json!({ "query": { "id": test_id.to_string(), "count": "10" }, "answers": {} });
    assert_eq!(submit(mismatch).await, 400);

    // Question out of range.
    let out_of_range = json!({ "query": { "id": test_id.to_string() }, "answers": { "5": "A" } });
    assert_eq!(submit(out_of_range).await, 400);

    // Unknown letter.
    let bad_letter = json!({ "query": { "id": test_id.to_string() }, "answers": { "1": "E" } });
    assert_eq!(submit(bad_letter).await, 400);

    // Missing and unknown test ids.
    assert_eq!(submit(json!({ "answers": {} })).await, 400);
    assert_eq!(submit(json!({ "query": { "id": "9999" }, "answers": {} })).await, 404);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn numeric_sheet_parameters_are_accepted() {
    let app = spawn_app().await;

    let sheet: Value = app
        .client
        .post(app.url("/api/optik/sheet?count=3"))
        .json(&json!({ "state": { "count": 7, "grade": 6 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sheet["question_count"], 7);
    assert_eq!(sheet["context"]["grade"], "6");

    let admin = app.admin_token().await;
    let (_, student) = app.student(&admin, "Elif", "Şahin").await;
    let test_id = app.create_test(&admin, "Sosyal", 6, "Harita", 2, "CD").await;

    let response = app
        .client
        .post(app.url("/api/optik/submit"))
        .bearer_auth(&student)
        .json(&json!({
            "query": { "id": test_id, "count": 2, "grade": 6 },
            "answers": { "2": "D" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["record"]["test"]["id"], test_id);
    assert_eq!(receipt["record"]["answers"], "-D");
}
