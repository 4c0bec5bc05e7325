mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_bill_computes_subtotal_and_balance() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/bills",
            &json!({
                "customer_name": "Asha",
                "phone": "999",
                "garment_type": "blouse",
                "quantity": 2,
                "rate": 500.0,
                "advance": 200.0,
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let bill: Value = response.json().await.expect("Bill response was not JSON");

    assert_eq!(bill["subtotal"], 1000.0);
    assert_eq!(bill["balance"], 800.0);
    assert_eq!(bill["status"], "pending");
    assert!(bill["bill_no"].as_str().unwrap().starts_with("ST"));
    assert!(bill["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_bill_rejects_missing_fields() {
    let app = TestApp::spawn().await;

    let response = app.post("/bills", &json!({ "phone": "999" })).await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Error response was not JSON");
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_bill_spawns_job_at_cutting() {
    let app = TestApp::spawn().await;

    let bill = app.create_bill("Asha", "999", 2, 500.0).await;
    let bill_id = bill["id"].as_str().unwrap();

    let body: Value = app.get("/workflow").await.json().await.unwrap();
    let jobs = body["workflows"].as_array().unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["bill_id"], bill_id);
    assert_eq!(jobs[0]["stage"], "cutting");
    assert_eq!(jobs[0]["customer_name"], "Asha");
    // Joined bill data rides along.
    assert_eq!(jobs[0]["bill"]["customer_name"], "Asha");
}

#[tokio::test]
async fn test_get_bill_round_trips() {
    let app = TestApp::spawn().await;

    let created = app.create_bill("Asha", "999", 1, 750.0).await;
    let id = created["id"].as_str().unwrap();

    let response = app.get(&format!("/bills/{}", id)).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let bill: Value = response.json().await.unwrap();
    assert_eq!(bill["id"], *id);
    assert_eq!(bill["subtotal"], 750.0);
}

#[tokio::test]
async fn test_get_unknown_bill_returns_404_envelope() {
    let app = TestApp::spawn().await;

    let response = app.get("/bills/no-such-id").await;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Bill not found");
}

#[tokio::test]
async fn test_update_recomputes_totals_from_merged_values() {
    let app = TestApp::spawn().await;

    let bill = app
        .post(
            "/bills",
            &json!({
                "customer_name": "Asha",
                "phone": "999",
                "garment_type": "blouse",
                "quantity": 2,
                "rate": 500.0,
                "advance": 200.0,
            }),
        )
        .await
        .json::<Value>()
        .await
        .unwrap();
    let id = bill["id"].as_str().unwrap();

    // Changing the rate recomputes both derived fields.
    let response = app.put(&format!("/bills/{}", id), &json!({ "rate": 600.0 })).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["subtotal"], 1200.0);
    assert_eq!(updated["balance"], 1000.0);

    // Changing only the advance keeps quantity and rate from the store.
    let updated: Value = app
        .put(&format!("/bills/{}", id), &json!({ "advance": 100.0 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["subtotal"], 1200.0);
    assert_eq!(updated["balance"], 1100.0);
}

#[tokio::test]
async fn test_update_without_pricing_keeps_totals() {
    let app = TestApp::spawn().await;

    let bill = app.create_bill("Asha", "999", 2, 500.0).await;
    let id = bill["id"].as_str().unwrap();

    let updated: Value = app
        .put(&format!("/bills/{}", id), &json!({ "tailor_notes": "hem shorter" }))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(updated["tailor_notes"], "hem shorter");
    assert_eq!(updated["subtotal"], 1000.0);
    assert_eq!(updated["balance"], 1000.0);
}

#[tokio::test]
async fn test_update_unknown_bill_returns_404() {
    let app = TestApp::spawn().await;

    let response = app
        .put("/bills/no-such-id", &json!({ "tailor_notes": "x" }))
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_bill_cascades_to_all_its_jobs() {
    let app = TestApp::spawn().await;

    let doomed = app.create_bill("Asha", "999", 1, 100.0).await;
    let doomed_id = doomed["id"].as_str().unwrap();
    let kept = app.create_bill("Ravi", "888", 1, 100.0).await;
    let kept_id = kept["id"].as_str().unwrap();

    // A second tracking entry for the doomed bill.
    let response = app
        .post(
            "/workflow",
            &json!({
                "bill_id": doomed_id,
                "customer_name": "Asha",
                "stage": "stitching",
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = app.delete(&format!("/bills/{}", doomed_id)).await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let body: Value = app.get("/workflow").await.json().await.unwrap();
    let jobs = body["workflows"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["bill_id"], *kept_id);

    let response = app.get(&format!("/bills/{}", doomed_id)).await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_bill_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.delete("/bills/no-such-id").await;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_list_search_is_case_insensitive() {
    let app = TestApp::spawn().await;

    app.create_bill("Asha Rao", "999", 1, 100.0).await;
    app.create_bill("Ravi", "888", 1, 100.0).await;

    let body: Value = app.get("/bills?search=asha").await.json().await.unwrap();
    let bills = body["bills"].as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["customer_name"], "Asha Rao");

    // Phone numbers are searchable too.
    let body: Value = app.get("/bills?search=88").await.json().await.unwrap();
    let bills = body["bills"].as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["customer_name"], "Ravi");
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let app = TestApp::spawn().await;

    for i in 0..3 {
        app.create_bill(&format!("Customer {}", i), "111", 1, 100.0).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    let body: Value = app.get("/bills?page=1&limit=2").await.json().await.unwrap();
    let bills = body["bills"].as_array().unwrap();
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0]["customer_name"], "Customer 2");
    assert_eq!(bills[1]["customer_name"], "Customer 1");
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);

    let body: Value = app.get("/bills?page=2&limit=2").await.json().await.unwrap();
    let bills = body["bills"].as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["customer_name"], "Customer 0");
}

#[tokio::test]
async fn test_create_bill_keeps_measurements_and_attachments() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/bills",
            &json!({
                "customer_name": "Asha",
                "phone": "999",
                "garment_type": "dress",
                "quantity": 1,
                "rate": 1200.0,
                "measurements": { "length": 42.0, "chest": 36.0 },
                "images": ["front.jpg"],
                "drawings": ["sketch.png"],
                "tailor_notes": "puff sleeves",
            }),
        )
        .await;

    let bill: Value = response.json().await.unwrap();
    assert_eq!(bill["measurements"]["length"], 42.0);
    assert_eq!(bill["measurements"]["chest"], 36.0);
    assert!(bill["measurements"]["waist"].is_null());
    assert_eq!(bill["images"][0], "front.jpg");
    assert_eq!(bill["drawings"][0], "sketch.png");
    assert_eq!(bill["tailor_notes"], "puff sleeves");
}

#[tokio::test]
async fn test_balance_may_go_negative() {
    let app = TestApp::spawn().await;

    let bill: Value = app
        .post(
            "/bills",
            &json!({
                "customer_name": "Asha",
                "phone": "999",
                "garment_type": "shirt",
                "quantity": 1,
                "rate": 500.0,
                "advance": 700.0,
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(bill["balance"], -200.0);
}
