//! End-to-end lifecycle tests over the HTTP surface
//!
//! Drives the fully-layered router (auth middleware included) with
//! oneshot requests against an embedded throwaway database.

mod common;

use http::StatusCode;
use serde_json::json;

use common::TestApp;
use shared::Role;

#[tokio::test]
async fn full_lifecycle_file_verdict_close_lookup() {
    let app = TestApp::spawn().await;
    let (_sales_id, sales_token) = app.seed_profile("ana@acme.test", "Ana Torres", Role::Sales).await;
    let (_lab_id, lab_token) = app.seed_profile("lab@acme.test", "Quality Lab", Role::Lab).await;

    // Sales files the claim; the code is normalized to uppercase
    let (status, body) = app
        .post(
            "/api/claims",
            Some(&sales_token),
            json!({
                "code": "abc001",
                "customer_name": "Maria Lopez",
                "customer_tax_id": "20601234567",
                "customer_phone": "+51 999 111 222",
                "reason": "Seal broken on arrival"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    let claim = &body["data"]["claim"];
    assert_eq!(claim["code"], "ABC001");
    assert_eq!(claim["state"], "PENDING");
    assert_eq!(
        body["data"]["customer_link"],
        "https://t.me/test_claims_bot?start=ABC001"
    );
    let claim_id = claim["id"].as_str().expect("claim id").to_string();

    // Lab issues the verdict: PENDING -> IN_REVIEW
    let (status, body) = app
        .post(
            &format!("/api/claims/{}/verdict", claim_id),
            Some(&lab_token),
            json!({"verdict": "APPROVED"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "IN_REVIEW");
    assert_eq!(body["data"]["verdict"], "APPROVED");

    // The claim now sits in the filing agent's queue
    let (status, body) = app.get("/api/claims/queue", Some(&sales_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));

    // Sales closes the case: IN_REVIEW -> CLOSED
    let (status, body) = app
        .post(
            &format!("/api/claims/{}/close", claim_id),
            Some(&sales_token),
            json!({
                "resolution_type": "PRODUCT_EXCHANGE",
                "resolution_note": "Replaced unit shipped on Monday"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "CLOSED");
    assert_eq!(body["data"]["resolution_type"], "PRODUCT_EXCHANGE");

    // Public lookup is unauthenticated and case-insensitive
    let (status, body) = app.get("/api/public/claims/abc001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], "ABC001");
    assert_eq!(body["data"]["state"], "CLOSED");
    let description = body["data"]["status"]["description"]
        .as_str()
        .expect("status description");
    assert!(description.contains("Replaced unit shipped on Monday"));
    // The projection never exposes agent or customer contact data
    assert!(body["data"].get("created_by").is_none());
    assert!(body["data"].get("customer_phone").is_none());
}

#[tokio::test]
async fn duplicate_code_is_conflict_even_with_different_case() {
    let app = TestApp::spawn().await;
    let (_id, token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;

    let payload = |code: &str| {
        json!({
            "code": code,
            "customer_name": "Maria",
            "customer_tax_id": "123",
            "customer_phone": "",
            "reason": "damaged"
        })
    };

    let (status, _) = app.post("/api/claims", Some(&token), payload("ABC002")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/api/claims", Some(&token), payload("abc002")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E4001");
}

#[tokio::test]
async fn rejected_claim_cannot_close_with_credit_note() {
    let app = TestApp::spawn().await;
    let (_sid, sales_token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;
    let (_lid, lab_token) = app.seed_profile("lab@acme.test", "Lab", Role::Lab).await;

    let (_, body) = app
        .post(
            "/api/claims",
            Some(&sales_token),
            json!({
                "code": "REJ001",
                "customer_name": "Maria",
                "customer_tax_id": "123",
                "customer_phone": "",
                "reason": "wear and tear"
            }),
        )
        .await;
    let claim_id = body["data"]["claim"]["id"].as_str().expect("id").to_string();

    app.post(
        &format!("/api/claims/{}/verdict", claim_id),
        Some(&lab_token),
        json!({"verdict": "REJECTED"}),
    )
    .await;

    // A credit note does not belong to the REJECTED resolution set
    let (status, body) = app
        .post(
            &format!("/api/claims/{}/close", claim_id),
            Some(&sales_token),
            json!({
                "resolution_type": "CREDIT_NOTE",
                "resolution_note": "goodwill credit"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "E4003");

    // DEFINITIVE_REJECTION is allowed
    let (status, body) = app
        .post(
            &format!("/api/claims/{}/close", claim_id),
            Some(&sales_token),
            json!({
                "resolution_type": "DEFINITIVE_REJECTION",
                "resolution_note": "Not covered by warranty"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "CLOSED");
}

#[tokio::test]
async fn close_before_verdict_is_invalid_state() {
    let app = TestApp::spawn().await;
    let (_id, token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;

    let (_, body) = app
        .post(
            "/api/claims",
            Some(&token),
            json!({
                "code": "PEN001",
                "customer_name": "Maria",
                "customer_tax_id": "123",
                "customer_phone": "",
                "reason": "damaged"
            }),
        )
        .await;
    let claim_id = body["data"]["claim"]["id"].as_str().expect("id").to_string();

    let (status, body) = app
        .post(
            &format!("/api/claims/{}/close", claim_id),
            Some(&token),
            json!({"resolution_type": "OTHER", "resolution_note": "note"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "E4002");
}

#[tokio::test]
async fn role_gates_on_lifecycle_routes() {
    let app = TestApp::spawn().await;
    let (_sid, sales_token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;
    let (_lid, lab_token) = app.seed_profile("lab@acme.test", "Lab", Role::Lab).await;

    // Lab cannot file claims
    let (status, body) = app
        .post(
            "/api/claims",
            Some(&lab_token),
            json!({
                "code": "X1",
                "customer_name": "M",
                "customer_tax_id": "1",
                "customer_phone": "",
                "reason": "r"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // Sales cannot issue verdicts
    let (_, body) = app
        .post(
            "/api/claims",
            Some(&sales_token),
            json!({
                "code": "GATE01",
                "customer_name": "M",
                "customer_tax_id": "1",
                "customer_phone": "",
                "reason": "r"
            }),
        )
        .await;
    let claim_id = body["data"]["claim"]["id"].as_str().expect("id").to_string();
    let (status, _) = app
        .post(
            &format!("/api/claims/{}/verdict", claim_id),
            Some(&sales_token),
            json!({"verdict": "APPROVED"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only admins manage the directory
    let (status, _) = app.get("/api/profiles", Some(&sales_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authentication_is_required_on_api_routes() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/claims", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = app.get("/api/claims", Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");

    // Health stays open
    let (status, _) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_lookup_unknown_code_is_neutral_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/public/claims/NOPE99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
    assert_eq!(body["message"], "No claim found with that code");
}

#[tokio::test]
async fn dashboard_list_filters_by_verdict_status() {
    let app = TestApp::spawn().await;
    let (_sid, sales_token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;
    let (_lid, lab_token) = app.seed_profile("lab@acme.test", "Lab", Role::Lab).await;

    for code in ["LIS001", "LIS002", "LIS003"] {
        app.post(
            "/api/claims",
            Some(&sales_token),
            json!({
                "code": code,
                "customer_name": "Maria Lopez",
                "customer_tax_id": "123",
                "customer_phone": "",
                "reason": "damaged"
            }),
        )
        .await;
    }
    let (_, body) = app.get("/api/claims?search=LIS002", Some(&sales_token)).await;
    let claim_id = body["data"]["data"][0]["id"].as_str().expect("id").to_string();
    app.post(
        &format!("/api/claims/{}/verdict", claim_id),
        Some(&lab_token),
        json!({"verdict": "APPROVED"}),
    )
    .await;

    let (status, body) = app
        .get("/api/claims?status=no_verdict", Some(&sales_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = app
        .get("/api/claims?status=has_verdict", Some(&sales_token))
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["code"], "LIS002");

    // Case-insensitive search on customer name
    let (_, body) = app.get("/api/claims?search=maria", Some(&sales_token)).await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn dashboard_list_filters_by_agent_and_date_range() {
    let app = TestApp::spawn().await;
    let (ana_id, ana_token) = app.seed_profile("ana@acme.test", "Ana", Role::Sales).await;
    let (_luis_id, luis_token) = app.seed_profile("luis@acme.test", "Luis", Role::Sales).await;

    let payload = |code: &str| {
        json!({
            "code": code,
            "customer_name": "Maria Lopez",
            "customer_tax_id": "123",
            "customer_phone": "",
            "reason": "damaged"
        })
    };
    app.post("/api/claims", Some(&ana_token), payload("AGT001")).await;
    app.post("/api/claims", Some(&ana_token), payload("AGT002")).await;
    app.post("/api/claims", Some(&luis_token), payload("AGT003")).await;

    // Agent filter narrows to the filing agent's claims
    let (status, body) = app
        .get(&format!("/api/claims?agent={}", ana_id), Some(&ana_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    for claim in body["data"]["data"].as_array().expect("claims") {
        assert_eq!(claim["created_by"], ana_id);
    }

    // created_at range: everything was filed between those bounds
    let (status, body) = app
        .get(
            "/api/claims?from=2000-01-01T00:00:00Z&to=2100-01-01T00:00:00Z",
            Some(&ana_token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);

    // A window in the future matches nothing
    let (_, body) = app
        .get("/api/claims?from=2100-01-01T00:00:00Z", Some(&ana_token))
        .await;
    assert_eq!(body["data"]["total"], 0);

    // A window in the past matches nothing either
    let (_, body) = app
        .get("/api/claims?to=2000-01-01T00:00:00Z", Some(&ana_token))
        .await;
    assert_eq!(body["data"]["total"], 0);

    // Range combines with the agent filter
    let (_, body) = app
        .get(
            &format!(
                "/api/claims?agent={}&from=2000-01-01T00:00:00Z&to=2100-01-01T00:00:00Z",
                ana_id
            ),
            Some(&ana_token),
        )
        .await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn admin_provisions_profiles_and_resolves_display_names() {
    let app = TestApp::spawn().await;
    let (_aid, admin_token) = app.seed_profile("boss@acme.test", "Boss", Role::Admin).await;

    let (status, body) = app
        .post(
            "/api/profiles",
            Some(&admin_token),
            json!({
                "email": "nuevo@acme.test",
                "display_name": "Nuevo Agente",
                "role": "SALES"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let link = body["data"]["employee_link"].as_str().expect("link");
    assert!(link.starts_with("https://t.me/test_claims_bot?start=EMP-"));
    let profile_id = body["data"]["profile"]["id"].as_str().expect("id").to_string();

    // Duplicate email is a conflict, reported as a profile conflict
    let (status, body) = app
        .post(
            "/api/profiles",
            Some(&admin_token),
            json!({
                "email": "NUEVO@acme.test",
                "display_name": "Someone Else",
                "role": "LAB"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E4001");
    assert!(body["message"].as_str().expect("message").contains("Profile"));

    let (status, body) = app
        .post(
            "/api/profiles/display-names",
            Some(&admin_token),
            json!({"ids": [profile_id.clone()]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][&profile_id], "Nuevo Agente");
}

#[tokio::test]
async fn session_echoes_token_identity() {
    let app = TestApp::spawn().await;
    let (id, token) = app.seed_profile("ana@acme.test", "Ana Torres", Role::Sales).await;

    let (status, body) = app.post("/api/auth/session", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["display_name"], "Ana Torres");
    assert_eq!(body["data"]["role"], "SALES");
    assert_eq!(body["data"]["chat_linked"], false);
}
