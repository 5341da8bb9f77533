//! HTTP API Tests
//!
//! Drives the full router over the in-memory store with a frozen clock.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use serde_json::{json, Value};

use interface_api::config::{ApiConfig, StoreKind};
use interface_api::create_router;
use test_utils::ServiceFixture;

fn server() -> (TestServer, ServiceFixture) {
    let fixture = ServiceFixture::new();
    let config = ApiConfig {
        store: StoreKind::Memory,
        ..ApiConfig::default()
    };
    let app = create_router(fixture.service.clone(), config);
    let server = TestServer::new(app).expect("failed to build test server");
    (server, fixture)
}

async fn create_book(server: &TestServer, copies: i32) -> String {
    let response = server
        .post("/api/v1/books")
        .json(&json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "isbn": "978-0441478125",
            "copies_total": copies,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn create_member(server: &TestServer) -> String {
    let response = server
        .post("/api/v1/members")
        .json(&json!({
            "name": "Genly Ai",
            "email": "genly@ekumen.org",
            "phone": "555-0100",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

fn assert_error_body(body: &Value, error: &str) {
    assert_eq!(body["error"], error);
    assert!(body["message"].is_string());
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness_and_readiness() {
        let (server, _fixture) = server();

        let live = server.get("/health").await;
        live.assert_status_ok();
        assert_eq!(live.json::<Value>()["status"], "healthy");

        let ready = server.get("/health/ready").await;
        ready.assert_status_ok();
        let body = ready.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert!(body["store"].is_object());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (server, _fixture) = server();
        let response = server.get("/api/v1/books").await;
        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_book_crud() {
        let (server, _fixture) = server();
        let id = create_book(&server, 3).await;

        let fetched = server.get(&format!("/api/v1/books/{}", id)).await;
        fetched.assert_status_ok();
        let body = fetched.json::<Value>();
        assert_eq!(body["copies_total"], 3);
        assert_eq!(body["copies_available"], 3);
        assert_eq!(body["copies_on_loan"], 0);

        let patched = server
            .patch(&format!("/api/v1/books/{}", id))
            .json(&json!({ "copies_total": 5 }))
            .await;
        patched.assert_status_ok();
        assert_eq!(patched.json::<Value>()["copies_total"], 5);

        let listed = server.get("/api/v1/books").await;
        assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);

        server
            .delete(&format!("/api/v1/books/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let gone = server.get(&format!("/api/v1/books/{}", id)).await;
        gone.assert_status_not_found();
        assert_error_body(&gone.json::<Value>(), "not_found");
    }

    #[tokio::test]
    async fn test_invalid_counts_are_unprocessable() {
        let (server, _fixture) = server();

        let response = server
            .post("/api/v1/books")
            .json(&json!({
                "title": "Dune",
                "author": "Frank Herbert",
                "isbn": "978-0441013593",
                "copies_total": 2,
                "copies_available": 5,
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_error_body(&response.json::<Value>(), "validation_error");

        let empty_title = server
            .post("/api/v1/books")
            .json(&json!({
                "title": "",
                "author": "Anon",
                "isbn": "0",
                "copies_total": 1,
            }))
            .await;
        empty_title.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let (server, _fixture) = server();

        let broken = server
            .post("/api/v1/books")
            .bytes(Bytes::from_static(b"{\"title\": "))
            .content_type("application/json")
            .await;
        broken.assert_status_bad_request();
        assert_error_body(&broken.json::<Value>(), "bad_request");

        let bad_id = server.get("/api/v1/books/not-a-uuid").await;
        bad_id.assert_status_bad_request();
        assert_error_body(&bad_id.json::<Value>(), "bad_request");

        let id = create_book(&server, 1).await;
        let unknown_field = server
            .patch(&format!("/api/v1/books/{}", id))
            .json(&json!({ "copies": 4 }))
            .await;
        unknown_field.assert_status_bad_request();
    }
}

mod membership {
    use super::*;

    #[tokio::test]
    async fn test_phone_null_clears_and_absent_keeps() {
        let (server, _fixture) = server();
        let id = create_member(&server).await;
        let path = format!("/api/v1/members/{}", id);

        let renamed = server.patch(&path).json(&json!({ "name": "Estraven" })).await;
        renamed.assert_status_ok();
        assert_eq!(renamed.json::<Value>()["phone"], "555-0100");

        let cleared = server.patch(&path).json(&json!({ "phone": null })).await;
        cleared.assert_status_ok();
        let body = cleared.json::<Value>();
        assert!(body["phone"].is_null());
        assert_eq!(body["name"], "Estraven");
    }

    #[tokio::test]
    async fn test_invalid_email_is_unprocessable() {
        let (server, _fixture) = server();
        let response = server
            .post("/api/v1/members")
            .json(&json!({ "name": "Therem", "email": "not-an-email" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_member_delete() {
        let (server, _fixture) = server();
        let id = create_member(&server).await;
        let path = format!("/api/v1/members/{}", id);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }
}

mod circulation {
    use super::*;

    #[tokio::test]
    async fn test_borrow_until_unavailable_then_return() {
        let (server, _fixture) = server();
        let book = create_book(&server, 1).await;
        let member = create_member(&server).await;
        let borrow_path = format!("/api/v1/books/{}/borrow", book);

        let borrowed = server
            .post(&borrow_path)
            .json(&json!({ "member_id": member }))
            .await;
        borrowed.assert_status(StatusCode::CREATED);
        let loan = borrowed.json::<Value>();
        assert_eq!(loan["status"], "active");
        assert_eq!(loan["fine"], "0.00");
        let loan_id = loan["id"].as_str().unwrap().to_string();

        let refused = server
            .post(&borrow_path)
            .json(&json!({ "member_id": member }))
            .await;
        refused.assert_status(StatusCode::CONFLICT);
        assert_error_body(&refused.json::<Value>(), "conflict");

        let returned = server
            .post(&format!("/api/v1/loans/{}/return", loan_id))
            .await;
        returned.assert_status_ok();
        let body = returned.json::<Value>();
        assert_eq!(body["status"], "returned");
        assert!(body["returned_at"].is_string());

        let book_body = server
            .get(&format!("/api/v1/books/{}", book))
            .await
            .json::<Value>();
        assert_eq!(book_body["copies_available"], 1);

        let again = server
            .post(&format!("/api/v1/loans/{}/return", loan_id))
            .await;
        again.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_borrow_for_unknown_member_is_not_found() {
        let (server, _fixture) = server();
        let book = create_book(&server, 2).await;

        let response = server
            .post(&format!("/api/v1/books/{}/borrow", book))
            .json(&json!({ "member_id": "00000000-0000-0000-0000-000000000000" }))
            .await;
        response.assert_status_not_found();

        let body = server
            .get(&format!("/api/v1/books/{}", book))
            .await
            .json::<Value>();
        assert_eq!(body["copies_available"], 2);
    }

    #[tokio::test]
    async fn test_overdue_loan_reports_estimate_then_final_fine() {
        let (server, fixture) = server();
        let book = create_book(&server, 1).await;
        let member = create_member(&server).await;

        let borrowed = server
            .post(&format!("/api/v1/books/{}/borrow", book))
            .json(&json!({ "member_id": member, "due_days": 2 }))
            .await;
        let loan_id = borrowed.json::<Value>()["id"].as_str().unwrap().to_string();

        fixture
            .clock
            .advance(Duration::days(2) + Duration::days(3) + Duration::hours(5));

        let listed = server.get("/api/v1/loans").await.json::<Value>();
        let loan = &listed.as_array().unwrap()[0];
        assert_eq!(loan["status"], "overdue");
        assert_eq!(loan["fine"], "0.00");
        assert_eq!(loan["fine_due"], "3.00");
        assert_eq!(loan["fine_is_estimate"], true);

        let returned = server
            .post(&format!("/api/v1/loans/{}/return", loan_id))
            .json(&json!({ "fine_per_day": "0.50" }))
            .await;
        returned.assert_status_ok();
        let body = returned.json::<Value>();
        assert_eq!(body["fine"], "1.50");
        assert_eq!(body["fine_due"], "1.50");
        assert_eq!(body["fine_is_estimate"], false);
    }

    #[tokio::test]
    async fn test_negative_fine_rate_is_unprocessable() {
        let (server, _fixture) = server();
        let book = create_book(&server, 1).await;
        let member = create_member(&server).await;
        let loan_id = server
            .post(&format!("/api/v1/books/{}/borrow", book))
            .json(&json!({ "member_id": member }))
            .await
            .json::<Value>()["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = server
            .post(&format!("/api/v1/loans/{}/return", loan_id))
            .json(&json!({ "fine_per_day": "-1" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let loan = server
            .get(&format!("/api/v1/loans/{}", loan_id))
            .await
            .json::<Value>();
        assert!(loan["returned_at"].is_null());
    }

    #[tokio::test]
    async fn test_out_of_range_due_days_is_unprocessable() {
        let (server, _fixture) = server();
        let book = create_book(&server, 1).await;
        let member = create_member(&server).await;

        let response = server
            .post(&format!("/api/v1/books/{}/borrow", book))
            .json(&json!({ "member_id": member, "due_days": 100_000_000i64 }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_error_body(&response.json::<Value>(), "validation_error");

        let body = server
            .get(&format!("/api/v1/books/{}", book))
            .await
            .json::<Value>();
        assert_eq!(body["copies_available"], 1);
    }

    #[tokio::test]
    async fn test_fine_beyond_storable_amount_is_unprocessable() {
        let (server, fixture) = server();
        let book = create_book(&server, 1).await;
        let member = create_member(&server).await;
        let loan_id = server
            .post(&format!("/api/v1/books/{}/borrow", book))
            .json(&json!({ "member_id": member, "due_days": 1 }))
            .await
            .json::<Value>()["id"]
            .as_str()
            .unwrap()
            .to_string();

        fixture.clock.advance(Duration::days(11));

        let response = server
            .post(&format!("/api/v1/loans/{}/return", loan_id))
            .json(&json!({ "fine_per_day": "79228162514264337593543950335" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let loan = server
            .get(&format!("/api/v1/loans/{}", loan_id))
            .await
            .json::<Value>();
        assert!(loan["returned_at"].is_null());
    }
}
