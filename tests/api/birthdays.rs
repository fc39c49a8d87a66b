use sqlx::{postgres::PgRow, Row};
use std::collections::HashMap;

use crate::helpers::TestApp;

#[tokio::test]
async fn create_returns_201_when_body_is_valid() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("username", "Ada");
    body.insert("email", "ada@example.com");
    body.insert("dob", "1990-03-14");

    let response = test_app.post_record(body).await;

    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn create_persists_the_birthday_record_with_a_lowercased_email() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("username", "Ada");
    body.insert("email", "Ada@Example.COM");
    body.insert("dob", "1990-03-14");

    test_app.post_record(body).await;

    let (username, email, date_of_birth): (String, String, chrono::NaiveDate) =
        sqlx::query("SELECT username, email, date_of_birth FROM birthdays;")
            .map(|row: PgRow| (row.get("username"), row.get("email"), row.get("date_of_birth")))
            .fetch_one(&test_app.db_pool)
            .await
            .expect("Query to fetch birthdays failed.");

    assert_eq!(username, "Ada");
    assert_eq!(email, "ada@example.com");
    assert_eq!(
        date_of_birth,
        chrono::NaiveDate::from_ymd_opt(1990, 3, 14).unwrap()
    );
}

#[tokio::test]
async fn create_returns_400_when_body_require_field_is_missing() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases: Vec<(HashMap<&str, &str>, &str)> = vec![
        (HashMap::from([]), "missing body parameters"),
        (
            HashMap::from([("username", "Ada"), ("dob", "1990-03-14")]),
            "missing email parameter",
        ),
        (
            HashMap::from([("email", "ada@example.com"), ("dob", "1990-03-14")]),
            "missing username parameter",
        ),
        (
            HashMap::from([("username", "Ada"), ("email", "ada@example.com")]),
            "missing dob parameter",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_record(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn create_returns_400_when_body_is_present_but_not_valid() {
    let test_app = TestApp::spawn_app().await;

    let test_cases: Vec<(HashMap<&str, &str>, &str)> = vec![
        (
            HashMap::from([
                ("username", "{Ada}"),
                ("email", "ada@example.com"),
                ("dob", "1990-03-14"),
            ]),
            "invalid username parameter",
        ),
        (
            HashMap::from([
                ("username", "Ada"),
                ("email", "example.com"),
                ("dob", "1990-03-14"),
            ]),
            "invalid email parameter",
        ),
        (
            HashMap::from([
                ("username", "Ada"),
                ("email", "ada@example.com"),
                ("dob", "1990-13-40"),
            ]),
            "invalid dob parameter",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_record(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn create_returns_400_when_email_already_exists() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("username", "Ada");
    body.insert("email", "ada@example.com");
    body.insert("dob", "1990-03-14");

    let first_response = test_app.post_record(body).await;

    assert_eq!(201, first_response.status().as_u16());

    // Same address in a different case: uniqueness is case-insensitive.
    let mut duplicated_body = HashMap::new();

    duplicated_body.insert("username", "Another Ada");
    duplicated_body.insert("email", "ADA@example.com");
    duplicated_body.insert("dob", "1956-07-09");

    let second_response = test_app.post_record(duplicated_body).await;

    assert_eq!(400, second_response.status().as_u16());

    let error_body: serde_json::Value = second_response
        .json()
        .await
        .expect("Failed to parse error body.");

    assert_eq!(error_body["error"], "Email already exists");

    let record_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM birthdays;")
        .map(|row: PgRow| row.get("count"))
        .fetch_one(&test_app.db_pool)
        .await
        .expect("Query to count birthdays failed.");

    assert_eq!(record_count, 1);
}

#[tokio::test]
async fn list_returns_records_sorted_by_date_of_birth() {
    let test_app = TestApp::spawn_app().await;
    let records = vec![
        ("Grace", "grace@example.com", "1906-12-09"),
        ("Ada", "ada@example.com", "1815-12-10"),
        ("Alan", "alan@example.com", "1912-06-23"),
    ];

    for (username, email, dob) in records {
        let body = HashMap::from([("username", username), ("email", email), ("dob", dob)]);
        let response = test_app.post_record(body).await;

        assert_eq!(201, response.status().as_u16());
    }

    let response = test_app.get_records().await;

    assert_eq!(200, response.status().as_u16());

    let listed: Vec<serde_json::Value> = response.json().await.expect("Failed to parse body.");
    let dobs: Vec<&str> = listed
        .iter()
        .map(|record| record["dob"].as_str().unwrap())
        .collect();

    assert_eq!(dobs, vec!["1815-12-10", "1906-12-09", "1912-06-23"]);
}

#[tokio::test]
async fn find_by_month_day_matches_regardless_of_year() {
    let test_app = TestApp::spawn_app().await;
    let records = vec![
        ("Ada", "ada@example.com", "1815-12-10"),
        ("Grace", "grace@example.com", "1906-12-10"),
        ("Alan", "alan@example.com", "1912-06-23"),
    ];

    for (username, email, dob) in records {
        let body = HashMap::from([("username", username), ("email", email), ("dob", dob)]);
        let response = test_app.post_record(body).await;

        assert_eq!(201, response.status().as_u16());
    }

    let matches = birthday_service::store::find_by_month_day(&test_app.db_pool, 12, 10)
        .await
        .expect("Query to find birthdays by month and day failed.");
    let mut matched_emails: Vec<&str> = matches
        .iter()
        .map(|record| record.email.as_ref())
        .collect();

    matched_emails.sort();

    assert_eq!(matched_emails, vec!["ada@example.com", "grace@example.com"]);
}

#[tokio::test]
async fn delete_returns_200_and_removes_the_record() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("username", "Ada");
    body.insert("email", "ada@example.com");
    body.insert("dob", "1990-03-14");

    let created: serde_json::Value = test_app
        .post_record(body)
        .await
        .json()
        .await
        .expect("Failed to parse body.");
    let id = created["id"].as_str().unwrap().to_string();

    let response = test_app.delete_record(&id).await;

    assert_eq!(200, response.status().as_u16());

    let listed: Vec<serde_json::Value> = test_app
        .get_records()
        .await
        .json()
        .await
        .expect("Failed to parse body.");

    assert!(listed.is_empty());
}

#[tokio::test]
async fn delete_of_a_missing_id_is_tolerated() {
    let test_app = TestApp::spawn_app().await;
    let missing_id = uuid::Uuid::new_v4().to_string();

    let response = test_app.delete_record(&missing_id).await;

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse body.");

    assert_eq!(body["message"], "Birthday deleted successfully");
}

#[tokio::test]
async fn delete_with_a_malformed_id_returns_400() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.delete_record("not-a-uuid").await;

    assert_eq!(400, response.status().as_u16());
}
