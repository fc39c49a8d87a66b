use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

/// Year 2000 is a leap year, so this also works when the suite runs on a
/// February 29th.
fn dob_matching_today() -> String {
    let today = Local::now().date_naive();

    NaiveDate::from_ymd_opt(2000, today.month(), today.day())
        .unwrap()
        .to_string()
}

fn dob_not_matching_today() -> String {
    let today = Local::now().date_naive();
    let other_month = today.month() % 12 + 1;

    NaiveDate::from_ymd_opt(2000, other_month, 1)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn scan_trigger_returns_200_immediately() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    let response = test_app.trigger_scan().await;

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse body.");

    assert_eq!(body["message"], "Birthday scan triggered manually");
}

#[tokio::test]
async fn scan_sends_one_greeting_to_a_record_matching_today() {
    let test_app = TestApp::spawn_app().await;
    let dob = dob_matching_today();
    let body = HashMap::from([
        ("username", "Ada"),
        ("email", "ada@example.com"),
        ("dob", dob.as_str()),
    ]);

    let response = test_app.post_record(body).await;

    assert_eq!(201, response.status().as_u16());

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.trigger_scan().await;

    assert_eq!(200, response.status().as_u16());

    test_app.wait_for_email_requests(1).await;

    let received_requests = &test_app
        .email_server
        .received_requests()
        .await
        .expect("Failed to fetch received requests.");
    let send_body: serde_json::Value =
        serde_json::from_slice(&received_requests[0].body).expect("Failed to parse request body.");

    assert_eq!(
        send_body["personalizations"][0]["to"][0]["email"],
        "ada@example.com"
    );
    assert_eq!(send_body["subject"], "Happy Birthday!");
}

#[tokio::test]
async fn scan_sends_nothing_when_no_record_matches_today() {
    let test_app = TestApp::spawn_app().await;
    let dob = dob_not_matching_today();
    let body = HashMap::from([
        ("username", "Grace"),
        ("email", "grace@example.com"),
        ("dob", dob.as_str()),
    ]);

    let response = test_app.post_record(body).await;

    assert_eq!(201, response.status().as_u16());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.trigger_scan().await;

    assert_eq!(200, response.status().as_u16());

    // Give the background scan time to run before the mock verifies that
    // nothing was sent.
    tokio::time::sleep(Duration::from_millis(250)).await;
}
