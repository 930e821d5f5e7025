mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use shared_database::AdminApiClient;
use shared_utils::test_utils::MockAdminResponses;
use time_slot_cell::{AvailabilityStore, HttpAvailabilityStore, TimeSlotError};

fn store_for(server: &MockServer) -> HttpAvailabilityStore {
    HttpAvailabilityStore::from_client(
        AdminApiClient::with_timeout(&server.uri(), Duration::from_secs(2)).unwrap(),
    )
}

#[tokio::test]
async fn test_list_exceptions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/time-slots/blocked/date"))
        .and(query_param("departmentId", "2"))
        .and(query_param("date", date().to_string()))
        .and(header("Authorization", "Bearer test-operator-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAdminResponses::envelope(
            "TIMESLOT_2001",
            json!([
                MockAdminResponses::exception(77, "11:00"),
                MockAdminResponses::exception(78, "14:30"),
                { "exceptionId": 79, "exceptionTime": "not-a-time" },
                { "exceptionId": 80 }
            ]),
        )))
        .mount(&mock_server)
        .await;

    let exceptions = store_for(&mock_server)
        .list_exceptions(&identity(), DEPT, date())
        .await
        .unwrap();

    assert_eq!(exceptions, vec![exception(77, DEPT, "11:00"), exception(78, DEPT, "14:30")]);
}

#[tokio::test]
async fn test_list_exceptions_without_data_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/time-slots/blocked/date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "TIMESLOT_2001" })))
        .mount(&mock_server)
        .await;

    let exceptions = store_for(&mock_server)
        .list_exceptions(&identity(), DEPT, date())
        .await
        .unwrap();

    assert!(exceptions.is_empty());
}

#[tokio::test]
async fn test_list_reservations_keeps_both_department_shapes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/date"))
        .and(query_param("date", date().to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAdminResponses::envelope(
            "APPOINTMENT_1001",
            json!([
                MockAdminResponses::reservation_by_id(1, DEPT, "13:00"),
                MockAdminResponses::reservation_by_name(2, "내과", "14:00"),
            ]),
        )))
        .mount(&mock_server)
        .await;

    let reservations = store_for(&mock_server)
        .list_reservations(&identity(), date())
        .await
        .unwrap();

    assert_eq!(reservations, vec![reservation(1, DEPT, "13:00"), named_reservation(2, "내과", "14:00")]);
}

#[tokio::test]
async fn test_create_exception() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/time-slots/block"))
        .and(body_json(json!({
            "departmentId": 2,
            "blockDate": date().to_string(),
            "blockTime": "10:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(MockAdminResponses::envelope(
            "TIMESLOT_2002",
            MockAdminResponses::created_exception(101, DEPT, &date().to_string(), "10:00"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = store_for(&mock_server)
        .create_exception(&identity(), DEPT, date(), tp("10:00"))
        .await
        .unwrap();

    assert_eq!(created, exception(101, DEPT, "10:00"));
}

#[tokio::test]
async fn test_create_exception_uses_requested_time_when_omitted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/time-slots/block"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAdminResponses::envelope(
            "TIMESLOT_2002",
            json!({ "exceptionId": 102 }),
        )))
        .mount(&mock_server)
        .await;

    let created = store_for(&mock_server)
        .create_exception(&identity(), DEPT, date(), tp("12:30"))
        .await
        .unwrap();

    assert_eq!(created, exception(102, DEPT, "12:30"));
}

#[tokio::test]
async fn test_delete_exception_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/time-slots/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "TIMESLOT_2003" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/time-slots/78"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    assert!(store.delete_exception(&identity(), 77).await.is_ok());
    assert!(store.delete_exception(&identity(), 78).await.is_ok());
}

#[tokio::test]
async fn test_server_errors_are_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    assert_matches!(
        store.delete_exception(&identity(), 77).await,
        Err(TimeSlotError::Unavailable(_))
    );
    assert_matches!(
        store.list_reservations(&identity(), date()).await,
        Err(TimeSlotError::Unavailable(_))
    );
}

#[tokio::test]
async fn test_list_departments_checks_response_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/hospitals/1/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAdminResponses::departments()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/hospitals/2/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAdminResponses::envelope(
            "HOSPITAL_4004",
            json!([]),
        )))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let departments = store.list_departments(&identity(), 1).await.unwrap();
    assert_eq!(departments.len(), 2);
    assert_eq!(departments[0].name, "Cardiology");

    assert_matches!(
        store.list_departments(&identity(), 2).await,
        Err(TimeSlotError::Unavailable(_))
    );
}

#[tokio::test]
async fn test_rejected_credentials_are_unauthenticated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/date"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired token"))
        .mount(&mock_server)
        .await;

    assert_matches!(
        store_for(&mock_server).list_reservations(&identity(), date()).await,
        Err(TimeSlotError::Unauthenticated)
    );
}
