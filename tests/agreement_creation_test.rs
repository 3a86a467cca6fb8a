mod common;

use acordos_api::entities::AgreementStatus;
use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use chrono::{NaiveDate, Utc};
use common::{decimal_field, json_body, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

fn create_body(ids: serde_json::Value) -> serde_json::Value {
    json!({
        "mensalidadesIds": ids,
        "data_prevista": "2024-01-10",
        "descricao": "Acordo de débitos de 2023",
        "metodo_pag": "PIX",
        "realizado_por": "atendente.maria"
    })
}

#[tokio::test]
async fn creates_agreement_with_summed_total() {
    let app = TestApp::new().await;
    let first = app.seed_installment(1, dec!(150.50)).await;
    let second = app.seed_installment(2, dec!(99.50)).await;
    let third = app.seed_installment(3, dec!(120.00)).await;

    let response = app
        .request(
            Method::POST,
            "/acordos",
            Some(create_body(json!([first.id, second.id]))),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(decimal_field(&body["total_acordo"]), dec!(250.00));
    assert_eq!(body["status"], "Aberto");
    assert_eq!(body["data_prevista"], "2024-01-10");
    assert_eq!(body["descricao"], "Acordo de débitos de 2023");
    assert!(body["dt_pgto"].is_null());
    assert!(body.get("mensalidades").is_none());

    let id = body["id_acordo"].as_i64().expect("numeric id") as i32;
    let stored = app.agreement(id).await;
    assert_eq!(stored.total, dec!(250.00));
    assert_eq!(stored.status, AgreementStatus::Open);
    assert!(stored.created_at <= Utc::now());
    assert_eq!(app.link_count().await, 2);

    // Untouched installment stays available and installments remain open
    assert!(!app.installment(third.id).await.is_paid());
    assert!(!app.installment(first.id).await.is_paid());
}

#[tokio::test]
async fn accepts_rfc3339_due_date() {
    let app = TestApp::new().await;
    let inst = app.seed_installment(1, dec!(10)).await;

    let mut body = create_body(json!([inst.id]));
    body["data_prevista"] = json!("2024-01-10T00:00:00.000Z");
    let response = app.request(Method::POST, "/acordos", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["data_prevista"], "2024-01-10");
    let stored = app.agreement(body["id_acordo"].as_i64().unwrap() as i32).await;
    assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
}

#[tokio::test]
async fn rejects_missing_or_empty_id_list() {
    let app = TestApp::new().await;
    app.seed_installment(1, dec!(10)).await;

    let response = app
        .request(Method::POST, "/acordos", Some(create_body(json!([]))))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_matches!(body["error"].as_str(), Some(msg) if msg.contains("mensalidade"));

    let mut missing = create_body(json!(null));
    missing.as_object_mut().unwrap().remove("mensalidadesIds");
    let response = app.request(Method::POST, "/acordos", Some(missing)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::POST, "/acordos", Some(create_body(json!("1,2"))))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.agreement_count().await, 0);
    assert_eq!(app.link_count().await, 0);
}

#[tokio::test]
async fn rejects_paid_or_unknown_installments_without_writing() {
    let app = TestApp::new().await;
    let open = app.seed_installment(1, dec!(100)).await;
    let paid = app.seed_paid_installment(2, dec!(100), Utc::now()).await;

    for ids in [json!([open.id, paid.id]), json!([open.id, 9_999])] {
        let response = app
            .request(Method::POST, "/acordos", Some(create_body(ids)))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Uma ou mais mensalidades não estão disponíveis para acordo."
        );
    }

    assert_eq!(app.agreement_count().await, 0);
    assert_eq!(app.link_count().await, 0);
}

#[tokio::test]
async fn rejects_duplicated_ids() {
    let app = TestApp::new().await;
    let inst = app.seed_installment(1, dec!(100)).await;

    let response = app
        .request(
            Method::POST,
            "/acordos",
            Some(create_body(json!([inst.id, inst.id]))),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.agreement_count().await, 0);
}

#[tokio::test]
async fn rejects_blank_text_fields_and_bad_dates() {
    let app = TestApp::new().await;
    let inst = app.seed_installment(1, dec!(100)).await;

    let mut body = create_body(json!([inst.id]));
    body["realizado_por"] = json!("");
    let response = app.request(Method::POST, "/acordos", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = create_body(json!([inst.id]));
    body["data_prevista"] = json!("10/01/2024");
    let response = app.request(Method::POST, "/acordos", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = create_body(json!([inst.id]));
    body["data_prevista"] = json!("+262142-12-31");
    let response = app.request(Method::POST, "/acordos", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.agreement_count().await, 0);
}

#[tokio::test]
async fn failure_after_agreement_insert_rolls_back() {
    let app = TestApp::new().await;
    let inst = app.seed_installment(1, dec!(100)).await;

    // Link insert fails once the agreement row is already written
    app.execute_sql("DROP TABLE agreement_installments").await;

    let response = app
        .request_with_headers(
            Method::POST,
            "/acordos",
            Some(create_body(json!([inst.id]))),
            &[("x-request-id", "rollback-1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        acordos_api::errors::GENERIC_ERROR_MESSAGE
    );
    assert_eq!(body["request_id"], "rollback-1");
    assert_eq!(app.agreement_count().await, 0);
}

#[tokio::test]
async fn open_installment_can_join_several_agreements() {
    let app = TestApp::new().await;
    let inst = app.seed_installment(1, dec!(80)).await;

    let first = app
        .request(Method::POST, "/acordos", Some(create_body(json!([inst.id]))))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Still open, so a second agreement over the same installment is allowed
    let second = app
        .request(Method::POST, "/acordos", Some(create_body(json!([inst.id]))))
        .await;
    assert_eq!(second.status(), StatusCode::CREATED);
    assert_eq!(app.link_count().await, 2);
}
