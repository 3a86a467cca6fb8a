use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::errors::ServiceError;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Dados inválidos: {}", e)))
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its own calendar date.
///
/// Years outside 1..=9999 are rejected.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .filter(|date| (1..=9999).contains(&date.year()))
}

/// serde adapter for [`parse_calendar_date`].
pub fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "data inválida '{}': use AAAA-MM-DD ou RFC 3339",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-01-10", Some((2024, 1, 10)))]
    #[case(" 2024-01-10 ", Some((2024, 1, 10)))]
    #[case("2024-01-10T00:00:00.000Z", Some((2024, 1, 10)))]
    #[case("2024-01-10T22:30:00-03:00", Some((2024, 1, 10)))]
    #[case("2024-01-10T01:00:00+05:00", Some((2024, 1, 10)))]
    #[case("9999-12-31", Some((9999, 12, 31)))]
    #[case("+262142-12-31", None)]
    #[case("+10000-01-01", None)]
    #[case("0000-01-01", None)]
    #[case("-0001-01-01", None)]
    #[case("10/01/2024", None)]
    #[case("2024-02-30", None)]
    #[case("", None)]
    fn calendar_date_formats(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_calendar_date(raw), expected);
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_calendar_date")]
        date: NaiveDate,
    }

    #[test]
    fn deserializer_rejects_garbage() {
        let ok: Holder = serde_json::from_str(r#"{"date":"2024-03-01"}"#).unwrap();
        assert_eq!(ok.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let err = serde_json::from_str::<Holder>(r#"{"date":"amanhã"}"#).unwrap_err();
        assert!(err.to_string().contains("data inválida"));
    }
}
