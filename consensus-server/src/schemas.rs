use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use consensus_core::{ActivityCounts, Category, IdType};

use crate::errors::ServerError;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupSchema {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct LocationSchema {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// Parameters for a new lobby, as the client sends them. The date and the
/// activity counts arrive as strings and are parsed into domain types by
/// the handler; the remaining range checks live in the core validator.
#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewLobbySchema {
    pub host_id: IdType,
    #[validate(nested)]
    pub location: LocationSchema,
    pub radius: f64,
    /// MM/DD/YYYY
    pub date: String,
    pub start_hour: u32,
    pub end_hour: u32,
    pub activity_counts: HashMap<String, u32>,
    pub max_members: Option<usize>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinSchema {
    #[validate(length(min = 1))]
    pub code: String,
    pub user_id: IdType,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadySchema {
    pub ready: bool,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartSchema {
    pub user_id: IdType,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteSchema {
    pub user_id: IdType,
    pub round_number: u32,
    #[validate(length(min = 1))]
    pub option_id: String,
    pub vote: bool,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteSchema {
    pub user_id: IdType,
    #[validate(length(min = 1))]
    pub selected_option_id: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveSchema {
    pub user_id: IdType,
    pub from_index: usize,
    pub to_index: usize,
}

/// Parses a wire date. The client always sends MM/DD/YYYY.
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate, ServerError> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y")
        .map_err(|_| ServerError::Validation(format!("date must be MM/DD/YYYY, got {raw:?}")))
}

/// Converts the client's string-keyed counts into the closed category set,
/// rejecting unknown keys. Duplicate keys differing only in case add up.
pub fn parse_activity_counts(raw: &HashMap<String, u32>) -> Result<ActivityCounts, ServerError> {
    let mut counts = ActivityCounts::new();

    for (key, &count) in raw {
        let category = key
            .parse::<Category>()
            .map_err(|e| ServerError::Validation(e.to_string()))?;

        counts.set(category, counts.get(category) + count);
    }

    Ok(counts)
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| ServerError::Validation(format!("malformed request body: {e}")))?;

        extracted_json
            .0
            .validate()
            .map_err(|e| ServerError::Validation(first_violation(&e)))?;

        Ok(Self(extracted_json.0))
    }
}

fn first_violation(errors: &ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            return match &error.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field} failed the {} check", error.code),
            };
        }
    }

    "request body is invalid".to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_dates() {
        let date = parse_wire_date("09/02/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 9, 2).unwrap());

        assert!(parse_wire_date("2026-09-02").is_err());
        assert!(parse_wire_date("13/40/2026").is_err());
    }

    #[test]
    fn test_activity_count_parsing() {
        let raw: HashMap<String, u32> =
            [("FOOD".to_string(), 2), ("nature".to_string(), 1)]
                .into_iter()
                .collect();

        let counts = parse_activity_counts(&raw).unwrap();

        assert_eq!(counts.get(Category::Food), 2);
        assert_eq!(counts.get(Category::Nature), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_unknown_categories_are_rejected() {
        let raw: HashMap<String, u32> = [("NIGHTLIFE".to_string(), 1)].into_iter().collect();

        assert!(matches!(
            parse_activity_counts(&raw),
            Err(ServerError::Validation(_))
        ));
    }
}
