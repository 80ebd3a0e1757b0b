//! Form payloads submitted by the back-office and their validation.
//!
//! Every form is a plain `Deserialize + Validate` struct holding the raw
//! submitted values. `into_new` and `into_patch` run the `validator` rules,
//! then the domain constructors, collecting every failure per field before
//! anything reaches the Gateway.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::record::Record;
use crate::domain::types::{Email, Money, TypeConstraintError};

pub mod access;
pub mod finance;
pub mod projects;
pub mod registry;
pub mod tickets;

/// Field name to messages, ordered by field for stable output.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form validation failed: {}", describe(.0))]
    Validation(FieldErrors),
    #[error("form contains invalid data: {0}")]
    TypeConstraint(String),
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    /// Single-field validation error.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::TypeConstraint(_) => None,
        }
    }
}

impl From<ValidationErrors> for FormError {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, field_errors) in value.field_errors() {
            let messages = errors.entry(field.to_string()).or_default();
            for error in field_errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                };
                messages.push(message);
            }
        }
        Self::Validation(errors)
    }
}

impl From<TypeConstraintError> for FormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Form that creates and edits records of one family.
pub trait RecordForm<R: Record> {
    fn into_new(self) -> Result<R::New, FormError>;
    /// `current` is the persisted record being edited.
    fn into_patch(self, current: &R) -> Result<R::Patch, FormError>;
}

/// Implements [`RecordForm`] by delegating to the form's inherent
/// `into_new` and `into_patch`.
macro_rules! record_form {
    ($form:ty => $record:ty) => {
        impl $crate::forms::RecordForm<$record> for $form {
            fn into_new(
                self,
            ) -> Result<<$record as $crate::domain::record::Record>::New, $crate::forms::FormError>
            {
                <$form>::into_new(self)
            }

            fn into_patch(
                self,
                _current: &$record,
            ) -> Result<<$record as $crate::domain::record::Record>::Patch, $crate::forms::FormError>
            {
                <$form>::into_patch(self)
            }
        }
    };
}

pub(crate) use record_form;

/// Accumulates field failures across `validator` rules and domain
/// constructors.
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    /// Starts with the `validator` failures of `form`.
    pub fn validate<F: Validate>(form: &F) -> Self {
        match form.validate() {
            Ok(()) => Self::default(),
            Err(errors) => match FormError::from(errors) {
                FormError::Validation(errors) => Self { errors },
                FormError::TypeConstraint(_) => Self::default(),
            },
        }
    }

    /// Records the error of `result` under `field` unless that field already
    /// failed.
    pub fn take<T, E: Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if !self.errors.contains_key(field) {
                    self.push(field, err.to_string());
                }
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), FormError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Validation(self.errors))
        }
    }

    pub fn into_error(self) -> FormError {
        FormError::Validation(self.errors)
    }
}

/// Value of a foreign-key select.
///
/// `Unselected` is what an untouched select (or one whose options are still
/// loading) submits; it is distinct from an explicit "no relation" choice
/// and is rejected at submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChoice", into = "String")]
pub enum RelationChoice {
    #[default]
    Unselected,
    None,
    Some(i32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChoice {
    Id(i32),
    Text(String),
}

pub const NONE_CHOICE: &str = "none";

impl TryFrom<RawChoice> for RelationChoice {
    type Error = String;

    fn try_from(value: RawChoice) -> Result<Self, Self::Error> {
        match value {
            RawChoice::Id(id) if id > 0 => Ok(Self::Some(id)),
            RawChoice::Id(id) => Err(format!("invalid relation id: {id}")),
            RawChoice::Text(text) => Self::try_from(text.as_str()),
        }
    }
}

impl TryFrom<&str> for RelationChoice {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "" => Ok(Self::Unselected),
            NONE_CHOICE => Ok(Self::None),
            other => match other.parse::<i32>() {
                Ok(id) if id > 0 => Ok(Self::Some(id)),
                _ => Err(format!("invalid relation id: {other}")),
            },
        }
    }
}

impl From<RelationChoice> for String {
    fn from(value: RelationChoice) -> Self {
        match value {
            RelationChoice::Unselected => String::new(),
            RelationChoice::None => NONE_CHOICE.to_string(),
            RelationChoice::Some(id) => id.to_string(),
        }
    }
}

impl RelationChoice {
    /// Prefill value for a nullable foreign key.
    pub fn from_optional<I: Into<i32>>(id: Option<I>) -> Self {
        match id {
            Some(id) => Self::Some(id.into()),
            None => Self::None,
        }
    }

    /// Resolves a nullable relation. `None` is a valid answer.
    pub fn optional<T>(
        self,
        ctor: impl FnOnce(i32) -> Result<T, TypeConstraintError>,
    ) -> Result<Option<T>, TypeConstraintError> {
        match self {
            Self::Unselected => Err(TypeConstraintError::InvalidValue(
                "select an option or \"none\"".to_string(),
            )),
            Self::None => Ok(None),
            Self::Some(id) => ctor(id).map(Some),
        }
    }

    /// Resolves a mandatory relation.
    pub fn required<T>(
        self,
        ctor: impl FnOnce(i32) -> Result<T, TypeConstraintError>,
    ) -> Result<T, TypeConstraintError> {
        match self {
            Self::Some(id) => ctor(id),
            Self::Unselected | Self::None => Err(TypeConstraintError::InvalidValue(
                "an option must be selected".to_string(),
            )),
        }
    }
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Trims and drops blank optional text.
pub fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_date(text: &str) -> Result<NaiveDate, TypeConstraintError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| TypeConstraintError::InvalidValue(format!("invalid date: {}", text.trim())))
}

pub fn parse_optional_date(text: Option<&str>) -> Result<Option<NaiveDate>, TypeConstraintError> {
    blank_to_none(text).map(|t| parse_date(&t)).transpose()
}

pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, TypeConstraintError> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| TypeConstraintError::InvalidValue(format!("invalid date and time: {text}")))
}

pub fn parse_optional_email(text: Option<&str>) -> Result<Option<Email>, TypeConstraintError> {
    blank_to_none(text).map(Email::new).transpose()
}

/// Parses an enumerated value from its persisted text form.
pub fn parse_choice<'a, T>(text: &'a str) -> Result<T, TypeConstraintError>
where
    T: TryFrom<&'a str, Error = TypeConstraintError>,
{
    T::try_from(text)
}

pub fn parse_optional_choice<'a, T>(text: Option<&'a str>) -> Result<Option<T>, TypeConstraintError>
where
    T: TryFrom<&'a str, Error = TypeConstraintError>,
{
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => T::try_from(text).map(Some),
        None => Ok(None),
    }
}

/// Formats an amount for prefilling a money input.
pub fn money_input(amount: Money) -> String {
    amount.to_string()
}

pub fn date_input(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_choice_distinguishes_none_from_unselected() {
        assert_eq!(
            RelationChoice::try_from("").unwrap(),
            RelationChoice::Unselected
        );
        assert_eq!(
            RelationChoice::try_from("none").unwrap(),
            RelationChoice::None
        );
        assert_eq!(
            RelationChoice::try_from("7").unwrap(),
            RelationChoice::Some(7)
        );
        assert!(RelationChoice::try_from("-1").is_err());

        assert_eq!(RelationChoice::None.optional(Ok), Ok(None));
        assert!(RelationChoice::Unselected.optional(Ok).is_err());
        assert!(RelationChoice::None.required(Ok).is_err());
    }

    #[test]
    fn relation_choice_accepts_json_numbers_and_text() {
        let from_number: RelationChoice = serde_json::from_str("3").unwrap();
        let from_text: RelationChoice = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(from_number, RelationChoice::Some(3));
        assert_eq!(from_text, RelationChoice::None);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"none\"");
    }

    #[test]
    fn prefill_maps_missing_relation_to_none_sentinel() {
        assert_eq!(
            RelationChoice::from_optional(None::<i32>),
            RelationChoice::None
        );
        assert_eq!(RelationChoice::from_optional(Some(4)), RelationChoice::Some(4));
    }

    #[test]
    fn field_check_keeps_first_error_per_field() {
        let mut check = FieldCheck::default();
        let missing: Option<i32> = check.take("amount", Err::<i32, _>("must be positive"));
        assert!(missing.is_none());
        check.take("amount", Err::<i32, _>("second"));
        let err = check.finish().unwrap_err();
        assert_eq!(
            err.field_errors().unwrap()["amount"],
            vec!["must be positive".to_string()]
        );
    }

    #[test]
    fn parses_dates_and_blank_optionals() {
        assert_eq!(
            parse_date("2025-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2025").is_err());
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(blank_to_none(Some("  x ")), Some("x".to_string()));
        assert!(parse_datetime("2025-03-01T20:30").is_ok());
    }
}
