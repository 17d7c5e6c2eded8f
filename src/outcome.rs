// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::ErrorBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InternalError,
    NotFound,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InternalError => "internal_error",
            FailureKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure carried by [`Outcome::Failure`].
///
/// The message list always holds at least one entry: the constructors take the
/// first message separately and the fields are not publicly writable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    kind: FailureKind,
    messages: Vec<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            messages: vec![message.into()],
        }
    }

    /// Builds a failure whose first message is `message`, followed by `causes` in order.
    pub fn with_causes<I>(kind: FailureKind, message: impl Into<String>, causes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut messages = vec![message.into()];
        messages.extend(causes.into_iter().map(Into::into));
        Self { kind, messages }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InternalError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The leading message; always present.
    pub fn message(&self) -> &str {
        &self.messages[0]
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.messages.join(": "))
    }
}

impl std::error::Error for Failure {}

impl From<&Failure> for ErrorBody {
    fn from(failure: &Failure) -> Self {
        ErrorBody {
            code: failure.kind.as_str().to_string(),
            message: failure.messages.join(": "),
        }
    }
}

impl From<Failure> for ErrorBody {
    fn from(failure: Failure) -> Self {
        ErrorBody::from(&failure)
    }
}

/// Result of a remote operation: either the payload or a [`Failure`].
///
/// There is no payload on the failure side, so a default or empty value can
/// never be mistaken for real data.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Failure(failure) => Some(failure.kind()),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(value),
            Outcome::Failure(failure) => Outcome::Failure(failure.clone()),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    pub fn and_then<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        match self {
            Outcome::Ok(value) => f(value),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Outcome::Failure(failure)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_keeps_leading_message_before_causes() {
        let failure = Failure::with_causes(
            FailureKind::InternalError,
            "Data provider error",
            vec!["connection refused", "os error 111"],
        );

        assert_eq!(failure.kind(), FailureKind::InternalError);
        assert_eq!(failure.message(), "Data provider error");
        assert_eq!(
            failure.messages(),
            &[
                "Data provider error".to_string(),
                "connection refused".to_string(),
                "os error 111".to_string(),
            ]
        );
    }

    #[test]
    fn failure_without_causes_still_has_one_message() {
        let failure = Failure::with_causes(FailureKind::NotFound, "missing", Vec::<String>::new());

        assert_eq!(failure.messages().len(), 1);
        assert_eq!(failure.to_string(), "not_found: missing");
    }

    #[test]
    fn outcome_accessors_never_yield_payload_on_failure() {
        let outcome: Outcome<u32> = Outcome::Failure(Failure::not_found("gone"));

        assert!(outcome.is_failure());
        assert!(!outcome.is_ok());
        assert_eq!(outcome.kind(), Some(FailureKind::NotFound));
        assert_eq!(outcome.as_ref().ok(), None);
        assert_eq!(outcome.clone().map(|v| v + 1).ok(), None);
        assert_eq!(
            outcome.into_result().unwrap_err().messages(),
            &["gone".to_string()]
        );
    }

    #[test]
    fn outcome_map_and_then_thread_the_payload() {
        let outcome = Outcome::Ok(20).map(|v| v + 1).and_then(|v| {
            if v > 20 {
                Outcome::Ok(v * 2)
            } else {
                Outcome::Failure(Failure::internal_error("too small"))
            }
        });

        assert_eq!(outcome, Outcome::Ok(42));
        assert_eq!(outcome.kind(), None);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let ok = serde_json::to_value(Outcome::Ok(json!({ "amount": 42 }))).unwrap();
        assert_eq!(ok, json!({ "status": "ok", "data": { "amount": 42 } }));

        let unit = serde_json::to_value(Outcome::Ok(())).unwrap();
        assert_eq!(unit, json!({ "status": "ok", "data": null }));

        let failure = serde_json::to_value(Outcome::<()>::Failure(Failure::with_causes(
            FailureKind::InternalError,
            "Event publishing error",
            ["sidecar unreachable"],
        )))
        .unwrap();
        assert_eq!(
            failure,
            json!({
                "status": "failure",
                "data": {
                    "kind": "internal_error",
                    "messages": ["Event publishing error", "sidecar unreachable"]
                }
            })
        );
    }

    #[test]
    fn failure_converts_to_error_body() {
        let body = ErrorBody::from(Failure::with_causes(
            FailureKind::InternalError,
            "Data provider error",
            ["timeout"],
        ));

        assert_eq!(body.code, "internal_error");
        assert_eq!(body.message, "Data provider error: timeout");
    }

    #[test]
    fn result_converts_into_outcome() {
        let ok: Outcome<&str> = Ok::<_, Failure>("value").into();
        assert_eq!(ok, Outcome::Ok("value"));

        let failed: Outcome<&str> = Err(Failure::not_found("nope")).into();
        assert_eq!(failed.kind(), Some(FailureKind::NotFound));
    }
}
