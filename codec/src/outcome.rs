// Copyright 2015-2020 Capital One Services, LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//
// AWS Lambda Hello Codec
//

use thiserror::Error;

/// The terminal result of a single invocation.
/// Exactly one variant is produced per invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A successful invocation carrying a literal textual payload.
    Success(String),
    /// A failed invocation carrying a literal error message.
    Failure(String),
}

impl Outcome {
    /// Returns a success outcome with the specified payload.
    pub fn success(payload: &str) -> Self {
        Outcome::Success(payload.into())
    }

    /// Returns a failure outcome with the specified message.
    pub fn failure(message: &str) -> Self {
        Outcome::Failure(message.into())
    }

    /// Returns whether this is a success outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Converts the outcome into a `Result`.
    /// A failure becomes a non-retryable `DeliberateFailure`.
    pub fn into_result(self) -> Result<String, DeliberateFailure> {
        match self {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(message) => Err(DeliberateFailure::new(&message)),
        }
    }
}

/// An application error deliberately returned by a handler.
/// It is surfaced verbatim to the platform and never retried.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct DeliberateFailure {
    message: String,
}

impl DeliberateFailure {
    /// The error type name reported to AWS Lambda.
    pub const ERROR_TYPE: &'static str = "DeliberateFailure";

    /// Creates a new `DeliberateFailure` with the specified message.
    pub fn new(message: &str) -> Self {
        DeliberateFailure {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error type name.
    pub fn error_type(&self) -> &'static str {
        Self::ERROR_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_into_result() {
        let outcome = Outcome::success("Hello, World!");
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result(), Ok("Hello, World!".to_string()));
    }

    #[test]
    fn failure_into_result() {
        let outcome = Outcome::failure("This is an error");
        assert!(!outcome.is_success());

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.message(), "This is an error");
        assert_eq!(err.to_string(), "This is an error");
        assert_eq!(err.error_type(), "DeliberateFailure");
    }
}
