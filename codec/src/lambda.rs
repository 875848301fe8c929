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

use crate::outcome::DeliberateFailure;

/// The header that carries a function error's type on an invocation error post.
pub const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

/// Describes an error reported to AWS Lambda.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// The human-readable error message.
    pub error_message: String,
    /// The error type name.
    pub error_type: String,
}

impl ErrorReport {
    /// Returns a new `ErrorReport`.
    pub fn new(error_message: &str, error_type: &str) -> Self {
        ErrorReport {
            error_message: error_message.into(),
            error_type: error_type.into(),
        }
    }

    /// Returns the report for a handler's deliberate failure.
    pub fn from_failure(failure: &DeliberateFailure) -> Self {
        Self::new(failure.message(), failure.error_type())
    }
}

/// Returns the response body for a successful invocation:
/// the payload encoded as a JSON string.
pub fn encode_success(payload: &str) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(payload)
}
