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
// AWS Lambda Hello Runtime Provider
//

use codec::{ErrorReport, ERROR_TYPE_HEADER};
use reqwest::blocking::Response;

use std::time::Duration;

const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const TRACE_ID_HEADER: &str = "Lambda-Runtime-Trace-Id";
const DEADLINE_MS_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const FUNCTION_ARN_HEADER: &str = "Lambda-Runtime-Invoked-Function-Arn";

/// Represents an invocation event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvocationEvent {
    body: Vec<u8>,
    request_id: Option<String>,
    trace_id: Option<String>,
    deadline_ms: Option<u64>,
    invoked_function_arn: Option<String>,
}

/// Represents an invocation response.
#[derive(Debug)]
pub struct InvocationResponse {
    body: Vec<u8>,
    request_id: String,
}

/// Represents an invocation error.
#[derive(Debug)]
pub struct InvocationError {
    report: ErrorReport,
    request_id: String,
}

/// Represents an AWS Lambda runtime client.
pub trait Client {
    /// Returns the next AWS Lambda invocation event.
    fn next_invocation_event(&self) -> anyhow::Result<Option<InvocationEvent>>;

    /// Sends an invocation error to the AWS Lambda runtime.
    fn send_invocation_error(&self, error: InvocationError) -> anyhow::Result<()>;

    /// Sends an invocation response to the AWS Lambda runtime.
    fn send_invocation_response(&self, resp: InvocationResponse) -> anyhow::Result<()>;
}

impl<T: Client + ?Sized> Client for &T {
    fn next_invocation_event(&self) -> anyhow::Result<Option<InvocationEvent>> {
        (**self).next_invocation_event()
    }

    fn send_invocation_error(&self, error: InvocationError) -> anyhow::Result<()> {
        (**self).send_invocation_error(error)
    }

    fn send_invocation_response(&self, resp: InvocationResponse) -> anyhow::Result<()> {
        (**self).send_invocation_response(resp)
    }
}

/// Represents reporting an initialization error to AWS Lambda.
pub trait InitializationErrorReporter {
    /// Sends an initialization error to the AWS Lambda runtime.
    fn send_initialization_error(&self, report: &ErrorReport) -> anyhow::Result<()>;
}

/// Returns an `InitializationErrorReporter` for the specified AWS Lambda runtime API endpoint.
pub fn initerr_reporter(endpoint: &str) -> anyhow::Result<impl InitializationErrorReporter> {
    RuntimeClient::new(endpoint)
}

/// Represents an AWS Lambda runtime HTTP client.
pub struct RuntimeClient {
    endpoint: String,
    http_client: reqwest::blocking::Client,
}

impl RuntimeClient {
    /// Creates a new `RuntimeClient` with the specified AWS Lambda runtime API endpoint.
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        // The next-event request blocks until an invocation arrives.
        let http_client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;

        Ok(RuntimeClient {
            endpoint: endpoint.trim_end_matches('/').into(),
            http_client,
        })
    }

    /// Posts a JSON error report to the specified path.
    fn post_error(&self, path: &str, report: &ErrorReport) -> anyhow::Result<()> {
        let url = format!("{}{}", self.endpoint, path);
        let resp = self
            .http_client
            .post(&url)
            .header(ERROR_TYPE_HEADER, report.error_type.as_str())
            .json(report)
            .send()?;
        check_status("POST", &url, &resp)
    }
}

impl Client for RuntimeClient {
    fn next_invocation_event(&self) -> anyhow::Result<Option<InvocationEvent>> {
        // https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html#runtimes-api-next
        let url = format!("{}/2018-06-01/runtime/invocation/next", self.endpoint);
        let resp = self.http_client.get(&url).send()?;
        let status = resp.status();
        debug!(
            "GET {} {} {}",
            url,
            status.as_str(),
            status.canonical_reason().unwrap_or_default()
        );
        if !status.is_success() {
            return Ok(None);
        }

        // The invocation is already handed out, so only a bad request ID
        // may fail the fetch. Other headers are dropped with a warning.
        let headers = resp.headers();
        let request_id = match headers.get(REQUEST_ID_HEADER) {
            Some(value) => Some(value.to_str()?.to_string()),
            None => None,
        };
        let header = |name: &str| -> Option<String> {
            match headers.get(name)?.to_str() {
                Ok(value) => Some(value.into()),
                Err(e) => {
                    warn!("Ignoring {} header: {}", name, e);
                    None
                }
            }
        };
        let trace_id = header(TRACE_ID_HEADER);
        let invoked_function_arn = header(FUNCTION_ARN_HEADER);
        let deadline_ms = header(DEADLINE_MS_HEADER).and_then(|ms| match ms.parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(e) => {
                warn!("Ignoring {} `{}`: {}", DEADLINE_MS_HEADER, ms, e);
                None
            }
        });

        let body = resp.bytes()?.to_vec();

        Ok(Some(InvocationEvent {
            body,
            request_id,
            trace_id,
            deadline_ms,
            invoked_function_arn,
        }))
    }

    fn send_invocation_error(&self, error: InvocationError) -> anyhow::Result<()> {
        // https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html#runtimes-api-invokeerror
        let path = format!("/2018-06-01/runtime/invocation/{}/error", error.request_id);
        self.post_error(&path, &error.report)
    }

    fn send_invocation_response(&self, resp: InvocationResponse) -> anyhow::Result<()> {
        // https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html#runtimes-api-response
        let url = format!(
            "{}/2018-06-01/runtime/invocation/{}/response",
            self.endpoint, resp.request_id
        );
        let resp = self.http_client.post(&url).body(resp.body).send()?;
        check_status("POST", &url, &resp)
    }
}

impl InitializationErrorReporter for RuntimeClient {
    fn send_initialization_error(&self, report: &ErrorReport) -> anyhow::Result<()> {
        // https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html#runtimes-api-initerror
        self.post_error("/2018-06-01/runtime/init/error", report)
    }
}

/// Logs the response status and fails on anything but success.
fn check_status(method: &str, url: &str, resp: &Response) -> anyhow::Result<()> {
    let status = resp.status();
    debug!(
        "{} {} {} {}",
        method,
        url,
        status.as_str(),
        status.canonical_reason().unwrap_or_default()
    );
    if !status.is_success() {
        return Err(anyhow!("{} {} returned status {}", method, url, status));
    }

    Ok(())
}

impl InvocationEvent {
    /// Creates a new `InvocationEvent` with the specified body.
    pub fn new(body: Vec<u8>) -> Self {
        InvocationEvent {
            body,
            ..Default::default()
        }
    }

    /// Returns the event with the specified request ID.
    pub fn with_request_id(self, request_id: &str) -> Self {
        InvocationEvent {
            request_id: Some(request_id.into()),
            ..self
        }
    }

    /// Returns the event with the specified trace ID.
    pub fn with_trace_id(self, trace_id: &str) -> Self {
        InvocationEvent {
            trace_id: Some(trace_id.into()),
            ..self
        }
    }

    /// Returns the event body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns any request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns any trace ID.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Returns any invocation deadline, in milliseconds since the Unix epoch.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Returns any invoked function ARN.
    pub fn invoked_function_arn(&self) -> Option<&str> {
        self.invoked_function_arn.as_deref()
    }
}

impl InvocationResponse {
    /// Creates a new `InvocationResponse` with the specified body and request ID.
    pub fn new(body: Vec<u8>, request_id: &str) -> Self {
        InvocationResponse {
            body,
            request_id: request_id.into(),
        }
    }

    /// Returns the response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl InvocationError {
    /// Creates a new `InvocationError` with the specified report and request ID.
    pub fn new(report: ErrorReport, request_id: &str) -> Self {
        InvocationError {
            report,
            request_id: request_id.into(),
        }
    }

    /// Returns the error report.
    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}
