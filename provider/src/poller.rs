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

use codec::ErrorReport;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::handler::{Handler, Logger};
use crate::lambda::{Client, InvocationError, InvocationEvent, InvocationResponse};

/// The error type reported when a successful payload can't be encoded.
const SERIALIZATION_ERROR_TYPE: &str = "Runtime.SerializationError";

/// How long to wait before polling again after the runtime API returned no event.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Represents a shared shutdown flag.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates a new, unset `ShutdownFlag`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns whether the flag has been set.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Polls the Lambda event machinery using the specified client
/// and hands each invocation to a handler.
pub struct Poller<C> {
    client: C,
    handler: Box<dyn Handler>,
    logger: Arc<dyn Logger>,
    shutdown: ShutdownFlag,
    retry_delay: Duration,
}

impl<C: Client> Poller<C> {
    /// Creates a new `Poller`.
    pub fn new(
        client: C,
        handler: Box<dyn Handler>,
        logger: Arc<dyn Logger>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            client,
            handler,
            logger,
            shutdown,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Returns the poller with the specified delay between failed polls.
    pub fn with_retry_delay(self, retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            ..self
        }
    }

    /// Runs the poller until shutdown.
    pub fn run(&self) {
        info!("Starting poller for handler {}", self.handler.name());

        loop {
            if self.shutdown.is_set() {
                break;
            }

            // Get next event.
            debug!("Poller get next event");
            let event = match self.client.next_invocation_event() {
                Err(e) => {
                    error!("{}", e);
                    thread::sleep(self.retry_delay);
                    continue;
                }
                Ok(None) => {
                    warn!("No event");
                    thread::sleep(self.retry_delay);
                    continue;
                }
                Ok(Some(event)) => event,
            };

            self.process_event(&event);
        }

        info!("Poller for handler {} stopped", self.handler.name());
    }

    /// Invokes the handler for a single event and posts its outcome.
    /// Returns whether the handler was invoked.
    pub fn process_event(&self, event: &InvocationEvent) -> bool {
        let request_id = match event.request_id() {
            None => {
                warn!("No request ID");
                return false;
            }
            Some(request_id) => request_id,
        };

        // Set for the X-Ray SDK.
        if let Some(trace_id) = event.trace_id() {
            env::set_var("_X_AMZN_TRACE_ID", trace_id);
        }

        debug!("Invoking handler {} for {}", self.handler.name(), request_id);
        let outcome = self.handler.handle(event.body(), self.logger.as_ref());
        match outcome.into_result() {
            Ok(payload) => match codec::encode_success(&payload) {
                Ok(body) => self.send_invocation_response(body, request_id),
                Err(e) => {
                    error!("Unable to encode invocation response: {}", e);
                    let report = ErrorReport::new(&e.to_string(), SERIALIZATION_ERROR_TYPE);
                    self.send_invocation_error(report, request_id)
                }
            },
            Err(failure) => {
                debug!("Handler {} failed: {}", self.handler.name(), failure);
                self.send_invocation_error(ErrorReport::from_failure(&failure), request_id)
            }
        }

        true
    }

    /// Sends an invocation error.
    fn send_invocation_error(&self, report: ErrorReport, request_id: &str) {
        let err = InvocationError::new(report, request_id);
        debug!("Poller send error");
        if let Err(e) = self.client.send_invocation_error(err) {
            error!("Unable to send invocation error: {}", e);
        }
    }

    /// Sends an invocation response.
    fn send_invocation_response(&self, body: Vec<u8>, request_id: &str) {
        let resp = InvocationResponse::new(body, request_id);
        debug!("Poller send response");
        if let Err(e) = self.client.send_invocation_response(resp) {
            error!("Unable to send invocation response: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ErrorHandler, HelloHandler, LogLogger};
    use crate::lambda::RuntimeClient;
    use crate::tests_common::*;

    use std::time::Instant;

    fn poller<'a>(
        client: &'a MockClient,
        handler: Box<dyn Handler>,
        logger: &Arc<RecordingLogger>,
    ) -> Poller<&'a MockClient> {
        Poller::new(client, handler, logger.clone(), client.shutdown_flag())
            .with_retry_delay(Duration::from_millis(1))
    }

    #[test]
    fn hello_posts_response() {
        let client = MockClient::new(vec![Ok(Some(valid_event()))]);
        let logger = Arc::new(RecordingLogger::new());
        poller(&client, Box::new(HelloHandler), &logger).run();

        assert_eq!(
            client.responses(),
            vec![(REQUEST_ID.to_string(), br#""Hello, World!""#.to_vec())]
        );
        assert!(client.errors().is_empty());
        assert_eq!(logger.lines(), vec!["Hello, World!", "Another log"]);
    }

    #[test]
    fn error_posts_error() {
        let client = MockClient::new(vec![Ok(Some(valid_event()))]);
        let logger = Arc::new(RecordingLogger::new());
        poller(&client, Box::new(ErrorHandler), &logger).run();

        assert!(client.responses().is_empty());
        assert_eq!(
            client.errors(),
            vec![(
                REQUEST_ID.to_string(),
                ErrorReport::new("This is an error", "DeliberateFailure")
            )]
        );
        assert_eq!(logger.lines(), vec!["Hello, World!", "Another log"]);
    }

    #[test]
    fn every_event_is_handled_alike() {
        let client = MockClient::new(vec![
            Ok(Some(valid_event())),
            Ok(Some(InvocationEvent::new(vec![]).with_request_id("SECOND"))),
            Ok(Some(InvocationEvent::new(b"null".to_vec()).with_request_id("THIRD"))),
        ]);
        let logger = Arc::new(RecordingLogger::new());
        poller(&client, Box::new(HelloHandler), &logger).run();

        let responses = client.responses();
        let ids: Vec<&str> = responses.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec![REQUEST_ID, "SECOND", "THIRD"]);
        assert!(responses
            .iter()
            .all(|(_, body)| body.as_slice() == br#""Hello, World!""#));
        assert_eq!(logger.lines().len(), 6);
    }

    #[test]
    fn skips_event_without_request_id() {
        let client = MockClient::new(vec![Ok(Some(InvocationEvent::new(EVENT_BODY.to_vec())))]);
        let logger = Arc::new(RecordingLogger::new());
        let poller = poller(&client, Box::new(HelloHandler), &logger);

        assert!(!poller.process_event(&InvocationEvent::new(EVENT_BODY.to_vec())));
        poller.run();

        assert!(client.responses().is_empty());
        assert!(client.errors().is_empty());
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn survives_client_errors() {
        let client = MockClient::new(vec![
            Err(anyhow!("connection refused")),
            Ok(None),
            Ok(Some(valid_event())),
        ]);
        let logger = Arc::new(RecordingLogger::new());
        poller(&client, Box::new(ErrorHandler), &logger).run();

        assert_eq!(client.errors().len(), 1);
    }

    #[test]
    fn waits_between_failed_polls() {
        let client = MockClient::new(vec![
            Err(anyhow!("connection refused")),
            Err(anyhow!("connection refused")),
        ]);
        let logger = Arc::new(RecordingLogger::new());
        let delay = Duration::from_millis(25);
        let started = Instant::now();
        poller(&client, Box::new(HelloHandler), &logger)
            .with_retry_delay(delay)
            .run();

        // Two errors and the final empty poll each wait before retrying.
        assert!(started.elapsed() >= delay * 3);
        assert!(client.responses().is_empty());
    }

    #[test]
    fn only_handler_lines_logged_at_info() {
        let mut server = mockito::Server::new();
        let next = server
            .mock("GET", "/2018-06-01/runtime/invocation/next")
            .with_status(200)
            .with_header("Lambda-Runtime-Aws-Request-Id", REQUEST_ID)
            .with_body("{}")
            .expect(2)
            .create();
        let response = server
            .mock("POST", "/2018-06-01/runtime/invocation/REQUEST_ID/response")
            .with_status(202)
            .create();
        let error = server
            .mock("POST", "/2018-06-01/runtime/invocation/REQUEST_ID/error")
            .with_status(202)
            .create();

        let handlers: Vec<Box<dyn Handler>> = vec![Box::new(HelloHandler), Box::new(ErrorHandler)];
        for handler in handlers {
            let client = RuntimeClient::new(&server.url()).unwrap();
            let poller = Poller::new(client, handler, Arc::new(LogLogger), ShutdownFlag::new());

            let lines = capture_info_lines(|| {
                let event = poller.client.next_invocation_event().unwrap().unwrap();
                assert!(poller.process_event(&event));
            });
            assert_eq!(lines, vec!["Hello, World!", "Another log"]);
        }

        next.assert();
        response.assert();
        error.assert();
    }

    #[test]
    fn survives_send_failures() {
        let client = MockClient::failing_sends(vec![Ok(Some(valid_event())), Ok(Some(valid_event()))]);
        let logger = Arc::new(RecordingLogger::new());
        poller(&client, Box::new(HelloHandler), &logger).run();

        assert_eq!(logger.lines().len(), 4);
    }

    #[test]
    fn sets_trace_id() {
        let event = valid_event().with_trace_id(TRACE_ID);
        let client = MockClient::new(vec![]);
        let logger = Arc::new(RecordingLogger::new());

        assert!(poller(&client, Box::new(HelloHandler), &logger).process_event(&event));
        assert_eq!(env::var("_X_AMZN_TRACE_ID").unwrap(), TRACE_ID);
    }

    #[test]
    fn stops_on_shutdown() {
        let client = MockClient::new(vec![Ok(Some(valid_event()))]);
        let logger = Arc::new(RecordingLogger::new());
        client.shutdown_flag().set();
        poller(&client, Box::new(HelloHandler), &logger).run();

        assert!(client.responses().is_empty());
        assert!(logger.lines().is_empty());
    }
}
