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

use codec::Outcome;

/// The first line every handler logs.
pub const GREETING: &str = "Hello, World!";

/// The second line every handler logs.
pub const ANOTHER_LOG: &str = "Another log";

/// The message of the error handler's failure.
pub const ERROR_MESSAGE: &str = "This is an error";

/// Represents the capability to write a line to the function's log stream.
pub trait Logger: Send + Sync {
    /// Writes a single line.
    fn log(&self, line: &str);
}

/// A `Logger` that writes through the `log` facade.
/// Lambda forwards the process's stderr to CloudWatch Logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogLogger;

impl Logger for LogLogger {
    fn log(&self, line: &str) {
        info!("{}", line);
    }
}

/// Represents a Lambda function handler.
pub trait Handler: Send + Sync {
    /// Returns the name the handler is registered under.
    fn name(&self) -> &'static str;

    /// Handles a single invocation event.
    fn handle(&self, event: &[u8], logger: &dyn Logger) -> Outcome;
}

/// Logs the two lines and fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub const NAME: &'static str = "error";
}

impl Handler for ErrorHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, _event: &[u8], logger: &dyn Logger) -> Outcome {
        logger.log(GREETING);
        logger.log(ANOTHER_LOG);
        Outcome::failure(ERROR_MESSAGE)
    }
}

/// Logs the two lines and succeeds with a greeting.
#[derive(Clone, Copy, Debug, Default)]
pub struct HelloHandler;

impl HelloHandler {
    pub const NAME: &'static str = "hello";
}

impl Handler for HelloHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, _event: &[u8], logger: &dyn Logger) -> Outcome {
        logger.log(GREETING);
        logger.log(ANOTHER_LOG);
        Outcome::success(GREETING)
    }
}
