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

use crate::handler::{ErrorHandler, Handler, HelloHandler};

/// The names of the registered example handlers.
pub const HANDLER_NAMES: &[&str] = &[ErrorHandler::NAME, HelloHandler::NAME];

/// The handler run when none is configured.
pub const DEFAULT_HANDLER: &str = ErrorHandler::NAME;

/// Returns the registered handler with the specified name.
pub fn handler_by_name(name: &str) -> anyhow::Result<Box<dyn Handler>> {
    match name.trim() {
        ErrorHandler::NAME => Ok(Box::new(ErrorHandler)),
        HelloHandler::NAME => Ok(Box::new(HelloHandler)),
        other => Err(anyhow!(
            "Unknown handler `{}`, expected one of: {}",
            other,
            HANDLER_NAMES.join(", ")
        )),
    }
}
