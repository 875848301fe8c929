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

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub use codec::{DeliberateFailure, ErrorReport, Outcome};

pub use crate::config::{runtime_endpoint_from_env, Config, ConfigError};
pub use crate::dispatch::{handler_by_name, DEFAULT_HANDLER, HANDLER_NAMES};
pub use crate::handler::{ErrorHandler, Handler, HelloHandler, LogLogger, Logger};
pub use crate::lambda::{
    initerr_reporter, Client, InitializationErrorReporter, InvocationError, InvocationEvent,
    InvocationResponse, RuntimeClient,
};
pub use crate::poller::{Poller, ShutdownFlag};

mod config;
mod dispatch;
mod handler;
mod lambda;
mod poller;
