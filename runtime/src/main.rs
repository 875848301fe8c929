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
// AWS Lambda Hello Runtime
//

#[macro_use]
extern crate log;

use env_logger::Env;
use provider::{
    handler_by_name, initerr_reporter, runtime_endpoint_from_env, Config, ErrorReport,
    InitializationErrorReporter, LogLogger, Poller, RuntimeClient, ShutdownFlag,
};

use std::sync::Arc;

const INIT_ERROR_TYPE: &str = "Runtime.InitError";

// Entry point.
fn main() -> anyhow::Result<()> {
    if env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_err()
    {
        info!("Logger already initialized");
    }

    info!("aws-lambda-hello-runtime starting");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Some(endpoint) = runtime_endpoint_from_env() {
                report_initialization_error(&endpoint, &e.to_string());
            }
            return Err(e.into());
        }
    };
    info!(
        "Function {} version {} ({} MB), log stream {}/{}",
        config.function_name().unwrap_or("-"),
        config.function_version().unwrap_or("-"),
        config
            .memory_size()
            .map_or_else(|| "-".into(), |mb| mb.to_string()),
        config.log_group_name().unwrap_or("-"),
        config.log_stream_name().unwrap_or("-"),
    );

    let endpoint = config.runtime_endpoint();
    let handler = match handler_by_name(config.handler()) {
        Ok(handler) => handler,
        Err(e) => {
            report_initialization_error(&endpoint, &e.to_string());
            return Err(e);
        }
    };

    let client = RuntimeClient::new(&endpoint)?;
    let poller = Poller::new(client, handler, Arc::new(LogLogger), ShutdownFlag::new());
    poller.run();

    Ok(())
}

// Reports an error that stopped the runtime from starting.
fn report_initialization_error(endpoint: &str, message: &str) {
    error!("{}", message);

    let report = ErrorReport::new(message, INIT_ERROR_TYPE);
    let result = initerr_reporter(endpoint).and_then(|r| r.send_initialization_error(&report));
    if let Err(e) = result {
        error!("Unable to send initialization error: {}", e);
    }
}
