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

use thiserror::Error;

use std::env;

use crate::dispatch::DEFAULT_HANDLER;

const RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";
const HANDLER: &str = "_HANDLER";
const FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";
const FUNCTION_VERSION: &str = "AWS_LAMBDA_FUNCTION_VERSION";
const FUNCTION_MEMORY_SIZE: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
const LOG_GROUP_NAME: &str = "AWS_LAMBDA_LOG_GROUP_NAME";
const LOG_STREAM_NAME: &str = "AWS_LAMBDA_LOG_STREAM_NAME";

/// Errors raised while loading the function settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration value {name}: `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// The function settings, taken from the Lambda environment variables:
/// https://docs.aws.amazon.com/lambda/latest/dg/configuration-envvars.html
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    runtime_api: String,
    handler: String,
    function_name: Option<String>,
    function_version: Option<String>,
    memory_size: Option<u32>,
    log_group_name: Option<String>,
    log_stream_name: Option<String>,
}

impl Config {
    /// Loads the function settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the function settings using the specified variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let memory_size = match var(FUNCTION_MEMORY_SIZE) {
            Some(v) => Some(v.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: FUNCTION_MEMORY_SIZE,
                value: v.clone(),
            })?),
            None => None,
        };

        Ok(Config {
            runtime_api: var(RUNTIME_API).ok_or(ConfigError::Missing(RUNTIME_API))?,
            handler: var(HANDLER).unwrap_or_else(|| DEFAULT_HANDLER.into()),
            function_name: var(FUNCTION_NAME),
            function_version: var(FUNCTION_VERSION),
            memory_size,
            log_group_name: var(LOG_GROUP_NAME),
            log_stream_name: var(LOG_STREAM_NAME),
        })
    }

    /// Returns the base URL of the runtime API.
    pub fn runtime_endpoint(&self) -> String {
        format!("http://{}", self.runtime_api)
    }

    /// Returns the name of the handler to run.
    ///
    /// Lambda sets `_HANDLER` from the function's handler setting, so that
    /// setting must be `error` or `hello`. The common `bootstrap` value is
    /// taken verbatim and fails at startup. The `error` default applies only
    /// when the variable is unset or empty.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn function_version(&self) -> Option<&str> {
        self.function_version.as_deref()
    }

    /// Returns the memory available to the function, in MB.
    pub fn memory_size(&self) -> Option<u32> {
        self.memory_size
    }

    pub fn log_group_name(&self) -> Option<&str> {
        self.log_group_name.as_deref()
    }

    pub fn log_stream_name(&self) -> Option<&str> {
        self.log_stream_name.as_deref()
    }
}

/// Returns the runtime API base URL if it's set in the process environment.
/// Used to report errors that prevent the configuration from loading.
pub fn runtime_endpoint_from_env() -> Option<String> {
    env::var(RUNTIME_API)
        .ok()
        .filter(|v| !v.is_empty())
        .map(|v| format!("http://{}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn full_config() {
        let config = Config::from_lookup(lookup(&[
            (RUNTIME_API, "127.0.0.1:9001"),
            (HANDLER, "hello"),
            (FUNCTION_NAME, "hello-function"),
            (FUNCTION_VERSION, "$LATEST"),
            (FUNCTION_MEMORY_SIZE, "128"),
            (LOG_GROUP_NAME, "/aws/lambda/hello-function"),
            (LOG_STREAM_NAME, "2026/10/19/[$LATEST]abc"),
        ]))
        .unwrap();

        assert_eq!(config.runtime_endpoint(), "http://127.0.0.1:9001");
        assert_eq!(config.handler(), "hello");
        assert_eq!(config.function_name(), Some("hello-function"));
        assert_eq!(config.function_version(), Some("$LATEST"));
        assert_eq!(config.memory_size(), Some(128));
        assert_eq!(config.log_group_name(), Some("/aws/lambda/hello-function"));
        assert_eq!(config.log_stream_name(), Some("2026/10/19/[$LATEST]abc"));
    }

    #[test]
    fn handler_defaults_to_error() {
        let config = Config::from_lookup(lookup(&[(RUNTIME_API, "localhost:9001"), (HANDLER, "")]))
            .unwrap();
        assert_eq!(config.handler(), "error");
        assert_eq!(config.function_name(), None);
        assert_eq!(config.memory_size(), None);
    }

    #[test]
    fn handler_setting_is_taken_verbatim() {
        let config = Config::from_lookup(lookup(&[
            (RUNTIME_API, "localhost:9001"),
            (HANDLER, "bootstrap"),
        ]))
        .unwrap();
        assert_eq!(config.handler(), "bootstrap");
        assert!(crate::dispatch::handler_by_name(config.handler()).is_err());
    }

    #[test]
    fn missing_runtime_api() {
        let err = Config::from_lookup(lookup(&[(HANDLER, "hello")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AWS_LAMBDA_RUNTIME_API"));
        assert_eq!(
            err.to_string(),
            "Missing configuration value: AWS_LAMBDA_RUNTIME_API"
        );
    }

    #[test]
    fn invalid_memory_size() {
        let err = Config::from_lookup(lookup(&[
            (RUNTIME_API, "localhost:9001"),
            (FUNCTION_MEMORY_SIZE, "lots"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "AWS_LAMBDA_FUNCTION_MEMORY_SIZE",
                value: "lots".into(),
            }
        );
    }
}
