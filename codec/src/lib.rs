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

#[macro_use]
extern crate serde_derive;

pub use crate::lambda::{encode_success, ErrorReport, ERROR_TYPE_HEADER};
pub use crate::outcome::{DeliberateFailure, Outcome};

mod lambda;
mod outcome;
