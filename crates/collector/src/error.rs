// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use pvex_client::ClientError;

/// Errors raised while discovering cluster nodes.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("node discovery failed: {0}")]
    Fetch(#[from] ClientError),

    #[error("response from {path} does not carry a node list")]
    Malformed { path: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvex_client::StatusCode;

    #[test]
    fn test_display() {
        let err = TopologyError::from(ClientError::Status {
            path: "/nodes".to_string(),
            status: StatusCode::UNAUTHORIZED,
        });
        assert!(err.to_string().starts_with("node discovery failed"));

        let err = TopologyError::Malformed { path: "/nodes" };
        assert_eq!(err.to_string(), "response from /nodes does not carry a node list");
    }
}
