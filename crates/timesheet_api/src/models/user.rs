//! Identity returned by Jira's `myself` endpoint.

use serde::{Deserialize, Serialize};

/// The authenticated Jira user; `account_id` becomes the author of every submitted worklog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub account_id: String,
    pub email_address: String,
    pub display_name: String,
}
