mod issue;
mod user;
mod worklog;

pub use issue::{Issue, IssueSearchResponse};
pub use user::Identity;
pub use worklog::{
    Account, WireIssueId, WorklogAck, WorklogAttribute, WorklogEntry, WorklogRequest,
    ACCOUNT_ATTRIBUTE_KEY,
};
