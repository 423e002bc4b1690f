//! Splits a working day evenly across the issues dropped on it.
//!
//! Durations are whole seconds. Each entry gets `floor(workday / n)` and the
//! last entry of the day also takes the remainder, so a day always sums to
//! exactly the configured workday. Entries are laid back to back from the
//! day start in the order the user dropped them.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use timesheet_api::{Account, Issue, WorklogEntry};

use crate::error::{Result, TimesheetError};

pub const WORKDAY_SECONDS: u32 = 8 * 3600;
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = "Did work on {title}";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Days after Monday.
    pub fn offset(self) -> u64 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }
}

/// Issue ids dropped on each weekday, in drop order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekAllocation {
    pub monday: Vec<String>,
    pub tuesday: Vec<String>,
    pub wednesday: Vec<String>,
    pub thursday: Vec<String>,
    pub friday: Vec<String>,
}

impl WeekAllocation {
    pub fn day(&self, day: Weekday) -> &[String] {
        match day {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
        }
    }

    fn day_mut(&mut self, day: Weekday) -> &mut Vec<String> {
        match day {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
        }
    }

    /// Appends an issue to a day. Dropping an issue already on that day is a no-op and returns `false`.
    pub fn add(&mut self, day: Weekday, issue_id: impl Into<String>) -> bool {
        let issue_id = issue_id.into();
        let slot = self.day_mut(day);
        if slot.contains(&issue_id) {
            return false;
        }
        slot.push(issue_id);
        true
    }

    pub fn remove(&mut self, day: Weekday, issue_id: &str) -> bool {
        let slot = self.day_mut(day);
        let before = slot.len();
        slot.retain(|id| id != issue_id);
        slot.len() != before
    }

    pub fn entry_count(&self) -> usize {
        Weekday::ALL.iter().map(|day| self.day(*day).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    pub fn clear(&mut self) {
        *self = WeekAllocation::default();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionSettings {
    pub workday_seconds: u32,
    pub day_start: NaiveTime,
    pub account: Account,
    /// `{title}` and `{key}` are substituted from the issue.
    pub description_template: String,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            workday_seconds: WORKDAY_SECONDS,
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            account: Account::default(),
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Distributor {
    settings: DistributionSettings,
}

impl Distributor {
    pub fn new(settings: DistributionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DistributionSettings {
        &self.settings
    }

    /// Turns a week allocation into worklog entries, Monday first and drop order within a day.
    ///
    /// Fails with `InvalidInput` when `week_start` is not a Monday or a day is
    /// malformed, and with `NotFound` when an id is missing from `issues`.
    /// Nothing is produced for empty days.
    pub fn distribute(
        &self,
        week_start: NaiveDate,
        allocation: &WeekAllocation,
        issues: &[Issue],
        author_account_id: &str,
    ) -> Result<Vec<WorklogEntry>> {
        if week_start.weekday() != chrono::Weekday::Mon {
            return Err(TimesheetError::invalid_input(format!(
                "start of week {} is a {}, not a Monday",
                week_start,
                week_start.weekday()
            )));
        }
        if self.settings.workday_seconds == 0 {
            return Err(TimesheetError::configuration("workday length must be positive"));
        }

        let mut by_id: HashMap<&str, &Issue> = HashMap::with_capacity(issues.len() * 2);
        for issue in issues {
            by_id.entry(issue.key.as_str()).or_insert(issue);
        }
        // ids win over keys when both collide
        for issue in issues {
            by_id.insert(issue.id.as_str(), issue);
        }

        let mut entries = Vec::with_capacity(allocation.entry_count());
        for day in Weekday::ALL {
            let dropped = allocation.day(day);
            if dropped.is_empty() {
                continue;
            }
            let date = week_start
                .checked_add_days(Days::new(day.offset()))
                .ok_or_else(|| {
                    TimesheetError::invalid_input(format!("{} of week {} is out of range", day.as_str(), week_start))
                })?;
            self.distribute_day(day, date, dropped, &by_id, author_account_id, &mut entries)?;
        }
        Ok(entries)
    }

    fn distribute_day(
        &self,
        day: Weekday,
        date: NaiveDate,
        dropped: &[String],
        by_id: &HashMap<&str, &Issue>,
        author_account_id: &str,
        out: &mut Vec<WorklogEntry>,
    ) -> Result<()> {
        let count = u32::try_from(dropped.len())
            .ok()
            .filter(|count| *count <= self.settings.workday_seconds)
            .ok_or_else(|| {
                TimesheetError::invalid_input(format!("too many issues on {}", day.as_str()))
            })?;
        let per_entry = self.settings.workday_seconds / count;
        let remainder = self.settings.workday_seconds % count;

        let mut seen = HashSet::with_capacity(dropped.len());
        for (index, issue_ref) in dropped.iter().enumerate() {
            let issue_ref = issue_ref.trim();
            if issue_ref.is_empty() {
                return Err(TimesheetError::invalid_input(format!(
                    "blank issue id on {}",
                    day.as_str()
                )));
            }
            let issue: &Issue = by_id.get(issue_ref).copied().ok_or_else(|| {
                TimesheetError::NotFound(format!(
                    "issue {} dropped on {} is not in the loaded issue list",
                    issue_ref,
                    day.as_str()
                ))
            })?;
            // id and key of one issue resolve to the same record
            if !seen.insert(issue.id.as_str()) {
                return Err(TimesheetError::invalid_input(format!(
                    "issue {} appears twice on {}",
                    issue.key,
                    day.as_str()
                )));
            }

            let index = index as u32;
            let offset = i64::from(index * per_entry);
            let (start_time, wrapped) = self
                .settings
                .day_start
                .overflowing_add_signed(Duration::seconds(offset));
            if wrapped != 0 {
                return Err(TimesheetError::configuration(
                    "workday runs past midnight; move the day start earlier",
                ));
            }
            let is_last = index + 1 == count;
            let seconds = if is_last { per_entry + remainder } else { per_entry };

            out.push(WorklogEntry {
                issue_id: issue.id.clone(),
                start_date: date,
                start_time,
                time_spent_seconds: seconds,
                description: self.describe(issue),
                account: self.settings.account,
                author_account_id: author_account_id.to_string(),
            });
        }
        Ok(())
    }

    /// Expands `{title}` and `{key}` in one pass; placeholders inside the substituted text stay literal.
    fn describe(&self, issue: &Issue) -> String {
        let template = self.settings.description_template.as_str();
        let mut out = String::with_capacity(template.len() + issue.title.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            if let Some(after) = tail.strip_prefix("{title}") {
                out.push_str(&issue.title);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{key}") {
                out.push_str(&issue.key);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

/// [`Distributor::distribute`] with an eight hour day starting at 08:00.
pub fn distribute(
    week_start: NaiveDate,
    allocation: &WeekAllocation,
    issues: &[Issue],
    author_account_id: &str,
) -> Result<Vec<WorklogEntry>> {
    Distributor::default().distribute(week_start, allocation, issues, author_account_id)
}
