//! Drives a planned week through a worklog writer, one entry at a time.

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use timesheet_api::{WorklogAck, WorklogEntry, WorklogWriter};

use crate::distributor::{Distributor, WeekAllocation};
use crate::error::{Result, TimesheetError};
use crate::session::{IssueSource, SessionCache};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult {
    #[serde(skip)]
    pub entries: Vec<WorklogEntry>,
    pub acknowledgements: Vec<WorklogAck>,
}

impl SubmissionResult {
    pub fn len(&self) -> usize {
        self.acknowledgements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acknowledgements.is_empty()
    }
}

pub struct Submitter<S, W> {
    cache: SessionCache<S>,
    writer: W,
    distributor: Distributor,
}

impl<S, W> Submitter<S, W>
where
    S: IssueSource,
    W: WorklogWriter,
{
    pub fn new(cache: SessionCache<S>, writer: W, distributor: Distributor) -> Self {
        Self {
            cache,
            writer,
            distributor,
        }
    }

    pub fn cache(&self) -> &SessionCache<S> {
        &self.cache
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Resolves identity and the issue pool, then distributes. Nothing is written.
    pub async fn plan_week(
        &self,
        week_start: NaiveDate,
        allocation: &WeekAllocation,
    ) -> Result<Vec<WorklogEntry>> {
        let identity = self.cache.identity().await?;
        let issues = self.cache.issues().await?;
        self.distributor
            .distribute(week_start, allocation, &issues, &identity.account_id)
    }

    /// Plans the week and writes every entry in order.
    ///
    /// The whole week is planned before the first write, so unknown issues or a
    /// bad week start fail with nothing recorded. A failed write stops the run
    /// with [`TimesheetError::Aborted`]; entries before it stay recorded and
    /// later ones are never attempted.
    pub async fn submit_week(
        &self,
        week_start: NaiveDate,
        allocation: &WeekAllocation,
    ) -> Result<SubmissionResult> {
        let entries = self.plan_week(week_start, allocation).await?;
        let total = entries.len();
        let mut acknowledgements = Vec::with_capacity(total);

        for (index, entry) in entries.iter().enumerate() {
            match self.writer.create_worklog(entry).await {
                Ok(ack) => acknowledgements.push(ack),
                Err(source) => {
                    warn!(
                        "Worklog {}/{} for issue {} on {} failed; {} already recorded",
                        index + 1,
                        total,
                        entry.issue_id,
                        entry.start_date_string(),
                        acknowledgements.len()
                    );
                    return Err(TimesheetError::Aborted {
                        committed: acknowledgements,
                        failed_index: index,
                        total,
                        source,
                    });
                }
            }
        }

        info!("Submitted {} worklogs for week of {}", total, week_start);
        Ok(SubmissionResult {
            entries,
            acknowledgements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{issue, FakeSource};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use timesheet_api::{ApiError, DryRunTempoClient, DRY_RUN_WORKLOG_ID};

    /// Records every entry it is asked to write and fails on request.
    #[derive(Default)]
    struct RecordingWriter {
        written: Mutex<Vec<WorklogEntry>>,
        fail_at: Option<usize>,
    }

    impl WorklogWriter for RecordingWriter {
        async fn create_worklog(&self, entry: &WorklogEntry) -> timesheet_api::Result<WorklogAck> {
            let mut written = self.written.lock().unwrap();
            if self.fail_at == Some(written.len()) {
                return Err(ApiError::Network("connection reset".into()));
            }
            written.push(entry.clone());
            Ok(WorklogAck::from_body(json!({ "tempoWorklogId": written.len() })))
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn source() -> FakeSource {
        FakeSource::with_issues(vec![issue("101", "A"), issue("102", "B"), issue("103", "C")])
    }

    fn week() -> WeekAllocation {
        WeekAllocation {
            monday: vec!["101".into(), "102".into()],
            wednesday: vec!["103".into()],
            friday: vec!["101".into()],
            ..Default::default()
        }
    }

    fn submitter<W: WorklogWriter>(writer: W) -> Submitter<FakeSource, W> {
        Submitter::new(SessionCache::new(source(), None), writer, Distributor::default())
    }

    #[tokio::test]
    async fn writes_entries_in_distribution_order() {
        let submitter = submitter(RecordingWriter::default());

        let result = submitter.submit_week(monday(), &week()).await.unwrap();

        assert_eq!(result.len(), 4);
        let written = submitter.writer().written.lock().unwrap();
        let order: Vec<(&str, String)> = written
            .iter()
            .map(|e| (e.issue_id.as_str(), e.start_date_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("101", "2024-01-01".to_string()),
                ("102", "2024-01-01".to_string()),
                ("103", "2024-01-03".to_string()),
                ("101", "2024-01-05".to_string()),
            ]
        );
        assert!(written.iter().all(|e| e.author_account_id == "acc-1"));
        assert_eq!(result.entries, *written);
        assert_eq!(result.acknowledgements[3].id, Some(json!(4)));
    }

    #[tokio::test]
    async fn first_failure_stops_the_run_and_reports_committed_entries() {
        let submitter = submitter(RecordingWriter {
            fail_at: Some(2),
            ..Default::default()
        });

        let err = submitter.submit_week(monday(), &week()).await.unwrap_err();

        match err {
            TimesheetError::Aborted {
                committed,
                failed_index,
                total,
                source,
            } => {
                assert_eq!(committed.len(), 2);
                assert_eq!(failed_index, 2);
                assert_eq!(total, 4);
                assert!(matches!(source, ApiError::Network(_)));
            }
            other => panic!("expected aborted submission, got {other:?}"),
        }
        assert_eq!(submitter.writer().written.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn planning_errors_write_nothing() {
        let submitter = submitter(RecordingWriter::default());
        let mut allocation = week();
        allocation.thursday.push("999".into());

        let err = submitter.submit_week(monday(), &allocation).await.unwrap_err();
        assert!(matches!(err, TimesheetError::NotFound(_)));

        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = submitter.submit_week(tuesday, &week()).await.unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidInput(_)));

        assert!(submitter.writer().written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn identity_failure_stops_before_any_write() {
        let source = FakeSource {
            fail_identity: true,
            ..source()
        };
        let submitter = Submitter::new(
            SessionCache::new(source, None),
            RecordingWriter::default(),
            Distributor::default(),
        );

        let err = submitter.submit_week(monday(), &week()).await.unwrap_err();

        assert!(matches!(err, TimesheetError::Validation(_)));
        assert_eq!(submitter.cache().source().issue_fetches.load(Ordering::SeqCst), 0);
        assert!(submitter.writer().written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_writer_acknowledges_every_entry() {
        let submitter = submitter(DryRunTempoClient::new());

        let result = submitter.submit_week(monday(), &week()).await.unwrap();

        assert_eq!(result.len(), 4);
        assert!(result
            .acknowledgements
            .iter()
            .all(|ack| ack.id == Some(json!(DRY_RUN_WORKLOG_ID))));
        assert_eq!(result.acknowledgements[2].body["timeSpentSeconds"], json!(28800));
    }

    #[tokio::test]
    async fn empty_week_submits_nothing() {
        let submitter = submitter(RecordingWriter::default());
        let result = submitter
            .submit_week(monday(), &WeekAllocation::default())
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
