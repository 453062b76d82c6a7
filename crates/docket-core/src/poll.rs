//! Bounded polling of an asynchronous analysis job.
//!
//! The deadline is computed once at entry and compared against on every
//! iteration, so the budget never drifts with per-call latency.

use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};

use crate::analysis::DocumentAnalyzer;

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Wall-clock budget for the whole polling loop.
    pub max_wait: Duration,
    /// Fixed delay between consecutive status queries.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached `Succeeded`; carries the last raw status response.
    Succeeded { body: String },
    /// The job ended in `Failed`/`Canceled`, or a status call could not be
    /// completed or parsed.
    Failed { reason: String },
    /// No terminal status was observed within the budget.
    TimedOut,
}

impl PollOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Poll a job until it reaches a terminal status or the budget expires.
///
/// Status values outside the known set are treated as non-terminal and keep
/// the loop going; a transport error or an unparseable response ends it
/// immediately.
pub async fn poll_until_terminal(
    analyzer: &dyn DocumentAnalyzer,
    operation_location: &str,
    settings: &PollSettings,
) -> PollOutcome {
    let deadline = Instant::now() + settings.max_wait;

    while Instant::now() < deadline {
        let body = match analyzer.job_status(operation_location).await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "status query failed while polling");
                return PollOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let root: Value = match serde_json::from_str(&body) {
            Ok(root) => root,
            Err(err) => {
                tracing::error!(error = %err, "unparseable status response while polling");
                return PollOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let Some(status) = root.get("status").and_then(Value::as_str) else {
            tracing::error!("status response carries no status field");
            return PollOutcome::Failed {
                reason: "status response carries no status field".to_string(),
            };
        };

        tracing::debug!(status, "job status");

        match status {
            "Succeeded" => return PollOutcome::Succeeded { body },
            "Failed" | "Canceled" => {
                tracing::warn!(status, "job ended without succeeding");
                return PollOutcome::Failed {
                    reason: format!("job {status}"),
                };
            }
            _ => sleep(settings.interval).await,
        }
    }

    tracing::warn!(
        max_wait_secs = settings.max_wait.as_secs(),
        "job polling timed out"
    );
    PollOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, AnalysisResult, Submission};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Replays a scripted sequence of status responses; the last entry repeats.
    struct ScriptedAnalyzer {
        responses: Mutex<VecDeque<AnalysisResult<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn new(responses: Vec<AnalysisResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn statuses(statuses: &[&str]) -> Self {
            Self::new(
                statuses
                    .iter()
                    .map(|status| Ok(format!(r#"{{"status":"{status}"}}"#)))
                    .collect(),
            )
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentAnalyzer for ScriptedAnalyzer {
        async fn submit(&self, _document_url: &str) -> AnalysisResult<Submission> {
            unreachable!("poller never submits");
        }

        async fn job_status(&self, _operation_location: &str) -> AnalysisResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().await;
            if responses.len() > 1 {
                responses.pop_front().unwrap()
            } else {
                match responses.front() {
                    Some(Ok(body)) => Ok(body.clone()),
                    _ => Err(AnalysisError::InvalidOperationLocation(
                        url::ParseError::EmptyHost,
                    )),
                }
            }
        }
    }

    fn settings() -> PollSettings {
        PollSettings::default()
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_within_one_interval_of_completion() {
        let analyzer = ScriptedAnalyzer::statuses(&["Running", "Running", "Succeeded"]);
        let start = Instant::now();

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert_eq!(
            outcome,
            PollOutcome::Succeeded {
                body: r#"{"status":"Succeeded"}"#.to_string()
            }
        );
        assert_eq!(analyzer.call_count(), 3);
        assert!(start.elapsed() <= Duration::from_secs(4) + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_ends_polling_immediately() {
        let analyzer = ScriptedAnalyzer::statuses(&["Running", "Failed", "Succeeded"]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert_eq!(analyzer.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_job_ends_polling_immediately() {
        let analyzer = ScriptedAnalyzer::statuses(&["Canceled"]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert_eq!(analyzer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_status_keeps_polling() {
        let analyzer = ScriptedAnalyzer::statuses(&["NotStarted", "Almost", "Succeeded"]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(outcome.is_success());
        assert_eq!(analyzer.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_within_budget_plus_one_interval() {
        let analyzer = ScriptedAnalyzer::statuses(&["Running"]);
        let poll = settings();
        let start = Instant::now();

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &poll).await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(start.elapsed() <= poll.max_wait + poll.interval + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_fails_fast() {
        let analyzer = ScriptedAnalyzer::new(vec![Err(AnalysisError::InvalidOperationLocation(
            url::ParseError::EmptyHost,
        ))]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert_eq!(analyzer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unparseable_response_fails_fast() {
        let analyzer = ScriptedAnalyzer::new(vec![Ok("not json".to_string())]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert_eq!(analyzer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_status_field_fails_fast() {
        let analyzer = ScriptedAnalyzer::new(vec![Ok(r#"{"id":"1"}"#.to_string())]);

        let outcome = poll_until_terminal(&analyzer, "https://jobs.example/op/1", &settings()).await;

        assert!(matches!(outcome, PollOutcome::Failed { .. }));
    }
}
