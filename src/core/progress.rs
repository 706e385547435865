use serde::{Deserialize, Serialize};
use crate::core::types::RunId;
use crate::utils::ErrorKind;

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    /// The run finished after a newer run started; its results were dropped
    Superseded,
}

/// Progress of one compression run, broadcast to subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, superseded)
    pub progress_type: ProgressType,
    /// Run this event belongs to
    pub run: RunId,
    /// Number of settled tasks
    pub completed_tasks: usize,
    /// Total number of tasks in the run
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// File the event is about, for per-file progress
    pub file_name: Option<String>,
    /// Failure kind when the file failed
    pub error_kind: Option<ErrorKind>,
}

impl Progress {
    pub fn new(
        progress_type: ProgressType,
        run: RunId,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            run,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            error_kind: None,
        }
    }

    pub fn for_file(mut self, file_name: &str, error_kind: Option<ErrorKind>) -> Self {
        self.file_name = Some(file_name.to_string());
        self.error_kind = error_kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_integer_share() {
        let p = Progress::new(ProgressType::Progress, RunId::default(), 2, 3, "processing");
        assert_eq!(p.progress_percentage, 66);
        let empty = Progress::new(ProgressType::Start, RunId::default(), 0, 0, "idle");
        assert_eq!(empty.progress_percentage, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let p = Progress::new(ProgressType::Complete, RunId::default(), 1, 1, "complete")
            .for_file("a.png", Some(ErrorKind::DecodeFailure));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["progressType"], "complete");
        assert_eq!(json["progressPercentage"], 100);
        assert_eq!(json["fileName"], "a.png");
        assert_eq!(json["errorKind"], "decodeFailure");
    }
}
