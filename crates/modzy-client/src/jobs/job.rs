use std::fmt;

use modzy_api::schemas::{JobResponse, JobStatus, ModelIdentifier};

/// A model version jobs run against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    pub identifier: String,
    pub version: String,
}

impl ModelRef {
    pub fn new(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identifier, self.version)
    }
}

impl From<&ModelRef> for ModelIdentifier {
    fn from(model: &ModelRef) -> Self {
        ModelIdentifier {
            identifier: model.identifier.clone(),
            version: model.version.clone(),
        }
    }
}

/// Handle on a submitted job.
///
/// The status is the last one reported at submission time; poll
/// [`JobClient::get_job`](crate::jobs::JobClient::get_job) for the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub job_identifier: String,
    pub status: JobStatus,
    pub model: ModelRef,
    pub explain: bool,
}

impl Job {
    /// Build a handle from a job response, filling what the service left out from the request.
    pub(crate) fn from_response(response: JobResponse, model: &ModelRef, explain: bool) -> Self {
        let model = response
            .model
            .map(|m| ModelRef::new(m.identifier, m.version))
            .unwrap_or_else(|| model.clone());

        Job {
            job_identifier: response.job_identifier,
            status: response.status.unwrap_or(JobStatus::Submitted),
            model,
            explain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_status_falls_back_to_submitted() {
        let response: JobResponse =
            serde_json::from_value(json!({ "jobIdentifier": "job-1" })).unwrap();
        let job = Job::from_response(response, &ModelRef::new("ed542963de", "1.0.1"), true);

        assert_eq!(job.job_identifier, "job-1");
        assert_eq!(job.status, JobStatus::Submitted);
        assert_eq!(job.model.to_string(), "ed542963de@1.0.1");
        assert!(job.explain);
    }

    #[test]
    fn response_model_wins_over_the_request() {
        let response: JobResponse = serde_json::from_value(json!({
            "jobIdentifier": "job-1",
            "status": "IN_PROGRESS",
            "model": { "identifier": "ed542963de", "version": "1.0.2" }
        }))
        .unwrap();
        let job = Job::from_response(response, &ModelRef::new("ed542963de", "1.0.1"), false);

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.model.version, "1.0.2");
    }
}
