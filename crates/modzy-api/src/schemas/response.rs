use serde::Deserialize;
use strum::{Display, EnumString};

/// Operational limits reported by `jobs/features`, keyed by feature name.
pub type FeaturesResponse = serde_json::Map<String, serde_json::Value>;

/// Job state as reported by the API.
///
/// `Open` is only observed between opening a job and closing it.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    Submitted,
    InProgress,
    Completed,
    Canceled,
    #[serde(rename = "TIMEDOUT")]
    #[strum(serialize = "TIMEDOUT")]
    TimedOut,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Canceled | JobStatus::TimedOut | JobStatus::Failed
        )
    }

    /// Whether the job is still waiting for or undergoing processing.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            JobStatus::Open | JobStatus::Submitted | JobStatus::InProgress
        )
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobModelSchema {
    pub identifier: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Job record returned by job submission, retrieval, close, cancel and history.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_identifier: String,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub model: Option<JobModelSchema>,
    #[serde(default)]
    pub explain: bool,
    #[serde(default)]
    pub total_inputs: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub pending: Option<u32>,
    #[serde(default)]
    pub completed: Option<u32>,
    #[serde(default)]
    pub failed: Option<u32>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub account_identifier: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    #[serde(default)]
    pub queue_time: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub job_identifier: String,
    #[serde(default)]
    pub account_identifier: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub explained: bool,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    #[serde(default)]
    pub average_model_latency: Option<f64>,
    #[serde(default)]
    pub total_model_latency: Option<f64>,
    /// Outputs keyed by input slot, then by output name.
    #[serde(default)]
    pub results: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub failures: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub model_id: String,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TagSchema {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_categorical: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelFeatureSchema {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageSchema {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub relation_type: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub model_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub latest_active_version: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_commercial: bool,
    #[serde(default)]
    pub tags: Vec<TagSchema>,
    #[serde(default)]
    pub features: Vec<ModelFeatureSchema>,
    #[serde(default)]
    pub images: Vec<ImageSchema>,
    #[serde(default)]
    pub last_active_date_time: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LatestModelResponse {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub active_versions: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub tags: Vec<TagSchema>,
    #[serde(default)]
    pub features: Vec<ModelFeatureSchema>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelVersionResponse {
    pub version: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelIoSchema {
    pub name: String,
    #[serde(default, alias = "mediaType")]
    pub accepted_media_types: Option<String>,
    #[serde(default)]
    pub maximum_size: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Timeouts in milliseconds.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ModelTimeoutSchema {
    pub status: u64,
    pub run: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersionDetailsResponse {
    pub version: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub timeout: Option<ModelTimeoutSchema>,
    #[serde(default)]
    pub inputs: Vec<ModelIoSchema>,
    #[serde(default)]
    pub outputs: Vec<ModelIoSchema>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub technical_details: Option<String>,
    #[serde(default)]
    pub model: Option<ModelResponse>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EngineResponse {
    pub identifier: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub queued: u32,
    #[serde(default)]
    pub spinning_up: u32,
    #[serde(default)]
    pub spinning_down: u32,
    #[serde(default)]
    pub running: u32,
    #[serde(default)]
    pub ready: u32,
}

/// A model as listed by `models/tags/{ids}`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaggedModelSchema {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagSchema>,
}

/// The requested tags and every model carrying at least one of them.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TagsAndModelsResponse {
    #[serde(default)]
    pub tags: Vec<TagSchema>,
    #[serde(default)]
    pub models: Vec<TaggedModelSchema>,
}

/// An API key of a user, identified by its public prefix.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyResponse {
    pub prefix: String,
    #[serde(default)]
    pub account_identifier: Option<String>,
    #[serde(default)]
    pub owner_identifier: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}
