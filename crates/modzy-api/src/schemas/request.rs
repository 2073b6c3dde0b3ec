use std::collections::BTreeMap;

use serde::Serialize;

/// Job inputs keyed by slot, then by the model's input name.
pub type InputSources<V> = BTreeMap<String, BTreeMap<String, V>>;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifier {
    pub identifier: String,
    pub version: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SubmitJobRequest {
    pub model: ModelIdentifier,
    pub explain: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<JobInputSchema>,
}

impl SubmitJobRequest {
    /// A request without inputs, which leaves the job open for chunked uploads.
    pub fn open(model: ModelIdentifier, explain: bool) -> Self {
        Self {
            model,
            explain,
            input: None,
        }
    }

    pub fn with_input(model: ModelIdentifier, explain: bool, input: JobInputSchema) -> Self {
        Self {
            model,
            explain,
            input: Some(input),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectRef {
    pub bucket: String,
    pub key: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum JobInputSchema {
    #[serde(rename = "text")]
    Text { sources: InputSources<String> },
    /// Values are `data:<media type>;base64,<payload>` URLs.
    #[serde(rename = "embedded")]
    Embedded { sources: InputSources<String> },
    #[serde(rename = "aws-s3", rename_all = "camelCase")]
    AwsS3 {
        #[serde(rename = "accessKeyID")]
        access_key_id: String,
        secret_access_key: String,
        region: String,
        sources: InputSources<S3ObjectRef>,
    },
    #[serde(rename = "jdbc")]
    Jdbc {
        url: String,
        username: String,
        password: String,
        driver: String,
        query: String,
    },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Query parameters of the model listing endpoint. Unset fields are omitted.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(rename = "isRecommended", skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_time: Option<String>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "per-page", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Query parameters of the job history endpoint. Unset fields are omitted.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobHistoryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "per-page", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}
