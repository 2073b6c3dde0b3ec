use modzy_api::schemas::{
    LatestModelResponse, ModelResponse, ModelSearchParams, ModelSummary,
    ModelVersionDetailsResponse, ModelVersionResponse, TagSchema, TagsAndModelsResponse,
};
use modzy_api::{Client, ClientError};

/// Page size of model searches that do not set one.
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 500;

const NAME_SEARCH_PAGE_SIZE: u32 = 20;

/// Read access to the model catalog.
#[derive(Debug, Clone)]
pub struct ModelClient {
    client: Client,
}

impl ModelClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Search the catalog. Unset filters are left out of the query.
    pub async fn search(
        &self,
        mut params: ModelSearchParams,
    ) -> Result<Vec<ModelSummary>, ModelError> {
        params.per_page.get_or_insert(DEFAULT_SEARCH_PAGE_SIZE);
        Ok(self.client.list_models(&params).await?)
    }

    pub async fn all_models(&self) -> Result<Vec<ModelSummary>, ModelError> {
        self.search(ModelSearchParams::default()).await
    }

    /// Latest version of every active model.
    pub async fn active_models(&self) -> Result<Vec<LatestModelResponse>, ModelError> {
        Ok(self.client.list_latest_models().await?)
    }

    pub async fn get_model(&self, model_id: &str) -> Result<ModelResponse, ModelError> {
        Ok(self.client.get_model(model_id).await?)
    }

    /// Full record of the first model the name search returns.
    pub async fn get_model_by_name(&self, name: &str) -> Result<ModelResponse, ModelError> {
        let models = self.search(name_search(name)).await?;
        let Some(first) = models.first() else {
            return Err(ModelError::NotFound(name.to_string()));
        };
        log::debug!(
            "Model name {name} matched {} model(s), using {}",
            models.len(),
            first.model_id
        );
        self.get_model(&first.model_id).await
    }

    /// Every tag used in the catalog.
    pub async fn all_tags(&self) -> Result<Vec<TagSchema>, ModelError> {
        Ok(self.client.list_tags().await?)
    }

    /// The given tags and the models carrying any of them. No tags means no request and an empty
    /// answer.
    pub async fn tags_and_models(
        &self,
        tag_ids: &[&str],
    ) -> Result<TagsAndModelsResponse, ModelError> {
        if tag_ids.is_empty() {
            return Ok(TagsAndModelsResponse::default());
        }
        Ok(self.client.get_tags_and_models(tag_ids).await?)
    }

    pub async fn versions(&self, model_id: &str) -> Result<Vec<ModelVersionResponse>, ModelError> {
        Ok(self.client.get_model_versions(model_id).await?)
    }

    pub async fn version_details(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<ModelVersionDetailsResponse, ModelError> {
        Ok(self.client.get_model_version(model_id, version).await?)
    }

    pub async fn version_input_sample(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<serde_json::Value, ModelError> {
        Ok(self
            .client
            .get_model_version_sample_input(model_id, version)
            .await?)
    }

    pub async fn version_output_sample(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<serde_json::Value, ModelError> {
        Ok(self
            .client
            .get_model_version_sample_output(model_id, version)
            .await?)
    }
}

fn name_search(name: &str) -> ModelSearchParams {
    ModelSearchParams {
        name: Some(name.to_string()),
        sort_by: Some("name".to_string()),
        per_page: Some(NAME_SEARCH_PAGE_SIZE),
        ..Default::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_search_sorts_by_name() {
        let query = serde_json::to_value(name_search("Sentiment Analysis")).unwrap();
        assert_eq!(
            query,
            json!({ "name": "Sentiment Analysis", "sort-by": "name", "per-page": 20 })
        );
    }

    #[tokio::test]
    async fn no_tags_skip_the_request() {
        // Nothing listens on this port, so any request would fail.
        let client = Client::new(
            "http://127.0.0.1:9/api/".parse().unwrap(),
            modzy_api::ModzyCredentials::new("key"),
        )
        .unwrap();

        let found = ModelClient::new(client).tags_and_models(&[]).await.unwrap();

        assert!(found.tags.is_empty());
        assert!(found.models.is_empty());
    }

    #[test]
    fn not_found_names_the_model() {
        let err = ModelError::NotFound("Sentiment Analysis".to_string());
        assert_eq!(err.to_string(), "Model Sentiment Analysis not found");
    }
}
