use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::credentials::ModzyCredentials;
use crate::error::ClientError;
use crate::schemas::{
    AccessKeyResponse, EngineResponse, FeaturesResponse, JobHistoryParams, JobResponse,
    LatestModelResponse, ModelResponse, ModelSearchParams, ModelSummary,
    ModelVersionDetailsResponse, ModelVersionResponse, ResultResponse, SubmitJobRequest,
    TagSchema, TagsAndModelsResponse,
};

/// Base URL of the hosted Modzy API.
pub const DEFAULT_BASE_URL: &str = "https://app.modzy.com/api/";

/// Multipart field carrying the bytes of an input chunk.
pub const INPUT_CHUNK_FIELD: &str = "input";

trait ResponseExt {
    async fn map_to_modzy_err(self) -> Result<Response, ClientError>;
}

impl ResponseExt for Response {
    async fn map_to_modzy_err(self) -> Result<Response, ClientError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let url = self.url().clone();
        let text = self
            .text()
            .await
            .map_err(|e| ClientError::UnknownError(e.to_string()))?;
        log::debug!("{url} responded {status}: {text}");
        Err(ClientError::from_status(status, &text))
    }
}

/// A client for making HTTP requests to the Modzy API.
///
/// Every request carries the `Authorization: ApiKey <key>` header built from the credentials.
/// Cloning is cheap and clones share the underlying connection pool, so one client can serve
/// many concurrent job submissions.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: ModzyCredentials,
}

impl Client {
    /// Create a new client with the given base URL and credentials.
    pub fn new(base_url: Url, credentials: ModzyCredentials) -> Result<Self, ClientError> {
        Self::with_http_client(reqwest::Client::new(), base_url, credentials)
    }

    /// Create a new client on top of a preconfigured reqwest client (timeouts, proxies, ...).
    pub fn with_http_client(
        http_client: reqwest::Client,
        mut base_url: Url,
        credentials: ModzyCredentials,
    ) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        if credentials.api_key().trim().is_empty() {
            return Err(ClientError::InvalidCredentials(
                "API key cannot be empty".to_string(),
            ));
        }

        // Url::join and path_segments_mut both treat the last segment as a directory only
        // when the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Client {
            http_client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of an endpoint from its path segments, each one percent-encoded.
    pub fn endpoint<I>(&self, segments: I) -> Result<Url, ClientError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::debug!("{method} {url}");
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, self.credentials.authorization_header())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().await?.map_to_modzy_err().await
    }

    pub async fn get_json<R>(&self, url: Url) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json::<R>().await?)
    }

    pub async fn get_json_with_query<Q, R>(&self, url: Url, query: &Q) -> Result<R, ClientError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::GET, url).query(query))
            .await?;
        Ok(response.json::<R>().await?)
    }

    pub async fn post_json<T, R>(&self, url: Url, body: &T) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, url).json(body)).await?;
        Ok(response.json::<R>().await?)
    }

    pub async fn delete_json<R>(&self, url: Url) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.send(self.request(Method::DELETE, url)).await?;
        Ok(response.json::<R>().await?)
    }

    /// Search the model catalog.
    pub async fn list_models(
        &self,
        params: &ModelSearchParams,
    ) -> Result<Vec<ModelSummary>, ClientError> {
        let url = self.endpoint(["models"])?;
        self.get_json_with_query(url, params).await
    }

    /// Latest version of every active model, with details.
    pub async fn list_latest_models(&self) -> Result<Vec<LatestModelResponse>, ClientError> {
        let url = self.endpoint(["models", "latest"])?;
        self.get_json(url).await
    }

    pub async fn get_model(&self, model_id: &str) -> Result<ModelResponse, ClientError> {
        let url = self.endpoint(["models", model_id])?;
        self.get_json(url).await
    }

    pub async fn get_model_versions(
        &self,
        model_id: &str,
    ) -> Result<Vec<ModelVersionResponse>, ClientError> {
        let url = self.endpoint(["models", model_id, "versions"])?;
        self.get_json(url).await
    }

    pub async fn get_model_version(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<ModelVersionDetailsResponse, ClientError> {
        let url = self.endpoint(["models", model_id, "versions", version])?;
        self.get_json(url).await
    }

    pub async fn get_model_version_sample_input(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(["models", model_id, "versions", version, "sample-input"])?;
        self.get_json(url).await
    }

    pub async fn get_model_version_sample_output(
        &self,
        model_id: &str,
        version: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(["models", model_id, "versions", version, "sample-output"])?;
        self.get_json(url).await
    }

    pub async fn list_tags(&self) -> Result<Vec<TagSchema>, ClientError> {
        let url = self.endpoint(["models", "tags"])?;
        self.get_json(url).await
    }

    /// Tags with the given identifiers and the models carrying them.
    pub async fn get_tags_and_models<I>(
        &self,
        tag_ids: I,
    ) -> Result<TagsAndModelsResponse, ClientError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids = tag_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = self.endpoint(["models", "tags", ids.as_str()])?;
        self.get_json(url).await
    }

    /// Submit a job. Without inputs the job stays open until [`Client::close_job`] is called.
    pub async fn submit_job(&self, request: &SubmitJobRequest) -> Result<JobResponse, ClientError> {
        let url = self.endpoint(["jobs"])?;
        self.post_json(url, request).await
    }

    pub async fn get_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        let url = self.endpoint(["jobs", job_identifier])?;
        self.get_json(url).await
    }

    pub async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        let url = self.endpoint(["jobs", job_identifier])?;
        self.delete_json(url).await
    }

    /// Signal that every input of an open job has been submitted.
    ///
    /// Any successful response closes the job. The job record is returned when the body holds
    /// one and `None` otherwise.
    pub async fn close_job(
        &self,
        job_identifier: &str,
    ) -> Result<Option<JobResponse>, ClientError> {
        let url = self.endpoint(["jobs", job_identifier, "close"])?;
        let response = self
            .send(self.request(Method::POST, url).json(&serde_json::json!({})))
            .await?;
        let body = response.bytes().await?;
        match serde_json::from_slice::<JobResponse>(&body) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                log::debug!("Job {job_identifier} closed without a job record in the body: {e}");
                Ok(None)
            }
        }
    }

    /// Operational limits of the job service, such as `inputChunkMaximumSize`.
    pub async fn get_job_features(&self) -> Result<FeaturesResponse, ClientError> {
        let url = self.endpoint(["jobs", "features"])?;
        self.get_json(url).await
    }

    /// Append one chunk to the input `item_key` of slot `slot_key` of an open job.
    pub async fn append_input_chunk(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<(), ClientError> {
        let request = self.input_chunk_request(job_identifier, slot_key, item_key, chunk)?;
        self.send(request).await?;
        Ok(())
    }

    fn input_chunk_request(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoint(["jobs", job_identifier, slot_key, item_key])?;
        let part = Part::bytes(chunk).file_name(item_key.to_string());
        let form = Form::new().part(INPUT_CHUNK_FIELD, part);
        Ok(self.request(Method::POST, url).multipart(form))
    }

    pub async fn get_job_history(
        &self,
        params: &JobHistoryParams,
    ) -> Result<Vec<JobResponse>, ClientError> {
        let url = self.endpoint(["jobs", "history"])?;
        self.get_json_with_query(url, params).await
    }

    pub async fn get_result(&self, job_identifier: &str) -> Result<ResultResponse, ClientError> {
        let url = self.endpoint(["results", job_identifier])?;
        self.get_json(url).await
    }

    fn output_url(
        &self,
        job_identifier: &str,
        input_key: &str,
        output_name: &str,
    ) -> Result<Url, ClientError> {
        self.endpoint([
            "results",
            job_identifier,
            "datasource",
            input_key,
            "output",
            output_name,
        ])
    }

    /// Raw bytes of one output of one input.
    pub async fn get_output_contents(
        &self,
        job_identifier: &str,
        input_key: &str,
        output_name: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.output_url(job_identifier, input_key, output_name)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn get_output_json(
        &self,
        job_identifier: &str,
        input_key: &str,
        output_name: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.output_url(job_identifier, input_key, output_name)?;
        self.get_json(url).await
    }

    /// API keys owned by the user with this email.
    pub async fn get_api_keys(&self, email: &str) -> Result<Vec<AccessKeyResponse>, ClientError> {
        let url = self.endpoint(["accounting", "access-keys", "user", email])?;
        self.get_json(url).await
    }

    /// Body of the API key with this prefix.
    pub async fn get_key_body(&self, prefix: &str) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(["accounting", "access-keys", prefix, "hash"])?;
        self.post_json(url, &serde_json::json!({})).await
    }

    pub async fn get_processing_engines(&self) -> Result<Vec<EngineResponse>, ClientError> {
        let url = self.endpoint(["resources", "processing", "engines"])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::new(base.parse().unwrap(), ModzyCredentials::new("key")).unwrap()
    }

    #[test]
    fn default_base_url_is_a_directory() {
        let client = client(DEFAULT_BASE_URL);
        let url = client.endpoint(["jobs", "features"]).unwrap();
        assert_eq!(url.as_str(), "https://app.modzy.com/api/jobs/features");
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let client = client("https://modzy.example.com/api");
        assert_eq!(client.base_url().as_str(), "https://modzy.example.com/api/");
        let url = client.endpoint(["models", "ed542963de", "versions"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://modzy.example.com/api/models/ed542963de/versions"
        );
    }

    #[test]
    fn chunk_endpoint_encodes_keys() {
        let client = client(DEFAULT_BASE_URL);
        let url = client
            .endpoint(["jobs", "job-1", "my input", "dir/input.txt"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://app.modzy.com/api/jobs/job-1/my%20input/dir%2Finput.txt"
        );
    }

    #[test]
    fn rejects_empty_api_key() {
        let err = Client::new(DEFAULT_BASE_URL.parse().unwrap(), ModzyCredentials::new(" "))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials(_)));
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = Client::new(
            "mailto:ops@modzy.com".parse().unwrap(),
            ModzyCredentials::new("key"),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn tag_and_accounting_endpoints() {
        let client = client(DEFAULT_BASE_URL);
        assert_eq!(
            client.endpoint(["models", "tags", "vision,text"]).unwrap().as_str(),
            "https://app.modzy.com/api/models/tags/vision,text"
        );
        assert_eq!(
            client
                .endpoint(["accounting", "access-keys", "user", "ops@modzy.com"])
                .unwrap()
                .as_str(),
            "https://app.modzy.com/api/accounting/access-keys/user/ops@modzy.com"
        );
    }

    #[test]
    fn input_chunk_request_is_an_authorized_multipart_post() {
        let client = client(DEFAULT_BASE_URL);
        let request = client
            .input_chunk_request("job-1", "0001", "input.txt", b"hello".to_vec())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://app.modzy.com/api/jobs/job-1/0001/input.txt"
        );
        assert_eq!(request.headers()[AUTHORIZATION], "ApiKey key");
        let content_type = request.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    mod stub {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};
        use tokio::task::JoinHandle;

        /// Serves a single request with a canned response and hands back the raw request.
        pub async fn serve_once(
            status: &'static str,
            body: &'static str,
        ) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}/api/", listener.local_addr().unwrap());
            let handle = tokio::spawn(async move {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
                request
            });
            (base, handle)
        }

        async fn read_request(stream: &mut TcpStream) -> String {
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !is_complete(&raw) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            String::from_utf8_lossy(&raw).into_owned()
        }

        fn is_complete(raw: &[u8]) -> bool {
            let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
                return false;
            };
            let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            match content_length {
                Some(len) => raw.len() - end - 4 >= len,
                None if head.contains("transfer-encoding: chunked") => {
                    raw.ends_with(b"0\r\n\r\n")
                }
                None => true,
            }
        }
    }

    fn stub_client(base: &str) -> Client {
        Client::new(base.parse().unwrap(), ModzyCredentials::new("secret")).unwrap()
    }

    #[tokio::test]
    async fn rejected_chunk_reaches_the_server_as_a_named_part() {
        let (base, server) = stub::serve_once(
            "500 Internal Server Error",
            r#"{"statusCode":500,"status":"Internal Server Error","message":"disk full"}"#,
        )
        .await;
        let client = stub_client(&base);

        let err = client
            .append_input_chunk("job-1", "0001", "input.txt", b"chunk-bytes".to_vec())
            .await
            .unwrap_err();

        match err {
            ClientError::InternalServerError(body) => assert_eq!(body.message, "disk full"),
            other => panic!("unexpected error: {other:?}"),
        }

        let request = server.await.unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /api/jobs/job-1/0001/input.txt HTTP/1.1"));
        assert!(lowered.contains("authorization: apikey secret"));
        assert!(lowered.contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains(r#"name="input""#));
        assert!(request.contains(r#"filename="input.txt""#));
        assert!(request.contains("chunk-bytes"));
    }

    #[tokio::test]
    async fn client_errors_keep_their_status() {
        let (base, server) =
            stub::serve_once("400 Bad Request", r#"{"message":"bad model"}"#).await;
        let client = stub_client(&base);

        let err = client.get_job("job-1").await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
        assert!(matches!(
            err,
            ClientError::ApiError { ref body, .. } if body.message == "bad model"
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn close_accepts_a_body_without_a_job_record() {
        let (base, server) = stub::serve_once("200 OK", r#"{"closed":true}"#).await;
        let client = stub_client(&base);

        let closed = client.close_job("job-1").await.unwrap();

        assert!(closed.is_none());
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/jobs/job-1/close HTTP/1.1"));
    }

    #[tokio::test]
    async fn close_returns_the_job_record_when_present() {
        let (base, server) =
            stub::serve_once("200 OK", r#"{"jobIdentifier":"job-1","status":"SUBMITTED"}"#)
                .await;
        let client = stub_client(&base);

        let closed = client.close_job("job-1").await.unwrap().unwrap();

        assert_eq!(closed.job_identifier, "job-1");
        server.await.unwrap();
    }
}
