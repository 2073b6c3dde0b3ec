use modzy_api::schemas::AccessKeyResponse;
use modzy_api::{Client, ClientError};

/// API keys of account users.
#[derive(Debug, Clone)]
pub struct AccountingClient {
    client: Client,
}

impl AccountingClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Access keys owned by the user registered with `email`.
    pub async fn api_keys(&self, email: &str) -> Result<Vec<AccessKeyResponse>, ClientError> {
        self.client.get_api_keys(email).await
    }

    /// Body of the access key with this prefix.
    pub async fn key_body(&self, prefix: &str) -> Result<serde_json::Value, ClientError> {
        self.client.get_key_body(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modzy_api::ModzyCredentials;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with a JSON body and returns the request head.
    async fn answer_once(body: &'static str) -> (Client, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api/", listener.local_addr().unwrap());
        let client = Client::new(base.parse().unwrap(), ModzyCredentials::new("secret")).unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !is_complete(&raw) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        (client, handle)
    }

    fn is_complete(raw: &[u8]) -> bool {
        let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() - end - 4 >= body_len
    }

    #[tokio::test]
    async fn lists_the_keys_of_a_user() {
        let (client, server) = answer_once(
            r#"[{"prefix":"Ab12","accountIdentifier":"acct","ownerEmail":"ops@modzy.com","isDefault":true}]"#,
        )
        .await;

        let keys = AccountingClient::new(client)
            .api_keys("ops@modzy.com")
            .await
            .unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].prefix, "Ab12");
        assert!(keys[0].is_default);
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/accounting/access-keys/user/ops@modzy.com HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: apikey secret"));
    }

    #[tokio::test]
    async fn fetches_a_key_body() {
        let (client, server) = answer_once(r#"{"prefix":"Ab12","body":"hashed"}"#).await;

        let body = AccountingClient::new(client).key_body("Ab12").await.unwrap();

        assert_eq!(body["body"], "hashed");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/accounting/access-keys/Ab12/hash HTTP/1.1"));
    }
}
