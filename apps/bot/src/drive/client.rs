//! Thin Google Drive v3 REST client.
//!
//! Uploads are two-step: create the file metadata (name + parent folder),
//! then PATCH the content as a media upload.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::google::{AuthError, TokenProvider};

const DRIVE_API_URL: &str = "https://www.googleapis.com";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// A file stored on the drive, with the shareable link when available.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default, rename = "webViewLink")]
    pub web_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<UploadedFile>,
}

pub struct DriveClient {
    http: Client,
    auth: Arc<TokenProvider>,
    base_url: String,
    /// Optional parent under which all candidate folders live.
    root_folder_id: Option<String>,
}

impl DriveClient {
    pub fn new(auth: Arc<TokenProvider>, root_folder_id: Option<String>) -> Self {
        Self {
            http: Client::new(),
            auth,
            base_url: DRIVE_API_URL.to_string(),
            root_folder_id,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(auth: Arc<TokenProvider>, base_url: String) -> Self {
        Self {
            http: Client::new(),
            auth,
            base_url,
            root_folder_id: None,
        }
    }

    /// Finds a folder by exact name, searching under the configured root.
    pub async fn find_folder(&self, name: &str) -> Result<Option<String>, DriveError> {
        let mut query = format!(
            "name = '{}' and mimeType = '{FOLDER_MIME}' and trashed = false",
            escape_query(name)
        );
        if let Some(root) = &self.root_folder_id {
            query.push_str(&format!(" and '{}' in parents", escape_query(root)));
        }

        let response = self
            .http
            .get(format!("{}/drive/v3/files", self.base_url))
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        let list: FileList = read_json(response).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// Creates a folder and returns its id.
    pub async fn create_folder(&self, name: &str) -> Result<String, DriveError> {
        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(root) = &self.root_folder_id {
            metadata["parents"] = json!([root]);
        }

        let response = self
            .http
            .post(format!("{}/drive/v3/files", self.base_url))
            .query(&[("fields", "id,name")])
            .bearer_auth(self.bearer().await?)
            .json(&metadata)
            .send()
            .await?;
        let folder: UploadedFile = read_json(response).await?;
        info!("created drive folder '{name}' ({})", folder.id);
        Ok(folder.id)
    }

    /// Returns the id of the named folder, creating it when missing.
    pub async fn ensure_folder(&self, name: &str) -> Result<String, DriveError> {
        if let Some(id) = self.find_folder(name).await? {
            debug!("drive folder '{name}' already exists ({id})");
            return Ok(id);
        }
        self.create_folder(name).await
    }

    /// Uploads a byte stream into a folder and returns the file with its
    /// shareable link.
    pub async fn upload_bytes(
        &self,
        folder_id: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, DriveError> {
        // Step 1: metadata.
        let response = self
            .http
            .post(format!("{}/drive/v3/files", self.base_url))
            .query(&[("fields", "id")])
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "name": file_name, "parents": [folder_id] }))
            .send()
            .await?;
        let created: UploadedFile = read_json(response).await?;

        // Step 2: content.
        let response = self
            .http
            .patch(format!(
                "{}/upload/drive/v3/files/{}",
                self.base_url, created.id
            ))
            .query(&[("uploadType", "media"), ("fields", "id,webViewLink")])
            .bearer_auth(self.bearer().await?)
            .header("content-type", mime_type)
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadedFile = read_json(response).await?;
        info!("uploaded '{file_name}' to drive ({})", uploaded.id);
        Ok(uploaded)
    }

    /// Grants anyone-with-link read access.
    pub async fn share_public(&self, file_id: &str) -> Result<(), DriveError> {
        let response = self
            .http
            .post(format!(
                "{}/drive/v3/files/{}/permissions",
                self.base_url, file_id
            ))
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn bearer(&self) -> Result<String, DriveError> {
        Ok(self.auth.bearer().await?)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DriveError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DriveError::Api {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json().await?)
}

/// Escapes single quotes and backslashes for Drive query strings.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> DriveClient {
        let auth = Arc::new(TokenProvider::test_static("tok"));
        DriveClient::with_base_url(auth, base_url)
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("it's"), "it\\'s");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
    }

    #[tokio::test]
    async fn test_find_folder_returns_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [{"id": "f1", "name": "k_1\nИван"}, {"id": "f2", "name": "dup"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        assert_eq!(
            client.find_folder("k_1\nИван").await.unwrap(),
            Some("f1".to_string())
        );
    }

    #[tokio::test]
    async fn test_ensure_folder_creates_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files"))
            .and(body_partial_json(serde_json::json!({
                "mimeType": "application/vnd.google-apps.folder"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "new-folder"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        assert_eq!(client.ensure_folder("Имя").await.unwrap(), "new-folder");
    }

    #[tokio::test]
    async fn test_upload_bytes_two_step() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files"))
            .and(body_partial_json(serde_json::json!({
                "name": "resume.pdf", "parents": ["folder1"]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "file9"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/upload/drive/v3/files/file9"))
            .and(query_param("uploadType", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "file9", "webViewLink": "https://drive/file9"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let uploaded = client
            .upload_bytes("folder1", "resume.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(uploaded.id, "file9");
        assert_eq!(uploaded.web_link.as_deref(), Some("https://drive/file9"));
    }

    #[tokio::test]
    async fn test_share_public_surfaces_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        assert!(matches!(
            client.share_public("file9").await.unwrap_err(),
            DriveError::Api { status: 403, .. }
        ));
    }
}
