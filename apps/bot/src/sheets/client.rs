//! Thin Google Sheets v4 REST client.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::google::{AuthError, TokenProvider};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

pub struct SheetsClient {
    http: Client,
    auth: Arc<TokenProvider>,
    base_url: String,
    spreadsheet_id: String,
    /// Worksheet title → numeric sheetId, filled lazily from metadata.
    sheet_ids: Mutex<HashMap<String, i64>>,
}

impl SheetsClient {
    pub fn new(auth: Arc<TokenProvider>, spreadsheet_id: String) -> Self {
        Self {
            http: Client::new(),
            auth,
            base_url: SHEETS_API_URL.to_string(),
            spreadsheet_id,
            sheet_ids: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(auth: Arc<TokenProvider>, spreadsheet_id: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            auth,
            base_url,
            spreadsheet_id,
            sheet_ids: Mutex::new(HashMap::new()),
        }
    }

    /// All cell values of a worksheet as trimmed-to-content string rows.
    pub async fn values(&self, tab: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            percent_encode(&quote_tab(tab)),
        );
        let response = self.http.get(url).bearer_auth(self.bearer().await?).send().await?;
        let range: ValueRange = Self::read_json(response, tab).await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Appends one row after the last data row of a worksheet.
    /// Empty values are stored as `"."` so later column lookups stay aligned.
    pub async fn append_row(&self, tab: &str, row: &[String]) -> Result<(), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url,
            self.spreadsheet_id,
            percent_encode(&quote_tab(tab)),
        );
        let row: Vec<String> = row
            .iter()
            .map(|v| {
                let v = v.trim();
                if v.is_empty() { ".".to_string() } else { v.to_string() }
            })
            .collect();
        let response = self
            .http
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        Self::read_ok(response, tab).await?;
        debug!("appended row to '{tab}'");
        Ok(())
    }

    /// Writes a rectangular block of values at an A1 range inside a tab.
    pub async fn update_range(
        &self,
        tab: &str,
        cells: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let range = format!("{}!{}", quote_tab(tab), cells);
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}?valueInputOption=USER_ENTERED",
            self.base_url,
            self.spreadsheet_id,
            percent_encode(&range),
        );
        let response = self
            .http
            .put(url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        Self::read_ok(response, tab).await
    }

    /// Updates one cell addressed by 1-based row and column.
    pub async fn update_cell(
        &self,
        tab: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetsError> {
        let cell = format!("{}{row}", col_letter(col));
        self.update_range(tab, &cell, &[vec![value.to_string()]]).await
    }

    /// Deletes worksheet rows by 1-based index. Indexes are applied from the
    /// bottom up so earlier deletions do not shift later ones.
    pub async fn delete_rows(&self, tab: &str, rows: &[usize]) -> Result<(), SheetsError> {
        if rows.is_empty() {
            return Ok(());
        }
        let sheet_id = self.sheet_id(tab).await?;
        let mut sorted = rows.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let requests: Vec<serde_json::Value> = sorted
            .iter()
            .map(|row| {
                json!({
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row - 1,
                            "endIndex": row,
                        }
                    }
                })
            })
            .collect();

        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base_url, self.spreadsheet_id
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        Self::read_ok(response, tab).await
    }

    /// Titles of every worksheet in the spreadsheet; refreshes the sheet-id
    /// cache as a side effect.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let meta = self.fetch_metadata().await?;
        let mut ids = self.sheet_ids.lock().await;
        ids.clear();
        let mut titles = Vec::with_capacity(meta.sheets.len());
        for sheet in meta.sheets {
            titles.push(sheet.properties.title.clone());
            ids.insert(sheet.properties.title, sheet.properties.sheet_id);
        }
        Ok(titles)
    }

    async fn sheet_id(&self, tab: &str) -> Result<i64, SheetsError> {
        {
            let ids = self.sheet_ids.lock().await;
            if let Some(id) = ids.get(tab) {
                return Ok(*id);
            }
        }
        self.worksheet_titles().await?;
        let ids = self.sheet_ids.lock().await;
        ids.get(tab)
            .copied()
            .ok_or_else(|| SheetsError::WorksheetNotFound(tab.to_string()))
    }

    async fn fetch_metadata(&self) -> Result<SpreadsheetMeta, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties(sheetId,title)",
            self.base_url, self.spreadsheet_id
        );
        let response = self.http.get(url).bearer_auth(self.bearer().await?).send().await?;
        Self::read_json(response, "").await
    }

    async fn bearer(&self) -> Result<String, SheetsError> {
        Ok(self.auth.bearer().await?)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        tab: &str,
    ) -> Result<T, SheetsError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), response, tab).await);
        }
        Ok(response.json().await?)
    }

    async fn read_ok(response: reqwest::Response, tab: &str) -> Result<(), SheetsError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), response, tab).await);
        }
        Ok(())
    }

    async fn api_error(status: u16, response: reqwest::Response, tab: &str) -> SheetsError {
        let message = response.text().await.unwrap_or_default();
        // A missing worksheet surfaces as "Unable to parse range".
        if status == 400 && message.contains("Unable to parse range") && !tab.is_empty() {
            return SheetsError::WorksheetNotFound(tab.to_string());
        }
        SheetsError::Api { status, message }
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Wraps a worksheet title in single quotes for an A1 range, escaping
/// embedded quotes.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Percent-encodes an A1 range for use as a URL path segment.
fn percent_encode(range: &str) -> String {
    let mut out = String::with_capacity(range.len());
    for byte in range.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'!' | b':' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// 1-based column index → letter: 1 → A, 26 → Z, 27 → AA.
pub fn col_letter(mut col: usize) -> String {
    debug_assert!(col >= 1);
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> SheetsClient {
        let auth = Arc::new(TokenProvider::test_static("tok"));
        SheetsClient::with_base_url(auth, "sheet123".to_string(), base_url)
    }

    #[test]
    fn test_col_letter() {
        assert_eq!(col_letter(1), "A");
        assert_eq!(col_letter(7), "G");
        assert_eq!(col_letter(26), "Z");
        assert_eq!(col_letter(27), "AA");
        assert_eq!(col_letter(28), "AB");
    }

    #[test]
    fn test_quote_tab_escapes_quotes() {
        assert_eq!(quote_tab("Имя"), "'Имя'");
        assert_eq!(quote_tab("It's"), "'It''s'");
    }

    #[test]
    fn test_percent_encode_keeps_a1_punctuation() {
        assert_eq!(percent_encode("'Tab'!A1:B2"), "%27Tab%27!A1:B2");
        assert!(percent_encode("'Имя'").contains('%'));
    }

    #[tokio::test]
    async fn test_values_parses_mixed_cells() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "'Tab'!A1:C2",
                "values": [["id", "Фамилия"], ["k_12345", 200000, true]]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let values = client.values("Tab").await.unwrap();
        assert_eq!(values[0], vec!["id", "Фамилия"]);
        assert_eq!(values[1], vec!["k_12345", "200000", "true"]);
    }

    #[tokio::test]
    async fn test_values_maps_missing_worksheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string("Unable to parse range: 'Nope'!A1"),
            )
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        match client.values("Nope").await.unwrap_err() {
            SheetsError::WorksheetNotFound(tab) => assert_eq!(tab, "Nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_append_row_fills_empty_cells() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "values": [["k_12345", ".", "Иванов"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        client
            .append_row(
                "Tab",
                &["k_12345".to_string(), "  ".to_string(), "Иванов".to_string()],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_rows_batches_bottom_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sheets": [{"properties": {"sheetId": 77, "title": "Tab"}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "requests": [
                    {"deleteDimension": {"range": {"sheetId": 77, "dimension": "ROWS", "startIndex": 4, "endIndex": 5}}},
                    {"deleteDimension": {"range": {"sheetId": 77, "dimension": "ROWS", "startIndex": 1, "endIndex": 2}}}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        client.delete_rows("Tab", &[2, 5]).await.unwrap();
    }
}
