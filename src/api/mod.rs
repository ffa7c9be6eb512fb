use std::{
    future::Future,
    time::Duration,
};

use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    http::{
        ensure_success,
        http_client,
    },
    KanjiError,
    KanjiRecord,
};

pub const DEFAULT_API_BASE: &str = "https://kanjiapi.dev/v1";

/// Where level lists and kanji details come from. The session only talks to
/// this trait so tests and offline front ends can plug in their own data.
pub trait KanjiSource {
    fn fetch_level(&self, level_id: &str) -> impl Future<Output = Result<Vec<String>, KanjiError>> + Send;

    fn fetch_details(&self, character: &str) -> impl Future<Output = Result<KanjiRecord, KanjiError>> + Send;
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct KanjiDetails {
    pub kanji: Option<String>,
    #[serde(default)]
    pub on_readings: Option<Vec<String>>,
    #[serde(default)]
    pub kun_readings: Option<Vec<String>>,
    #[serde(default)]
    pub meanings: Option<Vec<String>>,
    pub stroke_count: Option<u32>,
    pub grade: Option<u8>,
    pub jlpt: Option<u8>,
}

impl KanjiDetails {
    pub fn into_record(self, character: &str) -> KanjiRecord {
        KanjiRecord {
            character: self.kanji.unwrap_or_else(|| character.to_string()),
            on_readings: self.on_readings.unwrap_or_default(),
            kun_readings: self.kun_readings.unwrap_or_default(),
            meanings: self.meanings.unwrap_or_default(),
            stroke_count: self.stroke_count,
            grade: self.grade,
            jlpt: self.jlpt,
        }
    }
}

/// Parses a level list body. Anything other than a non-empty array of
/// strings means the level has nothing to study.
pub fn parse_level_list(level_id: &str, body: serde_json::Value) -> Result<Vec<String>, KanjiError> {
    let items: Vec<String> = match body {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if items.is_empty() {
        return Err(KanjiError::EmptyLevel(level_id.to_string()));
    }
    Ok(items)
}

#[derive(Debug, Clone)]
pub struct KanjiApi {
    client: Client,
    base_url: String,
}

impl KanjiApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KanjiError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn kanji_url(&self, key: &str) -> String {
        format!("{}/kanji/{}", self.base_url, key)
    }

    async fn get_body(&self, key: &str) -> Result<Vec<u8>, KanjiError> {
        let url = self.kanji_url(key);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        ensure_success(&response)?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl KanjiSource for KanjiApi {
    async fn fetch_level(&self, level_id: &str) -> Result<Vec<String>, KanjiError> {
        let body = self.get_body(level_id).await?;
        // Empty or garbled bodies count as an empty level.
        let value = serde_json::from_slice(&body).unwrap_or_else(|e| {
            log::warn!("Unreadable level list for {}: {}", level_id, e);
            serde_json::Value::Null
        });
        parse_level_list(level_id, value)
    }

    async fn fetch_details(&self, character: &str) -> Result<KanjiRecord, KanjiError> {
        let body = self.get_body(character).await?;
        let details: KanjiDetails = serde_json::from_slice(&body)?;
        Ok(details.into_record(character))
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{
            AsyncReadExt,
            AsyncWriteExt,
        },
        net::TcpListener,
    };

    use super::*;

    /// Serves exactly one canned HTTP response and returns an API pointed at it.
    async fn serve_once(status_line: &'static str, body: &'static str) -> KanjiApi {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        KanjiApi::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_level_list() {
        let api = serve_once("200 OK", r#"["日","一"]"#).await;
        assert_eq!(api.fetch_level("jlpt-5").await.unwrap(), vec!["日", "一"]);
    }

    #[tokio::test]
    async fn test_http_not_found_is_status_error() {
        let api = serve_once("404 Not Found", r#"{"error":"not found"}"#).await;
        match api.fetch_level("jlpt-9").await {
            Err(e @ KanjiError::HttpStatus { status: 404, .. }) => assert!(e.is_network()),
            other => panic!("Expected HttpStatus 404, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_empty_level_bodies() {
        for body in ["", "not json", r#"{"error":"nope"}"#, "[]"] {
            let api = serve_once("200 OK", body).await;
            match api.fetch_level("jlpt-5").await {
                Err(e @ KanjiError::EmptyLevel(_)) => assert!(!e.is_network()),
                other => panic!("Expected EmptyLevel for {:?}, got {:?}", body, other),
            }
        }
    }

    #[tokio::test]
    async fn test_http_details_with_null_arrays() {
        let api = serve_once(
            "200 OK",
            r#"{"kanji":"々","on_readings":null,"kun_readings":null,"meanings":["repetition"]}"#,
        )
        .await;
        let record = api.fetch_details("々").await.unwrap();

        assert!(!record.is_available(crate::core::AnswerField::OnReading));
        assert!(!record.is_available(crate::core::AnswerField::KunReading));
        assert!(record.is_available(crate::core::AnswerField::Meaning));
    }

    #[tokio::test]
    async fn test_http_garbled_details_is_json_error() {
        let api = serve_once("200 OK", "<html>").await;
        assert!(matches!(api.fetch_details("日").await, Err(KanjiError::Json(_))));
    }

    #[test]
    fn test_parse_level_list() {
        let body = serde_json::json!(["日", "一", "国"]);
        assert_eq!(parse_level_list("jlpt-5", body).unwrap(), vec!["日", "一", "国"]);
    }

    #[test]
    fn test_parse_level_list_empty_or_invalid() {
        for body in [serde_json::json!([]), serde_json::json!({ "error": "nope" }), serde_json::json!([1, 2])]
        {
            match parse_level_list("jlpt-9", body) {
                Err(KanjiError::EmptyLevel(level)) => assert_eq!(level, "jlpt-9"),
                other => panic!("Expected EmptyLevel, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_details_with_missing_fields() {
        let body = serde_json::json!({
            "kanji": "々",
            "on_readings": [],
            "kun_readings": null,
            "stroke_count": 3,
        });
        let details: KanjiDetails = serde_json::from_value(body).unwrap();
        let record = details.into_record("々");

        assert_eq!(record.character, "々");
        assert!(record.on_readings.is_empty());
        assert!(record.kun_readings.is_empty());
        assert!(record.meanings.is_empty());
        assert_eq!(record.stroke_count, Some(3));
        assert!(!record.has_any_data());
    }

    #[test]
    fn test_details_full_record() {
        let body = serde_json::json!({
            "kanji": "行",
            "grade": 2,
            "stroke_count": 6,
            "meanings": ["going", "journey", "carry out"],
            "kun_readings": ["い.く", "ゆ.く", "おこな.う"],
            "on_readings": ["コウ", "ギョウ", "アン"],
            "jlpt": 4,
            "unicode": "884c",
        });
        let details: KanjiDetails = serde_json::from_value(body).unwrap();
        let record = details.into_record("行");

        assert_eq!(record.kun_readings.len(), 3);
        assert_eq!(record.jlpt, Some(4));
        assert_eq!(record.grade, Some(2));
    }

    #[test]
    fn test_api_urls() {
        let api = KanjiApi::new("https://kanjiapi.dev/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base_url(), "https://kanjiapi.dev/v1");
        assert_eq!(api.kanji_url("jlpt-5"), "https://kanjiapi.dev/v1/kanji/jlpt-5");
    }
}
