// Solr向けHTTPシンク
// `<endpoint>/update?commit=true` に `[{"id", "text"}]` をPOSTする

use super::{Sink, UpsertStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SOLR_URL: &str = "http://localhost:8983/solr/sources";

#[derive(Debug, Clone)]
pub struct SolrSink {
    client: reqwest::Client,
    update_url: String,
}

#[derive(Serialize)]
struct SolrDocument<'a> {
    id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct UpdateResponse {
    #[serde(rename = "responseHeader")]
    response_header: ResponseHeader,
}

#[derive(Deserialize)]
struct ResponseHeader {
    status: i32,
    #[serde(rename = "QTime", default)]
    q_time: u64,
}

impl SolrSink {
    /// コア（コレクション）のURLからシンクを作成
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let base = endpoint.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            anyhow::bail!("SolrのURLはhttp(s)である必要があります: {endpoint}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("HTTPクライアントの作成に失敗しました")?;

        Ok(Self {
            client,
            update_url: format!("{base}/update?commit=true"),
        })
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

#[async_trait]
impl Sink for SolrSink {
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus> {
        let documents = [SolrDocument { id, text: content }];

        let response = self
            .client
            .post(&self.update_url)
            .json(&documents)
            .send()
            .await
            .with_context(|| format!("Solrへの送信に失敗しました: {}", self.update_url))?;

        let http_status = response.status();
        if !http_status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Solrがエラーを返しました: {http_status} {body}");
        }

        let body: UpdateResponse = response
            .json()
            .await
            .context("Solrの応答を解析できません")?;
        let header = body.response_header;
        debug!(id, status = header.status, q_time = header.q_time, "Solr update acknowledged");

        Ok(if header.status == 0 {
            UpsertStatus::accepted()
        } else {
            UpsertStatus::rejected(header.status)
        })
    }
}
