//! OCR 客户端
//!
//! 封装 Azure Document Intelligence prebuilt-read 的调用：
//! 提交图片 → 轮询 Operation-Location → 取出逐行文本

use crate::config::Config;
use crate::error::{AppResult, OcrError};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const ANALYZE_PATH: &str =
    "documentintelligence/documentModels/prebuilt-read:analyze?api-version=2024-11-30";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// 文字识别能力
pub trait TextDetector: Send + Sync {
    /// 识别图片中的文字，按阅读顺序返回每一行
    fn detect_lines(&self, image: Vec<u8>) -> impl Future<Output = AppResult<Vec<String>>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    #[serde(default)]
    status: String,
    analyze_result: Option<AnalyzeResult>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<AnalyzedPage>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedPage {
    #[serde(default)]
    lines: Vec<AnalyzedLine>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedLine {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: Option<String>,
}

impl AnalyzeResult {
    fn into_lines(self) -> Vec<String> {
        self.pages
            .into_iter()
            .flat_map(|page| page.lines)
            .map(|line| line.content)
            .collect()
    }
}

/// Azure prebuilt-read 客户端
pub struct AzureReadClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: usize,
}

impl AzureReadClient {
    /// 创建新的 OCR 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.ocr_endpoint.trim_end_matches('/').to_string(),
            api_key: config.ocr_api_key.clone(),
            poll_interval: Duration::from_millis(config.ocr_poll_interval_ms),
            max_polls: config.ocr_max_polls,
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/{}", self.endpoint, ANALYZE_PATH)
    }

    /// 提交图片，返回结果轮询地址
    async fn submit(&self, image: Vec<u8>) -> AppResult<String> {
        let response = self
            .http
            .post(self.analyze_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|source| OcrError::RequestFailed { source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::BadResponse {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let location = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .ok_or(OcrError::MissingOperationLocation)?
            .to_string();

        Ok(location)
    }

    /// 轮询分析结果直到成功、失败或次数用尽
    async fn poll(&self, location: &str) -> AppResult<Vec<String>> {
        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let operation: AnalyzeOperation = self
                .http
                .get(location)
                .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
                .send()
                .await
                .map_err(|source| OcrError::RequestFailed { source })?
                .json()
                .await
                .map_err(|source| OcrError::RequestFailed { source })?;

            debug!("OCR 轮询第 {} 次: status={}", attempt, operation.status);

            match operation.status.as_str() {
                "succeeded" => {
                    let lines = operation
                        .analyze_result
                        .map(AnalyzeResult::into_lines)
                        .unwrap_or_default();
                    return Ok(lines);
                }
                "failed" => {
                    let message = operation
                        .error
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(OcrError::AnalysisFailed { message }.into());
                }
                _ => {}
            }
        }

        Err(OcrError::Timeout {
            attempts: self.max_polls,
        }
        .into())
    }
}

impl TextDetector for AzureReadClient {
    async fn detect_lines(&self, image: Vec<u8>) -> AppResult<Vec<String>> {
        if self.endpoint.is_empty() || self.api_key.is_empty() {
            return Err(OcrError::NotConfigured.into());
        }
        if image.is_empty() {
            return Err(OcrError::EmptyImage.into());
        }

        let location = self.submit(image).await?;
        let lines = self.poll(&location).await?;
        info!("✓ OCR 完成，识别到 {} 行文字", lines.len());
        Ok(lines)
    }
}
