use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequest, Role,
    },
    Client,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::analytics::DigestPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Trend,
    Anomaly,
    Recommendation,
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub confidence: f64,
}

/// Client for the external insight narrator. Constructed explicitly and
/// injected through `AppState` so the analytics core stays free of hidden
/// shared state.
#[derive(Clone)]
pub struct InsightAgent {
    client: Client<OpenAIConfig>,
    model: String,
}

impl InsightAgent {
    pub fn new(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);

        Self {
            client: Client::with_config(config),
            model: "gpt-4o-mini".to_string(),
        }
    }

    /// Narrates a dataset digest into 4-6 structured insights. The digest is
    /// already bounded (fixed row sample, truncated string fields), so the
    /// prompt size does not grow with the dataset.
    pub async fn generate_insights(
        &self,
        digest: &DigestPayload,
    ) -> Result<Vec<Insight>, AppError> {
        let prompt = render_digest_prompt(digest)?;

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: "You are a data analysis expert. Provide insights in JSON format only."
                    .to_string(),
                name: None,
                role: Role::System,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt),
                name: None,
                role: Role::User,
            }),
        ];

        let request = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.7),
            max_tokens: Some(1500),
            ..Default::default()
        };

        tracing::info!("Requesting insights for dataset: {}", digest.dataset_name);
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let insights = parse_insights(&content)?;
        tracing::info!("Parsed {} insights", insights.len());
        Ok(insights.into_iter().map(sanitize_insight).collect())
    }
}

fn render_digest_prompt(digest: &DigestPayload) -> Result<String, AppError> {
    let stats_lines: Vec<String> = digest
        .statistics
        .iter()
        .map(|(column, stats)| {
            if stats.is_date {
                format!(
                    "- {}: from {} to {} ({} values)",
                    column,
                    format_epoch_millis(stats.min as i64),
                    format_epoch_millis(stats.max as i64),
                    stats.count
                )
            } else {
                format!(
                    "- {}: min={:.2}, max={:.2}, avg={:.2}",
                    column, stats.min, stats.max, stats.avg
                )
            }
        })
        .collect();

    let text_columns = if digest.text_columns.is_empty() {
        "None".to_string()
    } else {
        digest.text_columns.join(", ")
    };

    let samples = serde_json::to_string_pretty(&digest.sample_rows)?;

    Ok(format!(
        r#"You are a data analyst AI. Analyze this dataset and provide actionable insights.

Dataset: {}
Total Rows: {}
Total Columns: {}

Numeric Columns & Statistics:
{}

Text/Category Columns:
{}

Sample Data (first {} rows, long text truncated):
{}

Please provide 4-6 insights in the following JSON format:
[
  {{
    "type": "trend|anomaly|recommendation|summary",
    "title": "Brief title",
    "description": "Detailed explanation (2-3 sentences)",
    "confidence": 0.0-1.0
  }}
]

Focus on:
1. Key trends in the data
2. Notable anomalies or outliers
3. Actionable recommendations
4. Overall data quality assessment

Return ONLY the JSON array, no additional text."#,
        digest.dataset_name,
        digest.total_rows,
        digest.total_columns,
        stats_lines.join("\n"),
        text_columns,
        digest.sample_rows.len(),
        samples
    ))
}

fn format_epoch_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn parse_insights(response: &str) -> Result<Vec<Insight>, AppError> {
    let re = Regex::new(r"\[[\s\S]*\]")
        .map_err(|e| AppError::Internal(format!("Failed to create regex: {}", e)))?;

    let json_str = re
        .find(response)
        .ok_or_else(|| {
            AppError::ParseError(format!(
                "No JSON array found in narrator response. Raw response: {}",
                response
            ))
        })?
        .as_str();

    serde_json::from_str(json_str).map_err(|e| {
        AppError::ParseError(format!("Failed to parse insights JSON '{}': {}", json_str, e))
    })
}

fn sanitize_insight(insight: Insight) -> Insight {
    Insight {
        title: insight.title.replace('\u{0}', "").replace('\u{1F}', ""),
        description: insight
            .description
            .replace('\u{0}', "")
            .replace('\u{1F}', ""),
        ..insight
    }
}
