//! HTTP client for the AI narrative gateway.
//!
//! Sends the selected aggregates as a chat-completion prompt and parses the
//! structured JSON object the model replies with. The gateway is a black
//! box; only the input/output contract matters here.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use shared::FinanceAnalysis;

use super::traits::{NarrativeApi, NarrativeRequest};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Narrative collaborator backed by a chat-completion gateway.
#[derive(Clone)]
pub struct HttpNarrativeClient {
    gateway_url: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl HttpNarrativeClient {
    pub fn new(gateway_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            gateway_url: gateway_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn build_prompt(request: &NarrativeRequest) -> String {
        let monthly_lines: Vec<String> = request
            .month_labels
            .iter()
            .zip(&request.monthly)
            .map(|(label, m)| {
                format!(
                    "{label}: income {:.2}, expenses {:.2}, savings {:.2}, balance {:.2}",
                    m.income, m.expenses, m.savings, m.balance
                )
            })
            .collect();

        let category_lines: Vec<String> = request
            .categories
            .iter()
            .map(|c| format!("{}: {:.2}", c.category.as_str(), c.total))
            .collect();

        let balance = request.total_income - request.total_expenses - request.total_savings;

        format!(
            "You are a personal finance expert. Analyze the household data below and answer concisely.\n\n\
             SELECTED MONTHS: {}\n\n\
             MONTHLY DATA:\n{}\n\n\
             EXPENSES BY CATEGORY:\n{}\n\n\
             TOTALS:\n\
             - income: {:.2}\n\
             - expenses: {:.2}\n\
             - savings: {:.2}\n\
             - balance: {:.2}\n\n\
             Reply with a single JSON object:\n\
             {{\n\
               \"trend_analysis\": \"2-3 sentences on whether the finances are improving, worsening or stable\",\n\
               \"top_insights\": [\"insight 1\", \"insight 2\", \"insight 3\"],\n\
               \"suggestions\": [\"suggestion 1\", \"suggestion 2\", \"suggestion 3\"],\n\
               \"risk_level\": \"low\" | \"medium\" | \"high\",\n\
               \"savings_rate\": \"X%\",\n\
               \"biggest_expense_category\": \"category name\",\n\
               \"monthly_trend\": \"rising\" | \"falling\" | \"stable\"\n\
             }}\n\n\
             Be specific and use the numbers from the data.",
            request.month_labels.join(", "),
            monthly_lines.join("\n"),
            category_lines.join("\n"),
            request.total_income,
            request.total_expenses,
            request.total_savings,
            balance,
        )
    }

    /// Models wrap the JSON in prose or code fences often enough that the
    /// reply is scanned for the outermost object instead of parsed whole.
    fn extract_json_object(content: &str) -> Result<&str> {
        let start = content
            .find('{')
            .ok_or_else(|| anyhow!("no JSON object in analysis reply"))?;
        let end = content
            .rfind('}')
            .ok_or_else(|| anyhow!("no JSON object in analysis reply"))?;
        if end < start {
            return Err(anyhow!("malformed JSON object in analysis reply"));
        }
        Ok(&content[start..=end])
    }
}

#[async_trait]
impl NarrativeApi for HttpNarrativeClient {
    async fn analyze(&self, request: &NarrativeRequest) -> Result<FinanceAnalysis> {
        let prompt = Self::build_prompt(request);

        let response = self
            .http
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0.3,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("analysis gateway returned {status}"));
        }

        let body: ChatCompletionResponse = response.json().await?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| anyhow!("analysis gateway returned no choices"))?;

        let object = Self::extract_json_object(content)?;
        serde_json::from_str(object).context("could not parse analysis reply")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CategoryTotal, ExpenseCategory, MonthlyRollup};

    #[test]
    fn test_extract_json_object_from_fenced_reply() {
        let content = "Here you go:\n```json\n{\"a\": 1}\n```\nanything else";
        assert_eq!(
            HttpNarrativeClient::extract_json_object(content).unwrap(),
            "{\"a\": 1}"
        );
    }

    #[test]
    fn test_extract_json_object_rejects_plain_text() {
        assert!(HttpNarrativeClient::extract_json_object("no json here").is_err());
    }

    #[test]
    fn test_prompt_mentions_data() {
        let request = NarrativeRequest {
            month_labels: vec!["March 2026".to_string()],
            monthly: vec![MonthlyRollup {
                month: 3,
                income: 8000.0,
                expenses: 5000.0,
                savings: 1000.0,
                balance: 2000.0,
            }],
            categories: vec![CategoryTotal {
                category: ExpenseCategory::Food,
                total: 1500.0,
            }],
            total_income: 8000.0,
            total_expenses: 5000.0,
            total_savings: 1000.0,
        };
        let prompt = HttpNarrativeClient::build_prompt(&request);
        assert!(prompt.contains("March 2026"));
        assert!(prompt.contains("food: 1500.00"));
        assert!(prompt.contains("risk_level"));
    }

    #[test]
    fn test_parse_reply_round_trip() {
        let reply = r#"{
            "trend_analysis": "Stable month over month.",
            "top_insights": ["a", "b", "c"],
            "suggestions": ["x", "y", "z"],
            "risk_level": "low",
            "savings_rate": "12%",
            "biggest_expense_category": "food",
            "monthly_trend": "stable"
        }"#;
        let parsed: FinanceAnalysis =
            serde_json::from_str(HttpNarrativeClient::extract_json_object(reply).unwrap()).unwrap();
        assert_eq!(parsed.risk_level, shared::RiskLevel::Low);
        assert_eq!(parsed.monthly_trend, shared::MonthlyTrend::Stable);
        assert_eq!(parsed.top_insights.len(), 3);
    }
}
