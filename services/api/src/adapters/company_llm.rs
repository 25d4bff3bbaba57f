//! services/api/src/adapters/company_llm.rs
//!
//! This module contains the adapter for the company research LLM.
//! It implements the `CompanyResearchService` port from the `core` crate.

use std::sync::LazyLock;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use casebook_core::domain::CompanyProfile;
use casebook_core::ports::{CompanyResearchService, PortError, PortResult};
use regex::Regex;

const SYSTEM_INSTRUCTIONS: &str = r#"You are a company research assistant. Based on the company name provided, generate realistic company information and analytics opportunities.

For the company "{company}", create:

1. Realistic company information (industry, size, founded year, headquarters, detailed description)
2. 5 specific data analytics opportunities with detailed explanations based on the company's characteristics

Return ONLY valid JSON in this exact format:
{
  "companyInfo": {
    "name": "Company Name",
    "industry": "Industry",
    "size": "Employee count or range",
    "founded": "Year founded",
    "headquarters": "City, Country",
    "description": "A comprehensive description of the company: business model, main products or services, target market, competitive advantages, recent developments and market position. At least 3-4 sentences.",
    "revenue": "Revenue info if available",
    "website": "Website URL"
  },
  "analyticsPoints": [
    {
      "header": "Analytics Opportunity Title",
      "description": "2-3 sentences on why this opportunity exists given the company's industry, size and business model, which data sources the company likely has, and what a student data analytics club (data science, analytics, data pipelines, web development) could build for them."
    }
  ]
}"#;

/// The first `{` through the last `}` of the reply.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern compiles"));

/// Pulls the JSON object out of a model reply (which may be wrapped in prose
/// or code fences) and checks it has the expected shape.
pub fn parse_company_profile(reply: &str) -> PortResult<CompanyProfile> {
    let json = JSON_OBJECT_RE
        .find(reply)
        .ok_or_else(|| PortError::Upstream("Could not find JSON in the research reply".to_string()))?;

    serde_json::from_str::<CompanyProfile>(json.as_str())
        .map_err(|e| PortError::Upstream(format!("Invalid research reply structure: {}", e)))
}

/// An adapter that implements `CompanyResearchService` using an OpenAI chat model.
#[derive(Clone)]
pub struct OpenAiCompanyAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompanyAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl CompanyResearchService for OpenAiCompanyAdapter {
    async fn research(&self, company_name: &str) -> PortResult<CompanyProfile> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS.replace("{company}", company_name))
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!(
                        "Generate comprehensive information for \"{}\". Make it realistic and industry-appropriate.",
                        company_name
                    ))
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(2000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Upstream("No response from the research model".to_string()))?;

        parse_company_profile(&reply)
    }
}
