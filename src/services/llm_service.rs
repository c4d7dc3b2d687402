//! LLM 服务 - 业务能力层
//!
//! 只负责"根据一个文本块出题"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` 的请求类型构建 OpenAI 兼容的 chat-completions 请求
//! - 使用 `reqwest` 发送请求，按 HTTP 状态码区分临时错误和致命错误
//! - 兼容 OpenAI API 的服务（如 Hugging Face router、vLLM 等）

use std::time::Duration;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, GenerationError};
use crate::models::{GeneratedQuestion, QuestionFocus, QuestionType, TextChunk};
use crate::services::response_parser::{normalize_answer, parse_questions};
use crate::utils::truncate_text;

const SYSTEM_MESSAGE: &str = "You are an experienced medical educator who writes rigorous, \
                              board-style exam questions strictly grounded in the supplied text.";

/// 题目生成能力
///
/// 一次调用只发一个请求，不做重试，也不缓存结果；是否重试由调用方决定
#[allow(async_fn_in_trait)]
pub trait QuestionGenerator {
    /// 根据文本块生成零到多道题目
    async fn generate(
        &self,
        chunk: &TextChunk,
        question_type: QuestionType,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError>;
}

/// LLM 服务
///
/// 职责：
/// - 根据文本块构建提示词并调用推理接口
/// - 把 HTTP 失败归类为临时错误 / 致命错误
/// - 只处理单个文本块
/// - 不出现 Vec<TextChunk>
/// - 不关心流程顺序
pub struct LlmService {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_name: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    prompt_chunk_chars: usize,
    focus: QuestionFocus,
    timeout_secs: u64,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::invalid("http_client", e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                config.llm_api_base_url.trim_end_matches('/')
            ),
            api_key: config.llm_api_key.clone(),
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            prompt_chunk_chars: config.prompt_chunk_chars,
            focus: config.focus,
            timeout_secs: config.timeout_secs,
        })
    }

    /// 请求地址
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `max_tokens`: 本次请求的最大生成长度
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串，可能为空）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let request_error = |e: async_openai::error::OpenAIError| {
            GenerationError::fatal(&self.endpoint, format!("请求构建失败: {}", e))
        };

        // 构建消息列表
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(request_error)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(request_error)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .top_p(self.top_p)
            .max_tokens(max_tokens)
            .build()
            .map_err(request_error)?;

        // 调用 API
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.network_error(e))?;

        if !status.is_success() {
            let err = classify_status(&self.endpoint, status.as_u16(), &body);
            warn!("LLM API 调用失败: {}", err);
            return Err(err);
        }

        debug!("LLM API 调用成功");

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            GenerationError::transient(&self.endpoint, format!("响应不是合法的 JSON: {}", e))
        })?;

        let content = extract_completion_text(&json).ok_or_else(|| {
            GenerationError::transient(
                &self.endpoint,
                format!("无法识别的响应格式: {}", truncate_text(&body, 200)),
            )
        })?;

        Ok(content.trim().to_string())
    }

    /// 发送一个极小的请求验证凭证
    ///
    /// 只有认证 / 额度错误会返回 Err，临时错误只记录警告
    pub async fn check_credentials(&self) -> Result<(), GenerationError> {
        match self.send_to_llm("ping", None, 1).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_transient() => {
                warn!("⚠️ 凭证检查未完成（{}），继续运行", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn network_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::transient(
                &self.endpoint,
                format!("请求超时 ({} 秒)", self.timeout_secs),
            )
        } else {
            GenerationError::transient(&self.endpoint, format!("网络错误: {}", e))
        }
    }
}

impl QuestionGenerator for LlmService {
    async fn generate(
        &self,
        chunk: &TextChunk,
        question_type: QuestionType,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let prompt = build_prompt(&chunk.text, question_type, self.focus, self.prompt_chunk_chars);

        let raw = self
            .send_to_llm(&prompt, Some(SYSTEM_MESSAGE), self.max_tokens)
            .await?;

        // 部分文本补全接口会把提示词原样带回
        let completion = raw.rsplit(prompt.as_str()).next().unwrap_or(raw.as_str());

        let questions: Vec<GeneratedQuestion> = parse_questions(completion)
            .into_iter()
            .map(|parsed| GeneratedQuestion {
                text: parsed.text,
                question_type,
                source_chunk_id: chunk.id,
                source_pages: chunk.pages,
                options: parsed.options,
                answer: parsed
                    .answer
                    .map(|answer| normalize_answer(&answer, question_type)),
            })
            .collect();

        debug!("[块 {}] 解析出 {} 道候选题目", chunk.id, questions.len());

        Ok(questions)
    }
}

/// 构建出题提示词
///
/// 块内容超过 `max_content_chars` 时截断
pub fn build_prompt(
    content: &str,
    question_type: QuestionType,
    focus: QuestionFocus,
    max_content_chars: usize,
) -> String {
    let content: String = content.chars().take(max_content_chars).collect();

    let (kind, requirements, format) = match question_type {
        QuestionType::MultipleChoice => (
            "multiple-choice",
            "2. Include four distinct options\n3. Mark one correct answer",
            "Question: [Your question here, ending with a question mark]\n\
             a) [Option A]\n\
             b) [Option B]\n\
             c) [Option C]\n\
             d) [Option D]\n\
             Correct Answer: [Letter only]",
        ),
        QuestionType::ShortAnswer => (
            "short-answer",
            "2. The answer must fit in one or two sentences\n3. Provide the model answer",
            "Question: [Your question here, ending with a question mark]\n\
             Answer: [Model answer]",
        ),
        QuestionType::TrueFalse => (
            "true/false",
            "2. State a single verifiable claim\n3. Provide the correct verdict",
            "Question: [A statement followed by \"True or false?\"]\n\
             Answer: [True or False]",
        ),
    };

    format!(
        "Generate a challenging {kind} question about {focus} using this exact format:\n\n\
         [CONTENT]\n{content}\n\n\
         [REQUIREMENTS]\n\
         1. Question must be based on the content\n\
         {requirements}\n\
         4. Use advanced medical terminology\n\
         5. Make the question difficult\n\n\
         [FORMAT]\n{format}",
        focus = focus.description(),
    )
}

/// 按 HTTP 状态码归类错误
///
/// - 401 / 403：认证失败，致命
/// - 402 或提到额度的 429：额度耗尽，致命
/// - 408 / 429 / 5xx：临时错误
/// - 400 / 413 / 422：只与当前块有关，按临时错误处理
/// - 其他（如 404 模型不存在）：致命
pub fn classify_status(endpoint: &str, status: u16, body: &str) -> GenerationError {
    let lower = body.to_ascii_lowercase();
    let snippet = truncate_text(body.trim(), 200);
    let mentions_quota = ["quota", "billing", "credit", "insufficient"]
        .iter()
        .any(|word| lower.contains(word));

    match status {
        401 | 403 => GenerationError::fatal(
            endpoint,
            format!("认证失败 (HTTP {}): {}", status, snippet),
        ),
        402 => GenerationError::fatal(
            endpoint,
            format!("额度不足 (HTTP {}): {}", status, snippet),
        ),
        429 if mentions_quota => GenerationError::fatal(
            endpoint,
            format!("额度不足 (HTTP {}): {}", status, snippet),
        ),
        408 | 429 => GenerationError::transient(
            endpoint,
            format!("请求受限 (HTTP {}): {}", status, snippet),
        ),
        400 | 413 | 422 => GenerationError::transient(
            endpoint,
            format!("当前块的请求被拒绝 (HTTP {}): {}", status, snippet),
        ),
        500..=599 => GenerationError::transient(
            endpoint,
            format!("服务端错误 (HTTP {}): {}", status, snippet),
        ),
        _ => GenerationError::fatal(
            endpoint,
            format!("未预期的响应 (HTTP {}): {}", status, snippet),
        ),
    }
}

/// 从响应中取出生成的文本
///
/// 支持 chat-completions 格式（`choices[0].message.content`）、
/// 旧的 completions 格式（`choices[0].text`）以及
/// Hugging Face 文本生成格式（`[{"generated_text": ...}]`）
pub fn extract_completion_text(json: &Value) -> Option<String> {
    if let Some(choice) = json.get("choices").and_then(|c| c.get(0)) {
        let text = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .or_else(|| choice.get("text"));
        return match text {
            Some(Value::String(s)) => Some(s.clone()),
            // content 为 null 时视为空回复
            Some(Value::Null) | None => Some(String::new()),
            Some(_) => None,
        };
    }

    json.get(0)
        .and_then(|item| item.get("generated_text"))
        .or_else(|| json.get("generated_text"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
