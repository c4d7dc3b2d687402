//! 文本块处理流程 - 流程层
//!
//! 核心职责：定义"一个文本块"的出题流程
//!
//! 流程顺序：
//! 1. 调用生成能力
//! 2. 临时错误 → 按配置退避重试 → 仍失败则跳过本块
//! 3. 致命错误 → 向上返回，终止运行

use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::GenerationError;
use crate::models::{GeneratedQuestion, QuestionType, TextChunk};
use crate::services::QuestionGenerator;
use crate::utils::truncate_text;
use crate::workflow::chunk_ctx::ChunkCtx;

/// 文本块处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// 生成成功（可能为零道题）
    Generated(Vec<GeneratedQuestion>),
    /// 遇到临时错误，跳过本块
    Skipped { reason: String },
}

/// 文本块处理流程
///
/// - 编排单个文本块的生成与重试
/// - 不持有任何文本块列表
/// - 只依赖生成能力（services）
pub struct ChunkFlow<G> {
    generator: G,
    question_type: QuestionType,
    transient_retries: u32,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl<G: QuestionGenerator> ChunkFlow<G> {
    /// 创建新的文本块处理流程（默认不重试）
    pub fn new(generator: G, question_type: QuestionType) -> Self {
        Self {
            generator,
            question_type,
            transient_retries: 0,
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(10),
        }
    }

    /// 设置临时错误的重试次数
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.transient_retries = retries;
        self
    }

    /// 设置退避时间：第 n 次重试等待 `base * 2^n`，不超过 `max`
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn run(
        &self,
        chunk: &TextChunk,
        ctx: &ChunkCtx,
    ) -> Result<ChunkOutcome, GenerationError> {
        info!("{} 🤖 正在出题: {}", ctx, truncate_text(&chunk.text, 60));

        let mut attempt = 0u32;
        loop {
            match self.generator.generate(chunk, self.question_type).await {
                Ok(questions) => {
                    info!("{} ✓ 生成 {} 道候选题目", ctx, questions.len());
                    return Ok(ChunkOutcome::Generated(questions));
                }
                Err(e) if e.is_transient() && attempt < self.transient_retries => {
                    let delay = self.backoff_delay(attempt);
                    attempt += 1;
                    warn!(
                        "{} ⚠️ 临时错误: {}，{:?} 后第 {}/{} 次重试",
                        ctx, e, delay, attempt, self.transient_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() => {
                    warn!("{} ⚠️ 临时错误，跳过本块: {}", ctx, e);
                    return Ok(ChunkOutcome::Skipped {
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("{} ❌ 致命错误，终止运行: {}", ctx, e);
                    return Err(e);
                }
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.backoff_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRange;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 前 `failures` 次返回给定错误，之后返回一道题
    struct FlakyGenerator {
        failures: usize,
        fatal: bool,
        calls: AtomicUsize,
    }

    impl FlakyGenerator {
        fn new(failures: usize, fatal: bool) -> Self {
            Self {
                failures,
                fatal,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl QuestionGenerator for FlakyGenerator {
        async fn generate(
            &self,
            chunk: &TextChunk,
            question_type: QuestionType,
        ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(if self.fatal {
                    GenerationError::fatal("mock", "401")
                } else {
                    GenerationError::transient("mock", "timeout")
                });
            }
            Ok(vec![GeneratedQuestion::new(
                "What is the mock question?",
                question_type,
                chunk.id,
                chunk.pages,
            )])
        }
    }

    fn chunk() -> (TextChunk, ChunkCtx) {
        let chunk = TextChunk {
            id: 0,
            text: "Myocardial infarction".to_string(),
            pages: PageRange::single(1).unwrap(),
        };
        let ctx = ChunkCtx::new(&chunk, 1, 1);
        (chunk, ctx)
    }

    #[tokio::test]
    async fn test_success_returns_questions() {
        let (chunk, ctx) = chunk();
        let flow = ChunkFlow::new(FlakyGenerator::new(0, false), QuestionType::MultipleChoice);
        let outcome = flow.run(&chunk, &ctx).await.unwrap();
        assert!(matches!(outcome, ChunkOutcome::Generated(ref q) if q.len() == 1));
    }

    #[tokio::test]
    async fn test_transient_without_retries_is_skipped() {
        let (chunk, ctx) = chunk();
        let flow = ChunkFlow::new(FlakyGenerator::new(1, false), QuestionType::MultipleChoice);
        let outcome = flow.run(&chunk, &ctx).await.unwrap();
        assert!(matches!(outcome, ChunkOutcome::Skipped { .. }));
        assert_eq!(flow.generator().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_with_retries_recovers() {
        let (chunk, ctx) = chunk();
        let flow = ChunkFlow::new(FlakyGenerator::new(2, false), QuestionType::MultipleChoice)
            .with_retries(2)
            .with_backoff(Duration::from_millis(1), Duration::from_millis(2));
        let outcome = flow.run(&chunk, &ctx).await.unwrap();
        assert!(matches!(outcome, ChunkOutcome::Generated(_)));
        assert_eq!(flow.generator().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_is_never_retried() {
        let (chunk, ctx) = chunk();
        let flow = ChunkFlow::new(FlakyGenerator::new(1, true), QuestionType::MultipleChoice)
            .with_retries(3)
            .with_backoff(Duration::from_millis(1), Duration::from_millis(1));
        let result = flow.run(&chunk, &ctx).await;
        tokio_test::assert_err!(&result);
        assert_eq!(flow.generator().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let flow = ChunkFlow::new(FlakyGenerator::new(0, false), QuestionType::MultipleChoice);
        assert_eq!(flow.backoff_delay(0), Duration::from_secs(2));
        assert_eq!(flow.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(flow.backoff_delay(2), Duration::from_secs(8));
        assert_eq!(flow.backoff_delay(3), Duration::from_secs(10));
        assert_eq!(flow.backoff_delay(40), Duration::from_secs(10));
    }
}
