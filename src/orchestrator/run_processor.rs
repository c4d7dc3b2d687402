//! 单次运行处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责把一次运行从头跑到尾。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建 LLM 服务、检查凭证
//! 2. **分阶段执行**：提取 → 分块 → 出题 → 校验 → 写入，每个阶段全部完成后才进入下一阶段
//! 3. **错误隔离**：临时错误只影响当前文本块，致命错误立即终止
//! 4. **取消**：每个文本块开始前检查取消信号
//! 5. **全局统计**：汇总整次运行的结果

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::PdfReader;
use crate::models::{GeneratedQuestion, PageText, TextChunk};
use crate::services::{
    Chunker, DocxWriter, LlmService, QuestionGenerator, QuestionValidator, ValidationRules,
    WriterOptions,
};
use crate::utils::logging::{self, RunStats};
use crate::workflow::{ChunkCtx, ChunkFlow, ChunkOutcome};

const TOTAL_STAGES: usize = 5;

/// 取消信号
///
/// 只在文本块之间检查，不会打断正在进行的请求
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// 在后台监听 Ctrl-C
    pub fn listen_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到中断信号，当前文本块完成后停止出题");
                signal.abort();
            }
        });
    }
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunSummary {
    pub stats: RunStats,
    /// 写入文档的题目，按接受顺序
    pub accepted: Vec<GeneratedQuestion>,
    pub output_path: PathBuf,
}

/// 应用主结构
pub struct App<G> {
    config: Config,
    flow: ChunkFlow<G>,
    abort: AbortSignal,
}

impl App<LlmService> {
    /// 初始化应用（使用真实的 LLM 服务）
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let llm_service = LlmService::new(&config)?;

        if config.verify_credentials {
            info!("🔑 正在验证 API 凭证...");
            llm_service.check_credentials().await?;
            info!("✓ 凭证有效");
        }

        Ok(Self::build(config, llm_service))
    }
}

impl<G: QuestionGenerator> App<G> {
    /// 使用自定义的生成能力创建应用
    pub fn with_generator(config: Config, generator: G) -> AppResult<Self> {
        config.validate()?;
        Ok(Self::build(config, generator))
    }

    fn build(config: Config, generator: G) -> Self {
        let flow = ChunkFlow::new(generator, config.question_type)
            .with_retries(config.transient_retries);
        Self {
            config,
            flow,
            abort: AbortSignal::new(),
        }
    }

    /// 取消信号的句柄
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunSummary> {
        let mut stats = RunStats::default();

        // ========== 1. 提取 ==========
        logging::log_stage(1, TOTAL_STAGES, "提取 PDF 文本");
        let pages = self.extract()?;
        stats.pages = pages.len();

        // ========== 2. 分块 ==========
        logging::log_stage(2, TOTAL_STAGES, "文本分块");
        let chunker = Chunker::new(self.config.chunk_size)?;
        let chunks: Vec<TextChunk> = chunker.chunks(&pages).collect();
        stats.chunks_total = chunks.len();
        info!(
            "✓ {} 页文本切成 {} 个文本块 (上限 {} 字符)",
            pages.len(),
            chunks.len(),
            chunker.max_chars()
        );

        // ========== 3. 出题 ==========
        logging::log_stage(3, TOTAL_STAGES, "调用模型出题");
        let generated = self.generate_all(&chunks, &mut stats).await?;
        stats.questions_generated = generated.len();

        // ========== 4. 校验 ==========
        logging::log_stage(4, TOTAL_STAGES, "校验题目");
        let mut validator = QuestionValidator::new(ValidationRules::from(&self.config));
        let mut accepted = Vec::new();
        for result in validator.validate_all(generated) {
            match result.reason {
                None => accepted.push(result.question),
                Some(reason) => {
                    *stats.rejections.entry(reason.kind()).or_insert(0) += 1;
                }
            }
        }
        stats.questions_accepted = accepted.len();
        stats.questions_rejected = stats.questions_generated - accepted.len();
        info!(
            "✓ 通过 {}/{} 道题目",
            stats.questions_accepted, stats.questions_generated
        );

        // ========== 5. 写入 ==========
        logging::log_stage(5, TOTAL_STAGES, "写入 Word 文档");
        let output_path = self.config.resolved_output_path();
        DocxWriter::new(WriterOptions::from(&self.config)).write(&output_path, &accepted)?;

        logging::print_final_stats(&stats, &output_path);

        Ok(RunSummary {
            stats,
            accepted,
            output_path,
        })
    }

    fn extract(&self) -> AppResult<Vec<PageText>> {
        let range = self.config.page_range()?;
        let pdf_path = self
            .config
            .pdf_path
            .as_ref()
            .ok_or_else(|| crate::error::ConfigError::Missing("pdf_path".to_string()))?;

        let reader = PdfReader::open(pdf_path)?;
        let pages = reader.extract(range)?;
        info!("✓ 提取了 {} 页文本", pages.len());
        Ok(pages)
    }

    /// 逐块出题；临时错误跳过当前块，致命错误直接返回
    async fn generate_all(
        &self,
        chunks: &[TextChunk],
        stats: &mut RunStats,
    ) -> AppResult<Vec<GeneratedQuestion>> {
        let mut generated = Vec::new();
        let total = chunks.len();

        for (idx, chunk) in chunks.iter().enumerate() {
            if self.abort.is_aborted() {
                warn!("⚠️ 运行已取消，剩余 {} 个文本块未处理", total - idx);
                stats.aborted = true;
                break;
            }

            let ctx = ChunkCtx::new(chunk, idx + 1, total);
            match self.flow.run(chunk, &ctx).await? {
                ChunkOutcome::Generated(questions) => {
                    stats.chunks_processed += 1;
                    generated.extend(questions);
                }
                ChunkOutcome::Skipped { .. } => {
                    stats.chunks_skipped += 1;
                    stats.skipped_chunks.push(chunk.id);
                }
            }
        }

        Ok(generated)
    }
}
