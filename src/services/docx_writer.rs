//! Word 文档写入服务 - 业务能力层
//!
//! 只负责"把已通过校验的题目一次性写成 .docx"能力，不关心流程

use std::fs::File;
use std::path::Path;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::OutputError;
use crate::models::{GeneratedQuestion, PageRange};

/// 文档标题
pub const DOCUMENT_TITLE: &str = "Generated Medical Questions";

/// 写入选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// 按来源页码分组，每组前加一个小标题
    pub group_by_pages: bool,
    /// 输出答案
    pub include_answers: bool,
}

impl From<&Config> for WriterOptions {
    fn from(config: &Config) -> Self {
        Self {
            group_by_pages: config.group_by_pages,
            include_answers: config.include_answers,
        }
    }
}

/// 文档写入服务
///
/// 职责：
/// - 按接受顺序编号输出题目
/// - 每次运行只写一次，不做增量写入
pub struct DocxWriter {
    options: WriterOptions,
}

impl DocxWriter {
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// 写入文档
    ///
    /// # 参数
    /// - `path`: 输出路径，父目录不存在时自动创建
    /// - `questions`: 已通过校验的题目，按接受顺序排列
    pub fn write(&self, path: &Path, questions: &[GeneratedQuestion]) -> Result<(), OutputError> {
        let path_str = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDirFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let docx = self.build(questions);

        let file = File::create(path).map_err(|e| OutputError::write_failed(&path_str, e))?;
        docx.build()
            .pack(file)
            .map_err(|e| OutputError::write_failed(&path_str, e))?;

        info!("💾 已写入 {} 道题目: {}", questions.len(), path_str);
        Ok(())
    }

    /// 构建文档内容
    fn build(&self, questions: &[GeneratedQuestion]) -> Docx {
        let mut docx = Docx::new()
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(DOCUMENT_TITLE).bold().size(32)),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(format!(
                "Generated on {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ))));

        let mut current_group: Option<PageRange> = None;

        for (index, question) in questions.iter().enumerate() {
            if self.options.group_by_pages && current_group != Some(question.source_pages) {
                current_group = Some(question.source_pages);
                debug!("新分组: 第 {} 页", question.source_pages);
                docx = docx.add_paragraph(Paragraph::new().add_run(
                    Run::new()
                        .add_text(group_heading(question.source_pages))
                        .bold()
                        .size(26),
                ));
            }

            docx = docx.add_paragraph(self.question_paragraph(index + 1, question));
        }

        docx
    }

    /// 一道题一个段落，选项和答案用换行分隔
    fn question_paragraph(&self, number: usize, question: &GeneratedQuestion) -> Paragraph {
        let mut paragraph =
            Paragraph::new().add_run(Run::new().add_text(format!("{}. {}", number, question.text)));

        for (i, option) in question.options.iter().enumerate() {
            paragraph = paragraph.add_run(
                Run::new()
                    .add_break(BreakType::TextWrapping)
                    .add_text(format!("{}) {}", option_label(i), option)),
            );
        }

        if self.options.include_answers {
            if let Some(answer) = &question.answer {
                paragraph = paragraph.add_run(
                    Run::new()
                        .add_break(BreakType::TextWrapping)
                        .add_text(format!("Answer: {}", answer))
                        .italic(),
                );
            }
        }

        paragraph
    }
}

/// 分组标题，例如 `Pages 3–4`
pub fn group_heading(pages: PageRange) -> String {
    if pages.start() == pages.end() {
        format!("Page {}", pages.start())
    } else {
        format!("Pages {}–{}", pages.start(), pages.end())
    }
}

/// 第 i 个选项的字母标签
fn option_label(i: usize) -> char {
    (b'a' + (i % 26) as u8) as char
}
