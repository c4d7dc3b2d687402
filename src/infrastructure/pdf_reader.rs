//! PDF 读取器 - 基础设施层
//!
//! 持有已解析的 PDF 文档，只暴露"按页取文本"的能力

use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::{PageRange, PageText};

/// PDF 读取器
///
/// 职责：
/// - 持有唯一的 Document 资源
/// - 校验页码范围
/// - 不认识文本块 / 题目
pub struct PdfReader {
    doc: Document,
    path: String,
}

impl PdfReader {
    /// 打开并解析 PDF 文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let bytes = std::fs::read(path).map_err(|source| ExtractionError::OpenFailed {
            path: path_str.clone(),
            source,
        })?;

        Self::from_bytes(&bytes, path_str)
    }

    /// 从内存中的字节解析 PDF
    ///
    /// `label` 只用于错误信息和日志
    pub fn from_bytes(bytes: &[u8], label: impl Into<String>) -> Result<Self, ExtractionError> {
        let path = label.into();

        let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::ParseFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if doc.is_encrypted() {
            return Err(ExtractionError::Encrypted { path });
        }

        debug!("PDF 解析成功: {} ({} 页)", path, doc.get_pages().len());

        Ok(Self { doc, path })
    }

    /// 文档总页数
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// 按页码顺序提取范围内每一页的文本
    ///
    /// 返回的条目数恰好等于 `range.len()`，空白页返回空字符串
    pub fn extract(&self, range: PageRange) -> Result<Vec<PageText>, ExtractionError> {
        let page_count = self.page_count();

        if range.start() > page_count {
            return Err(ExtractionError::PageOutOfRange {
                requested: range.start(),
                page_count,
            });
        }
        if range.end() > page_count {
            return Err(ExtractionError::PageOutOfRange {
                requested: range.end(),
                page_count,
            });
        }

        info!(
            "📄 正在提取第 {} 页 (共 {} 页): {}",
            range, page_count, self.path
        );

        let mut pages = Vec::with_capacity(range.len());
        for page_number in range.pages() {
            let text = self.doc.extract_text(&[page_number]).map_err(|e| {
                ExtractionError::PageTextFailed {
                    page: page_number,
                    message: e.to_string(),
                }
            })?;

            debug!("第 {} 页提取到 {} 个字符", page_number, text.chars().count());
            pages.push(PageText::new(page_number, text));
        }

        Ok(pages)
    }
}

/// 打开文件并提取指定页码范围的文本
pub fn extract_pages(
    path: impl AsRef<Path>,
    range: PageRange,
) -> Result<Vec<PageText>, ExtractionError> {
    PdfReader::open(path)?.extract(range)
}
