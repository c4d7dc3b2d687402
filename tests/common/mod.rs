//! 集成测试共用的工具：生成测试 PDF、读取输出文档、模拟出题服务

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use medquiz_gen::error::GenerationError;
use medquiz_gen::{Config, GeneratedQuestion, QuestionGenerator, QuestionType, TextChunk};

/// 生成每页一行文字的 PDF
pub fn write_pdf(path: &Path, page_texts: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![40.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

/// 读取 .docx 中每个段落的纯文本
pub fn read_paragraphs(path: &Path) -> Vec<String> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let bytes = std::fs::read(path).unwrap();
    let docx = docx_rs::read_docx(&bytes).unwrap();

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            let mut text = String::new();
            for pc in &para.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }
    paragraphs
}

/// 测试用配置
pub fn test_config(pdf_path: PathBuf, output_path: PathBuf, start: u32, end: u32) -> Config {
    Config {
        pdf_path: Some(pdf_path),
        start_page: Some(start),
        end_page: Some(end),
        output_path,
        llm_api_key: "test-key".to_string(),
        verify_credentials: false,
        ..Config::default()
    }
}

/// 错误注入方式
#[derive(Clone, Copy)]
pub enum Failure {
    Transient,
    Fatal,
}

/// 模拟出题服务：每个文本块返回一道格式正确的选择题
pub struct MockGenerator {
    failures: Vec<(usize, Failure)>,
    /// 这些块返回相同的题干
    duplicate_chunks: HashSet<usize>,
    pub calls: Mutex<Vec<usize>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            failures: Vec::new(),
            duplicate_chunks: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, chunk_id: usize, failure: Failure) -> Self {
        self.failures.push((chunk_id, failure));
        self
    }

    pub fn duplicate_on(mut self, chunk_id: usize) -> Self {
        self.duplicate_chunks.insert(chunk_id);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl QuestionGenerator for MockGenerator {
    async fn generate(
        &self,
        chunk: &TextChunk,
        question_type: QuestionType,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        self.calls.lock().unwrap().push(chunk.id);

        if let Some((_, failure)) = self.failures.iter().find(|(id, _)| *id == chunk.id) {
            return Err(match failure {
                Failure::Transient => GenerationError::transient("mock", "connection reset"),
                Failure::Fatal => GenerationError::fatal("mock", "HTTP 401 invalid token"),
            });
        }

        let text = if self.duplicate_chunks.contains(&chunk.id) {
            "Which radiological sign is described in this passage?".to_string()
        } else {
            format!(
                "Which finding is described in chunk {} on page {}?",
                chunk.id,
                chunk.pages.start()
            )
        };

        let question = GeneratedQuestion::new(text, question_type, chunk.id, chunk.pages)
            .with_options(vec![
                "Ground-glass opacity".to_string(),
                "Tree-in-bud pattern".to_string(),
                "Honeycombing".to_string(),
                "Crazy paving".to_string(),
            ])
            .with_answer("a");

        Ok(vec![question])
    }
}
