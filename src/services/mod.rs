pub mod chunker;
pub mod docx_writer;
pub mod llm_service;
pub mod response_parser;
pub mod validator;

pub use chunker::{Chunker, Chunks};
pub use docx_writer::{DocxWriter, WriterOptions};
pub use llm_service::{LlmService, QuestionGenerator};
pub use response_parser::{normalize_answer, parse_questions, ParsedQuestion};
pub use validator::{QuestionValidator, ValidationRules};
