pub mod chunk;
pub mod page_range;
pub mod question;

pub use chunk::{PageText, TextChunk};
pub use page_range::PageRange;
pub use question::{
    GeneratedQuestion, QuestionFocus, QuestionType, Rejection, ValidationResult,
};
