use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PageRange;
use crate::error::ConfigError;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// 单项选择题
    MultipleChoice,
    /// 简答题
    ShortAnswer,
    /// 判断题
    TrueFalse,
}

impl QuestionType {
    /// 命令行和配置文件中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::TrueFalse => "true-false",
        }
    }

    /// 题干允许的结尾字符
    pub fn terminal_chars(self) -> &'static [char] {
        match self {
            QuestionType::MultipleChoice => &['?', '？'],
            QuestionType::ShortAnswer => &['?', '？', ':'],
            QuestionType::TrueFalse => &['?', '？', '.'],
        }
    }

    /// 是否需要选项
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::MultipleChoice)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuestionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "multiple-choice" | "mcq" | "choice" => Ok(QuestionType::MultipleChoice),
            "short-answer" | "sa" | "short" => Ok(QuestionType::ShortAnswer),
            "true-false" | "tf" | "judge" => Ok(QuestionType::TrueFalse),
            _ => Err(ConfigError::UnknownQuestionType(s.to_string())),
        }
    }
}

/// 出题角度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionFocus {
    /// 基于影像学表现的病例诊断
    #[default]
    CaseDiagnosis,
    /// 疾病特征判断
    DiseaseCharacteristics,
    /// 特殊征象识别
    SpecialFeature,
}

impl QuestionFocus {
    pub fn name(self) -> &'static str {
        match self {
            QuestionFocus::CaseDiagnosis => "case-diagnosis",
            QuestionFocus::DiseaseCharacteristics => "disease-characteristics",
            QuestionFocus::SpecialFeature => "special-feature",
        }
    }

    /// 写进提示词的描述
    pub fn description(self) -> &'static str {
        match self {
            QuestionFocus::CaseDiagnosis => "case-based diagnosis from radiological features",
            QuestionFocus::DiseaseCharacteristics => "disease characteristics verification",
            QuestionFocus::SpecialFeature => "special feature identification",
        }
    }
}

impl FromStr for QuestionFocus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "case-diagnosis" | "diagnosis" | "1" => Ok(QuestionFocus::CaseDiagnosis),
            "disease-characteristics" | "characteristics" | "4" => {
                Ok(QuestionFocus::DiseaseCharacteristics)
            }
            "special-feature" | "feature" | "6" => Ok(QuestionFocus::SpecialFeature),
            _ => Err(ConfigError::invalid("focus", format!("未知出题角度 '{}'", s))),
        }
    }
}

/// 模型生成的题目，创建后只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// 题干
    pub text: String,
    pub question_type: QuestionType,
    /// 来源文本块编号
    pub source_chunk_id: usize,
    /// 来源页码
    pub source_pages: PageRange,
    /// 选项（仅选择题）
    #[serde(default)]
    pub options: Vec<String>,
    /// 正确答案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl GeneratedQuestion {
    pub fn new(
        text: impl Into<String>,
        question_type: QuestionType,
        source_chunk_id: usize,
        source_pages: PageRange,
    ) -> Self {
        Self {
            text: text.into(),
            question_type,
            source_chunk_id,
            source_pages,
            options: Vec::new(),
            answer: None,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }
}

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// 题干太短
    TooShort { len: usize, min: usize },
    /// 题干太长
    TooLong { len: usize, max: usize },
    /// 结尾字符不符合题型
    BadTerminal,
    /// 选项数量不足
    TooFewOptions { found: usize, min: usize },
    /// 答案不在选项之中
    AnswerNotInOptions(String),
    /// 与已接受题目重复
    Duplicate,
}

impl Rejection {
    /// 统计用的类别名
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::TooShort { .. } => "too-short",
            Rejection::TooLong { .. } => "too-long",
            Rejection::BadTerminal => "bad-terminal",
            Rejection::TooFewOptions { .. } => "too-few-options",
            Rejection::AnswerNotInOptions(_) => "answer-not-in-options",
            Rejection::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort { len, min } => write!(f, "题干过短 ({} < {})", len, min),
            Rejection::TooLong { len, max } => write!(f, "题干过长 ({} > {})", len, max),
            Rejection::BadTerminal => write!(f, "题干结尾不是题型允许的字符"),
            Rejection::TooFewOptions { found, min } => {
                write!(f, "选项不足 ({} < {})", found, min)
            }
            Rejection::AnswerNotInOptions(answer) => write!(f, "答案 '{}' 不在选项中", answer),
            Rejection::Duplicate => write!(f, "与已接受的题目重复"),
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub question: GeneratedQuestion,
    pub accepted: bool,
    pub reason: Option<Rejection>,
}

impl ValidationResult {
    pub fn accept(question: GeneratedQuestion) -> Self {
        Self {
            question,
            accepted: true,
            reason: None,
        }
    }

    pub fn reject(question: GeneratedQuestion, reason: Rejection) -> Self {
        Self {
            question,
            accepted: false,
            reason: Some(reason),
        }
    }
}
