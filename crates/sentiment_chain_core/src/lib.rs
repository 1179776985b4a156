pub mod analyzer;
pub mod domain;
pub mod ports;
pub mod prompt;
pub mod rules;
pub mod text;

pub use analyzer::Analyzer;
pub use domain::{
    AnalysisRequest, AnalysisResult, ChatTurn, ClassScores, LabelScore, SentenceResult, Sentiment,
};
pub use ports::{
    ArchiveService, ChatService, PageFetcher, PortError, PortResult, TextClassifier,
};
