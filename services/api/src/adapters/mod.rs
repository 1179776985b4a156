pub mod gemini;
pub mod inference;
pub mod page;
pub mod web3_storage;

pub use gemini::GeminiChatAdapter;
pub use inference::HostedClassifierAdapter;
pub use page::HttpPageFetcher;
pub use web3_storage::Web3StorageAdapter;
