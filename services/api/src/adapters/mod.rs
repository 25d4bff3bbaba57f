pub mod company_llm;
pub mod db;
pub mod embedding_llm;
pub mod pdf;

pub use company_llm::OpenAiCompanyAdapter;
pub use db::DbAdapter;
pub use embedding_llm::OpenAiEmbeddingAdapter;
pub use pdf::PdfTextExtractor;
