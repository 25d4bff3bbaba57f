pub mod domain;
pub mod index;
pub mod ports;
pub mod similarity;

pub use domain::{
    AllowedEmail, AnalyticsPoint, CaseDocument, CaseSummary, CompanyInfo, CompanyProfile,
    Identity, NewCaseDocument, Role, ScoredCase,
};
pub use index::LinearScanIndex;
pub use ports::{
    CompanyResearchService, DatabaseService, EmbeddingService, PortError, PortResult,
    SearchError, SimilaritySearchIndex, TextExtractor,
};
pub use similarity::{cosine_similarity, rank, round_score, SimilarityError, DEFAULT_RANK_LIMIT};
