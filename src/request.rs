use crate::error::{ClientError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Maximum number of documents requested per search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultLimit {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl ResultLimit {
    pub const ALL: [ResultLimit; 4] = [Self::Five, Self::Ten, Self::Twenty, Self::Fifty];

    pub fn get(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for ResultLimit {
    type Error = ClientError;

    fn try_from(value: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|limit| limit.get() == value)
            .ok_or_else(|| {
                ClientError::InvalidOptions(format!(
                    "limit must be one of 5, 10, 20 or 50 (got {})",
                    value
                ))
            })
    }
}

impl fmt::Display for ResultLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Ranking method selector understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMethod {
    /// Term-frequency / inverse-document-frequency
    TfIdf,
    /// Singular value decomposition / latent semantic indexing
    Svd,
    /// Low-rank approximation with noise filtering
    LowRank,
}

impl RankingMethod {
    /// Numeric selector sent as `method`
    pub fn code(self) -> u8 {
        match self {
            Self::TfIdf => 2,
            Self::Svd => 3,
            Self::LowRank => 4,
        }
    }

    pub fn requires_k(self) -> bool {
        !matches!(self, Self::TfIdf)
    }
}

impl FromStr for RankingMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" | "2" => Ok(Self::TfIdf),
            "svd" | "lsi" | "3" => Ok(Self::Svd),
            "low-rank" | "lowrank" | "4" => Ok(Self::LowRank),
            other => Err(ClientError::InvalidOptions(format!(
                "unknown ranking method '{}' (expected tfidf, svd or low-rank)",
                other
            ))),
        }
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TfIdf => "tfidf",
            Self::Svd => "svd",
            Self::LowRank => "low-rank",
        })
    }
}

/// Method-specific ranking payload; reduced-rank methods always carry `k`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    TfIdf,
    Svd { k: u32 },
    LowRank { k: u32 },
}

impl Ranking {
    /// Build a payload, rejecting a missing or zero `k` for methods that need one
    pub fn new(method: RankingMethod, k: Option<u32>) -> Result<Self> {
        match (method, k) {
            (RankingMethod::TfIdf, _) => Ok(Self::TfIdf),
            (_, None) => Err(ClientError::InvalidOptions(format!(
                "method '{}' requires a rank parameter k",
                method
            ))),
            (_, Some(0)) => Err(ClientError::InvalidOptions(
                "rank parameter k must be positive".to_string(),
            )),
            (RankingMethod::Svd, Some(k)) => Ok(Self::Svd { k }),
            (RankingMethod::LowRank, Some(k)) => Ok(Self::LowRank { k }),
        }
    }

    pub fn method(&self) -> RankingMethod {
        match self {
            Self::TfIdf => RankingMethod::TfIdf,
            Self::Svd { .. } => RankingMethod::Svd,
            Self::LowRank { .. } => RankingMethod::LowRank,
        }
    }

    pub fn k(&self) -> Option<u32> {
        match self {
            Self::TfIdf => None,
            Self::Svd { k } | Self::LowRank { k } => Some(*k),
        }
    }
}

/// Options selected alongside the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub limit: ResultLimit,
    pub ranking: Option<Ranking>,
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: ResultLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = Some(ranking);
        self
    }
}

/// One search submission. Only constructible from a non-blank query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    query: String,
    options: SearchOptions,
}

impl SearchRequest {
    /// Returns `None` when the query is empty after trimming
    pub fn new(query: &str, options: SearchOptions) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(Self {
            query: query.to_string(),
            options,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// JSON body for `POST /search`
    pub fn body(&self) -> SearchBody<'_> {
        SearchBody {
            query: &self.query,
            limit: self.options.limit.get(),
            method: self.options.ranking.map(|r| r.method().code()),
            k: self.options.ranking.and_then(|r| r.k()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchBody<'a> {
    pub query: &'a str,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
}
