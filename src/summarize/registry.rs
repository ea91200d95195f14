use serde::{Deserialize, Serialize};

use crate::errors::SummarizeError;
use crate::summarize::extractive::ExtractiveAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyId {
    Centrality,
    Decomposition,
    Frequency,
    Generative,
}

/// How a strategy is executed. Adding a strategy means adding a row here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Extractive(ExtractiveAlgorithm),
    Generative,
}

impl StrategyId {
    pub const ALL: [StrategyId; 4] = [
        StrategyId::Centrality,
        StrategyId::Decomposition,
        StrategyId::Frequency,
        StrategyId::Generative,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyId::Centrality => "centrality",
            StrategyId::Decomposition => "decomposition",
            StrategyId::Frequency => "frequency",
            StrategyId::Generative => "generative",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            StrategyId::Centrality => &["lexrank"],
            StrategyId::Decomposition => &["lsa"],
            StrategyId::Frequency => &["luhn"],
            StrategyId::Generative => &["llm", "ai"],
        }
    }

    pub fn kind(self) -> StrategyKind {
        match self {
            StrategyId::Centrality => StrategyKind::Extractive(ExtractiveAlgorithm::LexRank),
            StrategyId::Decomposition => StrategyKind::Extractive(ExtractiveAlgorithm::Lsa),
            StrategyId::Frequency => StrategyKind::Extractive(ExtractiveAlgorithm::Luhn),
            StrategyId::Generative => StrategyKind::Generative,
        }
    }

    pub fn requires_network(self) -> bool {
        matches!(self.kind(), StrategyKind::Generative)
    }

    fn description(self) -> &'static str {
        match self {
            StrategyId::Centrality => "graph centrality ranking of sentences (LexRank)",
            StrategyId::Decomposition => "latent semantic analysis via SVD (LSA)",
            StrategyId::Frequency => "significant-word frequency scoring (Luhn)",
            StrategyId::Generative => "language model summary via a remote service",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyEntry {
    pub id: StrategyId,
    pub aliases: Vec<&'static str>,
    pub description: &'static str,
    pub requires_network: bool,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    generative_enabled: bool,
}

impl StrategyRegistry {
    pub fn new(generative_enabled: bool) -> Self {
        Self { generative_enabled }
    }

    pub fn resolve(&self, name: &str) -> Result<StrategyId, SummarizeError> {
        let wanted = name.trim().to_lowercase();
        StrategyId::ALL
            .into_iter()
            .find(|id| id.name() == wanted || id.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| SummarizeError::UnknownStrategy {
                name: name.to_string(),
                valid: self.valid_names(),
            })
    }

    pub fn valid_names(&self) -> Vec<String> {
        StrategyId::ALL
            .iter()
            .map(|id| id.name().to_string())
            .collect()
    }

    pub fn is_available(&self, id: StrategyId) -> bool {
        !id.requires_network() || self.generative_enabled
    }

    pub fn default_strategy(&self) -> StrategyId {
        if self.generative_enabled {
            StrategyId::Generative
        } else {
            StrategyId::Centrality
        }
    }

    pub fn entries(&self) -> Vec<StrategyEntry> {
        StrategyId::ALL
            .into_iter()
            .map(|id| StrategyEntry {
                id,
                aliases: id.aliases().to_vec(),
                description: id.description(),
                requires_network: id.requires_network(),
                available: self.is_available(id),
            })
            .collect()
    }
}
