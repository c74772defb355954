//! Configuration types for SwapBook engines.

use serde::{Deserialize, Serialize};

use crate::{Result, SwapbookError, TokenId, TokenPair};

/// Configuration for the pair a single engine instance serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Token offered by bids (e.g., "CatToken").
    pub source_token: String,
    /// Token wanted by bids (e.g., "DogToken").
    pub target_token: String,
}

impl PairConfig {
    /// The two demo ERC-20 tokens deployed alongside the exchange.
    #[must_use]
    pub fn cat_dog() -> Self {
        Self {
            source_token: "CatToken".to_string(),
            target_token: "DogToken".to_string(),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SwapbookError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_token.is_empty() || self.target_token.is_empty() {
            return Err(SwapbookError::Configuration(
                "pair tokens must be non-empty".to_string(),
            ));
        }
        if self.source_token == self.target_token {
            return Err(SwapbookError::Configuration(format!(
                "pair trades {} against itself",
                self.source_token
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn pair(&self) -> TokenPair {
        TokenPair {
            source: TokenId::new(self.source_token.clone()),
            target: TokenId::new(self.target_token.clone()),
        }
    }

    /// Returns the pair symbol (e.g., "CatToken/DogToken").
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.source_token, self.target_token)
    }
}
