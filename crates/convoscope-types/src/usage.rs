use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use crate::util::lenient;

/// Token usage reported on an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_creation_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_read_input_tokens: u64,
    /// Ephemeral cache breakdown of `cache_creation_input_tokens`
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cache_creation: Option<CacheCreation>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheCreation {
    #[serde(default, deserialize_with = "lenient")]
    pub ephemeral_5m_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub ephemeral_1h_input_tokens: u64,
}

impl Usage {
    /// Input side of the context window: fresh + cache writes + cache reads.
    pub fn total_input(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
    }

    pub fn total(&self) -> u64 {
        self.total_input().saturating_add(self.output_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Merge another report of the *same* message.
    ///
    /// Chunks of one streamed message repeat (and grow) the usage block, so the
    /// counters combine by maximum rather than by sum.
    pub fn merge_max(&mut self, other: &Usage) {
        self.input_tokens = self.input_tokens.max(other.input_tokens);
        self.output_tokens = self.output_tokens.max(other.output_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .max(other.cache_creation_input_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .max(other.cache_read_input_tokens);

        match (&mut self.cache_creation, &other.cache_creation) {
            (Some(current), Some(incoming)) => {
                current.ephemeral_5m_input_tokens = current
                    .ephemeral_5m_input_tokens
                    .max(incoming.ephemeral_5m_input_tokens);
                current.ephemeral_1h_input_tokens = current
                    .ephemeral_1h_input_tokens
                    .max(incoming.ephemeral_1h_input_tokens);
            }
            (None, Some(incoming)) => self.cache_creation = Some(incoming.clone()),
            _ => {}
        }

        if self.service_tier.is_none() {
            self.service_tier = other.service_tier.clone();
        }
    }
}

/// Summation across *distinct* messages. Counters come from untrusted lines
/// and saturate at `u64::MAX`.
impl AddAssign<&Usage> for Usage {
    fn add_assign(&mut self, other: &Usage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .saturating_add(other.cache_creation_input_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .saturating_add(other.cache_read_input_tokens);

        if let Some(incoming) = &other.cache_creation {
            let current = self.cache_creation.get_or_insert_with(CacheCreation::default);
            current.ephemeral_5m_input_tokens = current
                .ephemeral_5m_input_tokens
                .saturating_add(incoming.ephemeral_5m_input_tokens);
            current.ephemeral_1h_input_tokens = current
                .ephemeral_1h_input_tokens
                .saturating_add(incoming.ephemeral_1h_input_tokens);
        }

        if self.service_tier.is_none() {
            self.service_tier = other.service_tier.clone();
        }
    }
}
