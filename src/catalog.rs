//! Known model identifiers and their mock profiles.
//!
//! The catalog is built once at startup and shared read-only with every
//! request handler. Lookups for unknown identifiers fall back to
//! [`DEFAULT_MODEL_ID`].

/// Model whose profile answers for identifiers the catalog does not know.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Static description of a simulated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProfile {
    /// Name reported in responses (the Claude `model` field, output text).
    pub display_name: &'static str,
    /// Declared output ceiling. Informational only, never enforced.
    pub max_tokens: u32,
}

const BUILTIN_MODELS: &[(&str, ModelProfile)] = &[
    (
        "anthropic.claude-3-5-sonnet-20240620-v1:0",
        ModelProfile {
            display_name: "claude-3-5-sonnet-20240620",
            max_tokens: 8192,
        },
    ),
    (
        DEFAULT_MODEL_ID,
        ModelProfile {
            display_name: "claude-3-sonnet-20240229",
            max_tokens: 4096,
        },
    ),
    (
        "anthropic.claude-3-haiku-20240307-v1:0",
        ModelProfile {
            display_name: "claude-3-haiku-20240307",
            max_tokens: 4096,
        },
    ),
    (
        "amazon.titan-text-express-v1",
        ModelProfile {
            display_name: "titan-text-express",
            max_tokens: 4096,
        },
    ),
];

/// Immutable lookup table from model identifier to [`ModelProfile`].
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    /// Entries in declaration order.
    entries: Vec<(&'static str, ModelProfile)>,
    /// Profile used when a lookup misses.
    fallback: ModelProfile,
}

impl ModelCatalog {
    /// The four Bedrock models the mock advertises.
    pub fn builtin() -> Self {
        let fallback = BUILTIN_MODELS
            .iter()
            .find(|(id, _)| *id == DEFAULT_MODEL_ID)
            .map(|(_, profile)| *profile)
            .unwrap_or(BUILTIN_MODELS[0].1);
        Self {
            entries: BUILTIN_MODELS.to_vec(),
            fallback,
        }
    }

    /// Exact lookup without fallback.
    pub fn get(&self, model_id: &str) -> Option<&ModelProfile> {
        self.entries
            .iter()
            .find(|(id, _)| *id == model_id)
            .map(|(_, profile)| profile)
    }

    /// Lookup with fallback to the default profile.
    pub fn resolve(&self, model_id: &str) -> &ModelProfile {
        self.get(model_id).unwrap_or(&self.fallback)
    }

    /// Known identifiers in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Number of known models.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
