//! Safety policy types
//!
//! Category -> threshold mapping applied to every generation call.
//! Config files use snake_case names; `api_name` gives the provider wire name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Harm category recognized by the provider's content filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    /// All categories, in wire order
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    /// Provider wire name
    pub fn api_name(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// Blocking threshold for a harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmBlockThreshold {
    /// Never block (application performs its own risk analysis)
    #[default]
    BlockNone,
    /// Block only high-probability content
    BlockOnlyHigh,
    /// Block medium and high probability content
    BlockMediumAndAbove,
    /// Block low probability and above
    BlockLowAndAbove,
}

impl HarmBlockThreshold {
    /// Provider wire name
    pub fn api_name(&self) -> &'static str {
        match self {
            HarmBlockThreshold::BlockNone => "BLOCK_NONE",
            HarmBlockThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            HarmBlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            HarmBlockThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }
}

/// Safety settings - category -> threshold mapping
///
/// Immutable value type, cheap to clone. The default policy blocks
/// nothing across all four categories: scam samples routinely trip the
/// provider filters, and the risk verdict must still be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafetySettings {
    thresholds: BTreeMap<HarmCategory, HarmBlockThreshold>,
}

impl Default for SafetySettings {
    fn default() -> Self {
        let thresholds = HarmCategory::ALL
            .iter()
            .map(|c| (*c, HarmBlockThreshold::BlockNone))
            .collect();
        Self { thresholds }
    }
}

impl SafetySettings {
    /// Create the default "block nothing" policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set threshold for one category (builder style)
    pub fn with_threshold(mut self, category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        self.thresholds.insert(category, threshold);
        self
    }

    /// Effective threshold for a category (missing entries block nothing)
    pub fn threshold(&self, category: HarmCategory) -> HarmBlockThreshold {
        self.thresholds
            .get(&category)
            .copied()
            .unwrap_or(HarmBlockThreshold::BlockNone)
    }

    /// Iterate over configured (category, threshold) pairs
    pub fn iter(&self) -> impl Iterator<Item = (HarmCategory, HarmBlockThreshold)> + '_ {
        self.thresholds.iter().map(|(c, t)| (*c, *t))
    }
}
