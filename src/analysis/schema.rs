//! Output schema for schema-constrained extraction
//!
//! The JSON Schema sent to the model is generated from these types with
//! `schemars`, so the prompt and the strict parser never disagree.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// Page type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SiteCategory {
    Marketplace,
    VendorShop,
    Forum,
    LeakSite,
    RansomwareBlog,
    Carding,
    FraudService,
    MalwareService,
    Hosting,
    MixingLaundry,
    SearchIndex,
    News,
    Phishing,
    Scam,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactMethod {
    /// Telegram, Email, Jabber, Tox, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CryptoWallet {
    /// BTC, ETH, XMR, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PgpKey {
    /// 40 hex characters
    pub fingerprint: String,
    pub key_block_present: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OnionLink {
    pub url: String,
    /// Deprecated v2 address
    pub is_v2: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Offering {
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Concrete details extracted from the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KeyInformation {
    pub names_aliases: Vec<String>,
    pub contact_methods: Vec<ContactMethod>,
    pub crypto_wallets: Vec<CryptoWallet>,
    pub pgp_keys: Vec<PgpKey>,
    pub onion_links: Vec<OnionLink>,
    pub clearnet_urls: Vec<String>,
    pub products_services: Vec<Offering>,
    /// ISO 8601
    pub dates_timestamps: Vec<String>,
    pub target_industries: Vec<String>,
    pub target_regions: Vec<String>,
    pub affiliations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SecurityAssessment {
    pub malware_indicators: Vec<String>,
    pub phishing_indicators: Vec<String>,
    pub scam_indicators: Vec<String>,
    pub escrow_claims: Vec<String>,
    pub opsec_practices: Vec<String>,
    pub external_links: Vec<String>,
    pub le_impersonation_signs: Vec<String>,
}

/// Structured intelligence about one onion page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SiteIntelligence {
    pub content_summary: String,
    pub key_information: KeyInformation,
    pub security_assessment: SecurityAssessment,
    pub categories: Vec<SiteCategory>,
    #[serde(default)]
    pub notable_elements: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// 1 (unreliable) to 5 (highly reliable)
    #[schemars(range(min = 1, max = 5))]
    pub source_reliability: u8,
    pub source_reliability_explanation: String,
    /// 0.0 to 1.0
    #[schemars(range(min = 0.0, max = 1.0))]
    pub confidence: f64,
    pub confidence_justification: String,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub english_summary: Option<String>,
}

impl SiteIntelligence {
    /// Pretty-printed JSON Schema embedded in the extraction prompt
    pub fn schema_json() -> String {
        serde_json::to_string_pretty(&schema_for!(SiteIntelligence)).unwrap_or_default()
    }

    /// Parses a model response strictly, including range checks
    pub fn parse_strict(raw: &str) -> Result<Self, String> {
        let parsed: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;

        if !(1..=5).contains(&parsed.source_reliability) {
            return Err(format!(
                "source_reliability out of range: {}",
                parsed.source_reliability
            ));
        }
        if !(0.0..=1.0).contains(&parsed.confidence) {
            return Err(format!("confidence out of range: {}", parsed.confidence));
        }

        Ok(parsed)
    }
}
