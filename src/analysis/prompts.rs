use crate::analysis::schema::SiteIntelligence;

pub const SYSTEM_PROMPT: &str = "You are an OSINT-focused cybersecurity analyst specializing in \
dark-web (.onion) content. Output only the requested JSON fields.";

pub const STRUCTURED_SYSTEM_PROMPT: &str = "You are an OSINT-focused cybersecurity analyst \
specializing in dark-web (.onion) content analysis. Extract factual information without \
speculation, normalize it according to the rules given, and answer with a single JSON object \
that matches the provided schema exactly.";

/// Default instructions for direct completion
pub const DEFAULT_ANALYSIS_PROMPT: &str = r#"Analyze the following dark-web content captured from a .onion page and return ONLY JSON.

Tasks:
1) Content Summary: what this page is about, plain and factual.
2) Key Information: names/aliases, contact methods (Telegram/Jabber/Tox/Email), URLs (.onion and clearnet), PGP keys/fingerprints, crypto wallets (BTC/ETH/XMR/...), product or service listings with prices and currencies, dates, target industries/regions, claims of affiliation or reputation.
3) Security Assessment: indicators of malware, phishing or scams, escrow claims, operational security practices, external links/downloads, signs of law-enforcement impersonation.
4) Categories: one or more of ["marketplace","vendor_shop","forum","leak_site","ransomware_blog","carding","fraud_service","malware_service","hosting","mixing_laundry","search_index","news","phishing","scam","other"].
5) Notable Elements: anything unusual or high-signal.
6) Recommendations: safety and handling guidance for analysts.
7) Source Reliability: 1-5 with a brief explanation.
8) Confidence: 0-1 with a one-sentence justification.
9) Limitations: truncation, language barriers, low-quality text.

Normalization rules:
- Dates in ISO 8601.
- PGP: 40-hex fingerprint and whether a key block is present.
- Crypto: type, address, network/tag.
- Onion links: flag v2 addresses as deprecated.
- Non-English content: detected language plus a short English summary.
"#;

/// User message for direct completion
pub fn direct_user_message(prompt: &str, content: &str) -> String {
    format!("{}\n\nContent to analyze:\n{}", prompt, content)
}

/// User message for schema-constrained extraction
///
/// A caller-supplied prompt replaces the default task description; the
/// schema and content are always appended.
pub fn structured_user_message(prompt: Option<&str>, content: &str) -> String {
    let task = prompt.unwrap_or(
        "Analyze the following dark-web content captured from a .onion page and extract structured information.",
    );

    format!(
        "{}\n\nRespond with one JSON object conforming to this JSON Schema:\n{}\n\nContent to analyze:\n{}",
        task,
        SiteIntelligence::schema_json(),
        content
    )
}
