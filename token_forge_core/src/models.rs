use serde::{Deserialize, Serialize};

/// Creator details shown when the user opts into "Modify Creator Information".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorInfo {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvancedOptions {
    #[default]
    None,
    ModifyCreator(CreatorInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Links {
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self.website.is_none() && self.twitter.is_none() && self.telegram.is_none() && self.discord.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SocialLinks {
    #[default]
    None,
    Present(Links),
}

/// Validated, typed form contents. Only produced by `FormState::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Whole tokens; base units are `supply * 10^decimals`.
    pub supply: u64,
    pub description: Option<String>,
    pub advanced: AdvancedOptions,
    pub social: SocialLinks,
}

impl TokenConfig {
    pub fn supply_base_units(&self) -> Option<u64> {
        10u64
            .checked_pow(u32::from(self.decimals))
            .and_then(|scale| self.supply.checked_mul(scale))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainCreator {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

/// JSON document meant to be hosted at the token's metadata URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainTokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Links>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<OffchainCreator>,
}

impl OffchainTokenMetadata {
    pub fn from_config(config: &TokenConfig, image: Option<String>) -> Self {
        let extensions = match &config.social {
            SocialLinks::Present(links) if !links.is_empty() => Some(links.clone()),
            _ => None,
        };
        let creator = match &config.advanced {
            AdvancedOptions::ModifyCreator(info) => Some(OffchainCreator {
                name: info.name.clone(),
                site: info.website.clone(),
            }),
            AdvancedOptions::None => None,
        };
        Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            description: config.description.clone(),
            image,
            extensions,
            creator,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig {
            name: "Test".to_string(),
            symbol: "TST".to_string(),
            decimals: 6,
            supply: 10,
            description: Some("a test token".to_string()),
            advanced: AdvancedOptions::None,
            social: SocialLinks::None,
        }
    }

    #[test]
    fn supply_scales_by_decimals() {
        assert_eq!(config().supply_base_units(), Some(10_000_000));
        let huge = TokenConfig { supply: u64::MAX, ..config() };
        assert_eq!(huge.supply_base_units(), None);
    }

    #[test]
    fn offchain_document_omits_absent_sections() {
        let doc = OffchainTokenMetadata::from_config(&config(), None);
        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"symbol\": \"TST\""));
        assert!(!json.contains("extensions"));
        assert!(!json.contains("creator"));
    }

    #[test]
    fn offchain_document_carries_links_and_creator() {
        let cfg = TokenConfig {
            social: SocialLinks::Present(Links {
                twitter: Some("https://x.com/tst".to_string()),
                ..Links::default()
            }),
            advanced: AdvancedOptions::ModifyCreator(CreatorInfo {
                name: "Forge Labs".to_string(),
                website: None,
            }),
            ..config()
        };
        let doc = OffchainTokenMetadata::from_config(&cfg, Some("https://img/x.png".to_string()));
        assert_eq!(doc.extensions.unwrap().twitter.as_deref(), Some("https://x.com/tst"));
        assert_eq!(doc.creator.unwrap().name, "Forge Labs");
        assert_eq!(doc.image.as_deref(), Some("https://img/x.png"));
    }
}
