// Form state holder - raw field values plus the UI toggles that gate them
// Values stay as strings until `validate` turns them into a TokenConfig

use crate::error::CoreError;
use crate::models::{AdvancedOptions, CreatorInfo, Links, SocialLinks, TokenConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest precision accepted for a new mint.
pub const MAX_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Symbol,
    Decimals,
    Supply,
    Description,
    Website,
    Twitter,
    Telegram,
    Discord,
    CreatorName,
    CreatorWebsite,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::Name,
        FormField::Symbol,
        FormField::Decimals,
        FormField::Supply,
        FormField::Description,
        FormField::Website,
        FormField::Twitter,
        FormField::Telegram,
        FormField::Discord,
        FormField::CreatorName,
        FormField::CreatorWebsite,
    ];

    /// Name used by the browser form's input elements.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Symbol => "symbol",
            FormField::Decimals => "decimals",
            FormField::Supply => "supply",
            FormField::Description => "description",
            FormField::Website => "website",
            FormField::Twitter => "twitter",
            FormField::Telegram => "telegram",
            FormField::Discord => "discord",
            FormField::CreatorName => "creatorName",
            FormField::CreatorWebsite => "creatorWebsite",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FormField::Name),
            "symbol" => Ok(FormField::Symbol),
            "decimals" => Ok(FormField::Decimals),
            "supply" => Ok(FormField::Supply),
            "description" => Ok(FormField::Description),
            "website" => Ok(FormField::Website),
            "twitter" => Ok(FormField::Twitter),
            "telegram" => Ok(FormField::Telegram),
            "discord" => Ok(FormField::Discord),
            "creatorName" | "creator_name" => Ok(FormField::CreatorName),
            "creatorWebsite" | "creator_website" => Ok(FormField::CreatorWebsite),
            other => Err(CoreError::InvalidInput(format!("Unknown form field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFormData {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub supply: String,
    pub description: String,
    pub website: String,
    pub twitter: String,
    pub telegram: String,
    pub discord: String,
    pub creator_name: String,
    pub creator_website: String,
}

impl Default for TokenFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            decimals: "6".to_string(),
            supply: "10".to_string(),
            description: String::new(),
            website: String::new(),
            twitter: String::new(),
            telegram: String::new(),
            discord: String::new(),
            creator_name: String::new(),
            creator_website: String::new(),
        }
    }
}

impl TokenFormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Symbol => &self.symbol,
            FormField::Decimals => &self.decimals,
            FormField::Supply => &self.supply,
            FormField::Description => &self.description,
            FormField::Website => &self.website,
            FormField::Twitter => &self.twitter,
            FormField::Telegram => &self.telegram,
            FormField::Discord => &self.discord,
            FormField::CreatorName => &self.creator_name,
            FormField::CreatorWebsite => &self.creator_website,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Symbol => &mut self.symbol,
            FormField::Decimals => &mut self.decimals,
            FormField::Supply => &mut self.supply,
            FormField::Description => &mut self.description,
            FormField::Website => &mut self.website,
            FormField::Twitter => &mut self.twitter,
            FormField::Telegram => &mut self.telegram,
            FormField::Discord => &mut self.discord,
            FormField::CreatorName => &mut self.creator_name,
            FormField::CreatorWebsite => &mut self.creator_website,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiToggles {
    pub show_advanced: bool,
    pub show_social_links: bool,
    pub modify_creator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormState {
    pub data: TokenFormData,
    pub toggles: UiToggles,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace exactly one field; every other field is left untouched.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.data.slot(field) = value.into();
    }

    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let field = name.parse::<FormField>()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn get(&self, field: FormField) -> &str {
        self.data.get(field)
    }

    pub fn toggle_advanced(&mut self) -> bool {
        self.toggles.show_advanced = !self.toggles.show_advanced;
        self.toggles.show_advanced
    }

    pub fn toggle_social_links(&mut self) -> bool {
        self.toggles.show_social_links = !self.toggles.show_social_links;
        self.toggles.show_social_links
    }

    pub fn toggle_modify_creator(&mut self) -> bool {
        self.toggles.modify_creator = !self.toggles.modify_creator;
        self.toggles.modify_creator
    }

    /// Turn the raw strings into a `TokenConfig`, rejecting anything the
    /// assembler could not encode.
    pub fn validate(&self) -> Result<TokenConfig, CoreError> {
        let d = &self.data;
        let name = required(&d.name, "name")?;
        let symbol = required(&d.symbol, "symbol")?;

        let decimals = required(&d.decimals, "decimals")?
            .parse::<u8>()
            .map_err(|_| CoreError::InvalidInput(format!("Decimals must be a whole number between 0 and {}", MAX_DECIMALS)))?;
        if decimals > MAX_DECIMALS {
            return Err(CoreError::InvalidInput(format!(
                "Decimals must be a whole number between 0 and {}",
                MAX_DECIMALS
            )));
        }

        let supply = required(&d.supply, "supply")?
            .parse::<u64>()
            .map_err(|_| CoreError::InvalidInput("Supply must be a positive whole number".to_string()))?;
        if supply == 0 {
            return Err(CoreError::InvalidInput("Supply must be a positive whole number".to_string()));
        }

        let social = if self.toggles.show_social_links {
            let links = Links {
                website: optional_url(&d.website, "website")?,
                twitter: optional(&d.twitter),
                telegram: optional(&d.telegram),
                discord: optional(&d.discord),
            };
            SocialLinks::Present(links)
        } else {
            SocialLinks::None
        };

        let advanced = if self.toggles.show_advanced && self.toggles.modify_creator {
            AdvancedOptions::ModifyCreator(CreatorInfo {
                name: required(&d.creator_name, "creatorName")?,
                website: optional_url(&d.creator_website, "creatorWebsite")?,
            })
        } else {
            AdvancedOptions::None
        };

        let config = TokenConfig {
            name,
            symbol,
            decimals,
            supply,
            description: optional(&d.description),
            advanced,
            social,
        };
        if config.supply_base_units().is_none() {
            return Err(CoreError::InvalidInput(format!(
                "Supply of {} with {} decimals does not fit in a mint",
                supply, decimals
            )));
        }
        Ok(config)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional_url(value: &str, field: &str) -> Result<Option<String>, CoreError> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };
    let parsed = url::Url::parse(&raw)
        .map_err(|e| CoreError::InvalidInput(format!("{} is not a valid URL: {}", field, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CoreError::InvalidInput(format!("{} must be an http(s) URL", field)));
    }
    Ok(Some(raw))
}
