use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use moodfield_core::{ActivityCount, MoodSeed};
use moodfield_engine::GenerationResult;
use serde::{Deserialize, Serialize};

use crate::config::MetadataConfig;

/// Prefix of an inline PNG image URI.
pub(crate) const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Metadata document published alongside an artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TokenMetadata {
    /// Human readable token name.
    pub(crate) name: String,
    /// Free-text description shared by every token.
    pub(crate) description: String,
    /// Artifact location, either a storage URI or an inline data URI.
    pub(crate) image: String,
    /// Trait list in marketplace order.
    pub(crate) attributes: Vec<TokenAttribute>,
    /// Optional landing page for the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) external_url: Option<String>,
    /// RFC 3339 creation time.
    pub(crate) created_at: String,
}

/// Single `trait_type`/`value` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TokenAttribute {
    /// Trait label.
    pub(crate) trait_type: String,
    /// Trait value.
    pub(crate) value: AttributeValue,
}

/// Attribute values are either numbers or strings on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum AttributeValue {
    /// Integer trait such as a count or score.
    Number(u64),
    /// Textual trait.
    Text(String),
}

impl TokenAttribute {
    fn text(trait_type: &str, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.to_owned(),
            value: AttributeValue::Text(value.into()),
        }
    }

    fn number(trait_type: &str, value: u64) -> Self {
        Self {
            trait_type: trait_type.to_owned(),
            value: AttributeValue::Number(value),
        }
    }
}

impl TokenMetadata {
    /// Describes a generation. Without `image_uri` the PNG is inlined.
    pub(crate) fn describe(
        seed: &MoodSeed,
        activity: ActivityCount,
        result: &GenerationResult,
        config: &MetadataConfig,
        image_uri: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let created_at = created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let image = image_uri.map_or_else(|| data_uri(result.artifact().bytes()), str::to_owned);

        let attributes = vec![
            TokenAttribute::text("Mood", seed.as_str()),
            TokenAttribute::number("Activity Count", activity.get()),
            TokenAttribute::number("Rarity Score", u64::from(result.rarity_score().get())),
            TokenAttribute::text("Palette", result.palette_name().as_str()),
            TokenAttribute::number("Particle Count", result.particle_count() as u64),
            TokenAttribute::text("Generated At", created_at.clone()),
            TokenAttribute::text("Artifact SHA-256", result.artifact().digest_hex()),
        ];

        Self {
            name: format!("{}: {}", config.name_prefix, seed),
            description: config.description.clone(),
            image,
            attributes,
            external_url: config.external_url.clone(),
            created_at,
        }
    }
}

/// Inlines PNG bytes as a `data:` URI.
pub(crate) fn data_uri(png: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png))
}
