use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::WHISPER_MODEL_BASE_URL;

/// ggml Whisper checkpoints published for whisper.cpp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhisperModel {
    #[serde(rename = "tiny")]
    Tiny,
    #[serde(rename = "tiny.en")]
    TinyEn,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "base.en")]
    BaseEn,
    #[default]
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "small.en")]
    SmallEn,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "medium.en")]
    MediumEn,
    #[serde(rename = "large-v1")]
    LargeV1,
    #[serde(rename = "large-v2")]
    LargeV2,
    #[serde(rename = "large-v3")]
    LargeV3,
    #[serde(rename = "large")]
    Large,
}

impl WhisperModel {
    pub const ALL: &[WhisperModel] = &[
        WhisperModel::Tiny,
        WhisperModel::TinyEn,
        WhisperModel::Base,
        WhisperModel::BaseEn,
        WhisperModel::Small,
        WhisperModel::SmallEn,
        WhisperModel::Medium,
        WhisperModel::MediumEn,
        WhisperModel::LargeV1,
        WhisperModel::LargeV2,
        WhisperModel::LargeV3,
        WhisperModel::Large,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::TinyEn => "tiny.en",
            WhisperModel::Base => "base",
            WhisperModel::BaseEn => "base.en",
            WhisperModel::Small => "small",
            WhisperModel::SmallEn => "small.en",
            WhisperModel::Medium => "medium",
            WhisperModel::MediumEn => "medium.en",
            WhisperModel::LargeV1 => "large-v1",
            WhisperModel::LargeV2 => "large-v2",
            WhisperModel::LargeV3 => "large-v3",
            WhisperModel::Large => "large",
        }
    }

    pub fn file_name(&self) -> String {
        // "large" is published as the latest large checkpoint
        let name = match self {
            WhisperModel::Large => WhisperModel::LargeV3.name(),
            other => other.name(),
        };
        format!("ggml-{name}.bin")
    }

    pub fn url(&self) -> String {
        format!("{WHISPER_MODEL_BASE_URL}/{}", self.file_name())
    }

    /// English-only checkpoints cannot transcribe or detect other languages.
    pub fn is_english_only(&self) -> bool {
        self.name().ends_with(".en")
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WhisperModel::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = WhisperModel::ALL.iter().map(|m| m.name()).collect();
                format!("unknown model '{s}', expected one of: {}", names.join(", "))
            })
    }
}
