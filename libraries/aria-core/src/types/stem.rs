/// Stem separation result types
use serde::{Deserialize, Serialize};

/// Instrument component isolated by the separation backend
///
/// The multi-stem model yields vocals/drums/bass/other; the two-stem model
/// yields vocals/instrumental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemType {
    Vocals,
    Drums,
    Bass,
    Other,
    Instrumental,
}

impl StemType {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocals => "vocals",
            Self::Drums => "drums",
            Self::Bass => "bass",
            Self::Other => "other",
            Self::Instrumental => "instrumental",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "vocals" => Some(Self::Vocals),
            "drums" => Some(Self::Drums),
            "bass" => Some(Self::Bass),
            "other" => Some(Self::Other),
            "instrumental" => Some(Self::Instrumental),
            _ => None,
        }
    }
}

impl std::fmt::Display for StemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stem of a separation job, played as its own synchronized source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemTrack {
    /// Id of the source track this stem was separated from
    pub track_id: String,

    /// Which instrument component this stem carries
    pub stem_type: StemType,

    /// Audio source locator for the isolated stem
    pub audio_url: String,
}

impl StemTrack {
    /// Create a new stem descriptor
    pub fn new(
        track_id: impl Into<String>,
        stem_type: StemType,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            stem_type,
            audio_url: audio_url.into(),
        }
    }
}
