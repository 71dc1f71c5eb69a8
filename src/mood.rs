use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood tags attached to catalog entries.
///
/// Declaration order doubles as classification priority: a title matching
/// keywords from two moods resolves to whichever is declared first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sad,
    Chill,
    Happy,
    Romantic,
    Study,
    Sleep,
    Rainy,
    Jazzy,
    Beats,
    Nostalgic,
    Anime,
    Ambient,
    /// Default fallback when no keyword matches.
    Lofi,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Chill => "chill",
            Mood::Happy => "happy",
            Mood::Romantic => "romantic",
            Mood::Study => "study",
            Mood::Sleep => "sleep",
            Mood::Rainy => "rainy",
            Mood::Jazzy => "jazzy",
            Mood::Beats => "beats",
            Mood::Nostalgic => "nostalgic",
            Mood::Anime => "anime",
            Mood::Ambient => "ambient",
            Mood::Lofi => "lofi",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered keyword vocabulary. Static configuration, never mutated at runtime.
const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Sad, &["sad", "cry", "tears", "alone", "broken", "heartbreak"]),
    (Mood::Chill, &["chill", "relax", "calm", "smooth", "laid back"]),
    (Mood::Happy, &["happy", "smile", "joy", "sun", "bright", "good vibes"]),
    (Mood::Romantic, &["love", "romance", "kiss", "heart", "forever"]),
    (Mood::Study, &["study", "focus", "concentration", "work", "productive"]),
    (Mood::Sleep, &["sleep", "dream", "night", "midnight", "rest"]),
    (Mood::Rainy, &["rain", "rainy", "storm", "cloud", "drizzle"]),
    (Mood::Jazzy, &["jazz", "jazzy", "sax", "blues"]),
    (Mood::Beats, &["beat", "beats", "instrumental", "groove"]),
    (Mood::Nostalgic, &["nostalgia", "nostalgic", "memory", "memories", "old"]),
    (Mood::Anime, &["anime", "otaku", "japan", "japanese"]),
    (Mood::Ambient, &["ambient", "atmosphere", "space", "ethereal"]),
];

/// Classify a title into a mood tag by ordered keyword-substring matching.
///
/// Pure function of the title and the fixed vocabulary; the first mood whose
/// keyword appears anywhere in the lower-cased title wins, `Mood::Lofi` when
/// nothing matches.
pub fn classify(title: &str) -> Mood {
    let lower = title.to_lowercase();
    for (mood, keywords) in MOOD_KEYWORDS {
        for keyword in *keywords {
            if lower.contains(keyword) {
                return *mood;
            }
        }
    }
    Mood::Lofi
}
