use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::command::Language;

/// One synthesis voice offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Stable identifier used as the final canonical path component.
    pub id: String,
    /// Voice name as the synthesis provider knows it.
    pub provider_voice: String,
    pub language: Language,
}

impl VoiceProfile {
    pub fn new(id: impl Into<String>, provider_voice: impl Into<String>, language: Language) -> Self {
        Self {
            id: id.into(),
            provider_voice: provider_voice.into(),
            language,
        }
    }
}

/// Registry of voice profiles per language.
///
/// Constructed once at process start and passed by reference down the
/// pipeline; there is intentionally no process-wide instance.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    voices: HashMap<Language, Vec<VoiceProfile>>,
}

impl VoiceRegistry {
    pub fn new(profiles: Vec<VoiceProfile>) -> Self {
        let mut voices: HashMap<Language, Vec<VoiceProfile>> = HashMap::new();
        for profile in profiles {
            voices.entry(profile.language).or_default().push(profile);
        }
        Self { voices }
    }

    /// The stock registry shipped with the tool.
    pub fn builtin() -> Self {
        let mut profiles = Vec::new();
        for name in ["Matt", "Linda", "Betty"] {
            profiles.push(VoiceProfile::new(name.to_lowercase(), name, Language::English));
        }
        for name in ["Chae-Won", "Min-Ho", "Seo-Yeon", "Tae-Hee", "Joon-Gi"] {
            profiles.push(VoiceProfile::new(name.to_lowercase(), name, Language::Korean));
        }
        for name in ["Yuriko", "Akira", "Kasumi"] {
            profiles.push(VoiceProfile::new(name.to_lowercase(), name, Language::Japanese));
        }
        Self::new(profiles)
    }

    pub fn voices_for(&self, language: Language) -> &[VoiceProfile] {
        self.voices.get(&language).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn voice_count(&self, language: Option<Language>) -> usize {
        match language {
            Some(language) => self.voices_for(language).len(),
            None => self.voices.values().map(Vec::len).sum(),
        }
    }
}
