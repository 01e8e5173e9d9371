//! # Emotional Speech
//!
//! Prefixes robot speech with voice-tuning tags (volume, pitch, speaking rate).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Empathetic,
}

impl Emotion {
    /// Tag prefix understood by the text-to-speech engine.
    pub fn tags(self) -> &'static str {
        match self {
            // \vol=\ volume 0-100, \vct=\ pitch 50-200, \rspd=\ rate 50-400
            Emotion::Happy => r"\vol=80\\vct=100\\rspd=115\",
            Emotion::Empathetic => r"\vol=65\\vct=90\\rspd=85\",
        }
    }

    pub fn wrap(self, text: &str) -> String {
        format!("{}{}", self.tags(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_prefixes_tags() {
        assert_eq!(
            Emotion::Happy.wrap("Well done!"),
            "\\vol=80\\\\vct=100\\\\rspd=115\\Well done!"
        );
        assert!(Emotion::Empathetic.wrap("Oh no").starts_with(r"\vol=65\"));
    }
}
