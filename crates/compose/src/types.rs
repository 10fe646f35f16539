use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest title forwarded to audio generation, in characters
pub const MAX_TITLE_CHARS: usize = 60;

/// Opaque track record produced by the audio service
pub type AudioTrack = serde_json::Value;

/// Creative brief submitted by the caller
///
/// Every field is required; a body missing one of them, or carrying one
/// with the wrong JSON type, does not deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Free-form description of the desired song
    pub custom: String,
    /// Selected style options, in the order the caller picked them
    pub multiselect: Vec<String>,
    /// Page content the brief may refer to
    pub html_content: String,
    /// Whether the track should contain vocals
    pub vocals: bool,
    /// Track title
    pub title: String,
}

impl GenerationRequest {
    /// Cut `title` down to [`MAX_TITLE_CHARS`] characters
    pub fn truncate_title(&mut self) {
        if let Some((end, _)) = self.title.char_indices().nth(MAX_TITLE_CHARS) {
            self.title.truncate(end);
        }
    }
}

/// Structured prompt derived from a brief
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPrompt {
    /// Lyrics or description handed to audio generation
    pub prompt: String,
    /// Comma-separated style tags
    pub tags: String,
}

impl fmt::Display for DerivedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Parameters for a single audio generation call
///
/// Serializes to the `custom_generate` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub prompt: String,
    pub tags: String,
    pub title: String,
    pub make_instrumental: bool,
    pub wait_audio: bool,
}

impl GenerationParams {
    /// Combine a brief with its derived prompt
    ///
    /// The brief's title must already be truncated.
    pub fn new(request: &GenerationRequest, derived: DerivedPrompt) -> Self {
        Self {
            prompt: derived.prompt,
            tags: derived.tags,
            title: request.title.clone(),
            make_instrumental: !request.vocals,
            wait_audio: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, vocals: bool) -> GenerationRequest {
        GenerationRequest {
            custom: "a song about rain".to_string(),
            multiselect: vec!["lofi".to_string(), "chill".to_string()],
            html_content: String::new(),
            vocals,
            title: title.to_string(),
        }
    }

    #[test]
    fn long_title_keeps_first_sixty_characters() {
        let title = "My Song Title That Is Definitely Longer Than Sixty Characters For Testing";
        let mut request = request(title, true);

        request.truncate_title();

        assert_eq!(request.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(request.title, title.chars().take(MAX_TITLE_CHARS).collect::<String>());
    }

    #[test]
    fn short_title_is_untouched() {
        let mut request = request("Rain", true);
        request.truncate_title();
        assert_eq!(request.title, "Rain");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "é".repeat(75);
        let mut request = request(&title, true);

        request.truncate_title();

        assert_eq!(request.title, "é".repeat(60));
    }

    #[test]
    fn instrumental_is_negation_of_vocals() {
        let derived = DerivedPrompt {
            prompt: "p".to_string(),
            tags: "t".to_string(),
        };

        for vocals in [true, false] {
            let params = GenerationParams::new(&request("Rain", vocals), derived.clone());
            assert_eq!(params.make_instrumental, !vocals);
            assert!(params.wait_audio);
        }
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let body = r#"{"custom":"c","multiselect":["a","b"],"htmlContent":"<p>x</p>","vocals":false,"title":"T"}"#;
        let parsed: GenerationRequest = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.html_content, "<p>x</p>");
        assert_eq!(parsed.multiselect, ["a", "b"]);
        assert!(!parsed.vocals);
    }

    #[test]
    fn request_rejects_missing_or_mistyped_fields() {
        let missing = r#"{"custom":"c","multiselect":[],"htmlContent":"","title":"T"}"#;
        assert!(serde_json::from_str::<GenerationRequest>(missing).is_err());

        let mistyped = r#"{"custom":"c","multiselect":[],"htmlContent":"","vocals":"yes","title":"T"}"#;
        assert!(serde_json::from_str::<GenerationRequest>(mistyped).is_err());
    }

    #[test]
    fn params_serialize_to_generation_body() {
        let params = GenerationParams {
            prompt: "p".to_string(),
            tags: "t".to_string(),
            title: "T".to_string(),
            make_instrumental: true,
            wait_audio: true,
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({
                "prompt": "p",
                "tags": "t",
                "title": "T",
                "make_instrumental": true,
                "wait_audio": true,
            })
        );
    }

    #[test]
    fn derived_prompt_displays_as_json() {
        let derived = DerivedPrompt {
            prompt: "p".to_string(),
            tags: "t".to_string(),
        };
        assert_eq!(derived.to_string(), r#"{"prompt":"p","tags":"t"}"#);
    }
}
