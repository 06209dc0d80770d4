//! Canonical relative paths of the shape
//! `language/intent/variationId/voiceId.wav`. The canonical path is the
//! artifact's identity: two artifacts with the same four-tuple map to the
//! same key, and a later write overwrites the earlier one.

use super::error::PathError;

/// Sanitize a single path component: lower-case, replace anything outside
/// `[a-z0-9_-]` with `-`, trim leading/trailing `-`.
pub fn sanitize_component(component: &str) -> String {
    let pattern = regex::Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    pattern
        .replace_all(component, "-")
        .to_lowercase()
        .trim_matches('-')
        .to_string()
}

fn sanitized(name: &'static str, component: &str) -> Result<String, PathError> {
    let clean = sanitize_component(component);
    if clean.is_empty() {
        return Err(PathError::InvalidComponent {
            name,
            original: component.to_string(),
        });
    }
    Ok(clean)
}

/// Build the canonical relative path for an artifact. Deterministic:
/// identical inputs always yield identical output.
pub fn canonical_path(
    language: &str,
    intent: &str,
    variation_id: &str,
    voice_id: &str,
) -> Result<String, PathError> {
    let language = sanitized("language", language)?;
    let intent = sanitized("intent", intent)?;
    let variation = sanitized("variation_id", variation_id)?;
    let voice = sanitized("voice_id", voice_id)?;

    Ok(format!("{language}/{intent}/{variation}/{voice}.wav"))
}

/// Check that a relative path already has the canonical four-component shape.
pub fn is_canonical(path: &str) -> bool {
    let pattern =
        regex::Regex::new(r"^[a-z0-9_-]+/[a-z0-9_-]+/[a-z0-9_-]+/[a-z0-9_-]+\.wav$").unwrap();
    pattern.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_replaces_invalid_characters() {
        assert_eq!(sanitize_component("Turn on the lights!"), "turn-on-the-lights");
        assert_eq!(sanitize_component("LIGHTS_ON"), "lights_on");
        assert_eq!(sanitize_component("Chae-Won"), "chae-won");
    }

    #[test]
    fn test_sanitize_trims_hyphens() {
        assert_eq!(sanitize_component("!!hello!!"), "hello");
        assert_eq!(sanitize_component("--a--"), "a");
    }

    #[test]
    fn test_canonical_path_shape() {
        let path = canonical_path("english", "LIGHTS_ON", "turn on the lights", "Matt").unwrap();
        assert_eq!(path, "english/lights_on/turn-on-the-lights/matt.wav");
        assert!(is_canonical(&path));
    }

    #[test]
    fn test_canonical_path_is_deterministic() {
        let a = canonical_path("Korean", "VOLUME_UP", "volume up please", "Seo-Yeon").unwrap();
        let b = canonical_path("Korean", "VOLUME_UP", "volume up please", "Seo-Yeon").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_path_rejects_empty_component() {
        let err = canonical_path("english", "!!!", "variation", "matt").unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidComponent { name: "intent", .. }
        ));
    }

    #[test]
    fn test_is_canonical_rejects_other_shapes() {
        assert!(!is_canonical("english/lights_on/matt.wav"));
        assert!(!is_canonical("english/lights_on/x/matt.mp3"));
        assert!(!is_canonical("English/lights_on/x/matt.wav"));
        assert!(!is_canonical("english/lights_on/x/y/matt.wav"));
    }
}
