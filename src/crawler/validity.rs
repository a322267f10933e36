//! Content validity gate
//!
//! Distinguishes real article content from bot-challenge and block pages.
//! Used in two places: against solver output while clearing a challenge,
//! and against extracted text before a page is admitted.

/// Minimum content length after whitespace collapsing
const MIN_CONTENT_LENGTH: usize = 100;

/// Phrases that mark a challenge or block page
const INVALID_PHRASES: &[&str] = &[
    "verifying that you are not a robot",
    "verifying you are human. this may take a few seconds.",
    "verify you are human by completing the action below",
    "checking if the site connection is secure",
    "please wait while we verify",
    "please enable javascript",
    "access denied",
    "verifying you are human",
    "captcha verification",
];

/// Whether `content` looks like real page content rather than a
/// bot-challenge interstitial
///
/// The check is case-insensitive and whitespace-collapsed, so phrases
/// split across markup lines still match.
pub fn has_valid_content(content: &str) -> bool {
    let clean = content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if clean.len() < MIN_CONTENT_LENGTH {
        return false;
    }

    !INVALID_PHRASES.iter().any(|phrase| clean.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding() -> String {
        "real article words ".repeat(10)
    }

    #[test]
    fn test_accepts_normal_content() {
        assert!(has_valid_content(&padding()));
    }

    #[test]
    fn test_rejects_short_content() {
        assert!(!has_valid_content("too short"));
        assert!(!has_valid_content(""));
    }

    #[test]
    fn test_rejects_challenge_phrases() {
        let content = format!("{} Verifying you are human {}", padding(), padding());
        assert!(!has_valid_content(&content));
    }

    #[test]
    fn test_rejects_phrase_split_across_lines() {
        let content = format!("{}\nAccess\n   Denied\n{}", padding(), padding());
        assert!(!has_valid_content(&content));
    }

    #[test]
    fn test_case_insensitive() {
        let content = format!("{} CAPTCHA VERIFICATION {}", padding(), padding());
        assert!(!has_valid_content(&content));
    }
}
