//! Prompt to keyword extraction

use crate::error::{LlomaxError, Result};

/// Split a prompt into comma-separated keywords.
///
/// Segments are trimmed and empty ones dropped; order and duplicates are
/// kept. A blank prompt is rejected before splitting.
pub fn extract_keywords(prompt: &str) -> Result<Vec<String>> {
    if prompt.trim().is_empty() {
        return Err(LlomaxError::InvalidPrompt);
    }

    Ok(prompt
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keyword() {
        assert_eq!(extract_keywords("jazz").unwrap(), vec!["jazz"]);
    }

    #[test]
    fn test_trims_and_preserves_order() {
        assert_eq!(
            extract_keywords(" jazz , musicians,1950s ").unwrap(),
            vec!["jazz", "musicians", "1950s"]
        );
    }

    #[test]
    fn test_drops_empty_segments() {
        assert_eq!(
            extract_keywords("jazz,,musicians,").unwrap(),
            vec!["jazz", "musicians"]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        assert_eq!(extract_keywords("jazz, jazz").unwrap(), vec!["jazz", "jazz"]);
    }

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(matches!(extract_keywords(""), Err(LlomaxError::InvalidPrompt)));
        assert!(matches!(extract_keywords("   "), Err(LlomaxError::InvalidPrompt)));
    }

    #[test]
    fn test_only_commas_yields_no_keywords() {
        assert!(extract_keywords(" , ,").unwrap().is_empty());
    }
}
