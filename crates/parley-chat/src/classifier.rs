/// Single-method seam for toxicity classification so a real model could
/// replace the keyword matcher without touching the pipeline.
pub trait ToxicityClassifier: Send + Sync {
    /// Absent content is a normal case, not an error: it is never toxic.
    fn is_toxic(&self, text: Option<&str>) -> bool;
}

/// Keyword denylist matcher.
///
/// Matching is case-insensitive and substring-based, not tokenized:
/// "hateful" and "stupidity" are flagged. That is the intended (crude)
/// behavior, kept rather than fixed.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

/// Default denylist.
pub const DEFAULT_KEYWORDS: [&str; 5] = ["hate", "kill", "stupid", "idiot", "abuse"];

impl KeywordClassifier {
    /// Build a classifier from a keyword list. Keywords are lowercased up
    /// front; matching lowercases the input once per call.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

impl ToxicityClassifier for KeywordClassifier {
    fn is_toxic(&self, text: Option<&str>) -> bool {
        let Some(text) = text else {
            return false;
        };
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|word| lowered.contains(word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_any_case_combination() {
        let clf = KeywordClassifier::default();
        assert!(clf.is_toxic(Some("HATE")));
        assert!(clf.is_toxic(Some("Hate")));
        assert!(clf.is_toxic(Some("hAtE")));
        assert!(clf.is_toxic(Some("I will KiLl it")));
    }

    #[test]
    fn clean_text_passes() {
        let clf = KeywordClassifier::default();
        assert!(!clf.is_toxic(Some("Good morning")));
        assert!(!clf.is_toxic(Some("see you at lunch")));
    }

    #[test]
    fn absent_or_empty_is_not_toxic() {
        let clf = KeywordClassifier::default();
        assert!(!clf.is_toxic(None));
        assert!(!clf.is_toxic(Some("")));
    }

    #[test]
    fn substring_semantics_flag_embedded_keywords() {
        let clf = KeywordClassifier::default();
        // Not whole-word matching: embedded keywords count, including the
        // classic false positive "whatever" (w-hate-ver).
        assert!(clf.is_toxic(Some("hateful")));
        assert!(clf.is_toxic(Some("whatever")));
        assert!(clf.is_toxic(Some("such stupidity")));
        assert!(clf.is_toxic(Some("no abuse, please")));
    }

    #[test]
    fn keyword_position_does_not_matter() {
        let clf = KeywordClassifier::default();
        assert!(clf.is_toxic(Some("kill the lights")));
        assert!(clf.is_toxic(Some("the lights, kill")));
        assert!(clf.is_toxic(Some("(idiot)")));
    }

    #[test]
    fn custom_keyword_list() {
        let clf = KeywordClassifier::new(["SPAM"]);
        assert!(clf.is_toxic(Some("this is spam")));
        assert!(clf.is_toxic(Some("spammy")));
        // Default list no longer applies with a custom list.
        assert!(!clf.is_toxic(Some("I hate mondays")));
        assert!(!clf.is_toxic(Some("ham")));
    }
}
