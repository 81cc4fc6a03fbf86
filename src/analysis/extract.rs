//! Post-processing of generated text: action items, categories,
//! cross-domain insights and lenient JSON extraction.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use crate::todos::model::{Category, MAX_TASK_CHARS};

/// Max action items taken from one analysis.
pub const MAX_ACTION_ITEMS: usize = 10;

/// Candidates this short are noise.
const MIN_TASK_CHARS: usize = 10;

const MAX_INSIGHT_LINES: usize = 5;

/// Keyword lists checked in order; the first hit decides the category.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Health,
        &["health", "exercise", "sleep", "medicine", "meditation", "nutrition", "water", "stretch"],
    ),
    (
        Category::Finance,
        &["finance", "budget", "money", "spend", "save", "expense", "bill", "investment"],
    ),
    (
        Category::Study,
        &["study", "learn", "exam", "assignment", "read", "review", "practice", "flashcard"],
    ),
    (
        Category::Personal,
        &["plan", "schedule", "organize", "coordinate"],
    ),
];

/// Line-oriented action item extractor.
pub struct ActionExtractor {
    patterns: Vec<Regex>,
    emphasis: Regex,
}

impl Default for ActionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExtractor {
    pub fn new() -> Self {
        let patterns = [
            // Bullets
            r"^\s*[-*•]\s+(.+)$",
            // Numbered lists: "1." or "1)"
            r"^\s*\d+[.)]\s+(.+)$",
            // Explicit prefixes
            r"(?i)^\s*(?:\*\*)?(?:action|task|do)(?:\*\*)?\s*:\s*(?:\*\*)?\s*(.+)$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static action pattern"))
        .collect();

        Self {
            patterns,
            emphasis: Regex::new(r"\*\*|__|`").expect("static emphasis pattern"),
        }
    }

    /// Pull up to ten candidate tasks out of `text`, in document order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for line in text.lines() {
            let Some(raw) = self
                .patterns
                .iter()
                .find_map(|re| re.captures(line).and_then(|c| c.get(1)))
            else {
                continue;
            };

            let cleaned = self.emphasis.replace_all(raw.as_str(), "");
            let cleaned = cleaned.trim();
            if cleaned.chars().count() <= MIN_TASK_CHARS || cleaned.starts_with("http") {
                continue;
            }

            let task = truncate_chars(cleaned, MAX_TASK_CHARS);
            if seen.insert(task.clone()) {
                out.push(task);
                if out.len() == MAX_ACTION_ITEMS {
                    break;
                }
            }
        }
        out
    }
}

/// Shorthand for a one-off extraction.
pub fn extract_action_items(text: &str) -> Vec<String> {
    ActionExtractor::new().extract(text)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Keyword classification of a task.
pub fn classify(task: &str) -> Category {
    let lower = task.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Lines of the coordination text that tie domains together.
///
/// Falls back to the first paragraph when no line qualifies.
pub fn cross_domain_insights(coordination: &str) -> String {
    const CONNECTIVES: &[&str] = &[
        "cross-domain",
        "because",
        "therefore",
        "since",
        "thus",
        "consequently",
    ];

    let lines: Vec<&str> = coordination
        .lines()
        .filter(|line| {
            let l = line.to_lowercase();
            CONNECTIVES.iter().any(|k| l.contains(k))
                || (l.contains("stress") && (l.contains("study") || l.contains("finance")))
                || (l.contains("budget") && (l.contains("health") || l.contains("study")))
        })
        .take(MAX_INSIGHT_LINES)
        .collect();

    if !lines.is_empty() {
        return lines.join("\n");
    }

    coordination
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(String::from)
        .unwrap_or_else(|| "Cross-domain insights integrated into the plan.".to_string())
}

/// Extract a JSON object from model output.
///
/// Tries a ```json fence, then any fence, then the outermost braces.
/// Anything unparseable comes back as `{"raw_output": text}`.
pub fn parse_structured_output(text: &str) -> Value {
    let candidate = if let Some(rest) = text.split_once("```json").map(|(_, r)| r) {
        rest.split("```").next().map(str::trim)
    } else if let Some(rest) = text.split_once("```").map(|(_, r)| r) {
        rest.split("```").next().map(|s| {
            let s = s.trim();
            s.strip_prefix("json").map(str::trim).unwrap_or(s)
        })
    } else {
        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
            _ => None,
        }
    };

    candidate
        .and_then(|c| serde_json::from_str::<Value>(c).ok())
        .unwrap_or_else(|| serde_json::json!({ "raw_output": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_bullets_numbers_and_prefixes() {
        let text = "## Plan\n\
                    - Take a 20 minute walk after lunch\n\
                    2) Review lecture notes every evening\n\
                    Action: **Set up an automatic savings transfer**\n\
                    just prose that is not a list item at all\n\
                    • Drink two litres of water daily";
        let items = extract_action_items(text);
        assert_eq!(
            items,
            vec![
                "Take a 20 minute walk after lunch",
                "Review lecture notes every evening",
                "Set up an automatic savings transfer",
                "Drink two litres of water daily",
            ]
        );
    }

    #[test]
    fn drops_short_urls_and_duplicates() {
        let text = "- Sleep\n\
                    - https://example.com/some/long/resource\n\
                    - Stretch for ten minutes\n\
                    - Stretch for ten minutes";
        assert_eq!(extract_action_items(text), vec!["Stretch for ten minutes"]);
    }

    #[test]
    fn caps_count_and_length() {
        let long = "x".repeat(500);
        let mut text = format!("- {long}\n");
        for i in 0..20 {
            text.push_str(&format!("{}. Distinct task number {i}\n", i + 1));
        }
        let items = extract_action_items(&text);
        assert_eq!(items.len(), MAX_ACTION_ITEMS);
        assert_eq!(items[0].chars().count(), MAX_TASK_CHARS);
        assert!(items.iter().all(|i| i.chars().count() <= MAX_TASK_CHARS));
        assert!(items.iter().all(|i| !i.starts_with("http")));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = format!("- {}", "é".repeat(300));
        let items = extract_action_items(&text);
        assert_eq!(items[0].chars().count(), MAX_TASK_CHARS);
    }

    #[test]
    fn no_matches_is_empty() {
        assert!(extract_action_items("Nothing to see here.").is_empty());
        assert!(extract_action_items("").is_empty());
    }

    #[test]
    fn classification_order_and_default() {
        assert_eq!(classify("track finance spending"), Category::Finance);
        assert_eq!(classify("Sleep before 11pm"), Category::Health);
        // Health wins over Finance when both match.
        assert_eq!(classify("Budget for a gym membership to exercise"), Category::Health);
        assert_eq!(classify("Practice past exam papers"), Category::Study);
        assert_eq!(classify("Organize the desk drawer"), Category::Personal);
        assert_eq!(classify("Call grandma on Sunday"), Category::General);
    }

    #[test]
    fn insights_pick_connective_lines() {
        let text = "Intro line\n\
                    Sleep more because memory consolidates overnight\n\
                    Keep stress low during study weeks\n\
                    Unrelated line";
        assert_eq!(
            cross_domain_insights(text),
            "Sleep more because memory consolidates overnight\nKeep stress low during study weeks"
        );
    }

    #[test]
    fn insights_cap_at_five_lines() {
        let text = (0..8)
            .map(|i| format!("Line {i} because reasons"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(cross_domain_insights(&text).lines().count(), 5);
    }

    #[test]
    fn insights_fall_back_to_first_paragraph() {
        let text = "First paragraph here.\nStill first.\n\nSecond paragraph.";
        assert_eq!(
            cross_domain_insights(text),
            "First paragraph here.\nStill first."
        );
    }

    #[test]
    fn structured_output_from_fences_and_braces() {
        let fenced = "Report:\n```json\n{\"overall_score\": 90}\n```\nDone";
        assert_eq!(parse_structured_output(fenced)["overall_score"], 90);

        let plain = "```\njson\n{\"a\": 1}\n```";
        assert_eq!(parse_structured_output(plain)["a"], 1);

        let braces = "prefix {\"b\": true} suffix";
        assert_eq!(parse_structured_output(braces)["b"], true);
    }

    #[test]
    fn structured_output_falls_back_to_raw() {
        let v = parse_structured_output("no json here");
        assert_eq!(v["raw_output"], "no json here");
        let v = parse_structured_output("{ broken");
        assert_eq!(v["raw_output"], "{ broken");
    }
}
