//! Weather intent detection.
//!
//! A cheap heuristic that decides whether a turn is worth offering the
//! weather tool for. False positives and negatives are expected; callers
//! must cope with either.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Message, Role};

/// Terms that mark an utterance as weather-related (matched as lowercase
/// substrings).
pub const VOCABULARY: &[&str] = &[
    // general
    "weather",
    "forecast",
    "climate today",
    "outside today",
    // conditions
    "sunny",
    "sunshine",
    "cloud",
    "overcast",
    "rain",
    "drizzle",
    "shower",
    "snow",
    "sleet",
    "hail",
    "storm",
    "thunder",
    "lightning",
    "fog",
    "misty",
    "windy",
    "wind speed",
    "breeze",
    "gusts",
    "umbrella",
    // measurements
    "temperature",
    "humidity",
    "humid",
    "precipitation",
    "uv index",
    "air pressure",
    "barometric",
    "visibility",
    "dew point",
    "heat index",
    "wind chill",
    // units
    "celsius",
    "fahrenheit",
    "degrees",
    "°c",
    "°f",
    "mph",
    "km/h",
    "millibar",
];

/// Phrasal templates; each captures the place as `location`.
const TEMPLATE_PATTERNS: &[&str] = &[
    r"(?i)\bhow(?:['’]s| is) it(?: like)? (?:in|at) (?P<location>\p{L}[\p{L} .'-]*)",
    r"(?i)\bwhat(?:['’]s| is) it like (?:in|at) (?P<location>\p{L}[\p{L} .'-]*)",
    r"(?i)\bwhat(?:['’]s| is) the weather like (?:in|at) (?P<location>\p{L}[\p{L} .'-]*)",
    r"(?i)\bwhat(?:['’]s| is) the forecast (?:for|in) (?P<location>\p{L}[\p{L} .'-]*)",
    r"(?i)\bis it (?:hot|cold|warm|chilly|freezing) (?:in|at) (?P<location>\p{L}[\p{L} .'-]*)",
];

static TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TEMPLATE_PATTERNS
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                debug_assert!(false, "bad intent template {pattern:?}: {e}");
                tracing::error!(pattern, error = %e, "intent template disabled");
                None
            }
        })
        .collect()
});

/// Whether `text` looks like a weather question.
pub fn classify(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if let Some(term) = VOCABULARY.iter().find(|term| lowered.contains(*term)) {
        tracing::trace!(term, "weather keyword");
        return true;
    }

    if let Some(location) = template_location(text) {
        tracing::trace!(location, "weather template");
        return true;
    }

    false
}

/// Location captured by a phrasal template ("how's it in Paris"), if any.
pub fn template_location(text: &str) -> Option<&str> {
    TEMPLATES
        .iter()
        .find_map(|re| re.captures(text)?.name("location"))
        .map(|m| m.as_str().trim_end_matches(['.', ' ', '\'', '-']))
}

/// Classify the most recent user message; no user message means no signal.
pub fn classify_latest(history: &[Message]) -> bool {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .is_some_and(|m| classify(&m.content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vocabulary_term_matches() {
        for term in VOCABULARY {
            let utterance = format!("Tell me about the {term} please");
            assert!(classify(&utterance), "{utterance:?}");
            assert!(classify(&utterance.to_uppercase()), "{utterance:?} uppercased");
        }
    }

    #[test]
    fn every_template_compiles() {
        for pattern in TEMPLATE_PATTERNS {
            let re = Regex::new(pattern).unwrap();
            assert!(
                re.capture_names().flatten().any(|name| name == "location"),
                "{pattern:?} has no location group"
            );
        }
        assert_eq!(TEMPLATES.len(), TEMPLATE_PATTERNS.len());
    }

    #[test]
    fn weather_questions() {
        let cases = [
            "What's the weather in London today?",
            "Will it RAIN tomorrow?",
            "Is it going to snow in Oslo",
            "How humid is Singapore right now?",
            "What's the temperature in Madrid",
            "Do I need an umbrella?",
            "What's 20 degrees in fahrenheit?",
        ];
        for text in cases {
            assert!(classify(text), "{text:?}");
        }
    }

    #[test]
    fn location_templates() {
        let cases = [
            ("How's it in Paris?", "Paris"),
            ("how is it like in New York", "New York"),
            ("What’s it like in Lisbon", "Lisbon"),
            ("What is the forecast for Tokyo.", "Tokyo"),
            ("is it cold in Reykjavik", "Reykjavik"),
        ];
        for (text, location) in cases {
            assert!(classify(text), "{text:?}");
            assert_eq!(template_location(text), Some(location), "{text:?}");
        }
    }

    #[test]
    fn non_weather_questions() {
        let cases = [
            "What's 13 + 13?",
            "Who wrote Hamlet?",
            "Translate 'good morning' into Spanish",
            "What is the capital of Australia?",
            "How do I reverse a linked list?",
            "Tell me a joke about cats",
            "",
        ];
        for text in cases {
            assert!(!classify(text), "{text:?}");
            assert_eq!(template_location(text), None, "{text:?}");
        }
    }

    #[test]
    fn latest_user_message_decides() {
        let history = vec![
            Message::user("Will it rain in Leeds?"),
            Message::assistant("Probably."),
            Message::user("What's 13 + 13?"),
        ];
        assert!(!classify_latest(&history));

        let history = vec![
            Message::user("What's 13 + 13?"),
            Message::assistant("26, and the forecast is irrelevant."),
        ];
        assert!(!classify_latest(&history));
    }

    #[test]
    fn empty_history_is_no_signal() {
        assert!(!classify_latest(&[]));
    }
}
