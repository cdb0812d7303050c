use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const SQL_KEYWORDS: [&str; 8] = [
    "select", "insert", "update", "delete", "create", "alter", "drop", "use",
];

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:sql)?[ \t]*\n?(.*?)```").expect("fenced block pattern")
});

/// Which tier of the extraction fallback produced the statement. Exposed so
/// callers can log how much the model's formatting could be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    FencedBlock,
    HeuristicLineMatch,
    FallbackCleanup,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::FencedBlock => "fenced_block",
            ExtractionMethod::HeuristicLineMatch => "heuristic_line_match",
            ExtractionMethod::FallbackCleanup => "fallback_cleanup",
        }
    }
}

/// A single SQL statement pulled out of raw model output. Immutable after
/// creation. `extracted_statement` is lower-cased with internal whitespace
/// collapsed, and is only ever empty under `FallbackCleanup`.
#[derive(Debug, Clone)]
pub struct SqlCandidate {
    pub raw_model_output: String,
    pub extracted_statement: String,
    pub extraction_method: ExtractionMethod,
}

impl SqlCandidate {
    /// Three-tier extraction, each tier attempted only when the previous one
    /// fails: a fenced code block, then the first line carrying a SQL
    /// keyword, then a best-effort cleanup of the whole output.
    pub fn extract(raw: &str) -> Self {
        if let Some(statement) = extract_fenced_block(raw) {
            return Self {
                raw_model_output: raw.to_string(),
                extracted_statement: statement,
                extraction_method: ExtractionMethod::FencedBlock,
            };
        }

        if let Some(statement) = extract_keyword_line(raw) {
            return Self {
                raw_model_output: raw.to_string(),
                extracted_statement: statement,
                extraction_method: ExtractionMethod::HeuristicLineMatch,
            };
        }

        let stripped = FENCED_BLOCK.replace_all(raw, " ");
        Self {
            raw_model_output: raw.to_string(),
            extracted_statement: normalize(&stripped),
            extraction_method: ExtractionMethod::FallbackCleanup,
        }
    }

    /// Whether the statement opens with a recognized SQL keyword. Under
    /// `FallbackCleanup` a candidate failing this check is a synthesis
    /// failure and must never reach execution.
    pub fn parses_as_sql(&self) -> bool {
        self.extracted_statement
            .split_whitespace()
            .next()
            .map(|token| SQL_KEYWORDS.contains(&token))
            .unwrap_or(false)
    }

    pub fn is_extraction_failure(&self) -> bool {
        self.extraction_method == ExtractionMethod::FallbackCleanup && !self.parses_as_sql()
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn extract_fenced_block(raw: &str) -> Option<String> {
    let captures = FENCED_BLOCK.captures(raw)?;
    let statement = normalize(captures.get(1)?.as_str());
    if statement.is_empty() {
        return None;
    }
    Some(statement)
}

/// Scans line by line for the first line containing a SQL keyword as a word,
/// and takes the line from that keyword onward. Tolerates conversational
/// prefixes like "Here: SELECT ...". `use` only counts as the leading token
/// of a line; mid-line it is almost always prose ("please use ...").
fn extract_keyword_line(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let mut offset = 0;
        for (index, token) in line.split_whitespace().enumerate() {
            let position = line[offset..].find(token).map(|i| i + offset)?;
            let lowered = token.to_lowercase();
            if SQL_KEYWORDS.contains(&lowered.as_str()) && (index == 0 || lowered != "use") {
                return Some(normalize(&line[position..]));
            }
            offset = position + token.len();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_sql_block_is_extracted_and_normalized() {
        let candidate = SqlCandidate::extract("Sure! ```sql\nSELECT * FROM users;\n```");

        assert_eq!(candidate.extracted_statement, "select * from users;");
        assert_eq!(candidate.extraction_method, ExtractionMethod::FencedBlock);
    }

    #[test]
    fn unlabeled_fence_is_accepted() {
        let candidate = SqlCandidate::extract("```\nSELECT 1\n```");

        assert_eq!(candidate.extracted_statement, "select 1");
        assert_eq!(candidate.extraction_method, ExtractionMethod::FencedBlock);
    }

    #[test]
    fn bare_keyword_line_falls_back_to_heuristic_match() {
        let candidate = SqlCandidate::extract("Here: SELECT id FROM orders");

        assert_eq!(candidate.extracted_statement, "select id from orders");
        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::HeuristicLineMatch
        );
    }

    #[test]
    fn fenced_block_takes_priority_over_keyword_line() {
        let raw = "SELECT wrong FROM place\n```sql\nSELECT right FROM place\n```";
        let candidate = SqlCandidate::extract(raw);

        assert_eq!(candidate.extracted_statement, "select right from place");
        assert_eq!(candidate.extraction_method, ExtractionMethod::FencedBlock);
    }

    #[test]
    fn empty_fence_falls_through_to_next_tier() {
        let candidate = SqlCandidate::extract("```sql\n```\nUPDATE t SET x = 1");

        assert_eq!(candidate.extracted_statement, "update t set x = 1");
        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::HeuristicLineMatch
        );
    }

    #[test]
    fn prose_use_mid_line_is_not_mistaken_for_a_statement() {
        let candidate = SqlCandidate::extract("Please use a different question.");

        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::FallbackCleanup
        );
        assert!(candidate.is_extraction_failure());
    }

    #[test]
    fn leading_use_statement_still_matches() {
        let candidate = SqlCandidate::extract("USE analytics;");

        assert_eq!(candidate.extracted_statement, "use analytics;");
        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::HeuristicLineMatch
        );
    }

    #[test]
    fn non_sql_output_is_tagged_fallback_and_flagged_as_failure() {
        let candidate = SqlCandidate::extract("I am sorry, I cannot help with that.");

        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::FallbackCleanup
        );
        assert!(!candidate.parses_as_sql());
        assert!(candidate.is_extraction_failure());
    }

    #[test]
    fn extraction_is_idempotent_on_clean_statements() {
        let first = SqlCandidate::extract("select id from orders");
        let second = SqlCandidate::extract(&first.extracted_statement);

        assert_eq!(first.extracted_statement, second.extracted_statement);
    }

    #[test]
    fn fallback_strips_fences_from_remaining_text() {
        // Fence content is whitespace only, keyword tier finds nothing.
        let candidate = SqlCandidate::extract("nothing useful ```sql\n   \n``` here");

        assert_eq!(candidate.extracted_statement, "nothing useful here");
        assert_eq!(
            candidate.extraction_method,
            ExtractionMethod::FallbackCleanup
        );
    }
}
