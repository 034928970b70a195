//! Clarification dialogue support.
//!
//! Turns resolver output into what the dialogue needs: a JSON summary of
//! resolved and unresolved names, a numbered prompt asking the user to pick
//! between ambiguous candidates, and parsing of the user's answer.

use crate::directory::Person;
use crate::embedding::normalize::normalize_name;
use crate::error::ClarificationError;
use crate::resolver::{MatchResult, MatchStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write;

static CHOICE_NUMBER_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^#?(\d{1,3})[.)]?$").ok());

const SKIP_WORDS: &[&str] = &["none", "skip", "neither", "hicbiri"];

/// A person with a similarity rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPerson {
    pub id: i64,
    pub full_name: String,
    pub email_address: String,
    pub similarity: f32,
}

impl ScoredPerson {
    fn new(person: &Person, score: f32) -> Self {
        Self {
            id: person.id,
            full_name: person.full_name.clone(),
            email_address: person.email_address.clone(),
            similarity: (score * 1000.0).round() / 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedName {
    pub input_name: String,
    pub matched_user: ScoredPerson,
    pub similarity_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialMatch {
    pub input_name: String,
    pub candidates: Vec<ScoredPerson>,
}

/// Batch view of resolution results for the dialogue orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub resolved_names: Vec<ResolvedName>,
    pub partial_matches: Vec<PartialMatch>,
    /// Every name that was not resolved confidently, ambiguous or not found.
    pub ambiguous_names: Vec<String>,
    pub needs_clarification: bool,
}

impl ResolutionSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                MatchStatus::ConfidentMatch => {
                    if let Some(best) = result.candidates.first() {
                        let matched_user = ScoredPerson::new(&best.person, best.score);
                        summary.resolved_names.push(ResolvedName {
                            input_name: result.query_name.clone(),
                            similarity_score: matched_user.similarity,
                            matched_user,
                        });
                    }
                }
                MatchStatus::Ambiguous => {
                    summary.partial_matches.push(PartialMatch {
                        input_name: result.query_name.clone(),
                        candidates: result
                            .candidates
                            .iter()
                            .map(|c| ScoredPerson::new(&c.person, c.score))
                            .collect(),
                    });
                    summary.ambiguous_names.push(result.query_name.clone());
                }
                MatchStatus::NoMatch => summary.ambiguous_names.push(result.query_name.clone()),
            }
        }
        summary.needs_clarification = !summary.ambiguous_names.is_empty();
        summary
    }
}

/// One name the user has to clarify. `options` is empty when nobody matched.
#[derive(Debug, Clone, PartialEq)]
pub struct ClarificationItem {
    pub query_name: String,
    pub options: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClarificationRequest {
    pub items: Vec<ClarificationItem>,
}

impl ClarificationRequest {
    /// Collect every result that is not a confident match; `None` when all are.
    pub fn from_results(results: &[MatchResult]) -> Option<Self> {
        let items: Vec<ClarificationItem> = results
            .iter()
            .filter(|r| r.needs_clarification())
            .map(|r| ClarificationItem {
                query_name: r.query_name.clone(),
                options: r.candidates.iter().map(|c| c.person.clone()).collect(),
            })
            .collect();
        if items.is_empty() { None } else { Some(Self { items }) }
    }

    /// Numbered prompt text, one block per unclear name.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if item.options.is_empty() {
                let _ = writeln!(
                    out,
                    "I could not find anyone named \"{}\" in the directory. Please try a different name.",
                    item.query_name
                );
                continue;
            }
            let _ = writeln!(
                out,
                "I found more than one person for \"{}\". Which one did you mean?",
                item.query_name
            );
            for (i, person) in item.options.iter().enumerate() {
                let _ = writeln!(out, "  {}. {} <{}>", i + 1, person.full_name, person.email_address);
            }
        }
        out
    }
}

/// The user's answer to one clarification item.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Person(Person),
    Skip,
}

/// Interpret an answer: a 1-based number, a name, or a skip word.
///
/// A name matches when it equals an option's full name after normalisation, or
/// when its tokens appear in exactly one option's name ("Demir" picks
/// "Ali Demir" out of Ali Şahin / Ali Demir).
pub fn parse_choice(input: &str, options: &[Person]) -> Result<Choice, ClarificationError> {
    let answer = input.trim();
    if answer.is_empty() {
        return Err(ClarificationError::Empty);
    }

    let normalized = normalize_name(answer);
    if SKIP_WORDS.contains(&normalized.as_str()) {
        return Ok(Choice::Skip);
    }

    if let Some(caps) = CHOICE_NUMBER_RE.as_ref().and_then(|re| re.captures(answer)) {
        let choice: usize = caps[1].parse().unwrap_or(0);
        return match choice.checked_sub(1).and_then(|i| options.get(i)) {
            Some(person) => Ok(Choice::Person(person.clone())),
            None => Err(ClarificationError::OutOfRange { choice, max: options.len() }),
        };
    }

    if let Some(person) = options.iter().find(|p| normalize_name(&p.full_name) == normalized) {
        return Ok(Choice::Person(person.clone()));
    }

    let wanted: Vec<&str> = normalized.split(' ').collect();
    let partial: Vec<&Person> = options
        .iter()
        .filter(|p| {
            let name = normalize_name(&p.full_name);
            let tokens: Vec<&str> = name.split(' ').collect();
            wanted.iter().all(|w| tokens.contains(w))
        })
        .collect();
    match partial.as_slice() {
        [person] => Ok(Choice::Person((*person).clone())),
        _ => Err(ClarificationError::Unrecognized(answer.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Candidate;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn options() -> Vec<Person> {
        vec![
            Person::new(4, "Ali Şahin", "ali.sahin@company.com.tr"),
            Person::new(5, "Ali Demir", "ali.demir@company.com.tr"),
            Person::new(6, "Ali Can Yılmaz", "alican.yilmaz@company.com.tr"),
        ]
    }

    fn results() -> Vec<MatchResult> {
        let opts = options();
        vec![
            MatchResult {
                query_name: "Arda".into(),
                status: MatchStatus::ConfidentMatch,
                candidates: vec![Candidate {
                    person: Person::new(10, "Arda Orçun", "arda.orcun@company.com.tr"),
                    score: 0.99987,
                }],
            },
            MatchResult {
                query_name: "Ali".into(),
                status: MatchStatus::Ambiguous,
                candidates: opts.into_iter().map(|person| Candidate { person, score: 1.0 }).collect(),
            },
            MatchResult { query_name: "Zzyyxx".into(), status: MatchStatus::NoMatch, candidates: vec![] },
        ]
    }

    #[test]
    fn test_summary() {
        let summary = ResolutionSummary::from_results(&results());
        assert_eq!(summary.resolved_names.len(), 1);
        assert_eq!(summary.resolved_names[0].matched_user.id, 10);
        assert_eq!(summary.resolved_names[0].similarity_score, 1.0);
        assert_eq!(summary.partial_matches[0].candidates.len(), 3);
        assert_eq!(summary.ambiguous_names, vec!["Ali".to_string(), "Zzyyxx".to_string()]);
        assert!(summary.needs_clarification);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["partial_matches"][0]["input_name"], "Ali");
        assert_eq!(json["needs_clarification"], true);
    }

    #[test]
    fn test_summary_all_resolved() {
        let summary = ResolutionSummary::from_results(&results()[..1]);
        assert!(!summary.needs_clarification);
        assert!(ClarificationRequest::from_results(&results()[..1]).is_none());
    }

    #[test]
    fn test_render() {
        let request = ClarificationRequest::from_results(&results()).unwrap();
        assert_eq!(request.items.len(), 2);
        let text = request.render();
        assert!(text.contains("more than one person for \"Ali\""));
        assert!(text.contains("  2. Ali Demir <ali.demir@company.com.tr>"));
        assert!(text.contains("could not find anyone named \"Zzyyxx\""));
    }

    #[test_case("2", 5 ; "number")]
    #[test_case(" #3 ", 6 ; "hash number")]
    #[test_case("1.", 4 ; "number with dot")]
    #[test_case("ali sahin", 4 ; "folded full name")]
    #[test_case("Demir", 5 ; "unique token")]
    #[test_case("Can", 6 ; "middle name")]
    fn test_parse_choice(input: &str, expected_id: i64) {
        match parse_choice(input, &options()) {
            Ok(Choice::Person(person)) => assert_eq!(person.id, expected_id),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_choice_errors() {
        assert_eq!(parse_choice("", &options()), Err(ClarificationError::Empty));
        assert_eq!(
            parse_choice("7", &options()),
            Err(ClarificationError::OutOfRange { choice: 7, max: 3 })
        );
        assert_eq!(
            parse_choice("0", &options()),
            Err(ClarificationError::OutOfRange { choice: 0, max: 3 })
        );
        // "Ali" fits every option
        assert!(matches!(parse_choice("Ali", &options()), Err(ClarificationError::Unrecognized(_))));
        assert_eq!(parse_choice("None", &options()), Ok(Choice::Skip));
        assert_eq!(parse_choice("Hiçbiri", &options()), Ok(Choice::Skip));
    }
}
