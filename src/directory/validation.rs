//! Roster integrity checks.
//
// Integrity issues are reported, not rejected: a roster with a duplicate
// e-mail is still usable for resolution.

use super::Directory;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]{1,64}@(?:[A-Za-z0-9-]{1,63}\.){1,125}[A-Za-z]{2,63}$").ok()
});

/// Validate an e-mail address
pub fn validate_email(email: &str) -> bool {
    match EMAIL_RE.as_ref() {
        Some(re) => re.is_match(email),
        None => false,
    }
}

/// Integrity findings for a directory.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct IntegrityReport {
    pub total_people: usize,
    pub duplicate_emails: Vec<String>,
    pub duplicate_names: Vec<String>,
    pub empty_names: Vec<i64>,
    pub empty_emails: Vec<i64>,
    pub invalid_emails: Vec<i64>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues().is_empty()
    }

    /// Human-readable issue list, one entry per kind of problem found.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.duplicate_emails.is_empty() {
            issues.push(format!("{} duplicate emails", self.duplicate_emails.len()));
        }
        if !self.duplicate_names.is_empty() {
            issues.push(format!("{} duplicate names", self.duplicate_names.len()));
        }
        if !self.empty_emails.is_empty() {
            issues.push(format!("{} empty emails", self.empty_emails.len()));
        }
        if !self.invalid_emails.is_empty() {
            issues.push(format!("{} invalid emails", self.invalid_emails.len()));
        }
        if !self.empty_names.is_empty() {
            issues.push(format!("{} empty names", self.empty_names.len()));
        }
        issues
    }
}

pub fn check_integrity(directory: &Directory) -> IntegrityReport {
    let mut report = IntegrityReport { total_people: directory.len(), ..Default::default() };
    let mut emails: HashMap<String, usize> = HashMap::new();
    let mut names: HashMap<String, usize> = HashMap::new();

    for person in directory.people() {
        let name = person.full_name.trim();
        let email = person.email_address.trim();

        if name.is_empty() {
            report.empty_names.push(person.id);
        } else {
            *names.entry(name.to_string()).or_default() += 1;
        }

        if email.is_empty() {
            report.empty_emails.push(person.id);
        } else {
            if !validate_email(email) {
                report.invalid_emails.push(person.id);
            }
            *emails.entry(email.to_lowercase()).or_default() += 1;
        }
    }

    report.duplicate_emails = duplicates(emails);
    report.duplicate_names = duplicates(names);
    report
}

fn duplicates(counts: HashMap<String, usize>) -> Vec<String> {
    let mut dups: Vec<String> =
        counts.into_iter().filter(|(_, count)| *count > 1).map(|(key, _)| key).collect();
    dups.sort();
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Person;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ali.sahin@company.com.tr"));
        assert!(validate_email("a.ozkan@company.com.tr"));
        assert!(!validate_email("ali.sahin"));
        assert!(!validate_email("ali sahin@company.com.tr"));
        assert!(!validate_email("@company.com"));
    }

    #[test]
    fn test_sample_roster_is_clean() {
        let report = check_integrity(&Directory::sample());
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues());
        assert_eq!(report.total_people, 27);
    }

    #[test]
    fn test_reports_every_issue_kind() {
        let directory = Directory::from_people(vec![
            Person::new(1, "Deniz Kaya", "deniz.kaya@company.com.tr"),
            Person::new(2, "Deniz Kaya", "DENIZ.KAYA@company.com.tr"),
            Person::new(3, "  ", "nobody@company.com.tr"),
            Person::new(4, "Selin Demir", ""),
            Person::new(5, "Burak Demir", "burak.demir"),
        ])
        .unwrap();

        let report = check_integrity(&directory);
        assert_eq!(report.duplicate_emails, vec!["deniz.kaya@company.com.tr".to_string()]);
        assert_eq!(report.duplicate_names, vec!["Deniz Kaya".to_string()]);
        assert_eq!(report.empty_names, vec![3]);
        assert_eq!(report.empty_emails, vec![4]);
        assert_eq!(report.invalid_emails, vec![5]);
        assert_eq!(report.issues().len(), 5);
    }
}
