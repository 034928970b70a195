//! Startup health check for the roster, the embedder and the resolver.

use crate::directory::{check_integrity, Directory};
use crate::embedding::Embedder;
use crate::resolver::{bounded, DirectoryResolver, ResolverSettings};
use chrono::Local;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

const PROBE_TEXT: &str = "Health Check";

/// Ordered so that the worst status compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Pass,
    Warn,
    Fail,
}

impl HealthStatus {
    fn icon(self) -> &'static str {
        match self {
            HealthStatus::Pass => "✅",
            HealthStatus::Warn => "⚠️",
            HealthStatus::Fail => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckResult {
    fn new(name: &str, status: HealthStatus, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), status, message: message.into(), details: Vec::new() }
    }

    fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub timestamp: String,
    pub overall_status: HealthStatus,
    pub checks: Vec<CheckResult>,
    pub summary: String,
}

impl HealthReport {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        let overall_status = checks.iter().map(|c| c.status).max().unwrap_or(HealthStatus::Pass);
        let count = |s: HealthStatus| checks.iter().filter(|c| c.status == s).count();
        let summary = format!(
            "{} passed, {} warning(s), {} failed",
            count(HealthStatus::Pass),
            count(HealthStatus::Warn),
            count(HealthStatus::Fail)
        );
        Self { timestamp: Local::now().to_rfc3339(), overall_status, checks, summary }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status != HealthStatus::Fail
    }

    pub fn print(&self) {
        println!("Health check ({})", self.timestamp);
        for check in &self.checks {
            println!("{} {}: {}", check.status.icon(), check.name, check.message);
            for detail in &check.details {
                println!("     - {}", detail);
            }
        }
        println!("{} Overall: {:?} ({})", self.overall_status.icon(), self.overall_status, self.summary);
    }
}

pub struct HealthChecker {
    directory: Directory,
    embedder: Arc<dyn Embedder>,
    settings: ResolverSettings,
}

impl HealthChecker {
    pub fn new(directory: Directory, embedder: Arc<dyn Embedder>, settings: ResolverSettings) -> Self {
        Self { directory, embedder, settings }
    }

    pub async fn run(&self) -> HealthReport {
        let checks = vec![
            self.check_roster(),
            self.check_embedder().await,
            self.check_resolver().await,
        ];
        let report = HealthReport::from_checks(checks);
        match report.overall_status {
            HealthStatus::Pass => info!("Health check passed: {}", report.summary),
            _ => warn!("Health check {:?}: {}", report.overall_status, report.summary),
        }
        report
    }

    fn check_roster(&self) -> CheckResult {
        const NAME: &str = "roster";
        if self.directory.is_empty() {
            return CheckResult::new(NAME, HealthStatus::Fail, "roster is empty");
        }
        let report = check_integrity(&self.directory);
        if report.is_clean() {
            CheckResult::new(NAME, HealthStatus::Pass, format!("{} people loaded", report.total_people))
        } else {
            CheckResult::new(
                NAME,
                HealthStatus::Warn,
                format!("{} people loaded with integrity issues", report.total_people),
            )
            .with_details(report.issues())
        }
    }

    async fn check_embedder(&self) -> CheckResult {
        const NAME: &str = "embedder";
        let started = Instant::now();
        let vector = match bounded(self.settings.embed_timeout, self.embedder.embed(PROBE_TEXT)).await {
            Ok(v) => v,
            Err(e) => return CheckResult::new(NAME, HealthStatus::Fail, e.to_string()),
        };

        if vector.is_empty() || vector.iter().any(|x| !x.is_finite()) {
            return CheckResult::new(NAME, HealthStatus::Fail, "embedder returned an empty or non-finite vector");
        }
        if let Some(expected) = self.embedder.dimensions() {
            if expected != vector.len() {
                return CheckResult::new(
                    NAME,
                    HealthStatus::Fail,
                    format!("expected {} dimensions, got {}", expected, vector.len()),
                );
            }
        }
        CheckResult::new(
            NAME,
            HealthStatus::Pass,
            format!(
                "'{}' returned {} dimensions in {} ms",
                self.embedder.model_id(),
                vector.len(),
                started.elapsed().as_millis()
            ),
        )
    }

    async fn check_resolver(&self) -> CheckResult {
        const NAME: &str = "resolver";
        let resolver = match DirectoryResolver::load(
            self.directory.clone(),
            Arc::clone(&self.embedder),
            self.settings.clone(),
        )
        .await
        {
            Ok(r) => r,
            Err(e) => return CheckResult::new(NAME, HealthStatus::Fail, e.to_string()),
        };
        if resolver.directory().is_empty() {
            return CheckResult::new(NAME, HealthStatus::Fail, "nothing to resolve against");
        }

        let names: Vec<&str> = resolver.directory().people().iter().map(|p| p.full_name.as_str()).collect();
        let results = match resolver.resolve_batch(&names).await {
            Ok(r) => r,
            Err(e) => return CheckResult::new(NAME, HealthStatus::Fail, e.to_string()),
        };

        let misses: Vec<String> = resolver
            .directory()
            .people()
            .iter()
            .zip(&results)
            .filter(|(person, result)| result.confident_person().map(|p| p.id) != Some(person.id))
            .map(|(person, result)| format!("'{}' resolved as {:?}", person.full_name, result.status))
            .collect();

        if misses.is_empty() {
            CheckResult::new(NAME, HealthStatus::Pass, format!("all {} names resolve to themselves", names.len()))
        } else {
            CheckResult::new(
                NAME,
                HealthStatus::Warn,
                format!("{} of {} names do not resolve to themselves", misses.len(), names.len()),
            )
            .with_details(misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Person;
    use crate::embedding::NgramEmbedder;
    use crate::error::EmbeddingError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn checker(directory: Directory) -> HealthChecker {
        HealthChecker::new(directory, Arc::new(NgramEmbedder::default()), ResolverSettings::default())
    }

    #[tokio::test]
    async fn test_sample_roster_is_healthy() {
        let report = checker(Directory::sample()).run().await;
        assert!(report.is_healthy());
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.checks[1].status, HealthStatus::Pass);
        assert_eq!(report.checks[2].status, HealthStatus::Pass);
    }

    #[tokio::test]
    async fn test_empty_roster_fails() {
        let report = checker(Directory::default()).run().await;
        assert_eq!(report.overall_status, HealthStatus::Fail);
        assert_eq!(report.checks[0].status, HealthStatus::Fail);
    }

    #[tokio::test]
    async fn test_duplicate_names_warn() {
        let directory = Directory::from_people(vec![
            Person::new(1, "Ali Demir", "ali.demir@company.com.tr"),
            Person::new(2, "Ali Demir", "ali.demir2@company.com.tr"),
            Person::new(3, "Arda Orçun", "arda.orcun@company.com.tr"),
        ])
        .unwrap();
        let report = checker(directory).run().await;
        assert_eq!(report.overall_status, HealthStatus::Warn);
        assert_eq!(report.checks[0].status, HealthStatus::Warn);
        assert_eq!(report.checks[2].status, HealthStatus::Warn);
        assert_eq!(report.checks[2].details.len(), 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall_status"], "WARN");
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        fn model_id(&self) -> &str {
            crate::embedding::ngram::MODEL_ID
        }
        fn dimensions(&self) -> Option<usize> {
            Some(4)
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Request("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_broken_embedder_fails() {
        let checker = HealthChecker::new(Directory::sample(), Arc::new(BrokenEmbedder), ResolverSettings::default());
        let report = checker.run().await;
        assert_eq!(report.overall_status, HealthStatus::Fail);
        assert_eq!(report.checks[1].status, HealthStatus::Fail);
        assert!(report.checks[1].message.contains("connection refused"));
    }

    struct StalledEmbedder;

    #[async_trait]
    impl Embedder for StalledEmbedder {
        fn model_id(&self) -> &str {
            crate::embedding::ngram::MODEL_ID
        }
        fn dimensions(&self) -> Option<usize> {
            None
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(vec![1.0])
        }
    }

    #[tokio::test]
    async fn test_stalled_embedder_times_out() {
        let mut settings = ResolverSettings::default();
        settings.embed_timeout = Some(std::time::Duration::from_millis(20));
        let checker = HealthChecker::new(Directory::default(), Arc::new(StalledEmbedder), settings);
        let report = checker.run().await;
        assert_eq!(report.checks[1].status, HealthStatus::Fail);
        assert!(report.checks[1].message.contains("timed out"));
    }
}
