//! Directory resolver.
//!
//! Maps a free-text attendee name to zero, one or several directory entries by
//! embedding similarity, and classifies the outcome as a confident match, an
//! ambiguous set that needs the user to pick, or no match.
//!
//! The resolver is immutable once [`DirectoryResolver::load`] returns, so it can
//! be shared across tasks (`Arc<DirectoryResolver>`) without locking.

mod index;
mod similarity;
mod types;

pub use index::name_aliases;
pub use similarity::cosine_similarity;
pub use types::{Candidate, MatchResult, MatchStatus};

use crate::config::Config;
use crate::directory::Directory;
use crate::embedding::normalize::normalize_name;
use crate::embedding::Embedder;
use crate::error::{EmbeddingError, ResolveError};
use futures::future::join_all;
use index::DirectoryIndex;
pub(crate) use index::bounded;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Classification parameters, fixed for the lifetime of a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Minimum similarity for any candidate to count.
    pub similarity_threshold: f32,
    /// Candidates within this distance of the top score are indistinguishable.
    pub ambiguity_margin: f32,
    /// Cap on candidates returned for an ambiguous result.
    pub max_candidates: usize,
    /// Model the directory must be embedded with.
    pub embedding_model: String,
    /// Also score first name, last name and e-mail local part per person.
    pub index_aliases: bool,
    /// Deadline for each embedder call.
    pub embed_timeout: Option<Duration>,
}

impl ResolverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            similarity_threshold: config.resolver.similarity_threshold,
            ambiguity_margin: config.resolver.ambiguity_margin,
            max_candidates: config.resolver.max_candidates,
            embedding_model: config.embedding.model.clone(),
            index_aliases: config.resolver.index_aliases,
            embed_timeout: config.resolver.embed_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ResolveError::InvalidSettings(format!(
                "similarity threshold {} is outside [-1, 1]",
                self.similarity_threshold
            )));
        }
        if !(0.0..=2.0).contains(&self.ambiguity_margin) {
            return Err(ResolveError::InvalidSettings(format!(
                "ambiguity margin {} is outside [0, 2]",
                self.ambiguity_margin
            )));
        }
        if self.max_candidates < 2 {
            return Err(ResolveError::InvalidSettings(
                "max_candidates must be at least 2 to report an ambiguous match".to_string(),
            ));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ResolveError::InvalidSettings("embedding model is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct DirectoryResolver {
    index: DirectoryIndex,
    embedder: Arc<dyn Embedder>,
    settings: ResolverSettings,
}

impl std::fmt::Debug for DirectoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryResolver")
            .field("people", &self.index.directory.len())
            .field("model", &self.embedder.model_id())
            .field("settings", &self.settings)
            .finish()
    }
}

impl DirectoryResolver {
    /// Embed the whole directory and return a ready resolver.
    ///
    /// An empty directory loads successfully; every later `resolve` call then
    /// fails with [`ResolveError::DirectoryUnavailable`].
    pub async fn load(
        directory: Directory,
        embedder: Arc<dyn Embedder>,
        settings: ResolverSettings,
    ) -> Result<Self, ResolveError> {
        settings.validate()?;
        if embedder.model_id() != settings.embedding_model {
            return Err(ResolveError::ModelMismatch {
                configured: settings.embedding_model.clone(),
                provided: embedder.model_id().to_string(),
            });
        }

        let index = DirectoryIndex::build(
            directory,
            embedder.as_ref(),
            settings.index_aliases,
            settings.embed_timeout,
        )
        .await?;
        info!(
            "Directory resolver ready: {} people, threshold {}, margin {}",
            index.directory.len(),
            settings.similarity_threshold,
            settings.ambiguity_margin
        );
        Ok(Self { index, embedder, settings })
    }

    pub fn directory(&self) -> &Directory {
        &self.index.directory
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    /// Resolve one attendee name.
    pub async fn resolve(&self, query: &str) -> Result<MatchResult, ResolveError> {
        if query.trim().is_empty() {
            return Err(ResolveError::InvalidQuery);
        }
        if self.index.is_empty() {
            return Err(ResolveError::DirectoryUnavailable);
        }

        let query_vec = bounded(self.settings.embed_timeout, self.embedder.embed(query)).await?;
        if let Some(expected) = self.index.dimensions {
            if query_vec.len() != expected {
                return Err(EmbeddingError::DimensionMismatch { expected, actual: query_vec.len() }.into());
            }
        }

        let normalized_query = normalize_name(query);
        let people = self.index.people();
        let mut ranked: Vec<Ranked> = self
            .index
            .entries
            .iter()
            .zip(people)
            .map(|(entry, person)| {
                let hit = entry.score(&query_vec);
                Ranked {
                    candidate: Candidate { person: person.clone(), score: hit.score },
                    via_alias: hit.via_alias,
                    exact_name: !normalized_query.is_empty() && entry.normalized_name == normalized_query,
                }
            })
            .collect();
        // score, then full-name hits before alias hits, then id
        ranked.sort_by(|a, b| {
            b.candidate
                .score
                .total_cmp(&a.candidate.score)
                .then_with(|| a.via_alias.cmp(&b.via_alias))
                .then_with(|| a.candidate.person.id.cmp(&b.candidate.person.id))
        });

        let result = classify(query.to_string(), ranked, &self.settings);
        debug!(
            "Resolved '{}' -> {:?} ({} candidate(s), top {:?})",
            result.query_name,
            result.status,
            result.candidates.len(),
            result.top_score()
        );
        Ok(result)
    }

    /// Resolve several names independently; output order follows input order.
    ///
    /// Names that land on the same person are not merged.
    pub async fn resolve_batch<S: AsRef<str>>(
        &self,
        queries: &[S],
    ) -> Result<Vec<MatchResult>, ResolveError> {
        join_all(queries.iter().map(|q| self.resolve(q.as_ref()))).await.into_iter().collect()
    }
}

/// A scored person before classification.
struct Ranked {
    candidate: Candidate,
    via_alias: bool,
    /// The person's normalised full name equals the normalised query.
    exact_name: bool,
}

/// Apply the threshold/margin policy to a ranked candidate list.
///
/// A query naming exactly one person's full name is confident regardless of
/// how close other people's aliases score.
fn classify(query_name: String, mut ranked: Vec<Ranked>, settings: &ResolverSettings) -> MatchResult {
    let exact: Vec<usize> = ranked.iter().enumerate().filter(|(_, r)| r.exact_name).map(|(i, _)| i).collect();
    if let [only] = exact.as_slice() {
        let best = ranked.swap_remove(*only).candidate;
        return MatchResult { query_name, status: MatchStatus::ConfidentMatch, candidates: vec![best] };
    }

    let ranked: Vec<Candidate> = ranked.into_iter().map(|r| r.candidate).collect();
    let top = match ranked.first() {
        Some(best) if best.score >= settings.similarity_threshold => best.score,
        _ => return MatchResult::no_match(query_name),
    };

    let floor = top - settings.ambiguity_margin;
    let mut close: Vec<Candidate> = ranked
        .into_iter()
        .take_while(|c| c.score >= settings.similarity_threshold && c.score >= floor)
        .collect();

    if close.len() >= 2 {
        close.truncate(settings.max_candidates);
        MatchResult { query_name, status: MatchStatus::Ambiguous, candidates: close }
    } else {
        MatchResult { query_name, status: MatchStatus::ConfidentMatch, candidates: close }
    }
}
