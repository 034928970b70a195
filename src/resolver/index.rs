//! Embedding index over the directory.
//
// Entries are parallel to `directory.people()`: entry i holds the vectors of
// person i. Vectors are computed once at load and never change.

use super::similarity::cosine_similarity;
use crate::directory::{Directory, Person};
use crate::embedding::normalize::{name_tokens, normalize_name};
use crate::embedding::Embedder;
use crate::error::EmbeddingError;
use log::{debug, info};
use std::time::Duration;

/// Titles dropped when deriving the bare-name alias.
const TITLE_TOKENS: &[&str] = &["phd", "ph", "d", "dr", "prof", "mr", "mrs", "ms", "jr", "sr"];

/// Texts sent to the embedder per request while indexing.
const INDEX_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub(crate) struct IndexedAlias {
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub(crate) struct IndexedPerson {
    /// Full name as compared against normalised queries.
    pub normalized_name: String,
    /// Embedding of the full name.
    pub embedding: Vec<f32>,
    pub aliases: Vec<IndexedAlias>,
}

/// Best similarity for one person and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub score: f32,
    /// The score came from an alias that beat the full name.
    pub via_alias: bool,
}

impl IndexedPerson {
    /// Best similarity over the full name and every alias; ties go to the full name.
    pub fn score(&self, query: &[f32]) -> Hit {
        let full = cosine_similarity(query, &self.embedding);
        let alias = self
            .aliases
            .iter()
            .map(|alias| cosine_similarity(query, &alias.embedding))
            .fold(f32::NEG_INFINITY, f32::max);
        if alias > full {
            Hit { score: alias, via_alias: true }
        } else {
            Hit { score: full, via_alias: false }
        }
    }
}

pub(crate) struct DirectoryIndex {
    pub directory: Directory,
    pub entries: Vec<IndexedPerson>,
    pub dimensions: Option<usize>,
}

impl DirectoryIndex {
    pub async fn build(
        directory: Directory,
        embedder: &dyn Embedder,
        index_aliases: bool,
        timeout: Option<Duration>,
    ) -> Result<Self, EmbeddingError> {
        // (person index, alias text or None for the full name)
        let mut slots: Vec<(usize, Option<String>)> = Vec::new();
        let mut texts: Vec<String> = Vec::new();
        for (i, person) in directory.people().iter().enumerate() {
            slots.push((i, None));
            texts.push(person.full_name.clone());
            if index_aliases {
                for alias in name_aliases(person) {
                    texts.push(alias.clone());
                    slots.push((i, Some(alias)));
                }
            }
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(INDEX_BATCH_SIZE) {
            let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let batch = bounded(timeout, embedder.embed_batch(&refs)).await?;
            if batch.len() != refs.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "got {} embeddings for {} texts",
                    batch.len(),
                    refs.len()
                )));
            }
            vectors.extend(batch);
        }

        let dimensions = vectors.first().map(Vec::len);
        if let Some(expected) = dimensions {
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(EmbeddingError::DimensionMismatch { expected, actual: bad.len() });
            }
        }

        let mut entries: Vec<IndexedPerson> = directory
            .people()
            .iter()
            .map(|person| IndexedPerson {
                normalized_name: normalize_name(&person.full_name),
                embedding: Vec::new(),
                aliases: Vec::new(),
            })
            .collect();
        for ((person_idx, alias), embedding) in slots.into_iter().zip(vectors) {
            let entry = &mut entries[person_idx];
            match alias {
                None => entry.embedding = embedding,
                Some(text) => entry.aliases.push(IndexedAlias { text, embedding }),
            }
        }

        info!(
            "Indexed {} people ({} vectors) with model '{}'",
            directory.len(),
            texts.len(),
            embedder.model_id()
        );
        Ok(Self { directory, entries, dimensions })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        self.directory.people()
    }
}

/// Run an embedder future under an optional deadline.
pub(crate) async fn bounded<F, T>(timeout: Option<Duration>, fut: F) -> Result<T, EmbeddingError>
where
    F: std::future::Future<Output = Result<T, EmbeddingError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| EmbeddingError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Alternative forms a person may be referred to by.
///
/// Bare name without titles, first name, last name and the e-mail local part,
/// all normalised; forms equal to the normalised full name are skipped.
pub fn name_aliases(person: &Person) -> Vec<String> {
    let tokens = name_tokens(&person.full_name);
    if tokens.is_empty() {
        return Vec::new();
    }
    let full = tokens.join(" ");

    let core: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !TITLE_TOKENS.contains(t))
        .collect();
    let core = if core.is_empty() { tokens.iter().map(String::as_str).collect() } else { core };

    let mut forms = vec![core.join(" "), core[0].to_string()];
    if core.len() > 1 {
        forms.push(core[core.len() - 1].to_string());
    }
    if let Some(local) = person.email_address.split('@').next() {
        forms.push(name_tokens(local).join(" "));
    }

    let mut aliases: Vec<String> = Vec::new();
    for form in forms {
        if !form.is_empty() && form != full && !aliases.contains(&form) {
            aliases.push(form);
        }
    }
    debug!("Aliases for '{}': {:?}", person.full_name, aliases);
    aliases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::NgramEmbedder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases() {
        let person = Person::new(9, "Şahin Nicat, Ph.D", "snicat@company.com.tr");
        assert_eq!(name_aliases(&person), vec!["sahin nicat", "sahin", "nicat", "snicat"]);

        let person = Person::new(6, "Ali Can Yılmaz", "alican.yilmaz@company.com.tr");
        assert_eq!(name_aliases(&person), vec!["ali", "yilmaz", "alican yilmaz"]);

        let person = Person::new(4, "Ali Şahin", "ali.sahin@company.com.tr");
        assert_eq!(name_aliases(&person), vec!["ali", "sahin"]);
    }

    #[test]
    fn test_single_token_name() {
        let person = Person::new(1, "Cher", "");
        assert!(name_aliases(&person).is_empty());
    }

    #[tokio::test]
    async fn test_build_without_aliases() {
        let directory = Directory::from_people(vec![
            Person::new(1, "Ali Şahin", "ali.sahin@company.com.tr"),
            Person::new(2, "Ali Demir", "ali.demir@company.com.tr"),
        ])
        .unwrap();
        let embedder = NgramEmbedder::default();
        let index = DirectoryIndex::build(directory, &embedder, false, None).await.unwrap();
        assert_eq!(index.entries.len(), 2);
        assert!(index.entries.iter().all(|e| e.aliases.is_empty()));
        assert_eq!(index.dimensions, Some(512));
        assert_eq!(index.entries[1].embedding, embedder.embed_text("Ali Demir"));
    }

    #[tokio::test]
    async fn test_alias_raises_score() {
        let directory =
            Directory::from_people(vec![Person::new(1, "Ali Şahin", "ali.sahin@company.com.tr")])
                .unwrap();
        let embedder = NgramEmbedder::default();
        let query = embedder.embed_text("Ali");

        let plain = DirectoryIndex::build(directory.clone(), &embedder, false, None).await.unwrap();
        let aliased = DirectoryIndex::build(directory, &embedder, true, None).await.unwrap();
        assert!(plain.entries[0].score(&query).score < 0.7);
        let hit = aliased.entries[0].score(&query);
        assert!(hit.score > 0.99);
        assert!(hit.via_alias);
    }

    #[tokio::test]
    async fn test_full_name_wins_tie_with_alias() {
        // "kaya" is both the full name of 2 and the last name of 1
        let directory = Directory::from_people(vec![
            Person::new(1, "Deniz Kaya", "deniz.kaya@company.com.tr"),
            Person::new(2, "Kaya", "kaya@company.com.tr"),
        ])
        .unwrap();
        let embedder = NgramEmbedder::default();
        let index = DirectoryIndex::build(directory, &embedder, true, None).await.unwrap();
        let query = embedder.embed_text("Kaya");

        let alias_hit = index.entries[0].score(&query);
        let full_hit = index.entries[1].score(&query);
        assert!(alias_hit.via_alias);
        assert!(!full_hit.via_alias);
        assert_eq!(index.entries[1].normalized_name, "kaya");
    }
}
