pub mod app;
pub mod clarification;
pub mod cli;
pub mod config;
pub mod directory;
pub mod embedding;
pub mod env_manager;
pub mod error;
pub mod health;
pub mod meeting;
pub mod resolver;

use env_logger::Env;

/// Log to stderr as `time [LEVEL] message`, filtered by `MEETWISE_LOG` (default `info`).
pub fn init_logger() {
    env_logger::Builder::from_env(Env::new().filter_or("MEETWISE_LOG", "info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use directory::{Directory, Person};
pub use embedding::{create_embedder, Embedder, NgramEmbedder, OpenAiEmbedder};
pub use error::{ClarificationError, DirectoryError, EmbeddingError, MeetingError, ResolveError};
pub use resolver::{Candidate, DirectoryResolver, MatchResult, MatchStatus, ResolverSettings};
