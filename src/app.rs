use crate::clarification::{parse_choice, Choice, ClarificationRequest, ResolutionSummary};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::directory::{load_csv, Directory, Person};
use crate::embedding::{create_embedder, Embedder};
use crate::env_manager;
use crate::health::HealthChecker;
use crate::meeting::{extract_json, MeetingRecord, MeetingRequest, MeetingRules, ScheduleWindow};
use crate::resolver::{DirectoryResolver, MatchResult, MatchStatus, ResolverSettings};
use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub struct Application {
    config: Config,
    directory: Directory,
    embedder: Arc<dyn Embedder>,
}

impl Application {
    /// Load config, roster and embedder for the given command line.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        env_manager::load_env_file();

        let mut config = match &cli.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(roster) = &cli.roster {
            config.directory.roster_path = Some(roster.clone());
        }
        Self::new(config)
    }

    pub fn new(config: Config) -> Result<Self> {
        if !env_manager::check_env_vars(config.embedding.provider) {
            return Err(anyhow!(
                "credentials for the '{:?}' embedding provider are missing",
                config.embedding.provider
            ));
        }

        let directory = match &config.directory.roster_path {
            Some(path) => load_csv(path)?,
            None => {
                log::info!("No roster configured, using the built-in sample roster");
                Directory::sample()
            }
        };
        let embedder = create_embedder(&config.embedding).context("Failed to create embedder")?;
        Ok(Self { config, directory, embedder })
    }

    pub async fn run(&self, command: Option<Commands>) -> Result<()> {
        match command {
            Some(Commands::Resolve { names, json }) => self.resolve_names(&names, json).await,
            Some(Commands::Health { json }) => self.health(json).await,
            Some(Commands::Assemble { request, schedule, body }) => {
                let record = self.assemble_from_files(&request, &schedule, &body).await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
            Some(Commands::Roster) => {
                self.print_roster();
                Ok(())
            }
            Some(Commands::Config) => {
                print!("{}", toml::to_string_pretty(&self.config)?);
                Ok(())
            }
            None => self.run_interactive().await,
        }
    }

    async fn load_resolver(&self) -> Result<DirectoryResolver> {
        let settings = ResolverSettings::from_config(&self.config);
        DirectoryResolver::load(self.directory.clone(), Arc::clone(&self.embedder), settings)
            .await
            .context("Failed to load directory resolver")
    }

    async fn resolve_names(&self, names: &[String], json: bool) -> Result<()> {
        let resolver = self.load_resolver().await?;
        let results = resolver.resolve_batch(names).await?;
        if json {
            let summary = ResolutionSummary::from_results(&results);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            results.iter().for_each(print_result);
        }
        Ok(())
    }

    async fn assemble_from_files(&self, request: &Path, schedule: &Path, body: &str) -> Result<MeetingRecord> {
        let request_text = fs::read_to_string(request)
            .with_context(|| format!("Failed to read meeting request {}", request.display()))?;
        let schedule_text = fs::read_to_string(schedule)
            .with_context(|| format!("Failed to read schedule {}", schedule.display()))?;
        let resolver = self.load_resolver().await?;
        self.assemble_record(&resolver, &request_text, &schedule_text, body).await
    }

    /// Parse model output, resolve attendees and build the meeting record.
    ///
    /// Fails with the clarification prompt when any attendee is not a
    /// confident match.
    pub async fn assemble_record(
        &self,
        resolver: &DirectoryResolver,
        request_text: &str,
        schedule_text: &str,
        body: &str,
    ) -> Result<MeetingRecord> {
        let request: MeetingRequest = extract_json(request_text)?;
        let window: ScheduleWindow = extract_json(schedule_text)?;

        let names = request.attendee_names();
        let results = resolver.resolve_batch(&names).await?;
        if let Some(clarification) = ClarificationRequest::from_results(&results) {
            return Err(anyhow!("attendees need clarification:\n{}", clarification.render()));
        }
        let attendees: Vec<Person> = results.iter().filter_map(|r| r.confident_person().cloned()).collect();

        let mut rules = MeetingRules::from_config(&self.config.meeting)?;
        if let Some(minutes) = request.duration_minutes.filter(|m| *m > 0) {
            rules.default_duration_minutes = minutes;
        }
        let subject = request.subject.as_deref().or(request.purpose.as_deref()).unwrap_or_default();
        let body = match body.trim() {
            "" => request.purpose.as_deref().unwrap_or_default(),
            b => b,
        };
        Ok(MeetingRecord::assemble(subject, &window, body, &attendees, &rules)?)
    }

    async fn health(&self, json: bool) -> Result<()> {
        let checker = HealthChecker::new(
            self.directory.clone(),
            Arc::clone(&self.embedder),
            ResolverSettings::from_config(&self.config),
        );
        let report = checker.run().await;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.print();
        }
        if report.is_healthy() {
            Ok(())
        } else {
            Err(anyhow!("health check failed: {}", report.summary))
        }
    }

    fn print_roster(&self) {
        println!("{} people:", self.directory.len());
        for person in self.directory.people() {
            println!("  {:>4}  {} <{}>", person.id, person.full_name, person.email_address);
        }
    }

    async fn run_interactive(&self) -> Result<()> {
        log::info!("Starting Meetwise interactive mode");
        let resolver = self.load_resolver().await?;
        let mut rl = DefaultEditor::new()?;

        println!("Welcome to Meetwise! Type attendee names separated by commas, or 'help'.");
        let prompt = "👥 ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    let input = line.trim();
                    match input.to_lowercase().as_str() {
                        "" => continue,
                        "exit" | "quit" => break,
                        "help" => print_help(),
                        _ => {
                            if let Err(err) = self.process_names(&resolver, input, &mut rl).await {
                                log::error!("Failed to resolve names: {:?}", err);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
        Ok(())
    }

    async fn process_names(&self, resolver: &DirectoryResolver, input: &str, rl: &mut DefaultEditor) -> Result<()> {
        let names = split_names(input);
        let results = resolver.resolve_batch(&names).await?;

        let mut attendees: Vec<Person> = results.iter().filter_map(|r| r.confident_person().cloned()).collect();

        if let Some(request) = ClarificationRequest::from_results(&results) {
            for item in &request.items {
                let single = ClarificationRequest { items: vec![item.clone()] };
                print!("{}", single.render());
                if item.options.is_empty() {
                    continue;
                }
                if let Some(person) = ask_choice(rl, &item.options)? {
                    attendees.push(person);
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        attendees.retain(|p| seen.insert(p.id));
        if attendees.is_empty() {
            println!("No attendees resolved.");
        } else {
            println!("Attendees:");
            for person in &attendees {
                println!("  ✅ {} <{}>", person.full_name, person.email_address);
            }
        }
        Ok(())
    }
}

/// Keep asking until the answer names an option or is a skip.
fn ask_choice(rl: &mut DefaultEditor, options: &[Person]) -> Result<Option<Person>> {
    loop {
        let answer = match rl.readline("Choice (number, name or 'skip')> ") {
            Ok(answer) => answer,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match parse_choice(&answer, options) {
            Ok(Choice::Person(person)) => return Ok(Some(person)),
            Ok(Choice::Skip) => return Ok(None),
            Err(err) => println!("{}", err),
        }
    }
}

fn print_result(result: &MatchResult) {
    match result.status {
        MatchStatus::ConfidentMatch => {
            if let Some(best) = result.candidates.first() {
                println!(
                    "✅ {} -> {} <{}> ({:.3})",
                    result.query_name, best.person.full_name, best.person.email_address, best.score
                );
            }
        }
        MatchStatus::Ambiguous => {
            println!("❓ {} is ambiguous:", result.query_name);
            for (i, c) in result.candidates.iter().enumerate() {
                println!("   {}. {} <{}> ({:.3})", i + 1, c.person.full_name, c.person.email_address, c.score);
            }
        }
        MatchStatus::NoMatch => println!("❌ {}: no match", result.query_name),
    }
}

fn print_help() {
    println!("Enter attendee names separated by commas, e.g. 'Ali, Arda Orçun'.");
    println!("Ambiguous names are followed by a numbered list to choose from.");
    println!("  help - Show this help");
    println!("  exit - Exit the application");
}

/// Comma-separated names, blanks dropped.
pub fn split_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
