//! Terminal Bible reader entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bsb_core::events::events::{BooksFailed, ContentFailed};
use bsb_core::preferences::MemoryPreferenceStore;
use bsb_core::{AppState, AppStateConfig, ContentLoad, LoadOutcome, PreferenceStore, Subscription};
use bsb_data::{
    default_aliases, standard_corpus, AudioIndex, HttpContentSource, JsonPreferenceStore,
    ReaderConfig, StandardCanon,
};

mod audio;
mod commands;
mod render;

use audio::ChapterAudio;
use commands::{parse, Command, HELP};

#[derive(Parser, Debug)]
#[command(name = "bsb-reader")]
#[command(about = "Read and listen to the Berean Standard Bible in the terminal")]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shared reference to open, e.g. "bookId=JHN&chapter=3"
    #[arg(long)]
    query: Option<String>,

    /// Translation code for the text host
    #[arg(long)]
    translation: Option<String>,

    /// Chapter URL template with {translation}, {book} and {chapter}
    #[arg(long)]
    content_url: Option<String>,

    /// Stop at Genesis 1 and Revelation 22 instead of wrapping around
    #[arg(long)]
    no_wrap: bool,

    /// Keep preferences in memory only
    #[arg(long)]
    no_persist: bool,

    /// Log filter when RUST_LOG is unset (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut ReaderConfig) {
        if let Some(translation) = &self.translation {
            config.translation = translation.clone();
        }
        if let Some(url) = &self.content_url {
            config.content_url_template = url.clone();
        }
        if self.no_wrap {
            config.wrap = false;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ReaderConfig> {
    let mut config = match &args.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::load_default()?,
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn preference_store(config: &ReaderConfig, no_persist: bool) -> Arc<dyn PreferenceStore> {
    match config.preferences_file() {
        Some(path) if !no_persist => Arc::new(JsonPreferenceStore::open(path)),
        _ => Arc::new(MemoryPreferenceStore::new()),
    }
}

fn audio_index(config: &ReaderConfig) -> AudioIndex {
    if let Some(manifest) = &config.audio_manifest {
        match AudioIndex::from_manifest_file(config.audio_base_url.clone(), manifest) {
            Ok(index) => return index,
            Err(e) => warn!("Audio manifest {} unusable: {}", manifest.display(), e),
        }
    }
    AudioIndex::from_slug_scheme(
        config.audio_base_url.clone(),
        standard_corpus().books(),
        &StandardCanon,
    )
}

/// The interactive session
struct Reader {
    state: AppState,
    audio: ChapterAudio,
    _diagnostics: Vec<Subscription>,
}

impl Reader {
    fn new(config: &ReaderConfig, no_persist: bool) -> Result<Self> {
        let source = HttpContentSource::from_config(config).context("Invalid content source")?;
        let state = AppState::new(AppStateConfig {
            source: Arc::new(source),
            lookup: Arc::new(StandardCanon),
            store: preference_store(config, no_persist),
            aliases: default_aliases(),
            wrap: config.wrap,
        });

        let audio = ChapterAudio::attach(
            &state.event_bus,
            Arc::new(audio_index(config)),
            state.preferences.playback_rate(),
        );

        let diagnostics = vec![
            state
                .event_bus
                .subscribe_fn::<BooksFailed, _>(|e| error!("{}", e.error)),
            state.event_bus.subscribe_fn::<ContentFailed, _>(|e| {
                warn!("{} unavailable: {}", e.reference, e.error)
            }),
        ];

        Ok(Self {
            state,
            audio,
            _diagnostics: diagnostics,
        })
    }

    fn print_chapter(&self) {
        let snapshot = self.state.selection.snapshot();
        let label = self.state.selection.book_label();
        let settings = self.state.preferences.settings();
        println!("{}", render::render_chapter(&snapshot, &label, &settings));
    }

    /// Fetch in the background; only the latest selection is printed
    fn spawn_load(self: &Arc<Self>, load: ContentLoad) {
        let reader = self.clone();
        tokio::spawn(async move {
            match reader.state.selection.load(load).await {
                LoadOutcome::Applied | LoadOutcome::Failed => reader.print_chapter(),
                LoadOutcome::Cancelled | LoadOutcome::Skipped => {}
            }
        });
    }

    fn status(&self) -> String {
        let settings = self.state.preferences.settings();
        format!(
            "{} {}\n{}\n{}\nfont: {} ({})  theme: {} ({:?})  notes: {}",
            self.state.selection.book_label(),
            self.state.selection.reference().chapter,
            self.audio.status(),
            self.audio.source().unwrap_or_default(),
            settings.font_size.as_str(),
            settings.font_size.text_class(),
            settings.theme.as_str(),
            settings.theme.resolve(render::terminal_prefers_dark()),
            if settings.notes { "on" } else { "off" },
        )
    }

    /// Handle one command; returns false to quit
    fn handle(self: &Arc<Self>, command: Command) -> bool {
        let selection = &self.state.selection;
        let preferences = &self.state.preferences;

        let load = match command {
            Command::Next => selection.go_next().or_else(|| {
                println!("Already at the last chapter");
                None
            }),
            Command::Previous => selection.go_previous().or_else(|| {
                println!("Already at the first chapter");
                None
            }),
            Command::Book(id) => selection.select_book(&id).or_else(|| {
                println!("No book with id '{}'", id);
                None
            }),
            Command::Chapter(chapter) => match selection.select_chapter(chapter) {
                Some(load) => {
                    if load.reference().chapter != chapter {
                        println!("No chapter {}; showing {}", chapter, load.reference());
                    }
                    Some(load)
                }
                None => {
                    println!("Select a book first");
                    None
                }
            },
            Command::Jump(text) => selection.jump(&text).or_else(|| {
                println!("Could not find '{}'", text);
                None
            }),
            Command::Books => {
                for book in selection.books() {
                    println!("{:<4} {}", book.id, book.name);
                }
                None
            }
            Command::Play => {
                if self.audio.is_playing() {
                    println!("Already playing");
                } else if let Err(e) = self.audio.play() {
                    println!("Cannot play: {}", e);
                }
                None
            }
            Command::Pause => {
                self.audio.pause();
                None
            }
            Command::Speed => {
                match preferences.cycle_playback_rate() {
                    Ok(rate) => {
                        self.audio.set_rate(rate);
                        println!("Speed {}", rate);
                    }
                    Err(e) => println!("{}", e),
                }
                None
            }
            Command::Font => {
                match preferences.cycle_font_size() {
                    Ok(size) => {
                        println!("Font {}", size.as_str());
                        self.print_chapter();
                    }
                    Err(e) => println!("{}", e),
                }
                None
            }
            Command::Theme => {
                match preferences.toggle_theme() {
                    Ok(theme) => println!("Theme {}", theme.as_str()),
                    Err(e) => println!("{}", e),
                }
                None
            }
            Command::Notes => {
                match preferences.toggle_notes() {
                    Ok(notes) => {
                        println!("Notes {}", if notes { "on" } else { "off" });
                        self.print_chapter();
                    }
                    Err(e) => println!("{}", e),
                }
                None
            }
            Command::Link => {
                println!("?{}", selection.to_query());
                None
            }
            Command::Status => {
                println!("{}", self.status());
                None
            }
            Command::Help => {
                println!("{}", HELP);
                None
            }
            Command::Invalid(message) => {
                println!("{}", message);
                None
            }
            Command::Empty => None,
            Command::Quit => return false,
        };

        if let Some(load) = load {
            self.spawn_load(load);
        }
        true
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.log_level);

    info!("Starting reader ({})", config.translation);

    let reader = Arc::new(Reader::new(&config, args.no_persist)?);
    reader.state.start(args.query.as_deref()).await;
    reader.print_chapter();
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !reader.handle(parse(&line)) {
            break;
        }
    }

    reader.state.shutdown();
    info!("Goodbye");
    Ok(())
}
