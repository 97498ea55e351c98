// READERCHUNKS - pick a PDF, read it one sentence at a time
use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{io, path::PathBuf, time::Duration};

use readerchunks::app::App;
use readerchunks::config::ReaderConfig;
use readerchunks::file_picker::{FilePicker, FuzzyPicker, PickOutcome, PickedFile};
use readerchunks::keyboard::{self, KeyContext};
use readerchunks::logging;
use readerchunks::pdf_extraction::{Backend, ExtractionMethod, Orchestrator};
use readerchunks::screen_mode::ScreenMode;
use readerchunks::types::AppFlags;
use readerchunks::ui_renderer;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// PDF to open right away instead of starting in the picker
    pdf_file: Option<PathBuf>,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    backend: Option<ExtractionMethod>,
    /// Show substitute text instead of an error when extraction fails
    #[arg(long)]
    fallback: bool,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    /// Extract, print the sentences and exit without starting the TUI
    #[arg(long, requires = "pdf_file")]
    print: bool,
}

impl Args {
    fn apply_to(&self, config: &mut ReaderConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.fallback {
            config.fallback = true;
        }
        if let Some(endpoint) = &self.endpoint {
            config.remote.endpoint = Some(endpoint.clone());
        }
        if let Some(key) = &self.api_key {
            config.remote.api_key = Some(key.clone());
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ReaderConfig::load(args.config.as_deref()).context("loading configuration")?;
    args.apply_to(&mut config);
    logging::init(config.level_filter()?, config.log_file.as_deref()).context("opening log file")?;

    let backend = Backend::from_config(&config)?;
    let orchestrator = Orchestrator::new(backend, config.fallback);
    log::info!(
        "backend {} (fallback {})",
        orchestrator.method(),
        if orchestrator.fallback_enabled() { "on" } else { "off" }
    );
    let mut app = App::new(orchestrator);

    if args.print {
        return print_document(&mut app, args.pdf_file.as_deref()).await;
    }

    if let Some(path) = &args.pdf_file {
        app.start_extraction(PickedFile::from_path(path));
    }

    let mut picker = FuzzyPicker::new(config.search_dirs.clone());
    setup_terminal()?;
    let result = run_app(&mut app, &mut picker).await;
    restore_terminal()?;

    result
}

async fn print_document(app: &mut App<Backend>, path: Option<&std::path::Path>) -> Result<()> {
    let Some(path) = path else {
        bail!("--print needs a PDF file");
    };
    if !app.start_extraction(PickedFile::from_path(path)) {
        if let Some(alert) = &app.alert {
            bail!("{}", alert.message);
        }
        bail!("could not start extraction of {}", path.display());
    }
    app.wait_for_extraction().await;

    if let Some(alert) = &app.alert {
        bail!("{}: {}", alert.title, alert.message);
    }
    if let Some(summary) = &app.summary {
        println!("{}\n", summary);
    }
    if let Some(sentences) = app.session.sentences() {
        for (i, sentence) in sentences.iter().enumerate() {
            println!("{:>4}  {}", i + 1, sentence);
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    execute!(io::stdout(), Show, LeaveAlternateScreen, DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

async fn run_app(app: &mut App<Backend>, picker: &mut impl FilePicker) -> Result<()> {
    let mut last_term_size = (0, 0);
    let mut last_log_count = logging::lines_logged();

    loop {
        let (term_width, term_height) = terminal::size()?;
        if (term_width, term_height) != last_term_size {
            app.flags.insert(AppFlags::REDRAW);
            last_term_size = (term_width, term_height);
        }

        app.poll_extraction();

        if app.screen_mode == ScreenMode::Debug {
            let count = logging::lines_logged();
            if count != last_log_count {
                app.flags.insert(AppFlags::REDRAW);
                last_log_count = count;
            }
        }

        if app.flags.contains(AppFlags::OPEN_PICKER) {
            app.flags.remove(AppFlags::OPEN_PICKER);
            match picker.pick()? {
                PickOutcome::Selected(file) => {
                    log::info!("picked {}", file.name);
                    app.start_extraction(file);
                }
                PickOutcome::Cancelled => log::debug!("picker cancelled"),
            }
            app.flags.insert(AppFlags::REDRAW);
        }

        if app.flags.contains(AppFlags::REDRAW) {
            ui_renderer::render(app, term_width, term_height)?;
            app.flags.remove(AppFlags::REDRAW);
        }

        // Short poll so finished extractions show up without a key press
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    let ctx = KeyContext {
                        alert_open: app.alert.is_some(),
                        screen: app.screen_mode,
                        view: app.session.mode(),
                    };
                    if let Some(intent) = keyboard::map_key(key, ctx) {
                        app.dispatch(intent);
                    }
                }
                Event::Resize(_, _) => app.flags.insert(AppFlags::REDRAW),
                _ => {}
            }
        }

        if app.should_exit() {
            break;
        }
    }

    Ok(())
}
