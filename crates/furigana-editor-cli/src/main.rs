mod app;
mod args;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use furigana_editor_config::{Config, EditorVariant, Preferences, ReadingScript};
use furigana_editor_engine::{DictionaryConverter, Editor, InitGate, Script};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    panic, process,
    time::Duration,
};

use crate::app::App;

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    let parsed = match args::parse(env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            println!("{}", args::USAGE);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", args::USAGE);
            process::exit(1);
        }
    };

    init_logging()?;
    log::info!("furigana-editor starting up");

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let preferences = Preferences::load().unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable preferences: {e}");
        Preferences::default()
    });

    let dictionary = parsed.dictionary_source(env::var_os(args::DICT_ENV), &config);
    log::info!("Loading dictionary from {dictionary}");
    let gate = InitGate::initialize(move || DictionaryConverter::open(&dictionary));

    let mut editor = match parsed.variant(&config) {
        EditorVariant::Block => Editor::with_blocks(gate),
        EditorVariant::Global => Editor::with_text(gate),
    };
    editor.set_script(match config.script {
        ReadingScript::Hiragana => Script::Hiragana,
        ReadingScript::Katakana => Script::Katakana,
    });

    // Setup terminal
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(editor, preferences, Preferences::preferences_path());
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Exiting after error: {err:?}");
        println!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file so they do not draw over the TUI. `RUST_LOG` filters,
/// defaulting to `info`.
fn init_logging() -> Result<()> {
    let path = env::temp_dir().join("furigana-editor.log");
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Panics abort the process, including one on the dictionary loader thread,
/// so the terminal is put back before the default hook prints.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();
        default_hook(info);
    }));
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.tick();
        terminal.draw(|f| ui::ui(f, app))?;

        // Poll so the loading overlay clears without a keypress
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        }
    }
    Ok(())
}
