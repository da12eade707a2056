use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::constants::{
    EXCHANGE_CHANNEL_CAPACITY, UI_PAGE_SCROLL_LINES, UI_REFRESH_INTERVAL_MS, UI_SCROLL_LINES,
};
use crate::input::SAMPLE_PROMPTS;
use crate::runtime::{spawn_exchange, ExchangeEvent};
use crate::tui::input::{InputAction, InputHandler};
use crate::tui::render::render_ui;
use crate::tui::{App, AppState};
use crate::utils::log_info;

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ MediCore requires an interactive terminal.");
        eprintln!("   For scripted use, pass a prompt instead: medicore -p \"...\"");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Clear terminal
    terminal.clear()?;

    let mut app_state = AppState::Insert;

    // Exchange progress flows back to this loop
    let (tx, mut rx) = mpsc::channel::<ExchangeEvent>(EXCHANGE_CHANNEL_CAPACITY);

    // Run the UI loop
    let res = run_app(&mut terminal, &mut app, &mut app_state, tx, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    app_state: &mut AppState,
    tx: mpsc::Sender<ExchangeEvent>,
    rx: &mut mpsc::Receiver<ExchangeEvent>,
) -> Result<()> {
    let input_handler = InputHandler::new();

    loop {
        app.tick = app.tick.wrapping_add(1);

        // Draw UI
        terminal.draw(|f| render_ui(f, app, *app_state))?;

        // Handle input events
        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C quits from any state
                    if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
                        app.quit();
                    } else {
                        match app_state {
                            AppState::Normal => handle_normal_key(app, app_state, key.code),
                            AppState::Insert => match input_handler.handle_key(key) {
                                InputAction::Submit => submit(app, &tx),
                                InputAction::Newline => app.session.input.push('\n'),
                                InputAction::Insert(c) => app.session.input.push(c),
                                InputAction::Delete => {
                                    app.session.input.pop();
                                }
                                InputAction::Cancel => *app_state = AppState::Normal,
                                InputAction::ToggleSidebar => app.toggle_sidebar(),
                                InputAction::ScrollUp => app.scroll_up(UI_PAGE_SCROLL_LINES),
                                InputAction::ScrollDown => app.scroll_down(UI_PAGE_SCROLL_LINES),
                                InputAction::Sample(index) => {
                                    if let Some(sample) = SAMPLE_PROMPTS.get(index) {
                                        app.load_sample(sample.label);
                                    }
                                }
                                InputAction::Quit => app.quit(),
                                InputAction::None => {}
                            },
                            AppState::Command => match key.code {
                                KeyCode::Esc => {
                                    *app_state = AppState::Normal;
                                    app.command_input.clear();
                                }
                                KeyCode::Enter => {
                                    let command = std::mem::take(&mut app.command_input);
                                    handle_command(app, &command).await;
                                    *app_state = AppState::Normal;
                                }
                                KeyCode::Char(c) => app.command_input.push(c),
                                KeyCode::Backspace => {
                                    if app.command_input.is_empty() {
                                        // If input is empty, exit command mode
                                        *app_state = AppState::Insert;
                                    } else {
                                        app.command_input.pop();
                                    }
                                }
                                _ => {}
                            },
                        }
                    }
                }
            }
        }

        // Fold in whatever the exchange task has reported
        while let Ok(event) = rx.try_recv() {
            let finished = !matches!(event, ExchangeEvent::Routed(_));
            app.session.apply(event);
            if finished {
                app.scroll_to_bottom();
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}

fn handle_normal_key(app: &mut App, app_state: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('i') | KeyCode::Enter => {
            app.show_help = false;
            *app_state = AppState::Insert;
        }
        KeyCode::Char(':') => {
            *app_state = AppState::Command;
            app.command_input.clear();
        }
        KeyCode::Char('?') => app.show_help = !app.show_help,
        KeyCode::Char('v') => app.toggle_panel(),
        KeyCode::Esc => app.show_help = false,
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(UI_SCROLL_LINES),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(UI_SCROLL_LINES),
        KeyCode::PageUp => app.scroll_up(UI_PAGE_SCROLL_LINES),
        KeyCode::PageDown => app.scroll_down(UI_PAGE_SCROLL_LINES),
        KeyCode::Tab => app.toggle_sidebar(),
        _ => {}
    }
}

/// Start an exchange for the current input, if one can start
fn submit(app: &mut App, tx: &mpsc::Sender<ExchangeEvent>) {
    match app.session.begin_submit() {
        Some(pending) => {
            app.clear_status();
            app.show_help = false;
            app.scroll_to_bottom();
            spawn_exchange(
                app.backend.clone(),
                pending,
                app.config.pacing.clone(),
                tx.clone(),
            );
        }
        None if app.session.is_processing() => {
            app.set_status("Still waiting for the previous answer");
        }
        None => {}
    }
}

async fn handle_command(app: &mut App, command: &str) {
    let command = command.trim();
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "q" => app.quit(),
        "attach" | "a" => {
            if rest.is_empty() {
                app.set_status("Usage: :attach <path to image>");
            } else if app.attach_image(Path::new(rest)).await {
                log_info("📎", format!("Attached {}", rest));
            }
        }
        "detach" => app.detach_image(),
        "sample" | "s" => {
            app.load_sample(rest);
        }
        "sidebar" | "sb" => app.toggle_sidebar(),
        "panel" => app.toggle_panel(),
        "clear" => app.set_status("The transcript is append-only and cannot be cleared"),
        "help" | "h" => app.show_help = true,
        "" => {}
        _ => app.set_status(format!("Unknown command: {}", command)),
    }
}
