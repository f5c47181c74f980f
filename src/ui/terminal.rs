use {
    crate::state::SharedState,
    ratatui::{backend::CrosstermBackend, Terminal},
    std::time::Duration,
};

/// Run the dashboard event loop until the user quits.
///
/// Raw mode delivers ctrl-c as a key event, so quitting is keyboard-only
/// here; the caller shuts the ingestion loop down after this returns.
pub async fn run_ui(state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;

    // Alternate screen keeps stderr logs from corrupting the chart.
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;

    terminal.clear()?;

    let refresh_interval = Duration::from_millis(250);

    loop {
        if crossterm::event::poll(refresh_interval)? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                match key.code {
                    crossterm::event::KeyCode::Char('q') | crossterm::event::KeyCode::Esc => break,
                    crossterm::event::KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        break
                    }
                    _ => {}
                }
            }
        }

        // Clone the display state out of the lock before drawing.
        let view = {
            let state = state.read().await;
            state.clone()
        };

        terminal.draw(|f| crate::ui::layout::render(f, &view))?;
    }

    // Restore the terminal.
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;

    Ok(())
}
