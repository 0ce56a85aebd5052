//! Interactive reveal panel.
//!
//! Renders the [`PanelModel`] in the terminal and blocks on a key loop until
//! the user closes it. Escape terminates the whole process immediately;
//! every other action runs against the already-resolved record, never
//! re-fetching from the vault.

use console::{Key, Term, style};
use passgate_core::entry::CredentialRecord;
use passgate_core::error::Error;
use passgate_core::panel::{FieldAction, PanelModel, save_file_name};

use crate::sinks;

pub fn show(record: &CredentialRecord) -> Result<(), Error> {
    let term = Term::stderr();
    if !term.is_term() {
        return Err(Error::Io(std::io::Error::other(
            "the reveal panel needs an interactive terminal (use --print, --clipboard, or --type)",
        )));
    }

    let mut panel = PanelModel::from_record(record);
    if panel.is_empty() {
        term.write_line("entry has no fields to show")?;
        return Ok(());
    }

    term.hide_cursor()?;
    let result = event_loop(&term, &mut panel, record);
    let _ = term.show_cursor();
    result
}

fn event_loop(term: &Term, panel: &mut PanelModel, record: &CredentialRecord) -> Result<(), Error> {
    let mut selected = 0usize;
    let mut status = String::new();

    loop {
        draw(term, panel, selected, &status)?;
        status.clear();

        match term.read_key()? {
            Key::Escape => {
                let _ = term.clear_screen();
                let _ = term.show_cursor();
                std::process::exit(0);
            }
            Key::Char('q') => {
                term.clear_screen()?;
                return Ok(());
            }
            Key::ArrowUp | Key::Char('k') => {
                selected = selected.saturating_sub(1);
            }
            Key::ArrowDown | Key::Char('j') => {
                selected = (selected + 1).min(panel.widgets().len() - 1);
            }
            Key::Char('c') => {
                let widget = &panel.widgets()[selected];
                sinks::clipboard_set(widget.value())?;
                status = format!("copied {}", widget.name());
            }
            Key::Char('r') => {
                if let Some(widget) = panel.widget_mut(selected)
                    && widget.supports(FieldAction::Reveal)
                {
                    widget.toggle_reveal();
                }
            }
            Key::Char('p') => {
                let widget = &panel.widgets()[selected];
                if widget.supports(FieldAction::Plumb) {
                    sinks::plumb_string(widget.value())?;
                    status = format!("plumbed {}", widget.name());
                }
            }
            Key::Char('s') => {
                let widget = &panel.widgets()[selected];
                if widget.supports(FieldAction::Save) {
                    let filename = format!(
                        "{}_{}",
                        save_file_name(widget.name(), record),
                        sinks::iso8601_now()
                    );
                    let path =
                        sinks::write_secret_file(&sinks::save_dir(), &filename, widget.value())?;
                    sinks::notify(&format!("Saved to {filename}"), &path.display().to_string())?;
                    status = format!("saved to {}", path.display());
                }
            }
            _ => {}
        }
    }
}

fn draw(term: &Term, panel: &PanelModel, selected: usize, status: &str) -> Result<(), Error> {
    term.clear_screen()?;

    if !panel.title().is_empty() {
        term.write_line(&style(panel.title()).bold().underlined().to_string())?;
        term.write_line("")?;
    }

    for (i, widget) in panel.widgets().iter().enumerate() {
        let marker = if i == selected {
            style(">").cyan().bold().to_string()
        } else {
            " ".to_string()
        };
        let name = style(format!("{:<14}", widget.name())).dim().to_string();
        let hints = style(action_hints(widget)).dim().to_string();

        if widget.is_multiline() {
            term.write_line(&format!("{marker} {name} {hints}"))?;
            for line in widget.display_value().lines() {
                term.write_line(&format!("      {line}"))?;
            }
        } else {
            term.write_line(&format!(
                "{marker} {name} {:<42} {hints}",
                widget.display_value()
            ))?;
        }
    }

    term.write_line("")?;
    if !status.is_empty() {
        term.write_line(&format!("  {}", style(status).green()))?;
    }
    term.write_line(
        &style("  up/down select   c copy   r reveal   p plumb   s save   q close   esc quit")
            .dim()
            .to_string(),
    )?;
    Ok(())
}

fn action_hints(widget: &passgate_core::panel::FieldWidget) -> String {
    widget
        .actions()
        .iter()
        .map(|action| match action {
            FieldAction::Copy => "[c]opy",
            FieldAction::Plumb => "[p]lumb",
            FieldAction::Reveal => "[r]eveal",
            FieldAction::Save => "[s]ave",
        })
        .collect::<Vec<_>>()
        .join(" ")
}
