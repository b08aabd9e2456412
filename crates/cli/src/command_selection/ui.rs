use std::io::{stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::Color::{DarkBlue, DarkCyan, DarkGreen, DarkGrey, Reset, Yellow};
use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, queue, terminal, ExecutableCommand};
use log::debug;

use super::input::key_from_event;
use super::types::{Phase, UiState, ViewportState};
use see_core::command_definitions::CommandDefinition;
use see_core::error::{Error, Result, INPUT_DESCRIPTION, STREAM_PATH};

const TITLE: &str = " SEE - Command Selector ";
const KEY_HINTS: &str = "↑↓/jk:Move  PgUp/PgDn:Page  Home/End:Jump  Enter:RUN  q:Quit";

const ID_WIDTH: usize = 6;
const DESCRIPTION_WIDTH: usize = 20;
const TAGS_WIDTH: usize = 15;
const MIN_COMMAND_WIDTH: usize = 10;
/// Selection marker, three column gaps and the fixed-width columns.
const FIXED_ROW_WIDTH: usize = 2 + 3 + ID_WIDTH + DESCRIPTION_WIDTH + TAGS_WIDTH;

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = stdout.execute(cursor::Show);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// Column widths for a given terminal width.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ColumnLayout {
    pub id: usize,
    pub description: usize,
    pub command: usize,
    pub tags: usize,
}

impl ColumnLayout {
    #[must_use]
    pub fn for_width(width: u16) -> Self {
        Self {
            id: ID_WIDTH,
            description: DESCRIPTION_WIDTH,
            command: usize::from(width)
                .saturating_sub(FIXED_ROW_WIDTH)
                .max(MIN_COMMAND_WIDTH),
            tags: TAGS_WIDTH,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineStyle {
    Header,
    ColumnHeadings,
    Row,
    SelectedRow,
    Separator,
    Preview,
    Footer,
}

/// One rendered terminal row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FrameLine {
    pub text: String,
    pub style: LineStyle,
}

impl FrameLine {
    fn new(text: String, style: LineStyle) -> Self {
        Self { text, style }
    }
}

/// Pads or cuts `text` to exactly `width` characters, marking cuts with `…`.
fn fit(text: &str, width: usize) -> String {
    let length = text.chars().count();

    if length <= width {
        format!("{text:<width$}")
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

fn truncate_to(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn format_row(command: &CommandDefinition, layout: &ColumnLayout, is_selected: bool) -> String {
    let marker = if is_selected { "▶ " } else { "  " };
    // Single-line cells only
    let command_text = command.command.replace('\n', " ");

    format!(
        "{marker}{} {} {} {}",
        fit(&format!("[{}]", command.id), layout.id),
        fit(&command.description, layout.description),
        fit(&command_text, layout.command),
        fit(&command.joined_tags(), layout.tags),
    )
}

fn format_headings(layout: &ColumnLayout) -> String {
    format!(
        "  {} {} {} {}",
        fit("ID", layout.id),
        fit("DESCRIPTION", layout.description),
        fit("COMMAND", layout.command),
        fit("TAGS", layout.tags),
    )
}

fn preview_lines(command: &CommandDefinition, width: usize) -> [FrameLine; 4] {
    let description = if command.description.is_empty() {
        "(no description)".to_string()
    } else {
        command.description.clone()
    };

    let tags = if command.tags.is_empty() {
        "(no tags)".to_string()
    } else {
        command.joined_tags()
    };

    [
        FrameLine::new("─".repeat(width), LineStyle::Separator),
        FrameLine::new(format!(" CMD: {}", command.command), LineStyle::Preview),
        FrameLine::new(format!(" DESC: {description}"), LineStyle::Preview),
        FrameLine::new(format!(" TAGS: {tags}"), LineStyle::Preview),
    ]
}

/// Builds the frame for `state`.
///
/// Every line is cut to the viewport width and the frame to its height, so
/// any terminal size produces a frame.
#[must_use]
pub fn render(
    state: &UiState,
    commands: &[&CommandDefinition],
    viewport: &ViewportState,
) -> Vec<FrameLine> {
    let width = usize::from(viewport.width);
    let layout = ColumnLayout::for_width(viewport.width);

    let mut lines = vec![
        FrameLine::new(format!("{TITLE:═^width$}"), LineStyle::Header),
        FrameLine::new(format_headings(&layout), LineStyle::ColumnHeadings),
    ];

    let visible = state.visible_range();
    let shown = visible.len();
    lines.extend(commands[visible].iter().enumerate().map(|(i, command)| {
        if i + state.scroll_offset == state.current_index {
            FrameLine::new(format_row(command, &layout, true), LineStyle::SelectedRow)
        } else {
            FrameLine::new(format_row(command, &layout, false), LineStyle::Row)
        }
    }));

    // Keep the preview anchored below a full list
    for _ in shown..state.visible_rows {
        lines.push(FrameLine::new(String::new(), LineStyle::Row));
    }

    if let Some(current) = commands.get(state.current_index) {
        lines.extend(preview_lines(current, width));
    }

    lines.push(FrameLine::new(
        format!(
            " {}/{} │ {KEY_HINTS} ",
            state.current_index + 1,
            commands.len()
        ),
        LineStyle::Footer,
    ));

    lines.truncate(usize::from(viewport.height));
    for line in &mut lines {
        line.text = truncate_to(&line.text, width);
    }

    lines
}

fn draw(frame: &[FrameLine], viewport: &ViewportState) -> std::io::Result<()> {
    let mut stdout = stdout();
    let width = usize::from(viewport.width);

    queue!(stdout, Clear(ClearType::All))?;

    for (row, line) in frame.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(stdout, MoveTo(0, row))?;

        match line.style {
            LineStyle::Header | LineStyle::Footer => queue!(
                stdout,
                SetBackgroundColor(DarkGreen),
                Print(fit(&line.text, width)),
            )?,
            LineStyle::ColumnHeadings => queue!(
                stdout,
                SetAttribute(Attribute::Bold),
                Print(&line.text),
            )?,
            LineStyle::SelectedRow => queue!(
                stdout,
                SetAttribute(Attribute::Bold),
                SetBackgroundColor(DarkBlue),
                SetForegroundColor(Yellow),
                Print(fit(&line.text, width)),
            )?,
            LineStyle::Separator => {
                queue!(stdout, SetForegroundColor(DarkGrey), Print(&line.text))?;
            }
            LineStyle::Preview => {
                queue!(stdout, SetForegroundColor(DarkCyan), Print(&line.text))?;
            }
            LineStyle::Row => queue!(stdout, Print(&line.text))?,
        }

        queue!(
            stdout,
            SetAttribute(Attribute::Reset),
            SetBackgroundColor(Reset),
            SetForegroundColor(Reset),
        )?;
    }

    stdout.flush()
}

fn current_viewport() -> Result<ViewportState> {
    let (width, height) = terminal::size()?;
    Ok(ViewportState { width, height })
}

/// Lets the user pick one of `commands` in a full-screen list.
///
/// Returns the id of the chosen command, or `None` if the user cancelled or
/// there was nothing to choose from.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or read from.
pub fn prompt_for_command_choice(commands: &[&CommandDefinition]) -> Result<Option<u32>> {
    if commands.is_empty() {
        return Ok(None);
    }

    let mut viewport = current_viewport()?;

    let Some(mut state) = UiState::new(commands.len(), viewport.visible_rows()) else {
        return Ok(None);
    };

    let mut stdout = stdout();
    stdout.execute(EnterAlternateScreen)?;
    enable_raw_mode()?;

    let _raw_mode_guard = RawModeGuard; // Restores the terminal on every return path
    stdout.execute(cursor::Hide)?;

    loop {
        let frame = render(&state, commands, &viewport);
        if let Err(e) = draw(&frame, &viewport) {
            debug!("Could not draw selector frame: {e}");
        }

        let event = event::read().map_err(|e| {
            Error::io_error(INPUT_DESCRIPTION.to_string(), STREAM_PATH.to_string(), e)
        })?;

        match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                let Some(key) = key_from_event(key_event) else {
                    continue;
                };

                match state.transition(key) {
                    Phase::Browsing(next) => state = next,
                    Phase::Selected(index) => return Ok(Some(commands[index].id)),
                    Phase::Cancelled => return Ok(None),
                }
            }
            Event::Resize(width, height) => {
                viewport = ViewportState { width, height };
                state = state.resized(viewport.visible_rows());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_selection::types::Key;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn create_test_command(id: u32, command: &str, description: &str) -> CommandDefinition {
        CommandDefinition {
            id,
            command: command.to_string(),
            description: description.to_string(),
            tags: BTreeSet::new(),
            alias: None,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            last_used_at: None,
            used_count: 0,
        }
    }

    fn viewport(width: u16, height: u16) -> ViewportState {
        ViewportState { width, height }
    }

    #[test]
    fn test_fit_pads_and_cuts() {
        assert_eq!(fit("ls", 4), "ls  ");
        assert_eq!(fit("docker", 4), "doc…");
        assert_eq!(fit("docker", 0), "");
        assert_eq!(fit("héllo", 5), "héllo");
    }

    #[test]
    fn test_column_layout() {
        assert_eq!(ColumnLayout::for_width(100).command, 54);
        assert_eq!(ColumnLayout::for_width(20).command, MIN_COMMAND_WIDTH);
    }

    #[test]
    fn test_render_frame_structure() {
        let mut tagged = create_test_command(2, "docker ps", "Containers");
        tagged.tags = BTreeSet::from(["docker".to_string(), "ops".to_string()]);
        let first = create_test_command(1, "ls -lah", "");
        let commands = vec![&first, &tagged];

        let state = UiState::new(commands.len(), 3).unwrap();
        let frame = render(&state, &commands, &viewport(80, 10));

        assert_eq!(frame.len(), 10);
        assert_eq!(frame[0].style, LineStyle::Header);
        assert!(frame[0].text.contains("SEE - Command Selector"));
        assert!(frame[1].text.contains("DESCRIPTION"));

        assert_eq!(frame[2].style, LineStyle::SelectedRow);
        assert!(frame[2].text.starts_with("▶ [1]"));
        assert_eq!(frame[3].style, LineStyle::Row);
        assert!(frame[3].text.starts_with("  [2]"));
        assert!(frame[3].text.contains("docker, ops"));
        assert_eq!(frame[4].text, "");

        assert_eq!(frame[5].style, LineStyle::Separator);
        assert_eq!(frame[6].text, " CMD: ls -lah");
        assert_eq!(frame[7].text, " DESC: (no description)");
        assert_eq!(frame[8].text, " TAGS: (no tags)");
        assert!(frame[9].text.starts_with(" 1/2 │"));
    }

    #[test]
    fn test_render_follows_navigation() {
        let commands: Vec<CommandDefinition> = (1..=10)
            .map(|id| create_test_command(id, &format!("echo {id}"), "Echo"))
            .collect();
        let commands: Vec<&CommandDefinition> = commands.iter().collect();
        let view = viewport(80, 10);

        let mut state = UiState::new(commands.len(), view.visible_rows()).unwrap();
        for _ in 0..4 {
            match state.transition(Key::Down) {
                Phase::Browsing(next) => state = next,
                other => panic!("Unexpected {other:?}"),
            }
        }

        let frame = render(&state, &commands, &view);
        assert!(frame[2].text.starts_with("  [3]"));
        assert!(frame[4].text.starts_with("▶ [5]"));
        assert_eq!(frame[6].text, " CMD: echo 5");
        assert!(frame[9].text.starts_with(" 5/10 │"));
    }

    #[test]
    fn test_render_tolerates_tiny_terminal() {
        let command = create_test_command(1, "kubectl get pods --all-namespaces", "Pods");
        let commands = vec![&command];
        let state = UiState::new(1, 1).unwrap();

        let frame = render(&state, &commands, &viewport(5, 3));
        assert_eq!(frame.len(), 3);
        assert!(frame.iter().all(|line| line.text.chars().count() <= 5));

        assert!(render(&state, &commands, &viewport(0, 0)).is_empty());
    }

    #[test]
    fn test_empty_list_returns_none_without_a_terminal() {
        // Never queries the terminal, so this holds without a tty
        assert_eq!(prompt_for_command_choice(&[]).unwrap(), None);
    }
}
