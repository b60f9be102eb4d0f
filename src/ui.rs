use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use pomoclock::timer::{Phase, RunState};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const SESSION_BG: Color = Color::Rgb(0x4d, 0xa8, 0xda);
const BREAK_BG: Color = Color::Rgb(0x1a, 0xbc, 0x9c);
const RUNNING_BORDER: Color = Color::Rgb(28, 146, 63);
const STOPPED_BORDER: Color = Color::Red;

fn phase_background(phase: Phase) -> Color {
    match phase {
        Phase::Session => SESSION_BG,
        Phase::Break => BREAK_BG,
    }
}

fn run_border(state: RunState) -> Color {
    match state {
        RunState::Running => RUNNING_BORDER,
        RunState::Stopped => STOPPED_BORDER,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let countdown = self.clock.countdown();
        let lengths = countdown.lengths();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(3), // lengths
                Constraint::Min(5),    // timer
                Constraint::Length(2), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled("Pomodoro Clock", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        for (rect, label, value, keys) in [
            (columns[0], "Break Length", lengths.break_time, "(h) - / + (l)"),
            (columns[1], "Session Length", lengths.session, "(j/J) - / + (k/K)"),
        ] {
            Paragraph::new(vec![
                Line::from(Span::styled(label, dim_style)),
                Line::from(Span::styled(value.to_string(), bold_style)),
                Line::from(Span::styled(keys, italic_style)),
            ])
            .alignment(Alignment::Center)
            .render(rect, buf);
        }

        // keep the timer panel compact and centered
        let panel_width = 24.min(chunks[2].width);
        let panel_height = 5.min(chunks[2].height);
        let panel = Rect::new(
            chunks[2].x + (chunks[2].width - panel_width) / 2,
            chunks[2].y + (chunks[2].height - panel_height) / 2,
            panel_width,
            panel_height,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(run_border(countdown.run_state())))
            .style(
                Style::default()
                    .bg(phase_background(countdown.phase()))
                    .fg(Color::White),
            );

        Paragraph::new(vec![
            Line::from(Span::styled(countdown.phase().to_string(), bold_style)),
            Line::from(Span::styled(countdown.display(), bold_style)),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .render(panel, buf);

        let start_stop = if countdown.is_running() {
            "Pause"
        } else {
            "Start"
        };
        Paragraph::new(Span::styled(
            format!("(space) {start_stop} / (s)kip / (r)eset / (q)uit"),
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}
