use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState, FeedbackKind};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const MASK: char = '_';

/// Hides every occurrence of `word` in `sentence`, ignoring case.
pub fn mask_word(sentence: &str, word: &str) -> String {
    let word = word.trim();
    if word.is_empty() {
        return sentence.to_string();
    }
    let word_len = word.chars().count();

    // compare char by char so offsets always index `sentence` itself
    let mut masked = String::with_capacity(sentence.len());
    let mut rest = sentence;
    while let Some(c) = rest.chars().next() {
        if let Some(len) = match_len(rest, word) {
            masked.extend(std::iter::repeat(MASK).take(word_len));
            rest = &rest[len..];
        } else {
            masked.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    masked
}

/// Byte length of the prefix of `text` matching `word` case-insensitively.
fn match_len(text: &str, word: &str) -> Option<usize> {
    let mut end = 0;
    let mut chars = text.char_indices();
    for w in word.chars() {
        let (idx, c) = chars.next()?;
        if !c.to_lowercase().eq(w.to_lowercase()) {
            return None;
        }
        end = idx + c.len_utf8();
    }
    Some(end)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let block = Block::default()
            .borders(Borders::NONE)
            .title(Span::styled(format!(" spelldrill · {} ", self.state), dim_style))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let help = match self.state {
            AppState::Ready => "(enter) start  (esc) quit",
            AppState::Asking => "(enter) check  (tab) skip  (ctrl-r) hear again  (esc) quit",
            AppState::Results => "(r) practise again  (esc) quit",
        };
        Paragraph::new(Span::styled(help, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        if let Some(feedback) = &self.feedback {
            let color = match feedback.kind {
                FeedbackKind::Ok => Color::Green,
                FeedbackKind::Retry => Color::Red,
                FeedbackKind::Info => Color::Yellow,
            };
            Paragraph::new(Span::styled(
                feedback.text.as_str(),
                bold_style.fg(color),
            ))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
        }

        match self.state {
            AppState::Ready => {
                Paragraph::new(Span::styled("Press enter to start", bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);
            }
            AppState::Asking => {
                let progress = self.progress();
                Gauge::default()
                    .gauge_style(magenta_style)
                    .label(format!(
                        "{} / {} mastered",
                        progress.mastered_count, progress.total_count
                    ))
                    .percent(progress.percent().min(100))
                    .render(chunks[0], buf);

                // the scheduler has already moved on; keep the next word
                // hidden until the feedback pause ends
                if self.next_word.is_pending() {
                    return;
                }

                let mut prompt = vec![Line::from(Span::styled(
                    "Listen, then type the word",
                    dim_style,
                ))];
                if let Some(sentence) = self
                    .current_word()
                    .and_then(|entry| entry.sentence.as_deref().map(|s| mask_word(s, &entry.word)))
                {
                    prompt.push(Line::default());
                    prompt.push(Line::from(Span::styled(sentence, italic_style)));
                }
                Paragraph::new(prompt)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);

                let max_width = usize::from(chunks[4].width.saturating_sub(1));
                let shown = tail_fitting(&self.input, max_width);
                let input_line = Line::from(vec![
                    Span::styled(shown, bold_style),
                    Span::styled(
                        " ",
                        Style::default().add_modifier(Modifier::UNDERLINED | Modifier::SLOW_BLINK),
                    ),
                ]);
                Paragraph::new(input_line)
                    .alignment(Alignment::Center)
                    .render(chunks[4], buf);
            }
            AppState::Results => {
                let Some(stats) = self.final_stats() else {
                    return;
                };
                let lines = vec![
                    Line::from(Span::styled("Great job! You finished the list.", bold_style.fg(Color::Green))),
                    Line::default(),
                    Line::from(vec![
                        Span::styled("words ", dim_style),
                        Span::styled(stats.pool_size.to_string(), bold_style),
                    ]),
                    Line::from(vec![
                        Span::styled("attempts ", dim_style),
                        Span::styled(stats.total.to_string(), bold_style),
                    ]),
                    Line::from(vec![
                        Span::styled("first try ", dim_style),
                        Span::styled(
                            format!("{} / {}", stats.first_try_correct, stats.pool_size),
                            magenta_style.add_modifier(Modifier::BOLD),
                        ),
                    ]),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);
            }
        }
    }
}

/// Longest suffix of `text` that fits in `width` columns.
fn tail_fitting(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut start = text.len();
    let mut used = 0;
    for (idx, c) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}
