use std::borrow::Cow;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// One `[key] label` entry in the action bar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionHint {
    pub key: Cow<'static, str>,
    pub label: Cow<'static, str>,
    /// Lower priorities are dropped first when space runs out
    pub priority: u8,
}

impl ActionHint {
    pub fn new(key: impl Into<Cow<'static, str>>, label: impl Into<Cow<'static, str>>, priority: u8) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            priority,
        }
    }

    /// Rendered width: `[key] label`
    fn width(&self) -> usize {
        let key = self.key.chars().count() + 2;
        if self.label.is_empty() {
            key
        } else {
            key + 1 + self.label.chars().count()
        }
    }
}

/// Hints in display order, highest priority first.
pub fn ordered_hints(items: &[(&'static str, &'static str)]) -> Vec<ActionHint> {
    let mut priority: u8 = 100;
    items
        .iter()
        .map(|(key, label)| {
            let hint = ActionHint::new(*key, *label, priority);
            priority = priority.saturating_sub(5).max(1);
            hint
        })
        .collect()
}

const GAP_WIDTH: usize = 2;
const MORE_INDICATOR: &str = "…";

/// Indices of the hints that fit on one line of `width` columns, in their
/// original order, and whether any were dropped.
fn fit_hints(hints: &[ActionHint], width: usize) -> (Vec<usize>, bool) {
    let mut active: Vec<usize> = (0..hints.len()).collect();
    let mut dropped = false;

    loop {
        let mut used: usize = active.iter().map(|&idx| hints[idx].width()).sum();
        used += GAP_WIDTH * active.len().saturating_sub(1);
        if dropped {
            used += GAP_WIDTH + MORE_INDICATOR.chars().count();
        }
        if used <= width || active.is_empty() {
            return (active, dropped);
        }

        // Drop the lowest priority; among equals, the last one.
        let drop_pos = active
            .iter()
            .enumerate()
            .min_by_key(|(_, idx)| (hints[**idx].priority, std::cmp::Reverse(**idx)))
            .map(|(pos, _)| pos)
            .unwrap_or(0);
        active.remove(drop_pos);
        dropped = true;
    }
}

/// Render hints centred under a top border.
pub fn render_action_bar(frame: &mut Frame, area: Rect, hints: &[ActionHint]) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let (shown, dropped) = fit_hints(hints, inner.width as usize);
    let mut spans = Vec::new();
    for (n, idx) in shown.iter().enumerate() {
        if n > 0 {
            spans.push(Span::raw("  "));
        }
        let hint = &hints[*idx];
        spans.push(Span::styled(
            format!("[{}]", hint.key),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        if !hint.label.is_empty() {
            spans.push(Span::raw(" "));
            spans.push(Span::raw(hint.label.clone()));
        }
    }
    if dropped {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(MORE_INDICATOR, Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<ActionHint> {
        ordered_hints(&[("Enter", "Select"), ("↑/↓", "Move"), ("Ctrl+U", "Clear"), ("Esc", "Cancel")])
    }

    #[test]
    fn test_everything_fits_when_wide() {
        let (shown, dropped) = fit_hints(&hints(), 200);
        assert_eq!(shown, vec![0, 1, 2, 3]);
        assert!(!dropped);
    }

    #[test]
    fn test_lowest_priority_dropped_first() {
        let hints = hints();
        // "[Enter] Select" + "[↑/↓] Move" + "[Ctrl+U] Clear" + 3 gaps + "…"
        let width = 14 + 10 + 14 + 3 * GAP_WIDTH + 1;
        let (shown, dropped) = fit_hints(&hints, width);
        assert_eq!(shown, vec![0, 1, 2]);
        assert!(dropped);
    }

    #[test]
    fn test_nothing_fits() {
        let (shown, dropped) = fit_hints(&hints(), 0);
        assert!(shown.is_empty());
        assert!(dropped);
    }

    #[test]
    fn test_ordered_hints_priorities_descend() {
        let hints = hints();
        assert!(hints.windows(2).all(|w| w[0].priority > w[1].priority));
    }
}
