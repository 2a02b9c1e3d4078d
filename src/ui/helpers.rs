use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Render a proportional horizontal bar for the dashboard breakdown. Width is
/// scaled against the largest count so the longest bar always fills the slot.
pub(crate) fn count_bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count * width) + max - 1) / max;
    "█".repeat(filled.min(width))
}

/// Clip a string to `width` characters, appending an ellipsis when content was
/// lost. Counts chars, not bytes, so accented specialty names clip cleanly.
pub(crate) fn truncate_label(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }
    let mut clipped: String = chars[..width.saturating_sub(1)].iter().collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_against_the_maximum() {
        assert_eq!(count_bar(4, 4, 10).chars().count(), 10);
        assert_eq!(count_bar(2, 4, 10).chars().count(), 5);
        assert_eq!(count_bar(0, 4, 10), "");
        assert_eq!(count_bar(3, 0, 10), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_label("Cardiología", 20), "Cardiología");
        assert_eq!(truncate_label("Cardiología", 6), "Cardi…");
        assert_eq!(truncate_label("abc", 0), "");
    }
}
