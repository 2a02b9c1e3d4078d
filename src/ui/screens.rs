use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::directory::{group_by_specialty, DashboardStats, DirectoryFilter};
use crate::models::Doctor;

use super::helpers::{count_bar, truncate_label};

/// One visual row of the directory listing. Headers are not selectable;
/// navigation skips over them.
pub(crate) enum DirectoryRow {
    Header { specialty: String, count: usize },
    Doctor(Doctor),
}

/// Flattened, filtered view of the doctor list grouped by specialty. Rebuilt
/// whenever the underlying data or the filter changes; selection is restored
/// by doctor id where possible so edits do not bounce the cursor.
pub(crate) struct DirectoryView {
    pub(crate) rows: Vec<DirectoryRow>,
    pub(crate) selected: Option<usize>,
}

impl DirectoryView {
    pub(crate) fn build(
        doctors: &[Doctor],
        specialties: &[String],
        filter: &DirectoryFilter,
    ) -> Self {
        let mut rows = Vec::new();
        for (specialty, members) in group_by_specialty(doctors, specialties, filter) {
            rows.push(DirectoryRow::Header {
                specialty,
                count: members.len(),
            });
            for doctor in members {
                rows.push(DirectoryRow::Doctor(doctor));
            }
        }

        let selected = rows
            .iter()
            .position(|row| matches!(row, DirectoryRow::Doctor(_)));
        Self { rows, selected }
    }

    /// The doctor under the cursor, if any row is selectable at all.
    pub(crate) fn current_doctor(&self) -> Option<&Doctor> {
        let index = self.selected?;
        match self.rows.get(index) {
            Some(DirectoryRow::Doctor(doctor)) => Some(doctor),
            _ => None,
        }
    }

    /// Move the cursor by `delta` selectable rows, clamping at the ends.
    pub(crate) fn move_selection(&mut self, delta: isize) {
        let selectable: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row, DirectoryRow::Doctor(_)))
            .map(|(index, _)| index)
            .collect();
        if selectable.is_empty() {
            self.selected = None;
            return;
        }

        let position = self
            .selected
            .and_then(|current| selectable.iter().position(|i| *i == current))
            .unwrap_or(0);
        let len = selectable.len() as isize;
        let next = (position as isize + delta).clamp(0, len - 1);
        self.selected = Some(selectable[next as usize]);
    }

    pub(crate) fn select_first(&mut self) {
        self.move_selection(isize::MIN / 2);
    }

    pub(crate) fn select_last(&mut self) {
        self.move_selection(isize::MAX / 2);
    }

    /// Put the cursor back on a doctor after a rebuild. Falls back to the
    /// first selectable row when the id vanished (filtered out or removed).
    pub(crate) fn select_doctor(&mut self, id: &str) {
        let found = self.rows.iter().position(
            |row| matches!(row, DirectoryRow::Doctor(doctor) if doctor.id == id),
        );
        match found {
            Some(index) => self.selected = Some(index),
            None => self.select_first(),
        }
    }

    /// Render the listing into `area`. Each doctor row shows status, name,
    /// specialty-room placement, and accepted mutuas.
    pub(crate) fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| match row {
                DirectoryRow::Header { specialty, count } => ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("── {} ", specialty.to_uppercase()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("({count})"), Style::default().fg(Color::DarkGray)),
                ])),
                DirectoryRow::Doctor(doctor) => {
                    let marker = if doctor.is_active { "●" } else { "○" };
                    let marker_style = if doctor.is_active {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    let name_style = if doctor.is_active {
                        Style::default()
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    let mutuas = if doctor.mutuas.is_empty() {
                        "Sin mutuas".to_string()
                    } else {
                        doctor.mutuas.join(", ")
                    };
                    let detail =
                        truncate_label(&format!("Sala {} · {}", doctor.room, mutuas), width);

                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(format!(" {marker} "), marker_style),
                            Span::styled(doctor.name.clone(), name_style),
                            Span::styled(
                                format!("  [{}]", doctor.id),
                                Style::default().fg(Color::DarkGray),
                            ),
                        ]),
                        Line::from(Span::styled(
                            format!("    {detail}"),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                }
            })
            .collect();

        let empty = items.is_empty();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Directorio Médico "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        state.select(self.selected);
        frame.render_stateful_widget(list, area, &mut state);

        if empty {
            let hint = Paragraph::new(
                "No se encontraron médicos.\nPrueba a cambiar los filtros o pulsa `i` para ver inactivos.",
            )
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
            let inner = Rect {
                x: area.x + 2,
                y: area.y + 2,
                width: area.width.saturating_sub(4),
                height: area.height.saturating_sub(4).min(4),
            };
            frame.render_widget(hint, inner);
        }
    }
}

/// Render the dashboard: headline counters plus an active-doctors-per-
/// specialty breakdown drawn as proportional text bars.
pub(crate) fn render_dashboard(frame: &mut Frame, area: Rect, stats: &DashboardStats) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let counters = Line::from(vec![
        Span::raw("  Total activos: "),
        Span::styled(
            stats.total_active.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Especialidades: "),
        Span::styled(
            stats.specialty_count.to_string(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(counters).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Resumen Centro "),
        ),
        sections[0],
    );

    let max = stats
        .per_specialty
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    let label_width = 18usize;
    let bar_width = (sections[1].width as usize)
        .saturating_sub(label_width + 10)
        .max(4);

    let items: Vec<ListItem> = if stats.per_specialty.is_empty() {
        vec![ListItem::new(Span::styled(
            "  No hay médicos activos.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        stats
            .per_specialty
            .iter()
            .map(|(specialty, count)| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!(
                        " {:<width$} ",
                        truncate_label(specialty, label_width),
                        width = label_width
                    )),
                    Span::styled(
                        count_bar(*count, max, bar_width),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(format!(" {count}"), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect()
    };

    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Médicos por Especialidad "),
        ),
        sections[1],
    );
}

/// Full-detail card for one doctor, rendered inside a modal.
pub(crate) fn detail_lines(doctor: &Doctor) -> Vec<Line<'static>> {
    let status = if doctor.is_active {
        Span::styled("Activo", Style::default().fg(Color::Green))
    } else {
        Span::styled("Deshabilitado", Style::default().fg(Color::Red))
    };

    let mutuas = if doctor.mutuas.is_empty() {
        "Sin mutuas".to_string()
    } else {
        doctor.mutuas.join(", ")
    };

    let mut lines = vec![
        Line::from(Span::styled(
            doctor.display_label(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::raw("Estado: "), status]),
        Line::from(format!("ID del sistema: {}", doctor.id)),
        Line::from(format!("Sala: {}", doctor.room)),
        Line::from(format!("Mutuas: {mutuas}")),
    ];

    if let Some(email) = &doctor.email {
        lines.push(Line::from(format!("Email: {email}")));
    }
    if let Some(phone) = &doctor.phone {
        lines.push(Line::from(format!("Teléfono: {phone}")));
    }

    lines.push(Line::from(Span::styled(
        format!("Avatar: {}", doctor.avatar_url),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "e editar · t habilitar/deshabilitar · o abrir avatar · Esc cerrar",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}
