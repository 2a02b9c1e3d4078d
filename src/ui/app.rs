use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{
    default_export_dir, export_backup, load_or_seed_doctors, load_or_seed_specialties,
    read_backup_file, restore_backup, save_doctors, save_specialties, Store,
};
use crate::directory::{
    specialties_in_use, toggle_active, upsert_doctor, validate_new, validate_update,
    DashboardStats, DirectoryFilter,
};
use crate::models::Doctor;

use super::forms::{ConfirmRestore, DoctorField, DoctorForm, ImportForm, SpecialtyForm};
use super::helpers::centered_rect;
use super::screens::{detail_lines, render_dashboard, DirectoryView};

/// Footer space reserved for key hints and status messages.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what keyboard shortcuts do.
enum Screen {
    Directory,
    Dashboard,
}

/// Fine-grained modes scoped on top of the current screen. Exactly one modal
/// interaction can be active at a time, which is how the app serializes
/// mutations: each save completes (or fails visibly) before the next one can
/// start.
enum Mode {
    Normal,
    Searching,
    Viewing { id: String },
    CreatingDoctor(DoctorForm),
    EditingDoctor(DoctorForm),
    ManagingSpecialties(SpecialtyForm),
    ConfirmExport { dir: PathBuf },
    EnteringImportPath(ImportForm),
    ConfirmRestore(ConfirmRestore),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the store handle and
/// the in-memory lists; every mutation computes a new list through the pure
/// directory functions, persists it, and only then swaps it in.
pub struct App {
    store: Store,
    doctors: Vec<Doctor>,
    specialties: Vec<String>,
    filter: DirectoryFilter,
    view: DirectoryView,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store, doctors: Vec<Doctor>, specialties: Vec<String>) -> Self {
        let filter = DirectoryFilter::default();
        let view = DirectoryView::build(&doctors, &specialties, &filter);
        Self {
            store,
            doctors,
            specialties,
            filter,
            view,
            screen: Screen::Directory,
            mode: Mode::Normal,
            status: None,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Rebuild the listing after data or filter changes, keeping the cursor
    /// on `keep` when that doctor is still visible.
    fn rebuild_view(&mut self, keep: Option<&str>) {
        self.view = DirectoryView::build(&self.doctors, &self.specialties, &self.filter);
        if let Some(id) = keep {
            self.view.select_doctor(id);
        }
    }

    /// Persist a new doctor list and, on success, make it the current state.
    /// On failure the previous list stays in place and the user gets a
    /// blocking notice; there is no retry.
    fn commit_doctors(&mut self, updated: Vec<Doctor>, keep: Option<&str>) -> bool {
        match save_doctors(&self.store, &updated) {
            Ok(()) => {
                self.doctors = updated;
                self.rebuild_view(keep);
                true
            }
            Err(err) => {
                self.set_status(format!("No se pudo guardar: {err}"), StatusKind::Error);
                false
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching => self.handle_search(code),
            Mode::Viewing { id } => self.handle_viewing(code, id),
            Mode::CreatingDoctor(form) => self.handle_doctor_form(code, form, false),
            Mode::EditingDoctor(form) => self.handle_doctor_form(code, form, true),
            Mode::ManagingSpecialties(form) => self.handle_specialty_manager(code, form),
            Mode::ConfirmExport { dir } => self.handle_confirm_export(code, dir),
            Mode::EnteringImportPath(form) => self.handle_import_path(code, form),
            Mode::ConfirmRestore(confirm) => self.handle_confirm_restore(code, confirm),
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Directory => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                }
                KeyCode::Up => self.view.move_selection(-1),
                KeyCode::Down => self.view.move_selection(1),
                KeyCode::PageUp => self.view.move_selection(-5),
                KeyCode::PageDown => self.view.move_selection(5),
                KeyCode::Home => self.view.select_first(),
                KeyCode::End => self.view.select_last(),
                KeyCode::Enter => {
                    if let Some(doctor) = self.view.current_doctor() {
                        let id = doctor.id.clone();
                        self.clear_status();
                        return Ok(Mode::Viewing { id });
                    }
                    self.set_status("No hay ningún médico seleccionado.", StatusKind::Error);
                }
                KeyCode::Char('/') | KeyCode::Char('f') => {
                    self.clear_status();
                    return Ok(Mode::Searching);
                }
                KeyCode::Tab => self.cycle_specialty_filter(1),
                KeyCode::BackTab => self.cycle_specialty_filter(-1),
                KeyCode::Char('i') | KeyCode::Char('I') => {
                    self.filter.show_disabled = !self.filter.show_disabled;
                    let keep = self.view.current_doctor().map(|d| d.id.clone());
                    self.rebuild_view(keep.as_deref());
                }
                KeyCode::Char('+') | KeyCode::Char('n') => {
                    self.clear_status();
                    return Ok(Mode::CreatingDoctor(DoctorForm::new(&self.specialties)));
                }
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    if let Some(doctor) = self.view.current_doctor() {
                        let form = DoctorForm::from_doctor(doctor);
                        self.clear_status();
                        return Ok(Mode::EditingDoctor(form));
                    }
                    self.set_status("No hay ningún médico que editar.", StatusKind::Error);
                }
                KeyCode::Char('t') | KeyCode::Char(' ') => {
                    if let Some(doctor) = self.view.current_doctor() {
                        let id = doctor.id.clone();
                        self.toggle_doctor(&id);
                    } else {
                        self.set_status("No hay ningún médico seleccionado.", StatusKind::Error);
                    }
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.clear_status();
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    self.clear_status();
                    return Ok(Mode::ManagingSpecialties(SpecialtyForm::new(
                        &self.specialties,
                    )));
                }
                KeyCode::Char('x') | KeyCode::Char('X') => match default_export_dir() {
                    Some(dir) => {
                        self.clear_status();
                        return Ok(Mode::ConfirmExport { dir });
                    }
                    None => {
                        self.set_status(
                            "No se pudo determinar una carpeta de exportación.",
                            StatusKind::Error,
                        );
                    }
                },
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    self.clear_status();
                    return Ok(Mode::EnteringImportPath(ImportForm::default()));
                }
                _ => {}
            },
            Screen::Dashboard => match code {
                KeyCode::Char('q') => {
                    *exit = true;
                }
                KeyCode::Esc | KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.clear_status();
                    self.screen = Screen::Directory;
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    self.clear_status();
                    return Ok(Mode::ManagingSpecialties(SpecialtyForm::new(
                        &self.specialties,
                    )));
                }
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    /// Flip one doctor's active flag and persist the whole list. Used from
    /// both the listing and the detail modal.
    fn toggle_doctor(&mut self, id: &str) {
        let Some((updated, toggled)) = toggle_active(&self.doctors, id) else {
            self.set_status("Médico no encontrado.", StatusKind::Error);
            return;
        };
        if self.commit_doctors(updated, Some(id)) {
            let verb = if toggled.is_active {
                "habilitado"
            } else {
                "deshabilitado"
            };
            self.set_status(format!("{} {verb}.", toggled.name), StatusKind::Info);
        }
    }

    /// Walk the specialty filter through "all" plus each known specialty.
    fn cycle_specialty_filter(&mut self, delta: isize) {
        if self.specialties.is_empty() {
            return;
        }
        let len = self.specialties.len() as isize;
        let current = self
            .filter
            .specialty
            .as_ref()
            .and_then(|name| self.specialties.iter().position(|s| s == name))
            .map(|index| index as isize);
        // Positions: -1 is "all", 0..len are the specialties.
        let next = (current.unwrap_or(-1) + 1 + delta).rem_euclid(len + 1) - 1;
        self.filter.specialty = if next < 0 {
            None
        } else {
            Some(self.specialties[next as usize].clone())
        };
        self.rebuild_view(None);
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => {
                self.filter.query.clear();
                self.rebuild_view(None);
                Mode::Normal
            }
            KeyCode::Enter => Mode::Normal,
            KeyCode::Backspace => {
                self.filter.query.pop();
                self.rebuild_view(None);
                Mode::Searching
            }
            KeyCode::Char(ch) => {
                self.filter.query.push(ch);
                self.rebuild_view(None);
                Mode::Searching
            }
            _ => Mode::Searching,
        }
    }

    fn handle_viewing(&mut self, code: KeyCode, id: String) -> Mode {
        let Some(doctor) = self.doctors.iter().find(|d| d.id == id).cloned() else {
            return Mode::Normal;
        };

        match code {
            KeyCode::Esc | KeyCode::Char('q') => Mode::Normal,
            KeyCode::Char('e') | KeyCode::Char('E') => {
                Mode::EditingDoctor(DoctorForm::from_doctor(&doctor))
            }
            KeyCode::Char('t') | KeyCode::Char(' ') => {
                self.toggle_doctor(&id);
                Mode::Viewing { id }
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let url = doctor.avatar_url.trim().to_string();
                if !url.starts_with("http") {
                    self.set_status(
                        "El avatar no es un enlace que se pueda abrir.",
                        StatusKind::Error,
                    );
                } else if let Err(err) = open_link(&url) {
                    self.set_status(format!("No se pudo abrir el avatar: {err}"), StatusKind::Error);
                } else {
                    self.set_status("Avatar abierto en el navegador.", StatusKind::Info);
                }
                Mode::Viewing { id }
            }
            _ => Mode::Viewing { id },
        }
    }

    fn handle_doctor_form(&mut self, code: KeyCode, mut form: DoctorForm, editing: bool) -> Mode {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                if editing {
                    return Mode::Viewing { id: form.id };
                }
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.cycle_specialty(&self.specialties, -1),
            KeyCode::Right => form.cycle_specialty(&self.specialties, 1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                // Enter on the mutuas field commits the pending chip; from
                // anywhere else it submits the form.
                if form.active == DoctorField::Mutuas && !form.mutua_input.is_empty() {
                    form.commit_mutua();
                    return wrap_form(form, editing);
                }
                return self.submit_doctor_form(form, editing);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        wrap_form(form, editing)
    }

    fn submit_doctor_form(&mut self, mut form: DoctorForm, editing: bool) -> Mode {
        form.commit_mutua();
        let draft = form.to_doctor();

        let validation = if editing {
            validate_update(&draft)
        } else {
            validate_new(&self.doctors, &draft)
        };
        if let Err(err) = validation {
            form.error = Some(err.to_string());
            return wrap_form(form, editing);
        }

        let id = draft.id.clone();
        let updated = upsert_doctor(&self.doctors, draft);
        if !self.commit_doctors(updated, Some(&id)) {
            // Keep the form open so nothing the user typed is lost.
            return wrap_form(form, editing);
        }

        if editing {
            self.set_status("Cambios guardados.", StatusKind::Info);
            Mode::Viewing { id }
        } else {
            self.set_status("Médico creado.", StatusKind::Info);
            Mode::Normal
        }
    }

    fn handle_specialty_manager(&mut self, code: KeyCode, mut form: SpecialtyForm) -> Mode {
        match code {
            KeyCode::Esc => {
                // Esc saves and closes; the form already holds the edited
                // list, so this is the single full-overwrite write.
                match save_specialties(&self.store, &form.entries) {
                    Ok(()) => {
                        self.specialties = form.entries;
                        if let Some(selected) = &self.filter.specialty {
                            if !self.specialties.contains(selected) {
                                self.filter.specialty = None;
                            }
                        }
                        self.rebuild_view(None);
                        self.set_status("Especialidades guardadas.", StatusKind::Info);
                        Mode::Normal
                    }
                    Err(err) => {
                        form.notice = Some(format!("No se pudo guardar: {err}"));
                        Mode::ManagingSpecialties(form)
                    }
                }
            }
            KeyCode::Enter => {
                form.add_entry();
                Mode::ManagingSpecialties(form)
            }
            KeyCode::Up => {
                form.move_selection(-1);
                Mode::ManagingSpecialties(form)
            }
            KeyCode::Down => {
                form.move_selection(1);
                Mode::ManagingSpecialties(form)
            }
            KeyCode::Delete => {
                if let Some(removed) = form.remove_selected() {
                    if specialties_in_use(&self.doctors).contains(&removed) {
                        form.notice = Some(format!(
                            "Aviso: hay médicos con la especialidad {removed}."
                        ));
                    }
                }
                Mode::ManagingSpecialties(form)
            }
            KeyCode::Backspace => {
                form.input.pop();
                Mode::ManagingSpecialties(form)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                form.input.push(ch);
                Mode::ManagingSpecialties(form)
            }
            _ => Mode::ManagingSpecialties(form),
        }
    }

    fn handle_confirm_export(&mut self, code: KeyCode, dir: PathBuf) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match export_backup(&self.store, &dir) {
                    Ok(path) => self.set_status(
                        format!("Copia guardada en {}.", path.display()),
                        StatusKind::Info,
                    ),
                    Err(err) => {
                        self.set_status(format!("Error al exportar: {err}"), StatusKind::Error)
                    }
                }
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmExport { dir },
        }
    }

    fn handle_import_path(&mut self, code: KeyCode, mut form: ImportForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                let path = PathBuf::from(form.path.trim());
                match read_backup_file(&path) {
                    Ok(bundle) => Mode::ConfirmRestore(ConfirmRestore {
                        source: path.display().to_string(),
                        bundle,
                    }),
                    Err(err) => {
                        form.error = Some(err.to_string());
                        Mode::EnteringImportPath(form)
                    }
                }
            }
            KeyCode::Backspace => {
                form.path.pop();
                form.error = None;
                Mode::EnteringImportPath(form)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                form.path.push(ch);
                form.error = None;
                Mode::EnteringImportPath(form)
            }
            _ => Mode::EnteringImportPath(form),
        }
    }

    fn handle_confirm_restore(&mut self, code: KeyCode, confirm: ConfirmRestore) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match restore_backup(&self.store, &confirm.bundle) {
                    Ok(()) => {
                        // Reload through the normal loaders so the in-memory
                        // state reflects exactly what got stored.
                        self.doctors = load_or_seed_doctors(&self.store);
                        self.specialties = load_or_seed_specialties(&self.store);
                        self.filter = DirectoryFilter::default();
                        self.rebuild_view(None);
                        self.set_status(
                            format!(
                                "Copia restaurada: {} médicos, {} especialidades.",
                                self.doctors.len(),
                                self.specialties.len()
                            ),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.set_status(format!("Error al importar: {err}"), StatusKind::Error)
                    }
                }
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmRestore(confirm),
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Directory => self.view.render(frame, chunks[1]),
            Screen::Dashboard => {
                let stats = DashboardStats::compute(&self.doctors);
                render_dashboard(frame, chunks[1], &stats);
            }
        }
        self.draw_footer(frame, chunks[2]);
        self.draw_modal(frame);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let title = match self.screen {
            Screen::Directory => "CliniGest · Directorio Médico",
            Screen::Dashboard => "CliniGest · Resumen Centro",
        };

        let mut filters = Vec::new();
        if !self.filter.query.is_empty() {
            filters.push(format!("buscar: \"{}\"", self.filter.query));
        }
        filters.push(match &self.filter.specialty {
            Some(name) => format!("especialidad: {name}"),
            None => "especialidad: todas".to_string(),
        });
        if self.filter.show_disabled {
            filters.push("mostrando inactivos".to_string());
        }

        let lines = vec![
            Line::from(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                filters.join(" · "),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = match (&self.screen, &self.mode) {
            (_, Mode::Searching) => "Escribe para filtrar · Enter aceptar · Esc limpiar",
            (_, Mode::Viewing { .. }) => "e editar · t estado · o abrir avatar · Esc cerrar",
            (_, Mode::CreatingDoctor(_)) | (_, Mode::EditingDoctor(_)) => {
                "Tab campo · ←→ especialidad · Enter guardar · Esc cancelar"
            }
            (_, Mode::ManagingSpecialties(_)) => {
                "Enter añadir · ↑↓ elegir · Supr borrar · Esc guardar y cerrar"
            }
            (_, Mode::ConfirmExport { .. }) | (_, Mode::ConfirmRestore(_)) => {
                "y confirmar · n cancelar"
            }
            (_, Mode::EnteringImportPath(_)) => "Escribe la ruta · Enter validar · Esc cancelar",
            (Screen::Directory, Mode::Normal) => {
                "↑↓ navegar · Enter ficha · + nuevo · e editar · t estado · / buscar · Tab filtro · i inactivos · d resumen · s especialidades · x exportar · m importar · q salir"
            }
            (Screen::Dashboard, Mode::Normal) => "Esc volver · s especialidades · q salir",
        };

        let mut lines = vec![Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        ))];
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::TOP)),
            area,
        );
    }

    fn draw_modal(&self, frame: &mut Frame) {
        match &self.mode {
            Mode::Normal => {}
            Mode::Searching => {
                let area = centered_rect(50, 12, frame.area());
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new(format!("{}_", self.filter.query))
                        .block(Block::default().borders(Borders::ALL).title(" Buscar ")),
                    area,
                );
            }
            Mode::Viewing { id } => {
                if let Some(doctor) = self.doctors.iter().find(|d| d.id == *id) {
                    let area = centered_rect(60, 60, frame.area());
                    frame.render_widget(Clear, area);
                    frame.render_widget(
                        Paragraph::new(detail_lines(doctor))
                            .wrap(Wrap { trim: true })
                            .block(Block::default().borders(Borders::ALL).title(" Ficha ")),
                        area,
                    );
                }
            }
            Mode::CreatingDoctor(form) | Mode::EditingDoctor(form) => {
                let title = if form.id_locked {
                    " Editar Médico "
                } else {
                    " Registrar Nuevo Médico "
                };
                let mut lines: Vec<Line> = DoctorField::ORDER
                    .iter()
                    .map(|field| form.build_line(*field))
                    .collect();
                if let Some(error) = &form.error {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        error.clone(),
                        Style::default().fg(Color::Red),
                    )));
                }

                let area = centered_rect(70, 60, frame.area());
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new(lines)
                        .wrap(Wrap { trim: true })
                        .block(Block::default().borders(Borders::ALL).title(title)),
                    area,
                );
            }
            Mode::ManagingSpecialties(form) => {
                let area = centered_rect(50, 70, frame.area());
                frame.render_widget(Clear, area);

                let sections = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ])
                    .split(area);

                frame.render_widget(
                    Paragraph::new(format!("{}_", form.input)).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(" Nueva especialidad "),
                    ),
                    sections[0],
                );

                let items: Vec<ListItem> = form
                    .entries
                    .iter()
                    .map(|name| ListItem::new(format!(" {name}")))
                    .collect();
                let mut state = ListState::default();
                if !form.entries.is_empty() {
                    state.select(Some(form.selected));
                }
                frame.render_stateful_widget(
                    List::new(items)
                        .block(
                            Block::default()
                                .borders(Borders::ALL)
                                .title(" Especialidades "),
                        )
                        .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
                    sections[1],
                    &mut state,
                );

                if let Some(notice) = &form.notice {
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            notice.clone(),
                            Style::default().fg(Color::Yellow),
                        )),
                        sections[2],
                    );
                }
            }
            Mode::ConfirmExport { dir } => {
                let area = centered_rect(60, 20, frame.area());
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new(format!(
                        "Exportar la copia de seguridad a\n{}\n\n¿Continuar? (y/n)",
                        dir.display()
                    ))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).title(" Exportar ")),
                    area,
                );
            }
            Mode::EnteringImportPath(form) => {
                let area = centered_rect(70, 25, frame.area());
                frame.render_widget(Clear, area);
                let mut lines = vec![
                    Line::from("Ruta del archivo de copia (.json):"),
                    Line::from(format!("{}_", form.path)),
                ];
                if let Some(error) = &form.error {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        error.clone(),
                        Style::default().fg(Color::Red),
                    )));
                }
                frame.render_widget(
                    Paragraph::new(lines)
                        .wrap(Wrap { trim: true })
                        .block(Block::default().borders(Borders::ALL).title(" Importar ")),
                    area,
                );
            }
            Mode::ConfirmRestore(confirm) => {
                let area = centered_rect(60, 25, frame.area());
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new(format!(
                        "Restaurar {} médicos y {} especialidades desde\n{}\n\nEsto reemplaza TODOS los datos actuales. ¿Continuar? (y/n)",
                        confirm.bundle.doctors.len(),
                        confirm.bundle.specialties.len(),
                        confirm.source
                    ))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).title(" Restaurar ")),
                    area,
                );
            }
        }
    }
}

/// Re-wrap a doctor form into the mode it came from.
fn wrap_form(form: DoctorForm, editing: bool) -> Mode {
    if editing {
        Mode::EditingDoctor(form)
    } else {
        Mode::CreatingDoctor(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{default_doctors, default_specialties, load_or_seed_doctors};

    fn temp_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::open_at(&dir.path().join("store.sqlite")).expect("open store");
        let doctors = load_or_seed_doctors(&store);
        let specialties = crate::db::load_or_seed_specialties(&store);
        (dir, App::new(store, doctors, specialties))
    }

    #[test]
    fn toggle_from_the_listing_persists_each_flip() {
        let (_dir, mut app) = temp_app();
        app.view.select_doctor("DOC-001");

        app.handle_key(KeyCode::Char('t')).expect("toggle off");
        let stored = load_or_seed_doctors(&app.store);
        assert!(!stored.iter().find(|d| d.id == "DOC-001").unwrap().is_active);

        // The doctor is now hidden by the default filter; flip visibility on
        // and toggle back.
        app.handle_key(KeyCode::Char('i')).expect("show disabled");
        app.view.select_doctor("DOC-001");
        app.handle_key(KeyCode::Char('t')).expect("toggle on");
        let stored = load_or_seed_doctors(&app.store);
        assert_eq!(stored, default_doctors());
    }

    #[test]
    fn creating_a_doctor_with_duplicate_id_shows_inline_error() {
        let (_dir, mut app) = temp_app();

        app.handle_key(KeyCode::Char('+')).expect("open form");
        for ch in "DOC-001".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type id");
        }
        app.handle_key(KeyCode::Tab).expect("to name");
        for ch in "Dr. Duplicado".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type name");
        }
        app.handle_key(KeyCode::Tab).expect("to specialty");
        app.handle_key(KeyCode::Tab).expect("to room");
        app.handle_key(KeyCode::Char('9')).expect("type room");
        app.handle_key(KeyCode::Enter).expect("submit");

        match &app.mode {
            Mode::CreatingDoctor(form) => {
                assert!(form.error.as_deref().unwrap_or("").contains("DOC-001"));
            }
            _ => panic!("form should stay open on validation failure"),
        }
        // Nothing reached storage.
        assert_eq!(load_or_seed_doctors(&app.store), default_doctors());
    }

    #[test]
    fn creating_a_valid_doctor_saves_the_full_list() {
        let (_dir, mut app) = temp_app();

        app.handle_key(KeyCode::Char('+')).expect("open form");
        for ch in "DOC-010".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type id");
        }
        app.handle_key(KeyCode::Tab).expect("to name");
        for ch in "Dra. Nueva".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type name");
        }
        app.handle_key(KeyCode::Tab).expect("to specialty");
        app.handle_key(KeyCode::Right).expect("cycle specialty");
        app.handle_key(KeyCode::Tab).expect("to room");
        app.handle_key(KeyCode::Char('5')).expect("type room");
        app.handle_key(KeyCode::Enter).expect("submit");

        assert!(matches!(app.mode, Mode::Normal));
        let stored = load_or_seed_doctors(&app.store);
        assert_eq!(stored.len(), 3);
        let created = stored.iter().find(|d| d.id == "DOC-010").expect("created");
        assert_eq!(created.name, "Dra. Nueva");
        assert_eq!(created.specialty, "Pediatría");
        assert!(created.avatar_url.starts_with("https://picsum.photos/"));
    }

    #[test]
    fn specialty_manager_saves_on_close() {
        let (_dir, mut app) = temp_app();

        app.handle_key(KeyCode::Char('s')).expect("open manager");
        for ch in "Oncología".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type name");
        }
        app.handle_key(KeyCode::Enter).expect("add");
        app.handle_key(KeyCode::Esc).expect("save and close");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.specialties.len(), 10);
        assert_eq!(
            crate::db::load_or_seed_specialties(&app.store),
            app.specialties
        );
        assert_eq!(app.specialties.last().map(String::as_str), Some("Oncología"));
    }

    #[test]
    fn search_filters_live_and_esc_clears() {
        let (_dir, mut app) = temp_app();

        app.handle_key(KeyCode::Char('/')).expect("enter search");
        for ch in "elena".chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type query");
        }
        assert_eq!(
            app.view.current_doctor().map(|d| d.id.clone()),
            Some("DOC-002".to_string())
        );
        assert_eq!(app.view.rows.len(), 2);

        app.handle_key(KeyCode::Esc).expect("clear search");
        assert!(app.filter.query.is_empty());
        assert_eq!(app.view.rows.len(), 4);
    }

    #[test]
    fn import_flow_rejects_invalid_files_without_touching_data() {
        let (dir, mut app) = temp_app();
        let bad_path = dir.path().join("bad.json");
        std::fs::write(&bad_path, r#"{"specialties": []}"#).expect("write bad file");

        app.handle_key(KeyCode::Char('m')).expect("open import");
        for ch in bad_path.display().to_string().chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type path");
        }
        app.handle_key(KeyCode::Enter).expect("validate");

        match &app.mode {
            Mode::EnteringImportPath(form) => {
                assert!(form.error.as_deref().unwrap_or("").contains("doctors"));
            }
            _ => panic!("invalid file should keep the path prompt open"),
        }
        assert_eq!(load_or_seed_doctors(&app.store), default_doctors());
        assert_eq!(
            crate::db::load_or_seed_specialties(&app.store),
            default_specialties()
        );
    }

    #[test]
    fn export_then_import_round_trips_through_the_confirm_flow() {
        let (dir, mut app) = temp_app();
        let export_path =
            crate::db::export_backup(&app.store, dir.path()).expect("export backup");

        app.handle_key(KeyCode::Char('m')).expect("open import");
        for ch in export_path.display().to_string().chars() {
            app.handle_key(KeyCode::Char(ch)).expect("type path");
        }
        app.handle_key(KeyCode::Enter).expect("validate");
        assert!(matches!(app.mode, Mode::ConfirmRestore(_)));

        app.handle_key(KeyCode::Char('y')).expect("confirm");
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.doctors, default_doctors());
        assert_eq!(app.specialties, default_specialties());
    }
}
