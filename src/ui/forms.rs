use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::directory::{add_mutua, add_specialty};
use crate::models::{placeholder_avatar_url, Doctor};

/// Fields available within the doctor form, in focus order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DoctorField {
    Id,
    Name,
    Specialty,
    Room,
    Mutuas,
    Email,
    Phone,
    Avatar,
}

impl DoctorField {
    /// All fields in the order Tab walks them.
    pub(crate) const ORDER: [DoctorField; 8] = [
        DoctorField::Id,
        DoctorField::Name,
        DoctorField::Specialty,
        DoctorField::Room,
        DoctorField::Mutuas,
        DoctorField::Email,
        DoctorField::Phone,
        DoctorField::Avatar,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            DoctorField::Id => "ID profesional",
            DoctorField::Name => "Nombre completo",
            DoctorField::Specialty => "Especialidad",
            DoctorField::Room => "Sala",
            DoctorField::Mutuas => "Mutuas",
            DoctorField::Email => "Email",
            DoctorField::Phone => "Teléfono",
            DoctorField::Avatar => "Avatar URL",
        }
    }
}

/// Internal representation of the doctor create/edit form. Text fields are
/// held as raw strings until submission; the specialty is picked from the
/// current list with Left/Right rather than typed.
#[derive(Clone)]
pub(crate) struct DoctorForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) specialty: String,
    pub(crate) room: String,
    /// Chips already added to the doctor.
    pub(crate) mutuas: Vec<String>,
    /// Text being typed for the next mutua chip.
    pub(crate) mutua_input: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) avatar_url: String,
    /// Preserved across edits; new doctors start active.
    pub(crate) is_active: bool,
    pub(crate) active: DoctorField,
    /// Editing locks the id so it stays immutable after creation.
    pub(crate) id_locked: bool,
    pub(crate) error: Option<String>,
}

impl DoctorForm {
    /// Blank form for a new doctor, preselecting the first specialty so the
    /// picker never starts on an empty value when the list has entries.
    pub(crate) fn new(specialties: &[String]) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            specialty: specialties.first().cloned().unwrap_or_default(),
            room: String::new(),
            mutuas: Vec::new(),
            mutua_input: String::new(),
            email: String::new(),
            phone: String::new(),
            avatar_url: String::new(),
            is_active: true,
            active: DoctorField::Id,
            id_locked: false,
            error: None,
        }
    }

    /// Populate the form from an existing doctor when editing. Focus starts
    /// on the name because the id cannot change.
    pub(crate) fn from_doctor(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id.clone(),
            name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            room: doctor.room.clone(),
            mutuas: doctor.mutuas.clone(),
            mutua_input: String::new(),
            email: doctor.email.clone().unwrap_or_default(),
            phone: doctor.phone.clone().unwrap_or_default(),
            avatar_url: doctor.avatar_url.clone(),
            is_active: doctor.is_active,
            active: DoctorField::Name,
            id_locked: true,
            error: None,
        }
    }

    /// Move focus to the next field, skipping the locked id when editing.
    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    /// Move focus to the previous field.
    pub(crate) fn prev_field(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: isize) {
        let order = DoctorField::ORDER;
        let len = order.len() as isize;
        let mut index = order
            .iter()
            .position(|f| *f == self.active)
            .unwrap_or(0) as isize;
        loop {
            index = (index + delta).rem_euclid(len);
            let candidate = order[index as usize];
            if candidate == DoctorField::Id && self.id_locked {
                continue;
            }
            self.active = candidate;
            break;
        }
    }

    /// Append a character to the focused field. Returns false when the field
    /// is not text-editable (the specialty picker) so callers can beep or
    /// ignore.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            DoctorField::Id => {
                if self.id_locked {
                    return false;
                }
                self.id.push(ch);
                self.error = None;
            }
            DoctorField::Name => self.name.push(ch),
            DoctorField::Specialty => return false,
            DoctorField::Room => self.room.push(ch),
            DoctorField::Mutuas => self.mutua_input.push(ch),
            DoctorField::Email => self.email.push(ch),
            DoctorField::Phone => self.phone.push(ch),
            DoctorField::Avatar => self.avatar_url.push(ch),
        }
        true
    }

    /// Remove the last character from the focused field. On the mutuas field
    /// with no pending input, pop the most recent chip instead so Backspace
    /// stays useful.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            DoctorField::Id => {
                if !self.id_locked {
                    self.id.pop();
                }
            }
            DoctorField::Name => {
                self.name.pop();
            }
            DoctorField::Specialty => {}
            DoctorField::Room => {
                self.room.pop();
            }
            DoctorField::Mutuas => {
                if self.mutua_input.pop().is_none() {
                    self.mutuas.pop();
                }
            }
            DoctorField::Email => {
                self.email.pop();
            }
            DoctorField::Phone => {
                self.phone.pop();
            }
            DoctorField::Avatar => {
                self.avatar_url.pop();
            }
        }
    }

    /// Cycle the specialty picker. Only meaningful while that field has
    /// focus; when the current value is stale (removed from the list) the
    /// cycle restarts at the beginning.
    pub(crate) fn cycle_specialty(&mut self, specialties: &[String], delta: isize) {
        if self.active != DoctorField::Specialty || specialties.is_empty() {
            return;
        }
        let len = specialties.len() as isize;
        let next = match specialties.iter().position(|s| *s == self.specialty) {
            Some(index) => (index as isize + delta).rem_euclid(len),
            None => 0,
        };
        self.specialty = specialties[next as usize].clone();
    }

    /// Fold the pending mutua input into the chip list, ignoring blanks and
    /// duplicates.
    pub(crate) fn commit_mutua(&mut self) {
        if let Some(updated) = add_mutua(&self.mutuas, &self.mutua_input) {
            self.mutuas = updated;
        }
        self.mutua_input.clear();
    }

    /// Build the doctor record this form describes. Validation happens in the
    /// domain layer; this only trims and fills the avatar placeholder.
    pub(crate) fn to_doctor(&self) -> Doctor {
        let avatar_url = if self.avatar_url.trim().is_empty() {
            placeholder_avatar_url()
        } else {
            self.avatar_url.trim().to_string()
        };

        Doctor {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            specialty: self.specialty.clone(),
            room: self.room.trim().to_string(),
            mutuas: self.mutuas.clone(),
            email: optional(&self.email),
            phone: optional(&self.phone),
            avatar_url,
            is_active: self.is_active,
        }
    }

    /// Render one form line, highlighting the focused field.
    pub(crate) fn build_line(&self, field: DoctorField) -> Line<'static> {
        let is_active = self.active == field;
        let value = match field {
            DoctorField::Id => self.id.clone(),
            DoctorField::Name => self.name.clone(),
            DoctorField::Specialty => {
                if self.specialty.is_empty() {
                    String::new()
                } else {
                    format!("< {} >", self.specialty)
                }
            }
            DoctorField::Room => self.room.clone(),
            DoctorField::Mutuas => {
                let mut chips = self.mutuas.join(", ");
                if !self.mutua_input.is_empty() {
                    if !chips.is_empty() {
                        chips.push_str(", ");
                    }
                    chips.push_str(&self.mutua_input);
                    chips.push('_');
                }
                chips
            }
            DoctorField::Email => self.email.clone(),
            DoctorField::Phone => self.phone.clone(),
            DoctorField::Avatar => self.avatar_url.clone(),
        };

        let placeholder = match field {
            DoctorField::Id => "<requerido, p.ej. MED-001>",
            DoctorField::Name => "<requerido>",
            DoctorField::Specialty => "<sin especialidades>",
            DoctorField::Room => "<requerido>",
            DoctorField::Mutuas => "<escribe y pulsa Enter>",
            DoctorField::Avatar => "<se generará una imagen>",
            _ => "<opcional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else if field == DoctorField::Id && self.id_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }
}

/// Trim a free-text value into the optional shape the model wants.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// State of the specialty manager modal. Changes stay local to the form until
/// the user saves, matching the edit-then-save flow of the rest of the app.
#[derive(Clone)]
pub(crate) struct SpecialtyForm {
    pub(crate) entries: Vec<String>,
    pub(crate) input: String,
    pub(crate) selected: usize,
    pub(crate) notice: Option<String>,
}

impl SpecialtyForm {
    pub(crate) fn new(specialties: &[String]) -> Self {
        Self {
            entries: specialties.to_vec(),
            input: String::new(),
            selected: 0,
            notice: None,
        }
    }

    /// Append the typed name. Blanks and duplicates are ignored with a short
    /// notice instead of an error modal.
    pub(crate) fn add_entry(&mut self) {
        match add_specialty(&self.entries, &self.input) {
            Some(updated) => {
                self.entries = updated;
                self.selected = self.entries.len() - 1;
                self.input.clear();
                self.notice = None;
            }
            None => {
                if !self.input.trim().is_empty() {
                    self.notice = Some("Esa especialidad ya existe.".to_string());
                }
                self.input.clear();
            }
        }
    }

    /// Remove the highlighted entry in place, returning the removed name so
    /// the caller can warn when doctors still reference it.
    pub(crate) fn remove_selected(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let removed = self.entries.remove(self.selected);
        if self.selected >= self.entries.len() && self.selected > 0 {
            self.selected -= 1;
        }
        self.notice = None;
        Some(removed)
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let len = self.entries.len() as isize;
        let next = (self.selected as isize + delta).clamp(0, len - 1);
        self.selected = next as usize;
    }
}

/// Path prompt for the backup import flow.
#[derive(Clone, Default)]
pub(crate) struct ImportForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

/// Final confirmation before a restore overwrites everything. Carries the
/// already-validated bundle so saying yes cannot re-fail on format.
#[derive(Clone)]
pub(crate) struct ConfirmRestore {
    pub(crate) source: String,
    pub(crate) bundle: crate::models::BackupBundle,
}
