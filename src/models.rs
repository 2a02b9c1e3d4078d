//! Domain models that mirror the records kept in the local store and get
//! passed throughout the TUI. The intent is that these types stay light-weight
//! data holders so other layers can focus on presentation and persistence
//! logic. Field names are renamed to camelCase on the wire so backup files
//! stay readable by (and compatible with) other consumers of the format.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One medical professional in the clinic directory. The struct is the full
/// unit of persistence: every edit rewrites the whole doctor list, so there is
/// no notion of a partially loaded record.
pub struct Doctor {
    /// User-assigned identifier (e.g. `DOC-001`). Uniqueness is checked
    /// against the in-memory list at creation time and the id is locked once
    /// the record exists; edit flows carry it back unchanged.
    pub id: String,
    /// Full display name, required.
    pub name: String,
    /// Specialty label. Conventionally one of the entries in the specialty
    /// list, but linked by string equality only.
    #[serde(default)]
    pub specialty: String,
    /// Room label shown next to the doctor. Kept as text because rooms are
    /// not necessarily numeric ("2B", "Anexo").
    #[serde(default)]
    pub room: String,
    /// Accepted insurers. Unique within the doctor, order not meaningful.
    #[serde(default)]
    pub mutuas: Vec<String>,
    /// Optional contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Optional contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Avatar URL or embedded image data. A placeholder is generated when the
    /// form leaves it blank so list views always have something to show.
    #[serde(default)]
    pub avatar_url: String,
    /// Toggling this hides the doctor from the default listing; the record is
    /// never deleted by the toggle.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Doctors imported from older backups that predate the status flag are
/// treated as active.
fn default_active() -> bool {
    true
}

impl Doctor {
    /// Compose a `Name - Specialty` string that gracefully omits the hyphen
    /// when the specialty is blank. List rows and the detail header rely on
    /// this ready-to-use formatting.
    pub fn display_label(&self) -> String {
        if self.specialty.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.specialty)
        }
    }
}

impl fmt::Display for Doctor {
    /// Write the doctor name to any formatter so the type plays nicely with
    /// Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Generate the placeholder avatar used when a doctor is saved without an
/// image. The millisecond suffix keeps placeholders visually distinct between
/// doctors, matching the URLs the built-in sample records use.
pub fn placeholder_avatar_url() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("https://picsum.photos/100/100?random={millis}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Appointment record retained solely so backup bundles keep their
/// `appointments` placeholder readable. Nothing persists or schedules these;
/// the agenda feature was dropped before it was ever wired to storage.
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutua: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Snapshot of the full dataset used by export and import. `specialties` and
/// `appointments` default to empty so bundles produced by minimal exporters
/// still parse; extra fields in the document are ignored.
pub struct BackupBundle {
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Always empty today. Kept in the format for forward compatibility.
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}
