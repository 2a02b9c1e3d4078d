//! Pure directory logic: filtering, grouping, statistics, validation, and
//! list mutations. Every function here takes the current lists by reference
//! and returns new values; the caller owns the state and decides when to
//! persist. Keeping this layer free of I/O is what lets the UI serialize
//! mutations as "compute new list, save it, then swap it in".

use std::collections::HashSet;

use thiserror::Error;

use crate::models::Doctor;

/// Problems with a doctor record as entered in the form. These block
/// submission and never reach storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("El ID profesional es obligatorio.")]
    MissingId,
    #[error("El nombre es obligatorio.")]
    MissingName,
    #[error("La sala es obligatoria.")]
    MissingRoom,
    #[error("Selecciona una especialidad.")]
    MissingSpecialty,
    #[error("El ID `{0}` ya existe. Usa un ID único.")]
    DuplicateId(String),
}

/// Active criteria of the directory listing.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilter {
    /// Free-text search matched against name, id, room, and mutuas.
    pub query: String,
    /// When set, only doctors with exactly this specialty are listed.
    pub specialty: Option<String>,
    /// Inactive doctors are hidden unless this is on.
    pub show_disabled: bool,
}

impl DirectoryFilter {
    /// Whether a doctor passes the current criteria. Matching is
    /// case-insensitive and substring based, like the original search box.
    pub fn matches(&self, doctor: &Doctor) -> bool {
        if !doctor.is_active && !self.show_disabled {
            return false;
        }

        if let Some(specialty) = &self.specialty {
            if &doctor.specialty != specialty {
                return false;
            }
        }

        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        doctor.name.to_lowercase().contains(&query)
            || doctor.id.to_lowercase().contains(&query)
            || doctor.room.to_lowercase().contains(&query)
            || doctor
                .mutuas
                .iter()
                .any(|mutua| mutua.to_lowercase().contains(&query))
    }
}

/// Filter the doctor list and group the survivors by specialty. Groups come
/// out in specialty-list order; specialties missing from the list (stale
/// records) are appended in first-seen order. Empty groups are omitted.
pub fn group_by_specialty(
    doctors: &[Doctor],
    specialties: &[String],
    filter: &DirectoryFilter,
) -> Vec<(String, Vec<Doctor>)> {
    let filtered: Vec<&Doctor> = doctors.iter().filter(|d| filter.matches(d)).collect();

    let mut order: Vec<&str> = specialties.iter().map(String::as_str).collect();
    for doctor in &filtered {
        if !order.contains(&doctor.specialty.as_str()) {
            order.push(doctor.specialty.as_str());
        }
    }

    let mut groups = Vec::new();
    for specialty in order {
        let members: Vec<Doctor> = filtered
            .iter()
            .filter(|d| d.specialty == specialty)
            .map(|d| (*d).clone())
            .collect();
        if !members.is_empty() {
            groups.push((specialty.to_string(), members));
        }
    }
    groups
}

/// Aggregate numbers shown on the dashboard. Only active doctors count, so
/// disabling a doctor removes them from every figure without deleting data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Number of active doctors.
    pub total_active: usize,
    /// Number of distinct specialties among active doctors.
    pub specialty_count: usize,
    /// Active doctors per specialty, in first-seen order.
    pub per_specialty: Vec<(String, usize)>,
}

impl DashboardStats {
    pub fn compute(doctors: &[Doctor]) -> Self {
        let mut per_specialty: Vec<(String, usize)> = Vec::new();
        let mut total_active = 0;

        for doctor in doctors.iter().filter(|d| d.is_active) {
            total_active += 1;
            match per_specialty
                .iter_mut()
                .find(|(name, _)| name == &doctor.specialty)
            {
                Some((_, count)) => *count += 1,
                None => per_specialty.push((doctor.specialty.clone(), 1)),
            }
        }

        Self {
            total_active,
            specialty_count: per_specialty.len(),
            per_specialty,
        }
    }
}

/// Validate a brand new doctor: required fields plus id uniqueness against
/// the current in-memory list. Uniqueness lives here and only here; the
/// store itself enforces nothing.
pub fn validate_new(doctors: &[Doctor], draft: &Doctor) -> Result<(), ValidationError> {
    validate_fields(draft)?;
    if doctors.iter().any(|d| d.id == draft.id) {
        return Err(ValidationError::DuplicateId(draft.id.clone()));
    }
    Ok(())
}

/// Validate an edited doctor. The id is locked by the form, so only the
/// required-field checks apply.
pub fn validate_update(draft: &Doctor) -> Result<(), ValidationError> {
    validate_fields(draft)
}

fn validate_fields(draft: &Doctor) -> Result<(), ValidationError> {
    if draft.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if draft.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if draft.room.trim().is_empty() {
        return Err(ValidationError::MissingRoom);
    }
    if draft.specialty.trim().is_empty() {
        return Err(ValidationError::MissingSpecialty);
    }
    Ok(())
}

/// Return a new list with `doctor` replacing the record sharing its id, or
/// appended when no such record exists. Relative order of everyone else is
/// preserved.
pub fn upsert_doctor(doctors: &[Doctor], doctor: Doctor) -> Vec<Doctor> {
    let mut updated: Vec<Doctor> = doctors.to_vec();
    match updated.iter_mut().find(|d| d.id == doctor.id) {
        Some(slot) => *slot = doctor,
        None => updated.push(doctor),
    }
    updated
}

/// Flip the active flag on the doctor with the given id, returning the new
/// list plus the toggled record for the caller's status message. `None` when
/// the id is unknown.
pub fn toggle_active(doctors: &[Doctor], id: &str) -> Option<(Vec<Doctor>, Doctor)> {
    doctors.iter().position(|d| d.id == id).map(|index| {
        let mut updated = doctors.to_vec();
        updated[index].is_active = !updated[index].is_active;
        let toggled = updated[index].clone();
        (updated, toggled)
    })
}

/// Append a specialty, trimming whitespace. `None` when the trimmed name is
/// empty or already present (the list is a set with stable order).
pub fn add_specialty(specialties: &[String], name: &str) -> Option<Vec<String>> {
    let trimmed = name.trim();
    if trimmed.is_empty() || specialties.iter().any(|s| s == trimmed) {
        return None;
    }
    let mut updated = specialties.to_vec();
    updated.push(trimmed.to_string());
    Some(updated)
}

/// Remove a specialty in place, preserving the relative order of the rest.
/// Removing a name that is not present is a no-op.
pub fn remove_specialty(specialties: &[String], name: &str) -> Vec<String> {
    specialties.iter().filter(|s| *s != name).cloned().collect()
}

/// Deduplicate a mutua against the doctor's current set before adding it.
/// Returns `None` for blank or duplicate input so the form can ignore it.
pub fn add_mutua(mutuas: &[String], name: &str) -> Option<Vec<String>> {
    let trimmed = name.trim();
    if trimmed.is_empty() || mutuas.iter().any(|m| m == trimmed) {
        return None;
    }
    let mut updated = mutuas.to_vec();
    updated.push(trimmed.to_string());
    Some(updated)
}

/// Specialties currently carried by at least one doctor. Used by the
/// specialty manager to flag names that are still referenced before the user
/// deletes them.
pub fn specialties_in_use(doctors: &[Doctor]) -> HashSet<String> {
    doctors.iter().map(|d| d.specialty.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::default_doctors;

    fn sample() -> Vec<Doctor> {
        default_doctors()
    }

    #[test]
    fn duplicate_id_is_rejected_before_any_write() {
        let doctors = sample();
        let mut draft = doctors[0].clone();
        draft.name = "Dr. Otro Nombre".to_string();

        assert_eq!(
            validate_new(&doctors, &draft),
            Err(ValidationError::DuplicateId("DOC-001".to_string()))
        );
    }

    #[test]
    fn required_fields_are_enforced() {
        let doctors = sample();
        let mut draft = doctors[0].clone();
        draft.id = "DOC-010".to_string();
        draft.room = "  ".to_string();

        assert_eq!(validate_new(&doctors, &draft), Err(ValidationError::MissingRoom));

        draft.room = "5".to_string();
        draft.name = String::new();
        assert_eq!(validate_new(&doctors, &draft), Err(ValidationError::MissingName));

        draft.name = "Dr. Nuevo".to_string();
        assert_eq!(validate_new(&doctors, &draft), Ok(()));
    }

    #[test]
    fn toggle_twice_restores_the_original_flag() {
        let doctors = sample();

        let (once, toggled) = toggle_active(&doctors, "DOC-001").expect("first toggle");
        assert!(!toggled.is_active);

        let (twice, toggled) = toggle_active(&once, "DOC-001").expect("second toggle");
        assert!(toggled.is_active);
        assert_eq!(twice, doctors);

        assert!(toggle_active(&doctors, "DOC-404").is_none());
    }

    #[test]
    fn upsert_replaces_by_id_and_appends_new_records() {
        let doctors = sample();

        let mut edited = doctors[1].clone();
        edited.room = "301".to_string();
        let updated = upsert_doctor(&doctors, edited.clone());
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1], edited);

        let mut fresh = doctors[0].clone();
        fresh.id = "DOC-003".to_string();
        let grown = upsert_doctor(&updated, fresh);
        assert_eq!(grown.len(), 3);
        assert_eq!(grown[2].id, "DOC-003");
    }

    #[test]
    fn filter_matches_name_id_room_and_mutuas_case_insensitively() {
        let doctors = sample();
        let mut filter = DirectoryFilter::default();

        filter.query = "elena".to_string();
        assert!(!filter.matches(&doctors[0]));
        assert!(filter.matches(&doctors[1]));

        filter.query = "doc-001".to_string();
        assert!(filter.matches(&doctors[0]));

        filter.query = "204".to_string();
        assert!(filter.matches(&doctors[1]));

        filter.query = "mapfre".to_string();
        assert!(filter.matches(&doctors[1]));
        assert!(!filter.matches(&doctors[0]));
    }

    #[test]
    fn inactive_doctors_are_hidden_unless_requested() {
        let mut doctors = sample();
        doctors[0].is_active = false;
        let mut filter = DirectoryFilter::default();

        assert!(!filter.matches(&doctors[0]));
        filter.show_disabled = true;
        assert!(filter.matches(&doctors[0]));
    }

    #[test]
    fn specialty_filter_requires_exact_match() {
        let doctors = sample();
        let filter = DirectoryFilter {
            specialty: Some("Cardiología".to_string()),
            ..DirectoryFilter::default()
        };

        assert!(filter.matches(&doctors[0]));
        assert!(!filter.matches(&doctors[1]));
    }

    #[test]
    fn grouping_follows_specialty_list_order_and_appends_strays() {
        let mut doctors = sample();
        let mut stray = doctors[0].clone();
        stray.id = "DOC-003".to_string();
        stray.specialty = "Fisioterapia".to_string();
        doctors.push(stray);

        let specialties = vec!["Pediatría".to_string(), "Cardiología".to_string()];
        let groups = group_by_specialty(&doctors, &specialties, &DirectoryFilter::default());

        let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Pediatría", "Cardiología", "Fisioterapia"]);
        assert_eq!(groups[0].1[0].id, "DOC-002");
    }

    #[test]
    fn dashboard_counts_only_active_doctors() {
        let mut doctors = sample();
        let mut third = doctors[0].clone();
        third.id = "DOC-003".to_string();
        doctors.push(third);
        doctors[1].is_active = false;

        let stats = DashboardStats::compute(&doctors);
        assert_eq!(stats.total_active, 2);
        assert_eq!(stats.specialty_count, 1);
        assert_eq!(
            stats.per_specialty,
            vec![("Cardiología".to_string(), 2)]
        );
    }

    #[test]
    fn specialty_set_operations_trim_and_deduplicate() {
        let list = vec!["Cardiología".to_string()];

        assert_eq!(
            add_specialty(&list, "  Oncología "),
            Some(vec!["Cardiología".to_string(), "Oncología".to_string()])
        );
        assert_eq!(add_specialty(&list, "Cardiología"), None);
        assert_eq!(add_specialty(&list, "   "), None);

        assert_eq!(remove_specialty(&list, "Cardiología"), Vec::<String>::new());
        assert_eq!(remove_specialty(&list, "Oncología"), list);
    }

    #[test]
    fn mutuas_stay_unique_within_a_doctor() {
        let mutuas = vec!["Adeslas".to_string()];
        assert_eq!(
            add_mutua(&mutuas, "Sanitas"),
            Some(vec!["Adeslas".to_string(), "Sanitas".to_string()])
        );
        assert_eq!(add_mutua(&mutuas, " Adeslas "), None);
    }
}
