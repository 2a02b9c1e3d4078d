//! End-to-end persistence checks against a store on disk: durability across
//! re-opens, the backup wire format, and the destructive restore semantics.

use clinigest::db::{
    export_backup, load_or_seed_doctors, load_or_seed_specialties, parse_backup, restore_backup,
    save_doctors, save_specialties, Store,
};
use clinigest::directory::{toggle_active, upsert_doctor};
use clinigest::models::Doctor;

#[test]
fn edits_survive_reopening_the_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("clinigest.sqlite");

    {
        let store = Store::open_at(&path).expect("open");
        let doctors = load_or_seed_doctors(&store);

        let mut draft = doctors[0].clone();
        draft.id = "DOC-100".to_string();
        draft.name = "Dr. Integración".to_string();
        let updated = upsert_doctor(&doctors, draft);
        save_doctors(&store, &updated).expect("save doctors");

        let (toggled, _) = toggle_active(&updated, "DOC-002").expect("toggle");
        save_doctors(&store, &toggled).expect("save toggle");
    }

    // A fresh connection must see exactly what was written.
    let store = Store::open_at(&path).expect("reopen");
    let doctors = load_or_seed_doctors(&store);
    assert_eq!(doctors.len(), 3);
    assert!(doctors.iter().any(|d| d.id == "DOC-100"));
    assert!(!doctors.iter().find(|d| d.id == "DOC-002").unwrap().is_active);
}

#[test]
fn exported_file_uses_the_documented_wire_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Store::open_at(&dir.path().join("clinigest.sqlite")).expect("open");
    load_or_seed_doctors(&store);
    load_or_seed_specialties(&store);

    let path = export_backup(&store, dir.path()).expect("export");
    let text = std::fs::read_to_string(&path).expect("read export");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

    assert!(value["doctors"].is_array());
    assert!(value["specialties"].is_array());
    assert!(value["appointments"].as_array().expect("array").is_empty());

    let first = &value["doctors"][0];
    assert_eq!(first["id"], "DOC-001");
    assert_eq!(first["isActive"], true);
    assert!(first["avatarUrl"].is_string());
    assert!(first["mutuas"].is_array());
}

#[test]
fn restore_replaces_rather_than_merges() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Store::open_at(&dir.path().join("clinigest.sqlite")).expect("open");
    load_or_seed_doctors(&store);
    load_or_seed_specialties(&store);
    save_specialties(&store, &["Cirugía".to_string()]).expect("save specialties");

    let bundle = parse_backup(
        r#"{
            "doctors": [
                {"id": "DOC-500", "name": "Dra. Restaurada", "specialty": "Cirugía",
                 "room": "1", "mutuas": [], "avatarUrl": "", "isActive": false}
            ],
            "specialties": ["Cirugía", "Anestesia"]
        }"#,
    )
    .expect("parse");
    restore_backup(&store, &bundle).expect("restore");

    let doctors = load_or_seed_doctors(&store);
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, "DOC-500");
    assert!(!doctors[0].is_active);
    assert_eq!(
        load_or_seed_specialties(&store),
        vec!["Cirugía".to_string(), "Anestesia".to_string()]
    );
}

#[test]
fn doctor_json_round_trips_with_optional_fields() {
    let doctor = Doctor {
        id: "DOC-7".to_string(),
        name: "Dr. Serde".to_string(),
        specialty: "Neurología".to_string(),
        room: "2B".to_string(),
        mutuas: vec!["Adeslas".to_string()],
        email: Some("serde@clinica.example".to_string()),
        phone: None,
        avatar_url: "https://example.test/a.png".to_string(),
        is_active: true,
    };

    let text = serde_json::to_string(&doctor).expect("serialize");
    assert!(text.contains("\"avatarUrl\""));
    assert!(text.contains("\"isActive\""));
    // Absent optionals are omitted, not null.
    assert!(!text.contains("\"phone\""));

    let back: Doctor = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, doctor);
}
