use chrono::NaiveDate;
use lista_core::db::open_db_in_memory;
use lista_core::{
    age_on, today_local, ChildRepository, NewChild, NewTeam, PaymentStatus, PhysicalState,
    RepoError, SqliteChildRepository, SqliteTeamRepository, TeamRepository,
};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_team(conn: &Connection, nombre: &str) -> i64 {
    SqliteTeamRepository::try_new(conn)
        .unwrap()
        .create_team(&NewTeam::new(nombre))
        .unwrap()
        .id
}

#[test]
fn birth_date_roundtrips_as_iso_text_with_derived_age() {
    let conn = open_db_in_memory().unwrap();
    let team_id = seed_team(&conn, "Leones");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();
    let birth = date(2010, 6, 15);

    let created = repo
        .create_child(&NewChild::new("Mateo", "García", birth, team_id))
        .unwrap();

    let stored: String = conn
        .query_row(
            "SELECT fecha_nacimiento FROM children WHERE id = ?1;",
            [created.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "2010-06-15");

    let loaded = repo.get_child(created.id).unwrap().unwrap();
    assert_eq!(loaded.fecha_nacimiento, birth);
    assert_eq!(loaded.edad, age_on(birth, today_local()));
    assert_eq!(loaded.team_id, Some(team_id));
    assert_eq!(loaded.team_nombre.as_deref(), Some("Leones"));
    assert_eq!(loaded.team_color.as_deref(), Some("#3B82F6"));
    assert_eq!(loaded.estado_fisico, PhysicalState::EnForma);
    assert_eq!(loaded.condicion_pago, PaymentStatus::AlDia);
}

#[test]
fn names_are_whitespace_normalized_on_write() {
    let conn = open_db_in_memory().unwrap();
    let team_id = seed_team(&conn, "Leones");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    let created = repo
        .create_child(&NewChild::new(
            "  Juan   Pablo ",
            "\tDe la  Cruz",
            date(2012, 1, 9),
            team_id,
        ))
        .unwrap();
    assert_eq!(created.nombre, "Juan Pablo");
    assert_eq!(created.apellido, "De la Cruz");
}

#[test]
fn writes_against_missing_team_fail() {
    let conn = open_db_in_memory().unwrap();
    let team_id = seed_team(&conn, "Leones");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    let err = repo
        .create_child(&NewChild::new("Ana", "Paz", date(2014, 3, 3), 77))
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownTeam(77)));
    assert!(repo.list_children().unwrap().is_empty());

    let child = repo
        .create_child(&NewChild::new("Ana", "Paz", date(2014, 3, 3), team_id))
        .unwrap();
    let err = repo
        .update_child(child.id, &NewChild::new("Ana", "Paz", date(2014, 3, 3), 78))
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownTeam(78)));
    assert_eq!(
        repo.get_child(child.id).unwrap().unwrap().team_id,
        Some(team_id)
    );
}

#[test]
fn update_replaces_fields_and_can_change_team() {
    let conn = open_db_in_memory().unwrap();
    let leones = seed_team(&conn, "Leones");
    let tigres = seed_team(&conn, "Tigres");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    let child = repo
        .create_child(&NewChild::new("Ana", "Paz", date(2014, 3, 3), leones))
        .unwrap();

    let replacement = NewChild {
        estado_fisico: PhysicalState::Lesionado,
        condicion_pago: PaymentStatus::EnDeuda,
        ..NewChild::new("Ana María", "Paz", date(2014, 3, 4), tigres)
    };
    let updated = repo.update_child(child.id, &replacement).unwrap().unwrap();
    assert_eq!(updated.id, child.id);
    assert_eq!(updated.nombre, "Ana María");
    assert_eq!(updated.fecha_nacimiento, date(2014, 3, 4));
    assert_eq!(updated.estado_fisico, PhysicalState::Lesionado);
    assert_eq!(updated.condicion_pago, PaymentStatus::EnDeuda);
    assert_eq!(updated.team_id, Some(tigres));
    assert_eq!(updated.team_nombre.as_deref(), Some("Tigres"));
    assert_eq!(updated.created_at, child.created_at);

    let missing = repo.update_child(child.id + 50, &replacement).unwrap();
    assert!(missing.is_none());
}

#[test]
fn delete_reports_presence_and_delete_all_counts_rows() {
    let conn = open_db_in_memory().unwrap();
    let leones = seed_team(&conn, "Leones");
    let tigres = seed_team(&conn, "Tigres");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    let ana = repo
        .create_child(&NewChild::new("Ana", "Paz", date(2014, 3, 3), leones))
        .unwrap();
    repo.create_child(&NewChild::new("Beto", "Luna", date(2013, 3, 3), leones))
        .unwrap();
    repo.create_child(&NewChild::new("Ciro", "Sol", date(2012, 3, 3), tigres))
        .unwrap();

    assert!(repo.delete_child(ana.id).unwrap());
    assert!(!repo.delete_child(ana.id).unwrap());
    assert!(repo.get_child(ana.id).unwrap().is_none());

    assert_eq!(repo.delete_all_children().unwrap(), 2);
    assert!(repo.list_children().unwrap().is_empty());
    assert_eq!(repo.delete_all_children().unwrap(), 0);

    // Teams are untouched by child deletes.
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    assert_eq!(teams.list_teams().unwrap().len(), 2);
}

#[test]
fn listings_are_ordered_by_surname_then_name() {
    let conn = open_db_in_memory().unwrap();
    let leones = seed_team(&conn, "Leones");
    let tigres = seed_team(&conn, "Tigres");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    for (nombre, apellido, team) in [
        ("Zoe", "Alvarez", leones),
        ("Bruno", "Zapata", tigres),
        ("Ana", "alvarez", tigres),
        ("Carla", "Mendez", leones),
    ] {
        repo.create_child(&NewChild::new(nombre, apellido, date(2014, 1, 1), team))
            .unwrap();
    }

    let all: Vec<String> = repo
        .list_children()
        .unwrap()
        .into_iter()
        .map(|child| format!("{} {}", child.nombre, child.apellido))
        .collect();
    assert_eq!(
        all,
        ["Ana alvarez", "Zoe Alvarez", "Carla Mendez", "Bruno Zapata"]
    );

    let only_leones: Vec<String> = repo
        .list_children_by_team(leones)
        .unwrap()
        .into_iter()
        .map(|child| child.nombre)
        .collect();
    assert_eq!(only_leones, ["Zoe", "Carla"]);
    assert!(repo.list_children_by_team(999).unwrap().is_empty());
}

#[test]
fn child_stats_cover_the_whole_roster() {
    let conn = open_db_in_memory().unwrap();
    let leones = seed_team(&conn, "Leones");
    let tigres = seed_team(&conn, "Tigres");
    let today = date(2024, 12, 31);
    let repo = SqliteChildRepository::with_today(&conn, today).unwrap();

    let empty = repo.child_stats().unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.max_age, 0);
    assert_eq!(empty.average_age, 0.0);

    repo.create_child(&NewChild::new("Ana", "Paz", date(2016, 1, 1), leones))
        .unwrap();
    repo.create_child(&NewChild {
        estado_fisico: PhysicalState::Lesionado,
        ..NewChild::new("Beto", "Luna", date(2012, 1, 1), tigres)
    })
    .unwrap();
    repo.create_child(&NewChild {
        condicion_pago: PaymentStatus::EnDeuda,
        ..NewChild::new("Ciro", "Sol", date(2011, 1, 1), tigres)
    })
    .unwrap();

    let stats = repo.child_stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.min_age, 8);
    assert_eq!(stats.max_age, 13);
    assert!((stats.average_age - 11.0).abs() < 1e-9);
    assert_eq!(stats.injured, 1);
    assert_eq!(stats.in_debt, 1);
}

#[test]
fn import_skips_rows_with_unknown_team_and_keeps_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let leones = seed_team(&conn, "Leones");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();

    let rows = vec![
        NewChild::new(" Ana ", "Paz", date(2014, 3, 3), leones),
        NewChild::new("Beto", "Luna", date(2013, 3, 3), 404),
        NewChild::new("Ciro", "Sol  Rojo", date(2012, 3, 3), leones),
    ];
    let summary = repo.import_children(&rows).unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped_unknown_team, vec![1]);

    let stored: Vec<(String, String)> = repo
        .list_children()
        .unwrap()
        .into_iter()
        .map(|child| (child.nombre, child.apellido))
        .collect();
    assert_eq!(
        stored,
        [
            ("Ana".to_string(), "Paz".to_string()),
            ("Ciro".to_string(), "Sol Rojo".to_string())
        ]
    );
}

#[test]
fn read_model_serializes_with_display_texts() {
    let conn = open_db_in_memory().unwrap();
    let team_id = seed_team(&conn, "Leones");
    let repo = SqliteChildRepository::try_new(&conn).unwrap();
    let child = repo
        .create_child(&NewChild::new("Mateo", "García", date(2010, 6, 15), team_id))
        .unwrap();

    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["fecha_nacimiento"], "2010-06-15");
    assert_eq!(json["estado_fisico"], "En forma");
    assert_eq!(json["condicion_pago"], "Al dia");
    assert_eq!(json["team_nombre"], "Leones");
    assert_eq!(json["edad"], child.edad);
}
