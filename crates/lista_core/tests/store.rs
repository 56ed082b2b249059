use chrono::NaiveDate;
use lista_core::db::OpenOptions;
use lista_core::{AppConfig, ChildRepository, NewChild, NewTeam, Store, TeamRepository};
use std::time::Duration;

#[test]
fn data_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lista.sqlite3");

    let store = Store::open(&path).unwrap();
    assert_eq!(store.path(), Some(path.as_path()));
    let team = store
        .teams()
        .unwrap()
        .create_team(&NewTeam::new("Leones"))
        .unwrap();
    store
        .children()
        .unwrap()
        .create_child(&NewChild::new(
            "Ana",
            "Paz",
            NaiveDate::from_ymd_opt(2014, 3, 3).unwrap(),
            team.id,
        ))
        .unwrap();
    store.close().unwrap();

    let reopened = Store::open_with(
        &path,
        &OpenOptions {
            busy_timeout: Duration::from_millis(250),
        },
    )
    .unwrap();
    let teams = reopened.teams().unwrap().list_teams().unwrap();
    assert_eq!(teams, vec![team.clone()]);
    let children = reopened
        .children()
        .unwrap()
        .list_children_by_team(team.id)
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].nombre, "Ana");
    reopened.close().unwrap();
}

#[test]
fn store_from_config_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: dir.path().join("from_config.sqlite3"),
        ..AppConfig::default()
    };

    let store = Store::from_config(&config).unwrap();
    assert_eq!(store.path(), Some(config.db_path.as_path()));
    assert!(config.db_path.exists());

    let foreign_keys: i64 = store
        .connection()
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
    store.close().unwrap();
}

#[test]
fn in_memory_store_has_no_path() {
    let store = Store::open_in_memory().unwrap();
    assert!(store.path().is_none());
    assert!(store.teams().unwrap().list_teams().unwrap().is_empty());
    store.close().unwrap();
}
