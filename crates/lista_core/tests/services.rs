use lista_core::{
    ChildInput, ChildService, ServiceError, Store, TeamInput, TeamService, ValidationError,
};

fn team_input(nombre: &str) -> TeamInput {
    TeamInput {
        nombre: nombre.to_string(),
        ..TeamInput::default()
    }
}

fn child_input(nombre: &str, team_id: i64) -> ChildInput {
    ChildInput {
        nombre: nombre.to_string(),
        apellido: "Pérez".to_string(),
        fecha_nacimiento: "2014-05-20".to_string(),
        team_id: Some(team_id),
        ..ChildInput::default()
    }
}

#[test]
fn team_service_validates_and_maps_duplicates() {
    let store = Store::open_in_memory().unwrap();
    let teams = TeamService::new(store.teams().unwrap());

    let created = teams
        .create_team(&TeamInput {
            nombre: "  Leones ".to_string(),
            descripcion: Some("Sub 12".to_string()),
            color: Some("#ff8800".to_string()),
        })
        .unwrap();
    assert_eq!(created.nombre, "Leones");
    assert_eq!(created.color, "#FF8800");

    match teams.create_team(&team_input("Leones")).unwrap_err() {
        ServiceError::DuplicateTeamName(name) => assert_eq!(name, "Leones"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        teams.create_team(&team_input("L")).unwrap_err(),
        ServiceError::Validation(ValidationError::TeamNameLength { chars: 1 })
    ));
    assert!(matches!(
        teams.update_team(999, &team_input("Pumas")).unwrap_err(),
        ServiceError::TeamNotFound(999)
    ));
    assert!(matches!(
        teams.get_team(999).unwrap_err(),
        ServiceError::TeamNotFound(999)
    ));
}

#[test]
fn team_with_children_cannot_be_deleted_until_emptied() {
    let store = Store::open_in_memory().unwrap();
    let teams = TeamService::new(store.teams().unwrap());
    let children = ChildService::new(store.children().unwrap());

    let leones = teams.create_team(&team_input("Leones")).unwrap();
    let tigres = teams.create_team(&team_input("Tigres")).unwrap();
    children
        .create_child(&child_input("Ana", leones.id))
        .unwrap();
    children
        .create_child(&child_input("Beto", leones.id))
        .unwrap();

    match teams.delete_team(leones.id).unwrap_err() {
        ServiceError::TeamHasChildren { team_id, children } => {
            assert_eq!(team_id, leones.id);
            assert_eq!(children, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(teams.move_children(leones.id, tigres.id).unwrap(), 2);
    teams.delete_team(leones.id).unwrap();
    assert!(matches!(
        teams.delete_team(leones.id).unwrap_err(),
        ServiceError::TeamNotFound(_)
    ));

    let stats = teams.team_stats(tigres.id).unwrap();
    assert_eq!(stats.stats.total, 2);
}

#[test]
fn move_children_checks_both_teams() {
    let store = Store::open_in_memory().unwrap();
    let teams = TeamService::new(store.teams().unwrap());
    let leones = teams.create_team(&team_input("Leones")).unwrap();

    assert!(matches!(
        teams.move_children(leones.id, leones.id).unwrap_err(),
        ServiceError::Validation(ValidationError::SameTeam(id)) if id == leones.id
    ));
    assert!(matches!(
        teams.move_children(leones.id, 999).unwrap_err(),
        ServiceError::TeamNotFound(999)
    ));
    assert!(matches!(
        teams.move_children(998, leones.id).unwrap_err(),
        ServiceError::TeamNotFound(998)
    ));
}

#[test]
fn child_service_maps_missing_rows_and_teams() {
    let store = Store::open_in_memory().unwrap();
    let teams = TeamService::new(store.teams().unwrap());
    let children = ChildService::new(store.children().unwrap());
    let leones = teams.create_team(&team_input("Leones")).unwrap();

    assert!(matches!(
        children.create_child(&child_input("Ana", 555)).unwrap_err(),
        ServiceError::TeamNotFound(555)
    ));
    assert!(matches!(
        children
            .create_child(&ChildInput {
                team_id: None,
                ..child_input("Ana", leones.id)
            })
            .unwrap_err(),
        ServiceError::Validation(ValidationError::MissingTeam)
    ));
    assert!(matches!(
        children.get_child(42).unwrap_err(),
        ServiceError::ChildNotFound(42)
    ));
    assert!(matches!(
        children
            .update_child(42, &child_input("Ana", leones.id))
            .unwrap_err(),
        ServiceError::ChildNotFound(42)
    ));
    assert!(matches!(
        children.delete_child(42).unwrap_err(),
        ServiceError::ChildNotFound(42)
    ));

    let ana = children
        .create_child(&child_input("Ana", leones.id))
        .unwrap();
    assert_eq!(children.list_children(Some(leones.id)).unwrap().len(), 1);
    children.delete_child(ana.id).unwrap();
    assert!(children.list_children(None).unwrap().is_empty());
}

#[test]
fn import_reports_rejected_rows_by_position() {
    let store = Store::open_in_memory().unwrap();
    let teams = TeamService::new(store.teams().unwrap());
    let children = ChildService::new(store.children().unwrap());
    let leones = teams.create_team(&team_input("Leones")).unwrap();

    let rows = vec![
        child_input("Ana", leones.id),
        child_input("R2D2", leones.id),
        child_input("Beto", 404),
        ChildInput {
            fecha_nacimiento: "31/12/2013".to_string(),
            condicion_pago: Some("En deuda".to_string()),
            ..child_input("Ciro", leones.id)
        },
        ChildInput {
            team_id: None,
            ..child_input("Dora", leones.id)
        },
    ];

    let report = children.import_children(&rows).unwrap();
    assert_eq!(report.inserted, 2);
    let rejected: Vec<usize> = report.rejected.iter().map(|row| row.index).collect();
    assert_eq!(rejected, vec![1, 2, 4]);
    assert_eq!(report.rejected[1].reason, "team not found: 404");
    assert_eq!(report.rejected[2].reason, "team_id is required");

    let stats = children.child_stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.in_debt, 1);

    assert_eq!(children.delete_all_children().unwrap(), 2);
}
