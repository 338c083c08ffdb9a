use contact_core::db::open_db_in_memory;
use contact_core::{ContactRepository, NewContact, RepoError, SqliteContactRepository};
use uuid::Uuid;

fn jaka() -> NewContact {
    NewContact::new("Jaka", "jaka@gmail.com", "081234567890")
}

#[test]
fn insert_assigns_id_and_find_by_name_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let created = repo.insert(&jaka()).unwrap();
    let loaded = repo.find_by_name("Jaka").unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.email, "jaka@gmail.com");
    assert_eq!(loaded.phone, "081234567890");
    assert_eq!(repo.find_by_id(created.id).unwrap(), Some(created));
}

#[test]
fn find_by_name_is_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    repo.insert(&jaka()).unwrap();

    assert!(repo.find_by_name("jaka").unwrap().is_none());
    assert!(repo.find_by_name("Jaka ").unwrap().is_none());
    assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn find_all_returns_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    for name in ["Roro", "Budi", "Andi"] {
        repo.insert(&NewContact::new(name, "x@y.com", "081234567890"))
            .unwrap();
    }

    let names = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Roro", "Budi", "Andi"]);
}

#[test]
fn duplicate_insert_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    repo.insert(&jaka()).unwrap();

    let err = repo.insert(&jaka()).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(ref name) if name == "Jaka"));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_by_id_replaces_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let created = repo.insert(&jaka()).unwrap();

    let fields = NewContact::new("Jaka Tarub", "tarub@mail.id", "+6285712345678");
    repo.update_by_id(created.id, &fields).unwrap();

    let loaded = repo.find_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded.fields(), fields);
    assert!(repo.find_by_name("Jaka").unwrap().is_none());
}

#[test]
fn update_by_id_reports_missing_and_conflicting_targets() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let jaka = repo.insert(&jaka()).unwrap();
    repo.insert(&NewContact::new("Roro", "roro@gmail.com", "081298765432"))
        .unwrap();

    let missing = Uuid::new_v4();
    let err = repo.update_by_id(missing, &jaka.fields()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));

    let err = repo
        .update_by_id(jaka.id, &NewContact::new("Roro", "a@b.co", "081234567890"))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(_)));
}

#[test]
fn delete_by_name_and_id_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let jaka = repo.insert(&jaka()).unwrap();
    let roro = repo
        .insert(&NewContact::new("Roro", "roro@gmail.com", "081298765432"))
        .unwrap();

    repo.delete_by_name("Jaka").unwrap();
    assert!(repo.find_by_id(jaka.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_by_name("Jaka").unwrap_err(),
        RepoError::NameNotFound(_)
    ));

    repo.delete_by_id(roro.id).unwrap();
    assert!(matches!(
        repo.delete_by_id(roro.id).unwrap_err(),
        RepoError::NotFound(id) if id == roro.id
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn corrupt_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO contacts (uuid, name, email, phone)
         VALUES ('not-a-uuid', 'Broken', 'b@c.de', '081234567890');",
        [],
    )
    .unwrap();
    let repo = SqliteContactRepository::new(&conn);

    assert!(matches!(
        repo.find_all().unwrap_err(),
        RepoError::InvalidData(_)
    ));
    assert!(matches!(
        repo.find_by_name("Broken").unwrap_err(),
        RepoError::InvalidData(_)
    ));
}
