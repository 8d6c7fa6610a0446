mod common;

use diabetes_core::ports::{PortError, UserStore};
use diabetes_core::NewUser;
use common::TestApp;

fn new_user(handle: &str, email: &str) -> NewUser {
    NewUser {
        name: "Alice".into(),
        email: email.into(),
        contact: Some("555-0101".into()),
        handle: handle.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".into(),
    }
}

#[tokio::test]
async fn users_round_trip_through_sqlite() {
    let app = TestApp::spawn().await;
    let created = app.db.create_user(&new_user("alice1", "a@x.com")).await.unwrap();
    assert_eq!(created.handle, "alice1");
    assert_eq!(created.contact.as_deref(), Some("555-0101"));

    let creds = app.db.get_user_by_handle("alice1").await.unwrap();
    assert_eq!(creds.id, created.id);
    assert!(creds.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn unique_columns_are_enforced() {
    let app = TestApp::spawn().await;
    app.db.create_user(&new_user("alice1", "a@x.com")).await.unwrap();

    for dup in [new_user("alice1", "b@x.com"), new_user("alice2", "a@x.com")] {
        assert!(matches!(
            app.db.create_user(&dup).await,
            Err(PortError::Conflict(_))
        ));
    }
    assert_eq!(app.db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_handles_are_not_found() {
    let app = TestApp::spawn().await;
    assert!(matches!(
        app.db.get_user_by_handle("ghost").await,
        Err(PortError::NotFound(_))
    ));
}
