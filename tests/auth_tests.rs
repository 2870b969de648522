/// Login, registration and profile flows against a scripted backend.
mod common;

use chessgen::api::{ApiClient, Credentials};
use chessgen::auth::{self, USER_KEY};
use chessgen::error::{ClientError, ValidationError};
use chessgen::storage::LocalStore;
use common::FakeBackend;
use serde_json::json;

fn alice() -> serde_json::Value {
    json!({
        "success": true,
        "message": "Connexion réussie",
        "user": { "id": 1, "username": "alice", "email": "alice@example.org", "elo": 1512.5 }
    })
}

#[test]
fn login_stores_the_user_locally() {
    let backend = FakeBackend::new().respond(alice());
    let mut storage = LocalStore::in_memory();

    let user = auth::login(&ApiClient::new(&backend), &mut storage, " alice ", "secret").unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.elo, 1512.5);
    assert_eq!(auth::stored_user(&storage), Some(user));

    let calls = backend.calls();
    assert_eq!(calls[0].path, "auth/login");
    assert_eq!(calls[0].credentials, Credentials::Include);
    assert_eq!(
        calls[0].body,
        Some(json!({ "username": "alice", "password": "secret" }))
    );
}

#[test]
fn refused_login_echoes_the_server_error() {
    let backend = FakeBackend::new().respond(json!({
        "success": false,
        "error": "Nom d'utilisateur ou mot de passe incorrect"
    }));
    let mut storage = LocalStore::in_memory();

    let err = auth::login(&ApiClient::new(&backend), &mut storage, "alice", "wrong").unwrap_err();

    assert!(
        matches!(err, ClientError::Application(ref e) if e.contains("incorrect")),
        "{err:?}"
    );
    assert!(storage.get(USER_KEY).is_none());
}

#[test]
fn empty_credentials_never_reach_the_backend() {
    let backend = FakeBackend::new();
    let mut storage = LocalStore::in_memory();

    let err = auth::login(&ApiClient::new(&backend), &mut storage, "", "secret").unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::Missing { field: "username" })
    ));
    assert!(backend.calls().is_empty());
}

#[test]
fn registration_is_validated_then_sent() {
    let backend = FakeBackend::new().respond(alice());
    let mut storage = LocalStore::in_memory();
    let api = ApiClient::new(&backend);

    let err = auth::register(&api, &mut storage, "al", "alice@example.org", "secret").unwrap_err();
    assert!(matches!(err, ClientError::Validation(ValidationError::Username)));
    assert!(backend.calls().is_empty());

    let user = auth::register(&api, &mut storage, "alice", "alice@example.org", "secret").unwrap();
    assert_eq!(user.username, "alice");

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "auth/register");
    assert_eq!(
        calls[0].body,
        Some(json!({ "username": "alice", "email": "alice@example.org", "password": "secret" }))
    );
}

#[test]
fn success_without_user_is_malformed() {
    let backend = FakeBackend::new().respond(json!({ "success": true }));
    let mut storage = LocalStore::in_memory();

    let err = auth::login(&ApiClient::new(&backend), &mut storage, "alice", "secret").unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    assert!(storage.is_empty());
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[test]
fn stats_are_read_with_cookies() {
    let backend = FakeBackend::new().respond(json!({
        "success": true,
        "stats": {
            "username": "alice",
            "elo": 1532,
            "games_played": 10,
            "games_won": 6,
            "games_lost": 4,
            "win_rate": 60.0,
            "member_since": "2024-03-01T12:00:00"
        }
    }));

    let stats = auth::stats(&ApiClient::new(&backend)).unwrap();

    assert_eq!(stats.username, "alice");
    assert_eq!(stats.games_won, 6);
    let calls = backend.calls();
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].path, "auth/stats");
    assert_eq!(calls[0].credentials, Credentials::Include);
}

#[test]
fn stats_without_session_is_an_application_error() {
    let backend = FakeBackend::new().respond(json!({ "success": false, "error": "Non authentifié" }));

    let err = auth::stats(&ApiClient::new(&backend)).unwrap_err();

    assert!(
        matches!(err, ClientError::Application(ref e) if e == "Non authentifié"),
        "{err:?}"
    );
}

#[test]
fn email_update_sends_normalised_address_and_refreshes_stored_user() {
    let backend = FakeBackend::new().respond(json!({
        "success": true,
        "message": "Profil mis à jour",
        "user": { "id": 1, "username": "alice", "email": "new@example.org", "elo": 1532 }
    }));
    let mut storage = LocalStore::in_memory();

    let user = auth::update_email(&ApiClient::new(&backend), &mut storage, " New@Example.org ").unwrap();

    assert_eq!(user.elo, 1532.0);
    assert_eq!(auth::stored_user(&storage), Some(user));
    let calls = backend.calls();
    assert_eq!(calls[0].method, "PUT");
    assert_eq!(calls[0].path, "auth/update-profile");
    assert_eq!(calls[0].credentials, Credentials::Include);
    assert_eq!(calls[0].body, Some(json!({ "email": "new@example.org" })));
}

#[test]
fn taken_email_keeps_the_stored_user() {
    let backend = FakeBackend::new().respond(json!({
        "success": false,
        "error": "Cet email est déjà utilisé"
    }));
    let mut storage = LocalStore::in_memory();
    storage
        .set(USER_KEY, r#"{"username":"alice","elo":1500.0}"#)
        .unwrap();

    let err = auth::update_email(&ApiClient::new(&backend), &mut storage, "bob@example.org").unwrap_err();

    assert!(
        matches!(err, ClientError::Application(ref e) if e.contains("déjà utilisé")),
        "{err:?}"
    );
    assert_eq!(auth::stored_user(&storage).unwrap().elo, 1500.0);
}

#[test]
fn invalid_email_never_reaches_the_backend() {
    let backend = FakeBackend::new();
    let mut storage = LocalStore::in_memory();

    let err = auth::update_email(&ApiClient::new(&backend), &mut storage, "not-an-email").unwrap_err();

    assert!(matches!(err, ClientError::Validation(ValidationError::Email)));
    assert!(backend.calls().is_empty());
}

#[test]
fn password_change_puts_both_passwords() {
    let backend = FakeBackend::new().respond(json!({
        "success": true,
        "message": "Mot de passe mis à jour avec succès"
    }));

    let message = auth::change_password(&ApiClient::new(&backend), "secret", "better-secret").unwrap();

    assert_eq!(message.as_deref(), Some("Mot de passe mis à jour avec succès"));
    let calls = backend.calls();
    assert_eq!(calls[0].method, "PUT");
    assert_eq!(calls[0].path, "auth/change-password");
    assert_eq!(calls[0].credentials, Credentials::Include);
    assert_eq!(
        calls[0].body,
        Some(json!({ "current_password": "secret", "new_password": "better-secret" }))
    );
}

#[test]
fn short_new_password_is_rejected_locally() {
    let backend = FakeBackend::new();

    let err = auth::change_password(&ApiClient::new(&backend), "secret", "12345").unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::PasswordLength { min: 6, max: 128 })
    ));
    assert!(backend.calls().is_empty());
}

#[test]
fn wrong_current_password_echoes_the_server_error() {
    let backend = FakeBackend::new().respond(json!({
        "success": false,
        "error": "Mot de passe actuel incorrect"
    }));

    let err = auth::change_password(&ApiClient::new(&backend), "wrong", "better-secret").unwrap_err();

    assert!(
        matches!(err, ClientError::Application(ref e) if e.contains("incorrect")),
        "{err:?}"
    );
}
