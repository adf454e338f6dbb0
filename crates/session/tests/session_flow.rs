use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use telexpense_auth::{
    access_type_for, require_access, AccessError, AccessLevel, MenuDefinition, Operation, User,
};
use telexpense_core::UserId;
use telexpense_session::store::MENU_RECORD;
use telexpense_session::{
    auth_guard, GuardDecision, KeyValueStore, MemoryStore, Redirect, SessionConfig, SessionStore,
    SetOptions,
};

const MENU_JSON: &str = r#"[
    {"menuName": "Dashboard", "routerLink": "dashboard", "icon": "dashboard"},
    {"menuName": "Invoices", "routerLink": "invoices", "icon": "receipt"},
    {"menuName": "Reports", "parent": true, "icon": "bar_chart", "menu": [
        {"text": "Telecom Reports", "routerLink": "telecom-reports"},
        {"text": "Wireless Reports", "routerLink": "wireless-reports"},
        {"text": "Wired Reports", "routerLink": "wired-reports"}
    ]},
    {"menuName": "Management", "parent": true, "icon": "settings", "menu": [
        {"text": "User", "routerLink": "user"},
        {"text": "Role", "routerLink": "role"},
        {"text": "Department", "routerLink": "department"}
    ]}
]"#;

const LOGIN_RESPONSE: &str = r#"{
    "data": {
        "userId": 42,
        "userName": "Morgan",
        "email": "morgan@example.com",
        "phoneNumber": "555-0199",
        "password": "not-for-storage",
        "role": {
            "roleId": 3,
            "roleName": "Billing Analyst",
            "description": "reports and users",
            "isDeleted": false,
            "moduleAccessList": [
                {"id": 1, "moduleName": "dashboard", "accessType": "READ"},
                {"id": 2, "moduleName": "TELECOM REPORTS", "accessType": "READ_WRITE"},
                {"id": 3, "moduleName": "User", "accessType": "READ"}
            ]
        },
        "isDeleted": false
    },
    "status": "OK",
    "statusCode": 200
}"#;

fn store() -> SessionStore {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("TELEXPENSE_CRYPTO_KEY", "k3y-for-integration-tests-000001"),
        ("TELEXPENSE_CRYPTO_IV", "iv-for-tests-001"),
    ]);
    let config = SessionConfig::from_lookup(|var| vars.get(var).map(|v| v.to_string())).unwrap();
    SessionStore::from_config(MemoryStore::new(), MemoryStore::new(), config).unwrap()
}

fn signed_in_store() -> (SessionStore, MenuDefinition) {
    telexpense_observability::init();

    let store = store();
    let user = User::from_login_response(LOGIN_RESPONSE).unwrap();
    store.login(&user).unwrap();

    let menu = MenuDefinition::from_json(MENU_JSON).unwrap();
    store.resolve_menu(&menu).unwrap();
    (store, menu)
}

#[test]
fn login_resolve_and_gate_pages() {
    let (store, _) = signed_in_store();
    assert!(auth_guard(&store).is_allowed());

    let session = store.load().expect("session should load");
    assert_eq!(session.user.user_id, UserId::new(42));
    assert_eq!(session.user.password, None);

    let menu = session.menu.expect("menu should be stored");
    let visible: Vec<String> = menu.visible_groups().into_iter().map(|g| g.menu_name).collect();
    assert_eq!(visible, vec!["Dashboard", "Reports", "Management"]);

    assert_eq!(access_type_for(&menu, "Dashboard", None), Some(AccessLevel::Read));
    assert_eq!(
        access_type_for(&menu, "Reports", Some("Telecom Reports")),
        Some(AccessLevel::ReadWrite)
    );
    assert!(require_access(&menu, "Reports", Some("Telecom Reports"), Operation::Write).is_ok());
    assert!(matches!(
        require_access(&menu, "Management", Some("User"), Operation::Write),
        Err(AccessError::Insufficient { .. })
    ));
    assert_eq!(
        require_access(&menu, "Invoices", None, Operation::Read),
        Err(AccessError::NotGranted("Invoices".to_string()))
    );
}

#[test]
fn active_group_follows_navigation() {
    let (store, _) = signed_in_store();
    let menu = store.get_menu().unwrap();

    let active = menu.active_group("/app/telecom-reports").unwrap();
    assert_eq!((active.index, active.menu_name.as_str()), (2, "Reports"));
    assert_eq!(menu.active_group_index("/app/department"), Some(3));
    assert_eq!(menu.active_group_index("/app/dashboard"), None);
}

#[test]
fn tampered_menu_is_dropped_but_session_survives() {
    let (store, _) = signed_in_store();

    let blob = store.cookies().get(MENU_RECORD).unwrap();
    let mut bytes = STANDARD.decode(blob).unwrap();
    bytes[0] ^= 0x5a;
    store
        .cookies()
        .set(MENU_RECORD, STANDARD.encode(bytes), &SetOptions::default());

    assert_eq!(store.get_menu(), None);
    assert!(auth_guard(&store).is_allowed());
    assert!(store.load().unwrap().menu.is_none());
}

#[test]
fn role_without_grants_keeps_session_with_hidden_menu() {
    telexpense_observability::init();
    let store = store();
    let mut response: serde_json::Value = serde_json::from_str(LOGIN_RESPONSE).unwrap();
    response["data"]["role"]["moduleAccessList"] = serde_json::Value::Null;
    let user = User::from_login_response(&response.to_string()).unwrap();
    store.login(&user).unwrap();
    store.resolve_menu(&MenuDefinition::from_json(MENU_JSON).unwrap()).unwrap();

    assert!(auth_guard(&store).is_allowed());
    let session = store.load().expect("session should load");
    assert_eq!(session.user.user_id, UserId::new(42));
    assert!(session.menu.unwrap().visible_groups().is_empty());
}

#[test]
fn logout_sends_user_to_login() {
    let (store, _) = signed_in_store();

    let redirect = store.clear_and_redirect();

    assert_eq!(redirect, Redirect::to("/login"));
    assert_eq!(auth_guard(&store), GuardDecision::Redirect(Redirect::to("/login")));
    assert!(store.load().is_none());
}

#[test]
fn expired_records_end_the_session() {
    let (store, _) = signed_in_store();
    let user_blob = store.cookies().get("user").unwrap();
    store.cookies().set(
        "user",
        user_blob,
        &SetOptions {
            ttl: Some(chrono::Duration::seconds(-1)),
            path: Some("/".to_string()),
        },
    );

    assert!(!auth_guard(&store).is_allowed());
}

#[test]
fn other_key_cannot_read_the_session() {
    let (store, _) = signed_in_store();
    let blob = store.cookies().get("user").unwrap();

    let other = SessionStore::from_config(
        MemoryStore::new(),
        MemoryStore::new(),
        SessionConfig::default(),
    )
    .unwrap();
    other.cookies().set("user", blob, &SetOptions::default());

    assert_eq!(other.get_user(), None);
}
