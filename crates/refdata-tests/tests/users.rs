//! User administration and role enforcement tests.

use refdata_client::resources::{Countries, MarketCalendars, Users};
use refdata_client::{
    CountryRequest, CreateUserRequest, Error, ListParams, RefDataClient, Role, UpdateUserRequest,
    UserResponse,
};
use refdata_tests::{create_test_client, master_client, unique_code, unique_name};

fn new_user(role: Role) -> CreateUserRequest {
    let username = unique_name(&role.to_string());
    CreateUserRequest {
        email: format!("{}@example.com", username),
        username,
        display_name: None,
        role,
        password: "user-password".to_string(),
        is_active: true,
    }
}

async fn login_as(user: &UserResponse) -> RefDataClient {
    let client = create_test_client().await;
    let session = client
        .login(&user.username, "user-password")
        .await
        .expect("Login failed");
    client.with_token(&session.access_token)
}

#[tokio::test]
async fn test_role_matrix() {
    let (master, _) = master_client().await;
    let users = master.resource::<Users>();
    let viewer = users.create(&new_user(Role::Viewer)).await.expect("Failed to create viewer");
    let trader = users.create(&new_user(Role::Trader)).await.expect("Failed to create trader");

    let viewer = login_as(&viewer).await;
    let trader = login_as(&trader).await;

    viewer
        .resource::<Countries>()
        .list(&ListParams::default())
        .await
        .expect("Viewer cannot read");

    let err = viewer
        .resource::<Countries>()
        .create(&CountryRequest::new(&unique_name("Denied"), &unique_code(2)))
        .await
        .expect_err("Viewer wrote reference data");
    assert_eq!(err.status(), Some(403));

    let err = trader
        .resource::<Countries>()
        .create(&CountryRequest::new(&unique_name("Denied"), &unique_code(2)))
        .await
        .expect_err("Trader wrote reference data");
    assert_eq!(err.status(), Some(403));

    trader
        .resource::<MarketCalendars>()
        .list(&ListParams::default())
        .await
        .expect("Trader cannot read calendars");

    let err = trader
        .resource::<Users>()
        .list(&ListParams::default())
        .await
        .expect_err("Trader listed users");
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_admin_cannot_touch_master_users() {
    let (master, _) = master_client().await;
    let admin = master
        .resource::<Users>()
        .create(&new_user(Role::Admin))
        .await
        .expect("Failed to create admin");
    let admin = login_as(&admin).await;

    let err = admin
        .resource::<Users>()
        .create(&new_user(Role::Master))
        .await
        .expect_err("Admin created a master user");
    assert_eq!(err.status(), Some(403));

    let me = master.me().await.expect("Failed to get profile");
    let err = admin
        .resource::<Users>()
        .delete(me.id)
        .await
        .expect_err("Admin deleted a master user");
    assert_eq!(err.status(), Some(403));

    admin
        .resource::<Users>()
        .create(&new_user(Role::Trader))
        .await
        .expect("Admin cannot create traders");
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let (master, _) = master_client().await;
    let users = master.resource::<Users>();
    let request = new_user(Role::Viewer);
    let user = users.create(&request).await.expect("Failed to create user");

    let anonymous = create_test_client().await;
    let session = anonymous
        .login(&user.username, "user-password")
        .await
        .expect("Login failed");

    users
        .update(
            user.id,
            &UpdateUserRequest {
                username: user.username.clone(),
                email: user.email.clone(),
                display_name: Some("Former viewer".to_string()),
                role: Role::Viewer,
                is_active: false,
                password: None,
            },
        )
        .await
        .expect("Failed to deactivate user");

    let result = anonymous.login(&user.username, "user-password").await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
    let result = anonymous.refresh(&session.refresh_token).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_password_reset_revokes_refresh_tokens() {
    let (master, _) = master_client().await;
    let users = master.resource::<Users>();
    let user = users
        .create(&new_user(Role::Trader))
        .await
        .expect("Failed to create user");

    let anonymous = create_test_client().await;
    let session = anonymous
        .login(&user.username, "user-password")
        .await
        .expect("Login failed");

    users
        .update(
            user.id,
            &UpdateUserRequest {
                username: user.username.clone(),
                email: user.email.clone(),
                display_name: None,
                role: Role::Trader,
                is_active: true,
                password: Some("reset-password".to_string()),
            },
        )
        .await
        .expect("Failed to reset password");

    let result = anonymous.refresh(&session.refresh_token).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));

    let result = anonymous.login(&user.username, "user-password").await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));

    anonymous
        .login(&user.username, "reset-password")
        .await
        .expect("New password rejected");
}

#[tokio::test]
async fn test_user_cannot_delete_self() {
    let (master, session) = master_client().await;

    let err = master
        .resource::<Users>()
        .delete(session.user.id)
        .await
        .expect_err("User deleted themselves");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let (master, _) = master_client().await;
    let users = master.resource::<Users>();
    let request = new_user(Role::Viewer);

    users.create(&request).await.expect("Failed to create user");
    let err = users
        .create(&request)
        .await
        .expect_err("Duplicate username accepted");
    assert_eq!(err.status(), Some(409));
}
