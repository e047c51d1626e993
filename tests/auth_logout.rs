mod support;

use ras_core::application::{
    commands::auth::{LogoutCommand, RefreshTokensCommand},
    dto::{AccessClaims, AuthMessage},
};
use support::TestHarness;

fn logout(token: &str) -> LogoutCommand {
    LogoutCommand {
        refresh_token: token.into(),
    }
}

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let harness = TestHarness::new().await;
    let pair = harness.login().await;

    let message = harness.commands().logout(logout(&pair.refresh_token)).await;

    assert_eq!(message, AuthMessage::LoggedOut);
    let tokens = harness.store.refresh_tokens().unwrap();
    assert!(tokens.iter().all(|token| token.revoked));
}

#[tokio::test]
async fn logout_reports_success_whatever_the_token() {
    let harness = TestHarness::new().await;
    let pair = harness.login().await;

    let unknown = harness.commands().logout(logout("never-issued")).await;
    let blank = harness.commands().logout(logout("")).await;
    let first = harness.commands().logout(logout(&pair.refresh_token)).await;
    let repeated = harness.commands().logout(logout(&pair.refresh_token)).await;

    for message in [unknown, blank, first, repeated] {
        assert_eq!(message, AuthMessage::LoggedOut);
    }
}

#[tokio::test]
async fn logout_leaves_other_sessions_alone() {
    let harness = TestHarness::new().await;
    let phone = harness.login().await;
    let laptop = harness.login().await;

    harness.commands().logout(logout(&phone.refresh_token)).await;

    let refreshed = harness
        .commands()
        .refresh_both_tokens(RefreshTokensCommand {
            refresh_token: laptop.refresh_token,
        })
        .await;
    assert!(refreshed.is_ok());
}

#[tokio::test]
async fn logout_all_revokes_every_session_of_the_caller() {
    let harness = TestHarness::new().await;
    let phone = harness.login().await;
    let laptop = harness.login().await;

    let claims = harness.services.authenticate(&phone.access_token).unwrap();
    let message = harness.commands().logout_all(&claims).await.unwrap();
    assert_eq!(message, AuthMessage::AllSessionsRevoked);

    for token in [phone.refresh_token, laptop.refresh_token] {
        let err = harness
            .commands()
            .refresh_both_tokens(RefreshTokensCommand {
                refresh_token: token,
            })
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }
}

#[tokio::test]
async fn logout_all_rejects_claims_with_a_bad_subject() {
    let harness = TestHarness::new().await;
    let pair = harness.login().await;
    let claims = harness.services.authenticate(&pair.access_token).unwrap();

    let forged = AccessClaims {
        sub: "not-a-number".into(),
        ..claims
    };
    let err = harness.commands().logout_all(&forged).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(harness.store.refresh_tokens().unwrap().iter().all(|t| !t.revoked));
}
