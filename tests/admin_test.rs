//! Admin panel coverage: authorization, ban/unban flows, broadcast intake
//! and flow precedence, exercised through the dispatcher.

mod common;

use std::sync::Arc;

use common::{test_config, text_from, wait_until, MockGateway};
use turnstile::content;
use turnstile::event::AdminMenuItem;
use turnstile::gateway::Keyboard;
use turnstile::session::AdminFlow;
use turnstile::{App, BroadcastLedger, Registry};

const ADMIN: i64 = 7;
const USER: i64 = 42;

fn build_app(
    gateway: Arc<MockGateway>,
) -> (App<MockGateway>, Arc<Registry>, Arc<BroadcastLedger>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = Arc::new(Registry::new(dir.path().join("users.json")));
    let ledger = Arc::new(BroadcastLedger::new(dir.path().join("broadcasts.json")));
    let app = App::new(
        gateway,
        registry.clone(),
        ledger.clone(),
        &test_config(vec![ADMIN]),
    );
    (app, registry, ledger, dir)
}

#[tokio::test]
async fn non_admin_is_refused_the_panel() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(USER, "/admin")).await;

    assert_eq!(
        gateway.last_text_sent_to(USER).as_deref(),
        Some(content::NO_ADMIN_PERMISSION)
    );
}

#[tokio::test]
async fn panel_shows_stats_and_the_admin_menu() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(USER, "/start")).await;
    app.handle(text_from(ADMIN, "/admin")).await;

    let panel = gateway.last_sent_to(ADMIN).expect("panel sent");
    let text = gateway.last_text_sent_to(ADMIN).expect("panel text");
    assert!(text.contains("Admin Panel"));
    assert!(text.contains("Total Users: 1"));
    match panel.keyboard {
        Some(Keyboard::Reply(rows)) => {
            let labels: Vec<_> = rows.into_iter().flatten().collect();
            assert_eq!(labels.len(), 6);
            assert!(labels.contains(&AdminMenuItem::Broadcast.label().to_string()));
        }
        other => panic!("expected a reply keyboard, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_ban_target_keeps_the_flow_pending() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(ADMIN, AdminMenuItem::BanUser.label()))
        .await;
    assert_eq!(
        app.admin_sessions().flow(ADMIN),
        Some(AdminFlow::AwaitingBanTarget)
    );

    app.handle(text_from(ADMIN, "not-a-number")).await;

    assert_eq!(
        gateway.last_text_sent_to(ADMIN).as_deref(),
        Some(content::INVALID_USER_ID)
    );
    assert_eq!(
        app.admin_sessions().flow(ADMIN),
        Some(AdminFlow::AwaitingBanTarget)
    );
}

#[tokio::test]
async fn banning_a_known_user_confirms_and_notifies() {
    let gateway = MockGateway::new();
    let (app, registry, _ledger, _dir) = build_app(gateway.clone());
    app.handle(text_from(USER, "/start")).await;

    app.handle(text_from(ADMIN, AdminMenuItem::BanUser.label()))
        .await;
    app.handle(text_from(ADMIN, &USER.to_string())).await;

    assert!(registry.is_banned(USER));
    assert_eq!(app.admin_sessions().flow(ADMIN), None);
    assert_eq!(
        gateway.last_text_sent_to(ADMIN),
        Some(content::ban_confirmed_text(USER))
    );
    assert_eq!(
        gateway.last_text_sent_to(USER).as_deref(),
        Some(content::USER_BANNED_NOTICE)
    );
}

#[tokio::test]
async fn unbanning_restores_access() {
    let gateway = MockGateway::new();
    let (app, registry, _ledger, _dir) = build_app(gateway.clone());
    app.handle(text_from(USER, "/start")).await;
    registry.set_banned(USER, true).expect("user exists");

    app.handle(text_from(ADMIN, AdminMenuItem::UnbanUser.label()))
        .await;
    app.handle(text_from(ADMIN, &USER.to_string())).await;

    assert!(!registry.is_banned(USER));
    assert_eq!(
        gateway.last_text_sent_to(ADMIN),
        Some(content::unban_confirmed_text(USER))
    );
}

#[tokio::test]
async fn unknown_ban_target_clears_the_flow() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(ADMIN, AdminMenuItem::BanUser.label()))
        .await;
    app.handle(text_from(ADMIN, "999")).await;

    assert_eq!(
        gateway.last_text_sent_to(ADMIN),
        Some(content::user_not_found_text(999))
    );
    assert_eq!(app.admin_sessions().flow(ADMIN), None);
}

#[tokio::test]
async fn cancel_aborts_a_pending_flow() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(ADMIN, AdminMenuItem::BanUser.label()))
        .await;
    app.handle(text_from(ADMIN, "❌ Cancel")).await;

    assert_eq!(app.admin_sessions().flow(ADMIN), None);
    assert_eq!(
        gateway.last_text_sent_to(ADMIN).as_deref(),
        Some(content::OPERATION_CANCELLED)
    );
}

#[tokio::test]
async fn broadcast_cancel_aborts_before_any_send() {
    let gateway = MockGateway::new();
    let (app, _registry, ledger, _dir) = build_app(gateway.clone());
    app.handle(text_from(USER, "/start")).await;

    app.handle(text_from(ADMIN, AdminMenuItem::Broadcast.label()))
        .await;
    assert_eq!(
        app.admin_sessions().flow(ADMIN),
        Some(AdminFlow::AwaitingBroadcast)
    );
    app.handle(text_from(ADMIN, "❌ Cancel Broadcast")).await;

    assert_eq!(app.admin_sessions().flow(ADMIN), None);
    assert_eq!(
        gateway.last_text_sent_to(ADMIN).as_deref(),
        Some(content::BROADCAST_CANCELLED)
    );
    assert!(ledger.records().is_empty());
}

#[tokio::test]
async fn pending_broadcast_consumes_text_that_looks_like_a_label() {
    let gateway = MockGateway::new();
    let (app, _registry, ledger, _dir) = build_app(gateway.clone());
    app.handle(text_from(USER, "/start")).await;

    app.handle(text_from(ADMIN, AdminMenuItem::Broadcast.label()))
        .await;
    // A payload that collides with a user menu label must be broadcast, not
    // routed as a menu press.
    app.handle(text_from(ADMIN, "📊 My Stats")).await;

    assert!(
        wait_until(|| app.admin_sessions().flow(ADMIN).is_none()).await,
        "fanout did not complete"
    );
    assert_eq!(
        gateway.texts_sent_to(USER).last().map(String::as_str),
        Some("📊 My Stats")
    );
    assert_eq!(ledger.records().len(), 1);
    assert_eq!(ledger.records()[0].successful_sends, 1);
}

#[tokio::test]
async fn total_users_and_analysis_report_registry_state() {
    let gateway = MockGateway::new();
    let (app, registry, _ledger, _dir) = build_app(gateway.clone());
    app.handle(text_from(USER, "/start")).await;
    app.handle(text_from(43, "/start")).await;
    registry.set_banned(43, true).expect("user exists");

    app.handle(text_from(ADMIN, AdminMenuItem::TotalUsers.label()))
        .await;
    assert_eq!(
        gateway.last_text_sent_to(ADMIN),
        Some(content::total_users_text(1))
    );

    app.handle(text_from(ADMIN, AdminMenuItem::UserAnalysis.label()))
        .await;
    let analysis = gateway.last_text_sent_to(ADMIN).expect("analysis");
    assert!(analysis.contains("Total Users: 2"));
    assert!(analysis.contains("Banned Users: 1"));
}

#[tokio::test]
async fn exit_leaves_the_admin_menu() {
    let gateway = MockGateway::new();
    let (app, _registry, _ledger, _dir) = build_app(gateway.clone());

    app.handle(text_from(ADMIN, AdminMenuItem::Exit.label()))
        .await;

    assert_eq!(
        gateway.last_text_sent_to(ADMIN).as_deref(),
        Some(content::EXITED_ADMIN)
    );
    let exit = gateway.last_sent_to(ADMIN).expect("exit notice");
    assert_eq!(exit.keyboard, Some(Keyboard::Remove));
}
