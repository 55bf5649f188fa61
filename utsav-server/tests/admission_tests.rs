//! Admission engine tests: uniqueness, size rules, payment classification,
//! and the payment/delete operations

mod helpers;

use helpers::*;
use utsav_common::db::models::{PaymentMode, PaymentStatus, Role};
use utsav_server::db::events::NewEvent;
use utsav_server::Error;

#[tokio::test]
async fn second_self_registration_conflicts_and_creates_no_row() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Solo Mic", 0, "music", 1)).await;
    let (user, _) = server.create_account(Role::User).await;

    let first = server
        .engine
        .submit_self(&user, event.guid, self_request("1SI20CS001", 1, None))
        .await
        .unwrap();

    let second = server
        .engine
        .submit_self(&user, event.guid, self_request("1SI20CS001", 1, None))
        .await;

    match second {
        Err(Error::AlreadyRegistered { registration_id, registered_at }) => {
            assert_eq!(registration_id, Some(first.guid));
            assert!(registered_at.is_some());
        }
        other => panic!("expected AlreadyRegistered, got {:?}", other.map(|r| r.guid)),
    }

    assert_eq!(count_registrations(&server.db_pool, event.guid).await, 1);
}

#[tokio::test]
async fn spot_duplicate_usn_rejected_across_team_members() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Street Play", 0, "theatre", 1)).await;
    let (member_a, _) = server.create_account(Role::Team).await;
    let (member_b, _) = server.create_account(Role::Team).await;

    server
        .engine
        .submit_spot(&member_a, event.guid, spot_request("3XY21EC042", 1, None))
        .await
        .unwrap();

    let second = server
        .engine
        .submit_spot(&member_b, event.guid, spot_request("3XY21EC042", 1, None))
        .await;

    match second {
        Err(Error::DuplicateParticipant { usn }) => assert_eq!(usn, "3XY21EC042"),
        other => panic!("expected DuplicateParticipant, got {:?}", other.map(|r| r.guid)),
    }

    assert_eq!(count_registrations(&server.db_pool, event.guid).await, 1);
}

#[tokio::test]
async fn variable_size_event_enforces_bounds() {
    let server = TestServer::start().await.unwrap();
    let event = server
        .create_event(&NewEvent {
            min_team_size: Some(4),
            max_team_size: Some(6),
            is_variable_team_size: true,
            ..event_spec("Group Dance", 0, "dance", 5)
        })
        .await;

    let (too_small_user, _) = server.create_account(Role::User).await;
    let err = server
        .engine
        .submit_self(&too_small_user, event.guid, self_request("1AB20CS001", 3, Some("Trio")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamSizeTooSmall { min: 4 }));

    let (too_large_user, _) = server.create_account(Role::User).await;
    let err = server
        .engine
        .submit_self(&too_large_user, event.guid, self_request("1AB20CS002", 7, Some("Septet")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamSizeTooLarge { max: 6 }));

    for size in 4..=6 {
        let (user, _) = server.create_account(Role::User).await;
        let name = format!("Crew of {}", size);
        server
            .engine
            .submit_self(
                &user,
                event.guid,
                self_request(&format!("1AB20CS10{}", size), size, Some(&name)),
            )
            .await
            .unwrap_or_else(|e| panic!("size {} should pass, got {:?}", size, e));
    }
}

#[tokio::test]
async fn duo_event_requires_exact_size() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Duet", 0, "music", 2)).await;

    for bad_size in [1, 3] {
        let (user, _) = server.create_account(Role::User).await;
        let err = server
            .engine
            .submit_self(&user, event.guid, self_request("1AB20CS001", bad_size, Some("Pair")))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::TeamSizeMismatch { expected: 2 }),
            "size {} should mismatch, got {:?}",
            bad_size,
            err
        );
    }

    let (user, _) = server.create_account(Role::User).await;
    server
        .engine
        .submit_self(&user, event.guid, self_request("1AB20CS002", 2, Some("Pair")))
        .await
        .unwrap();
}

#[tokio::test]
async fn team_name_required_only_for_larger_teams() {
    let server = TestServer::start().await.unwrap();
    let trio_event = server.create_event(&event_spec("Quiz", 0, "literary", 3)).await;

    let (user, _) = server.create_account(Role::User).await;
    let err = server
        .engine
        .submit_self(&user, trio_event.guid, self_request("1AB20CS001", 3, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamNameRequired));

    let solo_event = server.create_event(&event_spec("Sketching", 0, "finearts", 1)).await;
    let (solo_user, _) = server.create_account(Role::User).await;
    server
        .engine
        .submit_self(&solo_user, solo_event.guid, self_request("1AB20CS002", 1, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_leader_details_rejected() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Solo Dance", 0, "dance", 1)).await;
    let (user, _) = server.create_account(Role::User).await;

    let mut req = self_request("ignored", 1, None);
    req.team_leader_details = None;
    let err = server.engine.submit_self(&user, event.guid, req).await.unwrap_err();
    assert!(matches!(err, Error::LeaderDetailsRequired));

    let mut req = self_request("1AB20CS001", 1, None);
    req.team_leader_details.as_mut().unwrap().college_name = Some("  ".to_string());
    let err = server.engine.submit_self(&user, event.guid, req).await.unwrap_err();
    assert!(matches!(err, Error::LeaderDetailsRequired));
}

#[tokio::test]
async fn closed_registration_rejects_before_other_validation() {
    let server = TestServer::start().await.unwrap();
    let event = server
        .create_event(&NewEvent {
            registration_open: false,
            ..event_spec("Closed Event", 100, "gaming", 1)
        })
        .await;
    let (user, _) = server.create_account(Role::User).await;

    // Team size is nonsense too; the closed check must win
    let err = server
        .engine
        .submit_self(&user, event.guid, self_request("1AB20CS001", 99, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RegistrationClosed));
    assert_eq!(count_registrations(&server.db_pool, event.guid).await, 0);
}

#[tokio::test]
async fn concurrent_duplicate_submissions_create_exactly_one_row() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Rush Entry", 0, "other", 1)).await;
    let (user, _) = server.create_account(Role::User).await;

    let engine_a = std::sync::Arc::clone(&server.engine);
    let engine_b = std::sync::Arc::clone(&server.engine);
    let (user_a, user_b) = (user.clone(), user.clone());
    let event_id = event.guid;

    let task_a = tokio::spawn(async move {
        engine_a.submit_self(&user_a, event_id, self_request("1SI20CS009", 1, None)).await
    });
    let task_b = tokio::spawn(async move {
        engine_b.submit_self(&user_b, event_id, self_request("1SI20CS009", 1, None)).await
    });

    let (result_a, result_b) = (task_a.await.unwrap(), task_b.await.unwrap());

    let successes = [&result_a, &result_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one submission must win");

    let loser = if result_a.is_err() { result_a } else { result_b };
    assert!(
        matches!(loser, Err(Error::AlreadyRegistered { .. })),
        "loser must see the idempotent conflict"
    );

    assert_eq!(count_registrations(&server.db_pool, event.guid).await, 1);
}

#[tokio::test]
async fn gaming_event_with_home_usn_requires_payment() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Gaming101", 500, "gaming", 1)).await;
    let (user, _) = server.create_account(Role::User).await;

    let registration = server
        .engine
        .submit_self(&user, event.guid, self_request("1SI20CS001", 1, None))
        .await
        .unwrap();

    assert_eq!(registration.payment_status, PaymentStatus::PaymentRequired);
}

#[tokio::test]
async fn spot_resubmission_of_same_usn_rejected() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Gaming101", 500, "gaming", 1)).await;
    let (member_a, _) = server.create_account(Role::Team).await;
    let (member_b, _) = server.create_account(Role::Team).await;

    server
        .engine
        .submit_spot(&member_a, event.guid, spot_request("1SI20CS001", 1, None))
        .await
        .unwrap();
    let before = count_registrations(&server.db_pool, event.guid).await;

    let err = server
        .engine
        .submit_spot(&member_b, event.guid, spot_request("1SI20CS001", 1, None))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateParticipant { .. }));
    assert_eq!(count_registrations(&server.db_pool, event.guid).await, before);
}

#[tokio::test]
async fn nominal_size_four_event_rejects_larger_team() {
    let server = TestServer::start().await.unwrap();
    // team_size = 4 with no bounds set and no variable flag still takes the
    // range branch (4 >= 3), collapsing to min = max = 4
    let event = server.create_event(&event_spec("Quartet", 0, "music", 4)).await;
    let (user, _) = server.create_account(Role::User).await;

    let err = server
        .engine
        .submit_self(&user, event.guid, self_request("1AB20CS001", 5, Some("Quintet")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamSizeTooLarge { max: 4 }));
}

#[tokio::test]
async fn payment_update_is_owner_only_and_forces_completed() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Footwork", 300, "dance", 1)).await;
    let (owner, _) = server.create_account(Role::User).await;
    let (stranger, _) = server.create_account(Role::User).await;

    let registration = server
        .engine
        .submit_self(&owner, event.guid, self_request("2AB20CS001", 1, None))
        .await
        .unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::PayOnEventDay);

    let err = server
        .engine
        .update_payment(&stranger, registration.guid, "pay_123")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden));

    let updated = server
        .engine
        .update_payment(&owner, registration.guid, "pay_123")
        .await
        .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Completed);
    assert_eq!(updated.payment_id.as_deref(), Some("pay_123"));
}

#[tokio::test]
async fn delete_requires_admin_role() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Solo Act", 0, "theatre", 1)).await;
    let (user, _) = server.create_account(Role::User).await;
    let (admin, _) = server.create_account(Role::Admin).await;

    let registration = server
        .engine
        .submit_self(&user, event.guid, self_request("1AB20CS001", 1, None))
        .await
        .unwrap();

    let err = server.engine.delete(&user, registration.guid).await.unwrap_err();
    assert!(matches!(err, Error::ForbiddenRole { .. }));

    server.engine.delete(&admin, registration.guid).await.unwrap();
    assert_eq!(count_registrations(&server.db_pool, event.guid).await, 0);

    let err = server.engine.delete(&admin, registration.guid).await.unwrap_err();
    assert!(matches!(err, Error::RegistrationNotFound));
}

#[tokio::test]
async fn check_existing_reports_registration_details() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Beatbox", 0, "music", 1)).await;
    let (user, _) = server.create_account(Role::User).await;

    let check = server.engine.check_existing(&user, event.guid).await.unwrap();
    assert!(!check.is_registered);
    assert!(check.registration_details.is_none());

    server
        .engine
        .submit_self(&user, event.guid, self_request("1AB20CS001", 1, None))
        .await
        .unwrap();

    let check = server.engine.check_existing(&user, event.guid).await.unwrap();
    assert!(check.is_registered);
    let details = check.registration_details.unwrap();
    assert_eq!(details.team_size, 1);
    assert_eq!(details.payment_status, PaymentStatus::NotRequired);

    let err = server
        .engine
        .check_existing(&user, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EventNotFound));
}

#[tokio::test]
async fn spot_explicit_payment_status_is_trusted() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Lan Party", 500, "gaming", 1)).await;
    let (member, _) = server.create_account(Role::Team).await;

    let mut req = spot_request("1SI20CS077", 1, None);
    req.payment_status = Some(PaymentStatus::Completed);
    req.payment_mode = Some(PaymentMode::Cash);

    let registration = server.engine.submit_spot(&member, event.guid, req).await.unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::Completed);
    assert_eq!(registration.payment_mode, Some(PaymentMode::Cash));
}

#[tokio::test]
async fn spot_payment_mode_recovered_from_notes() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Carrom", 100, "other", 1)).await;
    let (member, _) = server.create_account(Role::Team).await;

    let mut req = spot_request("4CD21ME009", 1, None);
    req.notes = Some("collected CASH at desk 2".to_string());

    let registration = server.engine.submit_spot(&member, event.guid, req).await.unwrap();
    assert_eq!(registration.payment_mode, Some(PaymentMode::Cash));
    assert_eq!(registration.notes.as_deref(), Some("collected CASH at desk 2"));
}

#[tokio::test]
async fn spot_duplicate_team_guard() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Skit", 0, "theatre", 3)).await;
    let (member_a, _) = server.create_account(Role::Team).await;
    let (member_b, _) = server.create_account(Role::Team).await;

    server
        .engine
        .submit_spot(&member_a, event.guid, spot_request("5EF21CS001", 3, Some("The Players")))
        .await
        .unwrap();

    let err = server
        .engine
        .submit_spot(&member_b, event.guid, spot_request("5EF21CS002", 3, Some("The Players")))
        .await
        .unwrap_err();

    match err {
        Error::DuplicateTeam { team_name } => assert_eq!(team_name, "The Players"),
        other => panic!("expected DuplicateTeam, got {:?}", other),
    }
}

#[tokio::test]
async fn submission_endpoints_are_role_gated() {
    let server = TestServer::start().await.unwrap();
    let event = server.create_event(&event_spec("Open Mic", 0, "other", 1)).await;
    let (user, _) = server.create_account(Role::User).await;
    let (member, _) = server.create_account(Role::Team).await;

    let err = server
        .engine
        .submit_self(&member, event.guid, self_request("1AB20CS001", 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForbiddenRole { expected: "user" }));

    let err = server
        .engine
        .submit_spot(&user, event.guid, spot_request("1AB20CS001", 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForbiddenRole { expected: "team" }));
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let (user, _) = server.create_account(Role::User).await;

    let err = server
        .engine
        .submit_self(&user, uuid::Uuid::new_v4(), self_request("1AB20CS001", 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EventNotFound));
}
