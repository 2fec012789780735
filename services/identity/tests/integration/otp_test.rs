use chrono::{Duration, Utc};

use gatehouse_domain::user::Lookup;
use gatehouse_identity::error::IdentityServiceError;
use gatehouse_identity::security::password::hash_secret;
use gatehouse_identity::usecase::otp::{
    SendOtpInput, SendOtpUseCase, VerifyOtpInput, VerifyOtpUseCase, issue_challenge,
    verify_challenge,
};

use crate::helpers::{
    MockNotifier, MockOtpRepo, MockUserRepo, otp_settings, test_challenge, test_user,
    unverified_user,
};

// ── issue ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_a_digit_code_and_store_its_hash() {
    let user = test_user();
    let otps = MockOtpRepo::empty();

    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let stored = otps.challenges_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].code_hash, code);
    assert!(stored[0].used_at.is_none());
}

#[tokio::test]
async fn should_reject_second_issue_while_one_is_outstanding() {
    let user = test_user();
    let otps = MockOtpRepo::empty();

    issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    let second = issue_challenge(&otps, user.id, &otp_settings()).await;
    assert!(
        matches!(second, Err(IdentityServiceError::OtpOutstanding)),
        "expected OtpOutstanding, got {second:?}"
    );
}

#[tokio::test]
async fn should_allow_issue_after_previous_code_was_consumed() {
    let user = test_user();
    let otps = MockOtpRepo::empty();

    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();
    verify_challenge(&otps, user.id, &code).await.unwrap();

    assert!(issue_challenge(&otps, user.id, &otp_settings()).await.is_ok());
}

#[tokio::test]
async fn should_allow_issue_after_previous_code_expired() {
    let user = test_user();
    let otps = MockOtpRepo::empty();

    let mut expired = test_challenge(user.id, hash_secret("12345678").unwrap());
    expired.expires_at = Utc::now() - Duration::minutes(1);
    otps.challenges_handle().lock().unwrap().push(expired);

    assert!(issue_challenge(&otps, user.id, &otp_settings()).await.is_ok());
}

// ── verify ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_match_the_correct_code_and_consume_the_challenge() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    assert!(verify_challenge(&otps, user.id, &code).await.unwrap());

    let stored = otps.challenges_handle();
    let stored = stored.lock().unwrap();
    assert!(stored[0].used_at.is_some());
}

#[tokio::test]
async fn should_fail_second_verification_with_not_found() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    assert!(verify_challenge(&otps, user.id, &code).await.unwrap());

    let second = verify_challenge(&otps, user.id, &code).await;
    assert!(
        matches!(second, Err(IdentityServiceError::OtpNotFound)),
        "expected OtpNotFound, got {second:?}"
    );
}

#[tokio::test]
async fn should_consume_the_challenge_even_on_a_wrong_code() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    // Wrong guess: returns false AND burns the challenge.
    assert!(!verify_challenge(&otps, user.id, "00000000").await.unwrap());

    // The correct code now finds nothing to verify against.
    let retry = verify_challenge(&otps, user.id, &code).await;
    assert!(matches!(retry, Err(IdentityServiceError::OtpNotFound)));
}

#[tokio::test]
async fn should_fail_verification_when_nothing_is_pending() {
    let user = test_user();
    let result = verify_challenge(&MockOtpRepo::empty(), user.id, "12345678").await;
    assert!(matches!(result, Err(IdentityServiceError::OtpNotFound)));
}

#[tokio::test]
async fn should_accept_surrounding_whitespace_in_the_candidate() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    assert!(
        verify_challenge(&otps, user.id, &format!("  {code}\n"))
            .await
            .unwrap()
    );
}

// ── SendOtpUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_dispatch_mail_with_the_issued_code() {
    let user = test_user();
    let notifier = MockNotifier::empty();
    let usecase = SendOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        otps: MockOtpRepo::empty(),
        notifier: notifier.clone(),
        settings: otp_settings(),
    };

    usecase
        .execute(SendOtpInput {
            lookup: Lookup::ByEmail(user.email.clone()),
        })
        .await
        .unwrap();

    let mails = notifier.mails_handle();
    let mails = mails.lock().unwrap();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to, user.email);
    assert_eq!(mails[0].subject, "Verify your email");
    assert!(mails[0].body.starts_with("One time password: "));
}

#[tokio::test]
async fn should_not_issue_otp_for_unknown_user() {
    let notifier = MockNotifier::empty();
    let usecase = SendOtpUseCase {
        users: MockUserRepo::empty(),
        otps: MockOtpRepo::empty(),
        notifier: notifier.clone(),
        settings: otp_settings(),
    };

    let result = usecase
        .execute(SendOtpInput {
            lookup: Lookup::ByUsername("ghost".to_owned()),
        })
        .await;
    assert!(matches!(result, Err(IdentityServiceError::UserNotFound)));
    assert!(notifier.mails_handle().lock().unwrap().is_empty());
}

// ── VerifyOtpUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mark_user_verified_on_success() {
    let user = unverified_user();
    let users = MockUserRepo::new(vec![user.clone()]);
    let otps = MockOtpRepo::empty();
    let code = issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    let usecase = VerifyOtpUseCase {
        users: users.clone(),
        otps,
    };
    usecase
        .execute(VerifyOtpInput {
            lookup: Lookup::ByEmail(user.email.clone()),
            otp: code,
        })
        .await
        .unwrap();

    let stored = users.users.lock().unwrap();
    assert!(stored[0].is_verified);
}

#[tokio::test]
async fn should_surface_otp_invalid_and_leave_user_unverified_on_mismatch() {
    let user = unverified_user();
    let users = MockUserRepo::new(vec![user.clone()]);
    let otps = MockOtpRepo::empty();
    issue_challenge(&otps, user.id, &otp_settings()).await.unwrap();

    let usecase = VerifyOtpUseCase {
        users: users.clone(),
        otps: otps.clone(),
    };
    let result = usecase
        .execute(VerifyOtpInput {
            lookup: Lookup::ByEmail(user.email.clone()),
            otp: "00000000".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(IdentityServiceError::OtpInvalid)));

    let stored = users.users.lock().unwrap();
    assert!(!stored[0].is_verified);
    // The mismatch still consumed the challenge.
    assert!(otps.challenges_handle().lock().unwrap()[0].used_at.is_some());
}
