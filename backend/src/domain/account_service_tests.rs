//! Tests for the account service.

use std::sync::Arc;

use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockAccountRepository, MockNotifier, NotifierError};
use crate::domain::test_fixtures::{
    VecRepository, admin, farm, farmer, fixture_clock, fixture_now,
};
use crate::domain::{ErrorCode, Notice};

fn account(role: Role, assigned_farm: Option<Uuid>) -> Account {
    Account {
        id: UserId::random(),
        username: "wanjiru".to_owned(),
        email: "wanjiru@example.com".to_owned(),
        first_name: "Wanjiru".to_owned(),
        last_name: "Kamau".to_owned(),
        role,
        assigned_farm,
        phone: String::new(),
        created_at: fixture_now(),
    }
}

struct Parts {
    farm: Farm,
    accounts: MockAccountRepository,
    notifier: MockNotifier,
}

#[fixture]
fn parts() -> Parts {
    Parts {
        farm: farm("Kiambu Dairy"),
        accounts: MockAccountRepository::new(),
        notifier: MockNotifier::new(),
    }
}

impl Parts {
    fn build(self) -> AccountService {
        AccountService::new(
            Arc::new(self.accounts),
            VecRepository::<Farm>::with(vec![self.farm]),
            Arc::new(self.notifier),
            fixture_clock(),
        )
    }
}

fn invite(farm_id: Uuid, email: &str) -> FarmerInvite {
    FarmerInvite {
        email: email.to_owned(),
        farm_id,
        first_name: "Otieno".to_owned(),
        last_name: String::new(),
        phone: "+254711000000".to_owned(),
    }
}

#[rstest]
#[case(Role::Admin, Landing::FarmSelection)]
#[case(Role::Farmer, Landing::FarmDashboard)]
#[tokio::test]
async fn login_returns_landing_for_role(
    mut parts: Parts,
    #[case] role: Role,
    #[case] landing: Landing,
) {
    let stored = account(role, None);
    let digest = PasswordDigest::derive("s3cret");
    parts
        .accounts
        .expect_find_credentials()
        .withf(|username: &str| username == "wanjiru")
        .returning(move |_| Ok(Some((stored.clone(), digest.clone()))));

    let creds = LoginCredentials::try_from_parts("wanjiru", "s3cret").expect("credentials");
    let outcome = parts.build().login(&creds).await.expect("login succeeds");
    assert_eq!(outcome.landing, landing);
    assert_eq!(outcome.account.username, "wanjiru");
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn bad_credentials_are_unauthorised(mut parts: Parts, #[case] user_exists: bool) {
    let stored = account(Role::Farmer, None);
    let digest = PasswordDigest::derive("s3cret");
    parts.accounts.expect_find_credentials().returning(move |_| {
        Ok(user_exists.then(|| (stored.clone(), digest.clone())))
    });

    let creds = LoginCredentials::try_from_parts("wanjiru", "wrong").expect("credentials");
    let err = parts.build().login(&creds).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn unknown_session_user_is_unauthorised(mut parts: Parts) {
    parts.accounts.expect_find_by_id().returning(|_| Ok(None));
    let err = parts
        .build()
        .principal(UserId::random())
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn farmers_only_see_themselves(mut parts: Parts) {
    let me = farmer(None);
    let other = UserId::random();
    parts.accounts.expect_find_by_id().times(0);

    let err = parts
        .build()
        .get(&me, other)
        .await
        .expect_err("other account");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn farmer_listing_is_scoped_to_self(mut parts: Parts) {
    let me = farmer(None);
    let user_id = me.user_id;
    parts
        .accounts
        .expect_list()
        .withf(move |scope: &Scope| *scope == Scope::Account(user_id))
        .times(1)
        .returning(|_| Ok(Vec::new()));

    parts.build().list(&me).await.expect("list succeeds");
}

#[rstest]
#[tokio::test]
async fn admins_invite_farmers(mut parts: Parts) {
    let farm_id = parts.farm.id;
    parts
        .accounts
        .expect_insert()
        .withf(move |account: &Account, digest: &PasswordDigest| {
            account.username == "new.farmer@example.com"
                && account.role == Role::Farmer
                && account.assigned_farm == Some(farm_id)
                && !digest.as_str().is_empty()
        })
        .times(1)
        .returning(|_, _| Ok(()));
    parts.notifier.expect_notify().returning(|_| Ok(()));

    let account = parts
        .build()
        .invite(&admin(), invite(farm_id, "  new.farmer@example.com "))
        .await
        .expect("invite succeeds");
    assert_eq!(account.email, "new.farmer@example.com");
    assert_eq!(account.created_at, fixture_now());
}

#[rstest]
#[tokio::test]
async fn farmers_cannot_invite(mut parts: Parts) {
    parts.accounts.expect_insert().times(0);
    let farm_id = parts.farm.id;
    let err = parts
        .build()
        .invite(&farmer(Some(farm_id)), invite(farm_id, "x@example.com"))
        .await
        .expect_err("admin only");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case("not-an-email")]
#[case("   ")]
#[tokio::test]
async fn invalid_emails_are_rejected(mut parts: Parts, #[case] email: &str) {
    parts.accounts.expect_insert().times(0);
    let farm_id = parts.farm.id;
    let err = parts
        .build()
        .invite(&admin(), invite(farm_id, email))
        .await
        .expect_err("bad email");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "email");
}

#[rstest]
#[tokio::test]
async fn unknown_farm_is_rejected(mut parts: Parts) {
    parts.accounts.expect_insert().times(0);
    let err = parts
        .build()
        .invite(&admin(), invite(Uuid::new_v4(), "x@example.com"))
        .await
        .expect_err("unknown farm");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "farm_id");
}

#[rstest]
#[tokio::test]
async fn duplicate_usernames_conflict(mut parts: Parts) {
    parts
        .accounts
        .expect_insert()
        .returning(|_, _| Err(StoreError::conflict("accounts_username_key")));
    let farm_id = parts.farm.id;
    let err = parts
        .build()
        .invite(&admin(), invite(farm_id, "dup@example.com"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn invitation_notice_carries_credentials(mut parts: Parts) {
    parts
        .notifier
        .expect_notify()
        .withf(|notice: &Notice| {
            notice.subject == "Dairy Farm App Invitation"
                && notice.recipients == vec!["wanjiru@example.com".to_owned()]
                && notice.text.contains("Username: wanjiru")
                && notice.text.contains("Password: Abc123Def456")
        })
        .times(1)
        .returning(|_| Err(NotifierError::transport("relay offline")));

    let service = parts.build();
    service
        .send_invitation(Invitation {
            account: account(Role::Farmer, None),
            password: "Abc123Def456".to_owned(),
        })
        .await
        .expect("delivery task completes");
}

#[rstest]
#[tokio::test]
async fn bootstrap_admin_is_created_once(mut parts: Parts) {
    let existing = account(Role::Admin, None);
    let digest = PasswordDigest::derive("pw");
    let mut calls = 0;
    parts.accounts.expect_find_credentials().returning(move |_| {
        calls += 1;
        Ok((calls > 1).then(|| (existing.clone(), digest.clone())))
    });
    parts
        .accounts
        .expect_insert()
        .withf(|account: &Account, _: &PasswordDigest| account.role == Role::Admin)
        .times(1)
        .returning(|_, _| Ok(()));

    let service = parts.build();
    assert!(service.ensure_admin("root", "root@example.com", "pw").await.expect("first run"));
    assert!(!service.ensure_admin("root", "root@example.com", "pw").await.expect("second run"));
}
