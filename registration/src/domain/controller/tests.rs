//! Behaviour of the registration form controller under a virtual clock.

use std::time::Duration;

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{GeolocationError, MockGeolocator, MockNavigator};
use crate::domain::{BankingField, FieldErrorCode, GeoPosition, PostRegistrationView};
use crate::test_support::{MutableClock, RecordingNavigator, RecordingNotifier, RecordingStore};

struct Harness {
    store: Arc<RecordingStore>,
    clock: Arc<MutableClock>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

impl Harness {
    fn deps(&self) -> ControllerDeps {
        let mut geolocator = MockGeolocator::new();
        geolocator
            .expect_current_position()
            .returning(|| Err(GeolocationError::unsupported()));
        ControllerDeps::new(
            self.store.clone(),
            self.clock.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
            Arc::new(geolocator),
        )
    }

    fn mount(&self, role: RegistrationRole) -> RegistrationFormController {
        RegistrationFormController::mount(role, self.deps())
    }

    fn advance(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }
}

#[fixture]
fn harness() -> Harness {
    let start = Utc
        .with_ymd_and_hms(2025, 5, 20, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    Harness {
        store: Arc::new(RecordingStore::new()),
        clock: Arc::new(MutableClock::new(start)),
        notifier: Arc::new(RecordingNotifier::default()),
        navigator: Arc::new(RecordingNavigator::default()),
    }
}

fn fill_vendor(controller: &mut RegistrationFormController) {
    for (field, value) in [
        (FormField::BusinessName, "Spaza Connect"),
        (FormField::FirstName, "Thabo"),
        (FormField::LastName, "Mokoena"),
        (FormField::Email, "thabo@spaza.co.za"),
        (FormField::Phone, "0821234567"),
        (FormField::AccountNumber, "123456789"),
    ] {
        controller.set_field(field, value).expect("vendor field");
    }
    controller.select_bank("FNB").expect("vendor bank");
}

fn fill_admin(controller: &mut RegistrationFormController, email: &str) {
    for (field, value) in [
        (FormField::FirstName, "Naledi"),
        (FormField::LastName, "Dlamini"),
        (FormField::Email, email),
        (FormField::Phone, "0117654321"),
        (FormField::BankName, "Capitec"),
        (FormField::AccountNumber, "987654321"),
    ] {
        controller.set_field(field, value).expect("admin field");
    }
}

#[rstest]
fn mount_on_empty_store_starts_blank(harness: Harness) {
    let controller = harness.mount(RegistrationRole::Customer);

    assert_eq!(controller.phase(), FormPhase::Editing);
    assert!(controller.form().is_blank());
    assert!(controller.errors().is_empty());
    assert_eq!(controller.location(), DEFAULT_LOCATION_FALLBACK);
    assert!(harness.notifier.notices().is_empty());
}

#[rstest]
fn mount_restores_draft_exactly(harness: Harness) {
    harness
        .store
        .set(
            &StorageKey::Draft(RegistrationRole::Vendor),
            r#"{"firstName":"Thabo","bankName":"FNB","accountNumber":"123456789"}"#,
        )
        .expect("seed draft");

    let controller = harness.mount(RegistrationRole::Vendor);

    let mut expected = RoleFormData::empty(RegistrationRole::Vendor);
    expected.set_field(FormField::FirstName, "Thabo");
    expected.set_field(FormField::BankName, "FNB");
    expected.set_field(FormField::AccountNumber, "123456789");
    assert_eq!(controller.form(), &expected);
    assert_eq!(
        harness.notifier.notices(),
        vec![RegistrationNotice::DraftRestored {
            role: RegistrationRole::Vendor,
            restored_fields: vec![
                FormField::FirstName,
                FormField::BankName,
                FormField::AccountNumber,
            ],
        }]
    );
}

#[rstest]
fn banking_fields_overlay_draft(harness: Harness) {
    harness
        .store
        .set(
            &StorageKey::Draft(RegistrationRole::Admin),
            r#"{"firstName":"Naledi","accountNumber":"111"}"#,
        )
        .expect("seed draft");
    harness
        .store
        .set(
            &StorageKey::BankingField(BankingField::AccountNumber),
            "\"111222\"",
        )
        .expect("seed field");

    let controller = harness.mount(RegistrationRole::Admin);

    assert_eq!(controller.form().field(FormField::AccountNumber), Some("111222"));
    assert_eq!(controller.form().field(FormField::FirstName), Some("Naledi"));
}

#[rstest]
fn customer_mount_ignores_banking_fields(harness: Harness) {
    harness
        .store
        .set(&StorageKey::BankingField(BankingField::BankName), "\"ABSA\"")
        .expect("seed field");

    let controller = harness.mount(RegistrationRole::Customer);

    assert!(controller.form().is_blank());
    assert!(harness.notifier.notices().is_empty());
}

#[rstest]
fn mount_uses_geolocated_position(harness: Harness) {
    let mut geolocator = MockGeolocator::new();
    geolocator.expect_current_position().times(1).returning(|| {
        Ok(GeoPosition {
            latitude: -33.924_87,
            longitude: 18.424_055,
        })
    });
    let deps = ControllerDeps {
        geolocator: Arc::new(geolocator),
        ..harness.deps()
    };

    let controller = RegistrationFormController::mount(RegistrationRole::Customer, deps);

    assert_eq!(controller.location(), "-33.9249, 18.4241");
}

#[rstest]
fn edits_are_debounced_until_tick(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Vendor);
    for value in ["1", "12", "123"] {
        controller
            .set_field(FormField::AccountNumber, value)
            .expect("vendor field");
        harness.advance(100);
        assert_eq!(controller.tick(), 0);
    }

    harness.advance(400);
    assert_eq!(controller.tick(), 1, "field cache flushes first");
    harness.advance(500);
    assert_eq!(controller.tick(), 1, "draft flushes after its longer window");

    let field_key = StorageKey::BankingField(BankingField::AccountNumber);
    let draft_key = StorageKey::Draft(RegistrationRole::Vendor);
    assert_eq!(harness.store.write_count(&field_key), 1);
    assert_eq!(harness.store.write_count(&draft_key), 1);
    assert_eq!(harness.store.raw(&field_key).as_deref(), Some("\"123\""));
    assert!(controller.next_deadline().is_none());
}

#[rstest]
fn caches_agree_once_both_windows_elapse(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Admin);
    controller
        .set_field(FormField::AccountNumber, "4455")
        .expect("admin field");
    controller.select_bank("Nedbank").expect("admin bank");
    harness.advance(300);
    controller
        .set_field(FormField::AccountNumber, "445566")
        .expect("admin field");
    controller
        .set_field(FormField::RoutingNumber, "RT-7")
        .expect("admin field");

    harness.advance(DEFAULT_FIELD_DEBOUNCE.as_millis().try_into().expect("small window"));
    controller.tick();
    let store: Arc<dyn KeyValueStore> = harness.store.clone();
    let draft_cache = DraftSnapshotCache::new(Arc::clone(&store), DEFAULT_DRAFT_DEBOUNCE);
    let field_cache = FieldAutoSaveCache::new(store, DEFAULT_FIELD_DEBOUNCE);
    assert!(draft_cache.load_draft(RegistrationRole::Admin).is_none());

    harness.advance(DEFAULT_DRAFT_DEBOUNCE.as_millis().try_into().expect("small window"));
    controller.tick();

    let draft = draft_cache
        .load_draft(RegistrationRole::Admin)
        .expect("draft flushed");
    let banking = draft.banking().expect("admin forms carry banking details");
    let fields = field_cache.load_all();
    assert_eq!(fields.len(), BankingField::ALL.len());
    for (field, value) in &fields {
        assert_eq!(banking.get(*field), value.as_str(), "{field:?}");
    }
    assert_eq!(fields[&BankingField::AccountNumber], "445566");
    assert_eq!(fields[&BankingField::BranchCode], "198765");
}

#[rstest]
fn rejects_fields_outside_the_role(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Customer);

    assert_eq!(
        controller.set_field(FormField::BankName, "FNB"),
        Err(FormError::FieldNotApplicable {
            role: RegistrationRole::Customer,
            field: FormField::BankName,
        })
    );
    assert!(controller.select_bank("FNB").is_err());
    assert!(controller.next_deadline().is_none());
}

#[rstest]
#[case("Standard Bank", "051001")]
#[case("NonexistentBank", "")]
fn select_bank_assigns_branch_code(
    harness: Harness,
    #[case] bank: &str,
    #[case] expected: &str,
) {
    let mut controller = harness.mount(RegistrationRole::Vendor);

    assert_eq!(controller.select_bank(bank).expect("vendor bank"), expected);
    assert_eq!(controller.form().field(FormField::BankName), Some(bank));
    assert_eq!(controller.form().field(FormField::BranchCode), Some(expected));
}

#[rstest]
fn select_bank_prefers_recorded_override(harness: Harness) {
    BranchCodeResolver::built_in(harness.store.clone())
        .record_override("Standard Bank", "020909")
        .expect("record override");
    let mut controller = harness.mount(RegistrationRole::Admin);

    assert_eq!(
        controller.select_bank("Standard Bank").expect("admin bank"),
        "020909"
    );
}

#[rstest]
fn invalid_submission_returns_to_editing(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Vendor);
    fill_vendor(&mut controller);
    controller
        .set_field(FormField::BusinessName, " ")
        .expect("vendor field");

    let outcome = controller.submit().expect("submit");

    let SubmitOutcome::Rejected { errors } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![FormField::BusinessName]);
    assert_eq!(controller.phase(), FormPhase::Editing);
    assert_eq!(controller.errors(), &errors);
    assert!(controller.record().is_none());
    assert!(!harness
        .store
        .contains(&StorageKey::FinalizedAccount(RegistrationRole::Vendor)));
    assert!(harness.navigator.views().is_empty());
    assert!(harness.notifier.notices().contains(&RegistrationNotice::ValidationFailed {
        role: RegistrationRole::Vendor,
        fields: vec![FormField::BusinessName],
    }));
}

#[rstest]
fn fixing_a_field_clears_its_error(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Customer);
    controller.submit().expect("submit");
    assert!(controller.errors().contains_key(&FormField::Email));

    controller
        .set_field(FormField::Email, "not-an-email")
        .expect("customer field");
    assert!(controller.errors().contains_key(&FormField::Email));

    controller
        .set_field(FormField::Email, "lerato@example.com")
        .expect("customer field");
    assert!(!controller.errors().contains_key(&FormField::Email));
    assert!(controller.errors().contains_key(&FormField::FirstName));
}

#[rstest]
fn successful_submission_replaces_draft_with_record(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Vendor);
    fill_vendor(&mut controller);
    harness.advance(1_000);
    controller.tick();
    let draft_key = StorageKey::Draft(RegistrationRole::Vendor);
    assert!(harness.store.contains(&draft_key));
    controller
        .set_field(FormField::Phone, "0820000000")
        .expect("vendor field");

    let outcome = controller.submit().expect("submit");

    let SubmitOutcome::Registered { record } = outcome else {
        panic!("expected registration, got {outcome:?}");
    };
    assert_eq!(controller.phase(), FormPhase::Submitted);
    assert!(record.account_id.starts_with("OC-"));
    assert_eq!(record.registered_at, harness.clock.utc());
    assert!(record.flags.vendor);
    assert!(!harness.store.contains(&draft_key));
    for field in BankingField::ALL {
        assert!(!harness.store.contains(&StorageKey::BankingField(field)));
    }
    assert!(harness
        .store
        .contains(&StorageKey::FinalizedAccount(RegistrationRole::Vendor)));
    assert_eq!(
        harness
            .store
            .raw(&StorageKey::Authenticated(RegistrationRole::Vendor))
            .as_deref(),
        Some("true")
    );
    assert_eq!(harness.navigator.views(), vec![PostRegistrationView::VendorPortal]);

    harness.advance(5_000);
    assert_eq!(controller.tick(), 0, "pending saves were cancelled");
    assert!(!harness.store.contains(&draft_key));
}

#[rstest]
fn submitted_form_is_read_only(harness: Harness) {
    let mut controller = harness.mount(RegistrationRole::Admin);
    fill_admin(&mut controller, "admin@myonecard.ai");
    controller.submit().expect("submit");

    let expected = FormError::AlreadySubmitted {
        role: RegistrationRole::Admin,
    };
    assert_eq!(controller.set_field(FormField::Phone, "1"), Err(expected.clone()));
    assert_eq!(controller.submit(), Err(expected));
}

#[rstest]
#[case("not-admin@example.com", false)]
#[case("admin@myonecard.ai", true)]
fn admin_allow_list_gates_submission(
    harness: Harness,
    #[case] email: &str,
    #[case] accepted: bool,
) {
    let mut controller = harness.mount(RegistrationRole::Admin);
    fill_admin(&mut controller, email);

    let outcome = controller.submit().expect("submit");

    let stored = harness
        .store
        .contains(&StorageKey::FinalizedAccount(RegistrationRole::Admin));
    assert_eq!(stored, accepted);
    match outcome {
        SubmitOutcome::Registered { .. } => assert!(accepted),
        SubmitOutcome::Rejected { errors } => {
            assert!(!accepted);
            let error = &errors[&FormField::Email];
            assert_eq!(error.code, FieldErrorCode::UnauthorizedEmail);
            assert!(error.message.starts_with("Unauthorized email"));
        }
    }
}

#[rstest]
fn record_write_failure_does_not_block_completion(harness: Harness) {
    harness
        .store
        .reject_writes_to(StorageKey::FinalizedAccount(RegistrationRole::Customer));
    let mut controller = harness.mount(RegistrationRole::Customer);
    for (field, value) in [
        (FormField::FirstName, "Lerato"),
        (FormField::LastName, "Khumalo"),
        (FormField::Email, "lerato@example.com"),
        (FormField::Phone, "0831112222"),
    ] {
        controller.set_field(field, value).expect("customer field");
    }

    let outcome = controller.submit().expect("submit");

    assert!(matches!(outcome, SubmitOutcome::Registered { .. }));
    assert_eq!(controller.phase(), FormPhase::Submitted);
    assert!(controller.record().is_some());
    assert_eq!(
        harness.navigator.views(),
        vec![PostRegistrationView::CustomerDashboard]
    );
}

#[rstest]
fn navigator_receives_role_view(harness: Harness) {
    let mut navigator = MockNavigator::new();
    navigator
        .expect_navigate()
        .withf(|view| *view == PostRegistrationView::NerveCenter)
        .times(1)
        .return_const(());
    let deps = ControllerDeps {
        navigator: Arc::new(navigator),
        ..harness.deps()
    };
    let mut controller = RegistrationFormController::mount(RegistrationRole::Admin, deps);
    fill_admin(&mut controller, "superadmin@myonecard.ai");

    assert!(matches!(
        controller.submit(),
        Ok(SubmitOutcome::Registered { .. })
    ));
}

#[rstest]
fn custom_settings_change_windows_and_allow_list(harness: Harness) {
    let settings = ControllerSettings {
        field_debounce: Duration::from_millis(50),
        draft_debounce: Duration::from_millis(80),
        location_fallback: "Johannesburg".to_owned(),
        policy: ValidationPolicy::new(["ops@addex.example"]),
    };
    let mut controller = RegistrationFormController::mount(
        RegistrationRole::Admin,
        harness.deps().with_settings(settings),
    );
    assert_eq!(controller.location(), "Johannesburg");

    controller
        .set_field(FormField::BankName, "ABSA")
        .expect("admin field");
    harness.advance(80);
    assert_eq!(controller.tick(), 2);

    fill_admin(&mut controller, "admin@myonecard.ai");
    assert!(matches!(
        controller.submit(),
        Ok(SubmitOutcome::Rejected { .. })
    ));
}
