use super::*;

fn cargo(id: &str, flight: &str, shipper: &str, consignee: &str) -> Cargo {
    Cargo {
        cargo_id: CargoId::from(id),
        flight_number: flight.to_string(),
        origin_airport: "NRT".to_string(),
        destination_airport: "JFK".to_string(),
        cargo_type: "一般貨物".to_string(),
        weight: 100.0,
        volume: 1.5,
        status: "PENDING".to_string(),
        shipper_name: shipper.to_string(),
        consignee_name: consignee.to_string(),
        created_date: None,
        updated_date: None,
        version: None,
    }
}

fn sample_list() -> Vec<Cargo> {
    vec![
        cargo("C1", "NH101", "Acme", "Globex"),
        cargo("C2", "JL5", "Initech", "Umbrella"),
        cargo("CARGO-7F", "NH202", "Stark", "ACME Retail"),
    ]
}

fn ids(cargos: &[&Cargo]) -> Vec<String> {
    cargos
        .iter()
        .map(|cargo| cargo.cargo_id.to_string())
        .collect()
}

fn loaded_state(cargos: Vec<Cargo>) -> CargoScreenState {
    let mut state = CargoScreenState::default();
    let effects = update(&mut state, Action::Load);
    let Some(Effect::Fetch { request }) = effects.first().cloned() else {
        panic!("expected fetch, got {effects:?}");
    };
    update(&mut state, Action::Loaded { request, cargos });
    state
}

fn fill_create_form(state: &mut CargoScreenState) {
    let values = [
        (CargoField::FlightNumber, "NH303"),
        (CargoField::OriginAirport, "HND"),
        (CargoField::DestinationAirport, "LHR"),
        (CargoField::CargoType, "医薬品"),
        (CargoField::Weight, "42.5"),
        (CargoField::Volume, "0.3"),
        (CargoField::ShipperName, "Wayne"),
        (CargoField::ConsigneeName, "Kent"),
    ];
    for (field, value) in values {
        update(
            state,
            Action::FieldChanged {
                field,
                value: value.to_string(),
            },
        );
    }
}

fn count_fetches(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Fetch { .. }))
        .count()
}

#[test]
fn search_matches_shipper_case_insensitively() {
    let list = vec![cargo("C1", "NH101", "Acme", "Globex")];
    assert_eq!(ids(&filter_cargos(&list, "acme")), vec!["C1"]);
    assert!(filter_cargos(&list, "zz").is_empty());
}

#[test]
fn search_covers_all_four_fields_and_keeps_order() {
    let list = sample_list();
    assert_eq!(ids(&filter_cargos(&list, "ACME")), vec!["C1", "CARGO-7F"]);
    assert_eq!(ids(&filter_cargos(&list, "nh")), vec!["C1", "CARGO-7F"]);
    assert_eq!(ids(&filter_cargos(&list, "umbr")), vec!["C2"]);
    assert_eq!(ids(&filter_cargos(&list, "cargo-7")), vec!["CARGO-7F"]);
    assert_eq!(ids(&filter_cargos(&list, "")), vec!["C1", "C2", "CARGO-7F"]);
}

#[test]
fn search_ignores_fields_outside_the_four() {
    let list = sample_list();
    assert!(filter_cargos(&list, "NRT").is_empty());
    assert!(filter_cargos(&list, "PENDING").is_empty());
}

#[test]
fn search_returns_exactly_the_matching_subset() {
    let lists = [
        Vec::new(),
        sample_list(),
        vec![
            cargo("Ü-1", "JL5", "Ünited Émirates Freight", "Σοφία Trading"),
            cargo("c-2", "NH9", "Müller GmbH", "ÉCOLE Lyon"),
            cargo("C-3", "LH7", "Acme", "ΣΟΦΊΑ Logistics"),
        ],
    ];
    let terms = ["", "acme", "ÉMIR", "müller", "MÜLLER", "école", "σοφία", "c-", "zz"];

    for list in &lists {
        for term in terms {
            let needle = term.to_lowercase();
            let expected: Vec<&Cargo> = list
                .iter()
                .filter(|cargo| {
                    [
                        &cargo.cargo_id.0,
                        &cargo.flight_number,
                        &cargo.shipper_name,
                        &cargo.consignee_name,
                    ]
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
                })
                .collect();
            assert_eq!(filter_cargos(list, term), expected, "term {term:?}");
        }
    }

    let mixed = &lists[2];
    assert_eq!(ids(&filter_cargos(mixed, "ÉMIR")), vec!["Ü-1"]);
    assert_eq!(ids(&filter_cargos(mixed, "MÜLLER")), vec!["c-2"]);
    assert_eq!(ids(&filter_cargos(mixed, "école")), vec!["c-2"]);
    assert_eq!(ids(&filter_cargos(mixed, "σοφία")), vec!["Ü-1", "C-3"]);
    assert_eq!(ids(&filter_cargos(mixed, "ü-")), vec!["Ü-1"]);
    assert!(filter_cargos(&lists[0], "").is_empty());
}

#[test]
fn visible_cargos_follow_the_search_term() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::Search("stark".to_string()));
    assert_eq!(ids(&state.visible_cargos()), vec!["CARGO-7F"]);
    assert_eq!(state.cargos.len(), 3);
}

#[test]
fn load_replaces_the_entire_list() {
    let mut state = loaded_state(sample_list());
    let effects = update(&mut state, Action::Load);
    let [Effect::Fetch { request }] = effects.as_slice() else {
        panic!("expected a single fetch, got {effects:?}");
    };
    update(
        &mut state,
        Action::Loaded {
            request: *request,
            cargos: vec![cargo("C9", "JL9", "Solo", "Only")],
        },
    );
    assert_eq!(ids(&state.visible_cargos()), vec!["C9"]);
    assert_eq!(state.loading, None);
}

#[test]
fn failed_load_keeps_previous_list() {
    let mut state = loaded_state(sample_list());
    let effects = update(&mut state, Action::Load);
    let [Effect::Fetch { request }] = effects.as_slice() else {
        panic!("expected a single fetch, got {effects:?}");
    };
    update(&mut state, Action::LoadFailed { request: *request });
    assert_eq!(state.cargos, sample_list());
    assert_eq!(state.loading, None);
}

#[test]
fn stale_load_response_is_discarded_instead_of_overwriting_newer_list() {
    let mut state = CargoScreenState::default();
    let first = update(&mut state, Action::Load);
    let second = update(&mut state, Action::Load);
    let (Some(Effect::Fetch { request: older }), Some(Effect::Fetch { request: newer })) =
        (first.first().cloned(), second.first().cloned())
    else {
        panic!("expected two fetches");
    };
    assert!(newer > older);

    update(
        &mut state,
        Action::Loaded {
            request: newer,
            cargos: sample_list(),
        },
    );
    update(
        &mut state,
        Action::Loaded {
            request: older,
            cargos: vec![cargo("OLD", "XX1", "Old", "Old")],
        },
    );

    assert_eq!(state.cargos, sample_list());
}

#[test]
fn open_for_create_clears_previous_edit() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenEdit(sample_list()[0].clone()));
    update(&mut state, Action::OpenCreate);

    let dialog = state.dialog.as_ref().expect("dialog open");
    assert_eq!(dialog.editing, None);
    assert_eq!(dialog.form, CargoForm::for_create());
}

#[test]
fn submitting_create_issues_post_then_exactly_one_reload() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenCreate);
    fill_create_form(&mut state);

    let effects = update(&mut state, Action::Submit);
    let [Effect::Create { request, draft }] = effects.as_slice() else {
        panic!("expected create, got {effects:?}");
    };
    assert_eq!(draft.weight, 42.5);
    assert_eq!(draft.cargo_type, "医薬品");
    assert_eq!(
        state.mutation.map(|pending| pending.kind),
        Some(MutationKind::Create)
    );

    let follow_up = update(&mut state, Action::MutationSucceeded { request: *request });
    assert_eq!(count_fetches(&follow_up), 1);
    assert_eq!(follow_up.len(), 1);
    assert!(!state.is_dialog_open());
    assert_eq!(state.mutation, None);
}

#[test]
fn unmodified_edit_submits_the_record_values() {
    let record = sample_list()[1].clone();
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenEdit(record.clone()));

    let effects = update(&mut state, Action::Submit);
    let [Effect::Update {
        cargo_id, draft, ..
    }] = effects.as_slice()
    else {
        panic!("expected update, got {effects:?}");
    };
    assert_eq!(cargo_id, &record.cargo_id);
    assert_eq!(draft, &CargoDraft::from(&record));
}

#[test]
fn failed_update_keeps_list_and_dialog() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenEdit(sample_list()[0].clone()));
    update(
        &mut state,
        Action::FieldChanged {
            field: CargoField::ShipperName,
            value: "Changed".to_string(),
        },
    );
    let effects = update(&mut state, Action::Submit);
    let [Effect::Update { request, .. }] = effects.as_slice() else {
        panic!("expected update, got {effects:?}");
    };

    let follow_up = update(&mut state, Action::MutationFailed { request: *request });
    assert!(follow_up.is_empty());
    assert_eq!(state.cargos, sample_list());
    let dialog = state.dialog.as_ref().expect("dialog stays open");
    assert_eq!(dialog.form.shipper_name, "Changed");
    assert_eq!(state.mutation, None);
}

#[test]
fn invalid_form_is_rejected_locally_and_keeps_dialog_open() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenCreate);
    fill_create_form(&mut state);
    update(
        &mut state,
        Action::FieldChanged {
            field: CargoField::Weight,
            value: "heavy".to_string(),
        },
    );

    let effects = update(&mut state, Action::Submit);
    assert!(effects.is_empty());
    assert_eq!(
        form_error(&state),
        Some(&FormError::NotANumber {
            field: CargoField::Weight,
            value: "heavy".to_string(),
        })
    );
    assert_eq!(state.mutation, None);

    update(
        &mut state,
        Action::FieldChanged {
            field: CargoField::Weight,
            value: "4".to_string(),
        },
    );
    assert_eq!(form_error(&state), None);
}

#[test]
fn second_submit_while_mutation_in_flight_is_ignored() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenCreate);
    fill_create_form(&mut state);

    let first = update(&mut state, Action::Submit);
    assert_eq!(first.len(), 1);
    let second = update(&mut state, Action::Submit);
    assert!(second.is_empty());
}

#[test]
fn delete_requires_confirmation_before_request() {
    let mut state = loaded_state(sample_list());
    let effects = update(&mut state, Action::RequestDelete(CargoId::from("C2")));
    assert_eq!(
        effects,
        vec![Effect::Confirm {
            cargo_id: CargoId::from("C2"),
            prompt: DELETE_CONFIRMATION_PROMPT,
        }]
    );
    assert_eq!(state.mutation, None);

    let effects = update(&mut state, Action::ConfirmDelete);
    let [Effect::Delete { request, cargo_id }] = effects.as_slice() else {
        panic!("expected delete, got {effects:?}");
    };
    assert_eq!(cargo_id, &CargoId::from("C2"));

    let follow_up = update(&mut state, Action::MutationSucceeded { request: *request });
    assert_eq!(count_fetches(&follow_up), 1);
}

#[test]
fn cancelled_delete_sends_nothing() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::RequestDelete(CargoId::from("C1")));
    update(&mut state, Action::CancelDelete);
    assert!(update(&mut state, Action::ConfirmDelete).is_empty());
    assert_eq!(state.cargos, sample_list());
}

#[test]
fn repeated_delete_confirmation_while_in_flight_is_ignored() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::RequestDelete(CargoId::from("C1")));
    assert_eq!(update(&mut state, Action::ConfirmDelete).len(), 1);

    update(&mut state, Action::RequestDelete(CargoId::from("C1")));
    assert!(update(&mut state, Action::ConfirmDelete).is_empty());
}

#[test]
fn result_for_unknown_request_changes_nothing() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenCreate);
    let before = state.clone();
    assert!(update(&mut state, Action::MutationSucceeded { request: RequestId(99) }).is_empty());
    assert_eq!(state, before);
}

#[test]
fn screen_state_serializes_and_restores() {
    let mut state = loaded_state(sample_list());
    update(&mut state, Action::OpenEdit(sample_list()[0].clone()));
    update(&mut state, Action::Search("nh".to_string()));

    let encoded = serde_json::to_string(&state).expect("encode");
    let restored: CargoScreenState = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(restored, state);

    let mut restored = restored;
    let effects = update(&mut restored, Action::Load);
    let mut original = state;
    assert_eq!(effects, update(&mut original, Action::Load));
}
