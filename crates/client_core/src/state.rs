//! Screen state for the cargo list and its edit dialog, changed only through [`update`].
//!
//! `update` never performs I/O. It returns [`Effect`]s that the caller executes and
//! whose results come back in as further [`Action`]s. Every fetch and mutation is
//! tagged with a [`RequestId`] so that late responses can be recognised.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Cargo, CargoId},
    protocol::CargoDraft,
};
use tracing::{debug, warn};

use crate::form::{CargoField, CargoForm, FormError};

pub const DELETE_CONFIRMATION_PROMPT: &str = "この貨物を削除しますか？";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub request: RequestId,
    pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoDialog {
    /// `None` while creating a new record.
    pub editing: Option<CargoId>,
    pub form: CargoForm,
    pub error: Option<FormError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoScreenState {
    pub cargos: Vec<Cargo>,
    pub search_term: String,
    pub dialog: Option<CargoDialog>,
    pub pending_delete: Option<CargoId>,
    pub loading: Option<RequestId>,
    pub mutation: Option<PendingMutation>,
    next_request: u64,
}

impl CargoScreenState {
    pub fn visible_cargos(&self) -> Vec<&Cargo> {
        filter_cargos(&self.cargos, &self.search_term)
    }

    pub fn find(&self, cargo_id: &CargoId) -> Option<&Cargo> {
        self.cargos.iter().find(|cargo| &cargo.cargo_id == cargo_id)
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn begin_load(&mut self) -> Effect {
        let request = self.issue_request();
        self.loading = Some(request);
        Effect::Fetch { request }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Load,
    Loaded {
        request: RequestId,
        cargos: Vec<Cargo>,
    },
    LoadFailed {
        request: RequestId,
    },
    Search(String),
    OpenCreate,
    OpenEdit(Cargo),
    CloseDialog,
    FieldChanged {
        field: CargoField,
        value: String,
    },
    Submit,
    MutationSucceeded {
        request: RequestId,
    },
    MutationFailed {
        request: RequestId,
    },
    RequestDelete(CargoId),
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch {
        request: RequestId,
    },
    Create {
        request: RequestId,
        draft: CargoDraft,
    },
    Update {
        request: RequestId,
        cargo_id: CargoId,
        draft: CargoDraft,
    },
    Delete {
        request: RequestId,
        cargo_id: CargoId,
    },
    Confirm {
        cargo_id: CargoId,
        prompt: &'static str,
    },
}

pub fn update(state: &mut CargoScreenState, action: Action) -> Vec<Effect> {
    match action {
        Action::Load => vec![state.begin_load()],
        Action::Loaded { request, cargos } => {
            if state.loading != Some(request) {
                debug!(
                    request = request.0,
                    latest = ?state.loading,
                    "discarding superseded cargo list response"
                );
                return Vec::new();
            }
            state.loading = None;
            state.cargos = cargos;
            Vec::new()
        }
        Action::LoadFailed { request } => {
            if state.loading == Some(request) {
                state.loading = None;
            }
            Vec::new()
        }
        Action::Search(term) => {
            state.search_term = term;
            Vec::new()
        }
        Action::OpenCreate => {
            state.dialog = Some(CargoDialog {
                editing: None,
                form: CargoForm::for_create(),
                error: None,
            });
            Vec::new()
        }
        Action::OpenEdit(cargo) => {
            state.dialog = Some(CargoDialog {
                form: CargoForm::for_edit(&cargo),
                editing: Some(cargo.cargo_id),
                error: None,
            });
            Vec::new()
        }
        Action::CloseDialog => {
            state.dialog = None;
            Vec::new()
        }
        Action::FieldChanged { field, value } => {
            match state.dialog.as_mut() {
                Some(dialog) => {
                    dialog.form.set(field, value);
                    dialog.error = None;
                }
                None => warn!(%field, "field change without an open dialog"),
            }
            Vec::new()
        }
        Action::Submit => submit(state),
        Action::MutationSucceeded { request } => {
            let Some(pending) = settle_mutation(state, request) else {
                return Vec::new();
            };
            if pending.kind != MutationKind::Delete {
                state.dialog = None;
            }
            vec![state.begin_load()]
        }
        Action::MutationFailed { request } => {
            settle_mutation(state, request);
            Vec::new()
        }
        Action::RequestDelete(cargo_id) => {
            state.pending_delete = Some(cargo_id.clone());
            vec![Effect::Confirm {
                cargo_id,
                prompt: DELETE_CONFIRMATION_PROMPT,
            }]
        }
        Action::ConfirmDelete => {
            let Some(cargo_id) = state.pending_delete.take() else {
                return Vec::new();
            };
            if let Some(pending) = state.mutation {
                debug!(
                    %cargo_id,
                    in_flight = pending.request.0,
                    "ignoring delete while another mutation is in flight"
                );
                return Vec::new();
            }
            let request = state.issue_request();
            state.mutation = Some(PendingMutation {
                request,
                kind: MutationKind::Delete,
            });
            vec![Effect::Delete { request, cargo_id }]
        }
        Action::CancelDelete => {
            state.pending_delete = None;
            Vec::new()
        }
    }
}

fn submit(state: &mut CargoScreenState) -> Vec<Effect> {
    if let Some(pending) = state.mutation {
        debug!(
            in_flight = pending.request.0,
            "ignoring submit while another mutation is in flight"
        );
        return Vec::new();
    }
    let Some(dialog) = state.dialog.as_mut() else {
        warn!("submit without an open dialog");
        return Vec::new();
    };

    let draft = match dialog.form.to_draft() {
        Ok(draft) => draft,
        Err(err) => {
            dialog.error = Some(err);
            return Vec::new();
        }
    };
    dialog.error = None;
    let editing = dialog.editing.clone();

    let request = state.issue_request();
    let (kind, effect) = match editing {
        Some(cargo_id) => (
            MutationKind::Update,
            Effect::Update {
                request,
                cargo_id,
                draft,
            },
        ),
        None => (MutationKind::Create, Effect::Create { request, draft }),
    };
    state.mutation = Some(PendingMutation { request, kind });
    vec![effect]
}

fn settle_mutation(state: &mut CargoScreenState, request: RequestId) -> Option<PendingMutation> {
    match state.mutation {
        Some(pending) if pending.request == request => state.mutation.take(),
        _ => {
            debug!(request = request.0, "ignoring result for unknown mutation");
            None
        }
    }
}

/// Case-insensitive substring match on id, flight number, shipper and consignee.
/// An empty term keeps every record. List order is preserved.
pub fn filter_cargos<'a>(cargos: &'a [Cargo], term: &str) -> Vec<&'a Cargo> {
    let needle = term.to_lowercase();
    cargos
        .iter()
        .filter(|cargo| matches_search(cargo, &needle))
        .collect()
}

fn matches_search(cargo: &Cargo, needle: &str) -> bool {
    [
        cargo.cargo_id.as_str(),
        cargo.flight_number.as_str(),
        cargo.shipper_name.as_str(),
        cargo.consignee_name.as_str(),
    ]
    .into_iter()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

pub(crate) fn form_error(state: &CargoScreenState) -> Option<&FormError> {
    state.dialog.as_ref().and_then(|dialog| dialog.error.as_ref())
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
