//! Runs [`state::update`] against a [`CargoApi`]: effects go out as HTTP calls and
//! their results come back in as actions until the queue is drained.

use std::collections::VecDeque;

use anyhow::Result;
use shared::domain::{Cargo, CargoId};
use tracing::{error, info, warn};

use crate::{
    form::{CargoField, CargoForm, FormError},
    state::{self, Action, CargoScreenState, Effect, MutationKind, RequestId},
    CargoApi,
};

pub trait DeleteConfirmation: Send + Sync {
    fn confirm(&self, cargo_id: &CargoId, prompt: &str) -> bool;
}

pub struct AlwaysConfirm;

impl DeleteConfirmation for AlwaysConfirm {
    fn confirm(&self, _cargo_id: &CargoId, _prompt: &str) -> bool {
        true
    }
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&CargoId, &str) -> bool + Send + Sync,
{
    fn confirm(&self, cargo_id: &CargoId, prompt: &str) -> bool {
        self(cargo_id, prompt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    Failed,
    Rejected(FormError),
    Cancelled,
    Ignored,
}

pub struct CargoListController<A: CargoApi> {
    api: A,
    confirmation: Box<dyn DeleteConfirmation>,
    state: CargoScreenState,
}

impl<A: CargoApi> CargoListController<A> {
    pub fn new(api: A, confirmation: impl DeleteConfirmation + 'static) -> Self {
        Self {
            api,
            confirmation: Box::new(confirmation),
            state: CargoScreenState::default(),
        }
    }

    pub fn state(&self) -> &CargoScreenState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Feeds one action through the reducer and executes every resulting effect.
    /// The outcome reflects the first backend result observed.
    pub async fn dispatch(&mut self, action: Action) -> Outcome {
        let mut outcome = Outcome::Ignored;
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            if outcome == Outcome::Ignored {
                outcome = match &action {
                    Action::Loaded { .. } | Action::MutationSucceeded { .. } => Outcome::Completed,
                    Action::LoadFailed { .. } | Action::MutationFailed { .. } => Outcome::Failed,
                    Action::CancelDelete => Outcome::Cancelled,
                    _ => Outcome::Ignored,
                };
            }
            for effect in state::update(&mut self.state, action) {
                let next = self.execute(effect).await;
                queue.push_back(next);
            }
        }
        outcome
    }

    pub async fn load(&mut self) -> Outcome {
        self.dispatch(Action::Load).await
    }

    pub fn filter(&mut self, term: &str) -> Vec<&Cargo> {
        self.apply(Action::Search(term.to_string()));
        self.state.visible_cargos()
    }

    pub fn open_for_create(&mut self) {
        self.apply(Action::OpenCreate);
    }

    /// Opens the dialog for a record from the loaded list. Returns `false`
    /// when the id is not in the list.
    pub fn open_for_edit(&mut self, cargo_id: &CargoId) -> bool {
        let Some(cargo) = self.state.find(cargo_id).cloned() else {
            warn!(%cargo_id, "cannot edit cargo missing from the loaded list");
            return false;
        };
        self.apply(Action::OpenEdit(cargo));
        true
    }

    pub fn field_changed(&mut self, field: CargoField, value: impl Into<String>) {
        self.apply(Action::FieldChanged {
            field,
            value: value.into(),
        });
    }

    pub fn close_dialog(&mut self) {
        self.apply(Action::CloseDialog);
    }

    pub async fn submit(&mut self) -> Outcome {
        let outcome = self.dispatch(Action::Submit).await;
        if outcome != Outcome::Ignored {
            return outcome;
        }
        match state::form_error(&self.state) {
            Some(err) => {
                warn!(%err, "cargo form rejected");
                Outcome::Rejected(err.clone())
            }
            None => Outcome::Ignored,
        }
    }

    pub async fn create(&mut self, form: CargoForm) -> Outcome {
        self.open_for_create();
        self.stage(&form);
        self.submit().await
    }

    pub async fn update(&mut self, cargo_id: &CargoId, form: CargoForm) -> Outcome {
        if !self.open_for_edit(cargo_id) {
            return Outcome::Ignored;
        }
        self.stage(&form);
        self.submit().await
    }

    pub async fn remove(&mut self, cargo_id: &CargoId) -> Outcome {
        self.dispatch(Action::RequestDelete(cargo_id.clone())).await
    }

    fn stage(&mut self, form: &CargoForm) {
        for field in CargoField::ALL {
            self.field_changed(field, form.get(field));
        }
    }

    /// For actions that never produce effects.
    fn apply(&mut self, action: Action) {
        let effects = state::update(&mut self.state, action);
        debug_assert!(effects.is_empty(), "unexpected effects: {effects:?}");
    }

    async fn execute(&self, effect: Effect) -> Action {
        match effect {
            Effect::Fetch { request } => match self.api.list_cargo().await {
                Ok(cargos) => {
                    info!(count = cargos.len(), "loaded cargo list");
                    Action::Loaded { request, cargos }
                }
                Err(err) => {
                    error!("failed to fetch cargo list: {err:#}");
                    Action::LoadFailed { request }
                }
            },
            Effect::Create { request, draft } => {
                let result = self.api.create_cargo(&draft).await;
                settle(request, MutationKind::Create, None, result)
            }
            Effect::Update {
                request,
                cargo_id,
                draft,
            } => {
                let result = self.api.update_cargo(&cargo_id, &draft).await;
                settle(request, MutationKind::Update, Some(&cargo_id), result)
            }
            Effect::Delete { request, cargo_id } => {
                let result = self.api.delete_cargo(&cargo_id).await;
                settle(request, MutationKind::Delete, Some(&cargo_id), result)
            }
            Effect::Confirm { cargo_id, prompt } => {
                if self.confirmation.confirm(&cargo_id, prompt) {
                    Action::ConfirmDelete
                } else {
                    info!(%cargo_id, "cargo deletion cancelled");
                    Action::CancelDelete
                }
            }
        }
    }
}

fn settle(
    request: RequestId,
    kind: MutationKind,
    cargo_id: Option<&CargoId>,
    result: Result<()>,
) -> Action {
    let cargo_id = cargo_id.map(CargoId::as_str).unwrap_or("-");
    match result {
        Ok(()) => {
            info!(?kind, cargo_id, "cargo mutation applied");
            Action::MutationSucceeded { request }
        }
        Err(err) => {
            error!(?kind, cargo_id, "cargo mutation failed: {err:#}");
            Action::MutationFailed { request }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
