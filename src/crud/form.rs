use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::ResourceClient;
use crate::crud::notify::{Notice, MSG_CREATED, MSG_NOT_FOUND, MSG_UPDATED};
use crate::crud::ViewContext;
use crate::error::{AdminError, FieldErrors};
use crate::types::{Item, ItemId};

/// The caller-supplied form the adapter drives.
pub trait Form: Send {
    /// Field values to submit
    fn values(&self) -> Map<String, Value>;

    /// Seeds the form with the record being edited
    fn load(&mut self, item: &Item);

    fn set_field_error(&mut self, field: &str, message: &str);

    fn clear_errors(&mut self);

    fn set_submitting(&mut self, submitting: bool);
}

/// Field map form used by the hosts.
///
/// `load` only fills fields that are not already set, so values posted by the
/// user take precedence over the stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonForm {
    pub values: Map<String, Value>,
    pub errors: BTreeMap<String, String>,
    pub submitting: bool,
}

impl JsonForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

impl Form for JsonForm {
    fn values(&self) -> Map<String, Value> {
        self.values.clone()
    }

    fn load(&mut self, item: &Item) {
        for (field, value) in item.to_values() {
            self.values.entry(field).or_insert(value);
        }
    }

    fn set_field_error(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Edit mode before the record arrived; submission is blocked
    Loading,
    Ready,
    Submitting,
    Saved,
    /// The record to edit does not exist
    NotFound,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Saved(Item),
    /// Server-side validation failed; messages are on the form
    Invalid(FieldErrors),
    /// Any other failure, already reported as a notice
    Failed(AdminError),
    /// Submission not allowed in the current status
    Blocked(FormStatus),
}

/// Wraps a caller-supplied form with load, submit, validation mapping,
/// success notice and the redirect back to the list.
pub struct FormAdapter<F: Form> {
    client: ResourceClient,
    mode: FormMode,
    form: F,
    status: FormStatus,
    record: Option<Item>,
    ctx: ViewContext,
    list_path: String,
}

impl<F: Form> FormAdapter<F> {
    pub fn create(client: ResourceClient, form: F, ctx: ViewContext, list_path: String) -> Self {
        Self {
            client,
            mode: FormMode::Create,
            form,
            status: FormStatus::Ready,
            record: None,
            ctx,
            list_path,
        }
    }

    pub fn edit(client: ResourceClient, id: ItemId, form: F, ctx: ViewContext, list_path: String) -> Self {
        Self {
            client,
            mode: FormMode::Edit(id),
            form,
            status: FormStatus::Loading,
            record: None,
            ctx,
            list_path,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn record(&self) -> Option<&Item> {
        self.record.as_ref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn into_form(self) -> F {
        self.form
    }

    pub fn list_path(&self) -> &str {
        &self.list_path
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Cadastrar",
            FormMode::Edit(_) => "Atualizar",
        }
    }

    /// Loads the record in edit mode. A 404 moves the form to `NotFound`.
    pub async fn mount(&mut self) -> Result<(), AdminError> {
        let FormMode::Edit(id) = &self.mode else {
            self.status = FormStatus::Ready;
            return Ok(());
        };

        self.status = FormStatus::Loading;
        match self.client.show(id).await {
            Ok(item) => {
                self.form.load(&item);
                self.record = Some(item);
                self.status = FormStatus::Ready;
                Ok(())
            }
            Err(AdminError::NotFound(msg)) => {
                tracing::info!(resource = self.client.endpoint(), %id, "record not found: {}", msg);
                self.status = FormStatus::NotFound;
                self.ctx.notify(Notice::error(MSG_NOT_FOUND));
                Err(AdminError::NotFound(msg))
            }
            Err(err) => {
                self.ctx.report(&err);
                Err(err)
            }
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.status != FormStatus::Ready {
            return SubmitOutcome::Blocked(self.status);
        }

        self.status = FormStatus::Submitting;
        self.form.clear_errors();
        self.form.set_submitting(true);

        let mut values = self.form.values();
        values.remove("id");

        let result = match &self.mode {
            FormMode::Create => self.client.store(&values).await,
            FormMode::Edit(id) => self.client.update(id, &values).await,
        };

        self.form.set_submitting(false);

        match result {
            Ok(item) => {
                self.status = FormStatus::Saved;
                self.record = Some(item.clone());
                let message = match self.mode {
                    FormMode::Create => MSG_CREATED,
                    FormMode::Edit(_) => MSG_UPDATED,
                };
                self.ctx.notify(Notice::success(message));
                self.ctx.navigator.push(&self.list_path);
                SubmitOutcome::Saved(item)
            }
            Err(AdminError::Validation { message, field_errors }) => {
                for (field, messages) in &field_errors {
                    if let Some(first) = messages.first() {
                        self.form.set_field_error(field, first);
                    }
                }
                if field_errors.is_empty() {
                    self.ctx.notify(Notice::error(message));
                }
                self.status = FormStatus::Ready;
                SubmitOutcome::Invalid(field_errors)
            }
            Err(err) => {
                self.ctx.report(&err);
                self.status = FormStatus::Ready;
                SubmitOutcome::Failed(err)
            }
        }
    }
}
