// ── Form controllers ──
//
// A `Form<K>` holds raw field input, touched flags, the initial values,
// and the latest validation result. The schema is re-run on every edit,
// so `errors()` always reflects the current values. Submission is gated
// on a clean schema and a single in-flight request.

use std::collections::{BTreeMap, BTreeSet};

use clientele_api::{
    CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest,
    Gender, LoginCredentials,
};
use secrecy::SecretString;
use tracing::debug;

use crate::api::CustomerApi;
use crate::error::CoreError;
use crate::notify::{Notification, Notifier};
use crate::session::{Identity, SessionContext};
use crate::validate::{self, FieldErrors, Schema};

// ── Form kinds ───────────────────────────────────────────────────────

/// What a form is for: its schema and submission gate.
pub trait FormKind {
    fn schema(&self) -> &'static Schema;

    /// Whether submitting also requires a change from the initial values.
    fn requires_changes(&self) -> bool {
        false
    }
}

/// Signup, or an admin creating a customer from the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateCustomer;

/// Editing an existing customer's name, email, or age.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    pub id: CustomerId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Login;

impl FormKind for CreateCustomer {
    fn schema(&self) -> &'static Schema {
        &validate::CREATE_CUSTOMER
    }
}

impl FormKind for UpdateCustomer {
    fn schema(&self) -> &'static Schema {
        &validate::UPDATE_CUSTOMER
    }

    fn requires_changes(&self) -> bool {
        true
    }
}

impl FormKind for Login {
    fn schema(&self) -> &'static Schema {
        &validate::LOGIN
    }
}

pub type CreateForm = Form<CreateCustomer>;
pub type UpdateForm = Form<UpdateCustomer>;
pub type LoginForm = Form<Login>;

// ── Outcome ──────────────────────────────────────────────────────────

/// Result of a `submit` call.
#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// The form was not submittable; no request was sent.
    Blocked(FieldErrors),
    /// The server accepted the request.
    Submitted(T),
    /// The request failed. An error notification has been emitted.
    Failed(CoreError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// Collapse into a `Result`, mapping `Blocked` to `CoreError::Validation`.
    pub fn into_result(self) -> Result<T, CoreError> {
        match self {
            Self::Submitted(v) => Ok(v),
            Self::Blocked(errors) => Err(CoreError::Validation { errors }),
            Self::Failed(e) => Err(e),
        }
    }
}

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Form<K> {
    kind: K,
    values: BTreeMap<&'static str, String>,
    initial: BTreeMap<&'static str, String>,
    touched: BTreeSet<&'static str>,
    errors: FieldErrors,
    submitting: bool,
}

impl<K: FormKind> Form<K> {
    /// An empty form: every declared field starts as `""`.
    pub fn new(kind: K) -> Self {
        let values: BTreeMap<_, _> = kind
            .schema()
            .field_names()
            .map(|f| (f, String::new()))
            .collect();
        Self::from_values(kind, values)
    }

    fn from_values(kind: K, values: BTreeMap<&'static str, String>) -> Self {
        let errors = kind.schema().validate(&values);
        Self {
            kind,
            initial: values.clone(),
            values,
            touched: BTreeSet::new(),
            errors,
            submitting: false,
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Replace a field's value and re-validate.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let field = self.field(field)?;
        self.values.insert(field, value.into());
        self.revalidate();
        Ok(())
    }

    /// Mark a field as visited, making its error visible.
    pub fn touch(&mut self, field: &str) -> Result<(), CoreError> {
        let field = self.field(field)?;
        self.touched.insert(field);
        self.revalidate();
        Ok(())
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(self.kind.schema().field_names());
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Every failing field, touched or not.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Failing fields the user has already visited.
    pub fn visible_errors(&self) -> FieldErrors {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(*field))
            .map(|(field, msg)| (*field, *msg))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// True iff the schema passes, nothing is in flight, and (for edits)
    /// something has changed.
    pub fn can_submit(&self) -> bool {
        self.is_valid()
            && !self.submitting
            && (!self.kind.requires_changes() || self.is_dirty())
    }

    /// Claim the in-flight slot. Returns `false` (and marks every field
    /// touched) when the form may not be submitted.
    pub fn begin_submit(&mut self) -> bool {
        self.revalidate();
        self.touch_all();
        if !self.can_submit() {
            debug!(errors = ?self.errors, "submission blocked");
            return false;
        }
        self.submitting = true;
        true
    }

    /// Release the in-flight slot.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    fn field(&self, name: &str) -> Result<&'static str, CoreError> {
        self.kind
            .schema()
            .field_names()
            .find(|f| *f == name)
            .ok_or_else(|| CoreError::UnknownField {
                field: name.to_owned(),
            })
    }

    fn trimmed(&self, field: &str) -> &str {
        self.value(field).map_or("", str::trim)
    }

    fn revalidate(&mut self) {
        self.errors = self.kind.schema().validate(&self.values);
    }

    /// Finish a submission: release the slot, then either run the success
    /// path or report the failure.
    fn settle<T>(
        &mut self,
        notifier: &dyn Notifier,
        result: Result<T, CoreError>,
        success: impl FnOnce(&T) -> Option<Notification>,
        on_success: impl FnOnce(&T),
    ) -> SubmitOutcome<T> {
        self.finish_submit();
        match result {
            Ok(value) => {
                on_success(&value);
                if let Some(n) = success(&value) {
                    notifier.notify(n);
                }
                SubmitOutcome::Submitted(value)
            }
            Err(err) => {
                debug!(error = %err, "submission failed");
                notifier.notify(Notification::from_error(&err));
                SubmitOutcome::Failed(err)
            }
        }
    }
}

fn invalid(field: &'static str, message: &'static str) -> CoreError {
    CoreError::Validation {
        errors: FieldErrors::from([(field, message)]),
    }
}

// ── Create ───────────────────────────────────────────────────────────

impl Default for Form<CreateCustomer> {
    fn default() -> Self {
        Self::new(CreateCustomer)
    }
}

impl Form<CreateCustomer> {
    /// The typed request for the current values.
    pub fn request(&self) -> Result<CustomerRegistrationRequest, CoreError> {
        let age = self
            .trimmed("age")
            .parse()
            .map_err(|_| invalid("age", "Must be a number"))?;
        let gender: Gender = self
            .trimmed("gender")
            .parse()
            .map_err(|_| invalid("gender", "Invalid gender type"))?;
        let password = self
            .value("password")
            .filter(|p| !p.is_empty())
            .map(|p| SecretString::from(p.to_owned()));

        Ok(CustomerRegistrationRequest {
            name: self.trimmed("name").to_owned(),
            email: self.trimmed("email").to_owned(),
            age,
            gender,
            password,
        })
    }

    /// Validate, then `POST /customers`.
    ///
    /// `on_success` receives the server's reply (carrying the new
    /// customer's token on signup) before the success notification fires.
    pub async fn submit<A: CustomerApi>(
        &mut self,
        api: &A,
        notifier: &dyn Notifier,
        on_success: impl FnOnce(&CreatedCustomer),
    ) -> SubmitOutcome<CreatedCustomer> {
        if !self.begin_submit() {
            return SubmitOutcome::Blocked(self.errors.clone());
        }
        let name = self.trimmed("name").to_owned();
        let result = match self.request() {
            Ok(request) => api.create(&request).await,
            Err(e) => Err(e),
        };
        self.settle(
            notifier,
            result,
            |_| {
                Some(Notification::success(
                    "Customer saved.",
                    format!("{name} was successfully saved!"),
                ))
            },
            on_success,
        )
    }
}

// ── Update ───────────────────────────────────────────────────────────

impl Form<UpdateCustomer> {
    /// A form pre-filled with `customer`'s editable fields.
    pub fn for_customer(customer: &Customer) -> Self {
        let values = BTreeMap::from([
            ("name", customer.name.clone()),
            ("email", customer.email.clone()),
            ("age", customer.age.to_string()),
        ]);
        Self::from_values(
            UpdateCustomer {
                id: customer.id.clone(),
            },
            values,
        )
    }

    pub fn id(&self) -> &CustomerId {
        &self.kind.id
    }

    /// The typed request for the current values.
    pub fn request(&self) -> Result<CustomerUpdateRequest, CoreError> {
        let age = self
            .trimmed("age")
            .parse()
            .map_err(|_| invalid("age", "Must be a number"))?;
        Ok(CustomerUpdateRequest {
            name: Some(self.trimmed("name").to_owned()),
            email: Some(self.trimmed("email").to_owned()),
            age: Some(age),
        })
    }

    /// Validate, then `PUT /customers/{id}`.
    ///
    /// On success the submitted values become the new baseline, so the
    /// form is clean again.
    pub async fn submit<A: CustomerApi>(
        &mut self,
        api: &A,
        notifier: &dyn Notifier,
        on_success: impl FnOnce(&Option<Customer>),
    ) -> SubmitOutcome<Option<Customer>> {
        if !self.begin_submit() {
            return SubmitOutcome::Blocked(self.errors.clone());
        }
        let name = self.trimmed("name").to_owned();
        let result = match self.request() {
            Ok(request) => api.update(&self.kind.id, &request).await,
            Err(e) => Err(e),
        };
        let outcome = self.settle(
            notifier,
            result,
            |_| {
                Some(Notification::success(
                    "Customer updated.",
                    format!("{name} was successfully updated!"),
                ))
            },
            on_success,
        );
        if outcome.is_submitted() {
            self.initial.clone_from(&self.values);
        }
        outcome
    }
}

// ── Login ────────────────────────────────────────────────────────────

impl Default for Form<Login> {
    fn default() -> Self {
        Self::new(Login)
    }
}

impl Form<Login> {
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(self.trimmed("username"), self.value("password").unwrap_or(""))
    }

    /// Validate, then sign in through `session`. No success notification;
    /// the caller navigates instead.
    pub async fn submit<A: CustomerApi>(
        &mut self,
        session: &SessionContext,
        api: &A,
        notifier: &dyn Notifier,
        on_success: impl FnOnce(&Identity),
    ) -> SubmitOutcome<Identity> {
        if !self.begin_submit() {
            return SubmitOutcome::Blocked(self.errors.clone());
        }
        let result = session.login(api, &self.credentials()).await;
        self.settle(notifier, result, |_| None, on_success)
    }
}

// ── Delete ───────────────────────────────────────────────────────────

/// Delete `customer`. Confirmation is the caller's job.
pub async fn delete_customer<A: CustomerApi>(
    api: &A,
    notifier: &dyn Notifier,
    customer: &Customer,
    on_success: impl FnOnce(),
) -> Result<(), CoreError> {
    match api.delete(&customer.id).await {
        Ok(()) => {
            on_success();
            notifier.notify(Notification::success(
                "Customer deleted",
                format!("{} was successfully deleted!", customer.name),
            ));
            Ok(())
        }
        Err(err) => {
            notifier.notify(Notification::from_error(&err));
            Err(err)
        }
    }
}
