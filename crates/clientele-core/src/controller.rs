// ── Controller facade ──
//
// Bundles the API client, the session, the list controller, and the
// notifier the way a front end wires them together. Mutations request a
// list refresh through the `RefreshHandle` once they succeed.

use std::sync::{Arc, Mutex, PoisonError};

use clientele_api::{ApiClient, CreatedCustomer, Customer, LoginCredentials};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::CustomerApi;
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::form::{self, CreateForm, LoginForm, SubmitOutcome, UpdateForm};
use crate::list::{ListController, RefreshHandle, RefreshOrdering};
use crate::notify::{Notification, Notifier};
use crate::session::{Identity, Route, RouteDecision, SessionContext, TokenStore};

/// Entry point for front ends.
pub struct Controller<A = ApiClient> {
    api: Arc<A>,
    session: SessionContext,
    list: ListController<A>,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller<ApiClient> {
    /// Build the HTTP client from `config` and restore the stored session.
    pub fn connect(
        config: &ClientConfig,
        store: Box<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.url.clone(), &config.transport())?;
        debug!(url = %config.url, "client ready");
        Ok(Self::new(
            Arc::new(api),
            store,
            notifier,
            config.refresh_ordering,
        ))
    }
}

impl<A: CustomerApi + 'static> Controller<A> {
    /// Restore the session from `store` and hand its token to `api`.
    pub fn new(
        api: Arc<A>,
        store: Box<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        ordering: RefreshOrdering,
    ) -> Self {
        let session = SessionContext::restore(store);
        api.set_token(session.token());
        let list = ListController::new(Arc::clone(&api), ordering);
        Self {
            api,
            session,
            list,
            notifier,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn notifier(&self) -> &dyn Notifier {
        &*self.notifier
    }

    /// The customer list controller.
    pub fn customers(&self) -> &ListController<A> {
        &self.list
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        self.list.refresh_handle()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the refresh loop and trigger the initial list load.
    pub fn start(&self) {
        let list = self.list.clone();
        let cancel = self.cancel.clone();
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.push(tokio::spawn(async move { list.run(cancel).await }));
        tasks.push(self.list.start());
    }

    /// Stop the refresh loop and wait for background tasks.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task failed");
            }
        }
        debug!("controller stopped");
    }

    // ── Forms ────────────────────────────────────────────────────────

    pub fn login_form(&self) -> LoginForm {
        LoginForm::default()
    }

    pub fn signup_form(&self) -> CreateForm {
        CreateForm::default()
    }

    pub fn create_form(&self) -> CreateForm {
        CreateForm::default()
    }

    pub fn update_form(&self, customer: &Customer) -> UpdateForm {
        UpdateForm::for_customer(customer)
    }

    /// Submit the login form and sign in.
    pub async fn submit_login(&self, form: &mut LoginForm) -> SubmitOutcome<Identity> {
        form.submit(&self.session, &*self.api, &*self.notifier, |_| {})
            .await
    }

    /// Submit a signup form, then adopt the token the server issued for
    /// the new customer.
    pub async fn submit_signup(&self, form: &mut CreateForm) -> SubmitOutcome<Identity> {
        let created = match form.submit(&*self.api, &*self.notifier, |_| {}).await {
            SubmitOutcome::Submitted(created) => created,
            SubmitOutcome::Blocked(errors) => return SubmitOutcome::Blocked(errors),
            SubmitOutcome::Failed(err) => return SubmitOutcome::Failed(err),
        };
        match self.adopt(created) {
            Ok(identity) => SubmitOutcome::Submitted(identity),
            Err(err) => {
                self.notifier.notify(Notification::from_error(&err));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Submit a dashboard create form and refresh the list on success.
    pub async fn submit_create(&self, form: &mut CreateForm) -> SubmitOutcome<CreatedCustomer> {
        let refresh = self.list.refresh_handle();
        form.submit(&*self.api, &*self.notifier, |_| refresh.refresh())
            .await
    }

    /// Submit an update form and refresh the list on success.
    pub async fn submit_update(&self, form: &mut UpdateForm) -> SubmitOutcome<Option<Customer>> {
        let refresh = self.list.refresh_handle();
        form.submit(&*self.api, &*self.notifier, |_| refresh.refresh())
            .await
    }

    /// Delete `customer` and refresh the list on success.
    pub async fn delete(&self, customer: &Customer) -> Result<(), CoreError> {
        let refresh = self.list.refresh_handle();
        form::delete_customer(&*self.api, &*self.notifier, customer, || refresh.refresh()).await
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Sign in without going through a form.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, CoreError> {
        self.session.login(&*self.api, credentials).await
    }

    /// Forget the session and stop sending its token.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.session.logout()?;
        self.api.set_token(None);
        Ok(())
    }

    pub fn guard(&self, route: Route) -> RouteDecision {
        self.session.guard(route)
    }

    /// Fail with `Unauthenticated` unless `route` may be shown.
    pub fn require(&self, route: Route) -> Result<(), CoreError> {
        match self.guard(route) {
            RouteDecision::Allow => Ok(()),
            RouteDecision::Redirect(Route::Login) => Err(CoreError::Unauthenticated {
                message: format!("{route} requires a signed-in session"),
            }),
            RouteDecision::Redirect(to) => {
                debug!(%route, %to, "route redirected");
                Ok(())
            }
        }
    }

    fn adopt(&self, created: CreatedCustomer) -> Result<Identity, CoreError> {
        let token = created.token.ok_or_else(|| CoreError::Unauthenticated {
            message: "signup response did not include an access token".into(),
        })?;
        let identity = self.session.establish(token.clone())?;
        self.api.set_token(Some(token));
        Ok(identity)
    }
}
