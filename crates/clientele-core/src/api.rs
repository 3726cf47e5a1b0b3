// ── API seam ──
//
// Controllers talk to the server through `CustomerApi` rather than the
// concrete client, so they can be driven by a scripted fake. Errors are
// already translated to `CoreError` at this boundary.

use std::future::Future;
use std::sync::Arc;

use clientele_api::{
    ApiClient, CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest,
    CustomerUpdateRequest, LoginCredentials, LoginResponse,
};
use secrecy::SecretString;

use crate::error::CoreError;

/// The customer API operations the controllers need. One call, one request.
pub trait CustomerApi: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<Customer>, CoreError>> + Send;

    fn get(&self, id: &CustomerId) -> impl Future<Output = Result<Customer, CoreError>> + Send;

    fn create(
        &self,
        request: &CustomerRegistrationRequest,
    ) -> impl Future<Output = Result<CreatedCustomer, CoreError>> + Send;

    fn update(
        &self,
        id: &CustomerId,
        request: &CustomerUpdateRequest,
    ) -> impl Future<Output = Result<Option<Customer>, CoreError>> + Send;

    fn delete(&self, id: &CustomerId) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<LoginResponse, CoreError>> + Send;

    /// Replace the bearer token attached to later requests.
    fn set_token(&self, token: Option<SecretString>);
}

impl CustomerApi for ApiClient {
    async fn list(&self) -> Result<Vec<Customer>, CoreError> {
        Ok(self.list_customers().await?)
    }

    async fn get(&self, id: &CustomerId) -> Result<Customer, CoreError> {
        self.get_customer(id).await.map_err(|e| not_found(e, id))
    }

    async fn create(
        &self,
        request: &CustomerRegistrationRequest,
    ) -> Result<CreatedCustomer, CoreError> {
        Ok(self.create_customer(request).await?)
    }

    async fn update(
        &self,
        id: &CustomerId,
        request: &CustomerUpdateRequest,
    ) -> Result<Option<Customer>, CoreError> {
        Ok(self.update_customer(id, request).await?)
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), CoreError> {
        Ok(self.delete_customer(id).await?)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, CoreError> {
        Ok(ApiClient::login(self, credentials).await?)
    }

    fn set_token(&self, token: Option<SecretString>) {
        ApiClient::set_token(self, token);
    }
}

impl<A: CustomerApi + ?Sized> CustomerApi for Arc<A> {
    fn list(&self) -> impl Future<Output = Result<Vec<Customer>, CoreError>> + Send {
        (**self).list()
    }

    fn get(&self, id: &CustomerId) -> impl Future<Output = Result<Customer, CoreError>> + Send {
        (**self).get(id)
    }

    fn create(
        &self,
        request: &CustomerRegistrationRequest,
    ) -> impl Future<Output = Result<CreatedCustomer, CoreError>> + Send {
        (**self).create(request)
    }

    fn update(
        &self,
        id: &CustomerId,
        request: &CustomerUpdateRequest,
    ) -> impl Future<Output = Result<Option<Customer>, CoreError>> + Send {
        (**self).update(id, request)
    }

    fn delete(&self, id: &CustomerId) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).delete(id)
    }

    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<LoginResponse, CoreError>> + Send {
        (**self).login(credentials)
    }

    fn set_token(&self, token: Option<SecretString>) {
        (**self).set_token(token);
    }
}

/// A 404 on a single-record fetch names the missing record.
fn not_found(err: clientele_api::Error, id: &CustomerId) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            entity_type: "customer".into(),
            identifier: id.to_string(),
        }
    } else {
        err.into()
    }
}
