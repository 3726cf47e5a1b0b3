// Scripted `CustomerApi` for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use clientele_api::{
    CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest,
    Gender, LoginCredentials, LoginResponse,
};
use secrecy::SecretString;
use serde_json::json;

use crate::api::CustomerApi;
use crate::error::CoreError;
use crate::session::jwt;

pub(crate) fn customer(id: i64, name: &str) -> Customer {
    Customer {
        id: CustomerId::from(id),
        name: name.to_owned(),
        email: format!("{}@x.com", name.to_lowercase()),
        age: 27,
        gender: Gender::Female,
        roles: vec!["ROLE_USER".into()],
        username: None,
    }
}

type ListReply = (Duration, Result<Vec<Customer>, CoreError>);

/// Records every call; list replies are queued with a delay each.
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<String>>,
    lists: Mutex<VecDeque<ListReply>>,
    failure: Mutex<Option<CoreError>>,
    token: Mutex<Option<SecretString>>,
}

impl FakeApi {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }

    /// Queue the reply for the next `list` call.
    pub(crate) fn push_list(&self, delay: Duration, reply: Result<Vec<Customer>, CoreError>) {
        self.lists.lock().unwrap().push_back((delay, reply));
    }

    /// Make the next mutation or login fail with `err`.
    pub(crate) fn fail_next(&self, err: CoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    fn record(&self, call: String) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(call);
        self.failure.lock().unwrap().take().map_or(Ok(()), Err)
    }
}

impl CustomerApi for FakeApi {
    async fn list(&self) -> Result<Vec<Customer>, CoreError> {
        self.calls.lock().unwrap().push("list".into());
        let next = self.lists.lock().unwrap().pop_front();
        let Some((delay, reply)) = next else {
            return Ok(Vec::new());
        };
        tokio::time::sleep(delay).await;
        reply
    }

    async fn get(&self, id: &CustomerId) -> Result<Customer, CoreError> {
        self.record(format!("get {id}"))?;
        Ok(customer(1, "Jane"))
    }

    async fn create(
        &self,
        request: &CustomerRegistrationRequest,
    ) -> Result<CreatedCustomer, CoreError> {
        self.record(format!("create {}", request.name))?;
        let token = jwt(&json!({"sub": request.email, "scopes": ["ROLE_USER"]}));
        Ok(CreatedCustomer {
            token: Some(SecretString::from(token)),
        })
    }

    async fn update(
        &self,
        id: &CustomerId,
        request: &CustomerUpdateRequest,
    ) -> Result<Option<Customer>, CoreError> {
        let name = request.name.clone().unwrap_or_default();
        self.record(format!("update {id} {name}"))?;
        Ok(None)
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), CoreError> {
        self.record(format!("delete {id}"))
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, CoreError> {
        self.record(format!("login {}", credentials.username))?;
        let token = jwt(&json!({"sub": credentials.username, "scopes": ["ROLE_USER"]}));
        Ok(LoginResponse {
            token: SecretString::from(token),
            customer: None,
        })
    }

    fn set_token(&self, token: Option<SecretString>) {
        *self.token.lock().unwrap() = token;
    }
}
