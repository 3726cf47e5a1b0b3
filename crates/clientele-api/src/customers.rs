// Customer endpoints
//
// `GET/POST /api/v1/customers` and `GET/PUT/DELETE /api/v1/customers/{id}`.

use tracing::debug;

use crate::client::{ApiClient, token_from_headers};
use crate::error::Error;
use crate::models::{
    CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest,
};

impl ApiClient {
    /// List every customer visible to the current token.
    ///
    /// `GET /api/v1/customers`
    pub async fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        let url = self.api_url("customers")?;
        debug!("listing customers");
        self.get(url).await
    }

    /// Fetch a single customer.
    ///
    /// `GET /api/v1/customers/{id}`
    pub async fn get_customer(&self, id: &CustomerId) -> Result<Customer, Error> {
        let url = self.api_url(&format!("customers/{id}"))?;
        debug!(%id, "fetching customer");
        self.get(url).await
    }

    /// Register a customer. Open to unauthenticated callers (signup).
    ///
    /// `POST /api/v1/customers`. The server answers with an empty body and
    /// an access token for the new customer in the `Authorization` header.
    pub async fn create_customer(
        &self,
        request: &CustomerRegistrationRequest,
    ) -> Result<CreatedCustomer, Error> {
        let url = self.api_url("customers")?;
        debug!(email = %request.email, "creating customer");
        let resp = self.post(url, request).await?;
        Ok(CreatedCustomer {
            token: token_from_headers(resp.headers()),
        })
    }

    /// Update a customer's name, email, or age.
    ///
    /// `PUT /api/v1/customers/{id}`. Returns the updated record when the
    /// server echoes one; the reference server replies with an empty body.
    pub async fn update_customer(
        &self,
        id: &CustomerId,
        request: &CustomerUpdateRequest,
    ) -> Result<Option<Customer>, Error> {
        let url = self.api_url(&format!("customers/{id}"))?;
        debug!(%id, "updating customer");
        let resp = self.put(url, request).await?;
        if resp.content_length() == Some(0) {
            return Ok(None);
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })
    }

    /// Delete a customer.
    ///
    /// `DELETE /api/v1/customers/{id}`
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<(), Error> {
        let url = self.api_url(&format!("customers/{id}"))?;
        debug!(%id, "deleting customer");
        let _resp = self.delete(url).await?;
        Ok(())
    }
}
