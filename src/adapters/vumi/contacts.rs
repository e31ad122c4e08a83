//! Vumi Go contacts API client

use super::models::{ContactPage, GroupPage};
use crate::adapters::api_root;
use crate::config::VumiConfig;
use crate::domain::{
    Contact, ContactKey, ContactUpdate, Group, MomConnectError, Msisdn, NewContact, Result,
    VumiError,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Status the contacts API answers with when a lookup matches nothing
pub const CONTACT_NOT_FOUND_STATUS: u16 = 400;

/// Upper bound on group listing pages walked by one lookup
pub const MAX_GROUP_PAGES: usize = 100;

/// Contact and group operations used by the synchronizers
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Looks a contact up by phone number
    ///
    /// # Errors
    ///
    /// `VumiError::ContactNotFound` when no contact has this number.
    async fn get_contact_by_msisdn(&self, msisdn: &Msisdn) -> Result<Contact>;

    async fn get_contact(&self, key: &ContactKey) -> Result<Contact>;

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact>;

    /// Applies a partial update and returns the stored contact
    async fn update_contact(&self, key: &ContactKey, update: &ContactUpdate) -> Result<Contact>;

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>>;

    async fn create_group(&self, name: &str) -> Result<Group>;
}

/// HTTP client for the contacts API, authenticated with a bearer token
pub struct HttpContactsClient {
    client: Client,
    base_url: Url,
    auth_token: String,
}

impl HttpContactsClient {
    /// Builds a client from the `[vumi]` section
    ///
    /// # Errors
    ///
    /// Fails when the API URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &VumiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                MomConnectError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: api_root(&config.contacts_api_url)?,
            auth_token: config.auth_token.expose_secret().as_ref().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            MomConnectError::Configuration(format!("Invalid contacts API path '{path}': {e}"))
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.auth_token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| VumiError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VumiError::from_status(status.as_u16(), body).into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VumiError::InvalidResponse(e.to_string()).into())
    }
}

/// Lookups signal "no such contact" with a 400 rather than a 404
fn not_found_sentinel(err: MomConnectError) -> MomConnectError {
    match err {
        MomConnectError::Vumi(VumiError::ClientError { status, message })
            if status == CONTACT_NOT_FOUND_STATUS =>
        {
            VumiError::ContactNotFound(message).into()
        }
        other => other,
    }
}

#[async_trait]
impl ContactsApi for HttpContactsClient {
    async fn get_contact_by_msisdn(&self, msisdn: &Msisdn) -> Result<Contact> {
        let mut url = self.endpoint("contacts/")?;
        url.query_pairs_mut()
            .append_pair("query", &format!("msisdn={msisdn}"));

        // Older deployments answer with the bare contact, newer ones with a page
        let body: serde_json::Value = self
            .send(self.request(Method::GET, url))
            .await
            .map_err(not_found_sentinel)?;
        if body.get("data").is_some() {
            let page: ContactPage = serde_json::from_value(body)
                .map_err(|e| VumiError::InvalidResponse(e.to_string()))?;
            return page
                .data
                .into_iter()
                .next()
                .ok_or_else(|| VumiError::ContactNotFound(msisdn.to_string()).into());
        }
        serde_json::from_value(body).map_err(|e| VumiError::InvalidResponse(e.to_string()).into())
    }

    async fn get_contact(&self, key: &ContactKey) -> Result<Contact> {
        let url = self.endpoint(&format!("contacts/{key}"))?;
        self.send(self.request(Method::GET, url))
            .await
            .map_err(not_found_sentinel)
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        let url = self.endpoint("contacts/")?;
        self.send(self.request(Method::POST, url).json(contact))
            .await
    }

    async fn update_contact(&self, key: &ContactKey, update: &ContactUpdate) -> Result<Contact> {
        let url = self.endpoint(&format!("contacts/{key}"))?;
        self.send(self.request(Method::PUT, url).json(update)).await
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_GROUP_PAGES {
            let mut url = self.endpoint("groups/")?;
            if let Some(ref c) = cursor {
                url.query_pairs_mut().append_pair("cursor", c);
            }
            let page: GroupPage = self.send(self.request(Method::GET, url)).await?;
            if let Some(group) = page.data.into_iter().find(|g| g.name == name) {
                return Ok(Some(group));
            }
            match page.cursor {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(VumiError::InvalidResponse(format!(
                        "group listing repeated cursor '{next}'"
                    ))
                    .into());
                }
                Some(next) => cursor = Some(next),
                None => return Ok(None),
            }
        }
        Err(VumiError::InvalidResponse(format!(
            "group listing exceeded {MAX_GROUP_PAGES} pages"
        ))
        .into())
    }

    async fn create_group(&self, name: &str) -> Result<Group> {
        let url = self.endpoint("groups/")?;
        self.send(
            self.request(Method::POST, url)
                .json(&serde_json::json!({ "name": name })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_is_not_found_sentinel() {
        let err = not_found_sentinel(VumiError::from_status(400, "no contact").into());
        assert!(matches!(
            err,
            MomConnectError::Vumi(VumiError::ContactNotFound(_))
        ));

        let err = not_found_sentinel(VumiError::from_status(404, "").into());
        assert_eq!(err.upstream_status(), Some(404));

        let err = not_found_sentinel(VumiError::from_status(502, "").into());
        assert_eq!(err.upstream_status(), Some(502));
    }
}
