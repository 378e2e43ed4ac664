//! Executes `cobj-core` requests against the CRM over reqwest.
//!
//! Every failure is logged here with the method, endpoint and underlying
//! message before it is returned. There is no retry.

use cobj_core::{
    CreateRecord, CrmClient, CrmError, HttpMethod, HttpRequest, HttpResponse, ObjectType, Record,
    PAGE_LIMIT, PROPERTY_SET,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use crate::config::Config;

/// Authenticated connection to the CRM: a request builder bound to the
/// process credential plus a pooled HTTP client.
#[derive(Debug, Clone)]
pub struct Crm {
    client: CrmClient,
    http: reqwest::Client,
}

impl Crm {
    pub fn new(config: &Config) -> Result<Self, CrmError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("cobj-server/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CrmError::Transport(e.to_string()))?;

        Ok(Self {
            client: CrmClient::new(&config.base_url, &config.api_key),
            http,
        })
    }

    pub fn client(&self) -> &CrmClient {
        &self.client
    }

    /// Issue `method` on `endpoint` and return the body as received.
    #[instrument(skip(self, body))]
    pub async fn request<T>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&T>,
    ) -> Result<Value, CrmError>
    where
        T: Serialize + ?Sized,
    {
        let result = async {
            let req = self.client.request(method, endpoint, body)?;
            let response = self.execute(req).await?;
            self.client.parse_json(response)
        }
        .await;
        result.inspect_err(|err| log_failure(method, endpoint, err))
    }

    /// Fetch the first page of records with the list-view property set.
    #[instrument(skip(self), fields(%object_type))]
    pub async fn list_records(&self, object_type: &ObjectType) -> Result<Vec<Record>, CrmError> {
        let req = self
            .client
            .build_list_records(object_type, PROPERTY_SET, PAGE_LIMIT);
        let result = async {
            let response = self.execute(req).await?;
            self.client.parse_list_records(response)
        }
        .await;
        result
            .inspect(|records| debug!(count = records.len(), "records loaded"))
            .inspect_err(|err| log_failure(HttpMethod::Get, &object_type.endpoint(), err))
    }

    /// Create a record. Any 2xx answer with a JSON (or empty) body counts as
    /// success; its content is returned untouched.
    pub async fn create_record(
        &self,
        object_type: &ObjectType,
        input: &CreateRecord,
    ) -> Result<Value, CrmError> {
        self.request(HttpMethod::Post, &object_type.endpoint(), Some(input))
            .await
            .inspect(|_| debug!(%object_type, "record created"))
    }

    /// Perform the network round-trip. Non-2xx statuses come back as data;
    /// only transport failures are errors here.
    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, CrmError> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        trace!(%method, url = %req.url, "CRM request");

        let mut builder = self.http.request(method, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        trace!(status, "CRM response");

        Ok(HttpResponse { status, body })
    }
}

fn transport(err: reqwest::Error) -> CrmError {
    CrmError::Transport(err.to_string())
}

fn log_failure(method: HttpMethod, endpoint: &str, err: &CrmError) {
    error!(%method, endpoint, status = ?err.status(), error = %err, "CRM API error");
}
