use crate::config::Config;
use crate::errors::AppError;
use crate::field_mapping::UpdateSet;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Opaque Attio company record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRef(pub String);

/// Opaque Attio list entry id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntryRef(pub String);

/// `data` may be missing or null when nothing matched.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    data: Option<Vec<T>>,
}

impl<T> QueryResponse<T> {
    fn first(self) -> Option<T> {
        self.data.unwrap_or_default().into_iter().next()
    }
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    id: RecordId,
}

#[derive(Debug, Deserialize)]
struct RecordId {
    record_id: String,
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    id: EntryId,
}

#[derive(Debug, Deserialize)]
struct EntryId {
    entry_id: String,
}

/// Client for the Attio v2 REST API.
///
/// Every call is a single attempt; a non-success status becomes an
/// `ExternalApiError` carrying Attio's raw error body.
#[derive(Clone)]
pub struct AttioClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    domain_attribute: String,
}

impl AttioClient {
    /// Creates a new `AttioClient` from the relay configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.attio_timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create Attio client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.attio_base_url.clone(),
            token: config.attio_api_key.clone(),
            domain_attribute: config.attio_domain_attribute.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
    }

    /// Sends the request and decodes a JSON body, mapping error statuses to `ExternalApiError`.
    async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Attio returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Attio response: {}", e))
        })
    }

    /// Finds the first company whose domain attribute contains `domain`.
    ///
    /// Additional matches are ignored; Attio's ordering decides.
    pub async fn find_company_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<CompanyRef>, AppError> {
        tracing::info!("🔍 Searching company with domain: {}", domain);

        let mut filter = Map::new();
        filter.insert(
            self.domain_attribute.clone(),
            json!({ "$contains": domain }),
        );
        let body = json!({ "filter": filter, "limit": 1 });

        let response: QueryResponse<RecordRow> = self
            .send_json(
                self.request(Method::POST, "/v2/objects/companies/records/query")
                    .json(&body),
            )
            .await?;

        Ok(response.first().map(|row| CompanyRef(row.id.record_id)))
    }

    /// Finds the first entry of `list_id` whose parent record is `company`.
    pub async fn find_list_entry_for_company(
        &self,
        list_id: &str,
        company: &CompanyRef,
    ) -> Result<Option<ListEntryRef>, AppError> {
        tracing::info!(
            "🔍 Searching entry in list {} for company {}",
            list_id,
            company.0
        );

        let body = json!({
            "filter": {
                "parent_record": {
                    "target_object": "companies",
                    "target_record_id": company.0
                }
            },
            "limit": 1
        });

        let response: QueryResponse<EntryRow> = self
            .send_json(
                self.request(Method::POST, &format!("/v2/lists/{}/entries/query", list_id))
                    .json(&body),
            )
            .await?;

        Ok(response.first().map(|row| ListEntryRef(row.id.entry_id)))
    }

    /// Applies a partial update of attribute values to a list entry.
    ///
    /// Returns Attio's response body unchanged.
    pub async fn update_entry(
        &self,
        list_id: &str,
        entry: &ListEntryRef,
        values: &UpdateSet,
    ) -> Result<Value, AppError> {
        tracing::info!("🔄 Updating entry {} with {} fields", entry.0, values.len());

        let body = json!({ "data": { "values": values } });

        self.send_json(
            self.request(
                Method::PATCH,
                &format!("/v2/lists/{}/entries/{}", list_id, entry.0),
            )
            .json(&body),
        )
        .await
    }
}
