use crate::attio_client::AttioClient;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::webhook_models::{Submission, WebhookDetails, WebhookSuccess};
use serde_json::Value;
use std::sync::Arc;

/// Relays one Fillout submission onto its Attio list entry.
///
/// Flow:
/// 1. Normalize the payload into a question list.
/// 2. Resolve the domain answer.
/// 3. Find the company whose domain attribute contains it.
/// 4. Find the list entry whose parent record is that company.
/// 5. Map answers to attributes (explicit table first, automatic fallback).
/// 6. PATCH the entry.
///
/// Each step depends on the previous one; a failure stops the request before
/// any later Attio call is made.
#[derive(Clone)]
pub struct Relay {
    config: Arc<Config>,
    attio: AttioClient,
}

impl Relay {
    pub fn new(config: Arc<Config>, attio: AttioClient) -> Self {
        Self { config, attio }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn process(&self, payload: &Value) -> Result<WebhookSuccess, AppError> {
        let config = &self.config;

        // Step 1: Normalize
        let submission = Submission::from_payload(payload);
        if submission.is_empty() {
            return Err(AppError::NoQuestions {
                raw_body: payload.clone(),
            });
        }
        tracing::debug!(
            "Payload shape {:?} with {} question(s)",
            submission.shape,
            submission.questions.len()
        );

        // Step 2: Domain
        let domain = submission
            .resolve_domain(&config.domain_field_id)
            .ok_or_else(|| AppError::DomainMissing {
                domain_field_id: config.domain_field_id.clone(),
                received_fields: submission.received_fields(),
            })?;
        tracing::info!("📥 Webhook received for domain: {}", domain);

        // Step 3: Company
        let company = self
            .attio
            .find_company_by_domain(&domain)
            .await
            .context("Error searching company")?
            .ok_or_else(|| AppError::CompanyNotFound {
                domain: domain.clone(),
            })?;
        tracing::info!("✅ Company found - ID: {}", company.0);

        // Step 4: List entry
        let entry = self
            .attio
            .find_list_entry_for_company(&config.attio_list_id, &company)
            .await
            .context("Error searching list entry")?
            .ok_or_else(|| AppError::ListEntryNotFound {
                domain: domain.clone(),
                company_id: company.0.clone(),
            })?;
        tracing::info!("✅ Entry found - ID: {}", entry.0);

        // Step 5: Field mapping
        let (values, mode) = config
            .field_mappings
            .build_update_set(&submission, &config.domain_field_id);
        if values.is_empty() {
            return Err(AppError::NothingToUpdate {
                received_fields: submission.received_fields(),
            });
        }
        tracing::debug!("{:?} mapping produced {} field(s)", mode, values.len());

        // Step 6: Update
        let attio_response = self
            .attio
            .update_entry(&config.attio_list_id, &entry, &values)
            .await
            .context("Error updating entry")?;
        tracing::info!("✅ Entry updated successfully");

        Ok(WebhookSuccess {
            success: true,
            message: format!("Entry updated for domain: {}", domain),
            details: WebhookDetails {
                company_id: company.0,
                entry_id: entry.0,
                updated_fields: values.keys().cloned().collect(),
                values,
                mapping_mode: mode,
                attio_response,
            },
        })
    }
}
