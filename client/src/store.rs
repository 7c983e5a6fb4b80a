//! The editing-session config store.
//!
//! Owns one in-memory [`ConfigBundle`] plus the status/message slot the
//! presentation layer reads. Every mutation of the bundle happens through
//! the core editing rules; this module only sequences I/O. Deliberate
//! semantics, matching the editing surface this store backs:
//!
//! - `load` replaces the bundle wholesale, and a failed load leaves the
//!   prior bundle untouched;
//! - `save_all` runs the local webhook gate before any network call, then
//!   writes the six documents sequentially with no rollback — a mid-sequence
//!   failure leaves earlier documents saved, and the status says which;
//! - nothing retries, and concurrent editors are not reconciled (last
//!   writer wins at the server).

use async_trait::async_trait;
use formloom_core::bundle::{ConfigBundle, ConfigDoc};
use formloom_core::validate::webhook_gate;
use formloom_core::views::PublishReceipt;
use serde_json::Value;

use crate::builder::BuilderClient;
use crate::error::ClientError;

/// The five store-facing calls, behind a seam so sequencing and failure
/// semantics are testable without a server.
#[async_trait]
pub trait ConfigTransport {
    async fn fetch_document(&self, doc: ConfigDoc) -> Result<Value, ClientError>;
    async fn store_document(&self, doc: ConfigDoc, value: &Value) -> Result<(), ClientError>;
    async fn publish(&self) -> Result<PublishReceipt, ClientError>;
}

#[async_trait]
impl ConfigTransport for BuilderClient {
    async fn fetch_document(&self, doc: ConfigDoc) -> Result<Value, ClientError> {
        self.get_config(doc).await
    }

    async fn store_document(&self, doc: ConfigDoc, value: &Value) -> Result<(), ClientError> {
        self.put_config(doc, value).await
    }

    async fn publish(&self) -> Result<PublishReceipt, ClientError> {
        BuilderClient::publish(self).await
    }
}

/// Serialize every document for a save, after the webhook gate. Pure: when
/// this returns `Err`, no network call may be issued.
pub fn save_plan(bundle: &ConfigBundle) -> Result<Vec<(ConfigDoc, Value)>, ClientError> {
    webhook_gate(&bundle.forms)?;
    let mut plan = Vec::with_capacity(ConfigDoc::ALL.len());
    for doc in ConfigDoc::ALL {
        let value = bundle
            .document(doc)
            .map_err(|source| ClientError::Document { doc, source })?;
        plan.push((doc, value));
    }
    Ok(plan)
}

/// One editing session's view of the configuration graph.
#[derive(Debug)]
pub struct ConfigStore<T> {
    transport: T,
    bundle: Option<ConfigBundle>,
    status: Option<String>,
}

impl<T: ConfigTransport> ConfigStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            bundle: None,
            status: None,
        }
    }

    /// Latest user-facing status message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn bundle(&self) -> Option<&ConfigBundle> {
        self.bundle.as_ref()
    }

    /// Editing access. All mutation should flow through the core rules.
    pub fn bundle_mut(&mut self) -> Option<&mut ConfigBundle> {
        self.bundle.as_mut()
    }

    /// Seed the session from documents obtained elsewhere (e.g. local files).
    pub fn set_bundle(&mut self, bundle: ConfigBundle) {
        self.bundle = Some(bundle);
    }

    /// Fetch all six documents and replace the in-memory bundle wholesale.
    /// On any failure the prior bundle stays untouched.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let mut fresh = ConfigBundle::default();
        for doc in ConfigDoc::ALL {
            let value = match self.transport.fetch_document(doc).await {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(doc = doc.as_str(), error = %err, "config load failed");
                    self.status = Some(format!("Failed to load {doc}: {err}"));
                    return Err(err);
                }
            };
            if let Err(source) = fresh.set_document(doc, value) {
                let err = ClientError::Document { doc, source };
                self.status = Some(format!("Failed to load {doc}: {err}"));
                return Err(err);
            }
        }
        self.bundle = Some(fresh);
        self.status = Some("Loaded configs.".to_string());
        Ok(())
    }

    /// Validate locally, then PUT the six documents in fixed order. No
    /// transaction: a mid-sequence failure leaves earlier documents saved,
    /// and the status message reports exactly which.
    pub async fn save_all(&mut self) -> Result<(), ClientError> {
        let bundle = self.bundle.as_ref().ok_or(ClientError::NotLoaded)?;
        let plan = match save_plan(bundle) {
            Ok(plan) => plan,
            Err(err) => {
                self.status = Some(err.to_string());
                return Err(err);
            }
        };

        let mut written: Vec<ConfigDoc> = Vec::new();
        for (doc, value) in plan {
            if let Err(err) = self.transport.store_document(doc, &value).await {
                tracing::warn!(doc = doc.as_str(), error = %err, "config save failed mid-sequence");
                let saved = if written.is_empty() {
                    "none".to_string()
                } else {
                    written
                        .iter()
                        .map(|d| d.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                self.status = Some(format!(
                    "Save failed at {doc}: {err} (documents already saved: {saved})"
                ));
                return Err(err);
            }
            written.push(doc);
        }
        self.status = Some("Saved all configs.".to_string());
        Ok(())
    }

    /// Snapshot the saved draft into a new immutable version. Pure
    /// passthrough; the server owns version numbering.
    pub async fn publish(&mut self) -> Result<PublishReceipt, ClientError> {
        match self.transport.publish().await {
            Ok(receipt) => {
                self.status = Some(format!("Published version {}.", receipt.version));
                Ok(receipt)
            }
            Err(err) => {
                self.status = Some(format!("Publish failed: {err}"));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use formloom_core::bundle::{ConfigBundle, ConfigDoc};
    use formloom_core::forms::Form;
    use formloom_core::views::PublishReceipt;
    use serde_json::Value;

    use super::{ConfigStore, ConfigTransport, save_plan};
    use crate::error::ClientError;

    struct FakeTransport {
        docs: Mutex<HashMap<ConfigDoc, Value>>,
        fail_fetch: Mutex<Option<ConfigDoc>>,
        fail_store: Mutex<Option<ConfigDoc>>,
        stored: Mutex<Vec<ConfigDoc>>,
    }

    impl FakeTransport {
        fn seeded(bundle: &ConfigBundle) -> Arc<Self> {
            let mut docs = HashMap::new();
            for doc in ConfigDoc::ALL {
                docs.insert(doc, bundle.document(doc).unwrap());
            }
            Arc::new(Self {
                docs: Mutex::new(docs),
                fail_fetch: Mutex::new(None),
                fail_store: Mutex::new(None),
                stored: Mutex::new(Vec::new()),
            })
        }

        fn stored_docs(&self) -> Vec<ConfigDoc> {
            self.stored.lock().unwrap().clone()
        }

        fn server_error() -> ClientError {
            ClientError::Status {
                status: 500,
                message: "boom".to_string(),
            }
        }
    }

    #[async_trait]
    impl ConfigTransport for Arc<FakeTransport> {
        async fn fetch_document(&self, doc: ConfigDoc) -> Result<Value, ClientError> {
            if *self.fail_fetch.lock().unwrap() == Some(doc) {
                return Err(FakeTransport::server_error());
            }
            Ok(self.docs.lock().unwrap().get(&doc).cloned().unwrap())
        }

        async fn store_document(&self, doc: ConfigDoc, value: &Value) -> Result<(), ClientError> {
            if *self.fail_store.lock().unwrap() == Some(doc) {
                return Err(FakeTransport::server_error());
            }
            self.docs.lock().unwrap().insert(doc, value.clone());
            self.stored.lock().unwrap().push(doc);
            Ok(())
        }

        async fn publish(&self) -> Result<PublishReceipt, ClientError> {
            Ok(PublishReceipt { version: 7 })
        }
    }

    fn bundle_with_form(submission_url: Option<&str>) -> ConfigBundle {
        let mut bundle = ConfigBundle::default();
        let mut form = Form::new("order".into(), "Order pizza");
        form.submission_url = submission_url.map(str::to_string);
        bundle.forms.forms.push(form);
        bundle
    }

    #[tokio::test]
    async fn load_twice_against_unchanged_store_is_idempotent() {
        let transport = FakeTransport::seeded(&bundle_with_form(Some("https://example.com/hook")));
        let mut store = ConfigStore::new(transport);
        store.load().await.unwrap();
        let first = store.bundle().cloned().unwrap();
        store.load().await.unwrap();
        assert_eq!(store.bundle().unwrap(), &first);
        assert_eq!(store.status(), Some("Loaded configs."));
    }

    #[tokio::test]
    async fn failed_load_leaves_prior_bundle_untouched() {
        let transport = FakeTransport::seeded(&bundle_with_form(Some("https://example.com/hook")));
        let mut store = ConfigStore::new(transport.clone());
        store.load().await.unwrap();
        let before = store.bundle().cloned().unwrap();

        *transport.fail_fetch.lock().unwrap() = Some(ConfigDoc::Tools);
        store.load().await.unwrap_err();
        assert_eq!(store.bundle().unwrap(), &before);
        assert!(store.status().unwrap().starts_with("Failed to load tools"));
    }

    #[tokio::test]
    async fn save_with_invalid_webhook_aborts_before_any_put() {
        let transport = FakeTransport::seeded(&bundle_with_form(Some("https://example.com/hook")));
        let mut store = ConfigStore::new(transport.clone());
        store.set_bundle(bundle_with_form(Some("not a url")));

        let err = store.save_all().await.unwrap_err();
        assert!(matches!(err, ClientError::SaveBlocked(_)));
        assert!(transport.stored_docs().is_empty(), "no PUT may be issued");
        assert!(store.status().unwrap().contains("Order pizza"));
    }

    #[tokio::test]
    async fn save_with_missing_webhook_names_the_form() {
        let bundle = bundle_with_form(None);
        let err = save_plan(&bundle).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Submission webhook URL required for form: Order pizza"
        );
    }

    #[tokio::test]
    async fn save_writes_documents_sequentially_in_fixed_order() {
        let transport = FakeTransport::seeded(&bundle_with_form(Some("https://example.com/hook")));
        let mut store = ConfigStore::new(transport.clone());
        store.load().await.unwrap();
        store.save_all().await.unwrap();
        assert_eq!(transport.stored_docs(), ConfigDoc::ALL.to_vec());
        assert_eq!(store.status(), Some("Saved all configs."));
    }

    #[tokio::test]
    async fn mid_sequence_failure_leaves_earlier_documents_saved() {
        let transport = FakeTransport::seeded(&bundle_with_form(Some("https://example.com/hook")));
        let mut store = ConfigStore::new(transport.clone());
        store.load().await.unwrap();

        *transport.fail_store.lock().unwrap() = Some(ConfigDoc::Tools);
        store.save_all().await.unwrap_err();

        assert_eq!(
            transport.stored_docs(),
            vec![ConfigDoc::Project, ConfigDoc::Forms]
        );
        let status = store.status().unwrap();
        assert!(status.contains("Save failed at tools"));
        assert!(status.contains("project, forms"));
    }

    #[tokio::test]
    async fn publish_surfaces_the_new_version() {
        let transport = FakeTransport::seeded(&ConfigBundle::default());
        let mut store = ConfigStore::new(transport);
        let receipt = store.publish().await.unwrap();
        assert_eq!(receipt.version, 7);
        assert_eq!(store.status(), Some("Published version 7."));
    }
}
