use clap::Subcommand;
use formloom_client::BuilderClient;
use formloom_core::forms::{FormId, IntentId};
use formloom_core::rules;
use serde_json::json;

use crate::util::{render, render_error};

use super::form::{edit_forms, fetch_catalog};

#[derive(Subcommand)]
pub enum IntentCommands {
    /// List intent routing rules
    List,
    /// Create an intent targeting the first form
    Add,
    /// Delete an intent
    Remove { intent: String },
    /// Point an intent at a different form
    SetTarget { intent: String, form: String },
}

pub async fn run(builder_url: &str, command: IntentCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        IntentCommands::List => {
            let catalog = match fetch_catalog(&client).await {
                Ok(catalog) => catalog,
                Err(err) => return render_error(err),
            };
            render(Ok(catalog.intents))
        }
        IntentCommands::Add => {
            edit_forms(&client, |catalog| {
                let id = rules::add_intent(catalog);
                let intent = catalog.intent_by_id(&id).unwrap();
                Ok(serde_json::to_value(intent).unwrap())
            })
            .await
        }
        IntentCommands::Remove { intent } => {
            edit_forms(&client, |catalog| {
                let id = IntentId(intent.clone());
                rules::delete_intent(catalog, &id).map_err(|e| e.to_string())?;
                Ok(json!({ "status": "ok", "deleted": id }))
            })
            .await
        }
        IntentCommands::SetTarget { intent, form } => {
            edit_forms(&client, |catalog| {
                let intent_id = IntentId(intent.clone());
                let form_id = FormId::from(form.as_str());
                rules::retarget_intent(catalog, &intent_id, &form_id).map_err(|e| e.to_string())?;
                Ok(json!({ "intent": intent_id, "target_form": form_id }))
            })
            .await
        }
    }
}
