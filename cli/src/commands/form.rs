use clap::Subcommand;
use formloom_client::{BuilderClient, ClientError};
use formloom_core::bundle::ConfigDoc;
use formloom_core::forms::{FieldType, Form, FormId, FormMode, FormsConfig};
use formloom_core::rules::{self, MoveDirection, RuleViolation};
use formloom_core::validate::{validate_forms, webhook_gate};
use serde_json::{Value, json};

use crate::util::{EXIT_CLIENT_ERROR, EXIT_OK, exit_error, render, render_error};

#[derive(Subcommand)]
pub enum FormCommands {
    /// List forms with their mode and field count
    List,
    /// Print one form
    Show { form: String },
    /// Create an empty form
    Create,
    /// Delete a form (intents pointing at it are retargeted)
    Delete { form: String },
    /// Append a fresh text field
    AddField { form: String },
    /// Rename a field, rewriting the field order atomically
    RenameField {
        form: String,
        old: String,
        new: String,
    },
    /// Change a field's type (dropdown/enum forces step-by-step mode)
    RetypeField {
        form: String,
        field: String,
        /// text, number, date, boolean, dropdown, enum, or file
        r#type: String,
    },
    /// Switch collection mode (blocked while dropdown/enum fields remain)
    SetMode {
        form: String,
        /// step-by-step or one-shot
        mode: String,
    },
    /// Move a field up or down; a no-op at either boundary
    MoveField {
        form: String,
        field: String,
        /// up or down
        direction: String,
    },
    /// Delete a field from the form and its ordering
    DeleteField { form: String, field: String },
    /// Set the submission webhook URL
    SetSubmissionUrl { form: String, url: String },
    /// Run the consistency sweep over forms and tools
    Validate,
}

pub async fn run(builder_url: &str, command: FormCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        FormCommands::List => list(&client).await,
        FormCommands::Show { form } => show(&client, &form).await,
        FormCommands::Create => {
            edit_forms(&client, |catalog| {
                let id = rules::add_form(catalog);
                let form = catalog.form_by_id(&id).unwrap();
                Ok(serde_json::to_value(form).unwrap())
            })
            .await
        }
        FormCommands::Delete { form } => {
            edit_forms(&client, |catalog| {
                let id = resolve_form_id(catalog, &form)?;
                let removal = rules::delete_form(catalog, &id).map_err(|e| e.to_string())?;
                Ok(json!({
                    "status": "ok",
                    "deleted": id,
                    "retargeted_intents": removal.retargeted_intents,
                    "orphaned_intents": removal.orphaned_intents,
                }))
            })
            .await
        }
        FormCommands::AddField { form } => {
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                let name = rules::add_field(target);
                Ok(json!({ "form": target.id, "field": name }))
            })
            .await
        }
        FormCommands::RenameField { form, old, new } => {
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                rules::rename_field(target, &old, &new).map_err(|e| e.to_string())?;
                Ok(json!({ "form": target.id, "field_order": target.field_order }))
            })
            .await
        }
        FormCommands::RetypeField { form, field, r#type } => {
            let new_type: FieldType = r#type
                .parse()
                .unwrap_or_else(|err: String| exit_error(&err, None));
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                rules::retype_field(target, &field, new_type).map_err(|e| e.to_string())?;
                Ok(json!({ "form": target.id, "field": field, "type": new_type, "mode": target.mode }))
            })
            .await
        }
        FormCommands::SetMode { form, mode } => {
            let mode: FormMode = mode
                .parse()
                .unwrap_or_else(|err: String| exit_error(&err, None));
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                rules::set_mode(target, mode).map_err(|e| e.to_string())?;
                Ok(json!({ "form": target.id, "mode": target.mode }))
            })
            .await
        }
        FormCommands::MoveField { form, field, direction } => {
            let direction: MoveDirection = direction
                .parse()
                .unwrap_or_else(|err: String| exit_error(&err, None));
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                let moved = rules::move_field(target, &field, direction);
                Ok(json!({ "form": target.id, "moved": moved, "field_order": target.field_order }))
            })
            .await
        }
        FormCommands::DeleteField { form, field } => {
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                rules::delete_field(target, &field).map_err(|e| e.to_string())?;
                Ok(json!({ "form": target.id, "field_order": target.field_order }))
            })
            .await
        }
        FormCommands::SetSubmissionUrl { form, url } => {
            edit_forms(&client, |catalog| {
                let target = resolve_form_mut(catalog, &form)?;
                target.submission_url = Some(url.clone());
                Ok(json!({ "form": target.id, "submission_url": target.submission_url }))
            })
            .await
        }
        FormCommands::Validate => validate(&client).await,
    }
}

/// Fetch the forms document, apply one edit through the consistency rules,
/// and PUT the document back. The closure's `Err` is a user-facing message;
/// nothing is written when it fires.
pub(crate) async fn edit_forms(
    client: &BuilderClient,
    edit: impl FnOnce(&mut FormsConfig) -> Result<Value, String>,
) -> i32 {
    let mut catalog = match fetch_catalog(client).await {
        Ok(catalog) => catalog,
        Err(err) => return render_error(err),
    };

    let outcome = match edit(&mut catalog) {
        Ok(outcome) => outcome,
        Err(message) => {
            let body = json!({ "error": "rule_violation", "message": message });
            eprintln!("{}", serde_json::to_string_pretty(&body).unwrap());
            return EXIT_CLIENT_ERROR;
        }
    };

    let value = serde_json::to_value(&catalog).unwrap();
    if let Err(err) = client.put_config(ConfigDoc::Forms, &value).await {
        return render_error(err);
    }
    println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
    EXIT_OK
}

pub(crate) async fn fetch_catalog(client: &BuilderClient) -> Result<FormsConfig, ClientError> {
    let raw = client.get_config(ConfigDoc::Forms).await?;
    serde_json::from_value(raw).map_err(|source| ClientError::Document {
        doc: ConfigDoc::Forms,
        source,
    })
}

fn resolve_form_id(catalog: &FormsConfig, query: &str) -> Result<FormId, String> {
    if catalog.form_by_id(&FormId::from(query)).is_some() {
        return Ok(FormId::from(query));
    }
    Err(unknown_form_message(catalog, query))
}

fn resolve_form_mut<'a>(catalog: &'a mut FormsConfig, query: &str) -> Result<&'a mut Form, String> {
    if catalog.form_by_id(&FormId::from(query)).is_none() {
        return Err(unknown_form_message(catalog, query));
    }
    Ok(catalog.form_by_id_mut(&FormId::from(query)).unwrap())
}

fn unknown_form_message(catalog: &FormsConfig, query: &str) -> String {
    let base = RuleViolation::UnknownForm(FormId::from(query)).to_string();
    match closest_form_id(catalog, query) {
        Some(suggestion) => format!("{base} (did you mean '{suggestion}'?)"),
        None => base,
    }
}

/// Closest existing form id by Jaro-Winkler similarity, if it is close
/// enough to be a plausible typo.
fn closest_form_id(catalog: &FormsConfig, query: &str) -> Option<String> {
    catalog
        .forms
        .iter()
        .map(|f| {
            (
                strsim::jaro_winkler(f.id.as_str(), query),
                f.id.as_str().to_string(),
            )
        })
        .filter(|(score, _)| *score >= 0.84)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, id)| id)
}

async fn list(client: &BuilderClient) -> i32 {
    let catalog = match fetch_catalog(client).await {
        Ok(catalog) => catalog,
        Err(err) => return render_error(err),
    };
    let summary: Vec<Value> = catalog
        .forms
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "name": f.name,
                "mode": f.mode,
                "fields": f.fields.len(),
                "submission_url": f.submission_url,
            })
        })
        .collect();
    render::<Vec<Value>>(Ok(summary))
}

async fn show(client: &BuilderClient, form: &str) -> i32 {
    let catalog = match fetch_catalog(client).await {
        Ok(catalog) => catalog,
        Err(err) => return render_error(err),
    };
    match catalog.form_by_id(&FormId::from(form)) {
        Some(found) => render(Ok(found.clone())),
        None => {
            let body = json!({
                "error": "not_found",
                "message": unknown_form_message(&catalog, form),
            });
            eprintln!("{}", serde_json::to_string_pretty(&body).unwrap());
            EXIT_CLIENT_ERROR
        }
    }
}

async fn validate(client: &BuilderClient) -> i32 {
    let catalog = match fetch_catalog(client).await {
        Ok(catalog) => catalog,
        Err(err) => return render_error(err),
    };
    let tools = match client.get_config(ConfigDoc::Tools).await {
        Ok(raw) => match serde_json::from_value(raw) {
            Ok(tools) => tools,
            Err(source) => {
                return render_error(ClientError::Document {
                    doc: ConfigDoc::Tools,
                    source,
                });
            }
        },
        Err(err) => return render_error(err),
    };

    let mut findings = validate_forms(&catalog, &tools);
    if let Err(blocked) = webhook_gate(&catalog) {
        // Already covered by per-form diagnostics, but the gate message is
        // what a save would report; show it too.
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json!({ "save_blocked": blocked.to_string() })).unwrap()
        );
    }
    let has_errors = findings.iter().any(|d| d.is_error());
    findings.sort_by_key(|d| d.form.clone().map(|f| f.0));
    println!("{}", serde_json::to_string_pretty(&findings).unwrap());
    if has_errors { EXIT_CLIENT_ERROR } else { EXIT_OK }
}

#[cfg(test)]
mod tests {
    use super::closest_form_id;
    use formloom_core::forms::{Form, FormsConfig};

    fn catalog_with(ids: &[&str]) -> FormsConfig {
        FormsConfig {
            intents: Vec::new(),
            forms: ids.iter().map(|id| Form::new((*id).into(), *id)).collect(),
        }
    }

    #[test]
    fn near_miss_suggests_the_closest_id() {
        let catalog = catalog_with(&["order_pizza", "book_table"]);
        assert_eq!(
            closest_form_id(&catalog, "order_pizzza"),
            Some("order_pizza".to_string())
        );
    }

    #[test]
    fn distant_queries_suggest_nothing() {
        let catalog = catalog_with(&["order_pizza"]);
        assert_eq!(closest_form_id(&catalog, "zzz"), None);
    }
}
