use clap::Subcommand;
use formloom_client::RuntimeClient;
use formloom_core::dialogue::{DialogueState, InputControl, next_control};
use formloom_core::forms::{Field, FieldName, FieldType};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::util::{EXIT_OK, render, render_error};

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Send one message; prints the reply, the dialogue state, and the next
    /// input control (awaited field plus selectable options)
    Send {
        /// Thread id; a fresh one is minted (and printed) when omitted
        #[arg(long)]
        thread: Option<String>,
        /// Message text. For a selection prompt, send the option literally.
        #[arg(long)]
        message: String,
        /// Chat against an explicit published version
        #[arg(long)]
        version: Option<i64>,
        /// Chat against the draft config instead of a published version
        #[arg(long)]
        preview: bool,
    },
    /// Mint a fresh thread id
    NewThread,
}

#[derive(Serialize)]
struct FieldView {
    name: FieldName,
    label: String,
    #[serde(rename = "type")]
    field_type: FieldType,
}

impl From<&Field> for FieldView {
    fn from(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
        }
    }
}

/// What the preview should render next, in a shell-friendly shape.
#[derive(Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
enum NextControlView {
    FreeText,
    Select {
        field: FieldView,
        options: Vec<String>,
    },
    YesNo {
        field: FieldView,
        options: Vec<String>,
    },
}

impl From<InputControl<'_>> for NextControlView {
    fn from(control: InputControl<'_>) -> Self {
        match control {
            InputControl::FreeText => NextControlView::FreeText,
            InputControl::Select { field, options } => NextControlView::Select {
                field: field.into(),
                options,
            },
            InputControl::YesNo { field } => NextControlView::YesNo {
                field: field.into(),
                options: vec!["yes".to_string(), "no".to_string()],
            },
        }
    }
}

#[derive(Serialize)]
struct TurnOutput {
    thread_id: String,
    reply: String,
    state: DialogueState,
    next: NextControlView,
}

fn mint_thread_id() -> String {
    format!("thread-{}", Uuid::now_v7())
}

pub async fn run(runtime_url: &str, command: ChatCommands) -> i32 {
    match command {
        ChatCommands::NewThread => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "thread_id": mint_thread_id() })).unwrap()
            );
            EXIT_OK
        }
        ChatCommands::Send {
            thread,
            message,
            version,
            preview,
        } => send(runtime_url, thread, &message, version, preview).await,
    }
}

async fn send(
    runtime_url: &str,
    thread: Option<String>,
    message: &str,
    version: Option<i64>,
    preview: bool,
) -> i32 {
    let client = RuntimeClient::new(runtime_url);
    let thread_id = thread.unwrap_or_else(mint_thread_id);

    let turn = if preview {
        client.chat_preview(&thread_id, message, version).await
    } else {
        client.chat(&thread_id, message, version).await
    };
    let turn = match turn {
        Ok(turn) => turn,
        Err(err) => return render_error(err),
    };

    // Re-project after every runtime response. A catalog that cannot be
    // fetched (nothing published yet) degrades to free-text, same as any
    // other stale-state case.
    let catalog = client.forms(version).await.unwrap_or_default();
    let next = NextControlView::from(next_control(&turn.state, &catalog));

    render(Ok(TurnOutput {
        thread_id,
        reply: turn.reply,
        state: turn.state,
        next,
    }))
}

#[cfg(test)]
mod tests {
    use super::NextControlView;
    use formloom_core::dialogue::{DialogueState, next_control};
    use formloom_core::forms::{Field, FieldType, Form, FormsConfig};
    use serde_json::json;

    #[test]
    fn select_control_serializes_with_field_and_options() {
        let mut form = Form::new("order".into(), "Order");
        let mut size = Field::new("size".into(), "Size");
        size.field_type = FieldType::Dropdown;
        size.dropdown_options = Some(vec!["small".to_string()]);
        form.fields.push(size);
        form.field_order.push("size".into());
        let catalog = FormsConfig {
            intents: Vec::new(),
            forms: vec![form],
        };
        let state = DialogueState {
            current_form_id: Some("order".into()),
            current_step_index: Some(0),
            awaiting_field: Some(true),
            ..DialogueState::default()
        };

        let view = NextControlView::from(next_control(&state, &catalog));
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["control"], json!("select"));
        assert_eq!(value["field"]["type"], json!("dropdown"));
        assert_eq!(value["options"], json!(["small"]));
    }

    #[test]
    fn missing_catalog_projects_to_free_text() {
        let state = DialogueState {
            awaiting_field: Some(true),
            current_form_id: Some("order".into()),
            ..DialogueState::default()
        };
        let view = NextControlView::from(next_control(&state, &FormsConfig::default()));
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({ "control": "free_text" })
        );
    }
}
