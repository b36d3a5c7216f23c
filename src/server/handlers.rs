//! MCP tool handlers for the phonebook server.
//!
//! This module implements all the MCP tools using the rmcp SDK's tool_router pattern.

use crate::models::Person;
use crate::phonebook::Phonebook;
use crate::services::{
    ActionReport, PersonService, PersonServiceImpl, PhoneService, PhoneServiceImpl,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;

/// The phonebook MCP server that exposes tools for managing persons and numbers.
#[derive(Clone)]
pub struct PhonebookMcpServer {
    phone_service: Arc<dyn PhoneService>,
    person_service: Arc<dyn PersonService>,
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for PhonebookMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "phonebook-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some("MCP server for a phonebook - lists persons and adds, edits and deletes their phone numbers with server-side validation.".into()),
        }
    }
}

// Helper structs for tool parameters
#[derive(Debug, Deserialize, JsonSchema)]
struct GetPersonParams {
    /// Omit to get an empty, unsaved person for the add-number flow
    #[serde(default)]
    person_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PersonIdParams {
    person_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddPersonParams {
    name: String,
    surname: String,
    #[serde(default)]
    middlename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct EditPersonParams {
    person_id: String,
    name: String,
    surname: String,
    #[serde(default)]
    middlename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddNumberParams {
    /// Omit to create a new person owning this number
    #[serde(default)]
    person_id: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct EditNumberParams {
    person_id: String,
    phone_id: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeleteNumberParams {
    person_id: String,
    phone_id: String,
}

// Helper function to convert errors to MCP errors
fn to_mcp_error(e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

/// Person as returned by the tools: phones ordered by phone ID.
pub(crate) fn person_json(person: &Person) -> serde_json::Value {
    serde_json::json!({
        "id": person.id(),
        "full_name": person.full_name(),
        "name": person.name,
        "surname": person.surname,
        "middlename": person.middlename,
        "phones": person.sorted_phones().iter().map(|(phone_id, number)| {
            serde_json::json!({
                "phone_id": phone_id,
                "number": number,
            })
        }).collect::<Vec<_>>(),
    })
}

fn report_result(report: &ActionReport) -> Result<CallToolResult, McpError> {
    let json_response = serde_json::to_string_pretty(report).map_err(to_mcp_error)?;
    Ok(CallToolResult::success(vec![Content::text(json_response)]))
}

#[tool_router]
impl PhonebookMcpServer {
    /// Create a new phonebook MCP server around a shared phonebook.
    pub fn new(phonebook: Arc<Phonebook>) -> Self {
        let phone_service =
            Arc::new(PhoneServiceImpl::new(phonebook.clone())) as Arc<dyn PhoneService>;
        let person_service =
            Arc::new(PersonServiceImpl::new(phonebook)) as Arc<dyn PersonService>;

        Self {
            phone_service,
            person_service,
            tool_router: Self::tool_router(),
        }
    }

    /// List every person in the phonebook.
    #[tool(description = "List every person in the phonebook with their phone numbers, ordered by ID")]
    async fn list_persons(&self) -> Result<CallToolResult, McpError> {
        let persons = self.person_service.list_persons().await;

        let json_response = serde_json::to_string_pretty(&serde_json::json!({
            "count": persons.len(),
            "persons": persons.iter().map(person_json).collect::<Vec<_>>(),
        }))
        .map_err(to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(json_response)]))
    }

    /// Get one person by ID.
    #[tool(
        description = "Get a person and their phone numbers by ID. Without an ID, returns an empty unsaved person to which a first number can be added."
    )]
    async fn get_person(
        &self,
        params: Parameters<GetPersonParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let person = self
            .phone_service
            .get_person(params.person_id.as_deref())
            .await
            .ok_or_else(|| {
                to_mcp_error(format!(
                    "Person not found: {}",
                    params.person_id.as_deref().unwrap_or_default()
                ))
            })?;

        let json_response =
            serde_json::to_string_pretty(&person_json(&person)).map_err(to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(json_response)]))
    }

    /// Create a new person.
    #[tool(description = "Create a new person with no phone numbers")]
    async fn add_person(
        &self,
        params: Parameters<AddPersonParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: add_person called");
        let report = self
            .person_service
            .add_person(&params.name, &params.surname, params.middlename.as_deref())
            .await;

        report_result(&report)
    }

    /// Rename an existing person.
    #[tool(description = "Change the name, surname and middle name of an existing person")]
    async fn edit_person(
        &self,
        params: Parameters<EditPersonParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: edit_person called");
        tracing::debug!("Parameters: person_id={}", params.person_id);
        let report = self
            .person_service
            .edit_person(
                &params.person_id,
                &params.name,
                &params.surname,
                params.middlename.as_deref(),
            )
            .await;

        report_result(&report)
    }

    /// Delete a person and all of their numbers.
    #[tool(description = "Delete a person together with all of their phone numbers")]
    async fn delete_person(
        &self,
        params: Parameters<PersonIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: delete_person called");
        tracing::debug!("Parameters: person_id={}", params.person_id);
        let report = self.person_service.delete_person(&params.person_id).await;

        report_result(&report)
    }

    /// Add a phone number to a person.
    #[tool(
        description = "Add a phone number (2-50 characters of digits, +, - and #) to a person. Without a person_id a new person is created for it."
    )]
    async fn add_number(
        &self,
        params: Parameters<AddNumberParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: add_number called");
        tracing::debug!(
            "Parameters: person_id={:?}, phone={:?}",
            params.person_id,
            params.phone
        );
        let report = self
            .phone_service
            .add_number(params.person_id.as_deref(), params.phone.as_deref())
            .await;

        report_result(&report)
    }

    /// Replace one of a person's phone numbers.
    #[tool(description = "Replace the phone number stored under phone_id for a person")]
    async fn edit_number(
        &self,
        params: Parameters<EditNumberParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: edit_number called");
        tracing::debug!(
            "Parameters: person_id={}, phone_id={}, phone={:?}",
            params.person_id,
            params.phone_id,
            params.phone
        );
        let report = self
            .phone_service
            .edit_number(&params.person_id, &params.phone_id, params.phone.as_deref())
            .await;

        report_result(&report)
    }

    /// Delete one of a person's phone numbers.
    #[tool(description = "Delete the phone number stored under phone_id for a person")]
    async fn delete_number(
        &self,
        params: Parameters<DeleteNumberParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        tracing::info!("MCP Handler: delete_number called");
        tracing::debug!(
            "Parameters: person_id={}, phone_id={}",
            params.person_id,
            params.phone_id
        );
        let report = self
            .phone_service
            .delete_number(&params.person_id, &params.phone_id)
            .await;

        report_result(&report)
    }
}
