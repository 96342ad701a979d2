//! The data tools exposed to the model
//!
//! Each tool is one typed argument struct plus one query template. The
//! argument struct produces the schema the model sees and is also what the
//! model's arguments are deserialized into before the query runs.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::client::GraphqlTransport;
use super::queries;
use crate::llm::tools::{RegistryError, ToolRegistration, ToolRegistry};

/// Arguments for tools that take none
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdArgs {
    /// Identifier of the record, exactly as returned by a list tool
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EventTypeArgs {
    /// Event type, for example "goal", "yellow_card", "red_card" or "substitution"
    pub event_type: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlayerIdArgs {
    /// Identifier of the player
    pub player_id: String,
}

/// Register a tool that runs `query` with variables built from its arguments
fn query_tool<Args, V>(
    transport: &Arc<dyn GraphqlTransport>,
    name: &str,
    description: &str,
    query: &'static str,
    variables: V,
) -> ToolRegistration
where
    Args: DeserializeOwned + JsonSchema + Send + 'static,
    V: Fn(Args) -> Value + Send + Sync + 'static,
{
    let transport = Arc::clone(transport);
    let tool = name.to_string();

    ToolRegistration::new(name, description, move |args: Args| {
        let transport = Arc::clone(&transport);
        let variables = variables(args);
        let tool = tool.clone();

        async move {
            transport.execute(query, variables).await.map_err(|e| {
                tracing::warn!(tool = %tool, error = %e, "query failed");
                e.to_string()
            })
        }
    })
}

/// Build the registry of all data tools, backed by `transport`
pub fn query_registry(transport: Arc<dyn GraphqlTransport>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    registry.register(query_tool(
        &transport,
        "list_matches",
        "List all matches with teams, score, date and venue.",
        queries::LIST_MATCHES,
        |_: NoArgs| json!({}),
    ))?;

    registry.register(query_tool(
        &transport,
        "get_match",
        "Get one match by id, including its players and its timeline of events.",
        queries::GET_MATCH,
        |args: IdArgs| json!({ "id": args.id }),
    ))?;

    registry.register(query_tool(
        &transport,
        "list_players",
        "List all players with their team and position.",
        queries::LIST_PLAYERS,
        |_: NoArgs| json!({}),
    ))?;

    registry.register(query_tool(
        &transport,
        "get_player",
        "Get one player by id, including the matches they played in.",
        queries::GET_PLAYER,
        |args: IdArgs| json!({ "id": args.id }),
    ))?;

    registry.register(query_tool(
        &transport,
        "list_events_by_type",
        "List match events of one type (goal, card, substitution, ...) across all matches.",
        queries::LIST_EVENTS_BY_TYPE,
        |args: EventTypeArgs| json!({ "eventType": args.event_type }),
    ))?;

    registry.register(query_tool(
        &transport,
        "list_events_by_player",
        "List match events involving one player.",
        queries::LIST_EVENTS_BY_PLAYER,
        |args: PlayerIdArgs| json!({ "playerId": args.player_id }),
    ))?;

    Ok(registry)
}
