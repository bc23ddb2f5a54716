//! Linear GraphQL adapter.

use crate::config::LinearConfig;
use crate::http::{VendorHttp, headers};
use crate::traits::{CreatedCycle, CreatedIssue, CycleInput, IssueInput, IssueTracker};
use async_trait::async_trait;
use pmk_core::{PmkError, Priority, Result, Vendor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const LINEAR_API_BASE: &str = "https://api.linear.app";

const VIEWER_QUERY: &str = "query Viewer { viewer { id name email } }";
const TEAMS_QUERY: &str = "query Teams { teams { nodes { id name key } } }";
const TEAM_QUERY: &str = "query Team($id: String!) { team(id: $id) { id name key } }";
const CYCLE_CREATE: &str = "mutation CycleCreate($input: CycleCreateInput!) { \
     cycleCreate(input: $input) { success cycle { id number } } }";
const ISSUE_CREATE: &str = "mutation IssueCreate($input: IssueCreateInput!) { \
     issueCreate(input: $input) { success issue { id identifier url } } }";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTeam {
    pub id: String,
    pub name: String,
    pub key: String,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload<T> {
    success: bool,
    #[serde(alias = "cycle", alias = "issue")]
    entity: Option<T>,
}

/// Linear priority scale: 1 urgent, 2 high, 3 medium, 4 low.
pub fn linear_priority(priority: Priority) -> u8 {
    match priority {
        Priority::High => 2,
        Priority::Medium => 3,
        Priority::Low => 4,
    }
}

/// Linear client. The API key goes into `Authorization` as-is, without a scheme.
pub struct LinearClient {
    http: VendorHttp,
    team_id: Option<String>,
}

impl LinearClient {
    pub fn new(config: LinearConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(LINEAR_API_BASE);
        let headers = headers(Vendor::Linear, &[("authorization", &config.api_key)], &[])?;
        let http = VendorHttp::new(Vendor::Linear, base_url, headers, config.timeout)?;
        Ok(Self { http, team_id: config.team_id })
    }

    /// Run one GraphQL operation. A 200 response carrying `errors` is still a failure.
    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let body = json!({ "query": query, "variables": variables });
        let response: GraphqlResponse<T> = self.http.post("/graphql", &body).await?;

        if !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(PmkError::VendorApi {
                vendor: Vendor::Linear,
                status: 200,
                body: messages.join("; "),
            });
        }
        response.data.ok_or_else(|| PmkError::VendorApi {
            vendor: Vendor::Linear,
            status: 200,
            body: "response carried neither data nor errors".to_string(),
        })
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        query: &str,
        field: &str,
        input: Value,
    ) -> Result<T> {
        let mut data: serde_json::Map<String, Value> =
            self.graphql(query, json!({ "input": input })).await?;
        let payload: MutationPayload<T> =
            serde_json::from_value(data.remove(field).unwrap_or(Value::Null))?;
        match payload {
            MutationPayload { success: true, entity: Some(entity) } => Ok(entity),
            _ => Err(PmkError::VendorApi {
                vendor: Vendor::Linear,
                status: 200,
                body: format!("{field} reported success=false"),
            }),
        }
    }

    pub async fn viewer(&self) -> Result<LinearUser> {
        #[derive(Deserialize)]
        struct Data {
            viewer: LinearUser,
        }
        let data: Data = self.graphql(VIEWER_QUERY, json!({})).await?;
        Ok(data.viewer)
    }

    pub async fn teams(&self) -> Result<Vec<LinearTeam>> {
        #[derive(Deserialize)]
        struct Data {
            teams: Connection<LinearTeam>,
        }
        let data: Data = self.graphql(TEAMS_QUERY, json!({})).await?;
        Ok(data.teams.nodes)
    }

    pub async fn team(&self, id: &str) -> Result<LinearTeam> {
        #[derive(Deserialize)]
        struct Data {
            team: LinearTeam,
        }
        let data: Data = self.graphql(TEAM_QUERY, json!({ "id": id })).await?;
        Ok(data.team)
    }
}

#[async_trait]
impl IssueTracker for LinearClient {
    fn default_team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    async fn create_cycle(&self, team_id: &str, input: CycleInput) -> Result<CreatedCycle> {
        let input = json!({
            "teamId": team_id,
            "name": input.name,
            "description": input.description,
            "startsAt": input.starts_at,
            "endsAt": input.ends_at,
        });
        self.mutate(CYCLE_CREATE, "cycleCreate", input).await
    }

    async fn create_issue(&self, team_id: &str, input: IssueInput) -> Result<CreatedIssue> {
        let mut body = json!({
            "teamId": team_id,
            "title": input.title,
            "description": input.description,
            "priority": linear_priority(input.priority),
        });
        if let Some(estimate) = input.estimate {
            body["estimate"] = json!(estimate);
        }
        if let Some(cycle_id) = input.cycle_id {
            body["cycleId"] = json!(cycle_id);
        }
        self.mutate(ISSUE_CREATE, "issueCreate", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_mapping() {
        assert_eq!(linear_priority(Priority::High), 2);
        assert_eq!(linear_priority(Priority::Low), 4);
    }

    #[test]
    fn test_mutation_payload_accepts_either_entity_name() {
        let cycle: MutationPayload<CreatedCycle> =
            serde_json::from_value(json!({"success": true, "cycle": {"id": "c1", "number": 3}}))
                .unwrap();
        assert_eq!(cycle.entity.unwrap().number, Some(3));

        let issue: MutationPayload<CreatedIssue> = serde_json::from_value(json!({
            "success": true,
            "issue": {"id": "i1", "identifier": "ENG-1", "url": "https://linear.app/i/ENG-1"}
        }))
        .unwrap();
        assert_eq!(issue.entity.unwrap().identifier, "ENG-1");
    }
}
