//! Best-effort connection and glucose graph retrieval.

use crate::headers::authorized_headers;
use crate::observer::{FetchStage, Swallowed};
use crate::{AuthError, LinkUpClient, Session};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Guidance shown when the account follows nobody yet.
pub const NO_CONNECTIONS_MESSAGE: &str =
    "No LibreLinkUp connections found. Please set up a connection in your Libre app.";

/// A patient the account may view. Unknown provider fields are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Connection {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// What a glucose fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CgmData {
    /// `data.connection` of the graph response, untouched
    Graph(Value),
    /// The connections list was empty
    NoConnections,
}

impl LinkUpClient {
    async fn connections(&self, session: &Session, headers: HeaderMap) -> Result<Vec<Value>, Swallowed> {
        let url = self.resolver().url(&session.region, "connections");
        let mut body = self
            .get_json(&url, headers)
            .await
            .map_err(Swallowed::at(FetchStage::Connections))?;

        match body.get_mut("data").map(Value::take) {
            Some(Value::Array(list)) => {
                debug!(count = list.len(), "Connections fetched");
                Ok(list)
            }
            _ => Err(Swallowed {
                stage: FetchStage::Connections,
                error: AuthError::MalformedResponse("connections response has no data list".to_string()),
            }),
        }
    }

    async fn try_fetch_connection(&self, session: &Session) -> Result<Option<Connection>, Swallowed> {
        let headers = authorized_headers(session).map_err(Swallowed::at(FetchStage::Connections))?;
        let Some(first) = self.connections(session, headers).await?.into_iter().next() else {
            return Ok(None);
        };

        serde_json::from_value(first)
            .map(Some)
            .map_err(|e| Swallowed::at(FetchStage::Connections)(AuthError::from(e)))
    }

    /// The active (first) connection, or `None` if there is none or the
    /// request failed.
    pub async fn fetch_connection(&self, session: &Session) -> Option<Connection> {
        match self.try_fetch_connection(session).await {
            Ok(connection) => connection,
            Err(failure) => {
                self.report(failure);
                None
            }
        }
    }

    async fn try_fetch_cgm_data(&self, session: &Session) -> Result<CgmData, Swallowed> {
        let headers = authorized_headers(session).map_err(Swallowed::at(FetchStage::Connections))?;
        let connections = self.connections(session, headers.clone()).await?;

        let Some(first) = connections.first() else {
            info!("Account has no connections configured");
            return Ok(CgmData::NoConnections);
        };

        let patient_id = first
            .get("patientId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Swallowed {
                stage: FetchStage::Connections,
                error: AuthError::MalformedResponse("first connection has no patientId".to_string()),
            })?;

        let url = self
            .resolver()
            .url(&session.region, &format!("connections/{}/graph", patient_id));
        let mut body = self
            .get_json(&url, headers)
            .await
            .map_err(Swallowed::at(FetchStage::Graph))?;

        match body.pointer_mut("/data/connection").map(Value::take) {
            Some(connection) if !connection.is_null() => Ok(CgmData::Graph(connection)),
            _ => Err(Swallowed {
                stage: FetchStage::Graph,
                error: AuthError::MalformedResponse("graph response has no data.connection".to_string()),
            }),
        }
    }

    /// Glucose graph for the active connection.
    ///
    /// `Some(CgmData::NoConnections)` when the account follows nobody;
    /// `None` when any request failed.
    pub async fn fetch_cgm_data(&self, session: &Session) -> Option<CgmData> {
        match self.try_fetch_cgm_data(session).await {
            Ok(data) => Some(data),
            Err(failure) => {
                self.report(failure);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connection_keeps_unknown_fields() {
        let raw = json!({
            "patientId": "p1",
            "firstName": "Ada",
            "glucoseMeasurement": {"ValueInMgPerDl": 104, "TrendArrow": 3}
        });
        let connection: Connection = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(connection.patient_id, "p1");
        assert_eq!(connection.field("firstName"), Some(&json!("Ada")));
        assert_eq!(serde_json::to_value(&connection).unwrap(), raw);
    }

    #[test]
    fn connection_requires_patient_id() {
        let result: Result<Connection, _> = serde_json::from_value(json!({"firstName": "Ada"}));
        assert!(result.is_err());
    }
}
