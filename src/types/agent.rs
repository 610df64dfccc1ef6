use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A backend conversational agent reachable through the gateway.
///
/// The selection determines the endpoint used for both chat turns and batch
/// submissions. Parsing an unrecognized selector is a local validation error;
/// no request is ever issued for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agent {
    /// Data source ingestion document agent.
    #[serde(rename = "doc")]
    DocIngestion,
    /// Splunk SPL to Cortex XSIAM XQL translation agent.
    #[serde(rename = "spl")]
    SplToXql,
    /// Data model rule generator agent.
    #[serde(rename = "dmgen")]
    DataModelGen,
}

impl Agent {
    /// All selectable agents, in display order.
    pub const ALL: [Agent; 3] = [Agent::DocIngestion, Agent::SplToXql, Agent::DataModelGen];

    /// The wire slug used in endpoint paths.
    pub fn slug(&self) -> &'static str {
        match self {
            Agent::DocIngestion => "doc",
            Agent::SplToXql => "spl",
            Agent::DataModelGen => "dmgen",
        }
    }

    /// Origin-relative path for interactive chat turns.
    pub fn chat_path(&self) -> String {
        format!("api/chat/{}", self.slug())
    }

    /// Origin-relative path for batch file submissions.
    pub fn batch_path(&self) -> String {
        format!("api/batch_chat/{}", self.slug())
    }

    /// Human-readable agent name.
    pub fn name(&self) -> &'static str {
        match self {
            Agent::DocIngestion => "Data Source Ingestion Document Agent",
            Agent::SplToXql => "SPL to XQL Agent",
            Agent::DataModelGen => "Data Model Generator",
        }
    }

    /// Greeting shown in the transcript when this agent becomes active.
    pub fn greeting(&self) -> &'static str {
        match self {
            Agent::DocIngestion => {
                "Switched to Data Source Ingestion Document Agent. Give me a data source \
                 name and I'll generate an implementation document; follow-up questions welcome."
            }
            Agent::SplToXql => {
                "Switched to SPL to XQL Agent. Give me a Splunk SPL query and I'll convert \
                 it to Cortex XSIAM XQL; follow-up questions welcome."
            }
            Agent::DataModelGen => {
                "Switched to Data Model Generator. Give me raw logs and I'll generate data \
                 model rules for XSIAM."
            }
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Agent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doc" => Ok(Agent::DocIngestion),
            "spl" => Ok(Agent::SplToXql),
            "dmgen" => Ok(Agent::DataModelGen),
            other => Err(Error::validation(
                format!("unknown agent '{other}' (expected doc, spl, or dmgen)"),
                Some("agent".to_string()),
            )),
        }
    }
}
