//! Messages pushed by the host on the window message channel.

use serde::Deserialize;
use serde_json::Value;

use super::config::StyleConfig;

/// Inbound host message, tagged by its `type` field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
	/// New document text (or an already decoded object), optionally with a new config.
	Update {
		content: Value,
		#[serde(default)]
		config: Option<StyleConfig>,
	},
	/// Configuration changed; the document did not.
	ConfigUpdate { config: StyleConfig },
	/// The host failed to decode the document; `content` is shown verbatim.
	Error { content: String },
}

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
	#[error("unrecognized host message: {0}")]
	Decode(#[from] serde_json::Error),
}

impl HostMessage {
	/// Decodes a message from its JSON form.
	pub fn from_json(json: &str) -> Result<Self, MessageError> {
		Ok(serde_json::from_str(json)?)
	}
}
