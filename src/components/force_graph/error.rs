//! Errors reported by the graph engine.

/// Caller-contract violations surfaced by [`DynamicGraph`](super::DynamicGraph).
///
/// None of these are raised as panics; each is logged and handed back so the
/// host can decide whether to care.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	/// `update_vis` was called without the named collection.
	#[error("update_vis requires both collections, but `{0}` was absent")]
	MissingCollection(&'static str),
	/// No option has this name.
	#[error("unknown option `{0}`")]
	UnknownOption(String),
	/// The value does not fit the named option's type.
	#[error("invalid value for option `{name}`: {source}")]
	InvalidOption {
		/// Option name as given by the caller.
		name: String,
		/// Why the value was rejected.
		#[source]
		source: serde_json::Error,
	},
	/// The option set as a whole failed to (de)serialize.
	#[error("options could not be (de)serialized: {0}")]
	Options(#[from] serde_json::Error),
}

/// Result of a fallible graph operation.
pub type Result<T> = std::result::Result<T, GraphError>;
