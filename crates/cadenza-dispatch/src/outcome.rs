use bytes::Bytes;
use cadenza_http::{Error, Response, Result};
use serde_json::Value;

/// What a controller method produced
///
/// A [`Outcome::Response`] replaces the working response. Every other variant
/// only becomes the body of the working response; its status and headers are
/// left as they were.
#[derive(Debug, Clone)]
pub enum Outcome {
	Response(Response),
	Text(String),
	Bytes(Bytes),
	/// Serialized with `serde_json`
	Json(Value),
	/// Empties the body
	Empty,
}

impl Outcome {
	/// Fold this outcome into the working response
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_dispatch::Outcome;
	/// use cadenza_http::Response;
	/// use http::StatusCode;
	///
	/// let working = Response::new(StatusCode::ACCEPTED).with_header("x-trace", "1");
	/// let response = Outcome::from("queued").apply(working).unwrap();
	///
	/// assert_eq!(response.status, StatusCode::ACCEPTED);
	/// assert_eq!(response.headers.get("x-trace").unwrap(), "1");
	/// assert_eq!(response.body_text(), "queued");
	/// ```
	pub fn apply(self, working: Response) -> Result<Response> {
		Ok(match self {
			Outcome::Response(response) => response,
			Outcome::Text(text) => working.with_body(text),
			Outcome::Bytes(bytes) => working.with_body(bytes),
			Outcome::Json(value) => {
				let body =
					serde_json::to_vec(&value).map_err(|e| Error::Serialization(e.to_string()))?;
				working.with_body(body)
			}
			Outcome::Empty => working.with_body(Bytes::new()),
		})
	}
}

impl From<Response> for Outcome {
	fn from(response: Response) -> Self {
		Outcome::Response(response)
	}
}

impl From<String> for Outcome {
	fn from(text: String) -> Self {
		Outcome::Text(text)
	}
}

impl From<&str> for Outcome {
	fn from(text: &str) -> Self {
		Outcome::Text(text.to_string())
	}
}

impl From<Bytes> for Outcome {
	fn from(bytes: Bytes) -> Self {
		Outcome::Bytes(bytes)
	}
}

impl From<Vec<u8>> for Outcome {
	fn from(bytes: Vec<u8>) -> Self {
		Outcome::Bytes(Bytes::from(bytes))
	}
}

impl From<Value> for Outcome {
	fn from(value: Value) -> Self {
		Outcome::Json(value)
	}
}

impl From<()> for Outcome {
	fn from(_: ()) -> Self {
		Outcome::Empty
	}
}
