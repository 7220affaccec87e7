use rocket::response::{Responder, Response};
use rocket::{Request, http::Status};
use std::fmt;
use std::io::Cursor;

/// Failures that escape the RPC engine and surface as plain HTTP errors.
#[derive(Debug)]
pub enum ApiError {
    DatabaseError(String),
    InternalServerError(String),
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let (status, message) = match self {
            ApiError::DatabaseError(msg) => (Status::InternalServerError, msg),
            ApiError::InternalServerError(msg) => (Status::InternalServerError, msg),
        };

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::Plain)
            .sized_body(message.len(), Cursor::new(message))
            .ok()
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::DatabaseError(format!("Database error: {err}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InternalServerError(format!("Serialization error: {err}"))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalServerError(format!("Request worker failed: {err}"))
    }
}

/// Protocol-level failures. These never abort a response; they are rendered
/// into the `type: "error"` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    MissingVersion,
    InvalidVersion,
    NoRequestData,
    InvalidType,
    InvalidBy,
    ArgTooSmall,
    TooManyResults,
    InvalidCallback,
    RateLimited,
    ArgMustBeArray,
    ArgMustBeString,
    ByMustBeString,
    MalformedRequest,
    RequestTooLarge,
    UnknownEndpoint,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RpcError::MissingVersion => "Please specify an API version.",
            RpcError::InvalidVersion => "Invalid version specified.",
            RpcError::NoRequestData => "No request type/data specified.",
            RpcError::InvalidType => "Incorrect request type specified.",
            RpcError::InvalidBy => "Incorrect by field specified.",
            RpcError::ArgTooSmall => "Query arg too small.",
            RpcError::TooManyResults => "Too many package results.",
            RpcError::InvalidCallback => "Invalid callback name.",
            RpcError::RateLimited => "Rate limit reached",
            RpcError::ArgMustBeArray => "the 'arg' parameter must be of array type",
            RpcError::ArgMustBeString => "the 'arg' parameter must be of string type",
            RpcError::ByMustBeString => "the 'by' parameter must be of string type",
            RpcError::MalformedRequest => "Malformed request.",
            RpcError::RequestTooLarge => "Request body too large.",
            RpcError::UnknownEndpoint => "Unknown RPC endpoint.",
        };
        f.write_str(message)
    }
}

impl std::error::Error for RpcError {}

/// Outcome of a type handler: either a protocol error for the envelope or a
/// storage failure that has to propagate.
#[derive(Debug)]
pub enum HandleError {
    Rpc(RpcError),
    Database(diesel::result::Error),
}

impl From<RpcError> for HandleError {
    fn from(err: RpcError) -> Self {
        HandleError::Rpc(err)
    }
}

impl From<diesel::result::Error> for HandleError {
    fn from(err: diesel::result::Error) -> Self {
        HandleError::Database(err)
    }
}
