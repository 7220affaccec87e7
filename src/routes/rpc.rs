use crate::error::{ApiError, RpcError};
use crate::rpc::assembler::error_envelope;
use crate::rpc::types::DEFAULT_SEARCH_BY;
use crate::rpc::{Rpc, RpcRequest, etag, is_valid_callback, parse_legacy_args, to_canonical_json};
use crate::state::AppState;
use log::error;
use rocket::http::{ContentType, Status};
use rocket::request::{FromParam, FromRequest, Outcome, Request};
use rocket::response::{Responder, Response};
use rocket::serde::json::{Json, Value};
use rocket::{State, catch, get, post};
use std::io::Cursor;
use std::sync::Arc;
use url::form_urlencoded;

const DOCUMENTATION: &str = include_str!("../../doc/rpc.html");

/// Request details the RPC needs besides its declared parameters: the
/// decoded query pairs in order, the client host and `If-None-Match`.
pub struct RpcContext {
    query: Vec<(String, String)>,
    host: String,
    if_none_match: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RpcContext {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let query = request
            .uri()
            .query()
            .map(|q| decode_pairs(q.as_str()))
            .unwrap_or_default();
        // peer address only; forwarding headers are client-controlled
        let host = request
            .remote()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let if_none_match = request
            .headers()
            .get_one("If-None-Match")
            .map(str::to_string);

        Outcome::Success(RpcContext {
            query,
            host,
            if_none_match,
        })
    }
}

fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

/// `v5` style version segment of the versioned routes.
pub struct ApiVersion(i64);

impl<'a> FromParam<'a> for ApiVersion {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param
            .strip_prefix('v')
            .and_then(|number| number.parse().ok())
            .map(ApiVersion)
            .ok_or(param)
    }
}

#[derive(Debug)]
pub struct RpcResponse {
    status: Status,
    content_type: ContentType,
    etag: Option<String>,
    body: Option<String>,
}

impl RpcResponse {
    fn json(status: Status, value: &Value) -> Result<Self, ApiError> {
        Ok(Self {
            status,
            content_type: ContentType::JSON,
            etag: None,
            body: Some(to_canonical_json(value)?),
        })
    }

    fn documentation() -> Self {
        Self {
            status: Status::Ok,
            content_type: ContentType::HTML,
            etag: None,
            body: Some(DOCUMENTATION.to_string()),
        }
    }

    /// A tagged result document. The body is dropped with a 304 when the
    /// client already holds the same tag.
    fn tagged(
        value: &Value,
        if_none_match: Option<&str>,
        callback: Option<&str>,
    ) -> Result<Self, ApiError> {
        let body = to_canonical_json(value)?;
        let tag = etag(&body);
        let content_type = if callback.is_some() {
            ContentType::JavaScript
        } else {
            ContentType::JSON
        };

        let not_modified = if_none_match
            .map(|header| header.trim_matches(|c| matches!(c, '\t' | '\n' | '\r' | '"' | ' ')))
            .is_some_and(|client_tag| !client_tag.is_empty() && client_tag == tag);
        if not_modified {
            return Ok(Self {
                status: Status::NotModified,
                content_type,
                etag: Some(tag),
                body: None,
            });
        }

        let body = match callback {
            Some(name) => format!("/**/{name}({body})"),
            None => body,
        };
        Ok(Self {
            status: Status::Ok,
            content_type,
            etag: Some(tag),
            body: Some(body),
        })
    }
}

impl<'r> Responder<'r, 'static> for RpcResponse {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let mut response = Response::build();
        response.status(self.status).header(self.content_type);
        if let Some(tag) = self.etag {
            response.raw_header("ETag", format!("\"{tag}\""));
        }
        if let Some(body) = self.body {
            response.sized_body(body.len(), Cursor::new(body));
        }
        response.ok()
    }
}

/// Parameters of one call before argument resolution.
#[derive(Debug, Default)]
struct RpcCall {
    version: Option<i64>,
    request_type: Option<String>,
    by: Option<String>,
    arg: Option<String>,
    args: Vec<String>,
    callback: Option<String>,
}

impl RpcCall {
    fn new(version: i64, request_type: &str) -> Self {
        Self {
            version: Some(version),
            request_type: Some(request_type.to_string()),
            ..Self::default()
        }
    }

    /// Legacy form fields; a repeated single-valued field keeps its last value.
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, RpcError> {
        let mut call = Self::default();
        let mut version = None;
        for (key, value) in pairs {
            match key.as_str() {
                "v" => version = Some(value.as_str()),
                "type" => call.request_type = Some(value.clone()),
                "by" => call.by = Some(value.clone()),
                "arg" => call.arg = Some(value.clone()),
                "arg[]" => call.args.push(value.clone()),
                "callback" => call.callback = Some(value.clone()),
                _ => {}
            }
        }

        call.version = match version {
            Some(raw) => Some(raw.trim().parse().map_err(|_| RpcError::InvalidVersion)?),
            None => None,
        };
        Ok(call)
    }

    /// Query-string `arg`/`arg[]` keys take precedence over the call's own
    /// arguments. An empty `arg` counts as absent.
    fn resolve_args(&mut self, query: &[(String, String)]) -> Vec<String> {
        if let Some(args) = parse_legacy_args(query) {
            return args;
        }
        self.arg
            .take()
            .filter(|arg| !arg.is_empty())
            .into_iter()
            .chain(std::mem::take(&mut self.args))
            .collect()
    }
}

enum Dispatch {
    RateLimited(Value),
    Rejected(Value),
    Handled(Value),
}

async fn execute(state: &AppState, ctx: RpcContext, mut call: RpcCall) -> Result<RpcResponse, ApiError> {
    let config = state.config.snapshot();
    let database = Arc::clone(&state.database);
    let ratelimit = Arc::clone(&state.ratelimit);

    let version = call.version;
    let callback = call.callback.take().filter(|name| !name.is_empty());
    let request = RpcRequest {
        version,
        request_type: call.request_type.take(),
        by: call.by.take().unwrap_or_else(|| DEFAULT_SEARCH_BY.to_string()),
        args: call.resolve_args(&ctx.query),
    };
    let host = ctx.host.clone();
    let checked_callback = callback.clone();

    let dispatch = tokio::task::spawn_blocking(move || -> Result<Dispatch, diesel::result::Error> {
        if ratelimit.check(&host, &config)? {
            return Ok(Dispatch::RateLimited(error_envelope(version, &RpcError::RateLimited)));
        }

        if checked_callback
            .as_deref()
            .is_some_and(|name| !is_valid_callback(name))
        {
            return Ok(Dispatch::Rejected(error_envelope(version, &RpcError::InvalidCallback)));
        }

        let rpc = Rpc::new(database.as_ref(), &config);
        Ok(Dispatch::Handled(rpc.handle(&request)?))
    })
    .await?
    .map_err(|e| {
        error!("RPC request failed: {}", e);
        ApiError::from(e)
    })?;

    match dispatch {
        Dispatch::RateLimited(value) => RpcResponse::json(Status::TooManyRequests, &value),
        Dispatch::Rejected(value) => RpcResponse::json(Status::Ok, &value),
        Dispatch::Handled(value) => {
            RpcResponse::tagged(&value, ctx.if_none_match.as_deref(), callback.as_deref())
        }
    }
}

fn bad_request(version: Option<i64>, err: RpcError) -> Result<RpcResponse, ApiError> {
    RpcResponse::json(Status::BadRequest, &error_envelope(version, &err))
}

async fn legacy(state: &AppState, ctx: RpcContext, pairs: &[(String, String)]) -> Result<RpcResponse, ApiError> {
    match RpcCall::from_pairs(pairs) {
        Ok(call) => execute(state, ctx, call).await,
        Err(err) => bad_request(None, err),
    }
}

#[get("/rpc")]
pub async fn rpc_get(state: &State<AppState>, ctx: RpcContext) -> Result<RpcResponse, ApiError> {
    if ctx.query.is_empty() {
        return Ok(RpcResponse::documentation());
    }
    let pairs = ctx.query.clone();
    legacy(state.inner(), ctx, &pairs).await
}

#[post("/rpc", data = "<body>")]
pub async fn rpc_post(
    state: &State<AppState>,
    ctx: RpcContext,
    body: String,
) -> Result<RpcResponse, ApiError> {
    let pairs = decode_pairs(&body);
    legacy(state.inner(), ctx, &pairs).await
}

#[get("/rpc/<version>/info/<name>")]
pub async fn openapi_info(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    name: &str,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };
    let mut call = RpcCall::new(version, "info");
    call.arg = Some(name.to_string());
    execute(state.inner(), ctx, call).await
}

#[get("/rpc/<version>/info")]
pub async fn openapi_multiinfo(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };
    execute(state.inner(), ctx, RpcCall::new(version, "info")).await
}

#[post("/rpc/<version>/info", data = "<body>")]
pub async fn openapi_multiinfo_post(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    body: Json<Value>,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };

    let mut call = RpcCall::new(version, "info");
    match body.get("arg") {
        None => {}
        Some(Value::Array(items)) => {
            call.args = items
                .iter()
                .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                .collect();
        }
        Some(_) => return bad_request(Some(version), RpcError::ArgMustBeArray),
    }
    execute(state.inner(), ctx, call).await
}

#[get("/rpc/<version>/search/<arg>?<by>")]
pub async fn openapi_search_arg(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    arg: &str,
    by: Option<String>,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };
    let mut call = RpcCall::new(version, "search");
    call.arg = Some(arg.to_string());
    call.by = by;
    execute(state.inner(), ctx, call).await
}

#[get("/rpc/<version>/search?<arg>&<by>")]
pub async fn openapi_search(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    arg: Option<String>,
    by: Option<String>,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };
    let mut call = RpcCall::new(version, "search");
    call.arg = arg;
    call.by = by;
    execute(state.inner(), ctx, call).await
}

#[post("/rpc/<version>/search", data = "<body>")]
pub async fn openapi_search_post(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    body: Json<Value>,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };

    let mut call = RpcCall::new(version, "search");
    match body.get("by") {
        None => {}
        Some(Value::String(by)) => call.by = Some(by.clone()),
        Some(_) => return bad_request(Some(version), RpcError::ByMustBeString),
    }
    match body.get("arg") {
        None => {}
        Some(Value::String(arg)) => call.arg = Some(arg.clone()),
        Some(_) => return bad_request(Some(version), RpcError::ArgMustBeString),
    }
    execute(state.inner(), ctx, call).await
}

#[get("/rpc/<version>/suggest/<arg>")]
pub async fn openapi_suggest(
    state: &State<AppState>,
    ctx: RpcContext,
    version: Result<ApiVersion, &str>,
    arg: &str,
) -> Result<RpcResponse, ApiError> {
    let Ok(ApiVersion(version)) = version else {
        return bad_request(None, RpcError::InvalidVersion);
    };
    let mut call = RpcCall::new(version, "suggest");
    call.arg = Some(arg.to_string());
    execute(state.inner(), ctx, call).await
}

/// Requests rejected before reaching a handler still get the error envelope.
fn caught(status: Status, err: RpcError) -> Result<RpcResponse, ApiError> {
    RpcResponse::json(status, &error_envelope(None, &err))
}

#[catch(400)]
pub fn bad_request_catcher() -> Result<RpcResponse, ApiError> {
    caught(Status::BadRequest, RpcError::MalformedRequest)
}

#[catch(404)]
pub fn not_found_catcher() -> Result<RpcResponse, ApiError> {
    caught(Status::NotFound, RpcError::UnknownEndpoint)
}

#[catch(413)]
pub fn payload_too_large_catcher() -> Result<RpcResponse, ApiError> {
    caught(Status::PayloadTooLarge, RpcError::RequestTooLarge)
}

#[catch(422)]
pub fn unprocessable_catcher() -> Result<RpcResponse, ApiError> {
    caught(Status::UnprocessableEntity, RpcError::MalformedRequest)
}
