//! The RPC query engine: request validation, dispatch per request type and
//! assembly of the response document.

pub mod args;
pub mod assembler;
pub mod extra_info;
pub mod query;
pub mod store;
pub mod types;

use crate::config::AppConfig;
use crate::error::{HandleError, RpcError};
use crate::models::PackageRow;
use assembler::{envelope, error_envelope, info_json, search_json};
use extra_info::load_extra_info;
use log::debug;
use query::{PackageQuery, Predicate};
use serde_json::Value;
use std::collections::BTreeSet;
use store::PackageStore;
use types::{DEFAULT_SEARCH_BY, RequestType, SUGGESTION_LIMIT, SUPPORTED_VERSIONS, SearchBy};

pub use args::{is_valid_callback, parse_legacy_args};
pub use assembler::{etag, to_canonical_json};

/// One decoded RPC call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub version: Option<i64>,
    pub request_type: Option<String>,
    pub by: String,
    pub args: Vec<String>,
}

impl RpcRequest {
    pub fn new(version: Option<i64>, request_type: Option<&str>) -> Self {
        Self {
            version,
            request_type: request_type.map(str::to_string),
            by: DEFAULT_SEARCH_BY.to_string(),
            args: Vec::new(),
        }
    }

    pub fn by(mut self, by: &str) -> Self {
        self.by = by.to_string();
        self
    }

    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

enum Output {
    Packages(Vec<Value>),
    Names(Vec<String>),
}

/// Executes requests against a store with one configuration snapshot.
pub struct Rpc<'a, S: PackageStore + ?Sized> {
    store: &'a S,
    config: &'a AppConfig,
}

impl<'a, S: PackageStore + ?Sized> Rpc<'a, S> {
    pub fn new(store: &'a S, config: &'a AppConfig) -> Self {
        Self { store, config }
    }

    /// Handles `request`. Protocol errors are rendered into the error
    /// envelope; only storage failures are returned as `Err`.
    pub fn handle(&self, request: &RpcRequest) -> Result<Value, diesel::result::Error> {
        self.handle_at(request, chrono::Utc::now().timestamp())
    }

    /// [`Rpc::handle`] with an explicit clock, in unix seconds.
    pub fn handle_at(
        &self,
        request: &RpcRequest,
        now: i64,
    ) -> Result<Value, diesel::result::Error> {
        let (request_type, by) = match validate(request) {
            Ok(validated) => validated,
            Err(err) => return Ok(error_envelope(request.version, &err)),
        };

        let outcome = match request_type {
            RequestType::MultiInfo => self.multiinfo(&request.args, now),
            RequestType::Search => self.search(by, &request.args, now),
            RequestType::MSearch => self.search(SearchBy::Maintainer, &request.args, now),
            RequestType::Suggest => self.suggest(&request.args, false),
            RequestType::SuggestPkgbase => self.suggest(&request.args, true),
        };

        match outcome {
            Ok(Output::Packages(results)) => {
                Ok(envelope(request.version, request_type.name(), results))
            }
            Ok(Output::Names(names)) => Ok(Value::from(names)),
            Err(HandleError::Rpc(err)) => Ok(error_envelope(request.version, &err)),
            Err(HandleError::Database(err)) => Err(err),
        }
    }

    fn max_results(&self) -> i64 {
        self.config.max_rpc_results
    }

    fn fetch_capped(&self, query: PackageQuery) -> Result<Vec<PackageRow>, HandleError> {
        let rows = self.store.packages(&query.limit(self.max_results().saturating_add(1)))?;
        if rows.len() as i64 > self.max_results() {
            return Err(RpcError::TooManyResults.into());
        }
        Ok(rows)
    }

    fn multiinfo(&self, args: &[String], now: i64) -> Result<Output, HandleError> {
        if args.is_empty() {
            return Err(RpcError::NoRequestData.into());
        }

        let names: BTreeSet<String> = args.iter().cloned().collect();
        let rows = self.fetch_capped(PackageQuery::new().filter(Predicate::NameIn(names)))?;

        let ids: BTreeSet<i32> = rows.iter().map(|row| row.id).collect();
        let extra = load_extra_info(self.store, &ids)?;

        Ok(Output::Packages(
            rows.iter()
                .map(|row| info_json(row, &extra, self.config, now))
                .collect(),
        ))
    }

    fn search(&self, by: SearchBy, args: &[String], now: i64) -> Result<Output, HandleError> {
        let orphans_allowed = by == SearchBy::Maintainer;
        if !orphans_allowed && args.is_empty() {
            return Err(RpcError::NoRequestData.into());
        }

        let arg = args.first().map(String::as_str).unwrap_or_default();
        if !orphans_allowed && arg.chars().count() < 2 {
            return Err(RpcError::ArgTooSmall.into());
        }

        debug!("Searching by {} for {:?}", by.code(), arg);
        let rows = self.fetch_capped(by.query(arg))?;

        Ok(Output::Packages(
            rows.iter()
                .map(|row| search_json(row, self.config, now))
                .collect(),
        ))
    }

    fn suggest(&self, args: &[String], package_bases: bool) -> Result<Output, HandleError> {
        let Some(prefix) = args.first() else {
            return Ok(Output::Names(Vec::new()));
        };

        let names = if package_bases {
            self.store
                .package_base_names_with_prefix(prefix, SUGGESTION_LIMIT)?
        } else {
            self.store.package_names_with_prefix(prefix, SUGGESTION_LIMIT)?
        };
        Ok(Output::Names(names))
    }
}

/// Checks version, `by` and type, in that order.
fn validate(request: &RpcRequest) -> Result<(RequestType, SearchBy), RpcError> {
    let version = request.version.ok_or(RpcError::MissingVersion)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(RpcError::InvalidVersion);
    }

    let by = SearchBy::parse(&request.by).ok_or(RpcError::InvalidBy)?;

    let raw_type = request
        .request_type
        .as_deref()
        .ok_or(RpcError::NoRequestData)?;
    let request_type = RequestType::parse(raw_type).ok_or(RpcError::InvalidType)?;

    Ok((request_type, by))
}
