//! Request dispatcher.
//!
//! `Dispatcher::execute` is the path every item takes:
//! 1. Routes the (resource, operation) strings through the routing table.
//! 2. Builds an [`OperationPlan`]: every parameter is read and validated
//!    and the request is fully assembled before anything is sent.
//! 3. Sends the request through the host transport (repeatedly, for
//!    paginated listings).
//! 4. Normalises the response into one [`OutputRecord`] per entity.

mod account;
mod envelopes;
mod templates;

use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use nodes::{BinaryHelper, HttpMethod, HttpRequest, HttpTransport, OutputRecord};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::config::{DocuSignCredentials, NodeConfig};
use crate::error::{DocuSignError, Result};
use crate::pagination::{paginate, Page, PaginationOptions};
use crate::params::{scalar_to_string, ItemParams};
use crate::resources::{collection_tag, Operation, Resource};
use crate::validators::{validate_optional, FieldKind};

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// Method, path, query and body of one DocuSign call.  `path` is relative
/// to the account base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path).body(body)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_owned(), value.into()));
        self
    }

    pub fn query_opt(self, name: &str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    fn to_http(&self, base_url: &str) -> HttpRequest {
        let url = if self.path.is_empty() {
            base_url.to_owned()
        } else {
            format!("{base_url}/{}", self.path)
        };
        HttpRequest {
            method: self.method,
            url,
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// How the response of a plan becomes output records.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// The body is the record (an array body yields one record per element).
    Single,
    /// Rows nested under one or more keys, optionally capped.
    List {
        keys: &'static [&'static str],
        limit: Option<usize>,
    },
    /// Like `List`, fetched page by page.
    Paginated {
        keys: &'static [&'static str],
        options: PaginationOptions,
    },
    /// Raw bytes routed through the host's binary helper.
    Binary { file_name: String, mime_type: String },
    /// A body-less success: `{"success": true}` merged with `details`.
    Success(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationPlan {
    pub request: RequestEnvelope,
    pub shape: ResponseShape,
}

impl OperationPlan {
    pub fn new(request: RequestEnvelope, shape: ResponseShape) -> Self {
        Self { request, shape }
    }

    pub fn single(request: RequestEnvelope) -> Self {
        Self::new(request, ResponseShape::Single)
    }

    pub fn success(request: RequestEnvelope, details: Value) -> Self {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(request, ResponseShape::Success(details))
    }
}

/// Inputs available while a plan is built.  Nothing in here performs I/O
/// except reading attachments the host already holds.
pub struct PlanContext<'a> {
    pub params: ItemParams<'a>,
    pub binary: &'a dyn BinaryHelper,
    pub config: &'a NodeConfig,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Resolve the (resource, operation) strings against the routing table.
pub fn route(resource: &str, operation: &str) -> Result<(Resource, Operation)> {
    let unknown = || DocuSignError::UnknownOperation {
        resource: resource.to_owned(),
        operation: operation.to_owned(),
    };
    let r: Resource = resource.parse().map_err(|_| unknown())?;
    let o: Operation = operation.parse().map_err(|_| unknown())?;
    if !r.supports(o) {
        return Err(unknown());
    }
    Ok((r, o))
}

pub(crate) fn unknown(resource: Resource, operation: Operation) -> DocuSignError {
    DocuSignError::UnknownOperation {
        resource: resource.to_string(),
        operation: operation.to_string(),
    }
}

/// Validate every input and assemble the request for one item.
pub fn build_plan(resource: Resource, operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    match resource {
        Resource::Envelope => envelopes::envelope(operation, ctx),
        Resource::Document => envelopes::document(operation, ctx),
        Resource::Recipient => envelopes::recipient(operation, ctx),
        Resource::Tab => envelopes::tab(operation, ctx),
        Resource::EnvelopeCustomField => envelopes::custom_field(operation, ctx),
        Resource::EnvelopeLock => envelopes::lock(operation, ctx),
        Resource::EnvelopeAttachment => envelopes::attachment(operation, ctx),
        Resource::EnvelopeNotification => envelopes::notification(operation, ctx),
        Resource::EnvelopeEmailSetting => envelopes::email_setting(operation, ctx),
        Resource::EnvelopeTransferRule => envelopes::transfer_rule(operation, ctx),
        Resource::Payment => envelopes::payment(operation, ctx),
        Resource::Template => templates::template(operation, ctx),
        Resource::BulkSend => templates::bulk_send(operation, ctx),
        Resource::PowerForm => templates::power_form(operation, ctx),
        Resource::AccountCustomField => account::custom_field(operation, ctx),
        Resource::Brand => account::brand(operation, ctx),
        Resource::User => account::user(operation, ctx),
        Resource::Group => account::group(operation, ctx),
        Resource::SigningGroup => account::signing_group(operation, ctx),
        Resource::Folder => account::folder(operation, ctx),
        Resource::ConnectConfig => account::connect(operation, ctx),
        Resource::ChunkedUpload => account::chunked_upload(operation, ctx),
        Resource::PermissionProfile => account::permission_profile(operation, ctx),
        Resource::Contact => account::contact(operation, ctx),
        Resource::CustomTab => account::custom_tab(operation, ctx),
        Resource::Workspace => account::workspace(operation, ctx),
        Resource::Account => account::account(operation, ctx),
        Resource::Billing => account::billing(operation, ctx),
    }
}

// ---------------------------------------------------------------------------
// Plan helpers shared by the resource modules
// ---------------------------------------------------------------------------

/// Identifier parameters DocuSign issues as GUIDs.
fn id_kind(param: &str) -> Option<FieldKind> {
    match param {
        "envelopeId" | "templateId" | "brandId" | "userId" | "bulkSendListId" | "powerFormId"
        | "chunkedUploadId" | "workspaceId" | "envelopeTransferRuleId" => Some(FieldKind::Uuid),
        _ => None,
    }
}

/// Read and validate an identifier parameter.
pub(crate) fn id(ctx: &PlanContext<'_>, param: &str) -> Result<String> {
    match id_kind(param) {
        Some(kind) => ctx.params.checked(param, kind),
        None => ctx.params.required(param),
    }
}

/// The resource's collection path with `{envelopeId}`/`{recipientId}` filled in.
pub(crate) fn collection_path(resource: Resource, ctx: &PlanContext<'_>) -> Result<String> {
    let mut path = resource.endpoint().to_owned();
    for placeholder in ["envelopeId", "recipientId"] {
        let token = format!("{{{placeholder}}}");
        if path.contains(&token) {
            path = path.replace(&token, &id(ctx, placeholder)?);
        }
    }
    Ok(path)
}

/// The parent identifiers a resource path is scoped by, for success records.
pub(crate) fn scope_ids(resource: Resource, ctx: &PlanContext<'_>) -> Map<String, Value> {
    let mut ids = Map::new();
    for placeholder in ["envelopeId", "recipientId"] {
        if resource.endpoint().contains(&format!("{{{placeholder}}}")) {
            if let Some(value) = ctx.params.string(placeholder) {
                ids.insert(placeholder.to_owned(), Value::String(value));
            }
        }
    }
    ids
}

/// `collection/{id}` for resources addressed by id; returns the id too.
pub(crate) fn item_path(resource: Resource, ctx: &PlanContext<'_>) -> Result<(String, String)> {
    let collection = collection_path(resource, ctx)?;
    match resource.id_param() {
        Some(param) => {
            let value = id(ctx, param)?;
            Ok((format!("{collection}/{value}"), value))
        }
        None => Ok((collection, String::new())),
    }
}

pub(crate) fn get_one(resource: Resource, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let (path, _) = item_path(resource, ctx)?;
    Ok(OperationPlan::single(RequestEnvelope::get(path)))
}

pub(crate) fn delete_one(resource: Resource, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let (path, value) = item_path(resource, ctx)?;
    let mut details = scope_ids(resource, ctx);
    if let Some(param) = resource.id_param() {
        details.insert(param.to_owned(), Value::String(value));
    }
    Ok(OperationPlan::success(
        RequestEnvelope::delete(path),
        Value::Object(details),
    ))
}

/// PUT `collection/{id}` with the validated `updateFields`.
pub(crate) fn update_one(resource: Resource, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let (path, _) = item_path(resource, ctx)?;
    let fields = update_body(ctx)?;
    Ok(OperationPlan::single(RequestEnvelope::put(path, Value::Object(fields))))
}

/// `returnAll`/`limit` plus the node's page size and time budget.
pub(crate) fn pagination_options(ctx: &PlanContext<'_>) -> PaginationOptions {
    PaginationOptions {
        return_all: ctx.params.boolean("returnAll", false),
        limit: ctx.params.usize_or("limit", 50),
        page_size: ctx.config.page_size,
        timeout: ctx.config.pagination_timeout,
    }
}

pub(crate) fn list_limit(ctx: &PlanContext<'_>) -> Option<usize> {
    if ctx.params.boolean("returnAll", false) {
        None
    } else {
        Some(ctx.params.usize_or("limit", 50))
    }
}

pub(crate) fn get_many(resource: Resource, ctx: &PlanContext<'_>, request: RequestEnvelope) -> OperationPlan {
    OperationPlan::new(
        request,
        ResponseShape::Paginated {
            keys: resource.list_keys(),
            options: pagination_options(ctx),
        },
    )
}

pub(crate) fn list_all(resource: Resource, ctx: &PlanContext<'_>, request: RequestEnvelope) -> OperationPlan {
    OperationPlan::new(
        request,
        ResponseShape::List {
            keys: resource.list_keys(),
            limit: list_limit(ctx),
        },
    )
}

/// Constraint implied by a field's name, for free-form field collections.
fn implied_kind(key: &str) -> Option<FieldKind> {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with("email") || lower.ends_with("emailaddress") {
        Some(FieldKind::Email)
    } else if lower.ends_with("url") || lower == "urltopublishto" {
        Some(FieldKind::Url)
    } else if lower.ends_with("date") || lower.ends_with("datetime") {
        Some(FieldKind::IsoDate)
    } else {
        None
    }
}

/// Validate the string values of a free-form collection by field name and
/// render scalars as strings, the way DocuSign types them on the wire.
pub(crate) fn wire_fields(fields: Map<String, Value>) -> Result<Map<String, Value>> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        if let (Some(kind), Value::String(_)) = (implied_kind(&key), &value) {
            validate_optional(Some(&value), kind, &key)?;
        }
        let value = if value.is_array() || value.is_object() {
            value
        } else {
            match scalar_to_string(&value) {
                Some(s) => Value::String(s),
                None => continue,
            }
        };
        out.insert(key, value);
    }
    Ok(out)
}

/// The non-empty, validated `updateFields` ready for a request body.
pub(crate) fn update_body(ctx: &PlanContext<'_>) -> Result<Map<String, Value>> {
    let fields = wire_fields(ctx.params.update_fields()?)?;
    if fields.is_empty() {
        return Err(DocuSignError::validation(
            "At least one update field must be provided",
        ));
    }
    Ok(fields)
}

/// A list given either as an array or as a comma-separated string.
pub(crate) fn split_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// A whole number of days (or seconds) in a collection parameter.
pub(crate) fn field_u32(fields: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    match crate::params::field_str(fields, key) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DocuSignError::validation(format!("{key} must be a whole number"))),
    }
}

/// `fromDate` filter, or thirty days ago.  Envelope listings require one.
pub(crate) fn from_date(filters: &Map<String, Value>) -> Result<String> {
    validate_optional(filters.get("fromDate"), FieldKind::IsoDate, "fromDate")?;
    Ok(crate::params::field_str(filters, "fromDate").unwrap_or_else(|| {
        (Utc::now() - ChronoDuration::days(30)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }))
}

// ---------------------------------------------------------------------------
// Response normalisation
// ---------------------------------------------------------------------------

/// Flatten a list response into rows.
///
/// Rows from typed sub-collections (`signers`, `textCustomFields`, ...) are
/// tagged with the collection they came from so every row has the same
/// shape regardless of origin.  A dotted key (`folders.folderItems`) reads
/// the inner array of every element of the outer one.
pub fn flatten_list(body: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = body {
        return items.clone();
    }
    let mut rows = Vec::new();
    for key in keys {
        let (items, key) = match key.split_once('.') {
            Some((outer, inner)) => (nested_rows(body, outer, inner), inner),
            None => match body.get(*key) {
                Some(Value::Array(items)) => (items.clone(), *key),
                _ => continue,
            },
        };
        let tag = collection_tag(key);
        for mut item in items {
            if let (Some((field, value)), Value::Object(map)) = (&tag, &mut item) {
                map.entry(field.to_string())
                    .or_insert_with(|| Value::String(value.clone()));
            }
            rows.push(item);
        }
    }
    rows
}

fn nested_rows(body: &Value, outer: &str, inner: &str) -> Vec<Value> {
    let Some(Value::Array(groups)) = body.get(outer) else {
        return Vec::new();
    };
    groups
        .iter()
        .filter_map(|group| group.get(inner)?.as_array())
        .flatten()
        .cloned()
        .collect()
}

/// `totalSetSize` as DocuSign reports it (string or number).  Folder item
/// listings report `totalRows` instead.
fn total_set_size(body: &Value) -> Option<usize> {
    let total = body.get("totalSetSize").or_else(|| body.get("totalRows"))?;
    match total {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn single_records(body: Value, item_index: usize) -> Vec<OutputRecord> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|v| OutputRecord::new(v, item_index))
            .collect(),
        other => vec![OutputRecord::new(other, item_index)],
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Executes plans against one account through the host's transport.
pub struct Dispatcher<'a> {
    base_url: String,
    transport: &'a dyn HttpTransport,
    binary: &'a dyn BinaryHelper,
    config: &'a NodeConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        credentials: &DocuSignCredentials,
        transport: &'a dyn HttpTransport,
        binary: &'a dyn BinaryHelper,
        config: &'a NodeConfig,
    ) -> Self {
        Self {
            base_url: credentials.account_base_url(),
            transport,
            binary,
            config,
        }
    }

    /// Run one item: route, validate and build, send, normalise.
    ///
    /// # Errors
    /// Routing and validation errors are returned before any request is
    /// sent; transport errors are returned unchanged.
    #[instrument(skip(self, params), fields(item = params.index()))]
    pub async fn execute(
        &self,
        resource: &str,
        operation: &str,
        params: ItemParams<'_>,
    ) -> Result<Vec<OutputRecord>> {
        let (resource, operation) = route(resource, operation)?;
        let ctx = PlanContext {
            params,
            binary: self.binary,
            config: self.config,
        };
        let plan = build_plan(resource, operation, &ctx)?;
        self.run(plan, params.index()).await
    }

    /// Send a plan and normalise its response.
    pub async fn run(&self, plan: OperationPlan, item_index: usize) -> Result<Vec<OutputRecord>> {
        let OperationPlan { request, shape } = plan;

        match shape {
            ResponseShape::Paginated { keys, options } => {
                let rows = paginate(|offset, count| self.fetch_page(&request, keys, offset, count), &options).await?;
                Ok(rows
                    .into_iter()
                    .map(|row| OutputRecord::new(row, item_index))
                    .collect())
            }
            ResponseShape::List { keys, limit } => {
                let body = self.send(&request).await?.json()?;
                let mut rows = flatten_list(&body, keys);
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }
                Ok(rows
                    .into_iter()
                    .map(|row| OutputRecord::new(row, item_index))
                    .collect())
            }
            ResponseShape::Single => {
                let body = self.send(&request).await?.json()?;
                Ok(single_records(body, item_index))
            }
            ResponseShape::Binary { file_name, mime_type } => {
                let response = self.send(&request).await?;
                let binary = self.binary.prepare_binary(&response.body, &file_name, &mime_type);
                let json = json!({
                    "fileName": file_name,
                    "mimeType": mime_type,
                    "fileSize": response.body.len(),
                });
                Ok(vec![OutputRecord::new(json, item_index).with_binary(binary)])
            }
            ResponseShape::Success(details) => {
                self.send(&request).await?;
                let mut json = Map::new();
                json.insert("success".to_owned(), Value::Bool(true));
                json.extend(details);
                Ok(vec![OutputRecord::new(Value::Object(json), item_index)])
            }
        }
    }

    async fn send(&self, request: &RequestEnvelope) -> Result<nodes::HttpResponse> {
        debug!(method = %request.method, path = %request.path, "calling DocuSign");
        Ok(self.transport.request(request.to_http(&self.base_url)).await?)
    }

    async fn fetch_page(
        &self,
        request: &RequestEnvelope,
        keys: &[&str],
        offset: usize,
        count: usize,
    ) -> Result<Page> {
        let page_request = request
            .clone()
            .query("start_position", offset.to_string())
            .query("count", count.to_string());
        let body = self.send(&page_request).await?.json()?;
        Ok(Page {
            items: flatten_list(&body, keys),
            total_available: total_set_size(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_accepts_known_pairs_only() {
        assert_eq!(
            route("envelope", "void").unwrap(),
            (Resource::Envelope, Operation::Void)
        );

        for (r, o) in [("envelope", "explode"), ("spaceship", "get"), ("brand", "update")] {
            let err = route(r, o).unwrap_err();
            assert_eq!(err.to_string(), format!("Unknown operation {o} for resource {r}"));
        }
    }

    #[test]
    fn flatten_tags_typed_sub_collections() {
        let body = json!({
            "signers": [{ "recipientId": "1" }],
            "carbonCopies": [{ "recipientId": "2" }, { "recipientId": "3" }],
            "recipientCount": "3",
        });
        let rows = flatten_list(&body, crate::resources::RECIPIENT_KEYS);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["recipientType"], "signer");
        assert_eq!(rows[2]["recipientType"], "carbonCopy");
        assert_eq!(rows[2]["recipientId"], "3");
    }

    #[test]
    fn flatten_custom_fields() {
        let body = json!({
            "textCustomFields": [{ "fieldId": "1", "name": "PO" }],
            "listCustomFields": [{ "fieldId": "2", "name": "Dept", "listItems": ["a", "b"] }],
        });
        let rows = flatten_list(&body, crate::resources::CUSTOM_FIELD_KEYS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["fieldType"], "text");
        assert_eq!(rows[1]["fieldType"], "list");
    }

    #[test]
    fn flatten_plain_collections_and_missing_keys() {
        assert_eq!(flatten_list(&json!({ "brands": [{}, {}] }), &["brands"]).len(), 2);
        assert!(flatten_list(&json!({ "resultSetSize": "0" }), &["envelopes"]).is_empty());
        assert_eq!(flatten_list(&json!([1, 2, 3]), &["x"]).len(), 3);
    }

    #[test]
    fn flatten_nested_folder_items() {
        let body = json!({
            "folders": [
                { "folderId": "f1", "folderItems": [{ "envelopeId": "a" }, { "envelopeId": "b" }] },
                { "folderId": "f2" },
                { "folderId": "f3", "folderItems": [{ "envelopeId": "c" }] },
            ],
            "totalRows": "3",
        });
        let rows = flatten_list(&body, &["folders.folderItems"]);
        let ids: Vec<&str> = rows.iter().map(|r| r["envelopeId"].as_str().unwrap()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(total_set_size(&body), Some(3));
        assert!(flatten_list(&json!({ "folderItems": [{}] }), &["folders.folderItems"]).is_empty());
    }

    #[test]
    fn total_set_size_accepts_strings() {
        assert_eq!(total_set_size(&json!({ "totalSetSize": "25" })), Some(25));
        assert_eq!(total_set_size(&json!({ "totalSetSize": 7 })), Some(7));
        assert_eq!(total_set_size(&json!({})), None);
    }

    #[test]
    fn wire_fields_stringify_and_validate() {
        let fields = json!({ "routingOrder": 3, "enabled": true, "name": " X ", "skip": null })
            .as_object()
            .cloned()
            .unwrap();
        let out = wire_fields(fields).unwrap();
        assert_eq!(out["routingOrder"], "3");
        assert_eq!(out["enabled"], "true");
        assert_eq!(out["name"], "X");
        assert!(!out.contains_key("skip"));

        let bad = json!({ "email": "nope" }).as_object().cloned().unwrap();
        assert_eq!(wire_fields(bad).unwrap_err().to_string(), "email must be a valid email");

        let ssrf = json!({ "urlToPublishTo": "http://127.0.0.1/hook" }).as_object().cloned().unwrap();
        assert!(wire_fields(ssrf).unwrap_err().to_string().contains("must be a valid URL"));
    }

    #[test]
    fn request_envelope_joins_base_url() {
        let req = RequestEnvelope::get("envelopes/abc").query("include", "recipients");
        let http = req.to_http("https://demo.docusign.net/restapi/v2.1/accounts/1");
        assert_eq!(http.url, "https://demo.docusign.net/restapi/v2.1/accounts/1/envelopes/abc");
        assert_eq!(http.query_param("include"), Some("recipients"));

        let root = RequestEnvelope::get("").to_http("https://x/accounts/1");
        assert_eq!(root.url, "https://x/accounts/1");
    }
}
