//! Account-level resources: users, groups, folders, Connect and friends.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Map, Value};

use super::envelopes::custom_field_definition;
use super::{
    delete_one, get_many, get_one, id, item_path, list_all, split_list, unknown, update_body,
    update_one, wire_fields, OperationPlan, PlanContext, RequestEnvelope, ResponseShape,
};
use crate::builders::resolve_document_base64;
use crate::error::{DocuSignError, Result};
use crate::params::{field_bool, field_checked, field_str};
use crate::resources::{Operation, Resource};
use crate::validators::{validate_field, FieldKind};

/// Copy the listed optional keys of `fields` into `body` as strings.
fn copy_optional(body: &mut Map<String, Value>, fields: &Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = field_str(fields, key) {
            body.insert((*key).to_owned(), Value::String(value));
        }
    }
}

/// POST to the collection, emitting whatever rows come back under `keys`.
fn create_many(resource: Resource, body: Value) -> OperationPlan {
    OperationPlan::new(
        RequestEnvelope::post(resource.endpoint(), body),
        ResponseShape::List {
            keys: resource.list_keys(),
            limit: None,
        },
    )
}

/// Bulk-style delete: DocuSign takes the ids in the body of a DELETE on
/// the collection rather than in the path.
fn delete_in_body(resource: Resource, ctx: &PlanContext<'_>, wrapper: &str, id_key: &str) -> Result<OperationPlan> {
    let Some(param) = resource.id_param() else {
        return Err(DocuSignError::validation(format!("{resource} has no identifier")));
    };
    let value = id(ctx, param)?;
    let mut details = Map::new();
    details.insert(param.to_owned(), Value::String(value.clone()));
    Ok(OperationPlan::success(
        RequestEnvelope::delete(resource.endpoint()).body(json!({ wrapper: [{ id_key: value }] })),
        Value::Object(details),
    ))
}

// ---------------------------------------------------------------------------
// accountCustomField
// ---------------------------------------------------------------------------

pub(super) fn custom_field(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::AccountCustomField;
    match operation {
        Operation::Create => {
            let (_, field) = custom_field_definition(ctx)?;
            Ok(OperationPlan::single(RequestEnvelope::post(resource.endpoint(), field)))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// brand
// ---------------------------------------------------------------------------

pub(super) fn brand(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Brand;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("brandName")?;
            let fields = ctx.params.additional_fields();
            let mut body = Map::new();
            body.insert("brandName".to_owned(), Value::String(name));
            copy_optional(&mut body, &fields, &["brandCompany", "defaultBrandLanguage"]);
            for key in ["isSendingDefault", "isSigningDefault"] {
                if let Some(flag) = field_bool(&fields, key) {
                    body.insert(key.to_owned(), Value::Bool(flag));
                }
            }
            Ok(create_many(resource, Value::Object(body)))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// user
// ---------------------------------------------------------------------------

pub(super) fn user(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::User;
    match operation {
        Operation::Create => {
            let email = ctx.params.checked("email", FieldKind::Email)?;
            let user_name = ctx.params.required("userName")?;
            let fields = ctx.params.additional_fields();
            let mut user = Map::new();
            user.insert("email".to_owned(), Value::String(email));
            user.insert("userName".to_owned(), Value::String(user_name));
            copy_optional(
                &mut user,
                &fields,
                &["firstName", "lastName", "title", "company", "permissionProfileId"],
            );
            let groups = split_list(fields.get("groupIds"));
            if !groups.is_empty() {
                let groups: Vec<Value> = groups.into_iter().map(|g| json!({ "groupId": g })).collect();
                user.insert("groupList".to_owned(), Value::Array(groups));
            }
            Ok(OperationPlan::new(
                RequestEnvelope::post(resource.endpoint(), json!({ "newUsers": [user] })),
                ResponseShape::List {
                    keys: &["newUsers"],
                    limit: None,
                },
            ))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => {
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get(resource.endpoint())
                .query_opt("email", field_checked(&filters, "email", FieldKind::Email)?)
                .query_opt("status", field_str(&filters, "status"))
                .query_opt("additional_info", field_bool(&filters, "additionalInfo").map(|b| b.to_string()));
            Ok(get_many(resource, ctx, request))
        }
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_in_body(resource, ctx, "users", "userId"),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// group
// ---------------------------------------------------------------------------

pub(super) fn group(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Group;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("groupName")?;
            let mut group = Map::new();
            group.insert("groupName".to_owned(), Value::String(name));
            copy_optional(&mut group, &ctx.params.additional_fields(), &["description", "permissionProfileId"]);
            Ok(create_many(resource, json!({ "groups": [group] })))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(get_many(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => {
            // Groups are updated in bulk on the collection.
            let group_id = id(ctx, "groupId")?;
            let mut fields = update_body(ctx)?;
            fields.insert("groupId".to_owned(), Value::String(group_id));
            Ok(OperationPlan::new(
                RequestEnvelope::put(resource.endpoint(), json!({ "groups": [fields] })),
                ResponseShape::List {
                    keys: resource.list_keys(),
                    limit: None,
                },
            ))
        }
        Operation::Delete => delete_in_body(resource, ctx, "groups", "groupId"),
        Operation::AddUsers => {
            let (path, _) = item_path(resource, ctx)?;
            let ids = split_list(ctx.params.raw("userIds").as_ref());
            if ids.is_empty() {
                return Err(DocuSignError::validation("userIds is required"));
            }
            let mut users = Vec::with_capacity(ids.len());
            for user_id in ids {
                validate_field(Some(&Value::String(user_id.clone())), FieldKind::Uuid, "userIds")?;
                users.push(json!({ "userId": user_id }));
            }
            Ok(OperationPlan::new(
                RequestEnvelope::put(format!("{path}/users"), json!({ "users": users })),
                ResponseShape::List {
                    keys: &["users"],
                    limit: None,
                },
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// signingGroup
// ---------------------------------------------------------------------------

pub(super) fn signing_group(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::SigningGroup;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("groupName")?;
            let mut members = Vec::new();
            for row in ctx.params.list("members") {
                let Value::Object(row) = row else {
                    return Err(DocuSignError::validation("members must be a list of objects"));
                };
                validate_field(row.get("email"), FieldKind::Email, "email")?;
                let user_name = field_str(&row, "userName")
                    .ok_or_else(|| DocuSignError::validation("userName is required"))?;
                members.push(json!({
                    "email": field_str(&row, "email").unwrap_or_default(),
                    "userName": user_name,
                }));
            }
            let group = json!({
                "groupName": name,
                "groupType": "sharedSigningGroup",
                "users": members,
            });
            Ok(create_many(resource, json!({ "groups": [group] })))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_in_body(resource, ctx, "groups", "signingGroupId"),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// folder
// ---------------------------------------------------------------------------

pub(super) fn folder(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Folder;
    match operation {
        Operation::GetAll => {
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get(resource.endpoint())
                .query_opt("include", field_str(&filters, "include"))
                .query_opt("template", field_str(&filters, "template"));
            Ok(list_all(resource, ctx, request))
        }
        Operation::GetItems => {
            let (path, _) = item_path(resource, ctx)?;
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get(path)
                .query_opt("from_date", field_checked(&filters, "fromDate", FieldKind::IsoDate)?)
                .query_opt("to_date", field_checked(&filters, "toDate", FieldKind::IsoDate)?)
                .query_opt("search_text", field_str(&filters, "searchText"));
            Ok(OperationPlan::new(
                request,
                ResponseShape::Paginated {
                    // Items come back grouped under each folder.
                    keys: &["folders.folderItems"],
                    options: super::pagination_options(ctx),
                },
            ))
        }
        Operation::MoveEnvelope => {
            let (path, folder_id) = item_path(resource, ctx)?;
            let envelope_id = id(ctx, "envelopeId")?;
            Ok(OperationPlan::success(
                RequestEnvelope::put(path, json!({ "envelopeIds": [envelope_id.clone()] })),
                json!({ "folderId": folder_id, "envelopeId": envelope_id }),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// connectConfig
// ---------------------------------------------------------------------------

pub(super) fn connect(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::ConnectConfig;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("name")?;
            let url = ctx.params.checked("urlToPublishTo", FieldKind::Url)?;
            let fields = ctx.params.additional_fields();
            let events = split_list(fields.get("envelopeEvents"));
            let events = if events.is_empty() {
                vec!["completed".to_owned()]
            } else {
                events
            };
            let mut body = Map::new();
            body.insert("name".to_owned(), Value::String(name));
            body.insert("urlToPublishTo".to_owned(), Value::String(url));
            body.insert("configurationType".to_owned(), Value::String("custom".to_owned()));
            body.insert(
                "allUsers".to_owned(),
                Value::String(field_bool(&fields, "allUsers").unwrap_or(true).to_string()),
            );
            body.insert(
                "includeDocuments".to_owned(),
                Value::String(field_bool(&fields, "includeDocuments").unwrap_or(false).to_string()),
            );
            body.insert("envelopeEvents".to_owned(), json!(events));
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                Value::Object(body),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => {
            // Connect configurations are replaced on the collection, keyed by connectId.
            let connect_id = id(ctx, "connectId")?;
            let mut fields = update_body(ctx)?;
            fields.insert("connectId".to_owned(), Value::String(connect_id));
            Ok(OperationPlan::single(RequestEnvelope::put(
                resource.endpoint(),
                Value::Object(fields),
            )))
        }
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// chunkedUpload
// ---------------------------------------------------------------------------

/// Base64 chunk content from the `data` parameter and its decoded size.
fn chunk(ctx: &PlanContext<'_>) -> Result<(String, usize)> {
    let source = ctx.params.required("data")?;
    let data = resolve_document_base64(&source, ctx.binary, ctx.params.index(), "data")?;
    let size = general_purpose::STANDARD
        .decode(&data)
        .map_err(|_| DocuSignError::validation("data must be valid base64"))?
        .len();
    Ok((data, size))
}

pub(super) fn chunked_upload(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::ChunkedUpload;
    match operation {
        Operation::Initiate => {
            let total = ctx.params.raw("totalSize");
            validate_field(total.as_ref(), FieldKind::PositiveNumber, "totalSize")?;
            let total = ctx
                .params
                .string("totalSize")
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or_default();
            let (data, size) = chunk(ctx)?;
            if size as f64 > total {
                return Err(DocuSignError::validation(format!(
                    "data ({size} bytes) exceeds totalSize ({total})"
                )));
            }
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                json!({ "data": data }),
            )))
        }
        Operation::UploadPart => {
            let (path, _) = item_path(resource, ctx)?;
            let part = ctx.params.checked("partSeq", FieldKind::PositiveNumber)?;
            let (data, _) = chunk(ctx)?;
            Ok(OperationPlan::single(RequestEnvelope::put(
                format!("{path}/{part}"),
                json!({ "data": data }),
            )))
        }
        Operation::Commit => {
            let (path, _) = item_path(resource, ctx)?;
            Ok(OperationPlan::single(
                RequestEnvelope::put(path, json!({})).query("action", "commit"),
            ))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// permissionProfile / contact / customTab / workspace
// ---------------------------------------------------------------------------

pub(super) fn permission_profile(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::PermissionProfile;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("permissionProfileName")?;
            let settings = wire_fields(ctx.params.collection("settings"))?;
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                json!({ "permissionProfileName": name, "settings": settings }),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

pub(super) fn contact(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Contact;
    match operation {
        Operation::Create => {
            let email = ctx.params.checked("email", FieldKind::Email)?;
            let name = ctx.params.required("name")?;
            let mut contact = Map::new();
            contact.insert("name".to_owned(), Value::String(name));
            contact.insert("emails".to_owned(), json!([email]));
            copy_optional(&mut contact, &ctx.params.additional_fields(), &["organization"]);
            Ok(create_many(resource, json!({ "contactList": [contact] })))
        }
        Operation::Get => {
            let (path, _) = item_path(resource, ctx)?;
            Ok(list_all(resource, ctx, RequestEnvelope::get(path)))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

pub(super) fn custom_tab(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::CustomTab;
    match operation {
        Operation::Create => {
            let label = ctx.params.required("tabLabel")?;
            let kind = ctx.params.string("type").unwrap_or_else(|| "text".to_owned());
            let mut body = wire_fields(ctx.params.additional_fields())?;
            body.insert("tabLabel".to_owned(), Value::String(label));
            body.insert("type".to_owned(), Value::String(kind));
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                Value::Object(body),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

pub(super) fn workspace(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Workspace;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("workspaceName")?;
            let mut body = Map::new();
            body.insert("workspaceName".to_owned(), Value::String(name));
            copy_optional(&mut body, &ctx.params.additional_fields(), &["workspaceDescription"]);
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                Value::Object(body),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// account / billing
// ---------------------------------------------------------------------------

pub(super) fn account(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Account;
    match operation {
        Operation::Get => Ok(OperationPlan::single(RequestEnvelope::get(""))),
        Operation::GetSettings => Ok(OperationPlan::single(RequestEnvelope::get("settings"))),
        Operation::UpdateSettings => {
            let settings: Vec<Value> = update_body(ctx)?
                .into_iter()
                .map(|(name, value)| json!({ "name": name, "value": value }))
                .collect();
            let details = json!({ "updated": settings.len() });
            Ok(OperationPlan::success(
                RequestEnvelope::put("settings", json!({ "accountSettings": settings })),
                details,
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

pub(super) fn billing(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Billing;
    match operation {
        Operation::GetPlan => Ok(OperationPlan::single(RequestEnvelope::get(resource.endpoint()))),
        Operation::GetInvoices => {
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get("billing_invoices")
                .query_opt("from_date", field_checked(&filters, "fromDate", FieldKind::IsoDate)?)
                .query_opt("to_date", field_checked(&filters, "toDate", FieldKind::IsoDate)?);
            Ok(list_all(resource, ctx, request))
        }
        other => Err(unknown(resource, other)),
    }
}
