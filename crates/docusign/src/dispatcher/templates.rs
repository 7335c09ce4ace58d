//! Templates and the features built on them: bulk send lists and PowerForms.

use serde_json::{json, Map, Value};

use super::{
    delete_one, get_many, get_one, item_path, list_all, unknown, update_one, OperationPlan,
    PlanContext, RequestEnvelope,
};
use crate::builders::{build_document, build_sign_here_tab, resolve_document_base64, Tabs};
use crate::error::{DocuSignError, Result};
use crate::params::{field_bool, field_checked, field_str};
use crate::resources::{Operation, Resource};
use crate::validators::{validate_field, FieldKind};

// ---------------------------------------------------------------------------
// template
// ---------------------------------------------------------------------------

pub(super) fn template(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Template;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("name")?;
            let source = ctx.params.required("document")?;
            let document_name = ctx.params.required("documentName")?;
            let fields = ctx.params.additional_fields();

            let content = resolve_document_base64(&source, ctx.binary, ctx.params.index(), "document")?;
            let document_id = field_str(&fields, "documentId").unwrap_or_else(|| "1".to_owned());
            let document = build_document(
                &content,
                &document_id,
                &document_name,
                field_str(&fields, "fileExtension").as_deref(),
            )
            .require_extension()?;

            let tabs = Tabs {
                sign_here_tabs: vec![build_sign_here_tab(
                    &document_id,
                    field_str(&fields, "pageNumber").as_deref().unwrap_or("1"),
                    field_str(&fields, "xPosition").as_deref(),
                    field_str(&fields, "yPosition").as_deref(),
                    field_str(&fields, "anchorString").as_deref(),
                )],
                ..Default::default()
            };
            // Template signers are placeholders filled by role at send time.
            let role = json!({
                "roleName": field_str(&fields, "roleName").unwrap_or_else(|| "Signer".to_owned()),
                "recipientId": "1",
                "routingOrder": "1",
                "tabs": tabs,
            });

            let mut body = Map::new();
            body.insert("name".to_owned(), Value::String(name));
            for key in ["description", "emailSubject", "emailBlurb"] {
                if let Some(value) = field_str(&fields, key) {
                    body.insert(key.to_owned(), Value::String(value));
                }
            }
            if let Some(shared) = field_bool(&fields, "shared") {
                body.insert("shared".to_owned(), Value::String(shared.to_string()));
            }
            body.insert("documents".to_owned(), json!([document]));
            body.insert("recipients".to_owned(), json!({ "signers": [role] }));
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                Value::Object(body),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => {
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get(resource.endpoint())
                .query_opt("search_text", field_str(&filters, "searchText"))
                .query_opt("folder_ids", field_str(&filters, "folderIds"))
                .query_opt(
                    "from_date",
                    field_checked(&filters, "fromDate", FieldKind::IsoDate)?,
                );
            Ok(get_many(resource, ctx, request))
        }
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// bulkSend
// ---------------------------------------------------------------------------

/// One bulk copy per row of the `recipients` list parameter.
fn bulk_copies(ctx: &PlanContext<'_>) -> Result<Vec<Value>> {
    let rows = ctx.params.list("recipients");
    if rows.is_empty() {
        return Err(DocuSignError::validation("recipients is required"));
    }
    let mut copies = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Object(row) = row else {
            return Err(DocuSignError::validation(
                "recipients must be a list of objects",
            ));
        };
        validate_field(row.get("email"), FieldKind::Email, "email")?;
        let email = field_str(&row, "email").unwrap_or_default();
        let name = field_str(&row, "name")
            .ok_or_else(|| DocuSignError::validation("name is required"))?;
        let role = field_str(&row, "roleName").unwrap_or_else(|| "Signer".to_owned());
        copies.push(json!({
            "recipients": [{ "email": email, "name": name, "roleName": role }],
        }));
    }
    Ok(copies)
}

pub(super) fn bulk_send(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::BulkSend;
    match operation {
        Operation::Create => {
            let name = ctx.params.required("listName")?;
            let copies = bulk_copies(ctx)?;
            Ok(OperationPlan::single(RequestEnvelope::post(
                resource.endpoint(),
                json!({ "name": name, "bulkCopies": copies }),
            )))
        }
        Operation::Get => get_one(resource, ctx),
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        Operation::Send => {
            let (path, list_id) = item_path(resource, ctx)?;
            let source = ctx.params.checked("envelopeOrTemplateId", FieldKind::Uuid)?;
            let fields = ctx.params.additional_fields();
            let mut body = Map::new();
            body.insert("listId".to_owned(), Value::String(list_id));
            body.insert("envelopeOrTemplateId".to_owned(), Value::String(source));
            if let Some(batch) = field_str(&fields, "batchName") {
                body.insert("batchName".to_owned(), Value::String(batch));
            }
            Ok(OperationPlan::single(RequestEnvelope::post(
                format!("{path}/send"),
                Value::Object(body),
            )))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// powerForm
// ---------------------------------------------------------------------------

pub(super) fn power_form(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::PowerForm;
    match operation {
        Operation::Create => {
            let template_id = ctx.params.checked("templateId", FieldKind::Uuid)?;
            let name = ctx.params.required("name")?;
            let fields = ctx.params.additional_fields();

            let mut body = Map::new();
            body.insert("templateId".to_owned(), Value::String(template_id));
            body.insert("name".to_owned(), Value::String(name));
            body.insert(
                "signingMode".to_owned(),
                Value::String(field_str(&fields, "signingMode").unwrap_or_else(|| "email".to_owned())),
            );
            for key in ["emailSubject", "emailBody", "instructions"] {
                if let Some(value) = field_str(&fields, key) {
                    body.insert(key.to_owned(), Value::String(value));
                }
            }
            if let Some(max_use) = fields.get("maxUse") {
                validate_field(Some(max_use), FieldKind::PositiveNumber, "maxUse")?;
                body.insert("maxUseEnabled".to_owned(), Value::String("true".to_owned()));
                body.insert(
                    "maxUse".to_owned(),
                    Value::String(field_str(&fields, "maxUse").unwrap_or_default()),
                );
            }
            if let Some(active) = field_bool(&fields, "isActive") {
                body.insert("isActive".to_owned(), Value::String(active.to_string()));
            }
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
