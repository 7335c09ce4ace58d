//! Envelopes and everything scoped to one envelope.

use serde_json::{json, Map, Value};

use super::{
    collection_path, delete_one, field_u32, from_date, get_many, id, item_path, list_all,
    scope_ids, split_list, unknown, update_body, update_one, OperationPlan, PlanContext,
    RequestEnvelope, ResponseShape,
};
use crate::builders::{
    build_carbon_copy, build_certified_delivery, build_checkbox_tab, build_date_signed_tab,
    build_document, build_event_notification, build_in_person_signer, build_initial_here_tab,
    build_notification, build_payment_details, build_payment_tab, build_sign_here_tab, build_signer,
    build_template_role, build_text_tab, get_file_extension, mime_type_for_extension, resolve_document_base64, Document,
    Recipients, TabPlacement, Tabs, Tab,
};
use crate::error::{DocuSignError, Result};
use crate::params::{field_bool, field_checked, field_str};
use crate::resources::{Operation, Resource};
use crate::validators::{validate_field, FieldKind};

const ENVELOPE_STATUSES: &[&str] = &["sent", "created"];

// ---------------------------------------------------------------------------
// Shared envelope definition pieces
// ---------------------------------------------------------------------------

fn placement(fields: &Map<String, Value>, document_id: &str) -> TabPlacement {
    TabPlacement {
        document_id: document_id.to_owned(),
        page_number: field_str(fields, "pageNumber"),
        x_position: field_str(fields, "xPosition"),
        y_position: field_str(fields, "yPosition"),
        anchor_string: field_str(fields, "anchorString"),
    }
}

/// `document` (base64 or binary property) plus `documentName`, with the
/// optional `documentId`/`fileExtension` from `fields`.
fn document_from(ctx: &PlanContext<'_>, fields: &Map<String, Value>, default_id: &str) -> Result<Document> {
    let source = ctx.params.required("document")?;
    let name = ctx.params.required("documentName")?;
    let content = resolve_document_base64(&source, ctx.binary, ctx.params.index(), "document")?;
    let document_id = field_str(fields, "documentId").unwrap_or_else(|| default_id.to_owned());
    build_document(
        &content,
        &document_id,
        &name,
        field_str(fields, "fileExtension").as_deref(),
    )
    .require_extension()
}

fn status(fields: &Map<String, Value>) -> Result<String> {
    let status = field_str(fields, "status").unwrap_or_else(|| "sent".to_owned());
    if !ENVELOPE_STATUSES.contains(&status.as_str()) {
        return Err(DocuSignError::validation(format!(
            "status must be one of: {}",
            ENVELOPE_STATUSES.join(", ")
        )));
    }
    Ok(status)
}

/// Optional `ccEmail`/`ccName` pair; a cc email without a name is rejected.
fn carbon_copy_pair(fields: &Map<String, Value>) -> Result<Option<(String, String)>> {
    let Some(email) = field_checked(fields, "ccEmail", FieldKind::Email)? else {
        return Ok(None);
    };
    let name = field_str(fields, "ccName")
        .ok_or_else(|| DocuSignError::validation("ccName is required when ccEmail is set"))?;
    Ok(Some((email, name)))
}

/// Reminder, expiration and webhook settings shared by envelope creation paths.
fn apply_envelope_options(body: &mut Map<String, Value>, fields: &Map<String, Value>) -> Result<()> {
    if let Some(blurb) = field_str(fields, "emailBlurb") {
        body.insert("emailBlurb".to_owned(), Value::String(blurb));
    }
    if let Some(brand_id) = field_checked(fields, "brandId", FieldKind::Uuid)? {
        body.insert("brandId".to_owned(), Value::String(brand_id));
    }

    let reminders = match (field_u32(fields, "reminderDelay")?, field_u32(fields, "reminderFrequency")?) {
        (None, None) => None,
        (delay, frequency) => Some((delay.unwrap_or(1), frequency.unwrap_or(1))),
    };
    let expirations = match (field_u32(fields, "expireAfter")?, field_u32(fields, "expireWarn")?) {
        (None, None) => None,
        (after, warn) => Some((after.unwrap_or(120), warn.unwrap_or(0))),
    };
    if reminders.is_some() || expirations.is_some() {
        body.insert(
            "notification".to_owned(),
            serde_json::to_value(build_notification(reminders, expirations))?,
        );
    }

    if let Some(url) = field_str(fields, "webhookUrl") {
        let events = split_list(fields.get("webhookEvents"));
        let events: Vec<&str> = events.iter().map(String::as_str).collect();
        body.insert(
            "eventNotification".to_owned(),
            serde_json::to_value(build_event_notification(&url, &events)?)?,
        );
    }
    Ok(())
}

/// A one-signer envelope around a single document.  `extra` may add tabs
/// to the signer (the payment path adds its formula tab).
fn single_signer_envelope(ctx: &PlanContext<'_>, extra: impl FnOnce(&mut Tabs, &str) -> Result<()>) -> Result<Value> {
    let subject = ctx.params.required("emailSubject")?;
    let signer_email = ctx.params.checked("signerEmail", FieldKind::Email)?;
    let signer_name = ctx.params.required("signerName")?;
    let fields = ctx.params.additional_fields();
    let status = status(&fields)?;
    let document = document_from(ctx, &fields, "1")?;

    let place = placement(&fields, &document.document_id);
    let mut tabs = Tabs {
        sign_here_tabs: vec![build_sign_here_tab(
            &document.document_id,
            place.page_number.as_deref().unwrap_or("1"),
            place.x_position.as_deref(),
            place.y_position.as_deref(),
            place.anchor_string.as_deref(),
        )],
        ..Default::default()
    };
    if field_bool(&fields, "addDateSigned") == Some(true) {
        tabs.date_signed_tabs.push(build_date_signed_tab(&place));
    }
    extra(&mut tabs, &document.document_id)?;

    let mut signer = build_signer(
        &signer_email,
        &signer_name,
        "1",
        field_str(&fields, "routingOrder").as_deref(),
        Some(tabs),
    );
    signer.client_user_id = field_str(&fields, "clientUserId");

    let mut recipients = Recipients {
        signers: vec![signer],
        ..Default::default()
    };
    if let Some((email, name)) = carbon_copy_pair(&fields)? {
        recipients
            .carbon_copies
            .push(build_carbon_copy(&email, &name, "2", field_str(&fields, "ccRoutingOrder").as_deref()));
    }

    let mut body = Map::new();
    body.insert("emailSubject".to_owned(), Value::String(subject));
    body.insert("documents".to_owned(), json!([document]));
    body.insert("recipients".to_owned(), serde_json::to_value(recipients)?);
    body.insert("status".to_owned(), Value::String(status));
    apply_envelope_options(&mut body, &fields)?;
    Ok(Value::Object(body))
}

// ---------------------------------------------------------------------------
// envelope
// ---------------------------------------------------------------------------

pub(super) fn envelope(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Envelope;
    match operation {
        Operation::Create => {
            let body = single_signer_envelope(ctx, |_, _| Ok(()))?;
            Ok(OperationPlan::single(RequestEnvelope::post("envelopes", body)))
        }
        Operation::CreateFromTemplate => {
            let template_id = ctx.params.checked("templateId", FieldKind::Uuid)?;
            let email = ctx.params.checked("signerEmail", FieldKind::Email)?;
            let name = ctx.params.required("signerName")?;
            let role = ctx.params.required("roleName")?;
            let fields = ctx.params.additional_fields();
            let status = status(&fields)?;

            let mut signer_role = build_template_role(&email, &name, &role, None);
            signer_role.client_user_id = field_str(&fields, "clientUserId");
            let mut roles = vec![signer_role];
            if let Some((cc_email, cc_name)) = carbon_copy_pair(&fields)? {
                let cc_role = field_str(&fields, "ccRoleName").ok_or_else(|| {
                    DocuSignError::validation("ccRoleName is required when ccEmail is set")
                })?;
                roles.push(build_template_role(&cc_email, &cc_name, &cc_role, None));
            }

            let mut body = Map::new();
            body.insert("templateId".to_owned(), Value::String(template_id));
            body.insert("templateRoles".to_owned(), serde_json::to_value(roles)?);
            body.insert("status".to_owned(), Value::String(status));
            if let Some(subject) = field_str(&fields, "emailSubject") {
                body.insert("emailSubject".to_owned(), Value::String(subject));
            }
            apply_envelope_options(&mut body, &fields)?;
            Ok(OperationPlan::single(RequestEnvelope::post(
                "envelopes",
                Value::Object(body),
            )))
        }
        Operation::Get => {
            let (path, _) = item_path(resource, ctx)?;
            let include = split_list(ctx.params.additional_fields().get("include"));
            let request = RequestEnvelope::get(path)
                .query_opt("include", (!include.is_empty()).then(|| include.join(",")));
            Ok(OperationPlan::single(request))
        }
        Operation::GetAll => {
            let filters = ctx.params.additional_fields();
            let request = RequestEnvelope::get("envelopes")
                .query("from_date", from_date(&filters)?)
                .query_opt("to_date", field_checked(&filters, "toDate", FieldKind::IsoDate)?)
                .query_opt("status", field_str(&filters, "status"))
                .query_opt("search_text", field_str(&filters, "searchText"))
                .query_opt("folder_ids", field_str(&filters, "folderIds"));
            Ok(get_many(resource, ctx, request))
        }
        Operation::Update => update_one(resource, ctx),
        Operation::Send => {
            let (path, _) = item_path(resource, ctx)?;
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ "status": "sent" }),
            )))
        }
        Operation::Resend => {
            let (path, envelope_id) = item_path(resource, ctx)?;
            Ok(OperationPlan::success(
                RequestEnvelope::put(path, json!({})).query("resend_envelope", "true"),
                json!({ "envelopeId": envelope_id }),
            ))
        }
        Operation::Void => {
            let (path, _) = item_path(resource, ctx)?;
            let reason = ctx.params.required("voidedReason")?;
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ "status": "voided", "voidedReason": reason }),
            )))
        }
        Operation::GetAuditEvents => {
            let (path, _) = item_path(resource, ctx)?;
            Ok(OperationPlan::new(
                RequestEnvelope::get(format!("{path}/audit_events")),
                ResponseShape::List {
                    keys: &["auditEvents"],
                    limit: None,
                },
            ))
        }
        Operation::CreateRecipientView => {
            let (path, _) = item_path(resource, ctx)?;
            let return_url = ctx.params.checked("returnUrl", FieldKind::Url)?;
            let email = ctx.params.checked("signerEmail", FieldKind::Email)?;
            let name = ctx.params.required("signerName")?;
            let client_user_id = ctx.params.required("clientUserId")?;
            let method = ctx
                .params
                .string("authenticationMethod")
                .unwrap_or_else(|| "none".to_owned());
            Ok(OperationPlan::single(RequestEnvelope::post(
                format!("{path}/views/recipient"),
                json!({
                    "returnUrl": return_url,
                    "email": email,
                    "userName": name,
                    "clientUserId": client_user_id,
                    "authenticationMethod": method,
                }),
            )))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// document
// ---------------------------------------------------------------------------

pub(super) fn document(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Document;
    match operation {
        Operation::Add => {
            let path = collection_path(resource, ctx)?;
            let document_id = ctx.params.required("documentId")?;
            let mut fields = ctx.params.additional_fields();
            fields.insert("documentId".to_owned(), Value::String(document_id));
            let document = document_from(ctx, &fields, "1")?;
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ "documents": [document] }),
            )))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(collection_path(resource, ctx)?))),
        Operation::Download => {
            let (path, document_id) = item_path(resource, ctx)?;
            let envelope_id = id(ctx, "envelopeId")?;
            let fields = ctx.params.additional_fields();
            let extension = if document_id == "archive" { "zip" } else { "pdf" };
            let file_name = field_str(&fields, "fileName")
                .unwrap_or_else(|| format!("{envelope_id}-{document_id}.{extension}"));
            let mime_type = get_file_extension(&file_name)
                .map(|ext| mime_type_for_extension(&ext))
                .unwrap_or("application/pdf")
                .to_owned();
            let mut request = RequestEnvelope::get(path);
            if field_bool(&fields, "certificate") == Some(true) {
                request = request.query("certificate", "true");
            }
            Ok(OperationPlan::new(
                request,
                ResponseShape::Binary { file_name, mime_type },
            ))
        }
        Operation::Delete => {
            let path = collection_path(resource, ctx)?;
            let document_id = ctx.params.required("documentId")?;
            let mut details = scope_ids(resource, ctx);
            details.insert("documentId".to_owned(), Value::String(document_id.clone()));
            Ok(OperationPlan::success(
                RequestEnvelope::delete(path).body(json!({ "documents": [{ "documentId": document_id }] })),
                Value::Object(details),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// recipient
// ---------------------------------------------------------------------------

/// Wire collection for a `recipientType` parameter (default `signer`).
fn recipient_collection(ctx: &PlanContext<'_>) -> Result<&'static str> {
    let kind = ctx.params.string("recipientType").unwrap_or_else(|| "signer".to_owned());
    match kind.as_str() {
        "signer" => Ok("signers"),
        "carbonCopy" => Ok("carbonCopies"),
        "certifiedDelivery" => Ok("certifiedDeliveries"),
        "inPersonSigner" => Ok("inPersonSigners"),
        _ => Err(DocuSignError::validation(
            "recipientType must be one of: signer, carbonCopy, certifiedDelivery, inPersonSigner",
        )),
    }
}

pub(super) fn recipient(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Recipient;
    match operation {
        Operation::Add => {
            let path = collection_path(resource, ctx)?;
            let collection = recipient_collection(ctx)?;
            let email = ctx.params.checked("email", FieldKind::Email)?;
            let name = ctx.params.required("name")?;
            let recipient_id = ctx.params.required("recipientId")?;
            let fields = ctx.params.additional_fields();
            let routing = field_str(&fields, "routingOrder");

            let tabs = match field_str(&fields, "documentId") {
                Some(document_id) => {
                    let place = placement(&fields, &document_id);
                    Some(Tabs {
                        sign_here_tabs: vec![build_sign_here_tab(
                            &document_id,
                            place.page_number.as_deref().unwrap_or("1"),
                            place.x_position.as_deref(),
                            place.y_position.as_deref(),
                            place.anchor_string.as_deref(),
                        )],
                        ..Default::default()
                    })
                }
                None => None,
            };

            let mut recipients = Recipients::default();
            match collection {
                "signers" => {
                    let mut signer = build_signer(&email, &name, &recipient_id, routing.as_deref(), tabs);
                    signer.client_user_id = field_str(&fields, "clientUserId");
                    recipients.signers.push(signer);
                }
                "carbonCopies" => recipients
                    .carbon_copies
                    .push(build_carbon_copy(&email, &name, &recipient_id, routing.as_deref())),
                "certifiedDeliveries" => recipients
                    .certified_deliveries
                    .push(build_certified_delivery(&email, &name, &recipient_id, routing.as_deref())),
                _ => {
                    let signer_name = field_str(&fields, "signerName").ok_or_else(|| {
                        DocuSignError::validation("signerName is required for in-person signers")
                    })?;
                    recipients.in_person_signers.push(build_in_person_signer(
                        &email,
                        &name,
                        &signer_name,
                        &recipient_id,
                        routing.as_deref(),
                        tabs,
                    ));
                }
            }
            Ok(OperationPlan::single(RequestEnvelope::post(
                path,
                serde_json::to_value(recipients)?,
            )))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(collection_path(resource, ctx)?))),
        Operation::Update => {
            let path = collection_path(resource, ctx)?;
            let collection = recipient_collection(ctx)?;
            let recipient_id = ctx.params.required("recipientId")?;
            let mut fields = update_body(ctx)?;
            fields.insert("recipientId".to_owned(), Value::String(recipient_id));
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ collection: [fields] }),
            )))
        }
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// tab
// ---------------------------------------------------------------------------

fn tab_collection(ctx: &PlanContext<'_>) -> Result<&'static str> {
    let kind = ctx.params.string("tabType").unwrap_or_else(|| "signHere".to_owned());
    match kind.as_str() {
        "signHere" => Ok("signHereTabs"),
        "initialHere" => Ok("initialHereTabs"),
        "dateSigned" => Ok("dateSignedTabs"),
        "text" => Ok("textTabs"),
        "checkbox" => Ok("checkboxTabs"),
        _ => Err(DocuSignError::validation(
            "tabType must be one of: signHere, initialHere, dateSigned, text, checkbox",
        )),
    }
}

pub(super) fn tab(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Tab;
    match operation {
        Operation::Add => {
            let path = collection_path(resource, ctx)?;
            let collection = tab_collection(ctx)?;
            let document_id = ctx.params.required("documentId")?;
            let fields = ctx.params.additional_fields();
            let place = placement(&fields, &document_id);
            let tab: Tab = match collection {
                "initialHereTabs" => build_initial_here_tab(&place),
                "dateSignedTabs" => build_date_signed_tab(&place),
                "textTabs" => build_text_tab(
                    &place,
                    &ctx.params.required("tabLabel")?,
                    field_str(&fields, "value").as_deref(),
                    field_bool(&fields, "required").unwrap_or(false),
                ),
                "checkboxTabs" => build_checkbox_tab(
                    &place,
                    &ctx.params.required("tabLabel")?,
                    field_bool(&fields, "selected").unwrap_or(false),
                ),
                _ => build_sign_here_tab(
                    &document_id,
                    place.page_number.as_deref().unwrap_or("1"),
                    place.x_position.as_deref(),
                    place.y_position.as_deref(),
                    place.anchor_string.as_deref(),
                ),
            };
            Ok(OperationPlan::single(RequestEnvelope::post(
                path,
                json!({ collection: [tab] }),
            )))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(collection_path(resource, ctx)?))),
        Operation::Update => {
            let path = collection_path(resource, ctx)?;
            let collection = tab_collection(ctx)?;
            let tab_id = ctx.params.required("tabId")?;
            let mut fields = update_body(ctx)?;
            fields.insert("tabId".to_owned(), Value::String(tab_id));
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ collection: [fields] }),
            )))
        }
        Operation::Delete => {
            let path = collection_path(resource, ctx)?;
            let collection = tab_collection(ctx)?;
            let tab_id = ctx.params.required("tabId")?;
            let mut details = scope_ids(resource, ctx);
            details.insert("tabId".to_owned(), Value::String(tab_id.clone()));
            Ok(OperationPlan::success(
                RequestEnvelope::delete(path).body(json!({ collection: [{ "tabId": tab_id }] })),
                Value::Object(details),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// custom fields
// ---------------------------------------------------------------------------

/// A text or list custom field from `fieldName`/`fieldType` and options.
/// Returns the wire collection it belongs to and the field object.
pub(super) fn custom_field_definition(ctx: &PlanContext<'_>) -> Result<(&'static str, Value)> {
    let name = ctx.params.required("fieldName")?;
    let kind = ctx.params.string("fieldType").unwrap_or_else(|| "text".to_owned());
    let fields = ctx.params.additional_fields();

    let mut field = Map::new();
    field.insert("name".to_owned(), Value::String(name));
    if let Some(value) = field_str(&fields, "value") {
        field.insert("value".to_owned(), Value::String(value));
    }
    field.insert(
        "required".to_owned(),
        Value::String(field_bool(&fields, "required").unwrap_or(false).to_string()),
    );
    field.insert(
        "show".to_owned(),
        Value::String(field_bool(&fields, "show").unwrap_or(true).to_string()),
    );

    match kind.as_str() {
        "text" => Ok(("textCustomFields", Value::Object(field))),
        "list" => {
            let items = split_list(fields.get("listItems"));
            if items.is_empty() {
                return Err(DocuSignError::validation("listItems is required for list fields"));
            }
            field.insert("listItems".to_owned(), json!(items));
            Ok(("listCustomFields", Value::Object(field)))
        }
        _ => Err(DocuSignError::validation("fieldType must be one of: text, list")),
    }
}

fn custom_field_collection(ctx: &PlanContext<'_>) -> Result<&'static str> {
    match ctx.params.string("fieldType").as_deref() {
        None | Some("text") => Ok("textCustomFields"),
        Some("list") => Ok("listCustomFields"),
        Some(_) => Err(DocuSignError::validation("fieldType must be one of: text, list")),
    }
}

pub(super) fn custom_field(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeCustomField;
    match operation {
        Operation::Create => {
            let path = collection_path(resource, ctx)?;
            let (collection, field) = custom_field_definition(ctx)?;
            Ok(OperationPlan::single(RequestEnvelope::post(
                path,
                json!({ collection: [field] }),
            )))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(collection_path(resource, ctx)?))),
        Operation::Update => {
            let path = collection_path(resource, ctx)?;
            let collection = custom_field_collection(ctx)?;
            let field_id = ctx.params.required("fieldId")?;
            let mut fields = update_body(ctx)?;
            fields.insert("fieldId".to_owned(), Value::String(field_id));
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ collection: [fields] }),
            )))
        }
        Operation::Delete => {
            let path = collection_path(resource, ctx)?;
            let collection = custom_field_collection(ctx)?;
            let field_id = ctx.params.required("fieldId")?;
            let mut details = scope_ids(resource, ctx);
            details.insert("fieldId".to_owned(), Value::String(field_id.clone()));
            Ok(OperationPlan::success(
                RequestEnvelope::delete(path).body(json!({ collection: [{ "fieldId": field_id }] })),
                Value::Object(details),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// envelopeLock
// ---------------------------------------------------------------------------

/// The `X-DocuSign-Edit` header value proving ownership of a lock.
fn lock_header(token: &str, duration: Option<&str>) -> String {
    let mut header = json!({ "LockToken": token });
    if let Some(duration) = duration {
        header["LockDurationInSeconds"] = Value::String(duration.to_owned());
    }
    header.to_string()
}

pub(super) fn lock(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeLock;
    let path = collection_path(resource, ctx)?;
    let fields = ctx.params.additional_fields();
    let duration = field_str(&fields, "lockDurationInSeconds");
    if let Some(value) = fields.get("lockDurationInSeconds") {
        validate_field(Some(value), FieldKind::PositiveNumber, "lockDurationInSeconds")?;
    }

    match operation {
        Operation::Create => {
            let body = json!({
                "lockDurationInSeconds": duration.unwrap_or_else(|| "300".to_owned()),
                "lockedByApp": field_str(&fields, "lockedByApp").unwrap_or_else(|| "workflow".to_owned()),
                "lockType": "edit",
            });
            Ok(OperationPlan::single(RequestEnvelope::post(path, body)))
        }
        Operation::Get => Ok(OperationPlan::single(RequestEnvelope::get(path))),
        Operation::Update => {
            let token = ctx.params.required("lockToken")?;
            let mut body = Map::new();
            if let Some(duration) = &duration {
                body.insert("lockDurationInSeconds".to_owned(), Value::String(duration.clone()));
            }
            if let Some(app) = field_str(&fields, "lockedByApp") {
                body.insert("lockedByApp".to_owned(), Value::String(app));
            }
            if body.is_empty() {
                return Err(DocuSignError::validation(
                    "At least one update field must be provided",
                ));
            }
            Ok(OperationPlan::single(
                RequestEnvelope::put(path, Value::Object(body))
                    .header("X-DocuSign-Edit", lock_header(&token, duration.as_deref())),
            ))
        }
        Operation::Delete => {
            let token = ctx.params.required("lockToken")?;
            Ok(OperationPlan::success(
                RequestEnvelope::delete(path).header("X-DocuSign-Edit", lock_header(&token, None)),
                Value::Object(scope_ids(resource, ctx)),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// envelopeAttachment
// ---------------------------------------------------------------------------

pub(super) fn attachment(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeAttachment;
    match operation {
        Operation::Add => {
            let path = collection_path(resource, ctx)?;
            let name = ctx.params.required("name")?;
            let source = ctx.params.required("data")?;
            let data = resolve_document_base64(&source, ctx.binary, ctx.params.index(), "data")?;
            let fields = ctx.params.additional_fields();

            let mut attachment = Map::new();
            if let Some(attachment_id) = ctx.params.string("attachmentId") {
                attachment.insert("attachmentId".to_owned(), Value::String(attachment_id));
            }
            if let Some(ext) = get_file_extension(&name) {
                attachment.insert("attachmentType".to_owned(), Value::String(ext));
            }
            attachment.insert("name".to_owned(), Value::String(name));
            attachment.insert("data".to_owned(), Value::String(data));
            attachment.insert(
                "accessControl".to_owned(),
                Value::String(
                    field_str(&fields, "accessControl").unwrap_or_else(|| "senderAndAllRecipients".to_owned()),
                ),
            );
            Ok(OperationPlan::single(RequestEnvelope::put(
                path,
                json!({ "attachments": [attachment] }),
            )))
        }
        Operation::GetAll => Ok(list_all(resource, ctx, RequestEnvelope::get(collection_path(resource, ctx)?))),
        Operation::Delete => {
            let path = collection_path(resource, ctx)?;
            let attachment_id = ctx.params.required("attachmentId")?;
            let mut details = scope_ids(resource, ctx);
            details.insert("attachmentId".to_owned(), Value::String(attachment_id.clone()));
            Ok(OperationPlan::success(
                RequestEnvelope::delete(path).body(json!({ "attachments": [{ "attachmentId": attachment_id }] })),
                Value::Object(details),
            ))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// envelopeNotification / envelopeEmailSetting
// ---------------------------------------------------------------------------

pub(super) fn notification(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeNotification;
    let path = collection_path(resource, ctx)?;
    match operation {
        Operation::Get => Ok(OperationPlan::single(RequestEnvelope::get(path))),
        Operation::Update => {
            let fields = ctx.params.update_fields()?;
            let reminders = match (field_u32(&fields, "reminderDelay")?, field_u32(&fields, "reminderFrequency")?) {
                (None, None) => None,
                (delay, frequency) => Some((delay.unwrap_or(1), frequency.unwrap_or(1))),
            };
            let expirations = match (field_u32(&fields, "expireAfter")?, field_u32(&fields, "expireWarn")?) {
                (None, None) => None,
                (after, warn) => Some((after.unwrap_or(120), warn.unwrap_or(0))),
            };
            let use_defaults = field_bool(&fields, "useAccountDefaults").unwrap_or(false);
            if reminders.is_none() && expirations.is_none() && !use_defaults {
                return Err(DocuSignError::validation(
                    "At least one update field must be provided",
                ));
            }
            let body = serde_json::to_value(build_notification(reminders, expirations))?;
            Ok(OperationPlan::single(RequestEnvelope::put(path, body)))
        }
        other => Err(unknown(resource, other)),
    }
}

pub(super) fn email_setting(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeEmailSetting;
    let path = collection_path(resource, ctx)?;
    match operation {
        Operation::Get => Ok(OperationPlan::single(RequestEnvelope::get(path))),
        Operation::Update => {
            let fields = ctx.params.update_fields()?;
            let mut body = Map::new();
            if let Some(reply) = field_checked(&fields, "replyEmailAddressOverride", FieldKind::Email)? {
                body.insert("replyEmailAddressOverride".to_owned(), Value::String(reply));
            }
            if let Some(name) = field_str(&fields, "replyEmailNameOverride") {
                body.insert("replyEmailNameOverride".to_owned(), Value::String(name));
            }
            let bcc = split_list(fields.get("bccEmailAddresses"));
            if !bcc.is_empty() {
                let mut addresses = Vec::with_capacity(bcc.len());
                for email in bcc {
                    validate_field(
                        Some(&Value::String(email.clone())),
                        FieldKind::Email,
                        "bccEmailAddresses",
                    )?;
                    addresses.push(json!({ "email": email }));
                }
                body.insert("bccEmailAddresses".to_owned(), Value::Array(addresses));
            }
            if body.is_empty() {
                return Err(DocuSignError::validation(
                    "At least one update field must be provided",
                ));
            }
            Ok(OperationPlan::single(RequestEnvelope::put(path, Value::Object(body))))
        }
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// envelopeTransferRule
// ---------------------------------------------------------------------------

pub(super) fn transfer_rule(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::EnvelopeTransferRule;
    match operation {
        Operation::Create => {
            let from_user = ctx.params.checked("fromUserId", FieldKind::Uuid)?;
            let to_user = ctx.params.checked("toUserId", FieldKind::Uuid)?;
            let to_folder = ctx.params.required("toFolderId")?;
            let fields = ctx.params.additional_fields();
            let rule = json!({
                "eventDirection": field_str(&fields, "eventDirection").unwrap_or_else(|| "in".to_owned()),
                "fromUsers": [{ "userId": from_user }],
                "toUser": { "userId": to_user },
                "toFolder": { "folderId": to_folder },
                "carbonCopyOriginalOwner": field_bool(&fields, "carbonCopyOriginalOwner").unwrap_or(false).to_string(),
                "enabled": field_bool(&fields, "enabled").unwrap_or(true).to_string(),
            });
            Ok(OperationPlan::new(
                RequestEnvelope::post(resource.endpoint(), json!({ "envelopeTransferRules": [rule] })),
                ResponseShape::List {
                    keys: resource.list_keys(),
                    limit: None,
                },
            ))
        }
        Operation::GetAll => Ok(get_many(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        Operation::Update => update_one(resource, ctx),
        Operation::Delete => delete_one(resource, ctx),
        other => Err(unknown(resource, other)),
    }
}

// ---------------------------------------------------------------------------
// payment
// ---------------------------------------------------------------------------

pub(super) fn payment(operation: Operation, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
    let resource = Resource::Payment;
    match operation {
        Operation::CreateRequest => {
            let amount = ctx.params.checked("amount", FieldKind::PositiveNumber)?;
            let currency = ctx.params.required("currencyCode")?;
            let gateway = ctx.params.required("gatewayAccountId")?;
            let description = ctx.params.additional_fields();
            let description = field_str(&description, "paymentDescription");
            let details = build_payment_details(&amount, &currency, &gateway, description.as_deref())?;
            let body = single_signer_envelope(ctx, |tabs, document_id| {
                tabs.formula_tabs.push(build_payment_tab(document_id, &amount, details));
                Ok(())
            })?;
            Ok(OperationPlan::single(RequestEnvelope::post("envelopes", body)))
        }
        Operation::GetGatewayAccounts => Ok(list_all(resource, ctx, RequestEnvelope::get(resource.endpoint()))),
        other => Err(unknown(resource, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use nodes::mock::{MemoryBinary, StaticParameters};
    use nodes::HttpMethod;

    const ENVELOPE_ID: &str = "6d3b1c52-9d1f-4a5e-8f0b-2c7e4a1d9b30";
    const PDF_B64: &str = "JVBERi0xLjc=";

    fn build(resource: Resource, operation: Operation, params: Value) -> Result<OperationPlan> {
        build_with(resource, operation, params, &MemoryBinary::new())
    }

    fn build_with(resource: Resource, operation: Operation, params: Value, binary: &MemoryBinary) -> Result<OperationPlan> {
        let params = StaticParameters::single(params);
        let config = NodeConfig::default();
        let ctx = PlanContext {
            params: crate::params::ItemParams::new(&params, 0),
            binary,
            config: &config,
        };
        super::super::build_plan(resource, operation, &ctx)
    }

    fn envelope_params() -> Value {
        json!({
            "emailSubject": "Please sign",
            "signerEmail": "ada@example.com",
            "signerName": "Ada",
            "document": PDF_B64,
            "documentName": "contract.pdf",
        })
    }

    #[test]
    fn create_envelope_body() {
        let plan = build(Resource::Envelope, Operation::Create, envelope_params()).unwrap();
        assert_eq!(plan.request.method, HttpMethod::Post);
        assert_eq!(plan.request.path, "envelopes");

        let body = plan.request.body.unwrap();
        assert_eq!(body["status"], "sent");
        assert_eq!(body["documents"][0]["fileExtension"], "pdf");
        assert_eq!(body["documents"][0]["documentBase64"], PDF_B64);
        let signer = &body["recipients"]["signers"][0];
        assert_eq!(signer["routingOrder"], "1");
        assert_eq!(signer["tabs"]["signHereTabs"][0]["xPosition"], "100");
        assert!(body.get("notification").is_none());
    }

    #[test]
    fn create_envelope_from_binary_property_with_options() {
        let mut params = envelope_params();
        params["document"] = json!("data");
        params["additionalFields"] = json!({
            "anchorString": "/sig/",
            "ccEmail": "bob@example.com",
            "ccName": "Bob",
            "reminderDelay": 2,
            "reminderFrequency": "3",
            "webhookUrl": "https://hooks.example.com/docusign",
            "status": "created",
        });
        let binary = MemoryBinary::new().with_file(0, "data", b"%PDF-1.7".to_vec());
        let plan = build_with(Resource::Envelope, Operation::Create, params, &binary).unwrap();
        let body = plan.request.body.unwrap();

        assert_eq!(body["documents"][0]["documentBase64"], PDF_B64);
        assert_eq!(body["status"], "created");
        let tab = &body["recipients"]["signers"][0]["tabs"]["signHereTabs"][0];
        assert_eq!(tab["anchorString"], "/sig/");
        assert!(tab.get("xPosition").is_none());
        assert_eq!(body["recipients"]["carbonCopies"][0]["email"], "bob@example.com");
        assert_eq!(body["notification"]["reminders"]["reminderDelay"], "2");
        assert_eq!(body["eventNotification"]["envelopeEvents"][0]["envelopeEventStatusCode"], "completed");
    }

    #[test]
    fn create_envelope_rejects_bad_input() {
        let mut params = envelope_params();
        params["signerEmail"] = json!("not-an-email");
        let err = build(Resource::Envelope, Operation::Create, params).unwrap_err();
        assert_eq!(err.to_string(), "signerEmail must be a valid email");

        let mut params = envelope_params();
        params["additionalFields"] = json!({ "webhookUrl": "http://localhost:8080/hook" });
        let err = build(Resource::Envelope, Operation::Create, params).unwrap_err();
        assert!(err.to_string().contains("must be a valid URL"));

        let mut params = envelope_params();
        params["documentName"] = json!("contract");
        let err = build(Resource::Envelope, Operation::Create, params).unwrap_err();
        assert!(err.to_string().contains("fileExtension is required"));
    }

    #[test]
    fn envelope_lifecycle_requests() {
        let void = build(
            Resource::Envelope,
            Operation::Void,
            json!({ "envelopeId": ENVELOPE_ID, "voidedReason": "duplicate" }),
        )
        .unwrap();
        assert_eq!(void.request.path, format!("envelopes/{ENVELOPE_ID}"));
        assert_eq!(void.request.body.unwrap()["status"], "voided");

        let resend = build(Resource::Envelope, Operation::Resend, json!({ "envelopeId": ENVELOPE_ID })).unwrap();
        assert_eq!(resend.request.query, vec![("resend_envelope".to_owned(), "true".to_owned())]);

        let err = build(Resource::Envelope, Operation::Void, json!({ "envelopeId": ENVELOPE_ID })).unwrap_err();
        assert_eq!(err.to_string(), "voidedReason is required");

        let err = build(Resource::Envelope, Operation::Get, json!({ "envelopeId": "123" })).unwrap_err();
        assert_eq!(err.to_string(), "envelopeId must be a valid UUID");
    }

    #[test]
    fn envelope_listing_defaults_from_date() {
        let plan = build(Resource::Envelope, Operation::GetAll, json!({ "limit": 10 })).unwrap();
        assert!(plan.request.query.iter().any(|(k, _)| k == "from_date"));
        match plan.shape {
            ResponseShape::Paginated { keys, options } => {
                assert_eq!(keys, &["envelopes"]);
                assert_eq!(options.limit, 10);
                assert!(!options.return_all);
            }
            other => panic!("unexpected shape {other:?}"),
        }

        let err = build(
            Resource::Envelope,
            Operation::GetAll,
            json!({ "additionalFields": { "fromDate": "last tuesday" } }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "fromDate must be a valid ISO 8601 date");
    }

    #[test]
    fn recipient_view_rejects_metadata_return_url() {
        let err = build(
            Resource::Envelope,
            Operation::CreateRecipientView,
            json!({
                "envelopeId": ENVELOPE_ID,
                "returnUrl": "http://169.254.169.254/latest",
                "signerEmail": "ada@example.com",
                "signerName": "Ada",
                "clientUserId": "1001",
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be a valid URL"));
    }

    #[test]
    fn recipient_add_by_type() {
        let plan = build(
            Resource::Recipient,
            Operation::Add,
            json!({
                "envelopeId": ENVELOPE_ID,
                "recipientType": "carbonCopy",
                "email": "cc@example.com",
                "name": "CC",
                "recipientId": "3",
            }),
        )
        .unwrap();
        assert_eq!(plan.request.path, format!("envelopes/{ENVELOPE_ID}/recipients"));
        let body = plan.request.body.unwrap();
        assert_eq!(body["carbonCopies"][0]["recipientId"], "3");
        assert!(body.get("signers").is_none());

        let err = build_with(
            Resource::Recipient,
            Operation::Add,
            json!({ "envelopeId": ENVELOPE_ID, "recipientType": "witness" }),
            &MemoryBinary::new(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("recipientType must be one of"));
    }

    #[test]
    fn tab_paths_fill_both_placeholders() {
        let plan = build(
            Resource::Tab,
            Operation::Add,
            json!({
                "envelopeId": ENVELOPE_ID,
                "recipientId": "1",
                "tabType": "text",
                "documentId": "1",
                "tabLabel": "Company",
            }),
        )
        .unwrap();
        assert_eq!(plan.request.path, format!("envelopes/{ENVELOPE_ID}/recipients/1/tabs"));
        assert_eq!(plan.request.body.unwrap()["textTabs"][0]["tabLabel"], "Company");
    }

    #[test]
    fn lock_update_sends_edit_header() {
        let plan = build(
            Resource::EnvelopeLock,
            Operation::Update,
            json!({
                "envelopeId": ENVELOPE_ID,
                "lockToken": "tok",
                "additionalFields": { "lockDurationInSeconds": 600 },
            }),
        )
        .unwrap();
        let (name, value) = &plan.request.headers[0];
        assert_eq!(name, "X-DocuSign-Edit");
        let header: Value = serde_json::from_str(value).unwrap();
        assert_eq!(header["LockToken"], "tok");
        assert_eq!(header["LockDurationInSeconds"], "600");
    }

    #[test]
    fn payment_request_keeps_amount_as_string() {
        let mut params = envelope_params();
        params["amount"] = json!("49.90");
        params["currencyCode"] = json!("usd");
        params["gatewayAccountId"] = json!("gw-1");
        let plan = build(Resource::Payment, Operation::CreateRequest, params).unwrap();
        let body = plan.request.body.unwrap();
        let tab = &body["recipients"]["signers"][0]["tabs"]["formulaTabs"][0];
        assert_eq!(tab["formula"], "49.90");
        assert_eq!(tab["paymentDetails"]["currencyCode"], "USD");

        for amount in [json!(0), json!("-5"), json!("ten")] {
            let mut params = envelope_params();
            params["amount"] = amount;
            params["currencyCode"] = json!("USD");
            params["gatewayAccountId"] = json!("gw-1");
            let err = build_with(Resource::Payment, Operation::CreateRequest, params, &MemoryBinary::new())
                .unwrap_err();
            assert_eq!(err.to_string(), "amount must be a positive number");
        }
    }

    #[test]
    fn document_download_names_archive_as_zip() {
        let plan = build(
            Resource::Document,
            Operation::Download,
            json!({ "envelopeId": ENVELOPE_ID, "documentId": "archive" }),
        )
        .unwrap();
        match plan.shape {
            ResponseShape::Binary { file_name, mime_type } => {
                assert_eq!(file_name, format!("{ENVELOPE_ID}-archive.zip"));
                assert_eq!(mime_type, "application/zip");
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
