//! RPC method handler for the LinkVault JSON-RPC protocol.
//!
//! Kept separate from `rpc_server.rs` so it can be unit-tested. Bookmarks
//! cross the boundary in wire form (string timestamps).

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::services::record_codec;
use crate::types::bookmark::BookmarkDraft;

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn draft_from_params(params: &Value) -> Result<BookmarkDraft, String> {
    let title = str_param(params, "title").ok_or("missing title")?;
    let url = str_param(params, "url").ok_or("missing url")?;
    let description = str_param(params, "description").unwrap_or("");
    // Tags may arrive as the comma-separated form string or as an array.
    let tags = match params.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    Ok(BookmarkDraft::new(title, url, description, &tags))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the application state.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Bookmarks ───
        "bookmark.list" => {
            let a = app.lock().await;
            to_value(&record_codec::encode_all(a.bookmarks()))
        }
        "bookmark.add" => {
            let draft = draft_from_params(params)?;
            let mut a = app.lock().await;
            let bookmark = a.add_bookmark(&draft).await.map_err(|e| e.to_string())?;
            to_value(&record_codec::encode(&bookmark))
        }
        "bookmark.update" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let draft = draft_from_params(params)?;
            let mut a = app.lock().await;
            let bookmark = a.update_bookmark(id, &draft).await.map_err(|e| e.to_string())?;
            to_value(&record_codec::encode(&bookmark))
        }
        "bookmark.delete" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let mut a = app.lock().await;
            a.delete_bookmark(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.sample" => {
            let mut a = app.lock().await;
            let added = a.add_sample_data().await.map_err(|e| e.to_string())?;
            Ok(json!({"added": added}))
        }

        // ─── Storage ───
        "storage.status" => {
            let a = app.lock().await;
            Ok(json!({
                "provider": a.current_provider_name(),
                "providers": a.storage().provider_names(),
                "count": a.bookmarks().len(),
            }))
        }
        "storage.clear" => {
            let mut a = app.lock().await;
            a.clear_all().await;
            Ok(json!({"ok": true}))
        }

        // ─── Backup ───
        "backup.export" => {
            let a = app.lock().await;
            let export = a.export_backup().map_err(|e| e.to_string())?;
            Ok(json!({"file_name": export.file_name, "content": export.content}))
        }
        "backup.import" => {
            let content = str_param(params, "content").ok_or("missing content")?;
            let mut a = app.lock().await;
            let report = a.import_backup(content).await.map_err(|e| e.to_string())?;
            let skipped: Vec<Value> = report
                .skipped
                .iter()
                .map(|s| json!({"index": s.index, "id": s.id, "reason": s.reason}))
                .collect();
            Ok(json!({"imported": report.bookmarks.len(), "skipped": skipped}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
