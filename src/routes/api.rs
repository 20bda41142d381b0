use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::content;

/// The parsed content document, re-serialised with canonical field names.
#[get("/content")]
pub async fn content_document(config: &State<SiteConfig>) -> (Status, Json<Value>) {
    let source = match config.source() {
        Ok(s) => s,
        Err(e) => return (Status::InternalServerError, Json(json!({ "ok": false, "error": e }))),
    };

    match content::load(&source, config.fetch_timeout()).await {
        Ok(doc) => (Status::Ok, Json(json!(doc))),
        Err(e) => {
            log::error!("Could not load or parse blog content from {}: {}", source.describe(), e);
            (Status::BadGateway, Json(json!({ "ok": false, "error": e.to_string() })))
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![content_document]
}
