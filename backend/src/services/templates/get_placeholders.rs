use super::render::Template;
use actix_web::{web, HttpResponse, Responder};
use common::requests::PathRequest;
use log::{error, info};
use std::path::Path;

/// Actix web handler for `POST /api/templates/placeholders`.
///
/// # Returns
/// - `200 OK` with the placeholder names as a JSON array.
/// - `400 Bad Request` with an error message if the template cannot be read.
pub async fn process(payload: web::Json<PathRequest>) -> impl Responder {
    let path = payload.into_inner().path;
    match Template::load(Path::new(&path)) {
        Ok(template) => {
            info!(
                "Template {} declares {} placeholders",
                path,
                template.placeholders().len()
            );
            HttpResponse::Ok().json(template.placeholders())
        }
        Err(e) => {
            error!("Failed to read template: {}", e);
            HttpResponse::BadRequest().body(format!("Error: {}", e))
        }
    }
}
