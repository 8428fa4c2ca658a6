use super::Table;
use actix_web::{web, HttpResponse, Responder};
use common::requests::PathRequest;
use log::{error, info};
use std::path::Path;

/// Actix handler for `POST /api/data_sources/table/columns`.
///
/// - `200 OK` with the header names, in table order, as a JSON array.
/// - `400 Bad Request` with the error message if the table cannot be loaded.
pub(crate) async fn process(payload: web::Json<PathRequest>) -> impl Responder {
    let path = payload.into_inner().path;
    match web::block(move || Table::load(Path::new(&path))).await {
        Ok(Ok(table)) => {
            info!("Listed {} columns", table.headers().len());
            HttpResponse::Ok().json(table.headers())
        }
        Ok(Err(e)) => {
            error!("Failed to read table: {}", e);
            HttpResponse::BadRequest().body(format!("Error: {}", e))
        }
        Err(e) => HttpResponse::InternalServerError().body(format!("Task join error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::configure_routes;
    use actix_web::{test, App};
    use common::requests::PathRequest;
    use std::io::Write;

    #[actix_web::test]
    async fn lists_columns_of_csv_table() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "order id,telephone,country").unwrap();
        writeln!(file, "A1,555,PT").unwrap();

        let app = test::init_service(App::new().service(configure_routes())).await;
        let req = test::TestRequest::post()
            .uri("/api/data_sources/table/columns")
            .set_json(PathRequest {
                path: file.path().to_string_lossy().into_owned(),
            })
            .to_request();
        let columns: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(columns, vec!["order id", "telephone", "country"]);
    }

    #[actix_web::test]
    async fn unreadable_table_is_bad_request() {
        let app = test::init_service(App::new().service(configure_routes())).await;
        let req = test::TestRequest::post()
            .uri("/api/data_sources/table/columns")
            .set_json(PathRequest {
                path: "/definitely/missing.xlsx".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
