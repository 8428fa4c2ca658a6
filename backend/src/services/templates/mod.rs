//! # Template Service Module
//!
//! HTML invoice templates and the substitution of their `{{name}}` tokens.
//!
//! ## Sub-modules:
//! - `placeholders`: finds the placeholder names a template declares.
//! - `render`: loads a template and fills it with one table row.
//! - `get_placeholders`: HTTP handler listing a template's placeholders.

mod get_placeholders;
pub mod placeholders;
pub mod render;

use actix_web::web::{post, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`POST /placeholders`**:
///     - **Handler**: `get_placeholders::process`
///     - **Description**: Reads the template file named in the JSON body
///       (`{"path": "..."}`) and returns its distinct placeholder names in
///       order of first appearance. The front end offers these as mapping
///       targets for the table columns.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/placeholders", post().to(get_placeholders::process))
}
