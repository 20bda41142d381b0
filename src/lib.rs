#[macro_use]
extern crate rocket;

use rocket::fs::FileServer;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};

pub mod boot;
pub mod config;
pub mod content;
pub mod effects;
pub mod health;
pub mod page;
pub mod render;
pub mod routes;
pub mod scroll;
pub mod seo;

#[cfg(test)]
mod tests;

use config::SiteConfig;

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Assemble the server for a validated config. The content and static
/// directories must exist (`boot::run` creates them).
pub fn build(config: SiteConfig) -> Rocket<Build> {
    let content_mount = config.content_mount();
    let content_dir = config.content_dir.clone();
    let static_dir = config.static_dir.clone();

    rocket::build()
        .manage(config)
        .mount("/", routes::public::routes())
        .mount("/api", routes::api::routes())
        .mount(content_mount.as_str(), FileServer::from(content_dir))
        .mount("/static", FileServer::from(static_dir))
        .register("/", catchers![not_found, server_error])
}
