use holozine::config::SiteConfig;
use holozine::{boot, health};

#[rocket::launch]
fn rocket() -> _ {
    env_logger::init();
    health::init_uptime();

    let config = match SiteConfig::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Boot check — verify/create directories, validate the content file
    boot::run(&config);

    eprintln!(
        "Serving {} ({} variant) with content from {}",
        config.site_name,
        config.variant.name(),
        config.content_source
    );

    holozine::build(config)
}
