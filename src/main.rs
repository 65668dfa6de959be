use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;

use subshare::config::Config;
use subshare::services::AppServices;
use subshare::tasks::overdue::start_overdue_task;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().expect("Failed to load configuration");
    let services = AppServices::build(&config);

    tokio::spawn(start_overdue_task(services.obligations.clone()));

    println!("Starting subshare server at http://{}", config.bind_address);
    println!("API:");
    println!("  GET    /api/v1/groups/browse            - Groups available to join");
    println!("  POST   /api/v1/groups/join              - Request to join a group");
    println!("  PUT    /api/v1/groups/requests/{{id}}     - Approve/reject a request");
    println!("  POST   /api/v1/payments/order           - Create a gateway order");
    println!("  POST   /api/v1/payments/webhook         - Gateway webhook");

    let bind_address = config.bind_address.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .configure(|cfg| services.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}
