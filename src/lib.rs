pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod graphql;
pub mod grpc;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};

pub use application::OrderService;
pub use infrastructure::connect;

/// Registers the REST routes and the GraphQL endpoint. Expects
/// `Data<OrderService>` and `Data<OrdersSchema>` on the app.
pub fn http_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(handlers::orders::list_orders))
            .route("", web::post().to(handlers::orders::create_order))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}", web::put().to(handlers::orders::update_order))
            .route("/{id}", web::delete().to(handlers::orders::delete_order)),
    )
    .route("/graphql", web::post().to(graphql::graphql_handler))
    .route("/graphql", web::get().to(graphql::graphql_playground));
}

/// Build and return an actix-web `Server` bound to `host:port`, serving
/// both the REST API and the GraphQL endpoint.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let schema = graphql::build_schema(service.clone());
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(Logger::default())
            .configure(http_routes)
    })
    .bind((host.to_string(), port))?
    .run())
}
