use dotenvy::dotenv;
use ordersvc::config::{DatabaseConfig, ServerConfig};
use ordersvc::{build_server, connect, OrderService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let db_cfg = DatabaseConfig::from_env().expect("invalid database configuration");
    let srv_cfg = ServerConfig::from_env().expect("invalid server configuration");

    let repo = connect(&db_cfg).expect("failed to construct order repository");
    let service = OrderService::new(repo);
    log::info!("Using {} order repository", db_cfg.driver);

    let grpc_addr = format!("{}:{}", srv_cfg.grpc_host, srv_cfg.grpc_port)
        .parse()
        .expect("invalid gRPC address");
    let grpc_service = service.clone();
    tokio::spawn(async move {
        if let Err(e) = ordersvc::grpc::server::serve(grpc_service, grpc_addr).await {
            log::error!("gRPC server failed: {e}");
        }
    });

    log::info!(
        "Starting HTTP server at http://{}:{}",
        srv_cfg.http_host,
        srv_cfg.http_port
    );

    build_server(service, &srv_cfg.http_host, srv_cfg.http_port)?.await
}
