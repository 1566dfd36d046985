use std::net::SocketAddr;

use tonic::{Request, Response, Status};

use crate::application::OrderService;
use crate::domain::{Order, RepositoryError};

use super::proto::order::v1::order_service_server::{
    OrderService as OrderServiceRpc, OrderServiceServer,
};
use super::proto::order::v1::{
    self as proto, CreateOrderRequest, CreateOrderResponse, DeleteOrderRequest,
    DeleteOrderResponse, GetOrderRequest, GetOrderResponse, ListOrdersRequest,
    ListOrdersResponse, UpdateOrderRequest, UpdateOrderResponse,
};

impl From<Order> for proto::Order {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            item: order.item,
            amount: order.amount,
        }
    }
}

impl From<proto::Order> for Order {
    fn from(order: proto::Order) -> Self {
        Self {
            id: order.id,
            item: order.item,
            amount: order.amount,
        }
    }
}

fn to_status(e: RepositoryError) -> Status {
    match e {
        RepositoryError::NotFound => Status::not_found(e.to_string()),
        RepositoryError::InvalidEntity => Status::invalid_argument(e.to_string()),
        RepositoryError::AlreadyExists => Status::already_exists(e.to_string()),
        RepositoryError::Config(_)
        | RepositoryError::ConnectionFailure(_)
        | RepositoryError::Io(_) => Status::internal(e.to_string()),
    }
}

/// Repository calls block on I/O; move them onto the blocking pool before
/// awaiting.
async fn blocking<T>(
    f: impl FnOnce() -> Result<T, RepositoryError> + Send + 'static,
) -> Result<T, Status>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Status::internal(e.to_string()))?
        .map_err(to_status)
}

/// gRPC adapter over the shared `OrderService`.
pub struct OrderGrpcService {
    service: OrderService,
}

impl OrderGrpcService {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl OrderServiceRpc for OrderGrpcService {
    async fn list_orders(
        &self,
        _request: Request<ListOrdersRequest>,
    ) -> Result<Response<ListOrdersResponse>, Status> {
        let service = self.service.clone();
        let orders = blocking(move || service.list_orders()).await?;
        Ok(Response::new(ListOrdersResponse {
            orders: orders.into_iter().map(proto::Order::from).collect(),
        }))
    }

    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let order = request
            .into_inner()
            .order
            .ok_or_else(|| Status::invalid_argument("order is required"))?;
        let service = self.service.clone();
        let created = blocking(move || service.create_order(order.into())).await?;
        Ok(Response::new(CreateOrderResponse {
            order: Some(created.into()),
        }))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<GetOrderResponse>, Status> {
        let id = request.into_inner().id;
        let service = self.service.clone();
        let order = blocking(move || service.get_order(id)).await?;
        Ok(Response::new(GetOrderResponse {
            order: Some(order.into()),
        }))
    }

    async fn update_order(
        &self,
        request: Request<UpdateOrderRequest>,
    ) -> Result<Response<UpdateOrderResponse>, Status> {
        let req = request.into_inner();
        let order = req
            .order
            .ok_or_else(|| Status::invalid_argument("order is required"))?;
        let service = self.service.clone();
        let updated = blocking(move || service.update_order(req.id, order.into())).await?;
        Ok(Response::new(UpdateOrderResponse {
            order: Some(updated.into()),
        }))
    }

    async fn delete_order(
        &self,
        request: Request<DeleteOrderRequest>,
    ) -> Result<Response<DeleteOrderResponse>, Status> {
        let id = request.into_inner().id;
        let service = self.service.clone();
        blocking(move || service.delete_order(id)).await?;
        Ok(Response::new(DeleteOrderResponse {}))
    }
}

/// Binds and serves the gRPC surface until the process exits.
pub async fn serve(
    service: OrderService,
    addr: SocketAddr,
) -> Result<(), tonic::transport::Error> {
    log::info!("gRPC server is running on {}", addr);
    tonic::transport::Server::builder()
        .add_service(OrderServiceServer::new(OrderGrpcService::new(service)))
        .serve(addr)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tonic::Code;

    use super::*;
    use crate::infrastructure::MemoryOrderRepository;

    fn grpc_service() -> OrderGrpcService {
        OrderGrpcService::new(OrderService::new(Arc::new(MemoryOrderRepository::new())))
    }

    fn order_message(item: &str, amount: f64) -> proto::Order {
        proto::Order {
            id: 0,
            item: item.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let svc = grpc_service();

        let created = svc
            .create_order(Request::new(CreateOrderRequest {
                order: Some(order_message("Bag", 2.0)),
            }))
            .await
            .expect("create failed")
            .into_inner()
            .order
            .expect("order missing");
        assert_eq!(created.id, 1);

        let fetched = svc
            .get_order(Request::new(GetOrderRequest { id: created.id }))
            .await
            .expect("get failed")
            .into_inner()
            .order
            .expect("order missing");
        assert_eq!(fetched.item, "Bag");
        assert_eq!(fetched.amount, 2.0);
    }

    #[tokio::test]
    async fn list_returns_all_orders() {
        let svc = grpc_service();
        for (item, amount) in [("Bag", 2.0), ("Shoe", 49.99)] {
            svc.create_order(Request::new(CreateOrderRequest {
                order: Some(order_message(item, amount)),
            }))
            .await
            .expect("create failed");
        }

        let listed = svc
            .list_orders(Request::new(ListOrdersRequest {}))
            .await
            .expect("list failed")
            .into_inner();
        assert_eq!(listed.orders.len(), 2);
    }

    #[tokio::test]
    async fn missing_order_payload_is_invalid_argument() {
        let svc = grpc_service();
        let status = svc
            .create_order(Request::new(CreateOrderRequest { order: None }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn invalid_entity_maps_to_invalid_argument() {
        let svc = grpc_service();
        let status = svc
            .create_order(Request::new(CreateOrderRequest {
                order: Some(order_message("", 2.0)),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn get_missing_order_maps_to_not_found() {
        let svc = grpc_service();
        let status = svc
            .get_order(Request::new(GetOrderRequest { id: 42 }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn delete_twice_maps_to_not_found() {
        let svc = grpc_service();
        svc.create_order(Request::new(CreateOrderRequest {
            order: Some(order_message("Bag", 2.0)),
        }))
        .await
        .expect("create failed");

        svc.delete_order(Request::new(DeleteOrderRequest { id: 1 }))
            .await
            .expect("delete failed");
        let status = svc
            .delete_order(Request::new(DeleteOrderRequest { id: 1 }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }
}
