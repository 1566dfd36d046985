use actix_web::{web, HttpResponse};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::{Context, EmptySubscription, Error, Object, Result, Schema, SimpleObject};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::application::OrderService;
use crate::domain::{Order, RepositoryError};

pub type OrdersSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(SimpleObject)]
#[graphql(name = "Order")]
pub struct OrderObject {
    pub id: i32,
    pub item: String,
    pub amount: f64,
}

impl From<Order> for OrderObject {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            item: order.item,
            amount: order.amount,
        }
    }
}

/// Repository calls block on I/O; resolvers push them onto the blocking
/// pool to keep the async executor free.
async fn blocking<T>(
    f: impl FnOnce() -> std::result::Result<T, RepositoryError> + Send + 'static,
) -> Result<T>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::new(e.to_string()))?
        .map_err(|e| Error::new(e.to_string()))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All stored orders.
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<OrderObject>> {
        let service = ctx.data_unchecked::<OrderService>().clone();
        let orders = blocking(move || service.list_orders()).await?;
        Ok(orders.into_iter().map(OrderObject::from).collect())
    }

    /// A single order by id.
    async fn order(&self, ctx: &Context<'_>, id: i32) -> Result<OrderObject> {
        let service = ctx.data_unchecked::<OrderService>().clone();
        let order = blocking(move || service.get_order(id)).await?;
        Ok(order.into())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        item: String,
        amount: f64,
    ) -> Result<OrderObject> {
        let service = ctx.data_unchecked::<OrderService>().clone();
        let created = blocking(move || service.create_order(Order::new(item, amount))).await?;
        Ok(created.into())
    }

    async fn update_order(
        &self,
        ctx: &Context<'_>,
        id: i32,
        item: String,
        amount: f64,
    ) -> Result<OrderObject> {
        let service = ctx.data_unchecked::<OrderService>().clone();
        let updated = blocking(move || service.update_order(id, Order::new(item, amount))).await?;
        Ok(updated.into())
    }

    async fn delete_order(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        let service = ctx.data_unchecked::<OrderService>().clone();
        blocking(move || service.delete_order(id)).await?;
        Ok(true)
    }
}

pub fn build_schema(service: OrderService) -> OrdersSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

pub async fn graphql_handler(
    schema: web::Data<OrdersSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

pub async fn graphql_playground() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
