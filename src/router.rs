use axum::{
    Router,
    http::Method,
    response::Json,
    routing::{MethodRouter, get, post},
};
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa::openapi::{
    ContentBuilder, HttpMethod, InfoBuilder, PathsBuilder, RefOr, ResponseBuilder,
    path::{OperationBuilder, PathItemBuilder},
    request_body::RequestBodyBuilder,
};

use crate::operations::{Operation, OperationRegistry, OperationRequest};
use crate::types::{ArgsPayload, HttpRequest, OperationResponse};

const API_TAG: &str = "gitdesk";

#[derive(OpenApi)]
#[openapi(components(schemas(HttpRequest, ArgsPayload, OperationResponse)))]
struct BaseApiDoc;

fn schema_ref(name: &str) -> RefOr<utoipa::openapi::schema::Schema> {
    RefOr::Ref(utoipa::openapi::Ref::from_schema_name(name))
}

fn json_request_body(schema: &str) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content(
            "application/json",
            ContentBuilder::new().schema(Some(schema_ref(schema))).build(),
        )
        .required(Some(utoipa::openapi::Required::True))
        .build()
}

fn ok_response() -> utoipa::openapi::Response {
    ResponseBuilder::new()
        .description("Operation executed")
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(schema_ref("OperationResponse")))
                .build(),
        )
        .build()
}

/// Parameter list and curl examples appended to an operation's description
fn describe(operation: &dyn Operation) -> String {
    let mut text = operation.description().to_string();
    let parameters = operation.parameters();
    if !parameters.is_empty() {
        text.push_str("\n\nArguments, in order:");
        for p in parameters {
            let marker = if p.required { "required" } else { "optional" };
            text.push_str(&format!("\n- `{}` ({marker}): {}", p.name, p.description));
        }
    }
    for example in operation.examples() {
        text.push_str(&format!("\n\n{}:\n```\n{}\n```", example.description, example.http_curl));
    }
    text
}

/// Generate the OpenAPI document from registered operations
pub fn generate_openapi_spec(registry: &OperationRegistry) -> utoipa::openapi::OpenApi {
    let mut openapi = BaseApiDoc::openapi();

    openapi.info = InfoBuilder::new()
        .title("GitDesk API")
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some("File browsing, git workflows and settings for the GitDesk shell"))
        .build();

    let rpc_op = OperationBuilder::new()
        .tag(API_TAG)
        .summary(Some("Generic RPC endpoint"))
        .description(Some("Execute any registered operation by name"))
        .request_body(Some(json_request_body("HttpRequest")))
        .response("200", ok_response())
        .build();

    let mut paths = PathsBuilder::new().path(
        "/rpc",
        PathItemBuilder::new().operation(HttpMethod::Post, rpc_op).build(),
    );

    // BTreeMap keeps the document stable between runs
    let mut by_path: BTreeMap<String, PathItemBuilder> = BTreeMap::new();
    for (route, op_name) in registry.get_all_routes() {
        let Some(operation) = registry.get_operation(&op_name) else {
            continue;
        };
        let http_method = match route.method {
            Method::GET => HttpMethod::Get,
            Method::POST => HttpMethod::Post,
            _ => continue,
        };

        let mut builder = OperationBuilder::new()
            .tag(API_TAG)
            .operation_id(Some(format!("{}_{}", op_name, route.method.as_str().to_lowercase())))
            .summary(Some(op_name.clone()))
            .description(Some(describe(operation)))
            .response("200", ok_response());
        if route.is_json {
            builder = builder.request_body(Some(json_request_body("ArgsPayload")));
        }

        let item = by_path.remove(&route.path).unwrap_or_else(PathItemBuilder::new);
        by_path.insert(route.path.clone(), item.operation(http_method, builder.build()));
    }

    for (path, item) in by_path {
        paths = paths.path(path, item.build());
    }

    openapi.paths = paths.build();
    openapi
}

/// Operations may shell out to git, so they run on the blocking pool
async fn dispatch(registry: Arc<OperationRegistry>, request: OperationRequest) -> Json<OperationResponse> {
    let operation = request.operation.clone();
    match tokio::task::spawn_blocking(move || registry.execute_http(request)).await {
        Ok(response) => Json(response),
        Err(e) => {
            error!("Operation {} did not complete: {}", operation, e);
            Json(OperationResponse {
                result: json!({ "success": false, "error": format!("Operation failed: {e}") }),
                success: false,
                operation,
            })
        }
    }
}

async fn rpc_handler(registry: Arc<OperationRegistry>, Json(payload): Json<HttpRequest>) -> Json<OperationResponse> {
    dispatch(registry, OperationRequest::new(payload.operation, payload.args)).await
}

/// Create the HTTP router from registered operations.
/// Routes come from each operation's own route list; GET takes no arguments and
/// POST takes an optional `{"args": [...]}` body.
pub fn create_http_router(registry: Arc<OperationRegistry>) -> Router {
    let mut router = Router::new().route(
        "/rpc",
        post({
            let registry = registry.clone();
            move |payload| rpc_handler(registry.clone(), payload)
        }),
    );

    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();
    for (route, op_name) in registry.get_all_routes() {
        let handler = match route.method {
            Method::GET => get({
                let registry = registry.clone();
                move || dispatch(registry.clone(), OperationRequest::new(op_name.clone(), vec![]))
            }),
            Method::POST => post({
                let registry = registry.clone();
                move |payload: Option<Json<ArgsPayload>>| {
                    let args = payload.map(|Json(p)| p.args).unwrap_or_default();
                    dispatch(registry.clone(), OperationRequest::new(op_name.clone(), args))
                }
            }),
            _ => {
                warn!("Unsupported HTTP method for route: {} {:?}", route.path, route.method);
                continue;
            }
        };
        let merged = match by_path.remove(&route.path) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        by_path.insert(route.path, merged);
    }
    for (path, method_router) in by_path {
        router = router.route(&path, method_router);
    }

    let openapi_spec = generate_openapi_spec(&registry);
    router.route(
        "/api-docs/openapi.json",
        get(move || {
            let spec = openapi_spec.clone();
            async move { Json(spec) }
        }),
    )
}

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_http_server<F>(address: &str, registry: Arc<OperationRegistry>, shutdown: F) -> Result<(), eyre::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_http_router(registry);

    let listener = TcpListener::bind(address).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| eyre::eyre!(e))?;

    Ok(())
}
