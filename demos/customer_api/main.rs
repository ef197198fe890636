//! Customer API Example
//!
//! Serves a GraphQL API generated from `models.yaml` over the in-memory
//! database:
//! - CRUD mutations for every model
//! - `createCustomer` normalizes names through a before hook
//! - `destroyCustomer` requires an `x-user-id` header
//! - GraphQL playground at /graphql/playground

use anyhow::Result;
use async_graphql::dynamic::{Schema, TypeRef};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use orm_graphql::prelude::*;
use serde_json::{Value as JsonValue, json};

const MODELS: &str = include_str!("models.yaml");

/// Per-request data handed to mutation hooks
#[derive(Debug, Clone)]
struct Session {
    user_id: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orm_graphql=debug,info".into()),
        )
        .init();

    let config = DatabaseConfig::from_yaml_str(MODELS)?;
    let db = InMemoryDatabase::from_config(&config);
    populate_test_data(&db).await?;

    let schema = build_schema(&db)?;

    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
        .route("/graphql/schema", get(graphql_schema))
        .with_state(schema);

    println!("🚀 Customer API running on http://127.0.0.1:3000");
    println!("\n📚 Available endpoints:");
    println!("    POST   /graphql              - GraphQL endpoint");
    println!("    GET    /graphql/playground   - GraphQL Playground");
    println!("    GET    /graphql/schema       - GraphQL Schema (SDL)");
    println!("\n  Example mutation:");
    println!("    mutation {{");
    println!("      updateCustomer(id: 1, values: {{ phone: \"555-0100\" }}) {{");
    println!("        firstName");
    println!("        phone");
    println!("        Branches {{ name }}");
    println!("      }}");
    println!("    }}");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_schema(db: &InMemoryDatabase) -> Result<Schema> {
    let customer = db
        .model("Customer")
        .ok_or_else(|| anyhow::anyhow!("Customer model is not configured"))?;

    let trim_names = before_hook(|params: ResolveParams<Session>| async move {
        let values = params
            .args
            .get("values")
            .and_then(JsonValue::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Some(
            values
                .into_iter()
                .map(|(key, value)| match value {
                    JsonValue::String(s) => (key, JsonValue::String(s.trim().to_string())),
                    other => (key, other),
                })
                .collect(),
        ))
    });

    let require_login = destroy_before_hook(|params: ResolveParams<Session>| async move {
        match params.context.and_then(|session| session.user_id) {
            Some(user_id) => {
                tracing::info!(user_id, "destroying customers");
                Ok(())
            }
            None => Err(anyhow::anyhow!("you must be logged in to destroy")),
        }
    });

    let schema = ModelSchema::new(db.models())
        .attribute_options(AttributeFieldsOptions::new().comment_to_description(true))
        .mutation(
            "createCustomer",
            create_mutation(
                CreateMutationOptions::new(
                    customer.clone(),
                    TypeRef::named("CreateCustomer"),
                    TypeRef::named("Customer"),
                )
                .before(trim_names),
            ),
        )
        .mutation(
            "destroyCustomer",
            destroy_mutation(DestroyMutationOptions::new(customer).before(require_login)),
        )
        .finish()?;

    Ok(schema)
}

/// Handler for GraphQL queries and mutations
async fn graphql_handler(
    State(schema): State<Schema>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let session = Session {
        user_id: headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok()),
    };
    schema.execute(request.into_inner().data(session)).await.into()
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(State(schema): State<Schema>) -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        schema.sdl(),
    )
}

/// Populate the database with a couple of branches and customers
async fn populate_test_data(db: &InMemoryDatabase) -> Result<()> {
    let defaults = CreateOptions::default();
    let model = |name: &str| {
        db.model(name)
            .ok_or_else(|| anyhow::anyhow!("{} model is not configured", name))
    };

    for name in ["North", "South"] {
        model("Branch")?
            .create(as_record(json!({ "name": name })), &defaults)
            .await?;
    }
    for (first, last, status) in [("Andy", "Edwards", "active"), ("Jim", "Jones", "archived")] {
        model("Customer")?
            .create(
                as_record(json!({ "firstName": first, "lastName": last, "status": status })),
                &defaults,
            )
            .await?;
    }
    for (branch, customer) in [(1, 1), (2, 1), (2, 2)] {
        model("BranchCustomer")?
            .create(
                as_record(json!({ "BranchId": branch, "CustomerId": customer })),
                &defaults,
            )
            .await?;
    }

    println!("✅ Created 2 branches and 2 customers");
    Ok(())
}

fn as_record(value: JsonValue) -> Record {
    match value {
        JsonValue::Object(record) => record,
        _ => Record::new(),
    }
}
