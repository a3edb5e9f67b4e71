//! OpenAPI document, served at `/swagger/v1/swagger.json` with a Swagger UI
//! at `/swagger-ui`.

use utoipa::OpenApi;

use crate::health::report::{HealthDataItem, HealthEntryBody, HealthReportBody, NamedHealthEntry};
use crate::health::HealthStatus;
use crate::models::{Foo, FooPayload, FooUpload};

pub const DOCUMENT_PATH: &str = "/swagger/v1/swagger.json";
pub const UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Starter API",
        version = "v1",
        description = "Template REST API over a placeholder Foo resource"
    ),
    paths(
        crate::handlers::foo::create_foo,
        crate::handlers::foo::create_foo_with_file,
        crate::handlers::foo::list_foos,
        crate::handlers::foo::get_foo,
        crate::handlers::foo::update_foo,
        crate::handlers::foo::delete_foo,
        crate::handlers::foo::throw_demo,
        crate::health::report::ready,
        crate::health::report::live,
    ),
    components(schemas(
        Foo,
        FooPayload,
        FooUpload,
        HealthStatus,
        HealthReportBody,
        NamedHealthEntry,
        HealthEntryBody,
        HealthDataItem,
    )),
    tags(
        (name = "foo", description = "Placeholder resource"),
        (name = "health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;
