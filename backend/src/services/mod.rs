pub mod foo;

pub use foo::{DemoFooService, FooService};
