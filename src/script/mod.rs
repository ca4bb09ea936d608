mod raw;
mod store;

pub use raw::{script_json_schema, ScriptRaw};
pub use store::ScriptStore;

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;
