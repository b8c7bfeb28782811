pub mod search;
pub mod summary;
pub mod tools;
pub mod tree;
pub mod turns;

use anyhow::Result;
use serde::Serialize;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
