use super::{json_pretty, EXIT_SUCCESS};
use cmif_schema::manifest_schema;

pub fn run() -> Result<u8, String> {
    println!("{}", json_pretty(&manifest_schema())?);
    Ok(EXIT_SUCCESS)
}
