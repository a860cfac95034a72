//! First-time setup

use anyhow::Result;

use noteshare_core::Store;

use crate::output::Output;

/// Initialize the store and seed demo data on first run
pub fn run(store: &mut Store, output: &Output) -> Result<()> {
    let seeded = store.seed_demo()?;

    if output.is_json() {
        println!("{}", serde_json::json!({ "seeded": seeded }));
        return Ok(());
    }

    if seeded {
        output.success("Store initialized with demo data.");
        if !output.is_quiet() {
            println!("Demo admin account: admin / admin123");
        }
    } else {
        output.success("Store already initialized.");
    }

    Ok(())
}
