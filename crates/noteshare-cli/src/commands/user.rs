//! Account command handlers

use anyhow::Result;

use noteshare_core::Store;

use crate::output::Output;

/// Register a new account
pub fn register(
    store: &mut Store,
    username: &str,
    password: &str,
    email: &str,
    output: &Output,
) -> Result<()> {
    let user = store.register(username, password, email)?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "id": user.id,
                "username": user.username,
                "role": user.role.as_str(),
            })
        );
    } else if output.is_quiet() {
        println!("{}", user.id);
    } else {
        output.success(&format!(
            "Registered '{}'. You can sign in with --user {} --password <password>.",
            user.username, user.username
        ));
    }

    Ok(())
}
