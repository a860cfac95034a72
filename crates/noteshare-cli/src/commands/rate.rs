//! Rating command handler

use anyhow::Result;

use noteshare_core::{Caller, Store};

use crate::output::Output;

/// Rate a note, replacing any previous rating from the same user
pub fn rate(
    store: &mut Store,
    caller: &Caller,
    id: i64,
    rating: i64,
    review: Option<&str>,
    output: &Output,
) -> Result<()> {
    store.rate(caller, id, rating, review)?;
    output.success(&format!("Rated note {} with {}", id, rating));
    Ok(())
}
