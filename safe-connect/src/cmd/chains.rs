//! `safe-connect chains` command: list the chain registry.

use safe_connect::Error;

use super::Context;

/// Loads the registry and prints one line per chain.
#[allow(clippy::print_stdout)]
pub async fn run(ctx: &Context) -> Result<(), Error> {
    let timeout = ctx.config.registry_timeout();
    let registry = ctx
        .sig_down
        .run(async { Ok(ctx.registry.load_with_timeout(timeout).await?) })
        .await?;

    for chain in registry.iter() {
        println!(
            "{:>10}  {:<12} {:<28} {:<3} {}",
            chain.chain_id,
            chain.short_name,
            chain.display_name,
            if chain.l2 { "L2" } else { "" },
            chain.default_rpc().map_or("-", |url| url.as_str()),
        );
    }
    tracing::info!(chains = registry.len(), "listed chain registry");
    Ok(())
}
