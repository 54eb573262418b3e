//! `safe-connect connect` command: bootstrap a wallet session.

use safe_connect::Error;

use super::Context;

/// Connects to `chain` (or the configured chain) and prints the session.
#[allow(clippy::print_stdout)]
pub async fn run(ctx: &Context, chain: Option<&str>) -> Result<(), Error> {
    let session = ctx
        .sig_down
        .run(async {
            let chain = ctx.resolve_chain(chain).await?;
            Ok(ctx.coordinator(chain)?.connect().await?)
        })
        .await?;

    let config = session.chain();
    println!("chain:   {} ({})", config.display_name, config.chain_id);
    match session.address() {
        Some(address) => {
            println!("account: {}", address.to_checksum(None));
            if let Some(link) = config.explorer_address_link(address) {
                println!("explorer: {link}");
            }
        }
        None => println!("account: none (read-only)"),
    }
    Ok(())
}
