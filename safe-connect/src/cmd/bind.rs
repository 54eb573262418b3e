//! `safe-connect bind` command: resolve an account's contract family.

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use safe_connect::binder::{AccountBinder, BindRequest, DeploymentTarget, ImplementationState};
use safe_connect::chain::{ChainId, PrefixedAddress};
use safe_connect::deployments::DeploymentRegistry;
use safe_connect::{AccountBinding, Error};

use super::Context;
use crate::cli::BindArgs;

/// Builds the request for `args` on `chain`.
fn request(
    args: &BindArgs,
    chain: ChainId,
    address: Option<Address>,
) -> Result<BindRequest, Error> {
    let mut request = match (address, &args.target_version) {
        (Some(address), _) => BindRequest::deployed(chain, address),
        (None, Some(version)) => BindRequest::counterfactual(
            chain,
            DeploymentTarget::new(version.clone(), args.target_family),
        ),
        (None, None) => {
            return Err(Error::usage(
                "an account address or --counterfactual --target-version is required",
            ));
        }
    };
    if let Some(version) = &args.safe_version {
        request = request.with_version(version.clone());
    }
    if let Some(implementation) = &args.implementation {
        let implementation = Address::from_str(implementation)
            .map_err(|e| Error::usage(format!("invalid implementation address: {e}")))?;
        request = request.with_implementation(implementation);
    }
    if args.trusted {
        request = request.with_state(ImplementationState::UpToDate);
    }
    if let Some(family) = args.family {
        request = request.with_family(family);
    }
    if args.allow_unrecognized {
        request = request.allow_unrecognized();
    }
    Ok(request)
}

/// Binds the account and prints the binding as JSON.
#[allow(clippy::print_stdout)]
pub async fn run(ctx: &Context, args: &BindArgs) -> Result<(), Error> {
    let account = args
        .account
        .as_deref()
        .map(PrefixedAddress::parse)
        .transpose()
        .map_err(|e| Error::usage(e.to_string()))?;
    let hint = account.and_then(|a| a.prefix).or(args.chain.as_deref());

    let binding: AccountBinding = ctx
        .sig_down
        .run(async {
            let chain = ctx.resolve_chain(hint).await?;
            let request = request(args, chain.clone(), account.map(|a| a.address))?;
            let session = ctx.coordinator(chain)?.connect().await?;
            let binder = AccountBinder::new(Arc::new(DeploymentRegistry::with_config(
                &ctx.config.deployments,
            )));
            Ok(binder.bind(&session, &request).await?)
        })
        .await?;

    let json = serde_json::to_string_pretty(&binding).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}
