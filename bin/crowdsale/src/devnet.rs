//! `crowdsale devnet`: a local sale to point the exporter at.

use std::net::SocketAddr;

use alloy_primitives::{Address, keccak256};
use crowdsale_devnet::{ChainConfig, Deployment, SharedChain, TxRequest};
use crowdsale_primitives::{ether, format_ether};
use crowdsale_rpc::JsonRpcServer;

/// Deploys the Edgeless sale, seeds `backers` purchases and serves the chain
/// until Ctrl-C.
pub(crate) fn run(addr: SocketAddr, backers: usize) -> eyre::Result<()> {
    let deployment = seed(backers)?;
    let crowdsale = deployment.crowdsale_address();
    let chain = SharedChain::new(deployment.into_chain());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let handle = JsonRpcServer::new(addr, chain).start().await?;
        tracing::info!(url = %handle.http_url(), %crowdsale, "Devnet ready");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down devnet");
        handle.stop();
        handle.stopped().await;
        Ok::<_, eyre::Report>(())
    })
}

fn seed(backers: usize) -> eyre::Result<Deployment> {
    let mut deployment = Deployment::deploy(ChainConfig::default())?;
    deployment.open()?;
    let deployer = deployment.accounts().deployer;

    for i in 0..backers {
        let backer = backer_address(i);
        deployment.chain_mut().send_transaction(TxRequest::transfer(deployer, backer, ether(100)))?;

        // Every third backer comes back for a second purchase.
        deployment.buy(backer, ether(1 + (i as u64 % 10)))?;
        if i % 3 == 2 {
            deployment.buy(backer, ether(2))?;
        }
    }

    tracing::info!(
        backers,
        blocks = deployment.chain().block_number(),
        raised = %format_ether(deployment.crowdsale().amount_raised()),
        "Seeded purchases"
    );
    Ok(deployment)
}

fn backer_address(index: usize) -> Address {
    Address::from_word(keccak256(format!("crowdsale-devnet-backer-{index}")))
}
