use crate::{
    cli::Command,
    l1_block::{L1BlockInfo, L1Client},
    rpc::JsonRpcClient,
    settings::Settings,
    verifier::{VerificationRequest, Verifier},
};
use anyhow::{anyhow, Context};
use ethers_core::types::H256;
use std::str::FromStr;

pub async fn run(settings: Settings, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Verify => verify_contracts(&settings).await,
        Command::L1Block { chain, hash } => {
            let info = fetch_l1_block(&settings, &chain, &hash).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

async fn verify_contracts(settings: &Settings) -> anyhow::Result<()> {
    let verifier = Verifier::from_settings(settings)?;

    let mut failed = Vec::new();
    for contract in &settings.contracts {
        let request = VerificationRequest::from(contract);
        match verifier.verify(&request).await {
            Ok(verdict) if verdict.passed() => {
                tracing::info!(
                    contract = %contract.name,
                    chain = %contract.chain,
                    "contract verified"
                );
            }
            Ok(verdict) => {
                for failure in &verdict.failures {
                    tracing::error!(
                        contract = %contract.name,
                        check = %failure.check,
                        "{failure}"
                    );
                }
                failed.push(contract.name.as_str());
            }
            Err(err) => {
                tracing::error!(contract = %contract.name, "verification failed: {err}");
                failed.push(contract.name.as_str());
            }
        }
    }

    if failed.is_empty() {
        tracing::info!(total = settings.contracts.len(), "all contracts verified");
        Ok(())
    } else {
        Err(anyhow!(
            "verification failed for {} of {} contracts: {}",
            failed.len(),
            settings.contracts.len(),
            failed.join(", ")
        ))
    }
}

async fn fetch_l1_block(
    settings: &Settings,
    chain: &str,
    hash: &str,
) -> anyhow::Result<L1BlockInfo> {
    let chain_settings = settings.chain(chain)?;
    let hash = H256::from_str(hash).with_context(|| format!("invalid block hash '{hash}'"))?;

    let rpc = JsonRpcClient::new(chain_settings.rpc_url.clone(), settings.http.request_timeout())?;
    let client = L1Client::new(rpc, chain_settings.block_header, chain_settings.base_fee);
    let block = client
        .block_by_hash(hash)
        .await
        .with_context(|| format!("fetching block {hash:?} on '{chain}'"))?;

    Ok(L1BlockInfo::from_block(block.as_ref()))
}
