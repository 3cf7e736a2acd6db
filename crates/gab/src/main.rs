use std::sync::Arc;

use gab_core::{config::Config, ledger::ProgressLedger, service::AliasService};

#[tokio::main]
async fn main() -> Result<(), gab_core::Error> {
    gab_core::logging::init("gab")?;

    let cfg = Arc::new(Config::load()?);

    let ledger = ProgressLedger::load_or_init(&cfg.alias_state_file);
    let service = Arc::new(AliasService::new(ledger, cfg.fold_local_part_case));

    gab_telegram::router::run_polling(cfg, service)
        .await
        .map_err(|e| gab_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
