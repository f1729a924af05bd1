use anyhow::Result;

use newsdigest_core::AppConfig;

use super::{build_pipeline, trigger, SelectionArgs};

pub async fn run(config: &AppConfig, selection: &SelectionArgs) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let query = selection.query(config);

    trigger(&pipeline, query).await;

    Ok(())
}
