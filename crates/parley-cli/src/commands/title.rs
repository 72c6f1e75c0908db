use anyhow::Result;
use console::style;

use crate::commands::build_router;
use crate::configuration::Settings;

pub async fn suggest_title(settings: &Settings, message: &str) -> Result<()> {
    let router = build_router(settings, None)?;
    let title = router.define_conversation_title(message).await?;
    println!("{} {}", style("Title:").bold(), title);
    Ok(())
}
