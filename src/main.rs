use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bot_admin_dashboard::run().await
}
