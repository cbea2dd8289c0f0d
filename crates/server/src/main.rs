#[tokio::main]
async fn main() -> anyhow::Result<()> {
    talend2dbt_server::start().await
}
