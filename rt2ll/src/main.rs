#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    rt2ll::run_cli().await
}
