#[tokio::main]
async fn main() -> anyhow::Result<()> {
    testbed_lib::main().await
}
