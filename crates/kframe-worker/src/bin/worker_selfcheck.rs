use kframe_worker::{selfcheck, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with output_dir={}",
        config.output_dir.display()
    );
    let tools = selfcheck::run(&config).await?;

    println!(
        "worker-selfcheck: ffmpeg={} ffprobe={}",
        tools.ffmpeg.display(),
        tools.ffprobe.display()
    );
    println!("worker-selfcheck: ok");
    Ok(())
}
