//! Public Join View - 顾客端等位视图
//!
//! 显示当前排队人数和预计等待时间 (每 5 秒轮询一次)；
//! 带参数启动时先提交一次入队。
//!
//! 运行:
//!   cargo run -p waitlist-client --example join_view
//!   cargo run -p waitlist-client --example join_view -- "Alice" "555-0001" 2
//!
//! 环境变量:
//!   WAITLIST_URL (默认 http://localhost:4000)

use std::time::Duration;

use waitlist_client::{HttpClient, QueueEntryCreate};

/// 公共看板轮询间隔
const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base_url =
        std::env::var("WAITLIST_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let client = HttpClient::new(&base_url)?;

    // 带参数时先入队: join_view -- <name> <phone> <party_size>
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() == 3 {
        let entry = client
            .add_to_queue(&QueueEntryCreate {
                customer_name: args[0].clone(),
                phone_number: args[1].clone(),
                party_size: args[2].parse()?,
            })
            .await?;

        println!("Successfully joined queue!");
        println!("  Your position : {}", entry.position);
        println!("  Estimated wait: {} minutes", entry.estimated_wait_time);
        println!();
    }

    println!("=== Current Queue Status (refreshes every 5s, ctrl-c to quit) ===");
    loop {
        match (client.get_all_queues().await, client.get_current_wait_time().await) {
            (Ok(queues), Ok(wait)) => {
                println!(
                    "People in queue: {:>3} | Estimated wait: {:>3} min",
                    queues.len(),
                    wait
                );
            }
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("Failed to refresh queue status: {}", e);
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
