//! Staff Management View - 店员端管理视图
//!
//! 列出全部等位记录，订阅消息总线，收到 Sync 失效信号后重新拉取。
//! 通过 stdin 命令推进状态或移除记录:
//!
//!   list            重新拉取并显示队列
//!   notify <id>     标记为已通知
//!   seat <id>       标记为已就座
//!   cancel <id>     标记为已取消
//!   remove <id>     从队列移除
//!   quit            退出
//!
//! 运行: cargo run -p waitlist-client --example manager_view
//!
//! 环境变量:
//!   WAITLIST_URL (默认 http://localhost:4000)
//!   WAITLIST_BUS_ADDR (默认 localhost:4001)

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use waitlist_client::{EventType, HttpClient, MessageClient, QueueEntry, QueueStatus};

async fn print_queue(client: &HttpClient) {
    match client.get_all_queues().await {
        Ok(entries) => print_entries(&entries),
        Err(e) => eprintln!("Failed to fetch queue: {}", e),
    }
}

fn print_entries(entries: &[QueueEntry]) {
    println!();
    println!(
        "{:<24} {:>3} {:<20} {:<14} {:>5} {:>9} {:>5}",
        "id", "pos", "customer", "phone", "party", "status", "wait"
    );
    for e in entries {
        println!(
            "{:<24} {:>3} {:<20} {:<14} {:>5} {:>9} {:>4}m",
            e.id, e.position, e.customer_name, e.phone_number, e.party_size, e.status,
            e.estimated_wait_time
        );
    }
    if entries.is_empty() {
        println!("(queue is empty)");
    }
    println!();
}

fn print_help() {
    println!("Commands: list | notify <id> | seat <id> | cancel <id> | remove <id> | quit");
}

fn report_update(result: waitlist_client::ClientResult<Option<QueueEntry>>) {
    match result {
        Ok(Some(entry)) => println!("OK: {} -> {}", entry.id, entry.status),
        Ok(None) => println!("No such entry"),
        Err(e) => eprintln!("Error: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base_url =
        std::env::var("WAITLIST_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let bus_addr =
        std::env::var("WAITLIST_BUS_ADDR").unwrap_or_else(|_| "localhost:4001".to_string());

    let http = HttpClient::new(&base_url)?;
    let bus = MessageClient::connect(&bus_addr, "manager-view").await?;
    println!(
        "Connected to message bus (client id: {})",
        bus.client_id().unwrap_or("?")
    );
    let mut sync_rx = bus.subscribe();

    print_queue(&http).await;
    print_help();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            msg = sync_rx.recv() => {
                match msg {
                    Ok(msg) if msg.event_type == EventType::Sync => {
                        // 收到失效信号，重新拉取全量数据
                        print_queue(&http).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // 信号丢了也没关系，直接重新拉取
                        print_queue(&http).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        eprintln!("Bus connection lost");
                        break;
                    }
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let parts: Vec<&str> = line.split_whitespace().collect();
                match parts.as_slice() {
                    ["list"] => print_queue(&http).await,
                    ["notify", id] => report_update(http.update_queue_status(id, QueueStatus::Notified).await),
                    ["seat", id] => report_update(http.update_queue_status(id, QueueStatus::Seated).await),
                    ["cancel", id] => report_update(http.update_queue_status(id, QueueStatus::Cancelled).await),
                    ["remove", id] => match http.remove_from_queue(id).await {
                        Ok(Some(entry)) => println!("Removed {}", entry.id),
                        Ok(None) => println!("No such entry"),
                        Err(e) => eprintln!("Error: {}", e),
                    },
                    ["quit"] | ["exit"] => break,
                    [] => {}
                    _ => print_help(),
                }
            }
        }
    }

    bus.close().await?;
    Ok(())
}
