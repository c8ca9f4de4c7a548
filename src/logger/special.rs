//! Special logging functions for specific use cases

use super::tags::LogTag;
use crate::hashrate::HashRateValue;
use crate::logger;
use crate::pools::PoolAddressData;
use colored::*;

/// Two-line summary of one successful poll
///
/// Line 1: title, total hash rate and online/total workers
/// Line 2: paid, balance and best difficulty (only the figures the pool exposes)
pub fn log_poll_summary(title: &str, data: &PoolAddressData) {
    // Hash rates are GH/s once they leave an adapter
    let total = HashRateValue::from_raw_number(data.total_hash_rate(), "G");
    let online = data.online_workers();

    let workers_text = if online == data.workers.len() {
        format!("{}/{} online", online, data.worker_count).green().bold()
    } else if online == 0 {
        format!("{}/{} online", online, data.worker_count).red().bold()
    } else {
        format!("{}/{} online", online, data.worker_count).yellow().bold()
    };

    let line1 = format!(
        "{}  {}  {}",
        title.bold(),
        total.to_string().white().bold(),
        workers_text
    );

    let mut line2_parts = Vec::new();
    if let Some(paid) = data.total_paid {
        line2_parts.push(format!("Paid: {}", format!("{}", paid).white()));
    }
    if let Some(balance) = data.current_balance {
        line2_parts.push(format!("Balance: {}", format!("{}", balance).white()));
    }
    if let Some(best) = data.best_difficulty {
        line2_parts.push(format!("Best: {}", format!("{}", best).bright_yellow()));
    }

    let message = if line2_parts.is_empty() {
        line1
    } else {
        format!("{}\n{}", line1, line2_parts.join("  ").dimmed())
    };

    logger::info(LogTag::Pool, &message);
}
