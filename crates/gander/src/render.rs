//! Plain-text rendering for the terminal front end.

use chrono::{DateTime, Utc};
use gander_catalog::ResourceCatalog;
use gander_slurm::{CompletedJob, PartitionInfo, QueuedJob, Reservation};
use gander_usage::UsageSummary;
use std::time::Duration;

pub fn timestamp(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn duration(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "Unknown".to_string();
    };
    let secs = d.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

pub fn partitions(partitions: &[PartitionInfo]) {
    println!("{:<20} {:>6}  DEFAULT", "PARTITION", "NODES");
    for p in partitions {
        println!(
            "{:<20} {:>6}  {}",
            p.name,
            p.node_count,
            if p.is_default { "*" } else { "" }
        );
    }
}

pub fn catalog(catalog: &ResourceCatalog) {
    println!("Partition {}", catalog.partition);
    println!("  max walltime   {} min", catalog.max_walltime_minutes);
    println!("  max CPUs/node  {}", catalog.max_cpus_per_node);
    println!("  max memory     {} GB", catalog.max_memory_gb);
    println!("  max nodes      {}", catalog.max_nodes);
    if catalog.gpu_inventory.is_empty() {
        println!("  GPUs           none");
    } else {
        let gpus: Vec<String> = catalog
            .gpu_inventory
            .iter()
            .map(|g| format!("{}x{}", g.count, g.device))
            .collect();
        println!("  GPUs           {}", gpus.join(", "));
    }
    println!("  accounts       {}", catalog.accounts.join(", "));
}

pub fn queued_jobs(jobs: &[QueuedJob]) {
    println!(
        "{:<10} {:<20} {:<10} {:<17} {:>5} {:>8} {:>12}",
        "JOBID", "NAME", "STATE", "START", "CPUS", "MEMORY", "TIME LIMIT"
    );
    for job in jobs {
        println!(
            "{:<10} {:<20} {:<10} {:<17} {:>5} {:>8} {:>12}",
            job.id,
            job.name,
            job.state.as_str(),
            timestamp(job.start_time),
            job.cpus.map(|c| c.to_string()).unwrap_or_default(),
            job.memory,
            job.time_limit,
        );
    }
}

pub fn completed_jobs(jobs: &[CompletedJob]) {
    println!(
        "{:<12} {:<20} {:<12} {:<17} {:<17} {:>5} {:>8} {:>10}",
        "JOBID", "NAME", "STATE", "START", "END", "CPUS", "MEMORY", "ELAPSED"
    );
    for job in jobs {
        println!(
            "{:<12} {:<20} {:<12} {:<17} {:<17} {:>5} {:>8} {:>10}",
            job.id,
            job.name,
            job.state.as_str(),
            timestamp(job.start_time),
            timestamp(job.end_time),
            job.cpus.map(|c| c.to_string()).unwrap_or_default(),
            job.req_mem,
            job.elapsed,
        );
    }
}

pub fn reservations(reservations: &[Reservation]) {
    for res in reservations {
        println!("{}", res.name);
        println!("  start      {}", timestamp(res.start_time));
        println!("  end        {}", timestamp(res.end_time));
        println!("  duration   {}", duration(res.duration));
        println!("  nodes      {} ({})", res.nodes, res.node_count);
        println!("  partitions {}", res.partitions.join(", "));
        if let Some(users) = &res.users {
            println!("  users      {}", users.join(", "));
        }
        if let Some(accounts) = &res.accounts {
            println!("  accounts   {}", accounts.join(", "));
        }
    }
}

pub fn usage(user: &str, days: i64, summary: &UsageSummary) {
    println!("Usage for {user} over the last {days} days");
    println!();
    println!("Total jobs       {}", summary.total_jobs);
    println!("  completed      {}", summary.completed_jobs);
    println!("  failed/killed  {}", summary.failed_jobs);
    println!("GPU jobs         {}", summary.gpu_jobs);
    println!("Total CPU hours  {:.1}", summary.total_cpu_hours);

    if !summary.per_partition_counts.is_empty() {
        println!();
        println!("Jobs by partition:");
        for (partition, count) in &summary.per_partition_counts {
            println!(
                "  {:<16} {:>5} ({:.1}%)",
                partition,
                count,
                summary.partition_percent(partition)
            );
        }
    }

    if !summary.per_account_cpu_hours.is_empty() {
        println!();
        println!("CPU hours by account:");
        for (account, hours) in &summary.per_account_cpu_hours {
            println!(
                "  {:<16} {:>9.1} ({:.1}%)",
                account,
                hours,
                summary.account_percent(account)
            );
        }
    }
}
