//! gander - inspect SLURM partitions, launch work, watch it run.

mod render;

use camino::Utf8Path;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use gander_catalog::{
    build_catalog, launch_interactive, submit_batch, JobRequest, JobSelections, SubmitOutcome,
    TerminalLauncher,
};
use gander_cli::{Args, Command, ResourceFlags};
use gander_parsers::parse_walltime_minutes;
use gander_poll::{FileTailer, MembershipConfig, MembershipPoller, TailEvent};
use gander_slurm::{
    cancel_job, current_user, query_completed_jobs, query_job_log_paths, query_partitions,
    query_queued_jobs, query_reservations,
};
use miette::{miette, IntoDiagnostic, Result};
use std::io::Write;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Partitions => {
            let partitions = query_partitions().await.into_diagnostic()?;
            if args.json {
                print_json(&partitions)?;
            } else {
                render::partitions(&partitions);
            }
        }

        Command::Catalog { partition } => {
            let user = current_user().into_diagnostic()?;
            let catalog = build_catalog(&partition, &user).await;
            if args.json {
                print_json(&catalog)?;
            } else {
                render::catalog(&catalog);
            }
        }

        Command::Jobs { partition } => {
            let user = current_user().into_diagnostic()?;
            let jobs = query_queued_jobs(&user, &partition).await.into_diagnostic()?;
            if args.json {
                print_json(&jobs)?;
            } else {
                render::queued_jobs(&jobs);
            }
        }

        Command::History { partition, days } => {
            let user = current_user().into_diagnostic()?;
            let since = Utc::now() - ChronoDuration::days(days);
            let jobs = query_completed_jobs(&user, Some(&partition), since)
                .await
                .into_diagnostic()?;
            if args.json {
                print_json(&jobs)?;
            } else {
                render::completed_jobs(&jobs);
            }
        }

        Command::Usage { days } => {
            let user = current_user().into_diagnostic()?;
            let since = Utc::now() - ChronoDuration::days(days);
            let jobs = query_completed_jobs(&user, None, since)
                .await
                .into_diagnostic()?;
            let summary = gander_usage::summarize(&jobs);
            if args.json {
                print_json(&summary)?;
            } else {
                render::usage(&user, days, &summary);
            }
        }

        Command::Reservations {
            partition,
            include_past,
            watch,
        } => match watch {
            None => show_reservations(partition.as_deref(), include_past, args.json).await?,
            Some(secs) => {
                // Auto-refresh loop; each pass re-queries and reprints
                let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            show_reservations(partition.as_deref(), include_past, args.json)
                                .await?;
                            println!(
                                "Last updated: {}",
                                Utc::now().format("%Y-%m-%d %H:%M:%S")
                            );
                        }
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
            }
        },

        Command::Interactive {
            partition,
            resources,
        } => {
            let request = build_request(&partition, &resources).await?;
            launch_interactive(&request, &TerminalLauncher::default()).into_diagnostic()?;
            println!(
                "Started interactive job on partition {} with time limit {}",
                request.partition,
                request.time_string()
            );
        }

        Command::Batch {
            script,
            partition,
            resources,
        } => {
            let request = build_request(&partition, &resources).await?;
            match submit_batch(&request, &script).await.into_diagnostic()? {
                SubmitOutcome::Submitted { job_id } => {
                    println!(
                        "Submitted job {} to partition {}",
                        job_id, request.partition
                    );
                }
                SubmitOutcome::SubmittedIdUnknown => {
                    println!(
                        "Job submitted to partition {}, but the job id could not be determined",
                        request.partition
                    );
                }
            }
        }

        Command::Cancel { job_id } => {
            cancel_job(&job_id).await.into_diagnostic()?;
            println!("Job {job_id} has been cancelled");
        }

        Command::Logs { job_id, stderr } => {
            let paths = query_job_log_paths(&job_id).await.into_diagnostic()?;
            let path = if stderr { paths.stderr } else { paths.stdout };
            println!("Following {path}");
            tail_file(&path).await;
        }

        Command::Tail { path } => {
            tail_file(&path).await;
        }

        Command::Watch { interval } => {
            let user = current_user().into_diagnostic()?;
            let mut config = MembershipConfig::new(user);
            config.interval = Duration::from_secs(interval.max(1));

            let (handle, mut events) = MembershipPoller::new(config).start();
            loop {
                tokio::select! {
                    Some(update) = events.recv() => {
                        println!(
                            "partition {}: {}",
                            update.partition,
                            if update.has_jobs { "jobs running" } else { "no jobs" }
                        );
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            handle.shutdown().await;
        }
    }

    Ok(())
}

/// One reservation listing pass: query, filter, sort, print.
async fn show_reservations(
    partition: Option<&str>,
    include_past: bool,
    json: bool,
) -> Result<()> {
    let now = Utc::now();
    let mut reservations = query_reservations().await.into_diagnostic()?;
    reservations.retain(|res| {
        let partition_ok = partition.is_none_or(|p| res.covers_partition(p));
        partition_ok && (include_past || !res.is_past(now))
    });
    // Not-yet-determined start times sort last
    reservations.sort_by_key(|res| res.start_time.unwrap_or(chrono::DateTime::<Utc>::MAX_UTC));
    if json {
        print_json(&reservations)?;
    } else {
        render::reservations(&reservations);
    }
    Ok(())
}

/// Parse the `--time` flag: `H:MM:SS`, `H:MM`, or bare minutes.
fn parse_time_flag(s: &str) -> Result<u64> {
    let minutes = match s.split(':').count() {
        3 => parse_walltime_minutes(s),
        2 => {
            let (h, m) = s.split_once(':').unwrap();
            match (h.parse::<u64>(), m.parse::<u64>()) {
                (Ok(h), Ok(m)) => Some(h * 60 + m),
                _ => None,
            }
        }
        _ => s.parse().ok(),
    };
    minutes.ok_or_else(|| miette!("unrecognized time limit: {s}"))
}

/// Build a validated request for a partition from the resource flags,
/// filling anything unset from catalog-clamped defaults.
async fn build_request(partition: &str, flags: &ResourceFlags) -> Result<JobRequest> {
    let user = current_user().into_diagnostic()?;
    let catalog = build_catalog(partition, &user).await;

    let mut selections = JobSelections::defaults_for(&catalog);
    if let Some(time) = &flags.time {
        selections.walltime_minutes = parse_time_flag(time)?;
    }
    if let Some(cpus) = flags.cpus {
        selections.cpus_per_task = cpus;
    }
    if let Some(mem) = flags.mem {
        selections.memory_gb = mem;
    }
    if flags.gpus.is_some() {
        selections.gpus = flags.gpus;
    }
    if let Some(nodes) = flags.nodes {
        selections.nodes = nodes;
    }
    if flags.account.is_some() {
        selections.account = flags.account.clone();
    }

    JobRequest::build(&catalog, &selections).into_diagnostic()
}

/// Stream a file's growth to stdout until interrupted.
async fn tail_file(path: &Utf8Path) {
    let (handle, mut events) = FileTailer::new(path.to_owned()).start();
    loop {
        tokio::select! {
            Some(event) = events.recv() => match event {
                TailEvent::Waiting => println!("Waiting for file to be created..."),
                TailEvent::Data(text) => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    handle.shutdown().await;
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).into_diagnostic()?
    );
    Ok(())
}
