//! `ugid`: inspect the user/group identity cache.
//!
//! One-shot commands build a single snapshot from the configured source and answer
//! from it; `watch` runs the refresher and logs every new generation until
//! interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use ugid_cache::{CacheConfig, NO_GROUP, NO_USER, Refresher, SnapshotStore, UserAndGroup};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "ugid")]
#[command(about = "User and group identity cache")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Dotted table prefix inside the configuration file
	#[arg(long, value_name = "PREFIX")]
	prefix: Option<String>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show a user by name or uid
	User { who: String },
	/// Show a group by name or gid
	Group { which: String },
	/// Check whether a uid belongs to a gid
	Member { uid: u32, gid: u32 },
	/// List every user and group in the snapshot
	Dump,
	/// Keep refreshing and log each new generation
	Watch {
		/// Override the configured refresh period
		#[arg(long, value_name = "SECS")]
		period: Option<u64>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config = match &args.config {
		Some(path) => CacheConfig::load(path, args.prefix.as_deref())?,
		None => CacheConfig::default(),
	};
	info!(passwd = %config.passwd_path.display(), group = %config.group_path.display(), "ugid.cli.source");

	let store = Arc::new(SnapshotStore::new());
	let refresher = Refresher::new(config.file_source(), Arc::clone(&store), config.build_policy());
	refresher.refresh().await?;
	let ug = UserAndGroup::new(store);

	match args.command {
		Command::User { who } => show_user(&ug, &who),
		Command::Group { which } => show_group(&ug, &which),
		Command::Member { uid, gid } => {
			println!("{}", ug.is_group_member(uid, gid));
		}
		Command::Dump => dump(&ug),
		Command::Watch { period } => {
			let period = period.map_or_else(|| config.update_period(), Duration::from_secs);
			watch(&refresher, &ug, period).await?;
		}
	}
	Ok(())
}

fn show_user(ug: &UserAndGroup, who: &str) {
	let uid = who.parse().unwrap_or_else(|_| ug.user_id(who));
	if uid == NO_USER {
		println!("no such user: {who}");
		return;
	}
	let entry = ug.user_name_and_group(uid);
	if entry.name.is_empty() {
		println!("no such user: {who}");
		return;
	}
	println!(
		"uid={uid} name={} gid={} group={} privileged={}",
		entry.name,
		entry.primary_gid,
		ug.group_name(entry.primary_gid),
		ug.is_privileged(uid)
	);
}

fn show_group(ug: &UserAndGroup, which: &str) {
	let gid = which.parse().unwrap_or_else(|_| ug.group_id(which));
	let name = ug.group_name(gid);
	if gid == NO_GROUP || name.is_empty() {
		println!("no such group: {which}");
		return;
	}
	let snap = ug.snapshot();
	let mut members: Vec<&str> = snap
		.group_members()
		.find(&gid)
		.map(|set| set.iter().filter_map(|uid| snap.user_name(*uid)).collect())
		.unwrap_or_default();
	members.sort_unstable();
	println!("gid={gid} name={name} members={}", members.join(","));
}

fn dump(ug: &UserAndGroup) {
	let snap = ug.snapshot();
	let mut users: Vec<_> = snap.uid_map().iter().collect();
	users.sort_unstable_by_key(|(uid, _)| **uid);
	for (uid, entry) in users {
		println!("user {uid} {} {}", entry.name, entry.primary_gid);
	}
	let mut groups: Vec<_> = snap.gid_map().iter().collect();
	groups.sort_unstable_by_key(|(gid, _)| **gid);
	for (gid, name) in groups {
		println!("group {gid} {name}");
	}
}

async fn watch<S: ugid_cache::IdentitySource>(
	refresher: &Refresher<S>,
	ug: &UserAndGroup,
	period: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
	refresher.start(period)?;
	let mut names = ug.names();
	let mut poll = tokio::time::interval(Duration::from_millis(250));
	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => break,
			_ = poll.tick() => {
				if names.sync(ug.store()) {
					let snap = names.snapshot();
					info!(
						generation = names.generation(),
						users = snap.uid_map().len(),
						groups = snap.gid_map().len(),
						"ugid.cli.generation"
					);
				}
			}
		}
	}
	refresher.shutdown().await?;
	let stats = refresher.stats();
	info!(builds = stats.builds, failures = stats.failures, "ugid.cli.stopped");
	Ok(())
}
