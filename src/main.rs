//! casfs binary: argument parsing, mount setup and teardown.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use casfs::config::Config;
use casfs::error::Error;
use casfs::fuse::CasFs;
use casfs::sidecar;
use casfs::store::{DiskStore, PublishOptions, Uri};
use casfs::tree::{special, Mount, MountOptions};

/// Worker threads the dispatcher may run handlers on concurrently.
const DISPATCH_THREADS: usize = 8;

#[derive(Debug, Parser)]
#[command(name = "casfs", version, about = "Mount a content-addressed block store as a writable tree")]
struct Args {
    /// File holding the root URI of the mounted namespace. Created on
    /// first mount.
    sidecar: PathBuf,

    /// Where to mount the tree.
    mount_point: PathBuf,

    /// Desired level of sender anonymity for backend transfers.
    #[arg(short, long)]
    anonymity: Option<u32>,

    /// Priority of published content against replacement.
    #[arg(short, long)]
    priority: Option<u32>,

    /// Make the synthetic .uri entries visible in directory listings.
    #[arg(short, long)]
    uri_files: bool,

    /// Append logs to this file instead of stderr.
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra option forwarded to the FUSE dispatcher; repeatable.
    #[arg(short = 'o', long = "fuse-opt")]
    fuse_opts: Vec<OsString>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_logging(args.log_file.as_deref()) {
        eprintln!("casfs: cannot set up logging: {err}");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "mount failed");
            eprintln!("casfs: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let objects = config
        .store
        .objects
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("casfs-store"));
    let scratch_dir = config.scratch.dir.clone().unwrap_or_else(std::env::temp_dir);
    let publish = PublishOptions {
        anonymity: args.anonymity.or(config.mount.anonymity).unwrap_or(1),
        priority: args.priority.or(config.mount.priority).unwrap_or(1000),
    };
    let uri_files = args.uri_files || config.mount.uri_files.unwrap_or(false);

    let store = Arc::new(DiskStore::open(&objects)?);
    let root_uri = sidecar::load(&args.sidecar)?;
    if root_uri.is_none() {
        // Reserve the sidecar right away so an unwritable path fails the
        // mount rather than the unmount.
        std::fs::write(&args.sidecar, "")?;
        info!(sidecar = %args.sidecar.display(), "starting a fresh namespace");
    }

    let ctx = Mount::new(store, root_uri, MountOptions { publish, uri_files, scratch_dir });

    let fs = fuse_mt::FuseMT::new(CasFs::new(ctx.clone()), DISPATCH_THREADS);
    let fuse_opts: Vec<&OsStr> = args.fuse_opts.iter().map(OsString::as_os_str).collect();
    info!(mount = %args.mount_point.display(), "mounting");
    fuse_mt::mount(fs, &args.mount_point, &fuse_opts)?;
    info!("dispatcher returned, persisting root uri");

    // The tree is quiescent now. Downloads would cancel, but the final
    // republish is pure upload.
    ctx.set_closing();
    if let Some(contents) = special::read(&ctx, "/.uri")? {
        let uri = contents
            .trim()
            .parse::<Uri>()
            .map_err(|_| Error::backend("final republish produced an unparsable uri"))?;
        sidecar::save(&args.sidecar, &uri)?;
    }
    Ok(())
}
