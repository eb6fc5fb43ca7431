use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;

use qcn::archiver::{ComicArchiver, SyncOptions};
use qcn::fetch::{parse_header, WebClient};
use qcn::store::Store;

const DEFAULT_DATABASE_NAME: &str = "qcn.sqlite";
const DEFAULT_LOG_ENV: &str = "qcn=info";

#[derive(Debug, StructOpt)]
#[structopt(name = "qcn", about = "questionablecontent comic archiver")]
enum Cmd {
    /// Fetch comics newer than the stored progress marker.
    #[structopt(name = "sync")]
    Sync {
        /// Directory comic images are stored under. Created if missing.
        #[structopt(parse(from_os_str))]
        base_dir: PathBuf,
        /// Database path. If not provided defaults to <base_dir>/qcn.sqlite.
        #[structopt(long, parse(from_os_str))]
        db: Option<PathBuf>,
        /// Walk the whole archive from comic 1 again. Comics already in the
        /// database are not re-downloaded.
        #[structopt(long)]
        restart: bool,
        /// Extra request header, `Name: value`. May be given multiple times.
        #[structopt(short = "H", long = "header", number_of_values = 1)]
        headers: Vec<String>,
        /// HTTP proxy URL. May be given multiple times; requests rotate over
        /// the given proxies.
        #[structopt(long = "proxy", number_of_values = 1)]
        proxies: Vec<String>,
        /// Pause between successive requests, in milliseconds.
        #[structopt(long, default_value = "1000")]
        delay_ms: u64,
    },

    /// Print the progress marker and stored comic count.
    #[structopt(name = "status")]
    Status {
        /// Directory the database lives under.
        #[structopt(parse(from_os_str))]
        base_dir: PathBuf,
        /// Database path. If not provided defaults to <base_dir>/qcn.sqlite.
        #[structopt(long, parse(from_os_str))]
        db: Option<PathBuf>,
    },
}

fn database_path(base_dir: &PathBuf, db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(|| base_dir.join(DEFAULT_DATABASE_NAME))
}

impl Cmd {
    fn process(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Sync {
                base_dir,
                db,
                restart,
                headers,
                proxies,
                delay_ms,
            } => {
                let headers = headers
                    .iter()
                    .map(|raw| parse_header(raw))
                    .collect::<Result<Vec<_>, _>>()?;

                std::fs::create_dir_all(&base_dir)?;
                let dbpath = database_path(&base_dir, db);
                log::info!("Opening SQLite DB at {:?}", dbpath);
                let store = Store::open(&dbpath)?;

                let client = WebClient::new(headers, &proxies)?;

                let stop = Arc::new(AtomicBool::new(false));
                let handler_stop = stop.clone();
                ctrlc::set_handler(move || {
                    log::warn!("Interrupt received, finishing the current comic...");
                    handler_stop.store(true, Ordering::SeqCst);
                })?;

                let archiver = ComicArchiver::new(
                    &client,
                    &client,
                    &store,
                    base_dir,
                    SyncOptions {
                        restart,
                        delay: Duration::from_millis(delay_ms),
                    },
                    stop,
                );

                let report = archiver.run()?;
                if report.skipped > 0 {
                    log::warn!(
                        "{} comics could not be fetched; they will be retried next run",
                        report.skipped
                    );
                }
            }

            Cmd::Status { base_dir, db } => {
                let dbpath = database_path(&base_dir, db);
                let store = Store::open(&dbpath)?;
                let marker = store.progress_marker()?;

                println!("database:      {}", dbpath.display());
                println!("progress:      {}", marker.last_comic_id);
                println!(
                    "last run:      {}",
                    marker
                        .last_run_at
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
                println!("stored comics: {}", store.comic_count()?);
            }
        }

        Ok(())
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(DEFAULT_LOG_ENV));

    let opt = Cmd::from_args();
    log::debug!("opt: {:?}", opt);

    if let Err(e) = opt.process() {
        log::error!(
            "Error: {}, source: {:?}",
            e,
            e.source().map(ToString::to_string)
        );
        std::process::exit(1)
    }
}
