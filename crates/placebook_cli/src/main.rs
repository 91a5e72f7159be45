//! CLI smoke entry point.
//!
//! Opens (or creates) a store file, seeds it if needed and prints a short
//! summary. Usage: `placebook_cli [db_path] [log_dir]`.

use placebook_core::db::open_db;
use placebook_core::{
    core_version, default_log_level, init_logging, RelationalStore, SqliteKeyValueMedium,
};
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "placebook.sqlite3";
const TOP_PLACES: usize = 3;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    if let Some(log_dir) = args.next() {
        if let Err(err) = init_logging(default_log_level().as_str(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let store = RelationalStore::open(SqliteKeyValueMedium::new(conn))?;
    let state = store.snapshot()?;

    println!("placebook_core version={}", core_version());
    println!(
        "places={} reviews={} users={} questions={} notifications={}",
        state.places.len(),
        state.reviews.len(),
        state.users.len(),
        state.questions.len(),
        state.notifications.len()
    );
    for rated in store.top_rated_places(TOP_PLACES)? {
        println!(
            "{:.2} ({} reviews) {}",
            rated.average_rating, rated.review_count, rated.place.name
        );
    }
    Ok(())
}
