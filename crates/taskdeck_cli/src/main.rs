//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskdeck_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{RequestContext, Router, PROJECT_REPORT};

fn main() -> ExitCode {
    println!("taskdeck_core version={}", taskdeck_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("taskdeck_core db bootstrap failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let router = Router::new(&conn);
    match router.dispatch(
        &RequestContext::anonymous(),
        PROJECT_REPORT,
        &serde_json::Value::Null,
    ) {
        Ok(report) => {
            println!("taskdeck_core report={report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("taskdeck_core report failed: {err}");
            ExitCode::FAILURE
        }
    }
}
