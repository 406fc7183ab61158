use tasktimer::cli::{internal_error, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        // User errors exit from the command handlers; anything reaching here is internal
        internal_error(&format!("{:#}", e));
    }
}
