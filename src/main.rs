//! bw binary entry point.

fn main() {
    if let Err(err) = branchwright::cli::run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
