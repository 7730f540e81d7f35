fn main() {
    if let Err(err) = csv_charts::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
