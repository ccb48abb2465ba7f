fn main() {
    if let Err(e) = scriptlite::run_cli() {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}
