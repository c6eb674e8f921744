fn main() {
    if let Err(err) = drawgen::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
