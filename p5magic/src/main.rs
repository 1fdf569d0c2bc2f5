fn main() {
    if let Err(e) = p5magic::run_cli() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
