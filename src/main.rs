fn main() {
    #[cfg(feature = "cli")]
    sufdiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("sufdiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
