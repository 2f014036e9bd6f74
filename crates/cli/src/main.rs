fn main() {
    // stdout carries only the command output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    cmd_cache::run(std::env::args_os(), |code| std::process::exit(code));
}
