fn main() -> anyhow::Result<()> {
    let matches = sous_cli::command().get_matches();
    let config = sous_cli::load_config(&matches)?;
    sous_cli::init_tracing(&config.log_level, matches.get_flag("json-logs"));

    let report = sous_cli::run(&matches, &config)?;
    println!("{}", report.output);

    std::process::exit(if report.success { 0 } else { 1 });
}
