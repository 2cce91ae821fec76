use color_eyre::eyre::{
    Result,
    WrapErr as _,
};
use tracing_subscriber::EnvFilter;
use whitelist_merkle_utils::{
    cli::{
        self,
        Command,
    },
    config::Config,
    generate,
    tree,
    verify,
};

fn main() -> Result<()> {
    // no `ErrorLayer` is registered, so span traces cannot be captured
    color_eyre::config::HookBuilder::default()
        .capture_span_trace_by_default(false)
        .install()?;
    let command = cli::get();
    let config = Config::get().wrap_err("failed reading config from the environment")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log)
                .wrap_err_with(|| format!("invalid log directives `{}`", config.log))?,
        )
        .with_writer(std::io::stderr)
        .init();

    match command {
        Command::Build(args) => tree::run(args, &config),
        Command::Verify(args) => verify::run(args, &config),
        Command::Generate(args) => generate::run(args),
    }
}
