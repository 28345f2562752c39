use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use survey_auth::{
    generate_signing_key, signing_key_from_hex, signing_key_to_hex, verifying_key_to_hex,
    TokenIssuer,
};
use survey_server::{ServerConfig, StoreBackend};

fn cli() -> Command {
    Command::new("survey-server")
        .version(survey_server::VERSION)
        .about("Survey authoring and response collection API")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Bind address (overrides SURVEY_BIND_HOST)"),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Listen port (overrides PORT)"),
                )
                .arg(
                    Arg::new("store")
                        .long("store")
                        .value_parser(["memory", "mongo"])
                        .help("Store backend (overrides SURVEY_STORE)"),
                )
                .arg(
                    Arg::new("log-json")
                        .long("log-json")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON lines"),
                ),
        )
        .subcommand(Command::new("keygen").about("Print a fresh Ed25519 key pair as hex"))
        .subcommand(
            Command::new("issue-token")
                .about("Mint an identity token with SURVEY_IDENTITY_SIGNING_KEY")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .required(true)
                        .help("User id to embed as the token subject"),
                )
                .arg(
                    Arg::new("ttl-secs")
                        .long("ttl-secs")
                        .default_value("3600")
                        .value_parser(value_parser!(u64))
                        .help("Token lifetime in seconds"),
                ),
        )
}

fn serve_config(args: &ArgMatches) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::from_env().context("loading configuration")?;

    if let Some(host) = args.get_one::<String>("host") {
        config = config.with_host(host.clone());
    }
    if let Some(port) = args.get_one::<u16>("port") {
        config = config.with_port(*port);
    }
    if let Some(store) = args.get_one::<String>("store") {
        let backend: StoreBackend = store.parse().map_err(anyhow::Error::msg)?;
        config = config.with_store(backend);
    }
    if args.get_flag("log-json") {
        config = config.with_log_json(true);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => {
            let config = serve_config(args)?;
            survey_server::init_tracing(config.log_json);
            survey_server::serve(config).await.context("server failed")?;
        }
        Some(("keygen", _)) => {
            let key = generate_signing_key();
            println!("SURVEY_IDENTITY_SIGNING_KEY={}", signing_key_to_hex(&key));
            println!(
                "SURVEY_IDENTITY_PUBLIC_KEY={}",
                verifying_key_to_hex(&key.verifying_key())
            );
        }
        Some(("issue-token", args)) => {
            let subject = args
                .get_one::<String>("subject")
                .context("--subject is required")?;
            let ttl_secs = args.get_one::<u64>("ttl-secs").copied().unwrap_or(3600);

            let encoded = std::env::var("SURVEY_IDENTITY_SIGNING_KEY")
                .context("SURVEY_IDENTITY_SIGNING_KEY must be set")?;
            let mut issuer = TokenIssuer::new(signing_key_from_hex(&encoded)?);
            if let Ok(name) = std::env::var("SURVEY_IDENTITY_ISSUER") {
                issuer = issuer.with_issuer(name);
            }

            println!("{}", issuer.issue_with_ttl(subject, ttl_secs)?);
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn serve_flags_override_config() {
        let matches = cli()
            .try_get_matches_from(["survey-server", "serve", "--port", "0", "--store", "memory"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let config = serve_config(args).unwrap();
        assert_eq!(config.port, 0);
        assert_eq!(config.store, StoreBackend::Memory);
    }

    #[test]
    fn issue_token_requires_subject() {
        let result = cli().try_get_matches_from(["survey-server", "issue-token"]);
        assert!(result.is_err());
    }
}
