use clap::builder::PossibleValue;
use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("DNS_TARGET_WEBHOOK_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("DNS_TARGET_WEBHOOK_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("DNS_TARGET_WEBHOOK_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("8080")
            .env("DNS_TARGET_WEBHOOK_PORT")
            .help("The port the mutating admission webhook will listen on"),
        Arg::new("tls-secret")
            .long("tls-secret")
            .visible_alias("tlsSecret")
            .value_name("SECRET_NAME")
            .default_value("")
            .env("DNS_TARGET_WEBHOOK_TLS_SECRET")
            .help("The Kubernetes secret containing the tls.crt and tls.key"),
        Arg::new("target")
            .long("target")
            .visible_alias("ipAddress")
            .value_name("TARGET")
            .default_value("")
            .env("DNS_TARGET_WEBHOOK_TARGET")
            .help("The IP address or hostname each Ingress and Gateway should be annotated with"),
        Arg::new("namespace")
            .long("namespace")
            .value_name("NAMESPACE")
            .env("DNS_TARGET_WEBHOOK_NAMESPACE")
            .help("Namespace holding the TLS secret. Defaults to the namespace of the service account"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
