use jamdeck::model::ServerProfile;

#[derive(Debug, Default)]
struct CliArgs {
    server: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    jamdeck::logging::init_logging()?;
    let args = parse_args(std::env::args().skip(1).collect())?;

    let server = match (args.server, args.user) {
        (Some(endpoint), Some(username)) => Some(ServerProfile {
            endpoint,
            username,
            password: args.password.unwrap_or_default(),
        }),
        (None, None) => None,
        _ => anyhow::bail!("--server and --user must be given together"),
    };

    jamdeck::app::run_with_startup(jamdeck::app::AppStartupOptions { server })
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        match flag {
            "--server" | "--user" | "--password" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("{flag} requires a value");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("{flag} cannot be empty");
                }
                let value = Some(value.trim().to_string());
                match flag {
                    "--server" => out.server = value,
                    "--user" => out.user = value,
                    _ => out.password = value,
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("jamdeck");
    println!("  --server URL      Subsonic server to stream from");
    println!("  --user NAME       Subsonic user name");
    println!("  --password PW     Subsonic password");
    println!("Commands are read from stdin, one per line. Type help once running.");
}
