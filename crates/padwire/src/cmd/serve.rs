use padwire_peer::{HandshakeConfig, Responder, ResponderConfig};

use crate::cmd::ServeArgs;
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};

pub async fn run(args: ServeArgs) -> CliResult<i32> {
    let config = ResponderConfig {
        role: args.role,
        max_workers: usize::from(args.max_workers),
        io_timeout: args.timeout,
        max_message_len: args.max_message,
        handshake: HandshakeConfig {
            timeout: args.timeout,
            ..HandshakeConfig::default()
        },
    };

    let mut responder = Responder::bind(&args.host, args.port, config)
        .await
        .map_err(|err| CliError::new(FAILURE, format!("bind failed: {err}")))?;

    // Scripts that pass port 0 read the chosen port from here.
    println!("listening on {}", responder.local_addr());

    responder.serve().await;
    Ok(SUCCESS)
}
