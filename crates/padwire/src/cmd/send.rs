use std::fs;
use std::path::Path;

use padwire_cipher::{check_key, Text};
use padwire_peer::{transform_remote_with_config, HandshakeConfig, InitiatorConfig};

use crate::cmd::SendArgs;
use crate::exit::{input_error, invalid_input, peer_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_exchange, ExchangeReport};

pub async fn run(args: SendArgs) -> CliResult<i32> {
    let message = read_text(&args.message_file, args.max_message)?;
    let key = read_text(&args.key_file, usize::MAX)?;
    check_key(&message, &key).map_err(|err| invalid_input(&args.key_file, err))?;

    let config = InitiatorConfig {
        role: args.role,
        io_timeout: args.timeout,
        max_message_len: args.max_message,
        handshake: HandshakeConfig {
            timeout: args.timeout,
            ..HandshakeConfig::default()
        },
    };
    let responder = format!("{}:{}", args.host, args.port);

    let result = transform_remote_with_config(&args.host, args.port, &message, &key, &config)
        .await
        .map_err(|err| peer_error(&format!("exchange with {responder} failed"), err))?;
    tracing::info!(
        role = %args.role,
        %responder,
        size = result.len(),
        "exchange complete"
    );

    let report = ExchangeReport {
        role: args.role,
        responder: &responder,
        message: &message,
        key: &key,
        result: &result,
    };
    print_exchange(&report, args.format)
        .map_err(|err| CliError::new(FAILURE, format!("cannot write result: {err}")))?;
    Ok(SUCCESS)
}

/// Read a file of alphabet symbols, ignoring one trailing line ending.
fn read_text(path: &Path, max_len: usize) -> CliResult<Text> {
    let mut bytes = fs::read(path).map_err(|err| input_error(path, err))?;
    strip_line_ending(&mut bytes);
    Text::parse_bounded(bytes, max_len).map_err(|err| invalid_input(path, err))
}

fn strip_line_ending(bytes: &mut Vec<u8>) {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
}
