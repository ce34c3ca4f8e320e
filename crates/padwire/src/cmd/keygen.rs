use padwire_cipher::generate_key;

use crate::cmd::KeygenArgs;
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};
use crate::output::print_line;

pub fn run(args: KeygenArgs) -> CliResult<i32> {
    let key = generate_key(args.length);
    tracing::debug!(length = key.len(), "generated key");
    print_line(&key).map_err(|err| CliError::new(FAILURE, format!("cannot write key: {err}")))?;
    Ok(SUCCESS)
}
