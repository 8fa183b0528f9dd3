use std::fs;
use std::io::Read;

use ms3_frame::StreamDecoder;

use crate::cmd::DecodeArgs;
use crate::exit::{hex_error, io_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::hex::parse_hex;
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = resolve_input(&args)?;
    let wire = parse_hex(&input).map_err(|detail| hex_error("input is not valid hex", detail))?;

    let chunk_size = match args.chunk_size {
        Some(0) => return Err(CliError::new(USAGE, "--chunk-size must be greater than zero")),
        Some(n) => n,
        None => wire.len().max(1),
    };

    let mut decoder = StreamDecoder::new();
    for chunk in wire.chunks(chunk_size) {
        decoder.append(chunk);
    }

    let mut decoded = 0usize;
    while let Some(message) = decoder.next_message() {
        print_message(decoded, &message, format);
        decoded += 1;
    }

    let stats = decoder.stats();
    tracing::debug!(
        frames = stats.frames_decoded,
        checksum_failures = stats.checksum_failures,
        resync_skips = stats.resync_skips,
        trailing = decoder.buffered(),
        "decode finished"
    );

    if let Some(expected) = args.expect {
        if decoded != expected {
            return Err(CliError::new(
                FAILURE,
                format!("expected {expected} messages, decoded {decoded}"),
            ));
        }
    }

    Ok(SUCCESS)
}

fn resolve_input(args: &DecodeArgs) -> CliResult<String> {
    if let Some(hex) = &args.hex {
        return Ok(hex.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(input)
}
