use bytes::BytesMut;
use ms3_frame::encode_frame;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, hex_error, CliError, CliResult, SUCCESS, USAGE};
use crate::hex::{format_hex, parse_hex};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let flag = parse_flag(&args.flag)?;
    let body =
        parse_hex(&args.body).map_err(|detail| hex_error("body is not valid hex", detail))?;

    let mut frame = BytesMut::new();
    encode_frame(flag, &body, &mut frame).map_err(|err| frame_error("encode failed", err))?;

    println!("{}", format_hex(&frame));
    Ok(SUCCESS)
}

/// Parse a single flag byte given as exactly two hex digits.
pub fn parse_flag(input: &str) -> CliResult<u8> {
    let bytes = parse_hex(input).map_err(|detail| hex_error("flag is not valid hex", detail))?;
    match bytes.as_slice() {
        [flag] => Ok(*flag),
        _ => Err(CliError::new(
            USAGE,
            format!("flag must be exactly one byte, got {} bytes", bytes.len()),
        )),
    }
}
