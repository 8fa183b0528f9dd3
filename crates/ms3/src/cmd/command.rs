use ms3_frame::encode_command;

use crate::cmd::encode::parse_flag;
use crate::cmd::CommandArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::hex::format_hex;

pub fn run(args: CommandArgs) -> CliResult<i32> {
    let flag = parse_flag(&args.flag)?;
    let frame = encode_command(flag);
    println!("{}", format_hex(&frame));
    Ok(SUCCESS)
}
