use bitboard::{encode, NUM_FEATURES};
use clap::Args;
use shakmaty::{fen::Fen, CastlingMode, Chess};
use std::error::Error;

#[derive(Args)]
pub struct InfoCommand {
    /// If provided, it will print the active features of the given FEN
    #[arg(long, value_name = "fen")]
    fen: Option<String>,
}

pub fn info(cmd: InfoCommand) -> Result<(), Box<dyn Error>> {
    // print number of features
    println!("{}", NUM_FEATURES);

    if let Some(fen) = cmd.fen {
        let position: Chess =
            Fen::from_ascii(fen.as_bytes())?.into_position(CastlingMode::Standard)?;
        let features = encode(&position);

        for x in features.active_indices() {
            print!("{} ", x);
        }
        println!();
    }

    Ok(())
}
