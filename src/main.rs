use exitfailure::ExitFailure;
use structopt::StructOpt;

mod mmdtex;
use mmdtex::args::Args;

fn main() -> Result<(), ExitFailure> {
    const PROGRAM_NAME: &str = "mmdtex";

    let args = Args::from_args();

    args.init_logger();

    args.execute(PROGRAM_NAME)?;

    Ok(())
}
