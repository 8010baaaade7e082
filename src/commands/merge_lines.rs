use anyhow::Result;
use tracing::info;

use crate::cli::MergeLinesArgs;
use crate::extraction::{LinePatterns, read_source_lines, reconstruct_lines};
use crate::util::{ensure_input_exists, write_lines};

pub fn run(args: MergeLinesArgs) -> Result<()> {
    ensure_input_exists(&args.input)?;

    let lines = read_source_lines(&args.input, args.input_format)?;
    let patterns = LinePatterns::new()?;
    let units = reconstruct_lines(&lines, &patterns, args.language);

    write_lines(&args.output, &units)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        language = args.language.code(),
        lines_read = lines.len(),
        units_written = units.len(),
        "merged wrapped export lines"
    );

    Ok(())
}
