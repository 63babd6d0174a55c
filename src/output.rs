use std::io::Write;

use clap::ValueEnum;

use crate::error::GraderError;
use crate::scorecard::Scorecard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

pub fn render(
    card: &Scorecard,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), GraderError> {
    match format {
        OutputFormat::Human => render_human(card, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, card)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_human(card: &Scorecard, out: &mut dyn Write) -> std::io::Result<()> {
    for object in card.iter() {
        if object.namespace.is_empty() {
            writeln!(out, "{} {}", object.kind, object.name)?;
        } else {
            writeln!(out, "{} {} in {}", object.kind, object.name, object.namespace)?;
        }
        for score in &object.checks {
            writeln!(out, "    [{}] {}", score.grade, score.check.name)?;
            for comment in &score.comments {
                if comment.path.is_empty() {
                    writeln!(out, "        * {}", comment.summary)?;
                } else {
                    writeln!(out, "        * {} -> {}", comment.path, comment.summary)?;
                }
                if !comment.description.is_empty() {
                    writeln!(out, "          {}", comment.description)?;
                }
            }
        }
    }
    Ok(())
}
