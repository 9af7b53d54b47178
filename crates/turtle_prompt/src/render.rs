use std::path::Path;

use svg::node::element::Line;
use svg::Document;
use turtlelogo::DrawCommand;

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", "black")
        .set("stroke-width", 2)
}

/// Draws every line in the log. Waits and rotations don't show up in a static picture.
pub fn document(cmds: &[DrawCommand]) -> Document {
    cmds.iter().fold(
        Document::new()
            .set("viewBox", (-300, -300, 600, 600))
            .set("preserveAspectRatio", "xMidYMid slice"),
        |doc, cmd| match *cmd {
            DrawCommand::DrawLine { x1, y1, x2, y2, .. } => doc.add(line(x1, y1, x2, y2)),
            DrawCommand::Rotate { .. } | DrawCommand::Wait { .. } => doc,
        },
    )
}

pub fn save_svg(path: &Path, cmds: &[DrawCommand]) -> anyhow::Result<()> {
    svg::save(path, &document(cmds))?;
    Ok(())
}

pub fn save_json(path: &Path, cmds: &[DrawCommand]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), cmds)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use turtlelogo::ScriptState;

    #[test]
    fn one_element_per_line() {
        let state = ScriptState::default().submit("fd 10 wait 1 rt 90 fd 10");
        let svg = document(&state.draw_commands).to_string();
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains("viewBox=\"-300 -300 600 600\""));
    }
}
